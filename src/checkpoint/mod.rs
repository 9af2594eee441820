pub mod checker;
pub mod record;

pub use checker::{Checker, DataKind};
pub use record::{Checkpoint, ModelRecord};

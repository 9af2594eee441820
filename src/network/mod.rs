pub mod init;
pub mod model;
pub mod network;

pub use init::Init;
pub use model::{Model, ModelState};
pub use network::Network;

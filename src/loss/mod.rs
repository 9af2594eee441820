pub mod bce;
pub mod huber;
pub mod loss_type;
pub mod mae;
pub mod mse;

pub use bce::BceLoss;
pub use huber::HuberLoss;
pub use loss_type::{Loss, LossType};
pub use mae::MaeLoss;
pub use mse::MseLoss;

pub mod regression;
pub mod summary;

pub use regression::{mean_absolute_error, pearsonr, r2_score};
pub use summary::Summary;

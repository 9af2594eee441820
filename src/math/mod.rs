pub mod matrix;
pub(crate) mod nullable;

pub use matrix::Matrix;

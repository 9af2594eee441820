pub mod convert;

pub use convert::IntoMatrix;

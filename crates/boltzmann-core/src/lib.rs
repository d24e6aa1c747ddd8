pub mod dtype;
pub mod error;
pub mod matrix;
pub mod view;

pub use dtype::Float;
pub use error::{MatrixError, MatrixResult};
pub use matrix::Matrix;
pub use view::{MatrixView, MatrixViewMut};

mod error;
pub mod model;
pub mod utils;

pub use error::ErrorKind;
pub use model::*;

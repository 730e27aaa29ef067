pub mod types;
pub mod validate;

pub use types::*;

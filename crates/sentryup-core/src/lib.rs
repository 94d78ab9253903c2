pub mod compose;
pub mod engine;
pub mod error;
pub mod io;
pub mod probe;
pub mod secret;

pub use error::{Result, SetupError};

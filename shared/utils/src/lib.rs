pub mod config;
pub mod logging;
pub mod error;
pub mod listeners;
pub mod validation;

pub use self::config::*;
pub use logging::*;
pub use error::*;
pub use listeners::*;
pub use validation::*;

//! Configuration validation
//!
//! Rejects configurations the monitor cannot run with before any work starts.

mod error;
mod validator;


pub use error::ValidationError;
pub use validator::{parse_time_of_day, validate_config};

//! Input Validation
//!
//! Bounds checks the dashboard's input layer applies to manual observations
//! before features are derived.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator};

//! Model parsing errors.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Invalid value '{value}' for parameter '{name}'")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Unknown job type '{0}', expected Full-Time, Part-Time or Contract")]
    InvalidJobType(String),
}

impl ModelError {
    pub fn invalid_parameter(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            value: value.into(),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },
    #[error("Invalid temperature '{value}'. Expected a number between 0 and 2.")]
    InvalidTemperature { value: String },
}

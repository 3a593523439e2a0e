use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcKitError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Unsupported file '{file}': {reason}")]
    UnsupportedFile { file: String, reason: String },

    #[error("Could not process '{file}': {reason}")]
    DocumentProcessing { file: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CalcKitError {
    /// Validation failures mean "no result yet" rather than a broken computation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CalcKitError::InvalidInput { .. }
                | CalcKitError::FinancialImpossibility(_)
                | CalcKitError::DivisionByZero { .. }
                | CalcKitError::InsufficientData(_)
        )
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcKitError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CalcKitError {
    fn from(e: serde_json::Error) -> Self {
        CalcKitError::SerializationError(e.to_string())
    }
}

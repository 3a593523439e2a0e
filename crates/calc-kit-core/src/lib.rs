pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "lease")]
pub mod lease;

#[cfg(feature = "health")]
pub mod health;

#[cfg(feature = "text")]
pub mod text;

#[cfg(feature = "pdf")]
pub mod documents;

pub use error::CalcKitError;
pub use types::*;

/// Standard result type for all calc-kit operations
pub type CalcKitResult<T> = Result<T, CalcKitError>;

//! Structured errors for unit algebra

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const MALFORMED_EXPRESSION: &str = "MALFORMED_EXPRESSION";
    pub const INVALID_CONSTRUCTION: &str = "INVALID_CONSTRUCTION";
    pub const AMBIGUOUS_BROADCAST: &str = "AMBIGUOUS_BROADCAST";
    pub const INVALID_DEFINITION: &str = "INVALID_DEFINITION";
}

/// Error type for unit and quantity operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnitError {
    /// Name is not registered and is not a valid expression or number
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Conversion or arithmetic between incompatible dimension signatures
    #[error("Cannot convert between '{from}' and '{to}': incompatible dimensions")]
    DimensionMismatch { from: String, to: String },

    /// Parenthesis mismatch, leftover tokens or missing operands
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),

    /// A value was built from parts that cannot form it
    #[error("Invalid construction: {0}")]
    InvalidConstruction(String),

    /// Two list magnitudes combined where elementwise pairing is undefined
    #[error("Ambiguous broadcast: {0}")]
    AmbiguousBroadcast(String),

    /// The definition table is unusable
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),
}

impl UnitError {
    pub fn unknown_unit(name: impl Into<String>) -> Self {
        UnitError::UnknownUnit(name.into())
    }

    pub fn dimension_mismatch(from: impl Into<String>, to: impl Into<String>) -> Self {
        UnitError::DimensionMismatch {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        UnitError::MalformedExpression(details.into())
    }

    pub fn invalid_construction(details: impl Into<String>) -> Self {
        UnitError::InvalidConstruction(details.into())
    }

    pub fn ambiguous_broadcast(details: impl Into<String>) -> Self {
        UnitError::AmbiguousBroadcast(details.into())
    }

    pub fn invalid_definition(details: impl Into<String>) -> Self {
        UnitError::InvalidDefinition(details.into())
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            UnitError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
            UnitError::DimensionMismatch { .. } => codes::DIMENSION_MISMATCH,
            UnitError::MalformedExpression(_) => codes::MALFORMED_EXPRESSION,
            UnitError::InvalidConstruction(_) => codes::INVALID_CONSTRUCTION,
            UnitError::AmbiguousBroadcast(_) => codes::AMBIGUOUS_BROADCAST,
            UnitError::InvalidDefinition(_) => codes::INVALID_DEFINITION,
        }
    }

    /// Suggestion for fixing the error, where one exists
    pub fn suggestion(&self) -> Option<String> {
        match self {
            UnitError::UnknownUnit(name) => {
                Some(format!("Register '{}' in the definition table or check spelling", name))
            }
            UnitError::DimensionMismatch { .. } => {
                Some("Convert both operands to units of the same dimension first".to_string())
            }
            UnitError::MalformedExpression(_) => {
                Some("Check parentheses and that every '*' or '/' has two operands".to_string())
            }
            UnitError::InvalidConstruction(_) => {
                Some("Resolve unit expressions through a Registry".to_string())
            }
            UnitError::AmbiguousBroadcast(_) => {
                Some("Combine list magnitudes element by element explicitly".to_string())
            }
            UnitError::InvalidDefinition(_) => None,
        }
    }

    /// Serializable form of this error
    pub fn report(&self) -> ErrorReport {
        ErrorReport::from(self)
    }
}

/// Structured error for transport across process boundaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl From<&UnitError> for ErrorReport {
    fn from(err: &UnitError) -> Self {
        ErrorReport {
            code: err.code().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion(),
        }
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

//! Metron Core - Fundamental types
//!
//! This crate provides the core types used throughout Metron:
//! - `Magnitude`: scalar or list numeric values with broadcasting
//! - `UnitError`: structured errors with machine-readable codes

mod error;
mod magnitude;

pub use error::{codes, ErrorReport, UnitError};
pub use magnitude::Magnitude;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{Magnitude, UnitError};
}

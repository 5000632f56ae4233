//! Metron Units - Unit Algebra and Quantities
//!
//! Compound units are kept as numerator/denominator lists of base units in
//! canonical order. Arithmetic cancels matching dimensions and tracks the
//! conversion factor that cancellation incurs.
//!
//! Layers:
//! - `BaseUnit`: one named unit with a multiplier to its dimension's base
//! - `Unit`: compound unit, simplification, conversion factors
//! - `Quantity`: magnitude (scalar or list) paired with a unit
//! - `Registry`: definition table loading, prefixes, derived units
//! - expressions: "4 kWh / mile", "(kelvin/watt)*hour"
//!
//! ```ignore
//! let units = Registry::builtin()?;
//! let distance = 10.0 * &units["meter"];
//! let cm = units.convert(&distance, "cm")?;
//! assert_eq!(cm, 1000.0 * &units["cm"]);
//! ```

mod base_unit;
mod definitions;
mod parse;
mod quantity;
mod registry;
mod resolved;
mod simplify;
mod unit;

pub use base_unit::{dimension_tag, BaseUnit, DIMENSIONLESS};
pub use definitions::{
    prefixed_name, DefinitionTable, DerivedSpec, DimensionDefs, UnitDefinition, PREFIX_KEY,
    PREFIX_SEPARATOR,
};
pub use parse::{evaluate, Token};
pub use quantity::Quantity;
pub use registry::Registry;
pub use resolved::Resolved;
pub use simplify::{simplify, Simplified};
pub use unit::Unit;

pub use metron_core::{codes, ErrorReport, Magnitude, UnitError};

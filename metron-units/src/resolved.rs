//! Result of resolving a unit name or expression

use crate::{Quantity, Unit};
use metron_core::UnitError;
use serde::Serialize;
use std::fmt;

/// Either a bare unit ("kWh / mile") or a quantity ("4 kWh / mile")
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Unit(Unit),
    Quantity(Quantity),
}

impl Resolved {
    pub fn as_unit(&self) -> Option<&Unit> {
        match self {
            Resolved::Unit(unit) => Some(unit),
            Resolved::Quantity(_) => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            Resolved::Unit(_) => None,
            Resolved::Quantity(quantity) => Some(quantity),
        }
    }

    /// The unit, whichever form this is
    pub fn unit(&self) -> &Unit {
        match self {
            Resolved::Unit(unit) => unit,
            Resolved::Quantity(quantity) => quantity.unit(),
        }
    }

    /// Fails if this is a quantity
    pub fn into_unit(self) -> Result<Unit, UnitError> {
        match self {
            Resolved::Unit(unit) => Ok(unit),
            Resolved::Quantity(quantity) => Err(UnitError::invalid_construction(format!(
                "expected a unit, got the quantity '{}'",
                quantity
            ))),
        }
    }

    /// A bare unit becomes a quantity of magnitude 1
    pub fn into_quantity(self) -> Quantity {
        match self {
            Resolved::Unit(unit) => Quantity::new(1.0, unit),
            Resolved::Quantity(quantity) => quantity,
        }
    }

    pub fn multiply(&self, other: &Resolved) -> Result<Resolved, UnitError> {
        Ok(match (self, other) {
            (Resolved::Unit(a), Resolved::Unit(b)) => Resolved::Unit(a.multiply(b)),
            (Resolved::Quantity(q), Resolved::Unit(u)) => Resolved::Quantity(q.mul_unit(u)),
            (Resolved::Unit(u), Resolved::Quantity(q)) => Resolved::Quantity(q.mul_unit(u)),
            (Resolved::Quantity(a), Resolved::Quantity(b)) => Resolved::Quantity(a.multiply(b)?),
        })
    }

    pub fn divide(&self, other: &Resolved) -> Result<Resolved, UnitError> {
        Ok(match (self, other) {
            (Resolved::Unit(a), Resolved::Unit(b)) => Resolved::Unit(a.divide(b)),
            (Resolved::Quantity(q), Resolved::Unit(u)) => Resolved::Quantity(q.div_unit(u)),
            (Resolved::Unit(u), Resolved::Quantity(q)) => {
                Resolved::Quantity(Quantity::new(1.0, u.clone()).divide(q)?)
            }
            (Resolved::Quantity(a), Resolved::Quantity(b)) => Resolved::Quantity(a.divide(b)?),
        })
    }
}

impl From<Unit> for Resolved {
    fn from(unit: Unit) -> Self {
        Resolved::Unit(unit)
    }
}

impl From<Quantity> for Resolved {
    fn from(quantity: Quantity) -> Self {
        Resolved::Quantity(quantity)
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Unit(unit) => write!(f, "{}", unit),
            Resolved::Quantity(quantity) => write!(f, "{}", quantity),
        }
    }
}

//! Quantity type - a magnitude with an associated unit

use crate::Unit;
use metron_core::{Magnitude, UnitError};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Div, Mul, Neg};

/// A physical quantity: a numeric magnitude with an associated unit
///
/// All dimensional bookkeeping is delegated to [`Unit`]. The only mutating
/// operation is [`Quantity::ito`].
#[derive(Debug, Clone, Serialize)]
pub struct Quantity {
    magnitude: Magnitude,
    unit: Unit,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(magnitude: impl Into<Magnitude>, unit: Unit) -> Self {
        Quantity {
            magnitude: magnitude.into(),
            unit,
        }
    }

    /// A dimensionless quantity sharing `like`'s registry
    pub fn dimensionless(magnitude: impl Into<Magnitude>, like: &Unit) -> Self {
        Quantity::new(magnitude, like.dimensionless())
    }

    pub fn magnitude(&self) -> &Magnitude {
        &self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn into_parts(self) -> (Magnitude, Unit) {
        (self.magnitude, self.unit)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.is_dimensionless()
    }

    pub fn compatible_with(&self, other: &Quantity) -> bool {
        self.unit.compatible_with(&other.unit)
    }

    // ========== Conversion ==========

    /// Convert to another unit
    pub fn to(&self, target: &Unit) -> Result<Quantity, UnitError> {
        Ok(Quantity::new(self.m_as(target)?, target.clone()))
    }

    /// Magnitude expressed in `target`, without building a quantity
    pub fn m_as(&self, target: &Unit) -> Result<Magnitude, UnitError> {
        if self.unit == *target {
            return Ok(self.magnitude.clone());
        }
        let factor = self.unit.conversion_factor(target)?;
        Ok(self.magnitude.scale(factor))
    }

    /// In-place version of [`Quantity::to`]
    pub fn ito(&mut self, target: &Unit) -> Result<(), UnitError> {
        let factor = self.unit.conversion_factor(target)?;
        self.magnitude = self.magnitude.scale(factor);
        self.unit = target.clone();
        Ok(())
    }

    // ========== Arithmetic ==========

    /// Add two quantities; the result is in `self`'s unit
    pub fn add(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let other = other.m_as(&self.unit)?;
        Ok(Quantity::new(self.magnitude.add(&other)?, self.unit.clone()))
    }

    /// Subtract two quantities; the result is in `self`'s unit
    pub fn sub(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let other = other.m_as(&self.unit)?;
        Ok(Quantity::new(self.magnitude.sub(&other)?, self.unit.clone()))
    }

    /// Add a bare number, treated as a dimensionless quantity
    ///
    /// Zero is accepted for any unit so sums can start from a zero
    /// accumulator.
    pub fn add_scalar(&self, value: f64) -> Result<Quantity, UnitError> {
        if value == 0.0 {
            return Ok(self.clone());
        }
        self.add(&Quantity::dimensionless(value, &self.unit))
    }

    /// Subtract a bare number, treated as a dimensionless quantity
    pub fn sub_scalar(&self, value: f64) -> Result<Quantity, UnitError> {
        if value == 0.0 {
            return Ok(self.clone());
        }
        self.sub(&Quantity::dimensionless(value, &self.unit))
    }

    /// Multiply two quantities, cancelling matching dimensions
    ///
    /// Cancelled units of different size fold their ratio into the
    /// magnitude: (10 km) * (1 / m) is 10000.
    pub fn multiply(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let magnitude = self.magnitude.mul(&other.magnitude)?;
        let (unit, factor) = self.unit.combine(&other.unit, false);
        Ok(Quantity::new(magnitude.scale(factor), unit))
    }

    /// Divide two quantities, cancelling matching dimensions
    pub fn divide(&self, other: &Quantity) -> Result<Quantity, UnitError> {
        let magnitude = self.magnitude.div(&other.magnitude)?;
        let (unit, factor) = self.unit.combine(&other.unit, true);
        Ok(Quantity::new(magnitude.scale(factor), unit))
    }

    /// Multiply by a bare unit, as if it were a quantity of magnitude 1
    pub fn mul_unit(&self, unit: &Unit) -> Quantity {
        let (unit, factor) = self.unit.combine(unit, false);
        Quantity::new(self.magnitude.scale(factor), unit)
    }

    /// Divide by a bare unit, as if it were a quantity of magnitude 1
    pub fn div_unit(&self, unit: &Unit) -> Quantity {
        let (unit, factor) = self.unit.combine(unit, true);
        Quantity::new(self.magnitude.scale(factor), unit)
    }

    /// Multiply the magnitude by a bare number
    pub fn scale(&self, factor: f64) -> Quantity {
        Quantity::new(self.magnitude.scale(factor), self.unit.clone())
    }

    /// Divide the magnitude by a bare number
    pub fn div_scalar(&self, divisor: f64) -> Quantity {
        Quantity::new(self.magnitude.map(|v| v / divisor), self.unit.clone())
    }

    /// Raise to a positive integer power by repeated multiplication
    pub fn pow(&self, n: u32) -> Result<Quantity, UnitError> {
        if n == 0 {
            return Err(UnitError::invalid_construction(format!(
                "power of '{}' must be a positive integer",
                self
            )));
        }
        let mut result = self.clone();
        for _ in 1..n {
            result = result.multiply(self)?;
        }
        Ok(result)
    }

    // ========== Numeric helpers ==========

    pub fn abs(&self) -> Quantity {
        self.map(f64::abs)
    }

    /// Round to `ndigits` decimal places
    pub fn round(&self, ndigits: i32) -> Quantity {
        let scale = 10f64.powi(ndigits);
        if !scale.is_finite() || scale == 0.0 {
            return self.clone();
        }
        self.map(|v| {
            let scaled = v * scale;
            if scaled.is_finite() {
                scaled.round() / scale
            } else {
                v
            }
        })
    }

    pub fn trunc(&self) -> Quantity {
        self.map(f64::trunc)
    }

    pub fn floor(&self) -> Quantity {
        self.map(f64::floor)
    }

    pub fn ceil(&self) -> Quantity {
        self.map(f64::ceil)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Quantity {
        Quantity::new(self.magnitude.map(f), self.unit.clone())
    }

    /// True when the magnitude is zero; valid because every unit here is
    /// zero-centred
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    // ========== List magnitudes ==========

    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    /// Element `index` of a list magnitude, sharing this unit
    pub fn get(&self, index: usize) -> Option<Quantity> {
        self.magnitude
            .get(index)
            .map(|v| Quantity::new(v, self.unit.clone()))
    }

    /// Per-element quantities sharing this unit
    pub fn iter(&self) -> impl Iterator<Item = Quantity> + '_ {
        self.magnitude
            .iter()
            .map(move |v| Quantity::new(v, self.unit.clone()))
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        if self.unit == other.unit {
            return self.magnitude == other.magnitude;
        }
        if !self.compatible_with(other) {
            return false;
        }
        match (other.m_as(&self.unit), self.m_as(&other.unit)) {
            (Ok(theirs), Ok(ours)) => theirs == self.magnitude || ours == other.magnitude,
            _ => false,
        }
    }
}

/// A bare number compares as a dimensionless quantity; zero equals zero of
/// any unit
impl PartialEq<f64> for Quantity {
    fn eq(&self, other: &f64) -> bool {
        if *other == 0.0 && self.is_zero() {
            return true;
        }
        self.is_dimensionless() && self.magnitude == *other
    }
}

impl PartialEq<Quantity> for f64 {
    fn eq(&self, other: &Quantity) -> bool {
        other == self
    }
}

impl PartialOrd for Quantity {
    /// Compares in `self`'s unit; `None` across dimensions or for lists
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let ours = self.magnitude.as_scalar()?;
        let theirs = other.m_as(&self.unit).ok()?.as_scalar()?;
        ours.partial_cmp(&theirs)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

// ========== Operators ==========

impl Mul<f64> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        self.scale(rhs)
    }
}

impl Mul<Quantity> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Quantity) -> Quantity {
        rhs.scale(self)
    }
}

impl Div<f64> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: f64) -> Quantity {
        self.div_scalar(rhs)
    }
}

impl Mul<&Unit> for Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Unit) -> Quantity {
        self.mul_unit(rhs)
    }
}

impl Mul<&Unit> for &Quantity {
    type Output = Quantity;

    fn mul(self, rhs: &Unit) -> Quantity {
        self.mul_unit(rhs)
    }
}

impl Div<&Unit> for Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Unit) -> Quantity {
        self.div_unit(rhs)
    }
}

impl Div<&Unit> for &Quantity {
    type Output = Quantity;

    fn div(self, rhs: &Unit) -> Quantity {
        self.div_unit(rhs)
    }
}

impl Neg for Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.map(|v| -v)
    }
}

impl Neg for &Quantity {
    type Output = Quantity;

    fn neg(self) -> Quantity {
        self.map(|v| -v)
    }
}

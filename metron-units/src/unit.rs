//! Compound units as numerator/denominator lists of base units

use crate::simplify::{canonical, simplify};
use crate::{BaseUnit, Quantity};
use metron_core::{Magnitude, UnitError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Div, Mul};
use std::sync::{Arc, OnceLock};

/// A compound unit in canonical form
///
/// Both sides are sorted into canonical order and never empty: a side with
/// no dimensions holds the single shared dimensionless base unit. Units are
/// immutable; arithmetic builds new ones.
#[derive(Clone)]
pub struct Unit {
    numerator: Vec<Arc<BaseUnit>>,
    denominator: Vec<Arc<BaseUnit>>,
    dimensionless: Arc<BaseUnit>,
    alias: Option<String>,
    dimensionality: OnceLock<String>,
    name: OnceLock<String>,
}

impl Unit {
    /// Build a unit from raw sides; dimensionless entries are dropped
    pub fn new(
        numerator: Vec<Arc<BaseUnit>>,
        denominator: Vec<Arc<BaseUnit>>,
        dimensionless: Arc<BaseUnit>,
    ) -> Self {
        let numerator = Self::normalize_side(&numerator, &dimensionless);
        let denominator = Self::normalize_side(&denominator, &dimensionless);
        Unit {
            numerator,
            denominator,
            dimensionless,
            alias: None,
            dimensionality: OnceLock::new(),
            name: OnceLock::new(),
        }
    }

    /// Give this unit a display name, e.g. "kWh" for kilowatt*hour
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self.name = OnceLock::new();
        self
    }

    fn normalize_side(side: &[Arc<BaseUnit>], dimensionless: &Arc<BaseUnit>) -> Vec<Arc<BaseUnit>> {
        let side = canonical(side);
        if side.is_empty() {
            vec![Arc::clone(dimensionless)]
        } else {
            side
        }
    }

    fn is_placeholder(side: &[Arc<BaseUnit>]) -> bool {
        side.iter().all(|u| u.is_dimensionless())
    }

    // ========== Accessors ==========

    pub fn numerator(&self) -> &[Arc<BaseUnit>] {
        &self.numerator
    }

    pub fn denominator(&self) -> &[Arc<BaseUnit>] {
        &self.denominator
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The dimensionless unit sharing this unit's registry
    pub fn dimensionless(&self) -> Unit {
        Unit::new(Vec::new(), Vec::new(), Arc::clone(&self.dimensionless))
    }

    pub fn is_dimensionless(&self) -> bool {
        Self::is_placeholder(&self.numerator) && Self::is_placeholder(&self.denominator)
    }

    /// Dimension signature, e.g. "[length]/[time]"
    pub fn dimensionality(&self) -> &str {
        self.dimensionality.get_or_init(|| {
            format!(
                "{}/{}",
                join(&self.numerator, BaseUnit::dimension),
                join(&self.denominator, BaseUnit::dimension)
            )
        })
    }

    /// Display name, e.g. "meter/second" or "(kW*hour)/mile"
    pub fn name(&self) -> &str {
        self.name.get_or_init(|| match &self.alias {
            Some(alias) => alias.clone(),
            None => self.compute_name(),
        })
    }

    fn compute_name(&self) -> String {
        let numerator = join(&self.numerator, BaseUnit::name);
        if Self::is_placeholder(&self.denominator) {
            return numerator;
        }
        format!(
            "{}/{}",
            parenthesize(numerator, self.numerator.len()),
            parenthesize(join(&self.denominator, BaseUnit::name), self.denominator.len())
        )
    }

    // ========== Algebra ==========

    pub fn multiply(&self, other: &Unit) -> Unit {
        self.combine(other, false).0
    }

    pub fn divide(&self, other: &Unit) -> Unit {
        self.combine(other, true).0
    }

    /// Multiply (or divide, when `invert` is set) and simplify, returning
    /// the factor a magnitude has to be scaled by to stay in the new unit
    pub(crate) fn combine(&self, other: &Unit, invert: bool) -> (Unit, f64) {
        if other.is_dimensionless() {
            return (self.clone(), 1.0);
        }
        if self.is_dimensionless() && !invert {
            return (other.clone(), 1.0);
        }

        let (numerator, denominator) = if invert {
            (
                concat(&self.numerator, &other.denominator),
                concat(&self.denominator, &other.numerator),
            )
        } else {
            (
                concat(&self.numerator, &other.numerator),
                concat(&self.denominator, &other.denominator),
            )
        };

        let reduced = simplify(&numerator, &denominator);
        let unit = Unit::new(reduced.numerator, reduced.denominator, Arc::clone(&self.dimensionless));
        (unit, reduced.factor)
    }

    /// Repeated multiplication; `n` must be at least 1
    pub fn pow(&self, n: u32) -> Result<Unit, UnitError> {
        if n == 0 {
            return Err(UnitError::invalid_construction(format!(
                "power of '{}' must be a positive integer",
                self.name()
            )));
        }
        let mut result = self.clone();
        for _ in 1..n {
            result = result.multiply(self);
        }
        Ok(result)
    }

    /// Factor k such that `value_in_self * k == value_in_target`
    pub fn conversion_factor(&self, target: &Unit) -> Result<f64, UnitError> {
        if self.dimensionality() != target.dimensionality() {
            return Err(UnitError::dimension_mismatch(self.name(), target.name()));
        }

        let mut factor = 1.0;
        for (from, to) in self.numerator.iter().zip(&target.numerator) {
            factor *= from.conversion_factor(to)?;
        }
        for (from, to) in self.denominator.iter().zip(&target.denominator) {
            factor /= from.conversion_factor(to)?;
        }
        Ok(factor)
    }

    /// True when a conversion between the two units is defined
    pub fn compatible_with(&self, other: &Unit) -> bool {
        self.dimensionality() == other.dimensionality()
    }

    /// A quantity of this unit
    pub fn quantity(&self, magnitude: impl Into<Magnitude>) -> Quantity {
        Quantity::new(magnitude, self.clone())
    }
}

fn join(side: &[Arc<BaseUnit>], field: fn(&BaseUnit) -> &str) -> String {
    side.iter().map(|u| field(u)).collect::<Vec<_>>().join("*")
}

fn parenthesize(part: String, entries: usize) -> String {
    if entries > 1 {
        format!("({})", part)
    } else {
        part
    }
}

fn concat(a: &[Arc<BaseUnit>], b: &[Arc<BaseUnit>]) -> Vec<Arc<BaseUnit>> {
    a.iter().chain(b).cloned().collect()
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.numerator == other.numerator && self.denominator == other.denominator
    }
}

impl Eq for Unit {}

impl Hash for Unit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.numerator.hash(state);
        self.denominator.hash(state);
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unit").field(&self.name()).finish()
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ========== Operators ==========

impl Mul<&Unit> for &Unit {
    type Output = Unit;

    fn mul(self, rhs: &Unit) -> Unit {
        self.multiply(rhs)
    }
}

impl Mul<Unit> for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        self.multiply(&rhs)
    }
}

impl Div<&Unit> for &Unit {
    type Output = Unit;

    fn div(self, rhs: &Unit) -> Unit {
        self.divide(rhs)
    }
}

impl Div<Unit> for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        self.divide(&rhs)
    }
}

impl Mul<f64> for &Unit {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        self.quantity(rhs)
    }
}

impl Mul<f64> for Unit {
    type Output = Quantity;

    fn mul(self, rhs: f64) -> Quantity {
        Quantity::new(rhs, self)
    }
}

impl Mul<&Unit> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: &Unit) -> Quantity {
        rhs.quantity(self)
    }
}

impl Mul<Unit> for f64 {
    type Output = Quantity;

    fn mul(self, rhs: Unit) -> Quantity {
        Quantity::new(self, rhs)
    }
}

impl Mul<Vec<f64>> for &Unit {
    type Output = Quantity;

    fn mul(self, rhs: Vec<f64>) -> Quantity {
        self.quantity(rhs)
    }
}

impl Mul<&Unit> for Vec<f64> {
    type Output = Quantity;

    fn mul(self, rhs: &Unit) -> Quantity {
        rhs.quantity(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        dl: Arc<BaseUnit>,
        meter: Arc<BaseUnit>,
        kilometer: Arc<BaseUnit>,
        second: Arc<BaseUnit>,
        hour: Arc<BaseUnit>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                dl: Arc::new(BaseUnit::dimensionless()),
                meter: Arc::new(BaseUnit::new("meter", "[length]", "meter", 1.0).unwrap()),
                kilometer: Arc::new(BaseUnit::new("kilometer", "[length]", "meter", 1000.0).unwrap()),
                second: Arc::new(BaseUnit::new("second", "[time]", "second", 1.0).unwrap()),
                hour: Arc::new(BaseUnit::new("hour", "[time]", "second", 3600.0).unwrap()),
            }
        }

        fn simple(&self, base: &Arc<BaseUnit>) -> Unit {
            Unit::new(vec![Arc::clone(base)], Vec::new(), Arc::clone(&self.dl))
        }
    }

    #[test]
    fn test_empty_sides_hold_dimensionless() {
        let f = Fixture::new();
        let m = f.simple(&f.meter);
        assert_eq!(m.denominator().len(), 1);
        assert!(m.denominator()[0].is_dimensionless());
        assert_eq!(m.dimensionality(), "[length]/[dimensionless]");
    }

    #[test]
    fn test_dimensionless_entries_filtered() {
        let f = Fixture::new();
        let unit = Unit::new(vec![Arc::clone(&f.dl), Arc::clone(&f.meter)], Vec::new(), Arc::clone(&f.dl));
        assert_eq!(unit, f.simple(&f.meter));
    }

    #[test]
    fn test_divide_self_is_dimensionless() {
        let f = Fixture::new();
        let m = f.simple(&f.meter);
        let ratio = &m / &m;
        assert!(ratio.is_dimensionless());
        assert_eq!(ratio, m.dimensionless());
        assert_eq!(ratio.dimensionality(), "[dimensionless]/[dimensionless]");
    }

    #[test]
    fn test_multiply_commutes() {
        let f = Fixture::new();
        let km = f.simple(&f.kilometer);
        let m = f.simple(&f.meter);
        let h = f.simple(&f.hour);
        assert_eq!(&km * &m, &m * &km);
        assert_eq!(&(&km * &h) * &m, &(&m * &km) * &h);
    }

    #[test]
    fn test_name() {
        let f = Fixture::new();
        let m = f.simple(&f.meter);
        let s = f.simple(&f.second);
        assert_eq!((&m / &s).name(), "meter/second");
        assert_eq!((&(&m * &m) / &s).name(), "(meter*meter)/second");
        assert_eq!((&m / &(&s * &f.simple(&f.hour))).name(), "meter/(second*hour)");
        assert_eq!(m.dimensionless().name(), "dimensionless");
        assert_eq!((&s.dimensionless() / &s).name(), "dimensionless/second");
    }

    #[test]
    fn test_alias_is_display_only() {
        let f = Fixture::new();
        let speed = (&f.simple(&f.kilometer) / &f.simple(&f.hour)).with_alias("kph");
        assert_eq!(speed.name(), "kph");
        assert_eq!(speed, &f.simple(&f.kilometer) / &f.simple(&f.hour));
    }

    #[test]
    fn test_multiply_by_dimensionless_keeps_alias() {
        let f = Fixture::new();
        let speed = (&f.simple(&f.kilometer) / &f.simple(&f.hour)).with_alias("kph");
        let product = &speed.dimensionless() * &speed;
        assert_eq!(product.name(), "kph");
    }

    #[test]
    fn test_conversion_factor() {
        let f = Fixture::new();
        let kph = &f.simple(&f.kilometer) / &f.simple(&f.hour);
        let mps = &f.simple(&f.meter) / &f.simple(&f.second);
        let k = kph.conversion_factor(&mps).unwrap();
        assert!((k - 1000.0 / 3600.0).abs() < 1e-12);
        assert_eq!(mps.conversion_factor(&mps).unwrap(), 1.0);
    }

    #[test]
    fn test_conversion_factor_mismatch() {
        let f = Fixture::new();
        let m = f.simple(&f.meter);
        let s = f.simple(&f.second);
        let err = m.conversion_factor(&s).unwrap_err();
        assert!(matches!(err, UnitError::DimensionMismatch { .. }));
        assert!(!m.compatible_with(&s));
        assert!(m.compatible_with(&f.simple(&f.kilometer)));
    }

    #[test]
    fn test_pow() {
        let f = Fixture::new();
        let m = f.simple(&f.meter);
        let cubed = m.pow(3).unwrap();
        assert_eq!(cubed.numerator().len(), 3);
        assert_eq!(cubed, &(&m * &m) * &m);
        assert_eq!(m.pow(1).unwrap(), m);
        assert!(m.pow(0).is_err());
    }

    #[test]
    fn test_combine_reports_factor() {
        let f = Fixture::new();
        let (unit, factor) = f.simple(&f.kilometer).combine(&f.simple(&f.meter), true);
        assert!(unit.is_dimensionless());
        assert_eq!(factor, 1000.0);
    }

    #[test]
    fn test_numeric_multiplication_makes_quantity() {
        let f = Fixture::new();
        let m = f.simple(&f.meter);
        let q = 10.0 * &m;
        assert_eq!(q.magnitude(), &Magnitude::Scalar(10.0));
        assert_eq!(q.unit(), &m);
    }
}

//! Atomic named units

use metron_core::UnitError;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Name of the dimensionless dimension and of its only unit
pub const DIMENSIONLESS: &str = "dimensionless";

/// Dimension tag for a dimension name, e.g. "length" -> "[length]"
pub fn dimension_tag(dimension: &str) -> String {
    format!("[{}]", dimension)
}

/// One named unit with its multiplier to the base unit of its dimension
///
/// Equality and hashing ignore `name`, so aliases such as "m" and "meter"
/// compare equal.
#[derive(Debug, Clone)]
pub struct BaseUnit {
    name: String,
    dimension: String,
    base_unit_name: String,
    multiplier: f64,
}

impl BaseUnit {
    /// Create a unit; the multiplier must be finite and positive
    pub fn new(
        name: &str,
        dimension: &str,
        base_unit_name: &str,
        multiplier: f64,
    ) -> Result<Self, UnitError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(UnitError::invalid_definition(format!(
                "multiplier for '{}' must be a positive number, got {}",
                name, multiplier
            )));
        }
        Ok(BaseUnit {
            name: name.to_string(),
            dimension: dimension.to_string(),
            base_unit_name: base_unit_name.to_string(),
            multiplier,
        })
    }

    /// The unit standing in for "no dimension"
    pub fn dimensionless() -> Self {
        BaseUnit {
            name: DIMENSIONLESS.to_string(),
            dimension: dimension_tag(DIMENSIONLESS),
            base_unit_name: DIMENSIONLESS.to_string(),
            multiplier: 1.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension tag, e.g. "[length]"
    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn base_unit_name(&self) -> &str {
        &self.base_unit_name
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dimension == dimension_tag(DIMENSIONLESS)
    }

    /// Factor k such that `value_in_self * k == value_in_target`
    pub fn conversion_factor(&self, target: &BaseUnit) -> Result<f64, UnitError> {
        if self.dimension != target.dimension {
            return Err(UnitError::dimension_mismatch(&self.name, &target.name));
        }
        Ok(self.multiplier / target.multiplier)
    }

    /// Canonical ordering within one side of a compound unit
    ///
    /// Dimension tag first, so same-dimension entries sit at the same
    /// position in units of equal signature; then base unit and multiplier
    /// so the order never depends on how the unit was assembled.
    pub fn canonical_cmp(&self, other: &BaseUnit) -> Ordering {
        self.dimension
            .cmp(&other.dimension)
            .then_with(|| self.base_unit_name.cmp(&other.base_unit_name))
            .then_with(|| self.multiplier.total_cmp(&other.multiplier))
    }
}

impl PartialEq for BaseUnit {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension
            && self.base_unit_name == other.base_unit_name
            && self.multiplier.to_bits() == other.multiplier.to_bits()
    }
}

impl Eq for BaseUnit {}

impl Hash for BaseUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dimension.hash(state);
        self.base_unit_name.hash(state);
        self.multiplier.to_bits().hash(state);
    }
}

impl fmt::Display for BaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn meter() -> BaseUnit {
        BaseUnit::new("meter", "[length]", "meter", 1.0).unwrap()
    }

    fn kilometer() -> BaseUnit {
        BaseUnit::new("kilometer", "[length]", "meter", 1000.0).unwrap()
    }

    fn second() -> BaseUnit {
        BaseUnit::new("second", "[time]", "second", 1.0).unwrap()
    }

    #[test]
    fn test_conversion_factor() {
        assert_eq!(kilometer().conversion_factor(&meter()).unwrap(), 1000.0);
        assert_eq!(meter().conversion_factor(&kilometer()).unwrap(), 0.001);
    }

    #[test]
    fn test_conversion_across_dimensions_fails() {
        let err = meter().conversion_factor(&second()).unwrap_err();
        assert!(matches!(err, UnitError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_alias_equality() {
        let m = BaseUnit::new("m", "[length]", "meter", 1.0).unwrap();
        assert_eq!(m, meter());
        assert_ne!(m, kilometer());

        let set: HashSet<BaseUnit> = [m, meter(), kilometer()].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        assert!(BaseUnit::new("nothing", "[length]", "meter", 0.0).is_err());
        assert!(BaseUnit::new("negative", "[length]", "meter", -1.0).is_err());
        assert!(BaseUnit::new("nan", "[length]", "meter", f64::NAN).is_err());
    }

    #[test]
    fn test_canonical_order() {
        assert_eq!(meter().canonical_cmp(&second()), Ordering::Less);
        assert_eq!(kilometer().canonical_cmp(&meter()), Ordering::Greater);
        assert_eq!(meter().canonical_cmp(&meter()), Ordering::Equal);
    }

    #[test]
    fn test_dimensionless() {
        let unit = BaseUnit::dimensionless();
        assert!(unit.is_dimensionless());
        assert_eq!(unit.dimension(), "[dimensionless]");
        assert!(!meter().is_dimensionless());
    }
}

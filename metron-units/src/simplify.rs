//! Cancellation of matching dimensions between numerator and denominator

use crate::BaseUnit;
use std::sync::Arc;

/// Output of [`simplify`]: the reduced sides and the factor incurred
#[derive(Debug, Clone, PartialEq)]
pub struct Simplified {
    pub numerator: Vec<Arc<BaseUnit>>,
    pub denominator: Vec<Arc<BaseUnit>>,
    /// Multiply a magnitude expressed in the raw unit by this to express
    /// it in the reduced unit
    pub factor: f64,
}

/// Drop dimensionless entries and sort into canonical order
pub(crate) fn canonical(units: &[Arc<BaseUnit>]) -> Vec<Arc<BaseUnit>> {
    let mut side: Vec<Arc<BaseUnit>> = units
        .iter()
        .filter(|u| !u.is_dimensionless())
        .cloned()
        .collect();
    side.sort_by(|a, b| a.canonical_cmp(b));
    side
}

/// Cancel numerator entries against denominator entries of the same dimension
///
/// Each denominator entry, in canonical order, removes the first remaining
/// numerator entry with the same dimension tag and multiplies the running
/// factor by the ratio between the two. Unmatched denominator entries are
/// kept. If the leftovers on both sides share the same dimension signature
/// position by position the whole unit collapses to dimensionless.
///
/// Matching is greedy: the first eligible entry wins. Either side may come
/// back empty; building a [`crate::Unit`] from the result restores the
/// dimensionless placeholder.
pub fn simplify(raw_numerator: &[Arc<BaseUnit>], raw_denominator: &[Arc<BaseUnit>]) -> Simplified {
    let mut numerator = canonical(raw_numerator);
    let mut denominator = Vec::with_capacity(raw_denominator.len());
    let mut factor = 1.0;

    for d in canonical(raw_denominator) {
        match numerator.iter().position(|n| n.dimension() == d.dimension()) {
            Some(index) => {
                let n = numerator.remove(index);
                // same dimension, so this is n.conversion_factor(d)
                factor *= n.multiplier() / d.multiplier();
            }
            None => denominator.push(d),
        }
    }

    if same_signature(&numerator, &denominator) {
        numerator.clear();
        denominator.clear();
    }

    Simplified {
        numerator,
        denominator,
        factor,
    }
}

fn same_signature(a: &[Arc<BaseUnit>], b: &[Arc<BaseUnit>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.dimension() == y.dimension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, dimension: &str, base: &str, multiplier: f64) -> Arc<BaseUnit> {
        Arc::new(BaseUnit::new(name, dimension, base, multiplier).unwrap())
    }

    fn meter() -> Arc<BaseUnit> {
        unit("meter", "[length]", "meter", 1.0)
    }

    fn kilometer() -> Arc<BaseUnit> {
        unit("kilometer", "[length]", "meter", 1000.0)
    }

    fn hour() -> Arc<BaseUnit> {
        unit("hour", "[time]", "second", 3600.0)
    }

    fn watt() -> Arc<BaseUnit> {
        unit("watt", "[power]", "watt", 1.0)
    }

    #[test]
    fn test_cancels_same_dimension() {
        let s = simplify(&[kilometer()], &[meter()]);
        assert!(s.numerator.is_empty());
        assert!(s.denominator.is_empty());
        assert_eq!(s.factor, 1000.0);
    }

    #[test]
    fn test_keeps_unmatched() {
        let s = simplify(&[watt(), hour()], &[meter(), hour()]);
        assert_eq!(s.numerator, vec![watt()]);
        assert_eq!(s.denominator, vec![meter()]);
        assert_eq!(s.factor, 1.0);
    }

    #[test]
    fn test_strips_dimensionless() {
        let dl = Arc::new(BaseUnit::dimensionless());
        let s = simplify(&[dl.clone(), meter()], &[dl]);
        assert_eq!(s.numerator, vec![meter()]);
        assert!(s.denominator.is_empty());
    }

    #[test]
    fn test_sorted_output() {
        let s = simplify(&[hour(), watt(), meter()], &[]);
        let dims: Vec<&str> = s.numerator.iter().map(|u| u.dimension()).collect();
        assert_eq!(dims, vec!["[length]", "[power]", "[time]"]);
    }

    #[test]
    fn test_first_match_wins() {
        // kilometer sorts after meter, so the meter entry is consumed first
        let s = simplify(&[kilometer(), meter()], &[meter()]);
        assert_eq!(s.numerator, vec![kilometer()]);
        assert_eq!(s.factor, 1.0);
    }
}

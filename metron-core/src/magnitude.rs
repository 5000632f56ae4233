//! Numeric magnitudes: a single value or a list broadcast elementwise

use crate::UnitError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The numeric part of a quantity
///
/// Scalar operations broadcast over arrays. Combining two arrays is
/// elementwise for addition and subtraction, and rejected for
/// multiplication and division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Magnitude {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Magnitude {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Magnitude::Scalar(v) => Some(*v),
            Magnitude::Array(_) => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            Magnitude::Scalar(_) => None,
            Magnitude::Array(values) => Some(values),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Magnitude::Array(_))
    }

    /// Number of elements; a scalar counts as one
    pub fn len(&self) -> usize {
        match self {
            Magnitude::Scalar(_) => 1,
            Magnitude::Array(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Magnitude::Array(values) if values.is_empty())
    }

    /// Element at `index`; a scalar only answers index 0
    pub fn get(&self, index: usize) -> Option<f64> {
        match self {
            Magnitude::Scalar(v) if index == 0 => Some(*v),
            Magnitude::Scalar(_) => None,
            Magnitude::Array(values) => values.get(index).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let slice: &[f64] = match self {
            Magnitude::Scalar(v) => std::slice::from_ref(v),
            Magnitude::Array(values) => values,
        };
        slice.iter().copied()
    }

    /// True when every element is zero
    pub fn is_zero(&self) -> bool {
        self.iter().all(|v| v == 0.0)
    }

    // ========== Arithmetic ==========

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Magnitude {
        match self {
            Magnitude::Scalar(v) => Magnitude::Scalar(f(*v)),
            Magnitude::Array(values) => Magnitude::Array(values.iter().map(|v| f(*v)).collect()),
        }
    }

    /// Multiply every element by `factor`
    pub fn scale(&self, factor: f64) -> Magnitude {
        self.map(|v| v * factor)
    }

    pub fn add(&self, other: &Magnitude) -> Result<Magnitude, UnitError> {
        self.zip_elementwise(other, "add", |a, b| a + b)
    }

    pub fn sub(&self, other: &Magnitude) -> Result<Magnitude, UnitError> {
        self.zip_elementwise(other, "subtract", |a, b| a - b)
    }

    pub fn mul(&self, other: &Magnitude) -> Result<Magnitude, UnitError> {
        self.broadcast_only(other, "multiply", |a, b| a * b)
    }

    pub fn div(&self, other: &Magnitude) -> Result<Magnitude, UnitError> {
        self.broadcast_only(other, "divide", |a, b| a / b)
    }

    fn zip_elementwise(
        &self,
        other: &Magnitude,
        op: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Magnitude, UnitError> {
        match (self, other) {
            (Magnitude::Array(a), Magnitude::Array(b)) => {
                if a.len() != b.len() {
                    return Err(UnitError::ambiguous_broadcast(format!(
                        "cannot {} lists of length {} and {}",
                        op,
                        a.len(),
                        b.len()
                    )));
                }
                Ok(Magnitude::Array(a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()))
            }
            _ => self.broadcast_only(other, op, f),
        }
    }

    fn broadcast_only(
        &self,
        other: &Magnitude,
        op: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Magnitude, UnitError> {
        match (self, other) {
            (Magnitude::Scalar(a), Magnitude::Scalar(b)) => Ok(Magnitude::Scalar(f(*a, *b))),
            (Magnitude::Array(_), Magnitude::Scalar(b)) => Ok(self.map(|a| f(a, *b))),
            (Magnitude::Scalar(a), Magnitude::Array(_)) => Ok(other.map(|b| f(*a, b))),
            (Magnitude::Array(_), Magnitude::Array(_)) => Err(UnitError::ambiguous_broadcast(
                format!("cannot {} two list magnitudes", op),
            )),
        }
    }
}

impl From<f64> for Magnitude {
    fn from(v: f64) -> Self {
        Magnitude::Scalar(v)
    }
}

impl From<i32> for Magnitude {
    fn from(v: i32) -> Self {
        Magnitude::Scalar(f64::from(v))
    }
}

impl From<Vec<f64>> for Magnitude {
    fn from(values: Vec<f64>) -> Self {
        Magnitude::Array(values)
    }
}

impl From<&[f64]> for Magnitude {
    fn from(values: &[f64]) -> Self {
        Magnitude::Array(values.to_vec())
    }
}

impl PartialEq<f64> for Magnitude {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Magnitude::Scalar(v) if v == other)
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Scalar(v) => write!(f, "{}", v),
            Magnitude::Array(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_broadcast() {
        let list = Magnitude::from(vec![1.0, 2.0, 3.0]);
        let doubled = list.mul(&Magnitude::Scalar(2.0)).unwrap();
        assert_eq!(doubled, Magnitude::Array(vec![2.0, 4.0, 6.0]));

        let halved = Magnitude::Scalar(6.0).div(&Magnitude::from(vec![2.0, 3.0])).unwrap();
        assert_eq!(halved, Magnitude::Array(vec![3.0, 2.0]));
    }

    #[test]
    fn test_list_times_list_is_ambiguous() {
        let a = Magnitude::from(vec![1.0, 2.0]);
        let b = Magnitude::from(vec![3.0, 4.0]);
        let err = a.mul(&b).unwrap_err();
        assert!(matches!(err, UnitError::AmbiguousBroadcast(_)));
        assert!(a.div(&b).is_err());
    }

    #[test]
    fn test_list_plus_list_is_elementwise() {
        let a = Magnitude::from(vec![1.0, 2.0]);
        let b = Magnitude::from(vec![3.0, 4.0]);
        assert_eq!(a.add(&b).unwrap(), Magnitude::Array(vec![4.0, 6.0]));

        let short = Magnitude::from(vec![1.0]);
        assert!(a.sub(&short).is_err());
    }

    #[test]
    fn test_is_zero() {
        assert!(Magnitude::Scalar(0.0).is_zero());
        assert!(Magnitude::from(vec![0.0, 0.0]).is_zero());
        assert!(!Magnitude::from(vec![0.0, 1.0]).is_zero());
    }

    #[test]
    fn test_get_and_len() {
        let scalar = Magnitude::Scalar(5.0);
        assert_eq!(scalar.len(), 1);
        assert_eq!(scalar.get(0), Some(5.0));
        assert_eq!(scalar.get(1), None);

        let list = Magnitude::from(vec![1.0, 2.0]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1), Some(2.0));
        assert_eq!(list.iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Magnitude::Scalar(4.0).to_string(), "4");
        assert_eq!(Magnitude::Scalar(0.5).to_string(), "0.5");
        assert_eq!(Magnitude::from(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
    }

    #[test]
    fn test_serde_untagged() {
        let json = serde_json::to_string(&Magnitude::from(vec![1.0, 2.0])).unwrap();
        assert_eq!(json, "[1.0,2.0]");
        let back: Magnitude = serde_json::from_str("3.5").unwrap();
        assert_eq!(back, Magnitude::Scalar(3.5));
    }
}

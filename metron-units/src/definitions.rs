//! Unit definition tables
//!
//! A table maps dimension names to unit definitions. Each unit is either a
//! plain multiplier relative to the dimension's base unit or a derived
//! composition of other named units:
//!
//! ```json
//! {
//!     "__prefixes__": { "kilo-": 1000, "k-": 1000 },
//!     "dimensionless": { "dimensionless": 1 },
//!     "length": { "meter": 1, "m": 1, "mile": 1609.344 },
//!     "time": { "second": 1, "hour": 3600 },
//!     "speed": { "mph": { "numerator": ["mile"], "denominator": ["hour"] } }
//! }
//! ```
//!
//! Entry order is preserved: the first unit of a dimension with a
//! multiplier of exactly 1 becomes its base unit.

use metron_core::UnitError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::path::Path;

/// Reserved top-level key holding the prefix table
pub const PREFIX_KEY: &str = "__prefixes__";

/// Separator that ends every prefix by convention, e.g. "kilo-"
pub const PREFIX_SEPARATOR: char = '-';

const BUILTIN_DEFINITIONS: &str = include_str!("units.json");

/// Definition of a single named unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitDefinition {
    /// Value of one of this unit in the dimension's base unit
    Multiplier(f64),
    /// Composition of other named units
    Derived(DerivedSpec),
}

/// Numerator/denominator lists of unit names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivedSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerator: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<Vec<String>>,
}

impl DerivedSpec {
    pub fn new(numerator: &[&str], denominator: &[&str]) -> Self {
        let names = |side: &[&str]| -> Option<Vec<String>> {
            Some(side.iter().map(|s| s.to_string()).collect())
        };
        DerivedSpec {
            numerator: names(numerator),
            denominator: names(denominator),
        }
    }

    /// Fails when neither side is given
    pub fn validate(&self, name: &str) -> Result<(), UnitError> {
        if self.numerator.is_none() && self.denominator.is_none() {
            return Err(UnitError::invalid_construction(format!(
                "derived unit '{}' has neither numerator nor denominator",
                name
            )));
        }
        Ok(())
    }

    pub fn numerator(&self) -> &[String] {
        self.numerator.as_deref().unwrap_or_default()
    }

    pub fn denominator(&self) -> &[String] {
        self.denominator.as_deref().unwrap_or_default()
    }
}

/// One dimension's units, in definition order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DimensionDefs {
    pub name: String,
    pub units: Vec<(String, UnitDefinition)>,
}

/// A complete definition table, in definition order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionTable {
    pub prefixes: Vec<(String, f64)>,
    pub dimensions: Vec<DimensionDefs>,
}

impl DefinitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the crate
    pub fn builtin() -> Result<Self, UnitError> {
        Self::from_json(BUILTIN_DEFINITIONS)
    }

    /// Read a table from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, UnitError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            UnitError::invalid_definition(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    /// Parse a table from JSON text
    pub fn from_json(text: &str) -> Result<Self, UnitError> {
        let root: Map<String, JsonValue> = serde_json::from_str(text)
            .map_err(|e| UnitError::invalid_definition(format!("malformed JSON: {}", e)))?;

        let mut table = DefinitionTable::new();
        for (key, value) in root {
            if key == PREFIX_KEY {
                table.prefixes = parse_prefixes(value)?;
                continue;
            }
            let units = match value {
                JsonValue::Object(units) => units,
                other => {
                    return Err(UnitError::invalid_definition(format!(
                        "dimension '{}' must map unit names to definitions, got {}",
                        key, other
                    )))
                }
            };
            let mut dimension = DimensionDefs {
                name: key,
                units: Vec::with_capacity(units.len()),
            };
            for (name, definition) in units {
                let definition: UnitDefinition = serde_json::from_value(definition).map_err(|e| {
                    UnitError::invalid_definition(format!("unit '{}': {}", name, e))
                })?;
                dimension.units.push((name, definition));
            }
            table.dimensions.push(dimension);
        }
        Ok(table)
    }

    /// Builder: add a prefix such as ("kilo-", 1000.0)
    pub fn with_prefix(mut self, prefix: &str, multiplier: f64) -> Self {
        self.prefixes.push((prefix.to_string(), multiplier));
        self
    }

    /// Builder: add a directly defined unit
    pub fn with_unit(self, dimension: &str, name: &str, multiplier: f64) -> Self {
        self.with_definition(dimension, name, UnitDefinition::Multiplier(multiplier))
    }

    /// Builder: add a derived unit
    pub fn with_derived(self, dimension: &str, name: &str, spec: DerivedSpec) -> Self {
        self.with_definition(dimension, name, UnitDefinition::Derived(spec))
    }

    fn with_definition(mut self, dimension: &str, name: &str, definition: UnitDefinition) -> Self {
        let index = match self.dimensions.iter().position(|d| d.name == dimension) {
            Some(index) => index,
            None => {
                self.dimensions.push(DimensionDefs {
                    name: dimension.to_string(),
                    units: Vec::new(),
                });
                self.dimensions.len() - 1
            }
        };
        self.dimensions[index].units.push((name.to_string(), definition));
        self
    }
}

fn parse_prefixes(value: JsonValue) -> Result<Vec<(String, f64)>, UnitError> {
    let prefixes = match value {
        JsonValue::Object(prefixes) => prefixes,
        other => {
            return Err(UnitError::invalid_definition(format!(
                "'{}' must map prefixes to multipliers, got {}",
                PREFIX_KEY, other
            )))
        }
    };
    prefixes
        .into_iter()
        .map(|(prefix, multiplier)| {
            check_prefix(&prefix)?;
            match multiplier.as_f64() {
                Some(m) => Ok((prefix, m)),
                None => Err(UnitError::invalid_definition(format!(
                    "prefix '{}' must have a numeric multiplier",
                    prefix
                ))),
            }
        })
        .collect()
}

/// A prefix must end with [`PREFIX_SEPARATOR`]
pub(crate) fn check_prefix(prefix: &str) -> Result<(), UnitError> {
    match prefix.strip_suffix(PREFIX_SEPARATOR) {
        Some(stem) if !stem.is_empty() => Ok(()),
        _ => Err(UnitError::invalid_definition(format!(
            "prefix '{}' must end with '{}'",
            prefix, PREFIX_SEPARATOR
        ))),
    }
}

/// Unit name produced by applying `prefix` to `name`
pub fn prefixed_name(prefix: &str, name: &str) -> String {
    let stem = prefix.strip_suffix(PREFIX_SEPARATOR).unwrap_or(prefix);
    format!("{}{}", stem, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        let table = DefinitionTable::from_json(
            r#"{
                "__prefixes__": { "kilo-": 1000 },
                "time": { "second": 1, "minute": 60 },
                "length": { "meter": 1, "m": 1 }
            }"#,
        )
        .unwrap();

        assert_eq!(table.prefixes, vec![("kilo-".to_string(), 1000.0)]);
        let names: Vec<&str> = table.dimensions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["time", "length"]);
        assert_eq!(table.dimensions[0].units[1].0, "minute");
        assert_eq!(table.dimensions[0].units[1].1, UnitDefinition::Multiplier(60.0));
    }

    #[test]
    fn test_parse_derived() {
        let table = DefinitionTable::from_json(
            r#"{ "frequency": { "Hz": { "denominator": ["second"] } } }"#,
        )
        .unwrap();
        match &table.dimensions[0].units[0].1 {
            UnitDefinition::Derived(spec) => {
                assert!(spec.numerator().is_empty());
                assert_eq!(spec.denominator(), ["second".to_string()]);
            }
            other => panic!("expected derived unit, got {:?}", other),
        }
    }

    #[test]
    fn test_derived_needs_a_side() {
        let spec = DerivedSpec::default();
        let err = spec.validate("nothing").unwrap_err();
        assert!(matches!(err, UnitError::InvalidConstruction(_)));
        assert!(DerivedSpec::new(&[], &["second"]).validate("Hz").is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DefinitionTable::from_json("{ not json"),
            Err(UnitError::InvalidDefinition(_))
        ));
        assert!(DefinitionTable::from_json(r#"{ "length": 3 }"#).is_err());
        assert!(DefinitionTable::from_json(r#"{ "length": { "meter": "one" } }"#).is_err());
        assert!(DefinitionTable::from_json(r#"{ "__prefixes__": { "kilo-": "k" } }"#).is_err());
    }

    #[test]
    fn test_builder() {
        let table = DefinitionTable::new()
            .with_prefix("kilo-", 1000.0)
            .with_unit("length", "meter", 1.0)
            .with_unit("time", "second", 1.0)
            .with_unit("length", "foot", 0.3048);
        assert_eq!(table.dimensions.len(), 2);
        assert_eq!(table.dimensions[0].units.len(), 2);
    }

    #[test]
    fn test_builtin_parses() {
        let table = DefinitionTable::builtin().unwrap();
        assert!(!table.prefixes.is_empty());
        assert!(table.dimensions.iter().any(|d| d.name == "dimensionless"));
    }

    #[test]
    fn test_prefixed_name() {
        assert_eq!(prefixed_name("kilo-", "meter"), "kilometer");
        assert_eq!(prefixed_name("k-", "W"), "kW");
    }

    #[test]
    fn test_prefix_without_separator_rejected() {
        let err = DefinitionTable::from_json(r#"{ "__prefixes__": { "kilo": 1000 } }"#).unwrap_err();
        assert!(matches!(err, UnitError::InvalidDefinition(_)));
        assert!(err.to_string().contains("kilo"));

        assert!(check_prefix("kilo-").is_ok());
        assert!(check_prefix("mega").is_err());
        assert!(check_prefix("-").is_err());
    }
}

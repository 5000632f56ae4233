//! Unit registry built from a definition table
//!
//! Construction expands prefixes, picks a base unit per dimension, resolves
//! derived units and binds one [`Unit`] per name. After that the registry
//! is read-only apart from the expression cache.

use crate::base_unit::{dimension_tag, DIMENSIONLESS};
use crate::definitions::{check_prefix, prefixed_name, DefinitionTable, DerivedSpec, DimensionDefs, UnitDefinition};
use crate::{parse, BaseUnit, Quantity, Resolved, Unit};
use metron_core::UnitError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Named units and the expression evaluator over them
///
/// Each registry owns an independent namespace; units from different
/// registries never share a dimensionless placeholder.
pub struct Registry {
    base_units: HashMap<String, Arc<BaseUnit>>,
    base_unit_names: HashMap<String, String>,
    multipliers: HashMap<String, HashMap<String, f64>>,
    derived: HashMap<String, DerivedSpec>,
    units: HashMap<String, Unit>,
    dimensionless: Arc<BaseUnit>,
    cache: RwLock<HashMap<String, Resolved>>,
}

impl Registry {
    /// Build a registry from a definition table
    pub fn new(table: DefinitionTable) -> Result<Self, UnitError> {
        check_dimensionless(&table)?;
        for (prefix, _) in &table.prefixes {
            check_prefix(prefix)?;
        }

        let mut registry = Registry {
            base_units: HashMap::new(),
            base_unit_names: HashMap::new(),
            multipliers: HashMap::new(),
            derived: HashMap::new(),
            units: HashMap::new(),
            dimensionless: Arc::new(BaseUnit::dimensionless()),
            cache: RwLock::new(HashMap::new()),
        };

        for dimension in &table.dimensions {
            registry.load_dimension(dimension, &table.prefixes)?;
        }
        registry.build_units()?;

        debug!(
            dimensions = registry.base_unit_names.len(),
            base_units = registry.base_units.len(),
            derived_units = registry.derived.len(),
            "unit registry built"
        );
        Ok(registry)
    }

    /// Registry over the definition table shipped with the crate
    pub fn builtin() -> Result<Self, UnitError> {
        Self::new(DefinitionTable::builtin()?)
    }

    /// Registry over a JSON definition table
    pub fn from_json(text: &str) -> Result<Self, UnitError> {
        Self::new(DefinitionTable::from_json(text)?)
    }

    // ========== Construction ==========

    fn load_dimension(&mut self, defs: &DimensionDefs, prefixes: &[(String, f64)]) -> Result<(), UnitError> {
        let direct: Vec<(&str, f64)> = defs
            .units
            .iter()
            .filter_map(|(name, definition)| match definition {
                UnitDefinition::Multiplier(m) => Some((name.as_str(), *m)),
                UnitDefinition::Derived(_) => None,
            })
            .collect();

        if defs.name == DIMENSIONLESS {
            self.load_dimensionless(&direct)?;
        } else if !direct.is_empty() {
            let base_name = match direct.iter().find(|(_, m)| *m == 1.0) {
                Some((name, _)) => name.to_string(),
                None => {
                    return Err(UnitError::invalid_definition(format!(
                        "no base unit (multiplier 1) defined for dimension '{}'",
                        defs.name
                    )))
                }
            };
            let tag = dimension_tag(&defs.name);

            for (name, multiplier) in &direct {
                let unit = BaseUnit::new(name, &tag, &base_name, *multiplier)?;
                self.register(&defs.name, Arc::new(unit));

                for (prefix, prefix_multiplier) in prefixes {
                    let expanded = prefixed_name(prefix, name);
                    let unit = BaseUnit::new(&expanded, &tag, &base_name, prefix_multiplier * multiplier)?;
                    self.register(&defs.name, Arc::new(unit));
                }
            }
            self.base_unit_names.insert(defs.name.clone(), base_name);
        }

        for (name, definition) in &defs.units {
            if let UnitDefinition::Derived(spec) = definition {
                spec.validate(name)?;
                if self.is_defined(name) {
                    warn!(unit = %name, dimension = %defs.name, "duplicate unit name, replacing earlier definition");
                    self.forget(name);
                }
                self.derived.insert(name.clone(), spec.clone());
            }
        }
        Ok(())
    }

    /// The dimensionless dimension only holds aliases of the shared
    /// placeholder; prefixes do not apply to it
    fn load_dimensionless(&mut self, direct: &[(&str, f64)]) -> Result<(), UnitError> {
        for (name, multiplier) in direct {
            if *multiplier != 1.0 {
                return Err(UnitError::invalid_definition(format!(
                    "dimensionless unit '{}' must have multiplier 1, got {}",
                    name, multiplier
                )));
            }
            if *name == DIMENSIONLESS {
                self.register(DIMENSIONLESS, Arc::clone(&self.dimensionless));
            } else {
                let alias = BaseUnit::new(name, &dimension_tag(DIMENSIONLESS), DIMENSIONLESS, 1.0)?;
                self.register(DIMENSIONLESS, Arc::new(alias));
            }
        }
        self.base_unit_names
            .insert(DIMENSIONLESS.to_string(), DIMENSIONLESS.to_string());
        Ok(())
    }

    fn register(&mut self, dimension: &str, unit: Arc<BaseUnit>) {
        let name = unit.name().to_string();
        if self.is_defined(&name) {
            warn!(unit = %name, dimension, "duplicate unit name, replacing earlier definition");
            self.forget(&name);
        }
        self.multipliers
            .entry(dimension.to_string())
            .or_default()
            .insert(name.clone(), unit.multiplier());
        self.base_units.insert(name, unit);
    }

    fn is_defined(&self, name: &str) -> bool {
        self.base_units.contains_key(name) || self.derived.contains_key(name)
    }

    fn forget(&mut self, name: &str) {
        self.base_units.remove(name);
        self.derived.remove(name);
        for table in self.multipliers.values_mut() {
            table.remove(name);
        }
    }

    fn build_units(&mut self) -> Result<(), UnitError> {
        let mut units: HashMap<String, Unit> = self
            .base_units
            .iter()
            .map(|(name, base)| {
                let unit = Unit::new(vec![Arc::clone(base)], Vec::new(), Arc::clone(&self.dimensionless));
                (name.clone(), unit)
            })
            .collect();

        let mut names: Vec<String> = self.derived.keys().cloned().collect();
        names.sort();
        for name in names {
            self.build_derived(&name, &mut units, &mut Vec::new())?;
        }

        self.units = units;
        Ok(())
    }

    fn build_derived(
        &self,
        name: &str,
        units: &mut HashMap<String, Unit>,
        resolving: &mut Vec<String>,
    ) -> Result<Unit, UnitError> {
        if let Some(unit) = units.get(name) {
            return Ok(unit.clone());
        }
        let spec = self
            .derived
            .get(name)
            .ok_or_else(|| UnitError::unknown_unit(name))?;
        if resolving.iter().any(|n| n == name) {
            return Err(UnitError::invalid_definition(format!(
                "derived unit '{}' is defined in terms of itself ({} -> {})",
                name,
                resolving.join(" -> "),
                name
            )));
        }
        resolving.push(name.to_string());

        let mut unit = self.dimensionless();
        let mut factor = 1.0;
        let parts = spec
            .numerator()
            .iter()
            .map(|part| (part, false))
            .chain(spec.denominator().iter().map(|part| (part, true)));
        for (part, invert) in parts {
            let (combined, f) = unit.combine(&self.build_derived(part, units, resolving)?, invert);
            unit = combined;
            factor *= f;
        }
        resolving.pop();

        // a bare unit has nowhere to keep a cancellation factor
        if factor != 1.0 {
            return Err(UnitError::invalid_definition(format!(
                "derived unit '{}' cancels units of different size (factor {})",
                name, factor
            )));
        }
        let unit = unit.with_alias(name);
        units.insert(name.to_string(), unit.clone());
        Ok(unit)
    }

    // ========== Lookup ==========

    /// Resolve a unit name or expression; results are memoized
    pub fn get_unit(&self, expr: &str) -> Result<Resolved, UnitError> {
        self.get_unit_with(expr, true)
    }

    /// Resolve a name, falling back to expression parsing only if allowed
    pub fn get_unit_with(&self, expr: &str, allow_expression: bool) -> Result<Resolved, UnitError> {
        if let Some(unit) = self.units.get(expr) {
            return Ok(Resolved::Unit(unit.clone()));
        }
        if !allow_expression {
            return Err(UnitError::unknown_unit(expr));
        }
        if let Some(hit) = self.cache.read().get(expr) {
            return Ok(hit.clone());
        }

        trace!(expression = expr, "unit cache miss");
        let resolved = parse::evaluate(self, expr)?;
        self.cache.write().insert(expr.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Evaluate an expression such as "4 kWh / mile"
    pub fn parse(&self, expr: &str) -> Result<Resolved, UnitError> {
        self.get_unit(expr)
    }

    /// Resolve an expression that must denote a bare unit
    pub fn unit(&self, expr: &str) -> Result<Unit, UnitError> {
        self.get_unit(expr)?.into_unit()
    }

    /// Resolve an expression as a quantity; bare units get magnitude 1
    pub fn quantity(&self, expr: &str) -> Result<Quantity, UnitError> {
        Ok(self.get_unit(expr)?.into_quantity())
    }

    /// Convert `quantity` to the unit named by `target`
    pub fn convert(&self, quantity: &Quantity, target: &str) -> Result<Quantity, UnitError> {
        quantity.to(&self.unit(target)?)
    }

    /// A registered unit by exact name, without expression parsing
    pub fn lookup(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// Names of every registered unit, including prefixed and derived ones
    pub fn unit_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn dimensionless(&self) -> Unit {
        Unit::new(Vec::new(), Vec::new(), Arc::clone(&self.dimensionless))
    }

    pub fn base_unit(&self, name: &str) -> Option<&Arc<BaseUnit>> {
        self.base_units.get(name)
    }

    /// Name of the base unit of `dimension` (without brackets)
    pub fn base_unit_name(&self, dimension: &str) -> Option<&str> {
        self.base_unit_names.get(dimension).map(|s| s.as_str())
    }

    /// Names of dimensions that have a base unit
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.base_unit_names.keys().map(|s| s.as_str())
    }

    /// Unit name -> multiplier table of one dimension
    pub fn multipliers(&self, dimension: &str) -> Option<&HashMap<String, f64>> {
        self.multipliers.get(dimension)
    }

    pub fn derived_spec(&self, name: &str) -> Option<&DerivedSpec> {
        self.derived.get(name)
    }
}

impl Index<&str> for Registry {
    type Output = Unit;

    /// Panics if `name` is not registered. Use [`Registry::lookup`] or
    /// [`Registry::get_unit_with`] with `allow_expression = false` for a
    /// fallible lookup.
    fn index(&self, name: &str) -> &Unit {
        match self.units.get(name) {
            Some(unit) => unit,
            None => panic!("unknown unit: {}", name),
        }
    }
}

fn check_dimensionless(table: &DefinitionTable) -> Result<(), UnitError> {
    let defined = table
        .dimensions
        .iter()
        .filter(|d| d.name == DIMENSIONLESS)
        .flat_map(|d| d.units.iter())
        .any(|(name, definition)| name == DIMENSIONLESS && *definition == UnitDefinition::Multiplier(1.0));
    if defined {
        Ok(())
    } else {
        Err(UnitError::invalid_definition(
            "a 'dimensionless' unit with multiplier 1 must be defined in the 'dimensionless' dimension",
        ))
    }
}

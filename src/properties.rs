//! Type system configuration.
//!
//! Properties are plain numeric settings keyed by [`SystemProperty`], the
//! same way engine properties work: every property has a default, and a
//! [`SystemProperties`] table only stores what was overridden.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemProperty {
    /// Install the built-in exception family when the type system is created.
    InstallBuiltins,
    /// Reject method calls whose argument count differs from the declared arity.
    StrictCallArity,
    /// Maximum inheritance depth of a declared type. 0 means unlimited.
    MaxInheritanceDepth,
}

impl SystemProperty {
    pub fn default_value(&self) -> usize {
        match self {
            SystemProperty::InstallBuiltins => 1,
            SystemProperty::StrictCallArity => 0,
            SystemProperty::MaxInheritanceDepth => 0,
        }
    }
}

/// Overrides on top of [`SystemProperty::default_value`].
#[derive(Debug, Clone, Default)]
pub struct SystemProperties {
    values: FxHashMap<SystemProperty, usize>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style override.
    pub fn with(mut self, property: SystemProperty, value: usize) -> Self {
        self.set(property, value);
        self
    }

    pub fn get(&self, property: SystemProperty) -> usize {
        self.values
            .get(&property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    /// Override a property, returning the previous effective value.
    pub fn set(&mut self, property: SystemProperty, value: usize) -> usize {
        let previous = self.get(property);
        self.values.insert(property, value);
        previous
    }

    /// Drop an override.
    pub fn reset(&mut self, property: SystemProperty) {
        self.values.remove(&property);
    }

    pub fn is_enabled(&self, property: SystemProperty) -> bool {
        self.get(property) != 0
    }

    /// The configured depth cap, if any.
    pub fn max_inheritance_depth(&self) -> Option<usize> {
        match self.get(SystemProperty::MaxInheritanceDepth) {
            0 => None,
            limit => Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let props = SystemProperties::new();
        assert!(props.is_enabled(SystemProperty::InstallBuiltins));
        assert!(!props.is_enabled(SystemProperty::StrictCallArity));
        assert_eq!(props.max_inheritance_depth(), None);
    }

    #[test]
    fn override_and_reset() {
        let mut props = SystemProperties::new().with(SystemProperty::MaxInheritanceDepth, 3);
        assert_eq!(props.max_inheritance_depth(), Some(3));

        assert_eq!(props.set(SystemProperty::StrictCallArity, 1), 0);
        assert!(props.is_enabled(SystemProperty::StrictCallArity));

        props.reset(SystemProperty::MaxInheritanceDepth);
        assert_eq!(props.get(SystemProperty::MaxInheritanceDepth), 0);
    }
}

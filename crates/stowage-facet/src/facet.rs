use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use stowage_plan::ConstructionPlan;
use stowage_types::{ComponentRef, Literal, Role};

/// Where a parameter facet takes its value from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueSource {
    /// A value fixed at declaration time.
    Literal(Literal),
    /// Looked up in the configuration provider at resolution time.
    ConfigKey(String),
    /// Use the target's declared default.
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Literal(lit) => write!(f, "{lit}"),
            ValueSource::ConfigKey(key) => write!(f, "config[{key}]"),
            ValueSource::Default => f.write_str("default"),
        }
    }
}

/// Use `plan` as the component for `role`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentFacet {
    pub role: Role,
    pub plan: ConstructionPlan,
}

impl ComponentFacet {
    pub fn new(role: Role, component: ComponentRef) -> Self {
        Self {
            role,
            plan: ConstructionPlan::new(component),
        }
    }

    pub fn with_plan(role: Role, plan: ConstructionPlan) -> Self {
        Self { role, plan }
    }
}

/// An extra component that receives the value of a parameter facet.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImpliedTarget {
    pub component: ComponentRef,
    /// Parameter name on the implied component; `None` reuses the facet's.
    pub parameter: Option<String>,
}

/// Bind one named constructor argument on one or more target components.
///
/// The value is produced once per facet and handed to every target and
/// every implied target, so two components configured by the same facet
/// can never observe different values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterFacet {
    pub targets: BTreeSet<ComponentRef>,
    pub parameter: String,
    pub source: ValueSource,
    #[serde(default)]
    pub implied: Vec<ImpliedTarget>,
}

impl ParameterFacet {
    pub fn new(target: ComponentRef, parameter: impl Into<String>, source: ValueSource) -> Self {
        Self {
            targets: BTreeSet::from([target]),
            parameter: parameter.into(),
            source,
            implied: Vec::new(),
        }
    }

    pub fn literal(
        target: ComponentRef,
        parameter: impl Into<String>,
        value: impl Into<Literal>,
    ) -> Self {
        Self::new(target, parameter, ValueSource::Literal(value.into()))
    }

    pub fn config(target: ComponentRef, parameter: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(target, parameter, ValueSource::ConfigKey(key.into()))
    }

    /// Also configure `target`, which must accept the same parameter.
    pub fn also_target(mut self, target: ComponentRef) -> Self {
        self.targets.insert(target);
        self
    }

    /// Propagate the value to `component` under the same parameter name.
    pub fn implies(mut self, component: ComponentRef) -> Self {
        self.implied.push(ImpliedTarget {
            component,
            parameter: None,
        });
        self
    }

    /// Propagate the value to `parameter` on `component`.
    pub fn implies_as(mut self, component: ComponentRef, parameter: impl Into<String>) -> Self {
        self.implied.push(ImpliedTarget {
            component,
            parameter: Some(parameter.into()),
        });
        self
    }

    /// Every (component, parameter) pair this facet binds, primary targets
    /// first.
    pub fn bindings(&self) -> impl Iterator<Item = (&ComponentRef, &str)> {
        let primary = self.targets.iter().map(move |t| (t, self.parameter.as_str()));
        let implied = self.implied.iter().map(move |i| {
            (
                &i.component,
                i.parameter.as_deref().unwrap_or(self.parameter.as_str()),
            )
        });
        primary.chain(implied)
    }
}

/// A declarative piece of store configuration attached to a contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Facet {
    Component(ComponentFacet),
    Parameter(ParameterFacet),
}

impl From<ComponentFacet> for Facet {
    fn from(facet: ComponentFacet) -> Self {
        Facet::Component(facet)
    }
}

impl From<ParameterFacet> for Facet {
    fn from(facet: ParameterFacet) -> Self {
        Facet::Parameter(facet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_types::names;

    #[test]
    fn bindings_cover_targets_and_implied() {
        let facet = ParameterFacet::literal(names::LOCAL_FS, "rootPath", "/data")
            .implies(names::FILE_STORE)
            .implies_as(names::MEMORY_TABLE, "table");
        let pairs: Vec<_> = facet
            .bindings()
            .map(|(c, p)| (c.as_str().to_string(), p.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("local-fs".to_string(), "rootPath".to_string()),
                ("file-store".to_string(), "rootPath".to_string()),
                ("memory-table".to_string(), "table".to_string()),
            ]
        );
    }

    #[test]
    fn value_source_display() {
        assert_eq!(ValueSource::ConfigKey("orders.root".into()).to_string(), "config[orders.root]");
        assert_eq!(ValueSource::Literal(Literal::Int(3)).to_string(), "3");
    }
}

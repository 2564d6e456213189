use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stowage_types::{names, ComponentRef, Literal, Role};

// ---------------------------------------------------------------------------
// PlanArg
// ---------------------------------------------------------------------------

/// One argument of a [`ConstructionPlan`]: a literal value or a nested plan
/// for a sub-object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanArg {
    Literal(Literal),
    Plan(Arc<ConstructionPlan>),
}

impl PlanArg {
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            PlanArg::Literal(lit) => Some(lit),
            PlanArg::Plan(_) => None,
        }
    }

    pub fn as_plan(&self) -> Option<&ConstructionPlan> {
        match self {
            PlanArg::Plan(plan) => Some(plan),
            PlanArg::Literal(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ConstructionPlan
// ---------------------------------------------------------------------------

/// Immutable description of a component still to be constructed.
///
/// A plan names a component and its arguments, in insertion order. Every
/// `with_*` operation returns a new plan and leaves the receiver untouched;
/// nested plans sit behind `Arc` so unmodified subtrees are shared between
/// the old and the new plan.
///
/// Plans cannot fail to build. Unknown components, undeclared arguments and
/// missing required values are detected when a plan is resolved.
///
/// The root of a store plan is a [`names::STORE_CHAIN`] node whose arguments
/// are the per-role sub-plans, keyed by [`Role::as_str`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPlan {
    component: ComponentRef,
    #[serde(default)]
    arguments: Arc<Vec<(String, PlanArg)>>,
}

impl ConstructionPlan {
    /// A plan for `component` with no arguments.
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            arguments: Arc::new(Vec::new()),
        }
    }

    /// An empty store chain.
    pub fn chain() -> Self {
        Self::new(names::STORE_CHAIN)
    }

    pub fn component(&self) -> &ComponentRef {
        &self.component
    }

    /// Whether this is the root node of a store chain.
    pub fn is_chain(&self) -> bool {
        self.component == names::STORE_CHAIN
    }

    /// Arguments in insertion order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &PlanArg)> {
        self.arguments.iter().map(|(name, arg)| (name.as_str(), arg))
    }

    pub fn argument(&self, name: &str) -> Option<&PlanArg> {
        self.arguments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, arg)| arg)
    }

    /// The literal bound to `name`, if any.
    pub fn literal(&self, name: &str) -> Option<&Literal> {
        self.argument(name).and_then(PlanArg::as_literal)
    }

    /// The nested plan bound to `name`, if any.
    pub fn nested(&self, name: &str) -> Option<&ConstructionPlan> {
        self.argument(name).and_then(PlanArg::as_plan)
    }

    /// The shared handle of a nested plan.
    pub fn nested_arc(&self, name: &str) -> Option<&Arc<ConstructionPlan>> {
        match self.argument(name)? {
            PlanArg::Plan(plan) => Some(plan),
            PlanArg::Literal(_) => None,
        }
    }

    /// The sub-plan chosen for `role` in a chain plan.
    pub fn role(&self, role: Role) -> Option<&ConstructionPlan> {
        self.nested(role.as_str())
    }

    /// Roles that have a sub-plan, in [`Role::ALL`] order.
    pub fn roles(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.role(*r).is_some())
    }

    /// Choose `component` for `role`.
    ///
    /// Keeps the current sub-plan, arguments included, when it already
    /// names `component`.
    pub fn with_component(&self, role: Role, component: ComponentRef) -> Self {
        if self.role(role).map(|p| p.component()) == Some(&component) {
            return self.clone();
        }
        self.with_nested_component(role.as_str(), component)
    }

    /// Bind `name` to a literal, replacing any previous binding in place.
    pub fn with_argument(&self, name: &str, value: impl Into<Literal>) -> Self {
        self.with_arg(name, PlanArg::Literal(value.into()))
    }

    /// Bind `name` to a fresh plan for `component`.
    pub fn with_nested_component(&self, name: &str, component: ComponentRef) -> Self {
        self.with_nested(name, ConstructionPlan::new(component))
    }

    /// Bind `name` to an existing plan.
    pub fn with_nested(&self, name: &str, plan: ConstructionPlan) -> Self {
        self.with_arg(name, PlanArg::Plan(Arc::new(plan)))
    }

    /// Replace the nested plan at `name` with `f(nested)`. Returns an
    /// unchanged copy when `name` holds no plan.
    pub fn map_nested(
        &self,
        name: &str,
        f: impl FnOnce(&ConstructionPlan) -> ConstructionPlan,
    ) -> Self {
        match self.nested(name) {
            Some(nested) => {
                let updated = f(nested);
                self.with_nested(name, updated)
            }
            None => self.clone(),
        }
    }

    /// Bind a literal on the sub-plan of `role`.
    pub fn with_role_argument(&self, role: Role, name: &str, value: impl Into<Literal>) -> Self {
        let value = value.into();
        self.map_nested(role.as_str(), |p| p.with_argument(name, value))
    }

    fn with_arg(&self, name: &str, arg: PlanArg) -> Self {
        let mut arguments = Vec::with_capacity(self.arguments.len() + 1);
        let mut replaced = false;
        for (n, a) in self.arguments.iter() {
            if n == name {
                arguments.push((n.clone(), arg.clone()));
                replaced = true;
            } else {
                arguments.push((n.clone(), a.clone()));
            }
        }
        if !replaced {
            arguments.push((name.to_string(), arg));
        }
        Self {
            component: self.component.clone(),
            arguments: Arc::new(arguments),
        }
    }
}

/// Single-line form for logs: `file-store(extension="json", transport=memory)`.
impl fmt::Display for ConstructionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.component)?;
        if self.arguments.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, arg)) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match arg {
                PlanArg::Literal(lit) => write!(f, "{name}={lit}")?,
                PlanArg::Plan(plan) => write!(f, "{name}={plan}")?,
            }
        }
        f.write_str(")")
    }
}

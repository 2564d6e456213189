//! Merging facets into a plan.
//!
//! Precedence for a parameter, highest first:
//!
//! 1. an argument written into the plan
//! 2. the winning facet's literal
//! 3. the winning facet's configuration key, if the provider has it
//! 4. the parameter's declared default
//!
//! otherwise resolution fails with `MissingRequiredParameter`. Among facets
//! binding the same (component, parameter) pair the closest declaration
//! wins; two literals with different values conflict wherever they are
//! declared, and differing bindings at the same depth conflict.

use std::collections::{BTreeMap, HashMap};

use stowage_facet::{
    component_bindings, parameter_bindings, ConfigProvider, Facet, ScannedFacet, ValueSource,
};
use stowage_plan::{ConstructionPlan, PlanArg};
use stowage_types::{names, ComponentRef, Literal, Role};
use tracing::debug;

use crate::catalog::GenericCatalog;
use crate::error::{ResolveError, ResolveResult};
use crate::registry::{Capability, ComponentRegistry, ComponentSpec, ParamKind};

/// Hooks that are always present, with their default components.
pub const DEFAULT_HOOKS: [(Role, ComponentRef); 3] = [
    (Role::MutationHook, names::IDENTITY),
    (Role::ObservationHook, names::NOOP),
    (Role::ValidationHook, names::ACCEPT_ALL),
];

/// Constructor signatures visible to one contract.
pub(crate) trait SpecSource {
    /// Spec of `component` filling `role`.
    fn role_spec(&self, role: Role, component: &ComponentRef) -> ResolveResult<&ComponentSpec>;

    /// Spec of `component` nested under a component of `role`.
    fn nested_spec(
        &self,
        role: Role,
        component: &ComponentRef,
        capability: Capability,
    ) -> ResolveResult<&ComponentSpec>;

    /// Whether some component named `component` takes a literal `parameter`.
    fn declares(&self, component: &ComponentRef, parameter: &str) -> bool;
}

pub(crate) struct Specs<'a, K, V> {
    pub(crate) components: &'a ComponentRegistry,
    pub(crate) catalog: &'a GenericCatalog<K, V>,
}

impl<K, V> SpecSource for Specs<'_, K, V> {
    fn role_spec(&self, role: Role, component: &ComponentRef) -> ResolveResult<&ComponentSpec> {
        let unknown = || ResolveError::UnknownComponent {
            role,
            component: component.clone(),
        };
        if role.is_generic() {
            return self.catalog.spec(role, component).ok_or_else(unknown);
        }
        match self.components.get(component) {
            Some(r) if r.capability.fills(role) => Ok(&r.spec),
            _ => Err(unknown()),
        }
    }

    fn nested_spec(
        &self,
        role: Role,
        component: &ComponentRef,
        capability: Capability,
    ) -> ResolveResult<&ComponentSpec> {
        match self.components.get(component) {
            Some(r) if r.capability == capability => Ok(&r.spec),
            _ => Err(ResolveError::UnknownComponent {
                role,
                component: component.clone(),
            }),
        }
    }

    fn declares(&self, component: &ComponentRef, parameter: &str) -> bool {
        self.components
            .spec(component)
            .is_some_and(|s| s.accepts_value(parameter))
            || self
                .catalog
                .specs_named(component)
                .any(|s| s.accepts_value(parameter))
    }
}

/// Merge `scanned` facets into `plan` and bind every parameter.
///
/// The result names a component for every present role, has a literal for
/// every value parameter and a nested plan for every component parameter.
pub(crate) fn merge<S: SpecSource>(
    plan: &ConstructionPlan,
    scanned: &[ScannedFacet],
    specs: &S,
    config: &dyn ConfigProvider,
) -> ResolveResult<ConstructionPlan> {
    check_chain_arguments(plan)?;
    let plan = merge_components(plan, scanned)?;
    if plan.role(Role::BackingStore).is_none() {
        return Err(ResolveError::MissingBackingStore);
    }
    let plan = DEFAULT_HOOKS.iter().fold(plan, |plan, (role, component)| {
        if plan.role(*role).is_some() {
            plan
        } else {
            plan.with_component(*role, component.clone())
        }
    });

    check_parameter_targets(scanned, specs)?;
    let mut binder = Binder {
        specs,
        scanned,
        config,
        winners: select_parameter_bindings(scanned)?,
        values: HashMap::new(),
    };

    let mut merged = plan.clone();
    for role in plan.roles() {
        let Some(node) = plan.role(role) else {
            continue;
        };
        let spec = specs.role_spec(role, node.component())?;
        let bound = binder.bind(role, node, spec)?;
        merged = merged.with_nested(role.as_str(), bound);
    }
    Ok(merged)
}

fn check_chain_arguments(plan: &ConstructionPlan) -> ResolveResult<()> {
    for (name, arg) in plan.arguments() {
        if Role::from_arg_name(name).is_none() {
            return Err(ResolveError::UnknownParameter {
                component: plan.component().clone(),
                parameter: name.to_string(),
            });
        }
        if let PlanArg::Literal(lit) = arg {
            return Err(ResolveError::InvalidArgument {
                component: plan.component().clone(),
                parameter: name.to_string(),
                reason: format!("expected a component, got {lit}"),
            });
        }
    }
    Ok(())
}

/// Apply component facets to roles the plan leaves open.
fn merge_components(plan: &ConstructionPlan, scanned: &[ScannedFacet]) -> ResolveResult<ConstructionPlan> {
    let mut merged = plan.clone();
    for (role, indices) in component_bindings(scanned) {
        let candidates: Vec<(usize, &ConstructionPlan)> = indices
            .iter()
            .filter_map(|&i| match scanned[i].facet.as_ref() {
                Facet::Component(c) => Some((scanned[i].depth, &c.plan)),
                Facet::Parameter(_) => None,
            })
            .collect();
        let Some(&(depth, winner)) = candidates.first() else {
            continue;
        };
        if let Some((_, other)) = candidates
            .iter()
            .find(|(d, p)| *d == depth && *p != winner)
        {
            return Err(ResolveError::ConflictingFacetBinding {
                target: role.as_str().to_string(),
                parameter: "component".to_string(),
                first: winner.to_string(),
                second: other.to_string(),
            });
        }

        if let Some(fixed) = plan.role(role) {
            debug!(%role, plan = %fixed, facet = %winner, "plan fixes role, facet ignored");
            continue;
        }
        merged = merged.with_nested(role.as_str(), winner.clone());
    }
    Ok(merged)
}

/// Every parameter facet must name at least one target that takes the
/// parameter, and every implied target must take it too.
fn check_parameter_targets<S: SpecSource>(scanned: &[ScannedFacet], specs: &S) -> ResolveResult<()> {
    for s in scanned {
        let Facet::Parameter(p) = s.facet.as_ref() else {
            continue;
        };
        if !p.targets.iter().any(|t| specs.declares(t, &p.parameter)) {
            let component = p.targets.iter().next().cloned().unwrap_or(names::STORE_CHAIN);
            return Err(ResolveError::UnknownParameter {
                component,
                parameter: p.parameter.clone(),
            });
        }
        for implied in &p.implied {
            let parameter = implied.parameter.as_deref().unwrap_or(&p.parameter);
            if !specs.declares(&implied.component, parameter) {
                return Err(ResolveError::UnknownParameter {
                    component: implied.component.clone(),
                    parameter: parameter.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn source_of(scanned: &[ScannedFacet], index: usize) -> Option<&ValueSource> {
    match scanned[index].facet.as_ref() {
        Facet::Parameter(p) => Some(&p.source),
        Facet::Component(_) => None,
    }
}

/// Pick the winning facet for each (component, parameter) pair.
fn select_parameter_bindings(
    scanned: &[ScannedFacet],
) -> ResolveResult<BTreeMap<(ComponentRef, String), usize>> {
    let mut winners = BTreeMap::new();
    for ((component, parameter), indices) in parameter_bindings(scanned) {
        let conflict = |a: &dyn std::fmt::Display, b: &dyn std::fmt::Display| {
            ResolveError::ConflictingFacetBinding {
                target: component.to_string(),
                parameter: parameter.clone(),
                first: a.to_string(),
                second: b.to_string(),
            }
        };

        let literals: Vec<&Literal> = indices
            .iter()
            .filter_map(|&i| match source_of(scanned, i) {
                Some(ValueSource::Literal(lit)) => Some(lit),
                _ => None,
            })
            .collect();
        if let Some(first) = literals.first() {
            if let Some(other) = literals.iter().find(|l| *l != first) {
                return Err(conflict(first, other));
            }
        }

        let Some(depth) = indices.iter().map(|&i| scanned[i].depth).min() else {
            continue;
        };
        let closest: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| scanned[i].depth == depth)
            .collect();
        let winner = closest[0];
        let winning_source = source_of(scanned, winner);
        for &other in &closest[1..] {
            let other_source = source_of(scanned, other);
            if other_source != winning_source {
                return Err(conflict(
                    &display_source(winning_source),
                    &display_source(other_source),
                ));
            }
        }
        if closest.len() < indices.len() {
            debug!(
                component = %component,
                parameter = %parameter,
                origin = scanned[winner].origin,
                "closer facet overrides inherited binding"
            );
        }
        winners.insert((component, parameter), winner);
    }
    Ok(winners)
}

fn display_source(source: Option<&ValueSource>) -> String {
    source.map_or_else(|| "component".to_string(), ToString::to_string)
}

struct Binder<'a, S> {
    specs: &'a S,
    scanned: &'a [ScannedFacet],
    config: &'a dyn ConfigProvider,
    winners: BTreeMap<(ComponentRef, String), usize>,
    /// Facet value per facet index, evaluated at most once.
    values: HashMap<usize, Option<Literal>>,
}

impl<'a, S: SpecSource> Binder<'a, S> {
    fn bind(
        &mut self,
        role: Role,
        node: &ConstructionPlan,
        spec: &ComponentSpec,
    ) -> ResolveResult<ConstructionPlan> {
        let component = node.component();
        for (name, _) in node.arguments() {
            if spec.get(name).is_none() {
                return Err(ResolveError::UnknownParameter {
                    component: component.clone(),
                    parameter: name.to_string(),
                });
            }
        }

        let mut bound = node.clone();
        for param in &spec.params {
            match &param.kind {
                ParamKind::Value { default } => {
                    match node.argument(param.name) {
                        Some(PlanArg::Literal(_)) => continue,
                        Some(PlanArg::Plan(nested)) => {
                            return Err(ResolveError::InvalidArgument {
                                component: component.clone(),
                                parameter: param.name.to_string(),
                                reason: format!("expected a value, got component {}", nested.component()),
                            })
                        }
                        None => {}
                    }
                    let value = self
                        .facet_value(component, param.name)
                        .or_else(|| default.clone())
                        .ok_or_else(|| ResolveError::MissingRequiredParameter {
                            component: component.clone(),
                            parameter: param.name.to_string(),
                        })?;
                    bound = bound.with_argument(param.name, value);
                }
                ParamKind::Component { capability } => {
                    let nested = match node.argument(param.name) {
                        Some(PlanArg::Plan(nested)) => nested,
                        Some(PlanArg::Literal(lit)) => {
                            return Err(ResolveError::InvalidArgument {
                                component: component.clone(),
                                parameter: param.name.to_string(),
                                reason: format!("expected a component, got {lit}"),
                            })
                        }
                        None => {
                            return Err(ResolveError::MissingRequiredParameter {
                                component: component.clone(),
                                parameter: param.name.to_string(),
                            })
                        }
                    };
                    let specs = self.specs;
                    let nested_spec = specs.nested_spec(role, nested.component(), *capability)?;
                    let nested_bound = self.bind(role, nested, nested_spec)?;
                    bound = bound.with_nested(param.name, nested_bound);
                }
            }
        }
        Ok(bound)
    }

    /// The value the winning facet supplies for (component, parameter).
    fn facet_value(&mut self, component: &ComponentRef, parameter: &str) -> Option<Literal> {
        let index = *self.winners.get(&(component.clone(), parameter.to_string()))?;
        if let Some(value) = self.values.get(&index) {
            return value.clone();
        }
        let value = match source_of(self.scanned, index)? {
            ValueSource::Literal(lit) => Some(lit.clone()),
            ValueSource::ConfigKey(key) => {
                let found = self.config.lookup(key);
                debug!(key = %key, found = found.is_some(), "config lookup");
                found.map(Literal::Str)
            }
            ValueSource::Default => None,
        };
        self.values.insert(index, value.clone());
        value
    }
}

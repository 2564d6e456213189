use std::sync::Arc;

use stowage_types::{ComponentRef, Role};

/// A component's own construction error, shareable between callers.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving a contract into a store.
///
/// Everything except [`ResolveError::ActivationFailure`] is a
/// configuration error: the contract, its plan or its facets are wrong and
/// resolving again will fail the same way.
///
/// Errors are `Clone` so that every caller waiting on one failed
/// resolution receives that failure.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ResolveError {
    /// No plan argument, facet, configuration value or default supplied a
    /// required parameter.
    #[error("missing required parameter {parameter:?} for {component}")]
    MissingRequiredParameter {
        component: ComponentRef,
        parameter: String,
    },

    /// Two facets bind the same parameter to different values.
    #[error("conflicting facet bindings for {target}.{parameter}: {first} vs {second}")]
    ConflictingFacetBinding {
        target: String,
        parameter: String,
        first: String,
        second: String,
    },

    /// A generic role cannot be bound to the contract's key or value type.
    #[error("cannot bind {role} for {argument}")]
    UnresolvableGenericArgument { role: Role, argument: String },

    /// The component for `role` failed to construct.
    #[error("activation of {component} as {role} failed: {source}")]
    ActivationFailure {
        role: Role,
        component: ComponentRef,
        #[source]
        source: SharedError,
    },

    /// No component with this name is registered for the role.
    #[error("unknown {role} component {component}")]
    UnknownComponent { role: Role, component: ComponentRef },

    /// The component does not declare this parameter.
    #[error("{component} has no parameter {parameter:?}")]
    UnknownParameter {
        component: ComponentRef,
        parameter: String,
    },

    /// A bound value has the wrong type or is out of range.
    #[error("invalid argument {parameter:?} for {component}: {reason}")]
    InvalidArgument {
        component: ComponentRef,
        parameter: String,
        reason: String,
    },

    /// Neither the plan nor any facet chose a backing store.
    #[error("no backing store configured")]
    MissingBackingStore,

    #[error("contract {contract} is not registered")]
    UnregisteredContract { contract: String },

    /// The instance cache holds a value of another type under this
    /// contract's key.
    #[error("cached instance for {contract} has an unexpected type")]
    CacheTypeMismatch { contract: String },

    /// A resolver lock was poisoned by a panicking thread.
    #[error("resolver lock poisoned: {0}")]
    Poisoned(&'static str),
}

impl ResolveError {
    /// Whether this is a configuration error rather than a failure of a
    /// component's own setup.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::ActivationFailure { .. } | Self::CacheTypeMismatch { .. } | Self::Poisoned(_)
        )
    }
}

/// Result alias for resolution.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_types::names;

    #[test]
    fn messages_carry_role_and_component() {
        let err = ResolveError::ActivationFailure {
            role: Role::BackingStore,
            component: names::LOCAL_FS,
            source: Arc::from(Box::<dyn std::error::Error + Send + Sync>::from("disk on fire")),
        };
        assert_eq!(
            err.to_string(),
            "activation of local-fs as store failed: disk on fire"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn configuration_errors() {
        assert!(ResolveError::MissingBackingStore.is_configuration());
        assert!(ResolveError::MissingRequiredParameter {
            component: names::LOCAL_FS,
            parameter: "rootPath".into(),
        }
        .is_configuration());
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// One position in the decorator chain.
///
/// Only [`Role::BackingStore`] is mandatory. The generic roles depend on
/// the consumer's key or value type and are bound per contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    BackingStore,
    KeyMapper,
    Serializer,
    Compressor,
    MutationHook,
    ObservationHook,
    ValidationHook,
}

impl Role {
    /// Every role, chain roles first, then hooks.
    pub const ALL: [Role; 7] = [
        Role::BackingStore,
        Role::KeyMapper,
        Role::Serializer,
        Role::Compressor,
        Role::MutationHook,
        Role::ObservationHook,
        Role::ValidationHook,
    ];

    /// The argument name under which the role's sub-plan is recorded in a
    /// chain plan.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::BackingStore => "store",
            Role::KeyMapper => "key-mapper",
            Role::Serializer => "serializer",
            Role::Compressor => "compressor",
            Role::MutationHook => "mutation-hook",
            Role::ObservationHook => "observation-hook",
            Role::ValidationHook => "validation-hook",
        }
    }

    /// Parse a role from its argument name.
    pub fn from_arg_name(name: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == name)
    }

    /// Whether components for this role are bound to the contract's key or
    /// value type.
    pub fn is_generic(&self) -> bool {
        !matches!(self, Role::BackingStore | Role::Compressor)
    }

    /// Whether this role is one of the always-present hooks.
    pub fn is_hook(&self) -> bool {
        matches!(
            self,
            Role::MutationHook | Role::ObservationHook | Role::ValidationHook
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! The process-wide resolver.
//!
//! Applications that keep one set of stores for the whole process can skip
//! building a [`Resolver`] and call [`resolve`]. The global resolver is
//! created on first use from the TOML file named by `STOWAGE_CONFIG`, or,
//! when that is unset, from `STOWAGE_*` environment variables alone. Call
//! [`install`] before first use to supply a different one.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use stowage_facet::EngineConfig;
use stowage_resolver::{ContractStore, ResolveResult, Resolver, StoreContract};
use tracing::{info, warn};

/// Environment variable naming the global configuration file.
pub const CONFIG_PATH_VAR: &str = "STOWAGE_CONFIG";

/// Prefix of environment variables consulted for configuration keys.
pub const ENV_PREFIX: &str = "STOWAGE";

static GLOBAL: OnceCell<Resolver> = OnceCell::new();

/// Install `resolver` as the global resolver.
///
/// Fails, handing the resolver back, if the global resolver already exists.
pub fn install(resolver: Resolver) -> Result<(), Resolver> {
    GLOBAL.set(resolver)
}

/// The global resolver, created on first use.
pub fn global() -> &'static Resolver {
    GLOBAL.get_or_init(|| Resolver::new(default_config()))
}

/// Resolve `C` through the global resolver.
pub fn resolve<C: StoreContract>() -> ResolveResult<Arc<ContractStore<C>>> {
    global().resolve::<C>()
}

fn default_config() -> EngineConfig {
    let Some(path) = std::env::var_os(CONFIG_PATH_VAR) else {
        return EngineConfig::from_env(ENV_PREFIX);
    };
    match EngineConfig::load(&path) {
        Ok(mut config) => {
            config.env_prefix.get_or_insert_with(|| ENV_PREFIX.to_string());
            info!(path = %path.to_string_lossy(), settings = config.settings.len(), "loaded configuration");
            config
        }
        Err(e) => {
            warn!(path = %path.to_string_lossy(), error = %e, "ignoring unreadable configuration");
            EngineConfig::from_env(ENV_PREFIX)
        }
    }
}

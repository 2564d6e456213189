//! Cross-cutting hooks around every store operation.
//!
//! All three hooks are always present in a resolved store. Without an
//! explicit choice the defaults apply: [`IdentityHook`] returns the value
//! unchanged, [`NoopObserver`] does nothing and [`AcceptAll`] reports no
//! errors.

use std::borrow::Cow;

use tracing::debug;

use crate::keys::StoreKey;

/// A store operation as seen by an observation hook.
#[derive(Debug)]
pub enum StoreEvent<'a, K, V> {
    Get { key: &'a K, found: bool },
    Put { key: &'a K, value: &'a V },
    Delete { key: &'a K, existed: bool },
    List { prefix: &'a str, count: usize },
}

impl<K, V> StoreEvent<'_, K, V> {
    pub fn operation(&self) -> &'static str {
        match self {
            StoreEvent::Get { .. } => "get",
            StoreEvent::Put { .. } => "put",
            StoreEvent::Delete { .. } => "delete",
            StoreEvent::List { .. } => "list",
        }
    }
}

/// Rewrites a value before it is validated and written.
pub trait MutationHook<V>: Send + Sync {
    fn mutate<'a>(&self, value: &'a V) -> Cow<'a, V>
    where
        V: Clone;
}

/// Sees every operation after it completed successfully.
pub trait ObservationHook<K, V>: Send + Sync {
    fn observe(&self, event: &StoreEvent<'_, K, V>);
}

/// Checks a value before it is written. An empty list accepts it.
pub trait ValidationHook<V>: Send + Sync {
    fn validate(&self, value: &V) -> Vec<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHook;

impl<V> MutationHook<V> for IdentityHook {
    fn mutate<'a>(&self, value: &'a V) -> Cow<'a, V>
    where
        V: Clone,
    {
        Cow::Borrowed(value)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl<K, V> ObservationHook<K, V> for NoopObserver {
    fn observe(&self, _event: &StoreEvent<'_, K, V>) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl<V> ValidationHook<V> for AcceptAll {
    fn validate(&self, _value: &V) -> Vec<String> {
        Vec::new()
    }
}

/// Logs every operation at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl<K: StoreKey, V> ObservationHook<K, V> for TracingObserver {
    fn observe(&self, event: &StoreEvent<'_, K, V>) {
        match event {
            StoreEvent::Get { key, found } => {
                debug!(op = "get", key = %key.to_path(), found, "store operation")
            }
            StoreEvent::Put { key, .. } => debug!(op = "put", key = %key.to_path(), "store operation"),
            StoreEvent::Delete { key, existed } => {
                debug!(op = "delete", key = %key.to_path(), existed, "store operation")
            }
            StoreEvent::List { prefix, count } => {
                debug!(op = "list", prefix, count, "store operation")
            }
        }
    }
}

/// Mutation hook from a closure; `None` keeps the value.
pub struct MutateFn<F>(pub F);

impl<V, F> MutationHook<V> for MutateFn<F>
where
    F: Fn(&V) -> Option<V> + Send + Sync,
{
    fn mutate<'a>(&self, value: &'a V) -> Cow<'a, V>
    where
        V: Clone,
    {
        match (self.0)(value) {
            Some(changed) => Cow::Owned(changed),
            None => Cow::Borrowed(value),
        }
    }
}

/// Observation hook from a closure.
pub struct ObserveFn<F>(pub F);

impl<K, V, F> ObservationHook<K, V> for ObserveFn<F>
where
    F: Fn(&StoreEvent<'_, K, V>) + Send + Sync,
{
    fn observe(&self, event: &StoreEvent<'_, K, V>) {
        (self.0)(event)
    }
}

/// Validation hook from a closure.
pub struct ValidateFn<F>(pub F);

impl<V, F> ValidationHook<V> for ValidateFn<F>
where
    F: Fn(&V) -> Vec<String> + Send + Sync,
{
    fn validate(&self, value: &V) -> Vec<String> {
        (self.0)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_change_nothing() {
        let v = "x".to_string();
        assert!(matches!(IdentityHook.mutate(&v), Cow::Borrowed(_)));
        assert!(ValidationHook::<String>::validate(&AcceptAll, &v).is_empty());
        ObservationHook::<String, String>::observe(
            &NoopObserver,
            &StoreEvent::List { prefix: "", count: 0 },
        );
    }

    #[test]
    fn closure_hooks() {
        let trim = MutateFn(|s: &String| (s.trim() != s).then(|| s.trim().to_string()));
        assert_eq!(&*trim.mutate(&" a ".to_string()), "a");
        assert!(matches!(trim.mutate(&"a".to_string()), Cow::Borrowed(_)));

        let non_empty = ValidateFn(|s: &String| {
            if s.is_empty() {
                vec!["empty".to_string()]
            } else {
                Vec::new()
            }
        });
        assert_eq!(non_empty.validate(&String::new()), vec!["empty"]);
    }

    #[test]
    fn event_operation_names() {
        let key = 1u64;
        let e: StoreEvent<'_, u64, ()> = StoreEvent::Delete { key: &key, existed: true };
        assert_eq!(e.operation(), "delete");
    }
}


use stowage_store::StoreResult;

/// A key type a store contract can be keyed by.
///
/// `to_path` gives the key's storage path when no key mapper is configured.
pub trait StoreKey: Send + Sync + 'static {
    fn to_path(&self) -> String;
}

impl StoreKey for String {
    fn to_path(&self) -> String {
        self.clone()
    }
}

macro_rules! display_key {
    ($($t:ty),*) => {
        $(impl StoreKey for $t {
            fn to_path(&self) -> String {
                ToString::to_string(self)
            }
        })*
    };
}

display_key!(u32, u64, i64, usize);

/// Maps a contract key to a storage path.
pub trait KeyMapper<K>: Send + Sync {
    fn name(&self) -> &str;

    fn map(&self, key: &K) -> StoreResult<String>;
}

/// The key's own path under an optional prefix directory.
#[derive(Clone, Debug, Default)]
pub struct PathKeyMapper {
    prefix: String,
}

impl PathKeyMapper {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().trim_end_matches('/').to_string(),
        }
    }
}

impl<K: StoreKey> KeyMapper<K> for PathKeyMapper {
    fn name(&self) -> &str {
        "path-key"
    }

    fn map(&self, key: &K) -> StoreResult<String> {
        let path = key.to_path();
        if self.prefix.is_empty() {
            Ok(path)
        } else {
            Ok(format!("{}/{path}", self.prefix))
        }
    }
}

/// Hex BLAKE3 of the key's path, with the first `fanout` hex characters
/// as a directory to keep directories small.
#[derive(Clone, Debug)]
pub struct HashedKeyMapper {
    fanout: usize,
}

impl HashedKeyMapper {
    pub const DEFAULT_FANOUT: i64 = 2;
    pub const MAX_FANOUT: usize = 8;

    /// `fanout` is capped at [`Self::MAX_FANOUT`]; 0 disables the directory.
    pub fn new(fanout: usize) -> Self {
        Self {
            fanout: fanout.min(Self::MAX_FANOUT),
        }
    }
}

impl<K: StoreKey> KeyMapper<K> for HashedKeyMapper {
    fn name(&self) -> &str {
        "hashed-key"
    }

    fn map(&self, key: &K) -> StoreResult<String> {
        let digest = hex::encode(blake3::hash(key.to_path().as_bytes()).as_bytes());
        if self.fanout == 0 {
            Ok(digest)
        } else {
            Ok(format!("{}/{digest}", &digest[..self.fanout]))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numeric_keys_render_as_decimal() {
        assert_eq!(42u64.to_path(), "42");
        assert_eq!((-7i64).to_path(), "-7");
    }

    #[test]
    fn prefix_is_a_directory() {
        let m = PathKeyMapper::new("tenant-a/");
        assert_eq!(KeyMapper::<String>::map(&m, &"x".to_string()).unwrap(), "tenant-a/x");
        let bare = PathKeyMapper::default();
        assert_eq!(KeyMapper::<u32>::map(&bare, &5).unwrap(), "5");
    }

    #[test]
    fn hashed_key_layout() {
        let path = KeyMapper::<String>::map(&HashedKeyMapper::new(2), &"a".to_string()).unwrap();
        let (dir, file) = path.split_once('/').unwrap();
        assert_eq!(dir.len(), 2);
        assert_eq!(file.len(), 64);
        assert!(file.starts_with(dir));
        let flat = KeyMapper::<String>::map(&HashedKeyMapper::new(0), &"a".to_string()).unwrap();
        assert_eq!(flat, file);
    }

    proptest! {
        #[test]
        fn hashed_paths_are_stable_and_distinct(a in "[a-z0-9/]{1,24}", b in "[a-z0-9/]{1,24}") {
            let m = HashedKeyMapper::new(3);
            let pa = KeyMapper::<String>::map(&m, &a).unwrap();
            prop_assert_eq!(&pa, &KeyMapper::<String>::map(&m, &a).unwrap());
            if a != b {
                prop_assert_ne!(pa, KeyMapper::<String>::map(&m, &b).unwrap());
            }
        }
    }
}

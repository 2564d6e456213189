//! The decorator chain between a typed store and its backing store.
//!
//! Layers, innermost first:
//!
//! 1. backing store ([`BlobTransport`]): paths to bytes
//! 2. [`KeyMappedStore`] or [`DirectKeyStore`]: keys to paths
//! 3. [`SerializedStore`]: values to bytes
//! 4. [`CompressedStore`]: compressed serializer output
//!
//! [`HookedStore`] wraps the finished chain with the mutation, validation
//! and observation hooks.

use std::marker::PhantomData;
use std::sync::Arc;

use stowage_codec::ValueCodec;
use stowage_compress::Compressor;
use stowage_store::{BlobTransport, StoreError, StoreResult, Versioned};

use crate::hooks::{MutationHook, ObservationHook, StoreEvent, ValidationHook};
use crate::keys::{KeyMapper, StoreKey};

// ---------------------------------------------------------------------------
// DataStore
// ---------------------------------------------------------------------------

/// Typed CRUD surface of a resolved store.
pub trait DataStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> StoreResult<Option<V>> {
        Ok(self.get_versioned(key)?.map(|v| v.value))
    }

    /// The value with the backend's version tag.
    fn get_versioned(&self, key: &K) -> StoreResult<Option<Versioned<V>>>;

    fn put(&self, key: &K, value: &V) -> StoreResult<()>;

    /// Returns `true` if the key existed.
    fn delete(&self, key: &K) -> StoreResult<bool>;

    fn exists(&self, key: &K) -> StoreResult<bool>;

    /// Stored paths starting with `prefix`. Paths are the backing store's,
    /// after key mapping.
    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// Keyed bytes: the layer that turns keys into backing-store paths.
pub trait ByteStore<K>: Send + Sync {
    fn read(&self, key: &K) -> StoreResult<Option<Versioned<Vec<u8>>>>;

    fn write(&self, key: &K, data: &[u8]) -> StoreResult<()>;

    fn delete(&self, key: &K) -> StoreResult<bool>;

    fn exists(&self, key: &K) -> StoreResult<bool>;

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

// ---------------------------------------------------------------------------
// Key layers
// ---------------------------------------------------------------------------

/// Keys stored under their own [`StoreKey::to_path`].
pub struct DirectKeyStore<K> {
    inner: Arc<dyn BlobTransport>,
    _key: PhantomData<fn(&K)>,
}

impl<K> DirectKeyStore<K> {
    pub fn new(inner: Arc<dyn BlobTransport>) -> Self {
        Self {
            inner,
            _key: PhantomData,
        }
    }
}

impl<K: StoreKey> ByteStore<K> for DirectKeyStore<K> {
    fn read(&self, key: &K) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        self.inner.read(&key.to_path())
    }

    fn write(&self, key: &K, data: &[u8]) -> StoreResult<()> {
        self.inner.write(&key.to_path(), data)
    }

    fn delete(&self, key: &K) -> StoreResult<bool> {
        self.inner.delete(&key.to_path())
    }

    fn exists(&self, key: &K) -> StoreResult<bool> {
        self.inner.exists(&key.to_path())
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.inner.list(prefix)
    }
}

/// Keys stored under the path chosen by a [`KeyMapper`].
pub struct KeyMappedStore<K> {
    mapper: Arc<dyn KeyMapper<K>>,
    inner: Arc<dyn BlobTransport>,
}

impl<K> KeyMappedStore<K> {
    pub fn new(mapper: Arc<dyn KeyMapper<K>>, inner: Arc<dyn BlobTransport>) -> Self {
        Self { mapper, inner }
    }
}

impl<K> ByteStore<K> for KeyMappedStore<K> {
    fn read(&self, key: &K) -> StoreResult<Option<Versioned<Vec<u8>>>> {
        self.inner.read(&self.mapper.map(key)?)
    }

    fn write(&self, key: &K, data: &[u8]) -> StoreResult<()> {
        self.inner.write(&self.mapper.map(key)?, data)
    }

    fn delete(&self, key: &K) -> StoreResult<bool> {
        self.inner.delete(&self.mapper.map(key)?)
    }

    fn exists(&self, key: &K) -> StoreResult<bool> {
        self.inner.exists(&self.mapper.map(key)?)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.inner.list(prefix)
    }
}

// ---------------------------------------------------------------------------
// Value layers
// ---------------------------------------------------------------------------

/// Values encoded with a codec and written as is.
pub struct SerializedStore<K, V> {
    codec: Arc<dyn ValueCodec<V>>,
    inner: Arc<dyn ByteStore<K>>,
}

impl<K, V> SerializedStore<K, V> {
    pub fn new(codec: Arc<dyn ValueCodec<V>>, inner: Arc<dyn ByteStore<K>>) -> Self {
        Self { codec, inner }
    }

    pub fn encode(&self, value: &V) -> StoreResult<Vec<u8>> {
        self.codec
            .encode(value)
            .map_err(|e| StoreError::Codec(Box::new(e)))
    }

    pub fn decode(&self, bytes: &[u8]) -> StoreResult<V> {
        self.codec
            .decode(bytes)
            .map_err(|e| StoreError::Codec(Box::new(e)))
    }

    /// The keyed byte layer underneath.
    pub fn inner(&self) -> &Arc<dyn ByteStore<K>> {
        &self.inner
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec.name()
    }
}

impl<K, V> DataStore<K, V> for SerializedStore<K, V> {
    fn get_versioned(&self, key: &K) -> StoreResult<Option<Versioned<V>>> {
        let Some(raw) = self.inner.read(key)? else {
            return Ok(None);
        };
        let value = self.decode(&raw.value)?;
        Ok(Some(Versioned::new(value, raw.version)))
    }

    fn put(&self, key: &K, value: &V) -> StoreResult<()> {
        let bytes = self.encode(value)?;
        self.inner.write(key, &bytes)
    }

    fn delete(&self, key: &K) -> StoreResult<bool> {
        self.inner.delete(key)
    }

    fn exists(&self, key: &K) -> StoreResult<bool> {
        self.inner.exists(key)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.inner.list(prefix)
    }
}

/// Serializer output compressed before it reaches the byte layer.
pub struct CompressedStore<K, V> {
    serialized: SerializedStore<K, V>,
    compressor: Arc<dyn Compressor>,
}

impl<K, V> CompressedStore<K, V> {
    pub fn new(serialized: SerializedStore<K, V>, compressor: Arc<dyn Compressor>) -> Self {
        Self {
            serialized,
            compressor,
        }
    }
}

impl<K, V> DataStore<K, V> for CompressedStore<K, V> {
    fn get_versioned(&self, key: &K) -> StoreResult<Option<Versioned<V>>> {
        let Some(raw) = self.serialized.inner().read(key)? else {
            return Ok(None);
        };
        let bytes = self
            .compressor
            .decompress(&raw.value)
            .map_err(|e| StoreError::Compression(Box::new(e)))?;
        let value = self.serialized.decode(&bytes)?;
        Ok(Some(Versioned::new(value, raw.version)))
    }

    fn put(&self, key: &K, value: &V) -> StoreResult<()> {
        let encoded = self.serialized.encode(value)?;
        let packed = self
            .compressor
            .compress(&encoded)
            .map_err(|e| StoreError::Compression(Box::new(e)))?;
        self.serialized.inner().write(key, &packed)
    }

    fn delete(&self, key: &K) -> StoreResult<bool> {
        self.serialized.delete(key)
    }

    fn exists(&self, key: &K) -> StoreResult<bool> {
        self.serialized.exists(key)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.serialized.list(prefix)
    }
}

// ---------------------------------------------------------------------------
// HookedStore
// ---------------------------------------------------------------------------

/// The outermost layer: mutation, then validation, then the write, then
/// observation.
///
/// A value rejected by validation is never written and the caller gets
/// [`StoreError::Validation`]. Observers only see operations that
/// succeeded.
pub struct HookedStore<K, V> {
    inner: Arc<dyn DataStore<K, V>>,
    mutation: Arc<dyn MutationHook<V>>,
    observation: Arc<dyn ObservationHook<K, V>>,
    validation: Arc<dyn ValidationHook<V>>,
}

impl<K, V> HookedStore<K, V> {
    pub fn new(
        inner: Arc<dyn DataStore<K, V>>,
        mutation: Arc<dyn MutationHook<V>>,
        observation: Arc<dyn ObservationHook<K, V>>,
        validation: Arc<dyn ValidationHook<V>>,
    ) -> Self {
        Self {
            inner,
            mutation,
            observation,
            validation,
        }
    }
}

impl<K, V: Clone> DataStore<K, V> for HookedStore<K, V> {
    fn get_versioned(&self, key: &K) -> StoreResult<Option<Versioned<V>>> {
        let found = self.inner.get_versioned(key)?;
        self.observation.observe(&StoreEvent::Get {
            key,
            found: found.is_some(),
        });
        Ok(found)
    }

    fn put(&self, key: &K, value: &V) -> StoreResult<()> {
        let value = self.mutation.mutate(value);
        let errors = self.validation.validate(&value);
        if !errors.is_empty() {
            return Err(StoreError::Validation { errors });
        }
        self.inner.put(key, &value)?;
        self.observation.observe(&StoreEvent::Put { key, value: &value });
        Ok(())
    }

    fn delete(&self, key: &K) -> StoreResult<bool> {
        let existed = self.inner.delete(key)?;
        self.observation.observe(&StoreEvent::Delete { key, existed });
        Ok(existed)
    }

    fn exists(&self, key: &K) -> StoreResult<bool> {
        self.inner.exists(key)
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let paths = self.inner.list(prefix)?;
        self.observation.observe(&StoreEvent::List {
            prefix,
            count: paths.len(),
        });
        Ok(paths)
    }
}

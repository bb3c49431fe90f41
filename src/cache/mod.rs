//! Object cache behind a small trait, with backends registered by name.
//!
//! Backends register themselves at load time through
//! [`declare_object_cache_plugin!`]; startup picks one by `cache.type`.

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// Present but unreadable as `T`.
    Invalid,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    /// `ttl` is in seconds; backends without per-entry expiry use their
    /// global policy.
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

/// Typed JSON access on top of the raw string API.
#[async_trait]
pub trait ObjectCacheExt: ObjectCache {
    async fn get_json<T>(&self, key: &str) -> CacheResult<T>
    where
        T: DeserializeOwned + Send,
    {
        match self.get_raw(key).await {
            CacheResult::Found(raw) => match serde_json::from_str(&raw) {
                Ok(value) => CacheResult::Found(value),
                Err(_) => CacheResult::Invalid,
            },
            CacheResult::NotFound => CacheResult::NotFound,
            CacheResult::Invalid => CacheResult::Invalid,
        }
    }

    async fn insert_json<T>(&self, key: String, value: &T, ttl: u64)
    where
        T: Serialize + Sync,
    {
        if let Ok(raw) = serde_json::to_string(value) {
            self.insert_raw(key, raw, ttl).await;
        }
    }
}

impl<C: ObjectCache + ?Sized> ObjectCacheExt for C {}

/// Registers `$ty` (which must expose `fn new() -> Result<Self, String>`)
/// under `$name` before `main` runs.
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[::ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                ::std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new()
                            .map_err($crate::errors::BoletinError::cache_connection)?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}

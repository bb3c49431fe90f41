//! Name -> constructor table for object cache backends.
//!
//! Backends add themselves with [`declare_object_cache_plugin!`] before
//! `main`; startup picks one by `cache.type`.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::cache::ObjectCache;
use crate::errors::Result;

pub type BoxedObjectCacheFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn ObjectCache>>> + Send>>;
pub type ObjectCacheConstructor = Arc<dyn Fn() -> BoxedObjectCacheFuture + Send + Sync>;

// A poisoned lock only means a registration panicked; the map is intact.
static PLUGINS: Lazy<RwLock<BTreeMap<String, ObjectCacheConstructor>>> =
    Lazy::new(|| RwLock::new(BTreeMap::new()));

pub fn register_object_cache_plugin<S: Into<String>>(name: S, constructor: ObjectCacheConstructor) {
    PLUGINS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.into().to_lowercase(), constructor);
}

/// Case-insensitive, so `CACHE_TYPE=Moka` works.
pub fn get_object_cache_plugin(name: &str) -> Option<ObjectCacheConstructor> {
    PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&name.trim().to_lowercase())
        .cloned()
}

/// Registered names, sorted.
pub fn object_cache_plugin_names() -> Vec<String> {
    PLUGINS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect()
}

pub fn debug_object_cache_registry() {
    let names = object_cache_plugin_names();
    if names.is_empty() {
        debug!("No object cache plugins registered");
    } else {
        debug!("Registered object cache plugins: {}", names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moka_registers_itself() {
        assert!(object_cache_plugin_names().contains(&"moka".to_string()));
        assert!(get_object_cache_plugin(" MOKA ").is_some());
        assert!(get_object_cache_plugin("redis").is_none());
    }
}

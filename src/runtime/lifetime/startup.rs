use crate::cache::object_cache::moka::MokaCacheWrapper;
use crate::cache::ObjectCache;
use crate::cache::register::{get_object_cache_plugin, object_cache_plugin_names};
use crate::config::AppConfig;
use crate::models::course_assignments::entities::AssignmentKind;
use crate::models::courses::entities::normalize_course;
use crate::models::users::entities::UserRole;
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
}

/// Configured backend from the plugin registry, falling back to moka.
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", cache_type, e),
        }
    } else {
        warn!(
            "Cache backend '{}' not found in registry (available: {})",
            cache_type,
            object_cache_plugin_names().join(", ")
        );
    }

    warn!("Falling back to Moka (in-memory) cache backend");
    let cache = MokaCacheWrapper::new()?;
    Ok(Arc::new(cache))
}

/// Copies the configured `username -> course` pairs into preceptor
/// assignments. Unknown users and courses are skipped.
pub async fn seed_legacy_preceptors(storage: &Arc<dyn Storage>) -> usize {
    let mut added = 0;
    for (username, course) in &AppConfig::get().attendance.legacy_preceptor_courses {
        let Some(course) = normalize_course(course) else {
            warn!("Legacy preceptor {} has unknown course '{}'", username, course);
            continue;
        };
        let user = match storage.get_user_by_username(username).await {
            Ok(Some(user)) if user.role == UserRole::Preceptor => user,
            Ok(Some(_)) => {
                debug!("Legacy preceptor {} is not a preceptor, skipping", username);
                continue;
            }
            Ok(None) => {
                debug!("Legacy preceptor {} does not exist yet", username);
                continue;
            }
            Err(e) => {
                warn!("Failed to look up legacy preceptor {}: {}", username, e);
                continue;
            }
        };
        match storage
            .ensure_course_assignment(user.id, course, AssignmentKind::Preceptor)
            .await
        {
            Ok(true) => added += 1,
            Ok(false) => {}
            Err(e) => warn!("Failed to seed assignment for {}: {}", username, e),
        }
    }
    if added > 0 {
        info!("Seeded {} legacy preceptor assignments", added);
    }
    added
}

/// Drops read notifications past the retention window.
async fn purge_old_notifications(storage: &Arc<dyn Storage>) {
    let days = AppConfig::get().notifications.retention_days;
    if days <= 0 {
        return;
    }
    let cutoff = (chrono::Utc::now() - chrono::Duration::days(days)).timestamp();
    match storage.purge_read_notifications(cutoff).await {
        Ok(0) => debug!("No read notifications older than {} days", days),
        Ok(count) => info!("Purged {} read notifications older than {} days", count, days),
        Err(e) => warn!("Failed to purge old notifications: {}", e),
    }
}

pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    seed_legacy_preceptors(&storage).await;
    purge_old_notifications(&storage).await;

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    StartupContext { storage, cache }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_legacy_preceptors_are_seeded_once() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::in_memory().await.unwrap());
        let preceptor = storage
            .create_user(CreateUserRequest::new("preceptor2", UserRole::Preceptor))
            .await
            .unwrap();
        storage
            .create_user(CreateUserRequest::new("preceptor1", UserRole::Teacher))
            .await
            .unwrap();

        assert_eq!(seed_legacy_preceptors(&storage).await, 1);
        assert_eq!(seed_legacy_preceptors(&storage).await, 0);

        let rows = storage
            .list_course_assignments(Some(preceptor.id), Some(AssignmentKind::Preceptor))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course, "3B");
    }
}

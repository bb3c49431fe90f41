use config::{Config, ConfigError, Environment, File};
use std::sync::OnceLock;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

impl AppConfig {
    /// Layered load: `config`, `config.{APP_ENV}`, `BOLETIN_*` env vars, then
    /// the well-known unprefixed variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            .add_source(
                Environment::with_prefix("BOLETIN")
                    .separator("_")
                    .try_parsing(true),
            );

        builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.unix_socket_path", std::env::var("UNIX_SOCKET").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("jwt.secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("cache.type", std::env::var("CACHE_TYPE").ok())?;

        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;
        app_config.sanitize(num_cpus::get());
        Ok(app_config)
    }

    /// Fills derived values and repairs settings that would break requests.
    /// Runs before logging is up, so nothing here logs.
    fn sanitize(&mut self, cpus: usize) {
        if self.server.workers == 0 {
            self.server.workers = cpus.clamp(1, self.server.max_workers.max(1));
        }

        let attendance = &mut self.attendance;
        attendance.default_type = attendance.default_type.trim().to_lowercase();
        if attendance.default_type.is_empty() {
            attendance.default_type = "clases".to_string();
        }
        if attendance.note_max_len == 0 {
            attendance.note_max_len = 255;
        }
        attendance.legacy_preceptor_courses = std::mem::take(&mut attendance.legacy_preceptor_courses)
            .into_iter()
            .map(|(username, course)| (username.trim().to_string(), course))
            .filter(|(username, _)| !username.is_empty())
            .collect();

        let notifications = &mut self.notifications;
        notifications.recent_max_limit = notifications.recent_max_limit.max(1);
        notifications.recent_default_limit = notifications
            .recent_default_limit
            .clamp(1, notifications.recent_max_limit);
        notifications.retention_days = notifications.retention_days.max(0);
    }

    /// Global instance, loaded on first use when `init` was never called.
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                eprintln!("Failed to load configuration: {e}");
                std::process::exit(1);
            })
        })
    }

    /// Called once from `main` before anything reads the configuration.
    pub fn init() -> Result<(), ConfigError> {
        let config = Self::load()?;
        APP_CONFIG
            .set(config)
            .map_err(|_| ConfigError::Message("Configuration already initialized".to_string()))?;
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.server.unix_socket_path.is_empty() {
            None
        } else {
            Some(&self.server.unix_socket_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable_without_files() {
        let config = AppConfig::default();
        assert_eq!(config.attendance.default_type, "clases");
        assert_eq!(config.attendance.note_max_len, 255);
        assert_eq!(
            config.attendance.legacy_preceptor_courses.get("preceptor3"),
            Some(&"5NAT".to_string())
        );
        assert_eq!(config.notifications.recent_max_limit, 12);
        assert!(config.is_development());
    }

    #[test]
    fn test_sanitize_repairs_unusable_values() {
        let mut config = AppConfig::default();
        config.server.workers = 0;
        config.server.max_workers = 4;
        config.attendance.default_type = "  Clases ".to_string();
        config.attendance.note_max_len = 0;
        config
            .attendance
            .legacy_preceptor_courses
            .insert("  ".to_string(), "1A".to_string());
        config.notifications.recent_default_limit = 40;
        config.notifications.recent_max_limit = 12;
        config.notifications.retention_days = -3;

        config.sanitize(16);

        assert_eq!(config.server.workers, 4);
        assert_eq!(config.attendance.default_type, "clases");
        assert_eq!(config.attendance.note_max_len, 255);
        assert_eq!(config.attendance.legacy_preceptor_courses.len(), 3);
        assert_eq!(config.notifications.recent_default_limit, 12);
        assert_eq!(config.notifications.retention_days, 0);
    }

    #[test]
    fn test_explicit_workers_are_kept() {
        let mut config = AppConfig::default();
        config.server.workers = 3;
        config.sanitize(16);
        assert_eq!(config.server.workers, 3);
    }

    #[test]
    fn test_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
    }
}

//! Application settings service.

use castroom_common::{AppError, AppResult};
use castroom_db::entities::app_setting;
use castroom_db::repositories::AppSettingRepository;

/// Character limit stated in generation prompts.
pub const DEFAULT_CHAR_LIMIT: &str = "default_char_limit";
/// Number of drafts a batch generates when the operator does not say.
pub const DEFAULT_BATCH_SIZE: &str = "default_batch_size";
/// Characters of a campaign instruction kept as the post theme.
pub const CAMPAIGN_THEME_ECHO_CHARS: &str = "campaign_theme_echo_chars";
/// Sink destination used when an export names none.
pub const EXPORT_DESTINATION: &str = "export_destination";

/// A setting seeded on first run.
#[derive(Debug, Clone, Copy)]
pub struct SettingDefault {
    pub key: &'static str,
    pub value: &'static str,
    pub description: &'static str,
    pub category: &'static str,
}

/// Settings every installation starts with.
pub const DEFAULT_SETTINGS: &[SettingDefault] = &[
    SettingDefault {
        key: DEFAULT_CHAR_LIMIT,
        value: "140",
        description: "Maximum characters per generated post",
        category: "generation",
    },
    SettingDefault {
        key: DEFAULT_BATCH_SIZE,
        value: "5",
        description: "Default number of drafts per batch",
        category: "generation",
    },
    SettingDefault {
        key: CAMPAIGN_THEME_ECHO_CHARS,
        value: "30",
        description: "Characters of a campaign instruction kept as the post theme",
        category: "generation",
    },
    SettingDefault {
        key: EXPORT_DESTINATION,
        value: "posts",
        description: "Sheet that approved posts are exported to",
        category: "export",
    },
];

const NUMERIC_KEYS: &[&str] = &[DEFAULT_CHAR_LIMIT, DEFAULT_BATCH_SIZE, CAMPAIGN_THEME_ECHO_CHARS];

fn default_value(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS
        .iter()
        .find(|d| d.key == key)
        .map(|d| d.value)
}

/// Service for reading and changing settings.
#[derive(Clone)]
pub struct SettingsService {
    setting_repo: AppSettingRepository,
}

impl SettingsService {
    /// Create a new settings service.
    #[must_use]
    pub const fn new(setting_repo: AppSettingRepository) -> Self {
        Self { setting_repo }
    }

    /// Insert any default setting that is missing. Returns how many were added.
    pub async fn ensure_defaults(&self) -> AppResult<usize> {
        let mut inserted = 0;
        for d in DEFAULT_SETTINGS {
            if self
                .setting_repo
                .insert_if_absent(d.key, d.value, d.description, d.category)
                .await?
            {
                inserted += 1;
            }
        }
        if inserted > 0 {
            tracing::info!(inserted, "Seeded default settings");
        }
        Ok(inserted)
    }

    /// Get a setting.
    pub async fn get(&self, key: &str) -> AppResult<app_setting::Model> {
        self.setting_repo.get(key).await
    }

    /// List settings, optionally by category.
    pub async fn list(&self, category: Option<&str>) -> AppResult<Vec<app_setting::Model>> {
        self.setting_repo.find_all(category).await
    }

    /// Change a setting. Numeric settings must be positive integers.
    pub async fn set(&self, key: &str, value: String) -> AppResult<app_setting::Model> {
        let value = value.trim().to_string();
        if NUMERIC_KEYS.contains(&key) && !matches!(value.parse::<u32>(), Ok(n) if n > 0) {
            return Err(AppError::Validation(format!(
                "{key} must be a positive integer, got {value:?}"
            )));
        }
        if value.is_empty() {
            return Err(AppError::Validation(format!("{key} must not be empty")));
        }

        self.setting_repo.update_value(key, value).await
    }

    async fn read_u32(&self, key: &str) -> AppResult<u32> {
        let fallback = default_value(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);

        match self.setting_repo.find(key).await? {
            Some(setting) => match setting.value.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => {
                    tracing::warn!(key, value = %setting.value, "Unusable numeric setting, using default");
                    Ok(fallback)
                }
            },
            None => Ok(fallback),
        }
    }

    /// Character limit for generation prompts.
    pub async fn char_limit(&self) -> AppResult<u32> {
        self.read_u32(DEFAULT_CHAR_LIMIT).await
    }

    /// Default batch size.
    pub async fn batch_size(&self) -> AppResult<u32> {
        self.read_u32(DEFAULT_BATCH_SIZE).await
    }

    /// Characters of a campaign instruction echoed into the theme.
    pub async fn theme_echo_chars(&self) -> AppResult<usize> {
        Ok(self.read_u32(CAMPAIGN_THEME_ECHO_CHARS).await? as usize)
    }

    /// Default export destination.
    pub async fn export_destination(&self) -> AppResult<String> {
        Ok(self
            .setting_repo
            .find(EXPORT_DESTINATION)
            .await?
            .map(|s| s.value)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| default_value(EXPORT_DESTINATION).unwrap_or("posts").to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use castroom_db::test_utils::TestDatabase;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn setting(key: &str, value: &str) -> app_setting::Model {
        app_setting::Model {
            key: key.to_string(),
            value: value.to_string(),
            description: String::new(),
            category: "generation".to_string(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_char_limit_reads_stored_value() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Sqlite)
                .append_query_results([[setting(DEFAULT_CHAR_LIMIT, "200")]])
                .into_connection(),
        );
        let service = SettingsService::new(AppSettingRepository::new(db));

        assert_eq!(service.char_limit().await.unwrap(), 200);
    }

    #[tokio::test]
    async fn test_garbage_value_falls_back_to_default() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Sqlite)
                .append_query_results([[setting(DEFAULT_CHAR_LIMIT, "lots")]])
                .into_connection(),
        );
        let service = SettingsService::new(AppSettingRepository::new(db));

        assert_eq!(service.char_limit().await.unwrap(), 140);
    }

    #[tokio::test]
    async fn test_ensure_defaults_is_idempotent() {
        let db = TestDatabase::new().await.unwrap();
        let service = SettingsService::new(AppSettingRepository::new(db.shared()));

        assert_eq!(service.ensure_defaults().await.unwrap(), DEFAULT_SETTINGS.len());
        assert_eq!(service.ensure_defaults().await.unwrap(), 0);
        assert_eq!(service.theme_echo_chars().await.unwrap(), 30);
        assert_eq!(service.export_destination().await.unwrap(), "posts");
    }

    #[tokio::test]
    async fn test_set_rejects_non_numeric_limit() {
        let db = TestDatabase::new().await.unwrap();
        let service = SettingsService::new(AppSettingRepository::new(db.shared()));
        service.ensure_defaults().await.unwrap();

        let err = service
            .set(DEFAULT_CHAR_LIMIT, "0".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        service.set(DEFAULT_CHAR_LIMIT, " 120 ".to_string()).await.unwrap();
        assert_eq!(service.char_limit().await.unwrap(), 120);
    }
}

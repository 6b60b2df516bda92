use crate::core::alerts::{
    AlertSettings, DEFAULT_EXPIRY_WINDOW_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
    DEFAULT_MAINTENANCE_WINDOW_DAYS, MAX_ALERT_WINDOW_DAYS,
};
use crate::db::pool::{DEFAULT_BUSY_TIMEOUT, DEFAULT_POOL_SIZE, PoolOptions};
use crate::db::schema::SchemaSet;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = ".rportal";
const CONFIG_FILE: &str = "rportal.conf";
const DATABASE_FILE: &str = "rportal.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// `None` blocks until a connection frees up.
    #[serde(default)]
    pub acquire_timeout_ms: Option<u64>,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    #[serde(default = "default_apps")]
    pub apps: Vec<SchemaSet>,
    #[serde(default = "default_true")]
    pub nlp_enabled: bool,
    #[serde(default = "default_expiry_window")]
    pub expiry_window_days: i64,
    #[serde(default = "default_maintenance_window")]
    pub maintenance_window_days: i64,
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}
fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT.as_millis() as u64
}
fn default_apps() -> Vec<SchemaSet> {
    SchemaSet::ALL.to_vec()
}
fn default_true() -> bool {
    true
}
fn default_expiry_window() -> i64 {
    DEFAULT_EXPIRY_WINDOW_DAYS
}
fn default_maintenance_window() -> i64 {
    DEFAULT_MAINTENANCE_WINDOW_DAYS
}
fn default_low_stock() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file())
    }
}

impl Config {
    fn with_database(db: PathBuf) -> Self {
        Self {
            database: db.to_string_lossy().to_string(),
            pool_size: default_pool_size(),
            acquire_timeout_ms: None,
            busy_timeout_ms: default_busy_timeout_ms(),
            apps: default_apps(),
            nlp_enabled: true,
            expiry_window_days: default_expiry_window(),
            maintenance_window_days: default_maintenance_window(),
            low_stock_threshold: default_low_stock(),
            log_level: default_log_level(),
        }
    }

    /// `~/.rportal`, or `./.rportal` when no home directory is known.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DATABASE_FILE)
    }

    /// Load the user configuration, or defaults when there is none.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))?;
        fs::write(path, yaml)?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.pool_size == 0 {
            return Err(AppError::Config("pool_size must be at least 1".into()));
        }
        if self.apps.is_empty() {
            return Err(AppError::Config("apps must name at least one application".into()));
        }
        for (name, days) in [
            ("expiry_window_days", self.expiry_window_days),
            ("maintenance_window_days", self.maintenance_window_days),
        ] {
            if !(0..=MAX_ALERT_WINDOW_DAYS).contains(&days) {
                return Err(AppError::Config(format!(
                    "{name} must be between 0 and {MAX_ALERT_WINDOW_DAYS}"
                )));
            }
        }
        Ok(())
    }

    /// Write the config file (unless `is_test`) and return the database
    /// path it points to. A relative `custom_db` lands in the config dir.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => {
                let p = Path::new(name);
                if p.is_absolute() || is_test {
                    p.to_path_buf()
                } else {
                    dir.join(p)
                }
            }
            None => dir.join(DATABASE_FILE),
        };

        let config = Self::with_database(db_path);
        if !is_test {
            config.save_to(&Self::config_file())?;
        }
        Ok(config)
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            size: self.pool_size,
            acquire_timeout: self.acquire_timeout_ms.map(Duration::from_millis),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }

    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            expiry_window_days: self.expiry_window_days,
            maintenance_window_days: self.maintenance_window_days,
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("database: /tmp/x.sqlite\n").unwrap();
        assert_eq!(cfg.pool_size, 5);
        assert_eq!(cfg.acquire_timeout_ms, None);
        assert_eq!(cfg.busy_timeout_ms, 5000);
        assert_eq!(cfg.apps, SchemaSet::ALL.to_vec());
        assert_eq!(cfg.expiry_window_days, 30);
        assert_eq!(cfg.maintenance_window_days, 7);
        assert_eq!(cfg.low_stock_threshold, 5);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn apps_parse_lowercase() {
        let cfg: Config =
            serde_yaml::from_str("database: a.db\napps: [inventory, registrations]\n").unwrap();
        assert_eq!(cfg.apps, vec![SchemaSet::Inventory, SchemaSet::Registrations]);
    }

    #[test]
    fn zero_pool_is_rejected() {
        let cfg: Config = serde_yaml::from_str("database: a.db\npool_size: 0\n").unwrap();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn oversized_alert_window_is_rejected() {
        let cfg: Config =
            serde_yaml::from_str("database: a.db\nexpiry_window_days: 100000000\n").unwrap();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));

        let cfg: Config =
            serde_yaml::from_str("database: a.db\nmaintenance_window_days: 36500\n").unwrap();
        assert!(cfg.validate().is_ok());
    }
}

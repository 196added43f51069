use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub inbound_import: InboundImportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_max_upload_mb() -> usize {
    20
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    /// HMAC secret for bearer tokens; an empty secret rejects every token
    #[serde(default)]
    pub jwt_secret: String,
}

/// Tuning of the inbound import engine (u508)
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InboundImportSettings {
    /// How many top rows are searched for the header row
    pub header_scan_rows: usize,
    /// How far left of an identifier column box columns are searched
    pub block_scan_width: usize,
    /// Rows below the header sampled by column inference
    pub inference_sample_rows: usize,
    /// Keys per existence lookup against the store
    pub lookup_batch_size: usize,
    /// Rows per item insert statement
    pub insert_batch_size: usize,
    pub conflict_preview_limit: usize,
    pub issue_preview_limit: usize,
    pub identifier_header_synonyms: Vec<String>,
    pub box_header_synonyms: Vec<String>,
    pub scoring: ScoringTable,
}

impl Default for InboundImportSettings {
    fn default() -> Self {
        Self {
            header_scan_rows: 40,
            block_scan_width: 15,
            inference_sample_rows: 60,
            lookup_batch_size: 500,
            insert_batch_size: 1000,
            conflict_preview_limit: 50,
            issue_preview_limit: 200,
            identifier_header_synonyms: vec!["imei".into(), "serial".into(), "s/n".into()],
            box_header_synonyms: vec!["box".into(), "carton".into(), "ctn".into()],
            scoring: ScoringTable::default(),
        }
    }
}

/// Scores of the device resolver rules, highest priority first.
///
/// The raw-starts-with-key rule scores `prefix_base + key length`, so the
/// longest matching catalog key wins among prefix candidates.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringTable {
    pub exact: i64,
    pub prefix_base: i64,
    pub numeric_suffix: i64,
    pub reverse_prefix: i64,
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            exact: 1000,
            prefix_base: 500,
            numeric_suffix: 400,
            reverse_prefix: 300,
        }
    }
}

impl ScoringTable {
    pub fn validate(&self) -> anyhow::Result<()> {
        let ordered = self.exact > self.prefix_base
            && self.prefix_base > self.numeric_suffix
            && self.numeric_suffix > self.reverse_prefix
            && self.reverse_prefix > 0;
        if !ordered {
            anyhow::bail!(
                "inbound_import.scoring must satisfy exact > prefix_base > numeric_suffix > reverse_prefix > 0, got {:?}",
                self
            );
        }
        Ok(())
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
bind = "0.0.0.0:3000"

[database]
path = "target/db/app.db"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.inbound_import.scoring.validate()?;
    if config.auth.jwt_secret.is_empty() {
        tracing::warn!("auth.jwt_secret is empty: protected routes will reject every request");
    }
    Ok(config)
}

/// Load the configuration once and keep it for the lifetime of the process
pub fn init_config() -> anyhow::Result<&'static Config> {
    CONFIG.get_or_try_init(load_config)
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

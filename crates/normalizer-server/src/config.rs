//! Layered application settings (SPEC_FULL.md §4.I), grounded on
//! `control::config`'s base-file + env-overlay + environment-variable merge
//! order, and the separate store-config YAML document of spec.md §6.

use std::path::Path;

use normalizer_core::label_policy::LabelPolicyConfig;
use normalizer_core::store::{StoreBackendConfig, StoreDescriptor};
use serde::Deserialize;

fn app_env() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for CorsSettings {
    fn default() -> Self {
        CorsSettings { allowed_origins: default_allowed_origins() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub cors: CorsSettings,
    /// Per-`multi_get` batch ceiling; overridden by `EQ_BATCH_SIZE`.
    #[serde(default = "default_batch_size")]
    pub eq_batch_size: usize,
    /// Reported by `/status`; overridden by `BABEL_VERSION`.
    #[serde(default = "default_babel_version")]
    pub babel_version: String,
    /// Affects the advertised base URL in `/openapi.json`.
    #[serde(default)]
    pub server_root: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_batch_size() -> usize {
    normalizer_core::store::DEFAULT_BATCH_SIZE
}

fn default_babel_version() -> String {
    "dev".to_string()
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_application")]
    pub application: ApplicationSettings,
}

fn default_application() -> ApplicationSettings {
    ApplicationSettings {
        host: default_host(),
        port: default_port(),
        cors: CorsSettings::default(),
        eq_batch_size: default_batch_size(),
        babel_version: default_babel_version(),
        server_root: None,
    }
}

/// Loads `Settings` from `<config_dir>/base.{yaml,toml,json}` overlaid by
/// `<config_dir>/<APP_ENV>.*`, then by `NORMALIZER_`-prefixed environment
/// variables, matching `control::config`'s merge order. Missing files are
/// tolerated (defaults apply); malformed ones are not.
pub fn load_settings(config_dir: &Path) -> anyhow::Result<Settings> {
    let env = app_env();
    let builder = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base")).required(false))
        .add_source(config::File::from(config_dir.join(&env)).required(false))
        .add_source(
            config::Environment::with_prefix("NORMALIZER")
                .separator("__")
                .try_parsing(true),
        );
    let settings = builder.build()?.try_deserialize().unwrap_or_else(|_| default_application_settings());

    Ok(apply_env_overrides(settings))
}

fn default_application_settings() -> Settings {
    Settings { application: default_application() }
}

fn apply_env_overrides(mut settings: Settings) -> Settings {
    if let Ok(batch_size) = std::env::var("EQ_BATCH_SIZE") {
        if let Ok(parsed) = batch_size.parse() {
            settings.application.eq_batch_size = parsed;
        }
    }
    if let Ok(version) = std::env::var("BABEL_VERSION") {
        settings.application.babel_version = version;
    }
    if let Ok(root) = std::env::var("SERVER_ROOT") {
        settings.application.server_root = Some(root);
    }
    settings
}

/// Loads the store-config YAML document (spec.md §6): logical store name ->
/// backend descriptor. `REDIS_HOST`/`REDIS_PORT` override the default
/// non-cluster descriptor fields of every entry that omits them.
pub fn load_store_config(path: &Path) -> anyhow::Result<StoreBackendConfig> {
    let bytes = std::fs::read(path)?;
    let mut config: StoreBackendConfig = serde_yaml::from_slice(&bytes)?;
    apply_redis_env_overrides(&mut config);
    Ok(config)
}

fn apply_redis_env_overrides(config: &mut StoreBackendConfig) {
    let host_override = std::env::var("REDIS_HOST").ok();
    let port_override = std::env::var("REDIS_PORT").ok().and_then(|p| p.parse::<u16>().ok());
    if host_override.is_none() && port_override.is_none() {
        return;
    }
    for descriptor in config.values_mut() {
        if let StoreDescriptor::Standalone { host, port, .. } = descriptor {
            if let Some(h) = &host_override {
                *host = h.clone();
            }
            if let Some(p) = port_override {
                *port = p;
            }
        }
    }
}

/// Loads the label-priority policy document (`preferred_name_boost_prefixes`
/// + `demote_labels_longer_than`) from a JSON file, per spec.md §9's "Label
/// policy externalization" note.
pub fn load_label_policy(path: &Path) -> anyhow::Result<LabelPolicyConfig> {
    let bytes = std::fs::read(path)?;
    Ok(LabelPolicyConfig::from_json(&bytes)?)
}

/// Used when no label-policy file is configured: an empty boost table with
/// the spec-default demotion threshold.
pub fn default_label_policy() -> LabelPolicyConfig {
    serde_json::from_value(serde_json::json!({})).unwrap_or_default()
}

use crate::domain::registry::ModuleRegistry;
use anyhow::Context;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub cors: CorsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub rawdata_root: PathBuf,
    pub reports_root: PathBuf,
    pub module_registry: PathBuf,
    pub database: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CorsSettings {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// `config/service.*` overlaid with `TRAJECTORY__SECTION__KEY` environment variables.
pub fn load_service_config() -> anyhow::Result<ServiceConfig> {
    service_config_from(config::File::with_name("config/service"))
}

fn service_config_from<S>(source: S) -> anyhow::Result<ServiceConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(source)
        .add_source(
            config::Environment::with_prefix("TRAJECTORY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_module_registry(path: &Path) -> anyhow::Result<ModuleRegistry> {
    if !path.exists() {
        anyhow::bail!(
            "no module registry file found at {}; make sure it exists and restart the server",
            path.display()
        );
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read module registry {}", path.display()))?;
    let contents = serde_json::from_str(&raw)
        .with_context(|| format!("module registry {} is not valid JSON", path.display()))?;
    Ok(ModuleRegistry::new(contents))
}

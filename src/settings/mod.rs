use std::{env, path::Path};
use serde::Deserialize;
use tracing::Level;

mod gateway;
pub mod logging;
mod publisher;
mod discovery;
mod error;

pub use gateway::{FlushMode, GatewaySettings};
pub use logging::LogSettings;
pub use publisher::{PublishMode, PublisherSettings};
pub use discovery::DiscoverySettings;
pub use error::SettingsError;

pub type Result<T> = std::result::Result<T, SettingsError>;
pub use gateway::parse_env_var;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 게이트웨이 동작 설정
    #[serde(default)]
    pub gateway: GatewaySettings,

    // Traefik 반영 설정
    #[serde(default)]
    pub publisher: PublisherSettings,

    // 디스커버리 피드 설정
    #[serde(default)]
    pub discovery: DiscoverySettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,
}

impl Settings {
    /// `GATEWAY_CONFIG_FILE`이 있으면 TOML 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var("GATEWAY_CONFIG_FILE") {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env()
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| SettingsError::ParseError { source: e })?;

        settings.finish()
    }

    pub fn from_env() -> Result<Self> {
        let settings = Self {
            gateway: GatewaySettings::from_env()?,
            publisher: PublisherSettings::from_env()?,
            discovery: DiscoverySettings::from_env()?,
            logging: LogSettings::from_env()?,
        };

        settings.finish()
    }

    /// 설정 유효성 검증
    pub fn validate(&self) -> Result<()> {
        self.gateway.validate()?;
        self.publisher.validate()?;
        self.discovery.validate()?;
        Ok(())
    }

    // 검증 후 디버그 모드를 로그 레벨에 반영
    fn finish(mut self) -> Result<Self> {
        self.validate()?;

        if self.gateway.debug && self.logging.level < Level::DEBUG {
            self.logging.level = Level::DEBUG;
        }

        Ok(self)
    }
}

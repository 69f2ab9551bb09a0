use serde::Deserialize;
use std::{env, path::PathBuf};
use super::{parse_env_var, SettingsError};

/// 라우팅 설정을 Traefik에 전달하는 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Traefik web provider API로 PUT
    Http,
    /// Traefik file provider가 감시하는 파일에 기록
    File,
}

impl Default for PublishMode {
    fn default() -> Self {
        PublishMode::Http
    }
}

impl std::str::FromStr for PublishMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(PublishMode::Http),
            "file" => Ok(PublishMode::File),
            _ => Err(format!("Invalid publish mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublisherSettings {
    #[serde(default)]
    pub mode: PublishMode,

    /// Traefik 서버 주소 (`<host>[:port]`)
    #[serde(default = "default_traefik_addr")]
    pub traefik_addr: String,

    /// 라우팅 설정 파일 경로 (file 모드)
    pub route_file: Option<PathBuf>,
}

fn default_traefik_addr() -> String {
    "localhost:8000".to_string()
}

impl PublisherSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            mode: parse_env_var("GATEWAY_PUBLISH_MODE", PublishMode::default)?,
            traefik_addr: parse_env_var("GATEWAY_TRAEFIK_ADDR", default_traefik_addr)?,
            route_file: env::var("GATEWAY_ROUTE_FILE")
                .ok()
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        match self.mode {
            PublishMode::Http => {
                if self.traefik_addr.trim().is_empty() {
                    return Err(SettingsError::EnvVarMissing {
                        var_name: "GATEWAY_TRAEFIK_ADDR".to_string(),
                    });
                }

                let parsed = url::Url::parse(&self.base_url()).map_err(|e| SettingsError::EnvVarInvalid {
                    var_name: "GATEWAY_TRAEFIK_ADDR".to_string(),
                    value: self.traefik_addr.clone(),
                    reason: e.to_string(),
                })?;

                if parsed.host_str().is_none() || parsed.path() != "/api/providers/web" {
                    return Err(SettingsError::EnvVarInvalid {
                        var_name: "GATEWAY_TRAEFIK_ADDR".to_string(),
                        value: self.traefik_addr.clone(),
                        reason: "주소는 <host>[:port] 형식이어야 합니다".to_string(),
                    });
                }
            }
            PublishMode::File => {
                if self.route_file.as_ref().map_or(true, |p| p.as_os_str().is_empty()) {
                    return Err(SettingsError::EnvVarMissing {
                        var_name: "GATEWAY_ROUTE_FILE".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Traefik web provider 엔드포인트
    pub fn base_url(&self) -> String {
        format!("http://{}/api/providers/web", self.traefik_addr.trim())
    }
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            mode: PublishMode::default(),
            traefik_addr: default_traefik_addr(),
            route_file: None,
        }
    }
}

use serde::Deserialize;
use std::env;
use super::{parse_env_var, SettingsError};

#[derive(Debug, Clone, Deserialize)]
pub struct DiscoverySettings {
    /// 디스커버리 서버 주소. 없으면 표준 입력에서 이벤트를 읽음
    pub address: Option<String>,

    /// 디스커버리 접근 토큰
    pub token: Option<String>,

    /// 연결 최대 시도 횟수
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// 재시도 간격 (초)
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
}

fn default_retry_attempts() -> u32 { 5 }
fn default_retry_interval() -> u64 { 2 }

impl DiscoverySettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            address: env::var("GATEWAY_DISCOVERY_ADDR").ok().filter(|v| !v.is_empty()),
            token: env::var("DATAWIRE_TOKEN").ok().filter(|v| !v.is_empty()),
            retry_attempts: parse_env_var("GATEWAY_DISCOVERY_RETRY_ATTEMPTS", default_retry_attempts)?,
            retry_interval: parse_env_var("GATEWAY_DISCOVERY_RETRY_INTERVAL", default_retry_interval)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.retry_attempts == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "GATEWAY_DISCOVERY_RETRY_ATTEMPTS".to_string(),
                value: self.retry_attempts.to_string(),
                reason: "최소 1회 이상 시도해야 합니다".to_string(),
            });
        }

        if let Some(address) = &self.address {
            if address.trim().is_empty() {
                return Err(SettingsError::EnvVarInvalid {
                    var_name: "GATEWAY_DISCOVERY_ADDR".to_string(),
                    value: address.clone(),
                    reason: "주소는 비어있을 수 없습니다".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            address: None,
            token: None,
            retry_attempts: default_retry_attempts(),
            retry_interval: default_retry_interval(),
        }
    }
}

use serde::Deserialize;
use std::env;
use std::time::Duration;
use super::SettingsError;

/// 라우팅 테이블 반영 시점
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlushMode {
    /// 주기적인 플러시 틱에서만 반영
    Scheduled,
    /// 이벤트 처리 직후 바로 반영
    Immediate,
}

impl Default for FlushMode {
    fn default() -> Self {
        FlushMode::Scheduled
    }
}

impl std::str::FromStr for FlushMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(FlushMode::Scheduled),
            "immediate" => Ok(FlushMode::Immediate),
            _ => Err(format!("Invalid flush mode: {}", s)),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct GatewaySettings {
    #[serde(default)]
    pub flush_mode: FlushMode,

    /// 플러시 주기 (초)
    #[serde(default = "default_flush_interval")]
    pub flush_interval: u64,

    /// 퍼블리시 타임아웃 (초)
    #[serde(default = "default_publish_timeout")]
    pub publish_timeout: u64,

    /// false면 라우트만 계산하고 Traefik에는 반영하지 않음
    #[serde(default = "default_update")]
    pub update: bool,

    /// 디버그 모드 (update 비활성화 + 디버그 로그)
    #[serde(default)]
    pub debug: bool,
}

fn default_flush_interval() -> u64 { 5 }
fn default_publish_timeout() -> u64 { 5 }
fn default_update() -> bool { true }

pub fn parse_env_var<T: std::str::FromStr, F: FnOnce() -> T>(name: &str, default: F) -> Result<T, SettingsError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(val) => val.parse().map_err(|e: T::Err| SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: val,
            reason: e.to_string(),
        }),
        Err(env::VarError::NotPresent) => Ok(default()),
        Err(e) => Err(SettingsError::EnvVarInvalid {
            var_name: name.to_string(),
            value: "".to_string(),
            reason: e.to_string(),
        }),
    }
}

impl GatewaySettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let settings = Self {
            flush_mode: parse_env_var("GATEWAY_FLUSH_MODE", FlushMode::default)?,
            flush_interval: parse_env_var("GATEWAY_FLUSH_INTERVAL", default_flush_interval)?,
            publish_timeout: parse_env_var("GATEWAY_PUBLISH_TIMEOUT", default_publish_timeout)?,
            update: !parse_env_var::<bool, _>("GATEWAY_NO_UPDATE", || false)?,
            debug: parse_env_var::<bool, _>("GATEWAY_DEBUG", || false)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.flush_interval == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "GATEWAY_FLUSH_INTERVAL".to_string(),
                value: self.flush_interval.to_string(),
                reason: "플러시 주기는 0보다 커야 합니다".to_string(),
            });
        }

        if self.publish_timeout == 0 {
            return Err(SettingsError::EnvVarInvalid {
                var_name: "GATEWAY_PUBLISH_TIMEOUT".to_string(),
                value: self.publish_timeout.to_string(),
                reason: "퍼블리시 타임아웃은 0보다 커야 합니다".to_string(),
            });
        }

        Ok(())
    }

    /// 실제로 Traefik에 반영할지 여부. 디버그 모드는 항상 반영하지 않습니다.
    pub fn update_enabled(&self) -> bool {
        self.update && !self.debug
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout)
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            flush_mode: FlushMode::default(),
            flush_interval: default_flush_interval(),
            publish_timeout: default_publish_timeout(),
            update: default_update(),
            debug: false,
        }
    }
}

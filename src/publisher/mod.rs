//! 라우팅 테이블을 Traefik 설정 형식으로 직렬화해 전달하는 모듈입니다.
//!
//! 항상 전체 테이블을 보내며 차이(diff)는 보내지 않습니다.

mod error;
mod document;
mod http;
mod file;

pub use error::PublishError;
pub use document::{
    BackendConfig,
    FrontendConfig,
    LoadBalancerConfig,
    ProxyConfig,
    RouteRule,
    ServerConfig,
    EMPTY_FILE_CONFIG,
    ROUTE_NAME,
};
pub use http::HttpPublisher;
pub use file::FilePublisher;

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;

use crate::settings::{PublishMode, PublisherSettings};

/// 라우팅 설정을 외부 프록시에 반영하는 대상
#[async_trait]
pub trait Publisher: Send + Sync {
    /// 로그에 남길 대상 설명
    fn describe(&self) -> String;

    /// 전체 라우팅 설정을 교체합니다.
    async fn publish(&self, config: &ProxyConfig) -> Result<(), PublishError>;
}

/// 제한 시간 안에 설정을 반영합니다. 시간이 지나면 `Timeout` 에러를 반환합니다.
pub async fn publish_with_timeout(
    publisher: &dyn Publisher,
    config: &ProxyConfig,
    timeout: Duration,
) -> Result<(), PublishError> {
    match tokio::time::timeout(timeout, publisher.publish(config)).await {
        Ok(result) => result,
        Err(_) => Err(PublishError::Timeout { after: timeout }),
    }
}

/// 설정에 맞는 퍼블리셔를 생성합니다.
pub fn from_settings(settings: &PublisherSettings) -> Result<Arc<dyn Publisher>, PublishError> {
    match settings.mode {
        PublishMode::Http => Ok(Arc::new(HttpPublisher::new(&settings.base_url())?)),
        PublishMode::File => {
            let path = settings.route_file.clone().ok_or_else(|| PublishError::InvalidEndpoint {
                endpoint: "file".to_string(),
                reason: "라우팅 설정 파일 경로가 없습니다".to_string(),
            })?;
            Ok(Arc::new(FilePublisher::new(path)))
        }
    }
}

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request, Uri};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use super::{ProxyConfig, PublishError, Publisher};

/// Traefik web provider API에 전체 라우팅 설정을 PUT 하는 퍼블리셔
pub struct HttpPublisher {
    endpoint: Uri,
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HttpPublisher {
    pub fn new(endpoint: &str) -> Result<Self, PublishError> {
        let endpoint = endpoint.parse::<Uri>().map_err(|e| PublishError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for HttpPublisher {
    fn describe(&self) -> String {
        format!("http {}", self.endpoint)
    }

    async fn publish(&self, config: &ProxyConfig) -> Result<(), PublishError> {
        let body = config.to_json()?;
        let endpoint = self.endpoint.to_string();

        let request = Request::builder()
            .method(Method::PUT)
            .uri(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| PublishError::Http {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;

        let response = self.client.request(request).await.map_err(|e| PublishError::Http {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let body = match response.into_body().collect().await {
            Ok(collected) => String::from_utf8_lossy(&collected.to_bytes()).into_owned(),
            Err(e) => {
                warn!(endpoint = %endpoint, status = %status, error = %e, "Traefik 응답 본문 읽기 실패");
                format!("<응답 본문 읽기 실패: {}>", e)
            }
        };

        if !status.is_success() {
            return Err(PublishError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        debug!(endpoint = %endpoint, status = %status, "Traefik 라우팅 설정 전송 완료");
        Ok(())
    }
}

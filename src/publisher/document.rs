use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::publisher::PublishError;
use crate::routing::RouteSnapshot;

/// 프론트엔드 라우트 규칙 이름
pub const ROUTE_NAME: &str = "api";

/// 빈 라우팅 테이블을 파일로 기록할 때 사용하는 문자열입니다.
///
/// Traefik은 비어있는 설정 파일을 유효하지 않은 것으로 보고 리로드하지 않으므로
/// 섹션만 있는 문서를 기록해야 합니다.
pub const EMPTY_FILE_CONFIG: &str = "[frontends]\n\n[backends]\n";

/// Traefik v1 라우팅 설정 문서 (`{frontends, backends}`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub frontends: BTreeMap<String, FrontendConfig>,
    #[serde(default)]
    pub backends: BTreeMap<String, BackendConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendConfig {
    pub backend: String,
    #[serde(default)]
    pub routes: BTreeMap<String, RouteRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(rename = "loadBalancer")]
    pub load_balancer: LoadBalancerConfig,
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadBalancerConfig {
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
}

impl ProxyConfig {
    pub fn is_empty(&self) -> bool {
        self.frontends.is_empty() && self.backends.is_empty()
    }

    /// web provider API 요청 본문
    pub fn to_json(&self) -> Result<Vec<u8>, PublishError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// file provider 설정 파일 내용. 빈 테이블은 [`EMPTY_FILE_CONFIG`]로 기록합니다.
    pub fn to_toml(&self) -> Result<String, PublishError> {
        if self.is_empty() {
            return Ok(EMPTY_FILE_CONFIG.to_string());
        }
        Ok(toml::to_string(self)?)
    }
}

impl From<&RouteSnapshot> for ProxyConfig {
    fn from(snapshot: &RouteSnapshot) -> Self {
        let frontends = snapshot
            .frontends
            .iter()
            .map(|(id, frontend)| {
                let mut routes = BTreeMap::new();
                routes.insert(ROUTE_NAME.to_string(), RouteRule { rule: frontend.rule() });
                (id.clone(), FrontendConfig {
                    backend: frontend.backend.clone(),
                    routes,
                })
            })
            .collect();

        let backends = snapshot
            .backends
            .iter()
            .map(|(id, pool)| {
                let servers = pool
                    .servers
                    .iter()
                    .map(|(node_id, address)| (node_id.clone(), ServerConfig { url: address.clone() }))
                    .collect();
                (id.clone(), BackendConfig {
                    load_balancer: LoadBalancerConfig { method: pool.method.to_string() },
                    servers,
                })
            })
            .collect();

        Self { frontends, backends }
    }
}

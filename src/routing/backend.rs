use std::collections::BTreeMap;

/// 모든 백엔드 풀에 고정으로 적용되는 로드 밸런싱 방식
pub const LOAD_BALANCER_METHOD: &str = "drr";

/// 백엔드 풀 식별자를 생성합니다.
pub fn backend_id(service: &str, suffix: &str) -> String {
    format!("be-{}-v{}", service, suffix)
}

/// 하나의 `(service, suffix)` 조합을 담당하는 서버 묶음입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendPool {
    /// 로드 밸런싱 방식 (항상 [`LOAD_BALANCER_METHOD`])
    pub method: &'static str,
    /// nodeId -> 서버 주소
    pub servers: BTreeMap<String, String>,
}

impl BackendPool {
    pub fn new() -> Self {
        Self {
            method: LOAD_BALANCER_METHOD,
            servers: BTreeMap::new(),
        }
    }

    /// 서버를 추가하거나 주소를 갱신합니다. 상태가 바뀌었으면 `true`.
    pub fn upsert_server(&mut self, node_id: &str, address: &str) -> bool {
        match self.servers.get(node_id) {
            Some(existing) if existing == address => false,
            _ => {
                self.servers.insert(node_id.to_string(), address.to_string());
                true
            }
        }
    }

    /// 서버를 제거합니다. 제거되었으면 `true`.
    pub fn remove_server(&mut self, node_id: &str) -> bool {
        self.servers.remove(node_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }
}

impl Default for BackendPool {
    fn default() -> Self {
        Self::new()
    }
}

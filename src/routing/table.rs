use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::routing::{
    backend_id,
    frontend_id,
    render_path_prefix,
    BackendPool,
    FrontendRoute,
};

/// 퍼블리셔가 직렬화에 사용하는 읽기 전용 라우팅 테이블 사본입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteSnapshot {
    pub frontends: BTreeMap<String, FrontendRoute>,
    pub backends: BTreeMap<String, BackendPool>,
}

impl RouteSnapshot {
    pub fn is_empty(&self) -> bool {
        self.frontends.is_empty() && self.backends.is_empty()
    }
}

/// 프론트엔드/백엔드 맵과 변경 여부(dirty)를 관리하는 라우팅 테이블입니다.
///
/// 모든 연산은 멱등이며, 실제로 상태가 바뀐 경우에만 dirty 플래그를 세웁니다.
/// 프론트엔드는 대응하는 백엔드 풀이 비어있지 않은 동안에만 존재합니다.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    frontends: BTreeMap<String, FrontendRoute>,
    backends: BTreeMap<String, BackendPool>,
    dirty: bool,
}

impl RouteTable {
    /// 빈 라우팅 테이블을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 백엔드 풀에 서버를 등록합니다. 풀이 없으면 새로 만듭니다.
    ///
    /// 상태가 바뀌었으면 `true`를 반환합니다. 나머지 변경 연산도 동일합니다.
    pub fn upsert_backend(&mut self, service: &str, suffix: &str, node_id: &str, address: &str) -> bool {
        let be_id = backend_id(service, suffix);

        let pool = self.backends.entry(be_id.clone()).or_insert_with(|| {
            info!(backend = %be_id, "새 백엔드 추가");
            BackendPool::new()
        });

        if pool.upsert_server(node_id, address) {
            debug!(backend = %be_id, node = %node_id, address = %address, "백엔드 서버 등록");
            self.dirty = true;
            true
        } else {
            debug!(backend = %be_id, node = %node_id, "백엔드 서버가 이미 등록되어 있음");
            false
        }
    }

    /// 프론트엔드를 등록하고 경로 규칙을 다시 계산합니다.
    ///
    /// 템플릿이 바뀌었으면 기존 프론트엔드에도 반영됩니다.
    pub fn upsert_frontend(&mut self, service: &str, suffix: &str, path_template: &str) -> bool {
        let fe_id = frontend_id(service, suffix);
        let be_id = backend_id(service, suffix);
        let path_prefix = render_path_prefix(path_template, service, suffix);

        match self.frontends.get_mut(&fe_id) {
            Some(existing) if existing.backend == be_id && existing.path_prefix == path_prefix => {
                debug!(frontend = %fe_id, "프론트엔드가 이미 등록되어 있음");
                false
            }
            Some(existing) => {
                info!(
                    frontend = %fe_id,
                    old_prefix = %existing.path_prefix,
                    new_prefix = %path_prefix,
                    "프론트엔드 경로 규칙 갱신"
                );
                existing.backend = be_id;
                existing.path_prefix = path_prefix;
                self.dirty = true;
                true
            }
            None => {
                info!(frontend = %fe_id, backend = %be_id, prefix = %path_prefix, "새 프론트엔드 추가");
                self.frontends.insert(fe_id, FrontendRoute::new(be_id, path_prefix));
                self.dirty = true;
                true
            }
        }
    }

    /// 백엔드 풀에서 서버를 제거합니다. 풀이 비면 풀도 삭제합니다.
    pub fn remove_backend(&mut self, service: &str, suffix: &str, node_id: &str) -> bool {
        let be_id = backend_id(service, suffix);

        let Some(pool) = self.backends.get_mut(&be_id) else {
            debug!(backend = %be_id, "존재하지 않는 백엔드");
            return false;
        };

        if !pool.remove_server(node_id) {
            debug!(backend = %be_id, node = %node_id, "등록되지 않은 노드는 제거할 수 없음");
            return false;
        }

        debug!(backend = %be_id, node = %node_id, "백엔드에서 노드 제거");
        self.dirty = true;

        if pool.is_empty() {
            self.backends.remove(&be_id);
            info!(backend = %be_id, "사용되지 않는 백엔드 제거");
        }
        true
    }

    /// 백엔드 풀이 없거나 비어있을 때만 프론트엔드를 제거합니다.
    pub fn remove_frontend(&mut self, service: &str, suffix: &str) -> bool {
        let fe_id = frontend_id(service, suffix);
        let be_id = backend_id(service, suffix);

        if !self.frontends.contains_key(&fe_id) {
            return false;
        }

        let live_servers = self.backends.get(&be_id).map_or(0, BackendPool::len);
        if live_servers > 0 {
            debug!(frontend = %fe_id, servers = live_servers, "백엔드가 남아있어 프론트엔드 유지");
            return false;
        }

        self.frontends.remove(&fe_id);
        self.dirty = true;
        info!(frontend = %fe_id, "백엔드가 없어 프론트엔드 제거");
        true
    }

    pub fn frontend(&self, id: &str) -> Option<&FrontendRoute> {
        self.frontends.get(id)
    }

    pub fn backend(&self, id: &str) -> Option<&BackendPool> {
        self.backends.get(id)
    }

    pub fn frontends(&self) -> &BTreeMap<String, FrontendRoute> {
        &self.frontends
    }

    pub fn backends(&self) -> &BTreeMap<String, BackendPool> {
        &self.backends
    }

    pub fn frontend_count(&self) -> usize {
        self.frontends.len()
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// 현재 상태의 사본을 만듭니다.
    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            frontends: self.frontends.clone(),
            backends: self.backends.clone(),
        }
    }
}

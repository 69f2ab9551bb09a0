use tracing::debug;

use crate::discovery::{DiscoveryEvent, Node};
use crate::routing::{expand_version, RouteTable, RoutingError};

/// 디스커버리 이벤트를 라우팅 테이블 변경으로 변환합니다.
///
/// 공개(public) 노드만 테이블에 추가합니다. 비공개 노드는 프론트엔드와
/// 백엔드 어느 쪽에도 등록되지 않습니다.
#[derive(Debug, Default)]
pub struct Reconciler {
    table: RouteTable,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut RouteTable {
        &mut self.table
    }

    /// 이벤트 하나를 처리하고 테이블이 바뀌었는지 반환합니다.
    ///
    /// 에러가 나면 테이블은 변경되지 않습니다.
    pub fn on_event(&mut self, event: DiscoveryEvent) -> Result<bool, RoutingError> {
        match event {
            DiscoveryEvent::NodeActive { node } => self.on_node_active(node.normalize()),
            DiscoveryEvent::NodeExpired { node } => self.on_node_expired(node.normalize()),
            DiscoveryEvent::Unknown => {
                debug!("처리되지 않는 디스커버리 이벤트");
                Ok(false)
            }
        }
    }

    fn on_node_active(&mut self, node: Node) -> Result<bool, RoutingError> {
        let node_id = Self::validate(&node)?;

        if !node.is_public() {
            debug!(service = %node.service, node = %node_id, "비공개 노드는 라우팅에서 제외");
            return Ok(false);
        }

        let template = node.path_template();
        let mut changed = false;
        for suffix in expand_version(&node.version) {
            changed |= self.table.upsert_backend(&node.service, &suffix, node_id, &node.address);
            changed |= self.table.upsert_frontend(&node.service, &suffix, template);
        }

        Ok(changed)
    }

    fn on_node_expired(&mut self, node: Node) -> Result<bool, RoutingError> {
        let node_id = Self::validate(&node)?;

        // 백엔드를 먼저 지워야 프론트엔드 제거 판단이 갱신된 풀을 봄
        let mut changed = false;
        for suffix in expand_version(&node.version) {
            changed |= self.table.remove_backend(&node.service, &suffix, node_id);
            changed |= self.table.remove_frontend(&node.service, &suffix);
        }

        Ok(changed)
    }

    fn validate(node: &Node) -> Result<&str, RoutingError> {
        if node.service.trim().is_empty() {
            return Err(RoutingError::InvalidNode {
                service: node.service.clone(),
                reason: "서비스 이름이 비어있음".to_string(),
            });
        }
        node.node_id()
    }
}

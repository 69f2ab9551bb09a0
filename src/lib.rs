//! Traefik Gateway는 서비스 디스커버리 이벤트를 받아 Traefik 라우팅 설정을
//! 자동으로 생성하고 반영하는 게이트웨이 컨트롤러입니다.
//!
//! # 주요 기능
//!
//! - 노드 활성/만료 이벤트 기반 라우팅 테이블 관리
//! - 시맨틱 버전 fan-out (`1.2.3` → `v1`, `v1.2`, `v1.2.3`)
//! - Traefik web provider API(HTTP PUT) 또는 TOML 파일로 설정 반영
//! - 주기적/즉시 플러시, 실패 시 다음 플러시에서 재시도
//!
//! # 예제
//!
//! ```
//! use traefik_gateway::routing::RouteTable;
//! use traefik_gateway::routing::DEFAULT_PATH_TEMPLATE;
//!
//! let mut table = RouteTable::new();
//! table.upsert_backend("foobar", "1", "n1", "http://127.0.0.1:5000");
//! table.upsert_frontend("foobar", "1", DEFAULT_PATH_TEMPLATE);
//!
//! let route = table.frontend("fe-foobar-v1").unwrap();
//! assert_eq!(route.rule(), "PathPrefixStrip: /foobar/api/v1");
//! assert!(table.is_dirty());
//! ```
//!
//! # 이벤트 처리
//!
//! ```
//! use traefik_gateway::discovery::{DiscoveryEvent, Node};
//! use traefik_gateway::gateway::Reconciler;
//!
//! let mut reconciler = Reconciler::new();
//! let node = Node::new("foobar", "1.2.3", "http://127.0.0.1:5000")
//!     .with_property("datawire_nodeId", "n1");
//!
//! reconciler.on_event(DiscoveryEvent::NodeActive { node }).unwrap();
//! assert_eq!(reconciler.table().frontend_count(), 3);
//! ```

pub mod logging;
pub mod routing;
pub mod discovery;
pub mod publisher;
pub mod gateway;
pub mod settings;

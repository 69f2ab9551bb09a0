//! 디스커버리 노드로부터 Traefik 프론트엔드/백엔드를 도출하는 라우팅 핵심 모듈입니다.

mod error;
mod version;
mod path;
mod backend;
mod frontend;
mod table;

pub use error::RoutingError;
pub use version::{expand_version, SemanticVersion};
pub use path::{render_path_prefix, DEFAULT_PATH_TEMPLATE};
pub use backend::{backend_id, BackendPool, LOAD_BALANCER_METHOD};
pub use frontend::{frontend_id, FrontendRoute};
pub use table::{RouteSnapshot, RouteTable};

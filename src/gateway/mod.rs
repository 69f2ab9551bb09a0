//! 디스커버리 이벤트를 받아 라우팅 테이블을 갱신하고 Traefik에 반영하는 액터

mod error;
mod manager;
mod reconciler;
mod scheduler;

pub use error::Error;
pub use manager::{FlushStats, Gateway, GatewayHandle, GatewayMessage, GatewayOptions};
pub use reconciler::Reconciler;
pub use scheduler::{FlushScheduler, SchedulerHandle};


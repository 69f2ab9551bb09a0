use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{Error, FlushScheduler, Reconciler, SchedulerHandle};
use crate::discovery::DiscoveryEvent;
use crate::publisher::{publish_with_timeout, ProxyConfig, PublishError, Publisher};
use crate::routing::{RouteSnapshot, RouteTable};
use crate::settings::{FlushMode, GatewaySettings};

const QUEUE_CAPACITY: usize = 1024;

/// 게이트웨이 큐에 들어오는 메시지
///
/// 디스커버리 이벤트, 스케줄러 틱, 반영 완료 통지가 모두 하나의 큐를 거쳐
/// 순서대로 처리되므로 라우팅 테이블에는 락이 필요 없습니다.
#[derive(Debug)]
pub enum GatewayMessage {
    Discovery(DiscoveryEvent),
    Tick,
    PublishCompleted(Result<(), PublishError>),
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub flush_mode: FlushMode,
    pub flush_interval: Duration,
    pub publish_timeout: Duration,
    /// false면 반영하지 않고 로그만 남깁니다 (no-update / debug)
    pub update: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self::from(&GatewaySettings::default())
    }
}

impl From<&GatewaySettings> for GatewayOptions {
    fn from(settings: &GatewaySettings) -> Self {
        Self {
            flush_mode: settings.flush_mode,
            flush_interval: settings.flush_interval(),
            publish_timeout: settings.publish_timeout(),
            update: settings.update_enabled(),
        }
    }
}

/// 플러시 결과 집계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    pub published: u64,
    pub failed: u64,
    pub skipped: u64,
    pub dry_runs: u64,
}

/// 라우팅 테이블을 단독 소유하는 게이트웨이 액터
pub struct Gateway {
    reconciler: Reconciler,
    publisher: Arc<dyn Publisher>,
    options: GatewayOptions,
    tx: mpsc::Sender<GatewayMessage>,
    rx: mpsc::Receiver<GatewayMessage>,
    in_flight: bool,
    stats: FlushStats,
}

/// 게이트웨이에 메시지를 보내는 핸들. 복제해서 여러 곳에서 사용할 수 있습니다.
#[derive(Clone)]
pub struct GatewayHandle {
    tx: mpsc::Sender<GatewayMessage>,
}

impl Gateway {
    pub fn new(publisher: Arc<dyn Publisher>, options: GatewayOptions) -> (Self, GatewayHandle) {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let handle = GatewayHandle { tx: tx.clone() };

        let gateway = Self {
            reconciler: Reconciler::new(),
            publisher,
            options,
            tx,
            rx,
            in_flight: false,
            stats: FlushStats::default(),
        };

        (gateway, handle)
    }

    pub fn table(&self) -> &RouteTable {
        self.reconciler.table()
    }

    pub fn stats(&self) -> FlushStats {
        self.stats
    }

    pub fn is_publishing(&self) -> bool {
        self.in_flight
    }

    /// 큐에서 다음 메시지를 꺼냅니다.
    pub async fn next_message(&mut self) -> Option<GatewayMessage> {
        self.rx.recv().await
    }

    /// 종료 메시지를 받을 때까지 큐를 처리하고 마지막 라우팅 상태를 반환합니다.
    pub async fn run(mut self) -> RouteSnapshot {
        info!(
            publisher = %self.publisher.describe(),
            flush_mode = ?self.options.flush_mode,
            interval = ?self.options.flush_interval,
            update = self.options.update,
            "게이트웨이 시작"
        );

        let scheduler = FlushScheduler::new(self.options.flush_interval).spawn(self.tx.clone());

        while let Some(message) = self.rx.recv().await {
            if self.handle(message).is_break() {
                break;
            }
        }

        self.shutdown(scheduler).await;
        self.reconciler.table().snapshot()
    }

    /// 메시지 하나를 처리합니다. 종료 메시지면 `Break`를 반환합니다.
    pub fn handle(&mut self, message: GatewayMessage) -> ControlFlow<()> {
        match message {
            GatewayMessage::Discovery(event) => {
                match self.reconciler.on_event(event) {
                    Ok(changed) => debug!(changed, "디스커버리 이벤트 처리"),
                    Err(e) => {
                        warn!(error = %e, "디스커버리 이벤트 무시");
                        return ControlFlow::Continue(());
                    }
                }

                if self.options.flush_mode == FlushMode::Immediate && self.table().is_dirty() {
                    self.flush();
                }
            }
            GatewayMessage::Tick => {
                if self.table().is_dirty() {
                    self.flush();
                } else {
                    debug!("변경 사항 없음, 플러시 생략");
                }
            }
            GatewayMessage::PublishCompleted(result) => {
                self.in_flight = false;
                self.on_publish_completed(result);
            }
            GatewayMessage::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// 현재 테이블을 퍼블리셔에 넘깁니다.
    ///
    /// 반영이 진행 중이면 건너뛰고 dirty 상태를 유지해 다음 틱에서 다시 시도합니다.
    fn flush(&mut self) {
        if self.in_flight {
            self.stats.skipped += 1;
            debug!("이전 반영이 진행 중이라 플러시 생략");
            return;
        }

        let snapshot = self.reconciler.table().snapshot();
        self.reconciler.table_mut().mark_clean();
        let config = ProxyConfig::from(&snapshot);

        if !self.options.update {
            self.stats.dry_runs += 1;
            match config.to_json() {
                Ok(body) => info!(
                    frontends = snapshot.frontends.len(),
                    backends = snapshot.backends.len(),
                    config = %String::from_utf8_lossy(&body),
                    "업데이트 비활성화: 라우팅 설정을 반영하지 않음"
                ),
                Err(e) => warn!(error = %e, "라우팅 설정 직렬화 실패"),
            }
            return;
        }

        self.in_flight = true;
        debug!(
            frontends = snapshot.frontends.len(),
            backends = snapshot.backends.len(),
            "라우팅 설정 반영 시작"
        );

        let publisher = Arc::clone(&self.publisher);
        let tx = self.tx.clone();
        let timeout = self.options.publish_timeout;
        tokio::spawn(async move {
            let result = publish_with_timeout(publisher.as_ref(), &config, timeout).await;
            let _ = tx.send(GatewayMessage::PublishCompleted(result)).await;
        });
    }

    fn on_publish_completed(&mut self, result: Result<(), PublishError>) {
        match result {
            Ok(()) => {
                self.stats.published += 1;
                info!(
                    frontends = self.table().frontend_count(),
                    backends = self.table().backend_count(),
                    "라우팅 설정 반영 완료"
                );
            }
            Err(e) => {
                self.stats.failed += 1;
                self.reconciler.table_mut().mark_dirty();
                error!(error = %e, "라우팅 설정 반영 실패, 다음 플러시에서 재시도");
            }
        }
    }

    async fn shutdown(&mut self, scheduler: SchedulerHandle) {
        let ticks = scheduler.stop().await;
        info!(ticks, "게이트웨이 종료 중");

        // 진행 중인 반영 결과를 기다림
        let deadline = tokio::time::Instant::now() + self.options.publish_timeout * 2;
        while self.in_flight {
            match tokio::time::timeout_at(deadline, self.rx.recv()).await {
                Ok(Some(GatewayMessage::PublishCompleted(result))) => {
                    self.in_flight = false;
                    self.on_publish_completed(result);
                }
                Ok(Some(message)) => debug!(?message, "종료 중 수신한 메시지 무시"),
                Ok(None) | Err(_) => {
                    warn!("진행 중인 반영 결과를 기다리지 못함");
                    self.in_flight = false;
                    self.reconciler.table_mut().mark_dirty();
                }
            }
        }

        if !self.table().is_dirty() {
            info!("게이트웨이 종료");
            return;
        }

        let snapshot = self.reconciler.table().snapshot();
        self.reconciler.table_mut().mark_clean();

        if !self.options.update {
            self.stats.dry_runs += 1;
            info!("업데이트 비활성화: 마지막 플러시 생략");
            return;
        }

        let config = ProxyConfig::from(&snapshot);
        let result = publish_with_timeout(self.publisher.as_ref(), &config, self.options.publish_timeout).await;
        self.on_publish_completed(result);
        info!("게이트웨이 종료");
    }
}

impl GatewayHandle {
    pub async fn send_event(&self, event: DiscoveryEvent) -> Result<(), Error> {
        self.send(GatewayMessage::Discovery(event)).await
    }

    /// 스케줄러와 별개로 즉시 플러시를 요청합니다.
    pub async fn tick(&self) -> Result<(), Error> {
        self.send(GatewayMessage::Tick).await
    }

    pub async fn shutdown(&self) -> Result<(), Error> {
        self.send(GatewayMessage::Shutdown).await
    }

    async fn send(&self, message: GatewayMessage) -> Result<(), Error> {
        self.tx
            .send(message)
            .await
            .map_err(|_| Error::ChannelClosed("게이트웨이 큐가 닫혔습니다".to_string()))
    }

    /// 디스커버리 이벤트 스트림을 게이트웨이 큐로 전달하는 태스크를 시작합니다.
    ///
    /// 스트림이 끝나면 태스크도 끝납니다. 종료 여부는 호출 측이 결정합니다.
    pub fn forward(&self, mut events: mpsc::Receiver<DiscoveryEvent>) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if tx.send(GatewayMessage::Discovery(event)).await.is_err() {
                    debug!("게이트웨이 큐가 닫혀 이벤트 전달 중단");
                    return;
                }
            }
            warn!("디스커버리 이벤트 스트림 종료");
        })
    }
}

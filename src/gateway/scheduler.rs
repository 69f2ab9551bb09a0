use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::GatewayMessage;

/// 고정 주기로 게이트웨이 큐에 플러시 틱을 넣는 타이머
///
/// 틱 처리 결과(플러시 실패 포함)와 무관하게 계속 재무장하며,
/// 정지 신호를 받거나 큐가 닫히면 다시 무장하지 않습니다.
/// 큐가 가득 차 있으면 그 틱은 버립니다. dirty 상태는 테이블에 남아 있으므로
/// 다음 틱에서 반영됩니다.
pub struct FlushScheduler {
    interval: Duration,
}

/// 실행 중인 스케줄러 제어 핸들
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl FlushScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn spawn(self, tx: mpsc::Sender<GatewayMessage>) -> SchedulerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks = 0u64;

            loop {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        match tx.try_send(GatewayMessage::Tick) {
                            Ok(()) => ticks += 1,
                            Err(TrySendError::Full(_)) => debug!("게이트웨이 큐가 가득 차 틱 생략"),
                            Err(TrySendError::Closed(_)) => {
                                debug!("게이트웨이 큐가 닫혀 스케줄러 종료");
                                break;
                            }
                        }
                    }
                }
            }

            debug!(ticks, "플러시 스케줄러 정지");
            ticks
        });

        SchedulerHandle { stop_tx, task }
    }
}

impl SchedulerHandle {
    /// 스케줄러를 정지하고 지금까지 보낸 틱 수를 반환합니다.
    pub async fn stop(self) -> u64 {
        let _ = self.stop_tx.send(true);
        self.task.await.unwrap_or_default()
    }
}

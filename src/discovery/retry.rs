use tokio::time::Duration;
use tracing::{debug, warn};

use crate::discovery::DiscoveryError;
use crate::settings::DiscoverySettings;

/// 디스커버리 서버 재연결 정책
///
/// `max_attempts`는 세션을 열지 못하고 연속으로 실패한 횟수에만 적용됩니다.
/// 서버가 연결을 정상 종료(EOF)해서 다시 붙는 경우는 예산을 쓰지 않습니다.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 연속 실패 허용 횟수
    pub max_attempts: u32,
    /// 재연결 전 대기 시간
    pub interval: Duration,
}

impl From<&DiscoverySettings> for RetryPolicy {
    fn from(settings: &DiscoverySettings) -> Self {
        Self {
            max_attempts: settings.retry_attempts,
            interval: Duration::from_secs(settings.retry_interval),
        }
    }
}

/// 피드 세션 사이의 연속 실패를 세는 재연결 예산
///
/// 구독 요청까지 보낸 세션이 열리면 `session_opened`로 예산이 다시 채워집니다.
#[derive(Debug)]
pub struct ReconnectBudget {
    policy: RetryPolicy,
    failures: u32,
}

impl ReconnectBudget {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, failures: 0 }
    }

    /// 마지막 세션 이후 연속으로 실패한 횟수
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// 세션이 끝난 뒤 다시 연결하기 전에 기다릴 시간
    pub fn interval(&self) -> Duration {
        self.policy.interval
    }

    pub fn session_opened(&mut self) {
        if self.failures > 0 {
            debug!(failures = self.failures, "디스커버리 세션 복구, 재연결 예산 초기화");
        }
        self.failures = 0;
    }

    /// 세션 열기 실패를 기록합니다.
    ///
    /// 다시 시도할 수 있으면 대기 시간을, 예산을 다 썼거나 복구할 수 없는
    /// 오류면 `None`을 반환합니다.
    pub fn on_failure(&mut self, error: &DiscoveryError) -> Option<Duration> {
        self.failures += 1;

        if !error.is_retryable() || self.failures >= self.policy.max_attempts {
            return None;
        }

        warn!(
            error = %error,
            attempt = self.failures,
            max_attempts = self.policy.max_attempts,
            "디스커버리 세션 열기 실패, 재시도 예정"
        );
        Some(self.policy.interval)
    }
}

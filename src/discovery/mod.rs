//! 디스커버리 피드로부터 노드 생명주기 이벤트를 수신하는 모듈입니다.
//!
//! 피드는 줄 단위 JSON 이벤트(`{"type":"NodeActive","node":{...}}`)를 전달합니다.
//! 표준 입력 또는 TCP 연결을 소스로 사용할 수 있습니다. TCP 연결이 끊기면
//! 다시 연결하며, 재시도 횟수 제한은 연결이 연속으로 실패할 때만 적용됩니다.

mod events_types;
mod error_types;
mod retry;

pub use events_types::{
    DiscoveryEvent,
    FeedRequest,
    Node,
    NODE_ID_FALLBACK_PROPERTY,
    NODE_ID_PROPERTY,
    PATH_PREFIX_PROPERTY,
    PUBLIC_PROPERTY,
};
pub use error_types::DiscoveryError;
pub use retry::{ReconnectBudget, RetryPolicy};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::settings::DiscoverySettings;

/// 이벤트 채널 버퍼 크기
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 이벤트 스트림 소스
#[derive(Debug, Clone, PartialEq)]
pub enum FeedSource {
    /// 표준 입력
    Stdin,
    /// TCP 디스커버리 서버
    Tcp {
        address: String,
        token: Option<String>,
    },
}

/// 스트림 하나를 끝까지 읽은 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// 소스가 닫힘
    Eof,
    /// 수신측이 채널을 닫음
    ReceiverClosed,
}

/// 한 줄을 디스커버리 이벤트로 디코딩합니다.
pub fn decode_event(line: &str) -> Result<DiscoveryEvent, DiscoveryError> {
    serde_json::from_str(line).map_err(|e| DiscoveryError::DecodeError {
        line: line.to_string(),
        source: e,
    })
}

/// 줄 단위 JSON 스트림을 읽어 이벤트 채널로 전달합니다.
///
/// 디코딩할 수 없는 줄은 로그만 남기고 건너뜁니다.
pub async fn read_events<R>(reader: R, tx: &mpsc::Sender<DiscoveryEvent>) -> Result<StreamEnd, DiscoveryError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    loop {
        let line = lines.next_line().await.map_err(|e| DiscoveryError::ReadError {
            source: e,
            context: "이벤트 줄 읽기".to_string(),
        })?;

        let Some(line) = line else {
            return Ok(StreamEnd::Eof);
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match decode_event(line) {
            Ok(event) => {
                debug!(event = ?event, "디스커버리 이벤트 수신");
                if tx.send(event).await.is_err() {
                    return Ok(StreamEnd::ReceiverClosed);
                }
            }
            Err(e) => warn!(error = %e, "디코딩할 수 없는 이벤트 무시"),
        }
    }
}

/// 구독 요청까지 마친 TCP 연결
///
/// 쓰기 쪽은 세션이 끝날 때까지 닫지 않습니다.
struct FeedSession {
    reader: BufReader<OwnedReadHalf>,
    _writer: OwnedWriteHalf,
}

/// 디스커버리 피드 구독자
pub struct DiscoveryFeed {
    source: FeedSource,
    retry: RetryPolicy,
}

impl DiscoveryFeed {
    pub fn new(source: FeedSource, retry: RetryPolicy) -> Self {
        Self { source, retry }
    }

    pub fn from_settings(settings: &DiscoverySettings) -> Self {
        let source = match &settings.address {
            Some(address) => FeedSource::Tcp {
                address: address.clone(),
                token: settings.token.clone(),
            },
            None => FeedSource::Stdin,
        };
        Self::new(source, RetryPolicy::from(settings))
    }

    /// 피드를 구독하고 이벤트 수신 채널을 반환합니다.
    ///
    /// 소스가 더 이상 이벤트를 줄 수 없으면 채널이 닫힙니다.
    pub fn subscribe(self) -> mpsc::Receiver<DiscoveryEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            match &self.source {
                FeedSource::Stdin => {
                    info!("표준 입력에서 디스커버리 이벤트 수신 시작");
                    let reader = BufReader::new(tokio::io::stdin());
                    match read_events(reader, &tx).await {
                        Ok(end) => info!(end = ?end, "표준 입력 이벤트 스트림 종료"),
                        Err(e) => error!(error = %e, "표준 입력 이벤트 스트림 오류"),
                    }
                }
                FeedSource::Tcp { address, token } => {
                    Self::run_tcp(address, token.as_deref(), &self.retry, &tx).await;
                }
            }
        });

        rx
    }

    /// TCP 피드를 읽고, 세션이 끝나면 다시 연결합니다.
    ///
    /// 세션을 열지 못한 연속 실패만 재연결 예산에서 차감됩니다.
    async fn run_tcp(
        address: &str,
        token: Option<&str>,
        retry: &RetryPolicy,
        tx: &mpsc::Sender<DiscoveryEvent>,
    ) {
        let mut budget = ReconnectBudget::new(retry.clone());

        loop {
            let session = match Self::open_session(address, token).await {
                Ok(session) => {
                    budget.session_opened();
                    session
                }
                Err(e) => match budget.on_failure(&e) {
                    Some(delay) => {
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    None => {
                        error!(
                            error = %e,
                            address = %address,
                            attempts = budget.failures(),
                            "디스커버리 서버 재연결 포기"
                        );
                        return;
                    }
                },
            };
            info!(address = %address, "디스커버리 구독 시작");

            match read_events(session.reader, tx).await {
                Ok(StreamEnd::ReceiverClosed) => {
                    debug!("이벤트 수신측 종료, 피드 중단");
                    return;
                }
                Ok(StreamEnd::Eof) => {
                    warn!(address = %address, "디스커버리 연결 종료, 재연결");
                }
                Err(e) => {
                    warn!(error = %e, address = %address, "디스커버리 스트림 오류, 재연결");
                }
            }

            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(budget.interval()).await;
        }
    }

    async fn open_session(address: &str, token: Option<&str>) -> Result<FeedSession, DiscoveryError> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| DiscoveryError::ConnectionError {
                address: address.to_string(),
                source: e,
            })?;

        let (read_half, mut write_half) = stream.into_split();
        Self::send_subscribe(&mut write_half, token).await?;

        Ok(FeedSession {
            reader: BufReader::new(read_half),
            _writer: write_half,
        })
    }

    async fn send_subscribe(
        writer: &mut OwnedWriteHalf,
        token: Option<&str>,
    ) -> Result<(), DiscoveryError> {
        let request = FeedRequest::Subscribe { token };
        let mut line = serde_json::to_string(&request).map_err(|e| DiscoveryError::DecodeError {
            line: "Subscribe".to_string(),
            source: e,
        })?;
        line.push('\n');

        writer.write_all(line.as_bytes()).await.map_err(|e| DiscoveryError::ReadError {
            source: e,
            context: "구독 요청 전송".to_string(),
        })
    }
}

use std::fmt;
use std::time::Duration;

/// 라우팅 설정 반영 실패. 일시적인 I/O 오류로 취급하며 다음 플러시에서 다시 보냅니다.
#[derive(Debug)]
pub enum PublishError {
    /// 잘못된 Traefik 엔드포인트
    InvalidEndpoint {
        endpoint: String,
        reason: String,
    },
    /// HTTP 요청 실패
    Http {
        endpoint: String,
        reason: String,
    },
    /// Traefik이 성공 이외의 상태 코드로 응답
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 설정 파일 기록 실패
    Io {
        path: String,
        source: std::io::Error,
    },
    /// 설정 직렬화 실패
    Serialize(String),
    /// 제한 시간 초과
    Timeout {
        after: Duration,
    },
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::InvalidEndpoint { endpoint, reason } =>
                write!(f, "잘못된 Traefik 엔드포인트 {}: {}", endpoint, reason),
            PublishError::Http { endpoint, reason } =>
                write!(f, "Traefik 요청 실패 ({}): {}", endpoint, reason),
            PublishError::UnexpectedStatus { endpoint, status, body } =>
                write!(f, "Traefik 응답 오류 ({}): status={} body={}", endpoint, status, body),
            PublishError::Io { path, source } =>
                write!(f, "라우팅 설정 파일 {} 기록 실패: {}", path, source),
            PublishError::Serialize(reason) =>
                write!(f, "라우팅 설정 직렬화 실패: {}", reason),
            PublishError::Timeout { after } =>
                write!(f, "라우팅 설정 반영 시간 초과 ({:?})", after),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Serialize(err.to_string())
    }
}

impl From<toml::ser::Error> for PublishError {
    fn from(err: toml::ser::Error) -> Self {
        PublishError::Serialize(err.to_string())
    }
}

use std::fmt;

#[derive(Debug)]
pub enum DiscoveryError {
    /// 디스커버리 서버 연결 실패
    ConnectionError {
        address: String,
        source: std::io::Error,
    },
    /// 이벤트 스트림 읽기 실패
    ReadError {
        source: std::io::Error,
        context: String,
    },
    /// 이벤트 디코딩 실패
    DecodeError {
        line: String,
        source: serde_json::Error,
    },
}

impl DiscoveryError {
    /// 재시도로 복구될 수 있는 에러인지 여부
    pub fn is_retryable(&self) -> bool {
        match self {
            DiscoveryError::ConnectionError { .. } | DiscoveryError::ReadError { .. } => true,
            DiscoveryError::DecodeError { .. } => false,
        }
    }
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::ConnectionError { address, source } =>
                write!(f, "디스커버리 서버 {} 연결 실패: {}", address, source),
            DiscoveryError::ReadError { source, context } =>
                write!(f, "이벤트 스트림 읽기 실패 ({}): {}", context, source),
            DiscoveryError::DecodeError { line, source } =>
                write!(f, "이벤트 디코딩 실패 ({}): {}", line, source),
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConnectionError { source, .. } => Some(source),
            Self::ReadError { source, .. } => Some(source),
            Self::DecodeError { source, .. } => Some(source),
        }
    }
}

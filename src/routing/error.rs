use std::fmt;

/// 라우팅 테이블 갱신 중 발생하는 에러입니다.
///
/// 디스커버리 피드의 데이터 무결성 문제이므로 복구하지 않고
/// 해당 이벤트만 건너뜁니다.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutingError {
    /// 노드에 식별자 속성이 없음
    MissingIdentity {
        service: String,
        version: String,
    },
    /// 노드 정보 자체가 유효하지 않음
    InvalidNode {
        service: String,
        reason: String,
    },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::MissingIdentity { service, version } =>
                write!(f, "노드 식별자 누락 (서비스: {}, 버전: {})", service, version),
            RoutingError::InvalidNode { service, reason } =>
                write!(f, "유효하지 않은 노드 (서비스: {:?}): {}", service, reason),
        }
    }
}

impl std::error::Error for RoutingError {}

/// 프론트엔드 라우트 식별자를 생성합니다.
pub fn frontend_id(service: &str, suffix: &str) -> String {
    format!("fe-{}-v{}", service, suffix)
}

/// 클라이언트에 공개되는 경로 규칙과 그 규칙이 가리키는 백엔드 풀입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendRoute {
    pub backend: String,
    pub path_prefix: String,
}

impl FrontendRoute {
    pub fn new(backend: String, path_prefix: String) -> Self {
        Self { backend, path_prefix }
    }

    /// Traefik 규칙 문자열 (`PathPrefixStrip: /prefix`)
    pub fn rule(&self) -> String {
        format!("PathPrefixStrip: {}", self.path_prefix)
    }
}

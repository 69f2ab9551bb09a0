use std::sync::OnceLock;
use regex_lite::Regex;

/// semver.org 의 SemVer 2.0.0 참조 정규식
const SEMVER_PATTERN: &str = concat!(
    r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)",
    r"(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
    r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
);

fn semver_regex() -> Option<&'static Regex> {
    static SEMVER: OnceLock<Option<Regex>> = OnceLock::new();
    SEMVER.get_or_init(|| Regex::new(SEMVER_PATTERN).ok()).as_ref()
}

/// 유효한 시맨틱 버전의 구성 요소입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticVersion<'a> {
    pub major: &'a str,
    pub minor: &'a str,
    pub patch: &'a str,
    pub prerelease: Option<&'a str>,
    pub build: Option<&'a str>,
}

impl<'a> SemanticVersion<'a> {
    /// 문자열이 SemVer 2.0.0 형식이면 구성 요소를 반환합니다.
    pub fn parse(version: &'a str) -> Option<Self> {
        let caps = semver_regex()?.captures(version)?;
        Some(Self {
            major: caps.get(1)?.as_str(),
            minor: caps.get(2)?.as_str(),
            patch: caps.get(3)?.as_str(),
            prerelease: caps.get(4).map(|m| m.as_str()),
            build: caps.get(5).map(|m| m.as_str()),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

/// 버전 문자열을 라우트 식별자 접미사 목록으로 확장합니다.
///
/// 넓은 범위부터 좁은 범위 순서로 반환합니다.
///
/// * 시맨틱 버전이 아니면 문자열 그대로 하나만 반환
/// * 정식 릴리스는 `major`, `major.minor`, 전체 버전
/// * 프리릴리스는 전체 버전만 (안정 버전 라우트로 승격되지 않음)
///
/// # 예제
///
/// ```
/// use traefik_gateway::routing::expand_version;
///
/// assert_eq!(expand_version("1.33.711"), vec!["1", "1.33", "1.33.711"]);
/// assert_eq!(expand_version("2.0.0-rc1"), vec!["2.0.0-rc1"]);
/// assert_eq!(expand_version("latest"), vec!["latest"]);
/// ```
pub fn expand_version(version: &str) -> Vec<String> {
    match SemanticVersion::parse(version) {
        Some(semver) if !semver.is_prerelease() => vec![
            semver.major.to_string(),
            format!("{}.{}", semver.major, semver.minor),
            version.to_string(),
        ],
        _ => vec![version.to_string()],
    }
}

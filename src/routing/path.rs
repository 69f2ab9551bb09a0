/// 노드가 경로 템플릿을 지정하지 않았을 때 사용하는 기본 템플릿
pub const DEFAULT_PATH_TEMPLATE: &str = "/{SERVICE_NAME}/api/v{SERVICE_VERSION}";

const SERVICE_NAME_TOKEN: &str = "{SERVICE_NAME}";
const SERVICE_VERSION_TOKEN: &str = "{SERVICE_VERSION}";

/// 경로 템플릿에 서비스 이름과 버전 접미사를 치환해 경로 접두사를 만듭니다.
///
/// 결과가 `/`로 시작하지 않으면 앞에 붙입니다.
///
/// # 예제
///
/// ```
/// use traefik_gateway::routing::{render_path_prefix, DEFAULT_PATH_TEMPLATE};
///
/// assert_eq!(render_path_prefix(DEFAULT_PATH_TEMPLATE, "foobar", "1.33"), "/foobar/api/v1.33");
/// assert_eq!(render_path_prefix("svc/{SERVICE_NAME}", "foobar", "1"), "/svc/foobar");
/// ```
pub fn render_path_prefix(template: &str, service: &str, suffix: &str) -> String {
    let rendered = template
        .trim()
        .replace(SERVICE_NAME_TOKEN, service)
        .replace(SERVICE_VERSION_TOKEN, suffix);

    if rendered.starts_with('/') {
        rendered
    } else {
        format!("/{}", rendered)
    }
}

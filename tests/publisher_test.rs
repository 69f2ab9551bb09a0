use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use traefik_gateway::publisher::{
    publish_with_timeout, FilePublisher, HttpPublisher, ProxyConfig, PublishError, Publisher, EMPTY_FILE_CONFIG,
};
use traefik_gateway::routing::{RouteTable, DEFAULT_PATH_TEMPLATE};

struct CapturedRequest {
    method: String,
    path: String,
    content_type: Option<String>,
    body: Bytes,
}

// PUT 요청을 기록하는 가짜 Traefik 서버
async fn spawn_traefik(status: StatusCode) -> (SocketAddr, mpsc::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel(8);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| {
                    let tx = tx.clone();
                    async move {
                        let method = req.method().to_string();
                        let path = req.uri().path().to_string();
                        let content_type = req
                            .headers()
                            .get(hyper::header::CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        let body = req.into_body().collect().await.unwrap().to_bytes();
                        let _ = tx.send(CapturedRequest { method, path, content_type, body }).await;

                        Ok::<_, Infallible>(
                            Response::builder()
                                .status(status)
                                .body(Full::new(Bytes::from("done")))
                                .unwrap(),
                        )
                    }
                });
                let _ = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await;
            });
        }
    });

    (addr, rx)
}

fn sample_config() -> ProxyConfig {
    let mut table = RouteTable::new();
    for suffix in ["1", "1.33", "1.33.711"] {
        table.upsert_backend("foobar", suffix, "n1", "http://127.0.0.1:5000");
        table.upsert_frontend("foobar", suffix, DEFAULT_PATH_TEMPLATE);
    }
    ProxyConfig::from(&table.snapshot())
}

#[test]
fn test_document_shape() {
    let config = sample_config();
    let json: serde_json::Value = serde_json::from_slice(&config.to_json().unwrap()).unwrap();

    assert_eq!(json["frontends"]["fe-foobar-v1"]["backend"], "be-foobar-v1");
    assert_eq!(
        json["frontends"]["fe-foobar-v1.33"]["routes"]["api"]["rule"],
        "PathPrefixStrip: /foobar/api/v1.33"
    );
    assert_eq!(json["backends"]["be-foobar-v1"]["loadBalancer"]["method"], "drr");
    assert_eq!(
        json["backends"]["be-foobar-v1.33.711"]["servers"]["n1"]["url"],
        "http://127.0.0.1:5000"
    );
}

#[test]
fn test_empty_document_is_well_formed() {
    let config = ProxyConfig::from(&RouteTable::new().snapshot());

    let json: serde_json::Value = serde_json::from_slice(&config.to_json().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "frontends": {}, "backends": {} }));

    let toml_text = config.to_toml().unwrap();
    assert_eq!(toml_text, EMPTY_FILE_CONFIG);
    let parsed: ProxyConfig = toml::from_str(&toml_text).unwrap();
    assert!(parsed.is_empty());
}

#[test]
fn test_toml_document_parses_back() {
    let config = sample_config();
    let toml_text = config.to_toml().unwrap();

    let parsed: ProxyConfig = toml::from_str(&toml_text).unwrap();
    assert_eq!(parsed, config);
}

#[tokio::test]
async fn test_file_publisher_replaces_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    let publisher = FilePublisher::new(&path);

    publisher.publish(&sample_config()).await.unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    let parsed: ProxyConfig = toml::from_str(&written).unwrap();
    assert_eq!(parsed.frontends.len(), 3);

    publisher.publish(&ProxyConfig::default()).await.unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), EMPTY_FILE_CONFIG);

    // 임시 파일이 남지 않아야 함
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name() != "rules.toml")
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_file_publisher_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let publisher = FilePublisher::new(dir.path().join("missing").join("rules.toml"));

    let err = publisher.publish(&sample_config()).await.unwrap_err();
    assert!(matches!(err, PublishError::Io { .. }));
}

#[tokio::test]
async fn test_http_publisher_puts_whole_table() {
    let (addr, mut requests) = spawn_traefik(StatusCode::OK).await;
    let publisher = HttpPublisher::new(&format!("http://{}/api/providers/web", addr)).unwrap();
    let config = sample_config();

    publisher.publish(&config).await.unwrap();

    let request = requests.recv().await.unwrap();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.path, "/api/providers/web");
    assert_eq!(request.content_type.as_deref(), Some("application/json"));

    let received: ProxyConfig = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(received, config);
}

#[tokio::test]
async fn test_http_publisher_rejects_error_status() {
    let (addr, _requests) = spawn_traefik(StatusCode::BAD_REQUEST).await;
    let publisher = HttpPublisher::new(&format!("http://{}/api/providers/web", addr)).unwrap();

    let err = publisher.publish(&sample_config()).await.unwrap_err();
    match err {
        PublishError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 400);
            assert_eq!(body, "done");
        }
        other => panic!("unexpected error: {}", other),
    }
}

// 요청 헤더와 Content-Length 만큼의 본문을 모두 받았는지 확인
fn request_complete(raw: &[u8]) -> bool {
    let Some(head_end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&raw[..head_end]);
    let length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    raw.len() >= head_end + 4 + length
}

#[tokio::test]
async fn test_http_publisher_reports_truncated_error_body() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // 선언한 길이보다 짧은 본문을 보내고 연결을 끊는 서버
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request_complete(&request) {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        stream
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\npartial")
            .await
            .unwrap();
        stream.shutdown().await.unwrap();
    });

    let publisher = HttpPublisher::new(&format!("http://{}/api/providers/web", addr)).unwrap();
    let err = publisher.publish(&sample_config()).await.unwrap_err();

    match err {
        PublishError::UnexpectedStatus { status, body, .. } => {
            assert_eq!(status, 500);
            assert!(body.starts_with("<응답 본문 읽기 실패"), "body: {}", body);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_http_publisher_connection_refused() {
    // 바인딩 후 바로 닫아 사용되지 않는 포트를 얻음
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let publisher = HttpPublisher::new(&format!("http://{}/api/providers/web", addr)).unwrap();

    let err = publisher.publish(&sample_config()).await.unwrap_err();
    assert!(matches!(err, PublishError::Http { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_publish_timeout() {
    struct StuckPublisher;

    #[async_trait]
    impl Publisher for StuckPublisher {
        fn describe(&self) -> String {
            "stuck".to_string()
        }

        async fn publish(&self, _config: &ProxyConfig) -> Result<(), PublishError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    let err = publish_with_timeout(&StuckPublisher, &sample_config(), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::Timeout { .. }));
}

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use time::format_description::well_known::Rfc3339;

use crate::settings::logging::{LogFormat, LogOutput, LogSettings};

#[derive(Debug)]
pub enum LoggingError {
    InvalidPath(String),
    Io(std::io::Error),
    Init(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::InvalidPath(path) => write!(f, "잘못된 로그 파일 경로: {}", path),
            LoggingError::Io(e) => write!(f, "로그 디렉토리 생성 실패: {}", e),
            LoggingError::Init(e) => write!(f, "로거 초기화 실패: {}", e),
        }
    }
}

impl std::error::Error for LoggingError {}

/// 설정에 맞춰 전역 tracing 구독자를 설치합니다.
///
/// 파일 출력이면 비동기 writer의 guard를 반환하며, 프로세스가 끝날 때까지
/// 유지해야 남은 로그가 기록됩니다. `RUST_LOG`가 있으면 설정의 레벨보다 우선합니다.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>, LoggingError> {
    match &settings.output {
        LogOutput::Stdout => {
            install(settings, std::io::stdout, true)?;
            Ok(None)
        }
        LogOutput::File(path) => {
            let (dir, file_name) = split_log_path(path)?;
            std::fs::create_dir_all(&dir).map_err(LoggingError::Io)?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            install(settings, writer, false)?;
            Ok(Some(guard))
        }
    }
}

fn install<W>(settings: &LogSettings, writer: W, ansi: bool) -> Result<(), LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(settings.level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::new(Rfc3339))
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);

    let result = match settings.format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Text => builder.try_init(),
    };

    result.map_err(|e| LoggingError::Init(e.to_string()))
}

fn split_log_path(path: &str) -> Result<(PathBuf, String), LoggingError> {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(path.display().to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((dir, file_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path("/var/log/gateway/gateway.log").unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/gateway"));
        assert_eq!(name, "gateway.log");

        let (dir, name) = split_log_path("gateway.log").unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "gateway.log");

        assert!(split_log_path("/var/log/..").is_err());
    }
}

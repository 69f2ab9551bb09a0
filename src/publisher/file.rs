use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{ProxyConfig, PublishError, Publisher};

/// Traefik file provider가 감시하는 설정 파일을 통째로 교체하는 퍼블리셔
///
/// 같은 디렉토리의 임시 파일에 기록한 뒤 rename 하므로 Traefik이
/// 반쯤 기록된 파일을 읽지 않습니다.
pub struct FilePublisher {
    path: PathBuf,
}

impl FilePublisher {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "routes".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn io_error(path: &Path, source: std::io::Error) -> PublishError {
        PublishError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl Publisher for FilePublisher {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn publish(&self, config: &ProxyConfig) -> Result<(), PublishError> {
        let contents = config.to_toml()?;
        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, contents.as_bytes())
            .await
            .map_err(|e| Self::io_error(&temp_path, e))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(Self::io_error(&self.path, e));
        }

        debug!(path = %self.path.display(), bytes = contents.len(), "라우팅 설정 파일 기록 완료");
        Ok(())
    }
}

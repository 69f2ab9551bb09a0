use std::fmt;

use crate::publisher::PublishError;

#[derive(Debug)]
pub enum Error {
    PublisherError(PublishError),
    ChannelClosed(String),
}

impl From<PublishError> for Error {
    fn from(err: PublishError) -> Self {
        Error::PublisherError(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PublisherError(e) => write!(f, "Publisher Error: {}", e),
            Error::ChannelClosed(msg) => write!(f, "Channel Closed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::PublisherError(e) => Some(e),
            Error::ChannelClosed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::time::Duration;

    #[test]
    fn test_publish_error_keeps_source() {
        let err = Error::from(PublishError::Timeout { after: Duration::from_secs(3) });

        assert!(matches!(err, Error::PublisherError(PublishError::Timeout { .. })));
        assert!(err.to_string().starts_with("Publisher Error: "));
        assert!(err.source().is_some());
        assert!(Error::ChannelClosed("closed".to_string()).source().is_none());
    }
}

use std::fmt;

use bytes::Bytes;

pub type JobId = u64;

/// Fetched payload, classified once from the served content-type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Binary(Bytes),
}

impl Content {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Content::Text(text) => text.as_bytes(),
            Content::Binary(bytes) => bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Raw transport response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Bytes,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

/// Result of a fetch through the cache. `metadata` is `None` on a cache hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub content: Content,
    pub metadata: Option<FetchMetadata>,
}

impl Fetched {
    pub fn final_url(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.final_url.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.content_type.as_deref())
    }
}

/// Static basic-auth pair. Only applied when both parts are non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_usable(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Failures that escape a conversion instead of landing in the error list.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to serialize document")]
    Serialize(#[source] std::io::Error),
    #[error("engine worker is no longer running")]
    WorkerGone,
    #[error("job aborted: {0}")]
    JobAborted(String),
}

/// Document produced by one conversion plus its non-fatal errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleOutput {
    pub source_url: String,
    pub html: String,
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub enum EngineEvent {
    Started {
        job_id: JobId,
        url: String,
    },
    JobCompleted {
        job_id: JobId,
        result: Result<BundleOutput, BundleError>,
    },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server responded with status {code}")]
    Status { code: u16, body: Option<String> },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Image encoding error: {0}")]
    Encode(String),

    #[error("Frame grab failed: {0}")]
    FrameGrab(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

/// Coarse classification used to pick the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never produced a usable server answer
    Transport,
    /// The server answered but reported a failure
    Application,
    /// Failure on this machine (encoding, files, config)
    Local,
}

impl StationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StationError::Transport(_) | StationError::Task(_) => ErrorKind::Transport,
            StationError::Status { .. } | StationError::Decode(_) => ErrorKind::Application,
            StationError::Io(_)
            | StationError::Serialization(_)
            | StationError::Encode(_)
            | StationError::FrameGrab(_)
            | StationError::Configuration(_)
            | StationError::Validation(_) => ErrorKind::Local,
        }
    }

    /// Body the server sent along with a non-2xx status, if any
    pub fn server_body(&self) -> Option<&str> {
        match self {
            StationError::Status { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

impl From<ureq::Error> for StationError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, response) => StationError::Status {
                code,
                body: response.into_string().ok(),
            },
            ureq::Error::Transport(transport) => StationError::Transport(transport.to_string()),
        }
    }
}

impl From<image::ImageError> for StationError {
    fn from(err: image::ImageError) -> Self {
        StationError::Encode(err.to_string())
    }
}

pub type StationResult<T> = Result<T, StationError>;

/// Cloneable summary of a [`StationError`], carried through UI messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub detail: String,
}

impl From<StationError> for Failure {
    fn from(err: StationError) -> Self {
        let detail = match err.server_body() {
            Some(body) if !body.trim().is_empty() => format!("{}: {}", err, body.trim()),
            _ => err.to_string(),
        };
        Self {
            kind: err.kind(),
            detail,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}

impl Failure {
    /// Notification text. Server-side and transport failures get the
    /// operation's generic message; local failures name the cause.
    pub fn notice(&self, generic: &str) -> String {
        match self.kind {
            ErrorKind::Transport | ErrorKind::Application => generic.to_string(),
            ErrorKind::Local => format!("{} ({})", generic, self.detail),
        }
    }

    pub fn is_local(&self) -> bool {
        self.kind == ErrorKind::Local
    }
}

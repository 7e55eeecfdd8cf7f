use thiserror::Error;

/// Start.gg answers this when a page would reach past its 10,000th set.
pub const PAGE_CEILING_MESSAGE: &str = "Cannot query more than the 10,000th entry";

pub type Result<T> = std::result::Result<T, UpsetError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScoreError {
    #[error("score {score:?} does not start with a game count")]
    NotANumber { score: String },
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("set {set_id}: expected 2 entrants, found {found}")]
    EntrantCount { set_id: String, found: usize },

    #[error("set {set_id}: {source}")]
    Score {
        set_id: String,
        #[source]
        source: ScoreError,
    },

    #[error("character roster for {game}: {source}")]
    Roster {
        game: String,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("stored set {id}: {source}")]
    Json {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("stored set {id}: unsupported encoding")]
    UnsupportedFormat { id: String },
}

#[derive(Error, Debug)]
pub enum FetchError {
    /// Soft stop: the provider refuses pages this deep.
    #[error("Start.gg pagination ceiling reached")]
    PageCeiling,

    #[error("Start.gg request failed: {0}")]
    Transport(String),

    #[error("Start.gg error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Start.gg error: {0}")]
    Graphql(String),

    #[error("Start.gg parse failed: {0}")]
    Parse(String),

    #[error("Start.gg response missing {0}")]
    Missing(&'static str),

    #[error("read {path}: {message}")]
    File { path: String, message: String },
}

impl FetchError {
    /// Whether another attempt could succeed: network failures, 5xx and 429.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store io {path}: {message}")]
    Io { path: String, message: String },

    #[error("store data {path}: {message}")]
    Corrupt { path: String, message: String },

    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Error, Debug)]
pub enum UpsetError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

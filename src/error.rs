use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The host could not hand out a 2D drawing context.
    #[error("drawing context unavailable: {0}")]
    ContextUnavailable(String),

    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid color `{0}`, expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("unknown preset `{0}`, expected `starry` or `alert`")]
    UnknownPreset(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("window system error: {0}")]
    Window(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

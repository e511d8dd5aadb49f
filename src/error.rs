use thiserror::Error;

pub type EnvResult<T> = Result<T, EnvError>;

/// Errors surfaced by the drone environment.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("invalid action {0}: expected 0 (none), 1 (left), 2 (right) or 3 (up)")]
    InvalidAction(i64),

    #[error("episode has ended; call reset() before stepping again")]
    EpisodeEnded,

    #[error("environment has not been reset yet")]
    NotReset,

    #[error("render() called before the first reset()")]
    RenderBeforeInit,

    #[error("no display available for human render mode")]
    DisplayUnavailable,

    /// Integration produced NaN or infinite state. The episode cannot continue.
    #[error("physics produced a non-finite body state: {0}")]
    NonFiniteState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("drawing failed: {0}")]
    Render(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

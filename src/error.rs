use crate::client::ClientError;
use crate::config::ConfigError;
use crate::session::SessionError;
use thiserror::Error;

/// Everything that can stop the program before or outside the interactive screens.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not logged in; run `taskboard` and log in first")]
    NotLoggedIn,
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("response parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("sprite error: {0}")]
    Sprite(#[from] SpriteError),
    #[error("fetch task failed: {0}")]
    Task(String),
}

#[derive(thiserror::Error, Debug)]
pub enum SpriteError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("{0} cannot battle itself")]
    SameEntity(String),
}

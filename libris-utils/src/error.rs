#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Libris(#[from] libris::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("missing ';' separator in {:?}", .0)]
    MissingSeparator(String),

    #[error("unknown operation {:?}", .0)]
    UnknownOperation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

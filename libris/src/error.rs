#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Model must not be empty")]
    EmptyModel,

    #[error("Model scale out of range: {}, max: {}", .scale, .max)]
    ScaleOutOfRange { scale: u64, max: u32 },

    #[error("Invalid interval for {:?}: [{}, {}) with scale {}", .symbol, .low, .high, .scale)]
    InvalidInterval {
        symbol: char,
        low: u32,
        high: u32,
        scale: u32,
    },

    #[error("Symbol {:?} is not part of the model", .0)]
    UnknownSymbol(char),

    #[error("No interval contains cumulative count {}, scale: {}", .count, .scale)]
    Decode { count: u64, scale: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

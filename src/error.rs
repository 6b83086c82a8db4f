use thiserror::Error;

use crate::geom::Side;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("no design rules for layer `{0}`")]
    UnknownLayer(String),

    #[error("got {layers} layers but {purposes} purposes")]
    MismatchedLayerPurposes { layers: usize, purposes: usize },

    #[error("invalid region: start {start} is greater than end {end}")]
    InvalidRegion { start: f64, end: f64 },

    #[error("invalid interval: start {start} is greater than end {end}")]
    InvalidInterval { start: f64, end: f64 },

    #[error("non-finite coordinate in {0}")]
    NonFinite(&'static str),

    #[error("expected a top or bottom direction, got {0}")]
    InvalidSide(Side),

    #[error("invalid rule query: {0}")]
    InvalidRuleQuery(String),

    #[error("technology has no {0} rules")]
    MissingRules(&'static str),

    #[error("unknown technology `{0}`")]
    UnknownTech(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing technology file: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("error parsing layout snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FillError>;

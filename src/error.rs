//! Error taxonomy
//!
//! Configuration problems are fatal at construction. Selection fallbacks and
//! invalid transitions are not errors: the former are logged and recovered
//! locally, the latter are no-ops.

/// Errors raised by the wheel engine
#[derive(Debug, thiserror::Error)]
pub enum WheelError {
    #[error("Prize catalog is empty")]
    EmptyCatalog,

    #[error("Duplicate prize id: {0}")]
    DuplicatePrizeId(String),

    #[error("Invalid weight {weight} for prize '{id}'")]
    InvalidWeight { id: String, weight: f64 },

    #[error("Invalid prize '{id}': {reason}")]
    InvalidPrize { id: String, reason: &'static str },

    #[error("Catalog weights sum to {0}, expected 100")]
    WeightSum(f64),

    #[error("Ring size must be at least 2, got {0}")]
    InvalidRingSize(usize),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(&'static str),

    #[error("Invalid timing: {0}")]
    InvalidTiming(&'static str),

    #[error("Invalid visual tier: {0}")]
    InvalidTier(String),

    #[error("Unknown prize id: {0}")]
    UnknownPrize(String),

    #[error("Peak spin speed {peak:.2} exceeds max speed {max:.2}")]
    SpeedLimit { peak: f64, max: f64 },

    #[error("Slot ring is empty, no slot to center")]
    EmptyRing,

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}


use std::path::PathBuf;

/// Error returned from posterior-chain access and sample selection
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("requested {requested} random samples but only {available} remain after burn-in")]
    InsufficientSamples { requested: usize, available: usize },

    #[error("burn-in of {burn_ignore_len} steps exceeds the chain length of {num_steps} steps")]
    BurnInTooLong {
        burn_ignore_len: usize,
        num_steps: usize,
    },

    #[error("chain store is inconsistent: {0}")]
    Shape(String),
}

/// Error returned from isochrone construction and radius interpolation
#[derive(Debug, thiserror::Error)]
pub enum IsochroneError {
    #[error("isochrone grid is empty")]
    EmptyGrid,

    #[error("isochrone grid radii must increase monotonically")]
    UnsortedRadii,

    #[error("radius {radius} is outside the isochrone domain [{min}, {max}]")]
    OutOfDomain { radius: f64, min: f64, max: f64 },
}

/// Error returned from the on-disk stores
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store {path} is not readable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path} is malformed: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store {path} has an incompatible schema: {reason}")]
    Schema { path: PathBuf, reason: String },
}

/// Error returned from run-configuration validation
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("prior bound {name} is inverted: lower {lo} > upper {hi}")]
    InvertedBounds {
        name: &'static str,
        lo: f64,
        hi: f64,
    },

    #[error("{name} must be positive")]
    NonPositive { name: &'static str },
}

/// Top-level error for the job entry points
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Isochrone(#[from] IsochroneError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

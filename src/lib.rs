//! Posterior post-processing for binary-star light-curve MCMC fits.
//!
//! Two batch jobs over the flattened chain of an eclipsing-binary fit:
//!
//! - [`model_unc`] regenerates the model light curve at the observation
//!   epochs for a random posterior subset, in parallel, and caches the
//!   per-sample model magnitudes together with validity flags.
//! - [`stellar_params`] cross-references every posterior sample's stellar
//!   radii against a precomputed isochrone, derives physical stellar and
//!   orbital parameters plus fit-quality statistics, and appends the rows
//!   to a persisted table that doubles as a resume watermark.
//!
//! The light-curve generator and the isochrone synthesis are external
//! collaborators; this crate fixes their calling contracts
//! ([`LightCurveModel`], [`TabulatedIsochrone`]) and orchestrates the two
//! workflows around them.

mod config;
pub use config::{
    AtmosphereModel, Bounds, EvolutionaryPhase, IsochroneParams, PriorBounds, RunConfig,
};

mod data;
pub use data::{fold_phase, BandData, BinaryParams, FlatChain, LcData, PosteriorChain, NUM_PARAMS};

mod error;
pub use error::{ChainError, ConfigError, IsochroneError, JobError, StoreError};

mod isochrone;
pub use isochrone::{LcFitParams, StellarParams, TabulatedIsochrone};

mod model;
pub use model::{LightCurveModel, ModelMags, FAILED_MAG};

pub mod model_unc;
pub use model_unc::ModelUncResult;

mod params_table;
pub use params_table::{DerivedRow, ParamsTable, COLUMN_NAMES};

pub mod stellar_params;
pub use stellar_params::StellarParamsSummary;

mod store;
pub use store::{load_json, save_json_atomic};

mod units;
pub use units::{binary_semi_major_axis, fit_stats, FitStats, SemiMajorAxis};

pub use ndarray;

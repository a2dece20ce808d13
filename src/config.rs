//! Immutable run configuration.
//!
//! Everything a single invocation needs is collected into value types that
//! are constructed once at startup and passed by reference into the job
//! entry points; nothing here is mutated after construction.

use crate::data::BinaryParams;
use crate::error::ConfigError;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Evolutionary phase the isochrone is restricted to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionaryPhase {
    MainSequence,
    Rgb,
    Agb,
}

/// Atmosphere model used when synthesizing passband magnitudes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtmosphereModel {
    Phoenix,
    Blackbody,
}

/// Astrophysical parameters an isochrone is keyed by
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsochroneParams {
    /// Age in years
    pub age_yr: f64,
    /// Ks-band extinction in magnitudes
    pub extinction_ks: f64,
    /// Distance in parsecs
    pub distance_pc: f64,
    pub phase: EvolutionaryPhase,
    /// Metallicity [M/H]
    pub metallicity: f64,
    pub atm: AtmosphereModel,
}

/// One inclusive prior interval
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub fn new(name: &'static str, lo: f64, hi: f64) -> Result<Self, ConfigError> {
        if lo > hi {
            return Err(ConfigError::InvertedBounds { name, lo, hi });
        }
        Ok(Self { lo, hi })
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.lo <= x && x <= self.hi
    }
}

/// Prior intervals the fit was run with.
///
/// A theta outside these bounds is unphysical by construction and the
/// light-curve generator would reject it, so Job A skips its evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriorBounds {
    pub kp_ext: Bounds,
    pub h_ext_mod: Bounds,
    pub period: Bounds,
    pub distance: Bounds,
    pub t0: Bounds,
}

impl PriorBounds {
    pub fn contains(&self, params: &BinaryParams) -> bool {
        self.kp_ext.contains(params.kp_ext)
            && self.h_ext_mod.contains(params.h_ext_mod)
            && self.period.contains(params.period)
            && self.t0.contains(params.t0)
    }
}

/// Per-run configuration shared by both jobs.
///
/// The job entry points take pre-built inputs, so the caller turns the
/// loading fields into those inputs up front:
/// [`LcData::load`](crate::data::LcData::load) with `lc_data_path`,
/// [`PosteriorChain::open`](crate::data::PosteriorChain::open) with
/// `chains_path`, then
/// [`flat_chain_after_burn`](crate::data::PosteriorChain::flat_chain_after_burn)
/// with `burn_ignore_len`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Trial number, used to name the chain and output stores
    pub trial_num: u32,
    /// Leading chain steps discarded per walker before any use
    pub burn_ignore_len: usize,
    /// Random posterior subset size for the model-uncertainty job
    pub num_plot_samples: usize,
    /// Worker-pool size; `None` uses the available CPU parallelism
    pub parallel_workers: Option<usize>,
    /// Location of the observation store, read once per run
    pub lc_data_path: PathBuf,
    /// Location of this trial's chain store, read once per run
    pub chains_path: PathBuf,
    pub output_dir: PathBuf,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_plot_samples == 0 {
            return Err(ConfigError::NonPositive {
                name: "num_plot_samples",
            });
        }
        if self.parallel_workers == Some(0) {
            return Err(ConfigError::NonPositive {
                name: "parallel_workers",
            });
        }
        Ok(())
    }

    /// Path of the model-uncertainty output store for this trial
    pub fn model_unc_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("obs_model_unc_try{}.json", self.trial_num))
    }

    /// Path of the persisted stellar-parameter table
    pub fn stellar_params_path(&self) -> PathBuf {
        self.output_dir.join("stellar_params.json")
    }
}

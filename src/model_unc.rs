//! Job A: model uncertainty at the observation times.
//!
//! Draws a random posterior subset, regenerates the model light curve at
//! the observation epochs for every drawn theta on a fixed-size worker
//! pool, flags non-convergent evaluations, and persists the lot in one
//! shot.

use crate::config::{PriorBounds, RunConfig};
use crate::data::{BinaryParams, FlatChain, LcData};
use crate::error::{JobError, StoreError};
use crate::model::{LightCurveModel, ModelMags};
use crate::store;

use log::info;
use ndarray::{Array1, Array2, Axis};
use ndarray_stats::QuantileExt;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// The sampled posterior subset and its regenerated model magnitudes.
///
/// Every requested sample keeps a row in every array; `good` tells usable
/// rows (1) from failed model evaluations (0), whose magnitude rows stay
/// zero-filled placeholders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelUncResult {
    /// Flat chain indices of the drawn samples
    pub indices: Vec<usize>,
    /// Drawn parameter rows, one theta per row
    pub binary_params: Array2<f64>,
    pub good: Array1<u8>,
    /// num_samples × num_kp_epochs
    pub model_mags_kp: Array2<f64>,
    /// num_samples × num_h_epochs
    pub model_mags_h: Array2<f64>,
}

impl ModelUncResult {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        store::load_json(path)
    }

    pub fn num_samples(&self) -> usize {
        self.indices.len()
    }

    pub fn num_good(&self) -> usize {
        self.good.iter().filter(|&&flag| flag == 1).count()
    }

    /// Per-epoch (min, max) of the good Kp model magnitudes, the
    /// uncertainty band the cache exists for; `None` if every sample
    /// failed
    pub fn kp_envelope(&self) -> Option<(Array1<f64>, Array1<f64>)> {
        self.envelope(&self.model_mags_kp)
    }

    /// Same as [`Self::kp_envelope`] for the H band
    pub fn h_envelope(&self) -> Option<(Array1<f64>, Array1<f64>)> {
        self.envelope(&self.model_mags_h)
    }

    fn envelope(&self, mags: &Array2<f64>) -> Option<(Array1<f64>, Array1<f64>)> {
        let good_rows: Vec<usize> = self
            .good
            .iter()
            .enumerate()
            .filter_map(|(row, &flag)| (flag == 1).then_some(row))
            .collect();
        if good_rows.is_empty() {
            return None;
        }
        let good_mags = mags.select(Axis(0), &good_rows);
        let lo = good_mags.map_axis(Axis(0), |epoch| *epoch.min_skipnan());
        let hi = good_mags.map_axis(Axis(0), |epoch| *epoch.max_skipnan());
        Some((lo, hi))
    }
}

/// Run the job with the default non-deterministic RNG and persist the
/// result to [`RunConfig::model_unc_path`]
pub fn run<M>(
    config: &RunConfig,
    bounds: &PriorBounds,
    lc_data: &LcData,
    chain: &FlatChain,
    model: &M,
) -> Result<ModelUncResult, JobError>
where
    M: LightCurveModel,
{
    run_with_rng(config, bounds, lc_data, chain, model, &mut rand::rng())
}

/// Same as [`run`] but with a caller-supplied RNG, so reruns can be made
/// reproducible
pub fn run_with_rng<M, R>(
    config: &RunConfig,
    bounds: &PriorBounds,
    lc_data: &LcData,
    chain: &FlatChain,
    model: &M,
    rng: &mut R,
) -> Result<ModelUncResult, JobError>
where
    M: LightCurveModel,
    R: Rng + ?Sized,
{
    config.validate()?;

    let indices = chain.select_random(config.num_plot_samples, rng)?;
    let binary_params = chain.gather(&indices);
    let thetas: Vec<BinaryParams> = indices.iter().map(|&index| chain.params_at(index)).collect();

    let start = Instant::now();
    let evaluations = evaluate(config, bounds, lc_data, &thetas, model)?;
    info!("number of sample binary models = {}", thetas.len());
    info!(
        "total binary modeling time = {:.3} sec",
        start.elapsed().as_secs_f64()
    );

    let result = assemble(indices, binary_params, evaluations, lc_data);

    let out_path = config.model_unc_path();
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: out_path.clone(),
            source,
        })?;
    }
    store::save_json_atomic(&out_path, &result)?;

    Ok(result)
}

/// Evaluate every theta on the worker pool.
///
/// Each evaluation is pure and owns no shared mutable state, so the order
/// of completion is free; the indexed parallel map collects results back
/// in input order. A theta outside the fit's prior bounds is what the
/// generator itself would reject, so it short-circuits to the failed
/// value without being evaluated.
fn evaluate<M>(
    config: &RunConfig,
    bounds: &PriorBounds,
    lc_data: &LcData,
    thetas: &[BinaryParams],
    model: &M,
) -> Result<Vec<ModelMags>, JobError>
where
    M: LightCurveModel,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel_workers.unwrap_or(0))
        .build()?;
    let evaluations = pool.install(|| {
        thetas
            .par_iter()
            .map(|theta| {
                if bounds.contains(theta) {
                    model.model_mags(theta, lc_data.kp.mjds.view(), lc_data.h.mjds.view())
                } else {
                    ModelMags::failed()
                }
            })
            .collect()
    });
    Ok(evaluations)
}

fn assemble(
    indices: Vec<usize>,
    binary_params: Array2<f64>,
    evaluations: Vec<ModelMags>,
    lc_data: &LcData,
) -> ModelUncResult {
    let num_samples = indices.len();
    let mut good = Array1::zeros(num_samples);
    let mut model_mags_kp = Array2::zeros((num_samples, lc_data.kp.len()));
    let mut model_mags_h = Array2::zeros((num_samples, lc_data.h.len()));

    for (sample, mags) in evaluations.into_iter().enumerate() {
        if !mags.is_good() {
            continue;
        }
        assert_eq!(
            mags.kp.len(),
            lc_data.kp.len(),
            "model returned a wrong number of Kp magnitudes"
        );
        assert_eq!(
            mags.h.len(),
            lc_data.h.len(),
            "model returned a wrong number of H magnitudes"
        );
        good[sample] = 1;
        model_mags_kp.row_mut(sample).assign(&mags.kp);
        model_mags_h.row_mut(sample).assign(&mags.h);
    }

    ModelUncResult {
        indices,
        binary_params,
        good,
        model_mags_kp,
        model_mags_h,
    }
}

use crate::data::binary_params::{BinaryParams, NUM_PARAMS};
use crate::error::{ChainError, StoreError};
use crate::store;

use ndarray::{Array1, Array2, Array3, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A full MCMC run as the sampler left it: the (steps × walkers × params)
/// sample array plus the per-flat-sample log-probability and log-prior
/// ("blob") arrays. Immutable once read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PosteriorChain {
    samples: Array3<f64>,
    log_prob: Array1<f64>,
    log_prior: Array1<f64>,
}

impl PosteriorChain {
    pub fn new(
        samples: Array3<f64>,
        log_prob: Array1<f64>,
        log_prior: Array1<f64>,
    ) -> Result<Self, ChainError> {
        let (num_steps, num_walkers, num_params) = samples.dim();
        if num_params != NUM_PARAMS {
            return Err(ChainError::Shape(format!(
                "expected {NUM_PARAMS} fit parameters per sample, found {num_params}"
            )));
        }
        let num_flat = num_steps * num_walkers;
        if log_prob.len() != num_flat {
            return Err(ChainError::Shape(format!(
                "log-probability length {} does not match {num_flat} flat samples",
                log_prob.len()
            )));
        }
        if log_prior.len() != num_flat {
            return Err(ChainError::Shape(format!(
                "log-prior length {} does not match {num_flat} flat samples",
                log_prior.len()
            )));
        }
        Ok(Self {
            samples,
            log_prob,
            log_prior,
        })
    }

    /// Open a chain store read-only; shape inconsistencies on disk are
    /// schema errors.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let chain: Self = store::load_json(path)?;
        // Re-validate: the store is external and serde alone does not
        // check cross-array consistency
        Self::new(chain.samples, chain.log_prob, chain.log_prior).map_err(|err| {
            StoreError::Schema {
                path: path.to_owned(),
                reason: err.to_string(),
            }
        })
    }

    #[inline]
    pub fn num_steps(&self) -> usize {
        self.samples.len_of(Axis(0))
    }

    #[inline]
    pub fn num_walkers(&self) -> usize {
        self.samples.len_of(Axis(1))
    }

    #[inline]
    pub fn num_params(&self) -> usize {
        self.samples.len_of(Axis(2))
    }

    /// Flatten step-major, keeping every step
    pub fn flat_chain(&self) -> FlatChain {
        self.flat_chain_after_burn(0)
            .expect("zero burn-in always fits the chain")
    }

    /// Flatten step-major and drop the first `burn_ignore_len` steps of
    /// every walker, i.e. the `burn_ignore_len * num_walkers` leading flat
    /// rows.
    pub fn flat_chain_after_burn(&self, burn_ignore_len: usize) -> Result<FlatChain, ChainError> {
        let num_steps = self.num_steps();
        if burn_ignore_len > num_steps {
            return Err(ChainError::BurnInTooLong {
                burn_ignore_len,
                num_steps,
            });
        }

        let skip = burn_ignore_len * self.num_walkers();
        let num_flat = num_steps * self.num_walkers() - skip;

        // Row-major logical order is step -> walker -> parameter, which is
        // exactly the step-major flattening the burn-in offset assumes
        let flat = Array2::from_shape_vec(
            (num_flat, self.num_params()),
            self.samples
                .iter()
                .copied()
                .skip(skip * self.num_params())
                .collect(),
        )
        .expect("flat sample count is consistent by construction");

        Ok(FlatChain {
            samples: flat,
            log_prob: self.log_prob.slice(ndarray::s![skip..]).to_owned(),
            log_prior: self.log_prior.slice(ndarray::s![skip..]).to_owned(),
        })
    }
}

/// Flattened post-burn-in samples with their log-probabilities
#[derive(Clone, Debug, PartialEq)]
pub struct FlatChain {
    samples: Array2<f64>,
    log_prob: Array1<f64>,
    log_prior: Array1<f64>,
}

impl FlatChain {
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len_of(Axis(0))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn log_prob(&self, row: usize) -> f64 {
        self.log_prob[row]
    }

    #[inline]
    pub fn log_prior(&self, row: usize) -> f64 {
        self.log_prior[row]
    }

    /// Named-field view of one flat row
    pub fn params_at(&self, row: usize) -> BinaryParams {
        BinaryParams::from_row(self.samples.row(row))
    }

    /// Draw `amount` distinct flat-row indices uniformly at random without
    /// replacement.
    pub fn select_random<R>(&self, amount: usize, rng: &mut R) -> Result<Vec<usize>, ChainError>
    where
        R: Rng + ?Sized,
    {
        let available = self.len();
        if amount > available {
            return Err(ChainError::InsufficientSamples {
                requested: amount,
                available,
            });
        }
        Ok(rand::seq::index::sample(rng, available, amount).into_vec())
    }

    /// Gather the parameter rows for a set of flat indices
    pub fn gather(&self, indices: &[usize]) -> Array2<f64> {
        let mut rows = Array2::zeros((indices.len(), self.samples.len_of(Axis(1))));
        for (mut out, &index) in rows.outer_iter_mut().zip(indices) {
            out.assign(&self.samples.row(index));
        }
        rows
    }
}

use crate::error::StoreError;
use crate::store;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Photometry of one passband: magnitudes, their errors, the observation
/// epochs (MJD) and the epochs folded onto the orbital phase.
///
/// All four arrays have the same length; the constructor enforces it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandData {
    pub mags: Array1<f64>,
    pub mag_errors: Array1<f64>,
    pub mjds: Array1<f64>,
    pub phased_days: Array1<f64>,
}

impl BandData {
    pub fn new(
        mags: Array1<f64>,
        mag_errors: Array1<f64>,
        mjds: Array1<f64>,
        phased_days: Array1<f64>,
    ) -> Self {
        assert_eq!(
            mags.len(),
            mag_errors.len(),
            "mags and mag errors should have the same size"
        );
        assert_eq!(
            mags.len(),
            mjds.len(),
            "mags and epochs should have the same size"
        );
        assert_eq!(
            mags.len(),
            phased_days.len(),
            "mags and phased days should have the same size"
        );
        Self {
            mags,
            mag_errors,
            mjds,
            phased_days,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mags.is_empty()
    }
}

/// The observation set both jobs load once and never mutate.
///
/// Field order matches the positional order of the upstream `lc_data`
/// store: binary period, phase shift, then the Kp and H band blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LcData {
    /// Previously-fit binary period, days
    pub binary_period: f64,
    /// Phase shift applied when folding, cycles
    pub phase_shift: f64,
    pub kp: BandData,
    pub h: BandData,
}

impl LcData {
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        store::load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        store::save_json_atomic(path, self)
    }

    /// Total observation count over both bands, the `N` of the fit
    /// statistics
    pub fn num_observations(&self) -> usize {
        self.kp.len() + self.h.len()
    }
}

/// Fold an epoch onto the orbital phase in `[0, 1)`
pub fn fold_phase(mjd: f64, period: f64, t0: f64, phase_shift: f64) -> f64 {
    ((mjd - t0) / period + phase_shift).rem_euclid(1.0)
}

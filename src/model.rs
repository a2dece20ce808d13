//! Seam to the external binary light-curve generator.
//!
//! The generator itself (mesh synthesis, eclipse geometry, atmosphere
//! tables) lives outside this crate; here we fix its calling convention
//! and its failure contract so the model-uncertainty job can treat it as
//! a pure function of theta.

use crate::data::BinaryParams;

use ndarray::{Array1, ArrayView1};

/// Sentinel magnitude the generator returns for an unphysical or
/// non-convergent configuration
pub const FAILED_MAG: f64 = -1.0;

/// Model magnitudes for one theta, one array per band
#[derive(Clone, Debug, PartialEq)]
pub struct ModelMags {
    pub kp: Array1<f64>,
    pub h: Array1<f64>,
}

impl ModelMags {
    /// The failed-evaluation value: a single sentinel magnitude per band
    pub fn failed() -> Self {
        Self {
            kp: Array1::from_elem(1, FAILED_MAG),
            h: Array1::from_elem(1, FAILED_MAG),
        }
    }

    /// A sentinel in either band marks the whole evaluation unusable
    pub fn is_good(&self) -> bool {
        match (self.kp.first(), self.h.first()) {
            (Some(&kp), Some(&h)) => kp != FAILED_MAG && h != FAILED_MAG,
            _ => false,
        }
    }
}

/// A binary light-curve model evaluated at fixed observation epochs.
///
/// Implementations must be pure per call: no shared mutable state, so the
/// model-uncertainty job may evaluate many thetas concurrently.
pub trait LightCurveModel: Sync {
    /// Predicted magnitudes at the given Kp and H epochs (MJD) for one
    /// posterior sample's parameters
    fn model_mags(
        &self,
        params: &BinaryParams,
        kp_mjds: ArrayView1<f64>,
        h_mjds: ArrayView1<f64>,
    ) -> ModelMags;
}

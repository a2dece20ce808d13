//! Radius-keyed lookup into a precomputed stellar-evolution isochrone.
//!
//! The isochrone itself is synthesized upstream (evolution tracks,
//! atmosphere tables, reddening); this crate consumes it as a grid of
//! per-star records monotonic in radius and interpolates linearly between
//! bracketing rows. Constructing the table is the expensive step, so a
//! job builds exactly one [`TabulatedIsochrone`] and reuses it for every
//! posterior sample.

use crate::config::IsochroneParams;
use crate::error::{IsochroneError, StoreError};
use crate::store;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Full stellar parameters of one grid row / one interpolated star.
///
/// Units are fixed: masses in solar masses, radius in solar radii,
/// luminosities (total and per-passband) in solar luminosities, effective
/// temperature in Kelvin, surface gravity as log₁₀(cm s⁻²), passband
/// magnitudes in mag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StellarParams {
    pub mass_init: f64,
    pub mass: f64,
    pub radius: f64,
    pub lum: f64,
    pub teff: f64,
    pub logg: f64,
    pub mag_kp: f64,
    pub mag_h: f64,
    pub pblum_kp: f64,
    pub pblum_h: f64,
}

impl StellarParams {
    fn lerp(lo: &Self, hi: &Self, frac: f64) -> Self {
        let at = |a: f64, b: f64| a + (b - a) * frac;
        Self {
            mass_init: at(lo.mass_init, hi.mass_init),
            mass: at(lo.mass, hi.mass),
            radius: at(lo.radius, hi.radius),
            lum: at(lo.lum, hi.lum),
            teff: at(lo.teff, hi.teff),
            logg: at(lo.logg, hi.logg),
            mag_kp: at(lo.mag_kp, hi.mag_kp),
            mag_h: at(lo.mag_h, hi.mag_h),
            pblum_kp: at(lo.pblum_kp, hi.pblum_kp),
            pblum_h: at(lo.pblum_h, hi.pblum_h),
        }
    }
}

/// The reduced record the light-curve fit consumes
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LcFitParams {
    pub radius: f64,
    pub teff: f64,
    pub pblum_kp: f64,
    pub pblum_h: f64,
}

impl From<&StellarParams> for LcFitParams {
    fn from(params: &StellarParams) -> Self {
        Self {
            radius: params.radius,
            teff: params.teff,
            pblum_kp: params.pblum_kp,
            pblum_h: params.pblum_h,
        }
    }
}

/// An isochrone reduced to a radius-interpolable table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TabulatedIsochrone {
    params: IsochroneParams,
    rows: Vec<StellarParams>,
}

impl TabulatedIsochrone {
    /// Build from grid rows; radii must increase strictly
    pub fn new(params: IsochroneParams, rows: Vec<StellarParams>) -> Result<Self, IsochroneError> {
        if rows.is_empty() {
            return Err(IsochroneError::EmptyGrid);
        }
        if rows
            .iter()
            .tuple_windows()
            .any(|(lo, hi)| lo.radius >= hi.radius)
        {
            return Err(IsochroneError::UnsortedRadii);
        }
        Ok(Self { params, rows })
    }

    /// Build from a persisted grid store
    pub fn from_store(params: IsochroneParams, path: &Path) -> Result<Self, StoreError> {
        let rows: Vec<StellarParams> = store::load_json(path)?;
        Self::new(params, rows).map_err(|err| StoreError::Schema {
            path: path.to_owned(),
            reason: err.to_string(),
        })
    }

    #[inline]
    pub fn params(&self) -> &IsochroneParams {
        &self.params
    }

    /// Inclusive radius domain of the grid, solar radii
    pub fn radius_domain(&self) -> (f64, f64) {
        (
            self.rows.first().map(|row| row.radius).unwrap_or(f64::NAN),
            self.rows.last().map(|row| row.radius).unwrap_or(f64::NAN),
        )
    }

    /// Interpolate the full and reduced stellar-parameter records at a
    /// radius.
    ///
    /// A radius outside the grid domain is an error, never a clamp: the
    /// parameter-derivation job relies on row positions staying in sync
    /// with the chain, so a silently skipped sample would corrupt its
    /// resume bookkeeping.
    pub fn rad_interp(&self, radius: f64) -> Result<(StellarParams, LcFitParams), IsochroneError> {
        let (min, max) = self.radius_domain();
        if !(min..=max).contains(&radius) {
            return Err(IsochroneError::OutOfDomain { radius, min, max });
        }

        let upper = self.rows.partition_point(|row| row.radius < radius);
        let full = if self.rows[upper].radius == radius {
            self.rows[upper]
        } else {
            // upper > 0 here: radius >= min and rows[upper].radius > radius
            let lo = &self.rows[upper - 1];
            let hi = &self.rows[upper];
            let frac = (radius - lo.radius) / (hi.radius - lo.radius);
            StellarParams::lerp(lo, hi, frac)
        };
        Ok((full, LcFitParams::from(&full)))
    }
}

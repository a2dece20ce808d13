//! Job B: stellar and orbital parameters for every posterior sample.
//!
//! Cross-references each sample's two stellar radii against the isochrone,
//! derives the binary's semi-major axis and mass ratios, attaches the
//! fit-quality statistics, and appends the rows to the persisted table.
//! A previous run's table acts as a resume watermark: chain rows below
//! its row count are never touched again.

use crate::config::RunConfig;
use crate::data::{FlatChain, LcData, NUM_PARAMS};
use crate::error::JobError;
use crate::isochrone::TabulatedIsochrone;
use crate::params_table::{DerivedRow, ParamsTable};
use crate::units::{binary_semi_major_axis, fit_stats};

use log::{debug, info};
use std::path::Path;

/// What a run did to the persisted table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StellarParamsSummary {
    /// Rows already present before this run (the resume watermark)
    pub previous_rows: usize,
    /// Rows computed and appended by this run
    pub new_rows: usize,
    pub total_rows: usize,
}

/// Derive parameters for every chain row past the watermark and append
/// them to the store at `store_path`.
///
/// Strictly sequential and strictly in increasing row order. Any radius
/// outside the isochrone domain aborts the run before the store is
/// touched; partial progress is never persisted.
pub fn run(
    config: &RunConfig,
    lc_data: &LcData,
    chain: &FlatChain,
    isochrone: &TabulatedIsochrone,
    store_path: &Path,
) -> Result<StellarParamsSummary, JobError> {
    config.validate()?;

    let previous = if store_path.exists() {
        Some(ParamsTable::load(store_path)?)
    } else {
        None
    };
    let watermark = previous.as_ref().map(ParamsTable::len).unwrap_or(0);

    let num_observations = lc_data.num_observations();
    info!("number of observations = {num_observations}");
    info!(
        "chain has {} flat samples, {} already stored",
        chain.len(),
        watermark
    );

    let mut new_rows = ParamsTable::default();
    for row in watermark..chain.len() {
        new_rows.push_row(&derive_row(row, chain, isochrone, num_observations)?);
        if (row + 1) % 1000 == 0 {
            debug!("derived {} of {} samples", row + 1, chain.len());
        }
    }

    let summary = StellarParamsSummary {
        previous_rows: watermark,
        new_rows: new_rows.len(),
        total_rows: watermark + new_rows.len(),
    };

    // No new chain rows: leave the store exactly as it is
    if new_rows.is_empty() && previous.is_some() {
        info!("no samples past the watermark, store left untouched");
        return Ok(summary);
    }

    let table = match previous {
        Some(prev) => ParamsTable::vstack(prev, new_rows),
        None => new_rows,
    };
    table.save(store_path)?;
    info!("stored {} rows ({} new)", summary.total_rows, summary.new_rows);

    Ok(summary)
}

fn derive_row(
    row: usize,
    chain: &FlatChain,
    isochrone: &TabulatedIsochrone,
    num_observations: usize,
) -> Result<DerivedRow, JobError> {
    let theta = chain.params_at(row);
    let log_prob = chain.log_prob(row);

    let (star1, _star1_lcfit) = isochrone.rad_interp(theta.star1_rad)?;
    let (star2, _star2_lcfit) = isochrone.rad_interp(theta.star2_rad)?;

    let sma = binary_semi_major_axis(theta.period, star1.mass, star2.mass);
    let stats = fit_stats(log_prob, num_observations, NUM_PARAMS);

    Ok(DerivedRow {
        K_ext: theta.kp_ext,
        H_ext_mod: theta.h_ext_mod,
        star1_rad: theta.star1_rad,
        star2_rad: theta.star2_rad,
        binary_inc: theta.inc,
        binary_per: theta.period,
        t0: theta.t0,
        star1_mass_init: star1.mass_init,
        star1_mass: star1.mass,
        star1_lum: star1.lum,
        star1_teff: star1.teff,
        star1_logg: star1.logg,
        star1_mag_Kp: star1.mag_kp,
        star1_mag_H: star1.mag_h,
        star1_pblum_Kp: star1.pblum_kp,
        star1_pblum_H: star1.pblum_h,
        star2_mass_init: star2.mass_init,
        star2_mass: star2.mass,
        star2_lum: star2.lum,
        star2_teff: star2.teff,
        star2_logg: star2.logg,
        star2_mag_Kp: star2.mag_kp,
        star2_mag_H: star2.mag_h,
        star2_pblum_Kp: star2.pblum_kp,
        star2_pblum_H: star2.pblum_h,
        binary_sma: sma.au,
        binary_q: star2.mass / star1.mass,
        binary_q_init: star2.mass_init / star1.mass_init,
        log_prob,
        fit_chi2red: stats.chi2red,
        fit_BIC: stats.bic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::{AtmosphereModel, EvolutionaryPhase, IsochroneParams};
    use crate::data::{BandData, PosteriorChain};
    use crate::error::{IsochroneError, StoreError};
    use crate::isochrone::StellarParams;

    use approx::assert_relative_eq;
    use ndarray::{array, Array};
    use std::fs;

    fn lc_data() -> LcData {
        LcData {
            binary_period: 80.0,
            phase_shift: 0.0,
            kp: BandData::new(
                array![15.2, 15.4, 15.3],
                array![0.03, 0.05, 0.04],
                array![51000.0, 51020.0, 51041.5],
                array![0.0, 20.0, 41.5],
            ),
            h: BandData::new(
                array![13.1, 13.2, 13.0, 13.3, 13.1, 13.2],
                Array::from_elem(6, 0.04),
                array![51005.0, 51010.0, 51015.0, 51030.0, 51035.0, 51040.0],
                array![5.0, 10.0, 15.0, 30.0, 35.0, 40.0],
            ),
        }
    }

    fn grid_row(radius: f64) -> StellarParams {
        // Smooth monotonic pseudo-isochrone; values only need to be
        // deterministic functions of radius
        StellarParams {
            mass_init: 0.1 * radius,
            mass: 0.09 * radius,
            radius,
            lum: 5.0 * radius,
            teff: 3000.0 + 100.0 * radius,
            logg: 4.0 - 0.05 * radius,
            mag_kp: 16.0 - 0.1 * radius,
            mag_h: 14.0 - 0.1 * radius,
            pblum_kp: 1.0 * radius,
            pblum_h: 1.2 * radius,
        }
    }

    fn isochrone() -> TabulatedIsochrone {
        let rows = (1..=40).map(|i| grid_row(i as f64)).collect();
        TabulatedIsochrone::new(
            IsochroneParams {
                age_yr: 1.0e10,
                extinction_ks: 2.63,
                distance_pc: 7.971e3,
                phase: EvolutionaryPhase::Rgb,
                metallicity: 0.0,
                atm: AtmosphereModel::Phoenix,
            },
            rows,
        )
        .unwrap()
    }

    /// Chain of `num_steps` steps × 1 walker; star radii drift slowly with
    /// the step index
    fn chain(num_steps: usize, rad_offset: f64) -> PosteriorChain {
        let samples = Array::from_shape_fn((num_steps, 1, NUM_PARAMS), |(s, _, p)| match p {
            0 => 2.6,
            1 => 0.1,
            2 => rad_offset + 20.0 + 0.1 * s as f64,
            3 => rad_offset + 10.0 + 0.05 * s as f64,
            4 => 89.0,
            5 => 80.0,
            6 => 51500.0,
            _ => unreachable!(),
        });
        let log_prob = Array::from_iter((0..num_steps).map(|i| -50.0 - i as f64));
        let log_prior = Array::from_elem(num_steps, -1.0);
        PosteriorChain::new(samples, log_prob, log_prior).unwrap()
    }

    fn config(dir: &Path) -> RunConfig {
        RunConfig {
            trial_num: 1,
            burn_ignore_len: 0,
            num_plot_samples: 1,
            parallel_workers: None,
            lc_data_path: dir.join("lc_data.json"),
            chains_path: dir.join("chains_try1.json"),
            output_dir: dir.to_owned(),
        }
    }

    #[test]
    fn derived_quantities_match_closed_forms() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let path = cfg.stellar_params_path();
        let flat = chain(2, 0.0).flat_chain();

        let summary = run(&cfg, &lc_data(), &flat, &isochrone(), &path).unwrap();
        assert_eq!(summary.new_rows, 2);

        let table = ParamsTable::load(&path).unwrap();
        let row = table.row(0);
        let theta = flat.params_at(0);

        // Isochrone-derived masses: grid is linear in radius so the
        // interpolation is exact
        assert_relative_eq!(row.star1_mass, 0.09 * theta.star1_rad, max_relative = 1e-12);
        assert_relative_eq!(row.star2_mass, 0.09 * theta.star2_rad, max_relative = 1e-12);
        assert_relative_eq!(
            row.star1_teff,
            3000.0 + 100.0 * theta.star1_rad,
            max_relative = 1e-12
        );

        // Kepler and the mass ratios
        let sma = binary_semi_major_axis(theta.period, row.star1_mass, row.star2_mass);
        assert_relative_eq!(row.binary_sma, sma.au, max_relative = 1e-12);
        assert_relative_eq!(
            row.binary_q,
            row.star2_mass / row.star1_mass,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            row.binary_q_init,
            row.star2_mass_init / row.star1_mass_init,
            max_relative = 1e-12
        );

        // Fit statistics: 9 observations, 7 parameters, log_prob = -50
        assert_eq!(lc_data().num_observations(), 9);
        assert_relative_eq!(row.fit_chi2red, 100.0 / 2.0, max_relative = 1e-12);
        assert_relative_eq!(
            row.fit_BIC,
            7.0 * 9.0_f64.ln() + 100.0,
            max_relative = 1e-12
        );
        assert_eq!(row.log_prob, -50.0);
    }

    #[test]
    fn rerun_without_new_rows_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let path = cfg.stellar_params_path();
        let flat = chain(5, 0.0).flat_chain();
        let isochrone = isochrone();
        let lc = lc_data();

        let first = run(&cfg, &lc, &flat, &isochrone, &path).unwrap();
        assert_eq!(first.new_rows, 5);
        let bytes_after_first = fs::read(&path).unwrap();

        let second = run(&cfg, &lc, &flat, &isochrone, &path).unwrap();
        assert_eq!(second.previous_rows, 5);
        assert_eq!(second.new_rows, 0);
        assert_eq!(second.total_rows, 5);
        assert_eq!(fs::read(&path).unwrap(), bytes_after_first);
    }

    #[test]
    fn new_chain_rows_are_appended_and_old_rows_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let path = cfg.stellar_params_path();
        let isochrone = isochrone();
        let lc = lc_data();

        run(&cfg, &lc, &chain(4, 0.0).flat_chain(), &isochrone, &path).unwrap();
        let first_table = ParamsTable::load(&path).unwrap();

        // Same leading 4 steps plus 3 new ones
        let summary = run(&cfg, &lc, &chain(7, 0.0).flat_chain(), &isochrone, &path).unwrap();
        assert_eq!(summary.previous_rows, 4);
        assert_eq!(summary.new_rows, 3);
        assert_eq!(summary.total_rows, 7);

        let second_table = ParamsTable::load(&path).unwrap();
        assert_eq!(second_table.len(), 7);
        for row in 0..4 {
            assert_eq!(second_table.row(row), first_table.row(row));
        }
    }

    #[test]
    fn out_of_domain_radius_aborts_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let path = cfg.stellar_params_path();
        let isochrone = isochrone();
        let lc = lc_data();

        run(&cfg, &lc, &chain(3, 0.0).flat_chain(), &isochrone, &path).unwrap();
        let bytes_before = fs::read(&path).unwrap();

        // Extended chain whose new rows have radii beyond the grid
        let err = run(&cfg, &lc, &chain(5, 30.0).flat_chain(), &isochrone, &path).unwrap_err();
        assert!(matches!(
            err,
            JobError::Isochrone(IsochroneError::OutOfDomain { .. })
        ));
        assert_eq!(fs::read(&path).unwrap(), bytes_before);
    }

    #[test]
    fn malformed_store_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let path = cfg.stellar_params_path();
        fs::write(&path, r#"{"K_ext": [1.0]}"#).unwrap();

        let err = run(
            &cfg,
            &lc_data(),
            &chain(2, 0.0).flat_chain(),
            &isochrone(),
            &path,
        )
        .unwrap_err();
        assert!(matches!(err, JobError::Store(StoreError::Schema { .. })));
    }

    #[test]
    fn fresh_store_from_empty_chain_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let path = cfg.stellar_params_path();

        let summary = run(
            &cfg,
            &lc_data(),
            &chain(3, 0.0).flat_chain_after_burn(3).unwrap(),
            &isochrone(),
            &path,
        )
        .unwrap();
        assert_eq!(summary.total_rows, 0);
        assert!(ParamsTable::load(&path).unwrap().is_empty());
    }
}

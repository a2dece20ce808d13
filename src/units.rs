//! Physical constants and the closed-form derivations shared by both jobs.
//!
//! All constants are SI unless the name says otherwise; IAU 2015 nominal
//! values are used where they exist. Derived quantities are converted to
//! the units the parameter table stores (solar masses, solar radii, solar
//! luminosities, Kelvin, AU) before they leave this module.

use conv::prelude::*;

/// Heliocentric gravitational parameter GM☉, m³ s⁻² (IAU 2015 nominal)
pub const GM_SUN: f64 = 1.327_124_4e20;

/// Astronomical Unit in meters (IAU 2012)
pub const AU_M: f64 = 1.495_978_707e11;

/// Solar radius in meters (IAU 2015 nominal)
pub const SOLAR_RADIUS_M: f64 = 6.957e8;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Binary semi-major axis derived from Kepler's third law
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SemiMajorAxis {
    pub au: f64,
    pub sol_rad: f64,
}

/// `a = (P² G (M1 + M2) / 4π²)^(1/3)` with the period in days and the
/// masses in solar masses.
pub fn binary_semi_major_axis(period_days: f64, m1_solar: f64, m2_solar: f64) -> SemiMajorAxis {
    let period_s = period_days * SECONDS_PER_DAY;
    let gm_total = GM_SUN * (m1_solar + m2_solar);
    let a_m = (period_s.powi(2) * gm_total / (4.0 * std::f64::consts::PI.powi(2))).cbrt();
    SemiMajorAxis {
        au: a_m / AU_M,
        sol_rad: a_m / SOLAR_RADIUS_M,
    }
}

/// Per-sample fit-quality statistics
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitStats {
    pub chi2red: f64,
    pub bic: f64,
}

/// Reduced chi-squared and Bayesian Information Criterion for one sample.
///
/// `chi2red = −2 ln p / (N − k)`, `BIC = k ln N − 2 ln p`, where `ln p` is
/// the sample's log-probability, `N` the number of observations and `k`
/// the number of fit parameters.
pub fn fit_stats(log_prob: f64, num_observations: usize, num_params: usize) -> FitStats {
    assert!(
        num_observations > num_params,
        "fit statistics need more observations than fit parameters"
    );
    let n: f64 = num_observations.approx().unwrap();
    let k: f64 = num_params.approx().unwrap();
    let dof: f64 = (num_observations - num_params).approx().unwrap();
    FitStats {
        chi2red: (-2.0 * log_prob) / dof,
        bic: k * n.ln() - 2.0 * log_prob,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn kepler_semi_major_axis_matches_closed_form() {
        let sma = binary_semi_major_axis(80.0, 1.0, 0.8);

        // Same law written out independently in SI
        let period_s = 80.0 * 86_400.0;
        let a_m = (period_s * period_s * 1.8 * GM_SUN
            / (4.0 * std::f64::consts::PI * std::f64::consts::PI))
            .powf(1.0 / 3.0);
        assert_relative_eq!(sma.au, a_m / AU_M, max_relative = 1e-12);
        assert_relative_eq!(sma.sol_rad, a_m / SOLAR_RADIUS_M, max_relative = 1e-12);

        // Kepler's law in solar units: a³[AU] = P²[yr] (M1+M2)[M☉]
        let period_yr: f64 = 80.0 / 365.25;
        let a_au = (period_yr * period_yr * 1.8).powf(1.0 / 3.0);
        assert_relative_eq!(sma.au, a_au, max_relative = 1e-3);
    }

    #[test]
    fn sma_grows_with_period_and_mass() {
        let short = binary_semi_major_axis(10.0, 1.0, 1.0);
        let long = binary_semi_major_axis(100.0, 1.0, 1.0);
        assert!(long.au > short.au);

        let light = binary_semi_major_axis(80.0, 0.5, 0.5);
        let heavy = binary_semi_major_axis(80.0, 2.0, 2.0);
        assert!(heavy.au > light.au);
    }

    #[test]
    fn fit_stats_reference_values() {
        let stats = fit_stats(-50.0, 100, 7);
        assert_relative_eq!(stats.chi2red, 100.0 / 93.0, max_relative = 1e-12);
        assert_relative_eq!(stats.bic, 7.0 * 100.0_f64.ln() + 100.0, max_relative = 1e-12);
        assert_relative_eq!(stats.bic, 132.236, max_relative = 1e-5);
    }
}

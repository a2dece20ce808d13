use ndarray::{Array1, ArrayView1};

/// Number of fit parameters in one chain row
pub const NUM_PARAMS: usize = 7;

/// One posterior sample's fit parameters, by name.
///
/// The chain stores these positionally in the order the fit used:
/// Kp extinction, H extinction modifier, star-1 radius, star-2 radius,
/// inclination, orbital period, epoch t0. Raw rows are wrapped into this
/// struct immediately after reading and positional tuples never cross a
/// component boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BinaryParams {
    /// Kp-band extinction, mag
    pub kp_ext: f64,
    /// H-band extinction modifier, mag
    pub h_ext_mod: f64,
    /// Star-1 radius, solar radii
    pub star1_rad: f64,
    /// Star-2 radius, solar radii
    pub star2_rad: f64,
    /// Orbital inclination, degrees
    pub inc: f64,
    /// Orbital period, days
    pub period: f64,
    /// Epoch of periapsis passage, MJD
    pub t0: f64,
}

impl BinaryParams {
    /// Wrap one flattened chain row.
    ///
    /// Panics if the row does not have exactly [`NUM_PARAMS`] columns;
    /// the chain reader validates this at open time.
    pub fn from_row(row: ArrayView1<f64>) -> Self {
        assert_eq!(row.len(), NUM_PARAMS, "chain row has a wrong column count");
        Self {
            kp_ext: row[0],
            h_ext_mod: row[1],
            star1_rad: row[2],
            star2_rad: row[3],
            inc: row[4],
            period: row[5],
            t0: row[6],
        }
    }

    pub fn to_row(&self) -> Array1<f64> {
        Array1::from(vec![
            self.kp_ext,
            self.h_ext_mod,
            self.star1_rad,
            self.star2_rad,
            self.inc,
            self.period,
            self.t0,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn row_round_trip_keeps_column_order() {
        let row = array![2.6, 0.1, 31.5, 20.2, 88.7, 79.3, 51500.5];
        let params = BinaryParams::from_row(row.view());
        assert_eq!(params.kp_ext, 2.6);
        assert_eq!(params.star2_rad, 20.2);
        assert_eq!(params.period, 79.3);
        assert_eq!(params.to_row(), row);
    }

    #[test]
    #[should_panic(expected = "wrong column count")]
    fn short_row_panics() {
        let row = array![1.0, 2.0, 3.0];
        let _ = BinaryParams::from_row(row.view());
    }
}

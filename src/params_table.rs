//! The persisted stellar-parameter table.
//!
//! Column-major, append-only: one row per posterior sample, 31 named
//! columns of dimensionless numbers in the units documented on
//! [`crate::isochrone::StellarParams`] (semi-major axis in AU). Rows are
//! never recomputed or reordered once stored; repeated runs only ever
//! append.

use crate::error::StoreError;
use crate::store;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

macro_rules! params_table {
    ($($column: ident),+ $(,)?) => {
        /// Column names in storage order
        pub const COLUMN_NAMES: &[&str] = &[$(stringify!($column)),+];

        /// One derived row, prior to being appended to the table
        #[allow(non_snake_case)]
        #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
        pub struct DerivedRow {
            $(pub $column: f64,)+
        }

        /// The column-major table the store persists
        #[allow(non_snake_case)]
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        #[serde(deny_unknown_fields)]
        pub struct ParamsTable {
            $(pub $column: Vec<f64>,)+
        }

        impl ParamsTable {
            pub fn push_row(&mut self, row: &DerivedRow) {
                $(self.$column.push(row.$column);)+
            }

            /// Append `new`'s rows after `prev`'s, leaving `prev`'s rows
            /// in their original order
            pub fn vstack(mut prev: Self, new: Self) -> Self {
                $(prev.$column.extend_from_slice(&new.$column);)+
                prev
            }

            pub fn row(&self, index: usize) -> DerivedRow {
                DerivedRow {
                    $($column: self.$column[index],)+
                }
            }

            fn column_lengths(&self) -> Vec<usize> {
                vec![$(self.$column.len()),+]
            }
        }
    };
}

params_table!(
    K_ext,
    H_ext_mod,
    star1_rad,
    star2_rad,
    binary_inc,
    binary_per,
    t0,
    star1_mass_init,
    star1_mass,
    star1_lum,
    star1_teff,
    star1_logg,
    star1_mag_Kp,
    star1_mag_H,
    star1_pblum_Kp,
    star1_pblum_H,
    star2_mass_init,
    star2_mass,
    star2_lum,
    star2_teff,
    star2_logg,
    star2_mag_Kp,
    star2_mag_H,
    star2_pblum_Kp,
    star2_pblum_H,
    binary_sma,
    binary_q,
    binary_q_init,
    log_prob,
    fit_chi2red,
    fit_BIC,
);

impl ParamsTable {
    pub fn len(&self) -> usize {
        self.K_ext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load an existing store; any deviation from the expected column set
    /// or ragged column lengths is a schema error, distinct from an
    /// unreadable or non-JSON file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_owned(),
            source,
        })?;
        let table: Self = serde_json::from_str(&contents).map_err(|source| {
            if serde_json::from_str::<serde_json::Value>(&contents).is_ok() {
                StoreError::Schema {
                    path: path.to_owned(),
                    reason: source.to_string(),
                }
            } else {
                StoreError::Format {
                    path: path.to_owned(),
                    source,
                }
            }
        })?;

        let lengths = table.column_lengths();
        if lengths.iter().any(|&len| len != lengths[0]) {
            return Err(StoreError::Schema {
                path: path.to_owned(),
                reason: "column lengths differ".into(),
            });
        }
        Ok(table)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        store::save_json_atomic(path, self)
    }
}

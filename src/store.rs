//! JSON persistence shared by every on-disk store.
//!
//! Reads distinguish a missing store from a malformed one; writes go
//! through a sibling temporary file and a rename so a crashed run never
//! leaves a half-written store behind.

use crate::error::StoreError;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read and deserialize a store in one shot
pub fn load_json<T>(path: &Path) -> Result<T, StoreError>
where
    T: DeserializeOwned,
{
    let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Format {
        path: path.to_owned(),
        source,
    })
}

/// Serialize and atomically overwrite a store
pub fn save_json_atomic<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize,
{
    let contents = serde_json::to_string(value).map_err(|source| StoreError::Format {
        path: path.to_owned(),
        source,
    })?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    let io_err = |source| StoreError::Io {
        path: path.to_owned(),
        source,
    };
    fs::write(tmp, contents).map_err(io_err)?;
    fs::rename(tmp, path).map_err(io_err)
}

mod binary_params;
pub use binary_params::{BinaryParams, NUM_PARAMS};

mod chain;
pub use chain::{FlatChain, PosteriorChain};

mod lc_data;
pub use lc_data::{fold_phase, BandData, LcData};

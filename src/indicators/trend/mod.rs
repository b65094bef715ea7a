//! Market trend indicators: mean-reversion expected return and MA trend filter

pub mod mean_reversion;

pub use mean_reversion::*;

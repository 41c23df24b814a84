//! Stage failure causes
//!
//! These never leave the probe module as errors; each stage renders them
//! into the `detail` of a failed [`super::ProbeOutcome`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("no addresses found")]
    NoAddresses,

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

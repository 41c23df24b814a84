//! Access module - caller identity and the capability gate

mod gate;
mod principal;

pub use gate::{authorize, denial_reason};
pub use principal::Principal;

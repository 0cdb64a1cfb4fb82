//! Data models for the BioPage application.
//!
//! Wire format is camelCase to match the frontend interfaces.

mod link;
mod profile;
mod session;

pub use link::*;
pub use profile::*;
pub use session::*;

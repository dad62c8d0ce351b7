//! Data models for Xbox Live responses

mod profile;

pub use profile::*;

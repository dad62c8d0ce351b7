//! Xbox Live API surface: request descriptions, client and profile lookups

pub mod client;
pub mod profile;
pub mod request;

pub use client::XblClient;
pub use profile::{
    build_batch, build_single_by_gamertag, build_single_by_xuid, ProfileProvider, PROFILE_URL,
};
pub use request::ApiRequest;

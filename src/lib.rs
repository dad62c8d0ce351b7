//! Xbox WebAPI - profile lookups and an interactive terminal login
//!
//! `api` builds and sends profile requests, `auth` holds the login manager
//! seam and a Windows Live implementation, `tui` is the login front-end.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod tui;

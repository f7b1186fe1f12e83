//! Locale cache building, language negotiation and location management for
//! Fork CMS sites.

pub mod config;
pub mod db;
pub mod error;
pub mod extras;
pub mod i18n;
pub mod location;
pub mod retry;
pub mod security;
pub mod server;

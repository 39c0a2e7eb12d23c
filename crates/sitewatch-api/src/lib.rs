// sitewatch-api: Async Rust client for the site-availability backend

pub mod client;
pub mod error;
pub mod models;

pub use client::ApiClient;
pub use error::Error;
pub use models::{CheckResult, HistoryRecord, Site, StatusTier};

//! restaurant-core - Core library for Restaurant Reviews
//!
//! This crate contains the models, the local store, the remote API client,
//! the pending-review sync engine, and the offline response cache used by the
//! Restaurant Reviews front ends (CLI and caching proxy).

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod favorites;
pub mod models;
pub mod notice;
pub mod remote;
pub mod services;
pub mod state;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{NewReview, Restaurant, Review, ReviewId};

//! Attraction recommendation service.
//!
//! Forwards a location and a free-text prompt to a generative model together
//! with the CSV request log as search-history context, and returns the
//! model's schema-constrained list of attractions.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

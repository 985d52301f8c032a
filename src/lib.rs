#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weather- and hazard-aware risk scoring for driving routes.
//!
//! Given a start and end location, [`planner::RoutePlanner`] fetches
//! candidate routes, matches crowd-reported hazards to each of them,
//! scores each route 0-100 from current weather and those hazards, and
//! returns the safest, fastest and a moderate option plus a leave-now or
//! wait recommendation. [`api::router`] exposes this over HTTP.

pub mod advisor;
pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod hazards;
pub mod models;
pub mod planner;
pub mod providers;
pub mod proximity;
pub mod risk;
pub mod scorer;
pub mod synthesize;

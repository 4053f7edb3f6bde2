//! Laminor Analysis Pipeline
//!
//! This library provides the core functionality of the laminor-analysis
//! service: accepting uploaded images and videos, delegating inference to
//! an external ML service, tracking each submission as a persisted job,
//! and exposing the queryable detection results and aggregate counts.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;

//! Premium API - HTTP front end for the insurance premium predictor
//!
//! Exposes single-model prediction over JSON (`POST /predict`) next to
//! health, readiness and Prometheus endpoints.

pub mod api;
pub mod config;

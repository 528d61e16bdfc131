//! Employee time clock: shift tracking, correction requests and workload
//! reporting over a pluggable store.

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod metrics;
pub mod model;
pub mod models;
pub mod routes;
pub mod service;
pub mod store;

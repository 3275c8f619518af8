//! Wireless link quality monitor.
//!
//! Collectors sample each interface on a fixed tick and feed a
//! [`SampleStore`](adapters::SampleStore), which keeps a short history per
//! interface and streams every accepted sample to live subscribers. An axum
//! router exposes status, best-interface selection and the live feed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod interface;
pub mod ports;

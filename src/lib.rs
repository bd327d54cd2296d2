//! # shore-explorer
//!
//! Client core for the SHORE (Sentinel Hydrological Observation & Resource
//! Explorer) map interface.
//!
//! A user supplies an area of interest, drawn or imported as WKT or
//! GeoJSON. The explorer searches the imagery backend for Sentinel-2
//! scenes over it, pages and exports the results, and overlays
//! water-level station readings. All state lives in one [`AppState`]
//! owned by a [`Controller`]; the UI is reached only through the
//! [`ViewBinding`] trait and pure HTML templates.
//!
//! ## Architecture
//!
//! ```text
//! UI (browser binding, `shore` CLI)
//!     │   ViewBinding (view/)
//!     │
//!     ├── Controller + AppState
//!     │
//!     ├── SearchService / DetailService / StationService / export (service/)
//!     │
//!     ├── AOI, query builder, pagination, stations (domain/)
//!     │
//!     └── SearchBackend ── HttpBackend (api/) ── SHORE backend
//! ```
//!
//! [`AppState`]: app_state::AppState
//! [`Controller`]: controller::Controller
//! [`ViewBinding`]: view::ViewBinding

pub mod api;
pub mod app_state;
pub mod cli;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod logging;
pub mod service;
pub mod view;

#[cfg(test)]
mod test_support;

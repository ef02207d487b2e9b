//! Client for the university online-voting API.
//!
//! The library holds everything but presentation: the session store, the
//! role guard, the position-by-position ballot, result projections and the
//! dashboards, all over the HTTP API in [`api`].

pub mod api;
pub mod ballot;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod logging;
pub mod model;
pub mod results;
pub mod session;
pub mod token;

pub use config::Config;
pub use error::{Error, Result};

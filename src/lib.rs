//! ModemViz: polls an Arris-family cable modem's web interface and
//! publishes normalized status readings over a small dashboard and JSON
//! API.

pub mod error;
pub mod extract;
pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod poller;
pub mod state;

//! Agent Studio: agent wizard, dashboard client and site endpoints.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod uploads;
pub mod wizard;

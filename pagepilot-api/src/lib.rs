//! # PagePilot API Server Library
//!
//! HTTP server for PagePilot: accounts, content drafting and publishing to
//! Facebook pages and Instagram business accounts.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: JSON body and query extractors that reject with `ApiError`
//! - `middleware`: Session gate and security headers
//! - `routes`: Route handlers and HTML pages

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;

//! # PagePilot Shared Library
//!
//! This crate contains the models, authentication primitives and social
//! platform clients used by the PagePilot API server.
//!
//! ## Module Organization
//!
//! - `auth`: Session tokens, password hashing, OAuth state, request gating
//! - `db`: Connection pool, migrations and row normalization
//! - `models`: Database models with inline SQL
//! - `social`: Graph API client, OAuth exchange and platform publishers
//! - `generator`: AI-assisted content drafting

pub mod auth;
pub mod db;
pub mod generator;
pub mod models;
pub mod social;

/// Current version of the PagePilot shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

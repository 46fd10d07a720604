/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Security headers
/// - Session gating of pages and API routes

pub mod security;
pub mod session;

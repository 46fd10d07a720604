/// Route handlers, organized by resource:
///
/// - `pages`: Server-rendered HTML (landing, login, register, dashboard, settings)
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout, current user
/// - `subscription`: Current plan
/// - `social`: OAuth connect/callback and connected accounts
/// - `publish`: Publish content to a platform
/// - `content`: Content library and AI drafting
/// - `maintenance`: Account diagnostics and page-id repair

pub mod auth;
pub mod content;
pub mod health;
pub mod maintenance;
pub mod pages;
pub mod publish;
pub mod social;
pub mod subscription;

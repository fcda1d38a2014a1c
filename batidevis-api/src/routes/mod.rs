/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `profile`: Own-account management (profile, password)
/// - `projects`: Project CRUD
/// - `devis`: Current-devis read and CSV export
/// - `shares`: Project share invitations (pending, accept, reject)
/// - `articles`: Article library CRUD
/// - `stats`: User and admin statistics

pub mod health;
pub mod auth;
pub mod profile;
pub mod projects;
pub mod devis;
pub mod shares;
pub mod articles;
pub mod stats;

//! REST gateway of the student-management application.
//!
//! Students are exposed as a REST resource under a fixed base path (`/api`)
//! with a permissive cross-origin policy on every route.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod rest;
pub mod routes;
pub mod server;
pub mod state;

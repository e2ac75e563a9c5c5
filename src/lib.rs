//! blogd - portfolio blog service
//!
//! This library provides the blog content, contact intake, and admin
//! access-gate functionality behind the portfolio site's API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;

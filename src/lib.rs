//! demandtrack: a small backend for tracking sales accounts and the staffing
//! demands raised against them.
//!
//! Layering, top to bottom: [`http`] exposes the REST surface, [`services`]
//! hold the business rules, [`engine`] holds the pure filter/aggregation/pivot
//! functions, and [`db`] persists everything in SQLite.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod http;
pub mod migrations;
pub mod queries;
pub mod services;
pub mod state;
pub mod types;

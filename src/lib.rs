//! # Exeat API Library
//!
//! This library provides the core functionality for the Exeat API service:
//! the leave-pass lifecycle, the multi-tenant authorization gate, and the
//! handlers, models and server configuration around them.

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod mail;
pub mod models;
pub mod photos;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;

//! Boletin - attendance registration and notification backend for a school.
//!
//! Built on Actix Web with SeaORM storage.
//!
//! # Layout
//! - `cache`: object cache layer (Moka)
//! - `config`: layered configuration
//! - `entity`: SeaORM entities
//! - `errors`: crate error type
//! - `middlewares`: JWT authentication and role checks
//! - `models`: business models and response envelopes
//! - `routes`: HTTP routing
//! - `runtime`: startup and shutdown
//! - `services`: request handlers and fanout
//! - `storage`: SeaORM storage backend
//! - `utils`: extractors, JWT and text helpers

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;

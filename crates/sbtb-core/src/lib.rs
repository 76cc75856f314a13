//! Core types and trait definitions for the sbtb boxing data pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! scraping crate produces [`raw`] records, the [`reconcile`] module turns them
//! into [`model`] records, and any [`store::BoxingStore`] backend persists
//! them.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod model;
pub mod raw;
pub mod reconcile;
pub mod seed;
pub mod store;

pub use error::{Error, ResolutionError, Result};

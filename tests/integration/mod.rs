//! Integration test suite for manifest-render
//!
//! End-to-end tests driving the public API: sources on disk and in memory,
//! concurrent renders, caching, engines and configuration files.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=manifest_render=debug cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **caching**: cache idempotence, copy isolation, key strategies and expiry
//! - **concurrency**: compile-once under concurrent first calls, shared renderers
//! - **config_file**: TOML configuration end to end
//! - **engine**: multi-renderer aggregation
//! - **rendering**: merge, strict lookup, provenance, pipeline, failure semantics


mod caching;
mod concurrency;
mod rendering;

//! # Carebook Architecture
//!
//! Carebook is the query core of a home-care records dashboard. It lists,
//! filters, sorts, pages and deletes two collections (visit reports and the
//! patient register) held in an external document store. The CLI is one client
//! of the library, not the other way round.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (main.rs, args.rs, print.rs)                           │
//! │  - Parses arguments, formats output, owns stdout/stderr     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API (api.rs)                                               │
//! │  - Thin facade, returns Result<CmdResult>                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Commands (commands/*.rs) and the list view (view.rs)       │
//! │  - One ListView per listing owns the mutable QueryState     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Query engine (query/), deletion gate, routes               │
//! │  - Pure functions of (records, state)                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (store/)                                           │
//! │  - RecordStore trait, FileStore, InMemoryStore              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! From `api.rs` inward nothing writes to stdout or stderr and nothing calls
//! `std::process::exit`. Diagnostics go through `tracing`; the binary decides
//! where they end up.
//!
//! ## Records
//!
//! Backend documents are decoded once, at the store boundary, into
//! [`model::Record`]. Missing or oddly typed fields become `None` there, so
//! the query engine never sees untyped data and never fails on a bad field.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade
//! - [`commands`]: one module per user operation
//! - [`view`]: `ListView`, load state and delete wiring for one listing
//! - [`query`]: register-number keys, filters, sorting, paging
//! - [`gate`]: two-step deletion confirmation
//! - [`routes`]: detail-view paths
//! - [`store`]: storage abstraction and implementations
//! - [`model`]: `Record`, `Report`, `Patient` and timestamp handling
//! - [`config`]: persisted settings
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod gate;
pub mod model;
pub mod query;
pub mod routes;
pub mod store;
pub mod view;

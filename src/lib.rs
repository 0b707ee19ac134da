//! flow - Focus Flow Library
//!
//! Core functionality for the flow CLI, a personal task manager with
//! local JSON storage and an optional remote record-API backend.
//!
//! # Core Concepts
//!
//! - **Tasks**: Titled work items with priority, category, completion
//!   state, and an optional end-of-day due date
//! - **Categories**: Named groupings joined to tasks by case-insensitive
//!   name match, carrying a reconciled task count
//! - **Views**: Filtering, sorting, and aggregate statistics over tasks
//! - **Backends**: Local JSON collections or a remote record API with
//!   `_c`-suffixed field names, behind one service trait surface
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `flow.toml`
//! - `error`: Error types and result aliases
//! - `storage`: Collection persistence and the seeded local store
//! - `task`: Task records and the local task repository
//! - `category`: Category records and the local category repository
//! - `view`: Filtering, sort order, statistics, overdue checks
//! - `dates`: Due-date parsing and display
//! - `service`: Backend-agnostic task and category service traits
//! - `remote`: Remote record-API client and repositories
//! - `generate`: Description generator HTTP client

pub mod category;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod generate;
pub mod output;
pub mod remote;
pub mod service;
pub mod storage;
pub mod task;
pub mod view;

pub use error::{Error, Result};

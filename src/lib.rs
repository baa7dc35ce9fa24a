//! # Semantic Explorer
//!
//! Browse, edit, approve and delete the semantic chunks and the
//! reasoning-and-planning narrative that an upstream generator writes for each
//! version of a codebase.
//!
//! Every version is one YAML file, `<root>/.semantic/<version>-chunks.yaml`.
//! A view (an editor panel, the `semx` CLI, or anything speaking the JSON
//! protocol) asks for versions and their contents, and sends edits back; the
//! store rewrites the whole file on each change and answers with the full
//! refreshed collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   Request    ┌─────────────┐   ┌────────────┐   ┌──────────────┐
//! │   View   │─────────────▶│ SyncService │──▶│ Repository │──▶│ SemanticStore│
//! │ (state)  │◀─────────────│ (protocol)  │   │ locks+rules│   │  YAML / mem  │
//! └──────────┘   Response   └─────────────┘   └────────────┘   └──────────────┘
//!                                  ▲
//!                    stdio JSON lines / HTTP
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Semantic file, chunk and chunk id types |
//! | [`catalog`] | Version discovery |
//! | [`store`] | Storage trait with YAML and in-memory backends |
//! | [`repository`] | Normalized, validated, locked store operations |
//! | [`protocol`] | Request/response messages and the dispatcher |
//! | [`view`] | View state machine, renderer and session driver |
//! | [`stdio`] | JSON-lines message channel |
//! | [`server`] | JSON HTTP server |
//! | [`commands`] | CLI command implementations |
//! | [`logging`] | Tracing subscriber setup |

pub mod catalog;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod protocol;
pub mod repository;
pub mod server;
pub mod stdio;
pub mod store;
pub mod view;

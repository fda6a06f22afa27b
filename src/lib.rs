//! # RAG feedback
//!
//! Retrieval-augmented code review. A submission's language is used to pull
//! best-practice passages from a persistent vector index; the passages and
//! the submission are rendered into a review prompt and sent to Gemini.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ PDFs / Web   │──▶│ Chunk+Embed │──▶│ SQLite index │
//! └──────────────┘   └─────────────┘   └──────┬───────┘
//!                                             │ top-k
//!                    ┌──────────┐      ┌──────▼───────┐      ┌────────┐
//!  submission ──────▶│  prompt  │◀─────│  retriever   │      │ Gemini │
//!                    └────┬─────┘      └──────────────┘      └───▲────┘
//!                         └──────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Defaults, TOML file, environment overrides |
//! | [`models`] | Chunks, submissions, response bodies |
//! | [`error`] | Error taxonomy |
//! | [`chunk`] | Recursive character splitter |
//! | [`extract`] | PDF and HTML text extraction |
//! | [`loader`] | PDF folder and webpage loading |
//! | [`embedding`] | Embedding provider trait and Gemini embedder |
//! | [`store`] | SQLite-backed vector index |
//! | [`retriever`] | Context retrieval for a language |
//! | [`prompt`] | Review prompt rendering |
//! | [`llm`] | Generation backend |
//! | [`service`] | Feedback and ingestion orchestration |
//! | [`seed`] | Offline bulk ingestion |
//! | [`server`] | HTTP API |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod llm;
pub mod loader;
pub mod migrate;
pub mod models;
pub mod prompt;
pub mod retriever;
pub mod seed;
pub mod server;
pub mod service;
pub mod store;

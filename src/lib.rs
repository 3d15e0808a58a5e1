//! # courseforge
//!
//! Turns a page-tagged extracted document (PDF text or table-of-contents
//! text) into a hierarchical course structure by driving a local language
//! model through a tolerant multi-pass pipeline:
//!
//! - **Chunker** (`pipeline::chunker`): splits page text into size-bounded,
//!   page-attributed chunks
//! - **Extractor** (`pipeline::extract`): one model call per chunk, parsed
//!   into partial section outlines with best-effort JSON recovery
//! - **Merger** (`pipeline::merge`): id-minimized refs, batched model calls
//!   that group sections into module skeletons, with a fallback module per
//!   failed batch so no section is ever dropped
//! - **Rehydrator** (`pipeline::hydrate`): reattaches full section content
//!   by id and validates the final course
//!
//! The model is an injected collaborator behind the [`engine::ModelEngine`]
//! trait: a single non-reentrant handle, reset before every call, invoked
//! strictly sequentially.
//!
//! ## Library usage
//!
//! ```no_run
//! use courseforge::engine::ollama::{OllamaClient, OllamaConfig};
//! use courseforge::pipeline::{self, PipelineConfig};
//!
//! let mut engine = OllamaClient::new(OllamaConfig::default());
//! engine.probe();
//! let pages = courseforge::ingest::pages_from_file("book.pdf".as_ref()).unwrap();
//! let course = pipeline::generate_course(&pages, &mut engine, &PipelineConfig::default()).unwrap();
//! println!("{} modules", course.modules.len());
//! ```

pub mod engine;
pub mod error;
pub mod ingest;
pub mod pipeline;

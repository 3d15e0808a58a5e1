//! Top-level error type for courseforge.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives; this wrapper preserves the full diagnostic chain (error codes,
//! help text, sources) through to the caller.

use miette::Diagnostic;
use thiserror::Error;

use crate::engine::ModelError;
use crate::ingest::IngestError;
use crate::pipeline::PipelineError;

/// Top-level error type wrapping every subsystem error.
#[derive(Debug, Error, Diagnostic)]
pub enum CourseForgeError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ingest(#[from] IngestError),
}

//! Rich diagnostic error types for the pipeline.
//!
//! The pipeline recovers locally from chunk-level and batch-level model
//! failures; only the errors here can actually abort a run.

use miette::Diagnostic;
use thiserror::Error;

use crate::engine::ModelError;

/// Errors from pipeline operations.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("invalid chunk size: max_chars must be at least 1")]
    #[diagnostic(
        code(courseforge::pipeline::invalid_chunk_size),
        help("Pass a positive max_chars (the default is 20000).")
    )]
    InvalidChunkSize,

    #[error("invalid batch size: batch_size must be at least 1")]
    #[diagnostic(
        code(courseforge::pipeline::invalid_batch_size),
        help("Pass a positive batch_size (the default is 20).")
    )]
    InvalidBatchSize,

    #[error("no sections to merge")]
    #[diagnostic(
        code(courseforge::pipeline::nothing_to_merge),
        help(
            "Extraction produced zero sections across all chunks. \
             Check that the input document actually contains text, \
             and that the model engine is reachable."
        )
    )]
    NothingToMerge,

    #[error("assembled course failed validation: {reason}")]
    #[diagnostic(
        code(courseforge::pipeline::invalid_course),
        help(
            "The merge phase produced a structurally invalid course even after \
             all tolerant fallbacks. This usually means the model returned \
             nothing usable for any batch."
        )
    )]
    InvalidCourse { reason: String },

    #[error("could not parse outline from model response: {message}")]
    #[diagnostic(
        code(courseforge::pipeline::outline_parse),
        help(
            "The table-of-contents analysis got a reply with no recoverable \
             JSON object. Retry, or try a larger model."
        )
    )]
    OutlineParse { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),
}

/// Convenience alias for pipeline operation results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

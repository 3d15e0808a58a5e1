//! The model-engine seam: a narrow interface over the shared language model.
//!
//! The pipeline never talks to a model directly. It goes through
//! [`ModelEngine`], a blocking request/response boundary owned by the
//! orchestrator for the duration of one run. The handle is non-reentrant:
//! calls are issued one at a time, and conversational state is reset before
//! every call so no prior chunk's context bleeds into the next prompt.

use miette::Diagnostic;
use thiserror::Error;

pub mod ollama;

pub use ollama::{OllamaClient, OllamaConfig};

/// Errors from the model engine.
#[derive(Debug, Error, Diagnostic)]
pub enum ModelError {
    #[error("model engine is not available at {url}")]
    #[diagnostic(
        code(courseforge::engine::unavailable),
        help("Start Ollama with `ollama serve`, or point --ollama-url at a running instance.")
    )]
    Unavailable { url: String },

    #[error("model request failed: {message}")]
    #[diagnostic(
        code(courseforge::engine::request_failed),
        help("Check that the model server is running and the model is pulled.")
    )]
    RequestFailed { message: String },

    #[error("failed to parse model response: {message}")]
    #[diagnostic(
        code(courseforge::engine::parse_error),
        help("The model server returned an unexpected response format.")
    )]
    ParseError { message: String },
}

/// A single-owner handle to a language model.
///
/// Implementations may be remote services or local inference engines; the
/// pipeline treats them uniformly as fallible, stateful, and non-reentrant.
pub trait ModelEngine {
    /// Clear any conversational state carried from previous calls.
    ///
    /// The pipeline invokes this immediately before every [`call`], so a
    /// correct implementation guarantees each prompt is evaluated fresh.
    ///
    /// [`call`]: ModelEngine::call
    fn reset(&mut self) -> Result<(), ModelError>;

    /// Send one prompt and return the model's raw text reply.
    ///
    /// The reply is best-effort text. Callers must not assume it is valid
    /// JSON even when the prompt demanded JSON output.
    fn call(&mut self, prompt: &str) -> Result<String, ModelError>;
}

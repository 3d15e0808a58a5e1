//! Document-to-course pipeline.
//!
//! Orchestrates: chunk → extract (per chunk) → minimize → batch → merge
//! (per batch) → rehydrate. Every model call goes through the shared
//! [`ModelEngine`] handle one at a time, with a state reset immediately
//! before each call. Chunk and batch failures degrade locally; only
//! terminal structural invalidity of the final course aborts a run.

use crate::engine::{ModelEngine, ModelError};
use crate::pipeline::model::{Course, PageText};

pub mod chunker;
pub mod error;
pub mod extract;
pub mod hydrate;
pub mod json;
pub mod merge;
pub mod model;
pub mod toc;

pub use error::{PipelineError, PipelineResult};
pub use model::{
    BlockKind, Chunk, ContentBlock, MinimizedSectionRef, Module, ModuleSkeleton, Section,
    SkeletonTopic, Subsection, Topic,
};

/// Caller-overridable pipeline parameters.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum characters per chunk.
    pub max_chars: usize,
    /// Refs per merge batch.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_chars: 20_000,
            batch_size: 20,
        }
    }
}

/// Progress notification emitted after each completed model call.
///
/// The pipeline is a long-running, client-driven process; callers are
/// expected to surface these incrementally rather than run it unattended.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// One chunk finished extraction.
    ChunkExtracted {
        index: usize,
        total: usize,
        sections: usize,
    },
    /// One batch finished merging.
    BatchMerged {
        index: usize,
        total: usize,
        modules: usize,
        fallback: bool,
    },
}

/// Reset the engine's conversational state, then issue one call.
///
/// Carrying a prior chunk's context into a new call would corrupt token
/// budgets and contaminate output, so the reset is unconditional.
pub(crate) fn call_model(
    engine: &mut dyn ModelEngine,
    prompt: &str,
) -> Result<String, ModelError> {
    engine.reset()?;
    engine.call(prompt)
}

/// Run the full pipeline: page texts in, validated course out.
pub fn generate_course(
    pages: &[PageText],
    engine: &mut dyn ModelEngine,
    config: &PipelineConfig,
) -> PipelineResult<Course> {
    generate_course_with_observer(pages, engine, config, |_| {})
}

/// [`generate_course`] with a progress observer invoked after each
/// chunk extraction and each batch merge.
pub fn generate_course_with_observer(
    pages: &[PageText],
    engine: &mut dyn ModelEngine,
    config: &PipelineConfig,
    mut observer: impl FnMut(PipelineEvent),
) -> PipelineResult<Course> {
    let chunks = chunker::chunk_pages(pages, config.max_chars)?;
    tracing::info!(chunks = chunks.len(), pages = pages.len(), "chunked input");

    // Pass 1: extract sections per chunk, sequentially. The engine handle
    // is non-reentrant, so logically independent chunks still run one at
    // a time.
    let mut sections = Vec::new();
    let chunk_total = chunks.len();
    for (index, chunk) in chunks.iter().enumerate() {
        let extracted = extract::extract_sections(&chunk.text, engine);
        tracing::info!(
            chunk = index + 1,
            total = chunk_total,
            start_page = chunk.start_page,
            end_page = chunk.end_page,
            sections = extracted.len(),
            "chunk extracted"
        );
        observer(PipelineEvent::ChunkExtracted {
            index,
            total: chunk_total,
            sections: extracted.len(),
        });
        sections.extend(extracted);
    }

    if sections.is_empty() {
        return Err(PipelineError::NothingToMerge);
    }

    // Pass 2: minimize, batch, merge. The section map is owned here and
    // outlives all batch calls.
    let (refs, section_map) = merge::minimize_sections(sections);
    let batches = merge::batch_refs(&refs, config.batch_size)?;
    let batch_total = batches.len();

    let mut modules = Vec::new();
    for (index, batch) in batches.iter().enumerate() {
        let outcome = merge::merge_batch(batch, index, batch_total, engine);
        tracing::info!(
            batch = index + 1,
            total = batch_total,
            modules = outcome.modules.len(),
            fallback = outcome.fallback,
            "batch merged"
        );
        observer(PipelineEvent::BatchMerged {
            index,
            total: batch_total,
            modules: outcome.modules.len(),
            fallback: outcome.fallback,
        });
        modules.extend(outcome.modules);
    }

    // Pass 3: rehydrate and validate.
    hydrate::hydrate_modules(modules, &section_map)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SilentEngine;

    impl ModelEngine for SilentEngine {
        fn reset(&mut self) -> Result<(), ModelError> {
            Ok(())
        }

        fn call(&mut self, _prompt: &str) -> Result<String, ModelError> {
            Err(ModelError::RequestFailed {
                message: "always down".into(),
            })
        }
    }

    #[test]
    fn config_defaults_match_documented_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_chars, 20_000);
        assert_eq!(config.batch_size, 20);
    }

    #[test]
    fn no_extracted_sections_is_nothing_to_merge() {
        let pages = vec![PageText {
            page: 1,
            text: "some text the dead engine never sees".into(),
        }];
        let result = generate_course(&pages, &mut SilentEngine, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::NothingToMerge)));
    }

    #[test]
    fn empty_pages_is_nothing_to_merge() {
        let result = generate_course(&[], &mut SilentEngine, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::NothingToMerge)));
    }
}

//! Id-minimization, batching, and batch merging.
//!
//! Sections are stripped down to `{id, title, summary}` refs so each merge
//! prompt stays within model context limits; the full sections wait in an
//! owned map keyed by id until rehydration. Batches go through the model
//! strictly in order, and a batch whose call or parse fails is replaced by
//! a synthesized "Unmerged Content" module covering every ref in it, so no
//! input section is ever silently dropped.

use std::collections::HashMap;

use crate::engine::ModelEngine;
use crate::pipeline::call_model;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::json::extract_json_value;
use crate::pipeline::model::{MinimizedSectionRef, ModuleSkeleton, Section, SkeletonTopic};

/// Wire shape of the merge reply.
#[derive(Debug, serde::Deserialize)]
struct ModuleList {
    modules: Vec<ModuleSkeleton>,
}

/// Outcome of merging one batch.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The modules recovered for this batch.
    pub modules: Vec<ModuleSkeleton>,
    /// Whether the fallback module was synthesized.
    pub fallback: bool,
}

/// Assign sequential ids (`sec-0`, `sec-1`, ...) in input order and strip
/// sections down to lightweight refs.
///
/// The returned map is the sole join path back to full content; it must
/// outlive all batch calls of the run.
pub fn minimize_sections(
    sections: Vec<Section>,
) -> (Vec<MinimizedSectionRef>, HashMap<String, Section>) {
    let mut refs = Vec::with_capacity(sections.len());
    let mut map = HashMap::with_capacity(sections.len());

    for (idx, section) in sections.into_iter().enumerate() {
        let id = format!("sec-{idx}");
        refs.push(MinimizedSectionRef {
            id: id.clone(),
            title: section.title.clone(),
            summary: section.summary.clone().unwrap_or_default(),
        });
        map.insert(id, section);
    }

    (refs, map)
}

/// Partition refs into fixed-size batches; the last batch may be smaller.
pub fn batch_refs(
    refs: &[MinimizedSectionRef],
    batch_size: usize,
) -> PipelineResult<Vec<Vec<MinimizedSectionRef>>> {
    if batch_size == 0 {
        return Err(PipelineError::InvalidBatchSize);
    }
    Ok(refs.chunks(batch_size).map(|b| b.to_vec()).collect())
}

/// Build the curriculum-organization prompt for one batch.
fn merge_prompt(batch_json: &str, index: usize, total: usize) -> String {
    format!(
        r#"You are a Curriculum Architect.
Organize the following list of extracted topics into a coherent Course Structure (Modules > Topics).
You MUST use the provided IDs to reference the content.

Input Topics (Batch {batch}/{total}):
{batch_json}

Output JSON format:
{{
    "modules": [
        {{
            "title": "Module Title",
            "summary": "Module Summary",
            "topics": [
                {{
                    "title": "Topic Title",
                    "sourceId": "sec-0",
                    "goal": "Learning Goal"
                }}
            ]
        }}
    ]
}}

Rules:
1. Group related topics into Modules.
2. If topics don't fit existing modules, create new ones.
3. EVERY topic from input must be included exactly once.
4. The "sourceId" of each topic MUST match an input ID.
5. Output valid JSON.
"#,
        batch = index + 1,
    )
}

/// Merge one batch of refs into module skeletons via a model call.
///
/// Infallible by design: model-call failure, parse failure, or a reply
/// with no modules at all each yield the synthesized fallback module
/// covering every ref of the batch.
pub fn merge_batch(
    batch: &[MinimizedSectionRef],
    index: usize,
    total: usize,
    engine: &mut dyn ModelEngine,
) -> MergeOutcome {
    let batch_json = match serde_json::to_string_pretty(batch) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, batch = index, "failed to serialize batch refs");
            return fallback_outcome(batch, index);
        }
    };

    let prompt = merge_prompt(&batch_json, index, total);

    let reply = match call_model(engine, &prompt) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, batch = index, "merge call failed, synthesizing fallback module");
            return fallback_outcome(batch, index);
        }
    };

    let modules = extract_json_value(&reply)
        .map(|value| decode_modules(&value))
        .unwrap_or_default();

    if modules.is_empty() {
        tracing::warn!(batch = index, "merge reply contained no modules, synthesizing fallback module");
        return fallback_outcome(batch, index);
    }

    MergeOutcome {
        modules,
        fallback: false,
    }
}

/// Decode module skeletons from a parsed reply, strictly first and then
/// leniently so a partially malformed reply still contributes.
fn decode_modules(value: &serde_json::Value) -> Vec<ModuleSkeleton> {
    match serde_json::from_value::<ModuleList>(value.clone()) {
        Ok(list) => list.modules,
        Err(e) => {
            tracing::warn!(error = %e, "strict module decode failed, attempting lenient salvage");
            lenient_modules(value)
        }
    }
}

fn lenient_modules(value: &serde_json::Value) -> Vec<ModuleSkeleton> {
    let Some(raw_modules) = value.get("modules").and_then(|m| m.as_array()) else {
        return Vec::new();
    };

    raw_modules
        .iter()
        .filter_map(|raw| {
            let title = raw.get("title")?.as_str()?.to_string();
            let summary = raw
                .get("summary")
                .and_then(|s| s.as_str())
                .map(|s| s.to_string());
            let topics = raw
                .get("topics")
                .and_then(|t| t.as_array())
                .map(|topics| topics.iter().filter_map(lenient_topic).collect())
                .unwrap_or_default();
            Some(ModuleSkeleton {
                title,
                summary,
                topics,
            })
        })
        .collect()
}

fn lenient_topic(raw: &serde_json::Value) -> Option<SkeletonTopic> {
    // A topic without a sourceId cannot be rehydrated; drop it.
    let source_id = raw.get("sourceId")?.as_str()?.to_string();
    let title = raw
        .get("title")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();
    let goal = raw
        .get("goal")
        .and_then(|g| g.as_str())
        .map(|g| g.to_string());
    Some(SkeletonTopic {
        title,
        source_id,
        goal,
    })
}

/// Synthesize the fallback module for a failed batch so its ids survive.
fn fallback_outcome(batch: &[MinimizedSectionRef], index: usize) -> MergeOutcome {
    let module = ModuleSkeleton {
        title: format!("Unmerged Content (Part {})", index + 1),
        summary: Some("Content that could not be auto-organized.".into()),
        topics: batch
            .iter()
            .map(|r| SkeletonTopic {
                title: r.title.clone(),
                source_id: r.id.clone(),
                goal: Some("Review this content".into()),
            })
            .collect(),
    };
    MergeOutcome {
        modules: vec![module],
        fallback: true,
    }
}

//! End-to-end tests for the document-to-course pipeline.
//!
//! These drive `generate_course` against a scripted model engine that
//! answers extraction and merge prompts deterministically, validating the
//! id round trip, failure fallbacks, and the sequential reset discipline.

use courseforge::engine::{ModelEngine, ModelError};
use courseforge::pipeline::{self, PipelineConfig, PipelineEvent};
use courseforge::pipeline::model::PageText;

/// A model engine scripted per prompt kind.
///
/// Extraction prompts get one synthetic section each; merge prompts get a
/// single module echoing back every id found in the prompt. Individual
/// merge calls can be scripted to fail.
struct ScriptedEngine {
    extraction_calls: usize,
    merge_calls: usize,
    resets: usize,
    calls: usize,
    /// 0-based merge call indices that should fail.
    failing_merges: Vec<usize>,
}

impl ScriptedEngine {
    fn new() -> Self {
        Self {
            extraction_calls: 0,
            merge_calls: 0,
            resets: 0,
            calls: 0,
            failing_merges: Vec::new(),
        }
    }

    fn with_failing_merges(merges: Vec<usize>) -> Self {
        Self {
            failing_merges: merges,
            ..Self::new()
        }
    }
}

/// Pull every `"id": "..."` value out of a merge prompt's embedded JSON.
fn ids_in_prompt(prompt: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut rest = prompt;
    while let Some(pos) = rest.find("\"id\": \"") {
        let after = &rest[pos + 7..];
        if let Some(end) = after.find('"') {
            ids.push(after[..end].to_string());
            rest = &after[end..];
        } else {
            break;
        }
    }
    ids
}

impl ModelEngine for ScriptedEngine {
    fn reset(&mut self) -> Result<(), ModelError> {
        self.resets += 1;
        Ok(())
    }

    fn call(&mut self, prompt: &str) -> Result<String, ModelError> {
        self.calls += 1;

        if prompt.contains("Course Content Extractor") {
            let n = self.extraction_calls;
            self.extraction_calls += 1;
            let reply = serde_json::json!({
                "sections": [{
                    "title": format!("Section {n}"),
                    "summary": format!("Summary of section {n}"),
                    "subsections": [{
                        "title": format!("Details {n}"),
                        "contentBlocks": [
                            {"type": "paragraph", "data": format!("Body text {n}")}
                        ]
                    }]
                }]
            });
            return Ok(reply.to_string());
        }

        if prompt.contains("Curriculum Architect") {
            let n = self.merge_calls;
            self.merge_calls += 1;
            if self.failing_merges.contains(&n) {
                return Err(ModelError::RequestFailed {
                    message: format!("scripted failure for merge call {n}"),
                });
            }
            let topics: Vec<serde_json::Value> = ids_in_prompt(prompt)
                .into_iter()
                .map(|id| {
                    serde_json::json!({
                        "title": format!("Topic for {id}"),
                        "sourceId": id,
                        "goal": "Learn it"
                    })
                })
                .collect();
            let reply = serde_json::json!({
                "modules": [{
                    "title": format!("Module {n}"),
                    "summary": "Grouped by the script",
                    "topics": topics
                }]
            });
            return Ok(reply.to_string());
        }

        Err(ModelError::RequestFailed {
            message: "unexpected prompt".into(),
        })
    }
}

/// Pages of at least `chars_per_page` characters each, so that with
/// `max_chars = 2 * chars_per_page` exactly one page fits per chunk.
fn synthetic_pages(count: usize, chars_per_page: usize) -> Vec<PageText> {
    (1..=count)
        .map(|n| {
            let unit = format!("page {n} body. ");
            let reps = chars_per_page / unit.chars().count() + 1;
            PageText {
                page: n,
                text: unit.repeat(reps),
            }
        })
        .collect()
}

#[test]
fn end_to_end_round_trip_integrity() {
    // 50 pages of ~1000 chars with max_chars=2000: one page per chunk, so
    // 50 extraction calls and 50 sections, merged in 3 batches of <= 20.
    let pages = synthetic_pages(50, 1000);
    let mut engine = ScriptedEngine::new();
    let config = PipelineConfig {
        max_chars: 2000,
        ..Default::default()
    };

    let course = pipeline::generate_course(&pages, &mut engine, &config).unwrap();

    assert_eq!(engine.extraction_calls, 50);
    assert_eq!(engine.merge_calls, 3);

    let total_topics: usize = course.modules.iter().map(|m| m.topics.len()).sum();
    assert_eq!(total_topics, 50, "every extracted section becomes a topic");

    for module in &course.modules {
        for topic in &module.topics {
            assert!(!topic.content.is_empty(), "every topic has content");
            assert!(!topic.subtopics.is_empty(), "subsections were rehydrated");
        }
    }
}

#[test]
fn engine_is_reset_before_every_call() {
    let pages = synthetic_pages(4, 1000);
    let mut engine = ScriptedEngine::new();
    let config = PipelineConfig {
        max_chars: 2000,
        batch_size: 2,
        ..Default::default()
    };

    pipeline::generate_course(&pages, &mut engine, &config).unwrap();

    assert!(engine.calls > 0);
    assert_eq!(engine.resets, engine.calls, "one reset per model call");
}

#[test]
fn failed_merge_batch_falls_back_without_losing_ids() {
    // 6 pages -> 6 sections -> 3 batches of 2; the middle merge call dies.
    let pages = synthetic_pages(6, 1000);
    let mut engine = ScriptedEngine::with_failing_merges(vec![1]);
    let config = PipelineConfig {
        max_chars: 2000,
        batch_size: 2,
    };

    let mut fallbacks = Vec::new();
    let course = pipeline::generate_course_with_observer(&pages, &mut engine, &config, |event| {
        if let PipelineEvent::BatchMerged {
            index, fallback, ..
        } = event
        {
            if fallback {
                fallbacks.push(index);
            }
        }
    })
    .unwrap();

    assert_eq!(fallbacks, [1], "exactly the failed batch fell back");

    let mut ids: Vec<String> = Vec::new();
    let mut fallback_titles = Vec::new();
    for module in &course.modules {
        if module.title.starts_with("Unmerged Content") {
            fallback_titles.push(module.title.clone());
        }
        // Round-trip check via subtopic titles, which are unique per section.
        for topic in &module.topics {
            ids.push(topic.subtopics[0].title.clone());
        }
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6, "all six sections survive, exactly once");
    assert_eq!(fallback_titles, ["Unmerged Content (Part 2)"]);
}

#[test]
fn progress_events_cover_every_chunk_and_batch() {
    let pages = synthetic_pages(5, 1000);
    let mut engine = ScriptedEngine::new();
    let config = PipelineConfig {
        max_chars: 2000,
        batch_size: 3,
    };

    let mut chunk_events = 0usize;
    let mut batch_events = 0usize;
    pipeline::generate_course_with_observer(&pages, &mut engine, &config, |event| match event {
        PipelineEvent::ChunkExtracted { .. } => chunk_events += 1,
        PipelineEvent::BatchMerged { .. } => batch_events += 1,
    })
    .unwrap();

    assert_eq!(chunk_events, 5);
    assert_eq!(batch_events, 2);
}

#[test]
fn course_serializes_to_the_documented_shape() {
    let pages = synthetic_pages(2, 1000);
    let mut engine = ScriptedEngine::new();
    let config = PipelineConfig {
        max_chars: 2000,
        batch_size: 20,
    };

    let course = pipeline::generate_course(&pages, &mut engine, &config).unwrap();
    let json = serde_json::to_value(&course).unwrap();

    let module = &json["modules"][0];
    let topic = &module["topics"][0];
    assert!(topic["goal"].is_string());
    assert!(topic["content"][0]["type"].is_string());
    assert!(topic["subtopics"][0]["contentBlocks"].is_array());
}

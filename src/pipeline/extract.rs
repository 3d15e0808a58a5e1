//! Per-chunk section extraction.
//!
//! One model call per chunk, with a strict no-data-loss prompt. Extraction
//! never fails the run: a dead model, a garbage reply, or a schema mismatch
//! all degrade to an empty section list for that chunk, and the pipeline
//! moves on to the next one.

use serde::Deserialize;

use crate::engine::ModelEngine;
use crate::pipeline::call_model;
use crate::pipeline::json::extract_json_value;
use crate::pipeline::model::{BlockKind, ContentBlock, Section, Subsection};

/// Wire shape of the extraction reply.
#[derive(Debug, Deserialize)]
struct SectionList {
    sections: Vec<Section>,
}

/// Build the extraction prompt for one chunk.
fn extraction_prompt(chunk_text: &str) -> String {
    format!(
        r#"You are a Course Content Extractor.
Analyze the text and extract the educational topics.
Do NOT summarize, paraphrase, or omit content: carry the source text
verbatim into the content blocks.

Output JSON only:
{{
  "sections": [
    {{
      "title": "Exact Section Title",
      "summary": "One sentence summary",
      "subsections": [
        {{
          "title": "Subsection Title",
          "contentBlocks": [
            {{ "type": "paragraph", "data": "Main content text..." }},
            {{ "type": "list", "data": "- Point 1\n- Point 2" }}
          ]
        }}
      ]
    }}
  ]
}}

TEXT:
{chunk_text}
"#
    )
}

/// Extract sections from one chunk's text. Never errors; degrades to empty.
pub fn extract_sections(chunk_text: &str, engine: &mut dyn ModelEngine) -> Vec<Section> {
    let prompt = extraction_prompt(chunk_text);

    let reply = match call_model(engine, &prompt) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "chunk extraction call failed, continuing with empty sections");
            return Vec::new();
        }
    };

    let Some(value) = extract_json_value(&reply) else {
        tracing::warn!("no recoverable JSON in extraction reply, continuing with empty sections");
        return Vec::new();
    };

    match serde_json::from_value::<SectionList>(value.clone()) {
        Ok(list) => list.sections,
        Err(e) => {
            // Strict decode failed. If the value still carries a sections
            // array, salvage what we can rather than discard the chunk.
            tracing::warn!(error = %e, "strict section decode failed, attempting lenient salvage");
            lenient_sections(&value)
        }
    }
}

/// Salvage sections from a loosely shaped value. Entries without a string
/// title are skipped; malformed content blocks degrade to paragraphs or
/// are dropped, whichever loses less.
fn lenient_sections(value: &serde_json::Value) -> Vec<Section> {
    let Some(raw_sections) = value.get("sections").and_then(|s| s.as_array()) else {
        return Vec::new();
    };

    raw_sections
        .iter()
        .filter_map(|raw| {
            let title = raw.get("title")?.as_str()?.to_string();
            let summary = raw
                .get("summary")
                .and_then(|s| s.as_str())
                .map(|s| s.to_string());
            let subsections = raw
                .get("subsections")
                .and_then(|s| s.as_array())
                .map(|subs| subs.iter().filter_map(lenient_subsection).collect())
                .unwrap_or_default();
            Some(Section {
                title,
                summary,
                subsections,
            })
        })
        .collect()
}

fn lenient_subsection(raw: &serde_json::Value) -> Option<Subsection> {
    let title = raw.get("title")?.as_str()?.to_string();
    let content_blocks = raw
        .get("contentBlocks")
        .and_then(|b| b.as_array())
        .map(|blocks| blocks.iter().filter_map(lenient_block).collect())
        .unwrap_or_default();
    Some(Subsection {
        title,
        content_blocks,
    })
}

fn lenient_block(raw: &serde_json::Value) -> Option<ContentBlock> {
    let data = raw.get("data")?.as_str()?.to_string();
    // Unknown block types degrade to paragraphs instead of dropping text.
    let kind = raw
        .get("type")
        .cloned()
        .and_then(|t| serde_json::from_value::<BlockKind>(t).ok())
        .unwrap_or(BlockKind::Paragraph);
    Some(ContentBlock { kind, data })
}

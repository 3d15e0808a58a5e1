//! Table-of-contents outline analysis.
//!
//! The index-driven entry point: instead of extracting content chunk by
//! chunk, a single model call maps the book's table of contents to a
//! recursive outline tree with page ranges. Uses the same tolerant JSON
//! machinery as the extractor, but since there is nothing to fall back on,
//! an unrecoverable reply is an error rather than a degraded result.

use serde::{Deserialize, Serialize};

use crate::engine::ModelEngine;
use crate::pipeline::call_model;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::json::extract_json_value;

/// Hierarchy level of an outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineKind {
    Root,
    Unit,
    Chapter,
    Section,
    /// Anything the model invents beyond the taxonomy it was given.
    #[serde(other)]
    Other,
}

/// Inclusive page range covered by an outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

/// A node in the recursive book-structure outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OutlineKind,
    pub title: String,
    pub page_range: PageRange,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

fn toc_prompt(toc_text: &str) -> String {
    format!(
        r#"You are an expert Librarian and Data Structuring AI.
Your task is to analyze the provided text, which contains the TABLE OF CONTENTS (TOC) of a textbook.

GOAL: construct a hierarchical JSON tree of the book's structure.

RULES:
1. Identify the hierarchy: Parts > Units > Chapters > Sections.
2. Extract the START PAGE for each item.
3. Infer the END PAGE based on the start of the next item. (For the last item, add 10 pages.)
4. Return a recursive JSON object matching this interface:

{{
    "id": "string (unique)",
    "type": "root" | "unit" | "chapter" | "section",
    "title": "string",
    "pageRange": {{ "start": 1, "end": 10 }},
    "children": []
}}

INPUT TEXT (TOC):
{toc_text}

OUTPUT JSON ONLY.
"#
    )
}

/// Analyze table-of-contents text into an outline tree via one model call.
///
/// Model errors propagate; an unparseable reply is [`PipelineError::OutlineParse`].
pub fn analyze_toc(
    toc_text: &str,
    engine: &mut dyn ModelEngine,
) -> PipelineResult<OutlineNode> {
    let prompt = toc_prompt(toc_text);
    let reply = call_model(engine, &prompt)?;

    let value = extract_json_value(&reply).ok_or_else(|| PipelineError::OutlineParse {
        message: "no recoverable JSON object in reply".into(),
    })?;

    serde_json::from_value(value).map_err(|e| PipelineError::OutlineParse {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ModelError;

    struct FixedEngine {
        reply: Result<String, ()>,
    }

    impl ModelEngine for FixedEngine {
        fn reset(&mut self) -> Result<(), ModelError> {
            Ok(())
        }

        fn call(&mut self, _prompt: &str) -> Result<String, ModelError> {
            self.reply.clone().map_err(|_| ModelError::RequestFailed {
                message: "scripted failure".into(),
            })
        }
    }

    #[test]
    fn nominal_outline_parses() {
        let reply = r#"{
            "id": "root-0",
            "type": "root",
            "title": "The Book",
            "pageRange": {"start": 1, "end": 310},
            "children": [
                {
                    "id": "ch-1",
                    "type": "chapter",
                    "title": "Getting Started",
                    "pageRange": {"start": 1, "end": 24},
                    "children": []
                }
            ]
        }"#;
        let mut engine = FixedEngine {
            reply: Ok(reply.into()),
        };
        let outline = analyze_toc("1. Getting Started ..... 1", &mut engine).unwrap();
        assert_eq!(outline.kind, OutlineKind::Root);
        assert_eq!(outline.children.len(), 1);
        assert_eq!(outline.children[0].page_range.start, 1);
    }

    #[test]
    fn invented_node_types_map_to_other() {
        let reply = r#"{
            "id": "x",
            "type": "appendix",
            "title": "Extras",
            "pageRange": {"start": 300, "end": 310}
        }"#;
        let mut engine = FixedEngine {
            reply: Ok(reply.into()),
        };
        let outline = analyze_toc("Appendix ..... 300", &mut engine).unwrap();
        assert_eq!(outline.kind, OutlineKind::Other);
        assert!(outline.children.is_empty());
    }

    #[test]
    fn unparseable_reply_is_an_error() {
        let mut engine = FixedEngine {
            reply: Ok("I could not find a table of contents.".into()),
        };
        assert!(matches!(
            analyze_toc("garbage", &mut engine),
            Err(PipelineError::OutlineParse { .. })
        ));
    }

    #[test]
    fn model_failure_propagates() {
        let mut engine = FixedEngine { reply: Err(()) };
        assert!(matches!(
            analyze_toc("toc", &mut engine),
            Err(PipelineError::Model(_))
        ));
    }
}

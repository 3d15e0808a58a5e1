//! Core data types for the document-to-course pipeline.
//!
//! Everything here lives for exactly one pipeline run: pages go in, a
//! validated [`Course`] comes out, and the intermediate shapes (chunks,
//! sections, minimized refs, module skeletons) are consumed along the way.
//! JSON field names match the wire shapes the model is prompted to emit.

use serde::{Deserialize, Serialize};

/// One page of extracted source text. Pages are never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number from the source document.
    pub page: usize,
    /// Raw extracted text of the page.
    pub text: String,
}

/// A size-bounded slice of annotated page text, ready for one model call.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Annotated text, including `=== PAGE N ===` markers.
    pub text: String,
    /// First page contributing to this chunk.
    pub start_page: usize,
    /// Last page contributing to this chunk (approximate on the final chunk).
    pub end_page: usize,
}

/// The kind of a leaf content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    List,
    Code,
    Tip,
    Warning,
}

/// An immutable leaf content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub data: String,
}

impl ContentBlock {
    /// Shorthand for a paragraph block.
    pub fn paragraph(data: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Paragraph,
            data: data.into(),
        }
    }
}

/// A titled group of content blocks within a section or topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    pub title: String,
    #[serde(default)]
    pub content_blocks: Vec<ContentBlock>,
}

/// A section extracted from one chunk. Sections accumulate across all
/// chunks into one flat ordered list; no cross-chunk deduplication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

/// A content-stripped reference to an extracted section.
///
/// The `id` is the sole join key back to the full [`Section`] via the
/// in-memory map owned by the merge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimizedSectionRef {
    pub id: String,
    pub title: String,
    pub summary: String,
}

/// A topic inside a merger-produced module skeleton, referencing its
/// source section by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonTopic {
    #[serde(default)]
    pub title: String,
    pub source_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

/// A module grouping produced by the merger, before content rehydration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSkeleton {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub topics: Vec<SkeletonTopic>,
}

/// A fully hydrated topic in the final course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub goal: String,
    pub content: Vec<ContentBlock>,
    pub subtopics: Vec<Subsection>,
}

/// A fully hydrated module in the final course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub topics: Vec<Topic>,
}

/// The terminal course structure returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub modules: Vec<Module>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_block_type_field_round_trips() {
        let block = ContentBlock {
            kind: BlockKind::Tip,
            data: "remember this".into(),
        };
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.contains("\"type\":\"tip\""));
        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }

    #[test]
    fn skeleton_topic_uses_camel_case_source_id() {
        let topic: SkeletonTopic =
            serde_json::from_str(r#"{"title":"T","sourceId":"sec-3","goal":"g"}"#).unwrap();
        assert_eq!(topic.source_id, "sec-3");
    }

    #[test]
    fn section_tolerates_missing_optional_fields() {
        let section: Section = serde_json::from_str(r#"{"title":"Intro"}"#).unwrap();
        assert!(section.summary.is_none());
        assert!(section.subsections.is_empty());
    }
}

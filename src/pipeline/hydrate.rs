//! Rehydration: reattach full section content to merged module skeletons.
//!
//! Every topic's `sourceId` is looked up in the run's section map. Unknown
//! ids (hallucinated or mistyped by the model) become placeholder topics
//! rather than failures; by this point all tolerant fallbacks have been
//! applied, so the only remaining error is terminal structural invalidity
//! of the assembled course.

use std::collections::HashMap;

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::model::{
    ContentBlock, Course, Module, ModuleSkeleton, Section, SkeletonTopic, Topic,
};

/// Walk the merged skeletons and reattach full content by id, then
/// validate the assembled course.
pub fn hydrate_modules(
    modules: Vec<ModuleSkeleton>,
    section_map: &HashMap<String, Section>,
) -> PipelineResult<Course> {
    let hydrated = modules
        .into_iter()
        .map(|skeleton| Module {
            title: skeleton.title,
            summary: skeleton.summary,
            topics: skeleton
                .topics
                .into_iter()
                .map(|topic| hydrate_topic(topic, section_map))
                .collect(),
        })
        .collect();

    let course = Course { modules: hydrated };
    validate_course(&course)?;
    Ok(course)
}

fn hydrate_topic(topic: SkeletonTopic, section_map: &HashMap<String, Section>) -> Topic {
    let original = section_map.get(&topic.source_id);
    if original.is_none() {
        tracing::warn!(
            source_id = %topic.source_id,
            "unknown sourceId in merged skeleton, emitting placeholder topic"
        );
    }

    let mut content = vec![ContentBlock::paragraph("Content placeholder")];
    let mut subtopics = Vec::new();

    if let Some(section) = original {
        subtopics = section.subsections.clone();

        if let Some(summary) = section.summary.as_deref().filter(|s| !s.is_empty()) {
            content = vec![ContentBlock::paragraph(summary)];
        } else if subtopics.iter().any(|s| !s.content_blocks.is_empty()) {
            content = vec![ContentBlock::paragraph(format!(
                "Overview of {}",
                section.title
            ))];
        }
    }

    let title = if topic.title.is_empty() {
        original
            .map(|s| s.title.clone())
            .unwrap_or_else(|| "Untitled".into())
    } else {
        topic.title
    };

    let goal = topic
        .goal
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| "Learn this topic".into());

    Topic {
        title,
        goal,
        content,
        subtopics,
    }
}

/// Terminal structural validation of the assembled course.
fn validate_course(course: &Course) -> PipelineResult<()> {
    if course.modules.is_empty() {
        return Err(PipelineError::InvalidCourse {
            reason: "course has no modules".into(),
        });
    }
    for module in &course.modules {
        for topic in &module.topics {
            if topic.content.is_empty() {
                return Err(PipelineError::InvalidCourse {
                    reason: format!("topic \"{}\" has no content blocks", topic.title),
                });
            }
        }
    }
    Ok(())
}

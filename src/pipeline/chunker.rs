//! Page chunking: pack annotated page text into size-bounded chunks.
//!
//! Each page is annotated with a `=== PAGE N ===` marker for traceability,
//! then pages are accumulated in order into chunks of at most `max_chars`
//! characters. A single page whose annotated text alone exceeds the bound
//! is sliced into consecutive single-page chunks; nothing from such a page
//! carries over into the next accumulator.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::model::{Chunk, PageText};

/// The page-boundary marker inserted before each page's text.
fn page_marker(page: usize) -> String {
    format!("\n=== PAGE {page} ===\n")
}

/// A page's text with its boundary marker attached.
fn annotate_page(page: &PageText) -> String {
    format!("{}{}\n", page_marker(page.page), page.text)
}

/// Split `pages` into ordered chunks of at most `max_chars` characters.
///
/// Invariants:
/// - concatenating all chunk texts in order reproduces every page's text
///   (modulo the inserted page markers)
/// - every chunk's text is at most `max_chars` characters, including the
///   slices of an oversized single page
///
/// The final chunk's `end_page` is the last page present in the input, an
/// approximation inherited from the accumulator flush; callers should not
/// depend on it being precise.
pub fn chunk_pages(pages: &[PageText], max_chars: usize) -> PipelineResult<Vec<Chunk>> {
    if max_chars == 0 {
        return Err(PipelineError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut chunk_start_page = pages.first().map(|p| p.page).unwrap_or(1);
    let mut prev_page = chunk_start_page;

    for page in pages {
        let annotated = annotate_page(page);
        let annotated_chars = annotated.chars().count();

        if current_chars + annotated_chars > max_chars {
            // Flush whatever we have accumulated so far.
            if !current.is_empty() {
                chunks.push(Chunk {
                    text: std::mem::take(&mut current),
                    start_page: chunk_start_page,
                    end_page: prev_page,
                });
                current_chars = 0;
            }

            if annotated_chars > max_chars {
                // The page alone is too big: slice it into single-page
                // chunks, carrying no remainder forward.
                for slice in split_by_chars(&annotated, max_chars) {
                    chunks.push(Chunk {
                        text: slice,
                        start_page: page.page,
                        end_page: page.page,
                    });
                }
                chunk_start_page = page.page + 1; // approximate
            } else {
                current = annotated;
                current_chars = annotated_chars;
                chunk_start_page = page.page;
            }
        } else {
            if current.is_empty() {
                chunk_start_page = page.page;
            }
            current.push_str(&annotated);
            current_chars += annotated_chars;
        }

        prev_page = page.page;
    }

    if !current.trim().is_empty() {
        chunks.push(Chunk {
            text: current,
            start_page: chunk_start_page,
            end_page: pages.last().map(|p| p.page).unwrap_or(chunk_start_page),
        });
    }

    Ok(chunks)
}

/// Split a string into consecutive pieces of at most `max_chars` characters,
/// never cutting inside a UTF-8 character.
fn split_by_chars(s: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut buf = String::new();
    let mut count = 0usize;

    for ch in s.chars() {
        buf.push(ch);
        count += 1;
        if count == max_chars {
            pieces.push(std::mem::take(&mut buf));
            count = 0;
        }
    }
    if !buf.is_empty() {
        pieces.push(buf);
    }
    pieces
}

/// Remove page-boundary marker lines, leaving the page text untouched.
///
/// Applied to the in-order concatenation of all chunk texts this recovers
/// the original page texts, even when an oversized page's marker was cut
/// across chunk slices.
pub fn strip_page_markers(text: &str) -> String {
    text.split('\n')
        .filter(|line| {
            let t = line.trim();
            !(t.starts_with("=== PAGE ") && t.ends_with(" ==="))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

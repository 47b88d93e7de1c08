//! Post-processing of raw backend replies.
//!
//! Models rarely follow formatting rules exactly.  [`clean_script`] strips the
//! markdown and stage directions that slip into narration text, and
//! [`parse_terms`] digs a JSON string array out of whatever surrounds it.

use crate::llm::generator::LlmError;
use crate::params::VideoTerms;

/// Prefixes that mark a heading line; the whole line is dropped.
const HEADING_LABELS: &[&str] = &["title:", "script:"];
/// Prefixes that name the speaker; the label is dropped, the words kept.
const SPEAKER_LABELS: &[&str] = &["voiceover:", "voice over:", "narrator:"];

/// Clean a generated script and keep at most `paragraph_number` paragraphs.
///
/// * `*` and `#` are removed.
/// * `[...]` and `(...)` spans (stage directions) are removed.
/// * Heading lines (`Title: ...`) are dropped; speaker labels
///   (`Narrator: ...`) are cut from the front of a line.
/// * Runs of whitespace collapse to one space and paragraphs are separated
///   by exactly one blank line.
pub fn clean_script(raw: &str, paragraph_number: u32) -> String {
    let without_markup: String = raw.chars().filter(|c| *c != '*' && *c != '#').collect();
    let without_directions = strip_bracketed(&without_markup);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in without_directions.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush_paragraph(&mut current, &mut paragraphs);
            continue;
        }
        let lower = line.to_ascii_lowercase();
        if HEADING_LABELS.iter().any(|label| lower.starts_with(label)) {
            continue;
        }
        let spoken = SPEAKER_LABELS
            .iter()
            .find(|label| lower.starts_with(*label))
            .map_or(line, |label| line[label.len()..].trim_start());
        if !spoken.is_empty() {
            current.push(spoken);
        }
    }
    flush_paragraph(&mut current, &mut paragraphs);

    paragraphs.truncate(paragraph_number.max(1) as usize);
    paragraphs.join("\n\n")
}

fn flush_paragraph(lines: &mut Vec<&str>, paragraphs: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let joined = lines.join(" ");
    paragraphs.push(joined.split_whitespace().collect::<Vec<_>>().join(" "));
    lines.clear();
}

/// Remove `[...]` and `(...)` spans, including nested ones.  An unmatched
/// closing bracket is kept as-is, and so is an opener that is never closed
/// (together with everything after it).
fn strip_bracketed(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // One buffer per open span; a span is discarded when its closer arrives.
    let mut open: Vec<String> = Vec::new();
    for c in text.chars() {
        match c {
            '[' | '(' => open.push(String::from(c)),
            ']' | ')' if !open.is_empty() => {
                open.pop();
            }
            _ => match open.last_mut() {
                Some(span) => span.push(c),
                None => out.push(c),
            },
        }
    }
    for span in open {
        out.push_str(&span);
    }
    out
}

/// Extract search terms from a backend reply.
///
/// Accepts a bare JSON array, one wrapped in a ```` ```json ```` fence, or one
/// embedded in prose.  Non-ASCII terms are dropped (terms are English-only).
/// An unparseable reply is [`LlmError::Parse`]; a reply with no usable term is
/// [`LlmError::EmptyResponse`].
pub fn parse_terms(raw: &str) -> Result<VideoTerms, LlmError> {
    let list = extract_string_array(raw)
        .ok_or_else(|| LlmError::Parse(format!("no JSON string array in reply: {raw:.120}")))?;

    let (english, other): (Vec<String>, Vec<String>) =
        list.into_iter().partition(|t| t.is_ascii());
    if !other.is_empty() {
        log::warn!("llm: dropped {} non-English search term(s)", other.len());
    }

    let terms = VideoTerms::from_terms(english);
    if terms.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(terms)
}

fn extract_string_array(raw: &str) -> Option<Vec<String>> {
    let trimmed = raw.trim();
    if let Ok(list) = serde_json::from_str::<Vec<String>>(trimmed) {
        return Some(list);
    }

    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Vec<String>>(&trimmed[start..=end]).ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

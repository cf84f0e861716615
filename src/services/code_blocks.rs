use lazy_static::lazy_static;
use regex::Regex;
use crate::models::conversation::Segment;

pub const FENCE: &str = "```";

lazy_static! {
    // Optional language tag right after an opening fence, up to the line break.
    static ref LANGUAGE_TAG: Regex = Regex::new(r"^[A-Za-z0-9_+#.\-]*\r?\n").unwrap();
}

/// Splits a reply into text and fenced code segments.
///
/// Fence markers and the opening fence's language-tag line are dropped; every
/// other character ends up in exactly one segment, in order. A fence that is
/// never closed turns the rest of the input into code. Empty segments are not
/// emitted, so back-to-back fences leave no blank text between them.
pub fn extract_text_and_code_blocks(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = input;

    while let Some(open) = rest.find(FENCE) {
        push_segment(&mut segments, Segment::Text(rest[..open].to_string()));

        let after_open = &rest[open + FENCE.len()..];
        let (body, remainder) = match after_open.find(FENCE) {
            Some(close) => (&after_open[..close], &after_open[close + FENCE.len()..]),
            None => (after_open, ""),
        };

        push_segment(&mut segments, Segment::Code(strip_language_tag(body).to_string()));
        rest = remainder;
    }

    push_segment(&mut segments, Segment::Text(rest.to_string()));
    segments
}

fn strip_language_tag(body: &str) -> &str {
    match LANGUAGE_TAG.find(body) {
        Some(tag) => &body[tag.end()..],
        None => body,
    }
}

fn push_segment(segments: &mut Vec<Segment>, segment: Segment) {
    if !segment.content().is_empty() {
        segments.push(segment);
    }
}

//! Placeholder substitution
//!
//! Positions in the emitted records are character offsets into the text
//! as it was before any substitution.

use crate::entity::{MaskedDocument, MaskedEntityRecord, TextSpan};
use crate::error::{Error, Result};
use crate::resolve::ResolvedEntities;

/// Replace every resolved entity in `text` with its placeholder.
///
/// Fails if an entity falls outside `text`, splits a character, or starts
/// before the previous one ends.
pub fn anonymize(text: &str, resolved: &ResolvedEntities) -> Result<MaskedDocument> {
    let mut masked_text = String::with_capacity(text.len());
    let mut entities = Vec::with_capacity(resolved.len());
    let mut cursor = 0usize;
    let mut char_cursor = 0usize;

    for candidate in resolved {
        let span = candidate.span;
        span.check(text)?;
        if span.start < cursor {
            return Err(Error::InvalidSpan {
                start: span.start,
                end: span.end,
                reason: format!("overlaps a previous entity ending at {}", cursor),
            });
        }

        let classification = candidate.entity_type.classification();
        let gap = &text[cursor..span.start];
        let entity = span.slice(text);
        masked_text.push_str(gap);
        masked_text.push_str(&classification.placeholder());

        let start = char_cursor + gap.chars().count();
        let end = start + entity.chars().count();
        entities.push(MaskedEntityRecord {
            position: TextSpan { start, end },
            classification,
            entity: entity.to_string(),
        });
        cursor = span.end;
        char_cursor = end;
    }
    masked_text.push_str(&text[cursor..]);

    Ok(MaskedDocument {
        masked_text,
        entities,
    })
}

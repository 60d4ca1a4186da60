//! Request composition.

use crate::types::{ContentPart, Part};

/// `[Text(formatted_prompt)]` followed by `attachment_parts`, order untouched.
pub fn compose_parts(formatted_prompt: String, attachment_parts: Vec<ContentPart>) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(attachment_parts.len() + 1);
    parts.push(ContentPart::Text(formatted_prompt));
    parts.extend(attachment_parts);
    parts
}

/// Encode composed parts for the wire.
pub(crate) fn to_wire(parts: Vec<ContentPart>) -> Vec<Part> {
    parts.into_iter().map(Part::from).collect()
}

//! Object masks.
//!
//! A mask selects the related properties returned with an object. It is
//! either a structured tree, sent under the service-scoped `ObjectMask`
//! header, or text, sent under the global `SoftLayer_ObjectMask` header
//! after normalization to bracket form:
//!
//! | input                  | sent as                     |
//! |------------------------|-----------------------------|
//! | `mask[id,hostname]`    | `mask[id,hostname]`         |
//! | `mask.a.b`             | `mask[a[b]]`                |
//! | `a.b.c`                | `mask[a[b[c]]]`             |
//! | `id,datacenter[name]`  | `mask[id,datacenter[name]]` |

use softlayer_core::Value;

use crate::ClientError;

const BRACKET_PREFIXES: [&str; 2] = ["mask[", "filteredMask["];

/// An object mask.
#[derive(Clone, Debug, PartialEq)]
pub enum Mask {
    /// A nested tree of property names.
    Structured(Value),
    /// A mask in bracket (`mask[a[b]]`) or dotted (`mask.a.b`) syntax.
    Textual(String),
}

impl Mask {
    /// Validate and normalize this mask.
    ///
    /// Structured masks are returned as is; textual masks are rewritten to
    /// bracket form.
    pub fn normalized(&self) -> Result<Mask, ClientError> {
        match self {
            Mask::Structured(tree) => Ok(Mask::Structured(tree.clone())),
            Mask::Textual(text) => normalize(text).map(Mask::Textual),
        }
    }
}

impl From<&str> for Mask {
    fn from(text: &str) -> Self {
        Mask::Textual(text.to_owned())
    }
}

impl From<String> for Mask {
    fn from(text: String) -> Self {
        Mask::Textual(text)
    }
}

impl From<Value> for Mask {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Mask::Textual(text),
            tree => Mask::Structured(tree),
        }
    }
}

/// Normalize a textual mask to bracket form.
pub fn normalize(text: &str) -> Result<String, ClientError> {
    let mask = text.trim();
    if mask.is_empty() {
        return Err(ClientError::MalformedMask("empty mask".into()));
    }
    check_balanced(mask)?;

    if let Some(prefix) = BRACKET_PREFIXES.iter().find(|p| mask.starts_with(**p)) {
        let close = matching_close(mask, prefix.len() - 1);
        if close != Some(mask.len() - 1) {
            return Err(ClientError::MalformedMask(format!(
                "trailing text after {}...]: {mask:?}",
                &prefix[..prefix.len() - 1]
            )));
        }
        return Ok(mask.to_owned());
    }

    let body = mask.strip_prefix("mask.").unwrap_or(mask);
    if body.contains(['[', ',']) {
        return Ok(format!("mask[{body}]"));
    }

    let segments: Vec<&str> = body.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ClientError::MalformedMask(format!("empty path segment: {mask:?}")));
    }

    let mut out = String::with_capacity(body.len() + 2 * segments.len() + 4);
    out.push_str("mask");
    for segment in &segments {
        out.push('[');
        out.push_str(segment);
    }
    for _ in 0..segments.len() {
        out.push(']');
    }
    Ok(out)
}

fn check_balanced(mask: &str) -> Result<(), ClientError> {
    let mut depth = 0usize;
    for (pos, c) in mask.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    ClientError::MalformedMask(format!("unexpected ']' at {pos} in {mask:?}"))
                })?;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ClientError::MalformedMask(format!("unclosed '[' in {mask:?}")));
    }
    Ok(())
}

/// Byte index of the `]` closing the `[` at `open`.
fn matching_close(mask: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (pos, c) in mask[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + pos);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_and_dotted_forms_agree() {
        assert_eq!(normalize("mask[a[b]]").unwrap(), "mask[a[b]]");
        assert_eq!(normalize("mask.a.b").unwrap(), "mask[a[b]]");
    }

    #[test]
    fn test_dotted_path_nests() {
        assert_eq!(normalize("a.b.c").unwrap(), "mask[a[b[c]]]");
        assert_eq!(normalize("id").unwrap(), "mask[id]");
        assert_eq!(normalize("  mask.datacenter ").unwrap(), "mask[datacenter]");
    }

    #[test]
    fn test_property_lists_are_wrapped() {
        assert_eq!(normalize("id,hostname").unwrap(), "mask[id,hostname]");
        assert_eq!(
            normalize("id,datacenter[name]").unwrap(),
            "mask[id,datacenter[name]]"
        );
    }

    #[test]
    fn test_filtered_mask_passes_through() {
        assert_eq!(
            normalize("filteredMask[id,hostname]").unwrap(),
            "filteredMask[id,hostname]"
        );
    }

    #[test]
    fn test_malformed_masks() {
        for bad in ["mask[a.b", "mask[a]]", "a]b[", "", "   ", "a..b", "mask.", "mask[a],b"] {
            assert!(
                matches!(normalize(bad), Err(ClientError::MalformedMask(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_structured_mask_is_untouched() {
        let tree: Value = [("id", Value::Nil)].into_iter().collect();
        let mask = Mask::from(tree.clone());
        assert_eq!(mask.normalized().unwrap(), Mask::Structured(tree));
        assert_eq!(Mask::from(Value::from("id")), Mask::Textual("id".into()));
    }
}

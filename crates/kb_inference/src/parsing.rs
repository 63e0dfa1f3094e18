use serde_json::Value;

/// Pull article IDs out of free-form model output.
///
/// Takes the first top-level `[...]` in `text` and reads it as a JSON array.
/// Strings are kept as-is, numbers are stringified and anything else is
/// skipped. When there is no array, or it does not parse, the result is
/// empty: a missing ID list never invalidates the answer itself.
///
/// The first array wins even when it is bracketed prose rather than IDs.
pub fn extract_ids(text: &str) -> Vec<String> {
    let Some(candidate) = first_array(text) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<Value>>(candidate) {
        Ok(values) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(id) => Some(id),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Err(e) => {
            tracing::debug!("Ignoring unparsable id array {:?}: {}", candidate, e);
            Vec::new()
        }
    }
}

/// Slice from the first `[` to its matching `]`, skipping brackets inside
/// JSON string literals.
fn first_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

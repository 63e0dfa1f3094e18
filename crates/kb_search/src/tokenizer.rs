/// Characters treated as word breaks in addition to whitespace.
pub const SEPARATORS: [char; 9] = [',', '.', ';', ':', '/', '\\', '?', '!', '-'];

/// Lowercase `text` and split it into tokens.
///
/// Tokens keep their order and repeats; no stemming is applied.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

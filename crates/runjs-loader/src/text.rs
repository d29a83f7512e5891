//! Text normalisation for loaded user code

const BOM: char = '\u{feff}';

/// Normalise decoded source before it reaches the engine
///
/// Drops a leading byte-order mark and turns a leading `#!` line into a
/// line comment. Line and column positions of the remaining code are kept.
#[must_use]
pub fn prepare(text: String) -> String {
    let text = match text.strip_prefix(BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    };
    neutralize_shebang(text)
}

/// Rewrite `#!...` on the first line as `//...`
#[must_use]
pub fn neutralize_shebang(mut text: String) -> String {
    if text.starts_with("#!") {
        text.replace_range(..2, "//");
    }
    text
}

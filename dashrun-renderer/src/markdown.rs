//! Markdown to HTML conversion and page-title extraction.

use pulldown_cmark::{html, Options, Parser};

/// Convert Markdown to an HTML fragment. Tables and fenced code blocks are
/// enabled.
pub fn to_html(source: &str) -> String {
    let parser = Parser::new_ext(source, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Text of the first line starting with `# `, else `stem` with underscores
/// replaced by spaces in title case.
pub fn extract_title(source: &str, stem: &str) -> String {
    source
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .unwrap_or_else(|| title_case(&stem.replace('_', " ")))
}

/// Uppercase each letter that follows a non-letter, lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}

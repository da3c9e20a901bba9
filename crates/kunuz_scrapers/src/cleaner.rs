//! Text cleanup for extracted article bodies.
//!
//! Everything here is pure: no I/O, no allocation beyond the output string.

use once_cell::sync::Lazy;
use regex::Regex;

/// The republication notice kun.uz appends to every article, and
/// everything after it.
static FOOTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)"?KUN\.UZ"?\s+saytida\s+e[ʼ'’]lon\s+qilingan\s+materiallardan.*$"#).unwrap()
});

/// Inline photo credits such as `Foto: Reuters.` in Latin or Cyrillic Uzbek
/// and Russian.
static PHOTO_CREDIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:Foto|Фото|Surat|Rasm)\s*:\s*[^.]+\.*").unwrap());

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses every whitespace run to one space and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

fn strip_boilerplate(text: &str) -> String {
    let without_footer = FOOTER_RE.replace(text, "");
    PHOTO_CREDIT_RE.replace_all(&without_footer, "").into_owned()
}

/// Removes the footer notice and photo credits, then normalizes whitespace.
///
/// Removing a credit can splice two fragments into a new match, so the
/// rules are re-applied until the text stops changing. Each pass either
/// shortens the text or leaves it as is, which makes the result a fixed
/// point: `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let mut text = collapse_whitespace(raw);
    loop {
        let next = collapse_whitespace(&strip_boilerplate(&text));
        if next == text {
            return text;
        }
        text = next;
    }
}

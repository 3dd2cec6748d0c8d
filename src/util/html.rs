//! HTML-to-text helpers for server-rendered post fields.
//!
//! The content API returns titles, excerpts and bodies as rendered HTML. The
//! terminal cannot display markup, so these helpers turn it into plain text
//! (for list rows) or a flat list of text blocks (for the detail view).

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use super::text::strip_control_chars;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    // A trailing unterminated `<...` is stripped too
    TAG.get_or_init(|| Regex::new(r"<[^>]*>?").expect("static regex"))
}

fn element_regex() -> &'static Regex {
    static ELEMENT: OnceLock<Regex> = OnceLock::new();
    ELEMENT.get_or_init(|| Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").expect("static regex"))
}

fn src_regex() -> &'static Regex {
    static SRC: OnceLock<Regex> = OnceLock::new();
    SRC.get_or_init(|| {
        Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).expect("static regex")
    })
}

/// Remove every tag, leaving text content (entities untouched).
pub fn strip_markup(html: &str) -> Cow<'_, str> {
    tag_regex().replace_all(html, "")
}

/// Decode named and numeric HTML entities (`&amp;`, `&#8211;`, `&nbsp;`).
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(s)
}

/// Collapse runs of whitespace (including newlines and NBSP) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render an HTML fragment as a single line of safe plain text.
///
/// Tags are removed before entities are decoded, so an encoded `&lt;b&gt;`
/// survives as the literal text `<b>`.
///
/// ```
/// use crfnews::util::html_to_plain;
///
/// assert_eq!(html_to_plain("<p>Sa&uacute;de &amp; <b>bem-estar</b></p>\n"), "Saúde & bem-estar");
/// ```
pub fn html_to_plain(html: &str) -> String {
    let stripped = strip_markup(html);
    let decoded = decode_entities(&stripped);
    let collapsed = collapse_whitespace(&decoded);
    strip_control_chars(&collapsed).into_owned()
}

/// Kind of a block extracted from an HTML body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
    ListItem,
    Quote,
    /// An image; the block text holds its source URL.
    Image,
}

/// One displayable block of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub kind: BlockKind,
    pub text: String,
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "figure"
            | "figcaption"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "table"
            | "tr"
            | "pre"
            | "hr"
    )
}

/// Split an HTML body into text blocks at block-level element boundaries.
///
/// `<br>` breaks the current block. Content of `<script>` and `<style>` is
/// dropped. Whitespace inside a block is collapsed, empty blocks are skipped.
pub fn html_to_blocks(html: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut buffer = String::new();
    let mut kind = BlockKind::Paragraph;
    let mut quote_depth = 0usize;
    let mut skip_depth = 0usize;
    let mut last_end = 0;

    fn flush(blocks: &mut Vec<TextBlock>, buffer: &mut String, kind: &BlockKind) {
        let text = html_to_plain(buffer);
        buffer.clear();
        if !text.is_empty() {
            blocks.push(TextBlock {
                kind: kind.clone(),
                text,
            });
        }
    }

    for caps in element_regex().captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        if skip_depth == 0 {
            buffer.push_str(&html[last_end..whole.start()]);
        }
        last_end = whole.end();

        let closing = !caps[1].is_empty();
        let name = caps[2].to_ascii_lowercase();
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");

        if name == "script" || name == "style" {
            if closing {
                skip_depth = skip_depth.saturating_sub(1);
            } else {
                skip_depth += 1;
            }
            continue;
        }
        if skip_depth > 0 {
            continue;
        }

        if name == "br" {
            flush(&mut blocks, &mut buffer, &kind);
            continue;
        }

        if name == "img" {
            flush(&mut blocks, &mut buffer, &kind);
            if let Some(src) = src_regex().captures(attrs).and_then(|c| c.get(1)) {
                blocks.push(TextBlock {
                    kind: BlockKind::Image,
                    text: decode_entities(src.as_str()).into_owned(),
                });
            }
            continue;
        }

        if !is_block_tag(&name) {
            continue;
        }

        flush(&mut blocks, &mut buffer, &kind);

        if name == "blockquote" {
            quote_depth = if closing {
                quote_depth.saturating_sub(1)
            } else {
                quote_depth + 1
            };
        }

        kind = if closing {
            if quote_depth > 0 {
                BlockKind::Quote
            } else {
                BlockKind::Paragraph
            }
        } else {
            match name.as_str() {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::Heading,
                "li" => BlockKind::ListItem,
                _ if quote_depth > 0 => BlockKind::Quote,
                _ => BlockKind::Paragraph,
            }
        };
    }

    if skip_depth == 0 {
        buffer.push_str(&html[last_end..]);
    }
    flush(&mut blocks, &mut buffer, &kind);

    blocks
}

//! Top-level block scanner for serialized editor markup.
//!
//! The surface hands us whatever `innerHTML` it holds. We only need the
//! top-level elements as opaque blocks, so this is a tolerant scanner rather
//! than a full HTML parser: it tracks element nesting depth, understands void
//! and raw-text elements, comments and quoted attribute values, and never
//! fails. Unclosed elements run to the end of the input.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Block, BlockKind};

/// Attribute marking page-only markup that must not enter the document
pub const PAGE_CHROME_ATTR: &str = "data-page-chrome";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// A tag as read from the start of a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag {
    /// Lowercased element name
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    /// Byte length of the tag including `<` and `>`
    pub len: usize,
}

impl Tag {
    fn has_no_content(&self) -> bool {
        self.self_closing || VOID_ELEMENTS.contains(&self.name.as_str())
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.name.as_str())
    }
}

/// A top-level node of a markup fragment
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node<'a> {
    Element { name: String, raw: &'a str },
    Text(&'a str),
    Comment(&'a str),
}

/// Split markup into top-level blocks, in order.
///
/// Whitespace between top-level nodes is layout, not content, and is dropped.
pub fn parse_blocks(markup: &str) -> Vec<Block> {
    scan_top_level(markup)
        .into_iter()
        .map(|node| match node {
            Node::Element { name, raw } => Block::new(classify(&name), raw),
            Node::Text(raw) => Block::new(BlockKind::Text, raw),
            Node::Comment(raw) => Block::new(BlockKind::Comment, raw),
        })
        .collect()
}

/// Map an element name to its block kind
pub fn classify(name: &str) -> BlockKind {
    match name {
        "p" => BlockKind::Paragraph,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => BlockKind::Heading {
            level: name[1..].parse().unwrap_or(1),
        },
        "table" => BlockKind::Table,
        "img" | "figure" => BlockKind::Image,
        "hr" => BlockKind::Rule,
        "ul" => BlockKind::List { ordered: false },
        "ol" => BlockKind::List { ordered: true },
        "blockquote" => BlockKind::BlockQuote,
        "pre" => BlockKind::CodeBlock,
        other => BlockKind::Other {
            tag: other.to_string(),
        },
    }
}

fn scan_top_level(src: &str) -> Vec<Node<'_>> {
    let mut nodes = Vec::new();
    let mut pos = 0;

    while pos < src.len() {
        let rest = &src[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.is_empty() {
            break;
        }
        let rest = trimmed;

        if rest.starts_with("<!--") {
            let end = comment_end(rest, 0);
            nodes.push(Node::Comment(&rest[..end]));
            pos += end;
            continue;
        }

        match read_tag(rest) {
            Some(tag) if !tag.closing => {
                let end = element_end(rest, &tag);
                nodes.push(Node::Element {
                    name: tag.name,
                    raw: &rest[..end],
                });
                pos += end;
            }
            other => {
                // Text run, or a stray closing tag kept as text so nothing is lost
                let from = match other {
                    Some(tag) => tag.len,
                    None => rest.chars().next().map_or(1, char::len_utf8),
                };
                let end = next_node_start(rest, from).unwrap_or(rest.len());
                let text = rest[..end].trim_end();
                if !text.is_empty() {
                    nodes.push(Node::Text(text));
                }
                pos += end;
            }
        }
    }

    nodes
}

/// Byte offset just past the `-->` of a comment starting at `from`
fn comment_end(s: &str, from: usize) -> usize {
    s[from..]
        .find("-->")
        .map(|i| from + i + 3)
        .unwrap_or(s.len())
}

/// Offset of the next opening tag or comment at or after `from`
fn next_node_start(s: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(i) = s[search..].find('<') {
        let at = search + i;
        let rest = &s[at..];
        if rest.starts_with("<!--") {
            return Some(at);
        }
        if let Some(tag) = read_tag(rest)
            && !tag.closing
        {
            return Some(at);
        }
        search = at + 1;
    }
    None
}

/// Read a tag at the very start of `s`, if there is one
pub(crate) fn read_tag(s: &str) -> Option<Tag> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'<') {
        return None;
    }
    let mut i = 1;
    let closing = bytes.get(1) == Some(&b'/');
    if closing {
        i += 1;
    }
    if !bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    let name_start = i;
    while bytes
        .get(i)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-')
    {
        i += 1;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut quote: Option<u8> = None;
    while let Some(&b) = bytes.get(i) {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => {
                let self_closing = i > 0 && bytes[i - 1] == b'/';
                return Some(Tag {
                    name,
                    closing,
                    self_closing,
                    len: i + 1,
                });
            }
            None => {}
        }
        i += 1;
    }
    None
}

/// Byte offset just past the end of the element whose opening tag starts `s`
fn element_end(s: &str, open: &Tag) -> usize {
    if open.has_no_content() {
        return open.len;
    }
    if open.is_raw_text() {
        return raw_text_end(s, open.len, &open.name);
    }

    let mut depth = 1usize;
    let mut pos = open.len;
    while let Some(i) = s[pos..].find('<') {
        let at = pos + i;
        let rest = &s[at..];
        if rest.starts_with("<!--") {
            pos = comment_end(s, at);
            continue;
        }
        match read_tag(rest) {
            Some(tag) if tag.closing => {
                depth -= 1;
                if depth == 0 {
                    return at + tag.len;
                }
                pos = at + tag.len;
            }
            Some(tag) if tag.is_raw_text() && !tag.self_closing => {
                pos = raw_text_end(s, at + tag.len, &tag.name);
            }
            Some(tag) => {
                if !tag.has_no_content() {
                    depth += 1;
                }
                pos = at + tag.len;
            }
            None => pos = at + 1,
        }
    }
    s.len()
}

/// End of a raw-text element whose content starts at `from`
fn raw_text_end(s: &str, from: usize, name: &str) -> usize {
    let lower = s.to_ascii_lowercase();
    let needle = format!("</{name}");
    match lower[from..].find(&needle) {
        Some(i) => {
            let close = from + i;
            s[close..].find('>').map_or(s.len(), |j| close + j + 1)
        }
        None => s.len(),
    }
}

/// Lowercase name of the outer element of a fragment
pub fn open_tag_name(markup: &str) -> Option<String> {
    read_tag(markup.trim_start())
        .filter(|tag| !tag.closing)
        .map(|tag| tag.name)
}

/// The markup between an element's opening and closing tags
pub fn inner_markup(markup: &str) -> Option<&str> {
    let trimmed = markup.trim();
    let open = read_tag(trimmed).filter(|tag| !tag.closing)?;
    if open.has_no_content() {
        return None;
    }
    let body = &trimmed[open.len..];
    let Some(close) = body.rfind("</") else {
        return Some(body);
    };
    match read_tag(&body[close..]) {
        Some(tag) if tag.closing && tag.name == open.name => Some(&body[..close]),
        _ => Some(body),
    }
}

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTE_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTE_REGEX.get_or_init(|| {
        Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
            .expect("Invalid attribute regex")
    })
}

/// Value of an attribute on the outer element of a fragment.
///
/// Boolean attributes yield `Some("")`; entity references are decoded.
pub fn attribute(markup: &str, name: &str) -> Option<String> {
    let trimmed = markup.trim_start();
    let tag = read_tag(trimmed).filter(|tag| !tag.closing)?;
    // Skip "<name", stop before ">" (or "/>")
    let attrs = &trimmed[1 + tag.name.len()..tag.len - 1];

    attribute_regex()
        .captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            html_escape::decode_html_entities(value).into_owned()
        })
}

/// True when the outer element lists `class` in its class attribute
pub fn has_class(markup: &str, class: &str) -> bool {
    attribute(markup, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn raw(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(|b| b.markup.as_str()).collect()
    }

    #[test]
    fn parse_empty_input() {
        assert_eq!(parse_blocks(""), vec![]);
    }

    #[test]
    fn parse_sibling_elements() {
        let blocks = parse_blocks("<p>one</p><p>two</p>");
        assert_eq!(raw(&blocks), vec!["<p>one</p>", "<p>two</p>"]);
    }

    #[test]
    fn nested_elements_stay_inside_their_block() {
        let src = "<div><div><p>deep</p></div></div><p>after</p>";
        let blocks = parse_blocks(src);
        assert_eq!(
            raw(&blocks),
            vec!["<div><div><p>deep</p></div></div>", "<p>after</p>"]
        );
    }

    #[test]
    fn void_and_self_closing_elements_end_immediately() {
        let blocks = parse_blocks("<hr><img src=\"a.png\"/><br/><p>x</p>");
        assert_eq!(
            raw(&blocks),
            vec!["<hr>", "<img src=\"a.png\"/>", "<br/>", "<p>x</p>"]
        );
        assert_eq!(blocks[0].kind, BlockKind::Rule);
        assert_eq!(blocks[1].kind, BlockKind::Image);
    }

    #[test]
    fn quoted_angle_brackets_do_not_end_tags() {
        let blocks = parse_blocks(r#"<p title="a > b">x</p><p>y</p>"#);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].attribute("title"), Some("a > b".to_string()));
    }

    #[test]
    fn comments_inside_elements_are_skipped() {
        let blocks = parse_blocks("<div><!-- </div> --></div><p>x</p>");
        assert_eq!(raw(&blocks), vec!["<div><!-- </div> --></div>", "<p>x</p>"]);
    }

    #[test]
    fn raw_text_elements_hide_their_content() {
        let blocks = parse_blocks("<div><style>p > a { }</style></div><p>x</p>");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn unclosed_element_runs_to_end() {
        let blocks = parse_blocks("<p>never closed <b>bold");
        assert_eq!(raw(&blocks), vec!["<p>never closed <b>bold"]);
    }

    #[test]
    fn bare_text_and_stray_closers_are_kept_as_text() {
        let blocks = parse_blocks("hello <b>world</b>\n</p> tail<p>x</p>");
        assert_eq!(
            raw(&blocks),
            vec!["hello", "<b>world</b>", "</p> tail", "<p>x</p>"]
        );
        assert_eq!(blocks[0].kind, BlockKind::Text);
        assert_eq!(blocks[2].kind, BlockKind::Text);
    }

    #[test]
    fn lone_less_than_is_text() {
        let blocks = parse_blocks("1 < 2");
        assert_eq!(raw(&blocks), vec!["1 < 2"]);
    }

    #[rstest]
    #[case("p", BlockKind::Paragraph)]
    #[case("h3", BlockKind::Heading { level: 3 })]
    #[case("table", BlockKind::Table)]
    #[case("figure", BlockKind::Image)]
    #[case("ul", BlockKind::List { ordered: false })]
    #[case("blockquote", BlockKind::BlockQuote)]
    #[case("pre", BlockKind::CodeBlock)]
    #[case("section", BlockKind::Other { tag: "section".to_string() })]
    fn classify_tags(#[case] name: &str, #[case] expected: BlockKind) {
        assert_eq!(classify(name), expected);
    }

    #[test]
    fn tag_names_are_case_insensitive() {
        let blocks = parse_blocks("<P>x</P><H2>y</H2>");
        assert_eq!(blocks[0].kind, BlockKind::Paragraph);
        assert_eq!(blocks[1].kind, BlockKind::Heading { level: 2 });
    }

    #[rstest]
    #[case(r#"<img src="a.png" height="120">"#, "height", Some("120"))]
    #[case(r#"<img src='a.png' height=80>"#, "height", Some("80"))]
    #[case(r#"<div hidden>"#, "hidden", Some(""))]
    #[case(r#"<div title="a &amp; b">"#, "title", Some("a & b"))]
    #[case(r#"<div>"#, "title", None)]
    #[case(r#"<img SRC="x.png"/>"#, "src", Some("x.png"))]
    fn attribute_values(#[case] markup: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(attribute(markup, name), expected.map(str::to_string));
    }

    #[test]
    fn inner_markup_strips_outer_tags() {
        assert_eq!(
            inner_markup("<section class=\"page\"><p>a</p></section>"),
            Some("<p>a</p>")
        );
        assert_eq!(inner_markup("<hr>"), None);
        assert_eq!(inner_markup("<div>unclosed"), Some("unclosed"));
    }

    #[test]
    fn class_membership() {
        assert!(has_class(r#"<section class="page wide">"#, "page"));
        assert!(!has_class(r#"<section class="pages">"#, "page"));
    }
}

use crate::parsing::markup::read_tag;

/// Extract the visible text of a markup fragment in document order.
///
/// Mirrors what a text-order DOM walk over the rendered fragment sees:
/// tags and comments contribute nothing, `<br>` is a newline, script/style
/// bodies are skipped and character references are decoded. Unless
/// `preserve_whitespace` is set, runs of whitespace collapse to one space and
/// leading/trailing whitespace is dropped.
pub fn visible_text(markup: &str, preserve_whitespace: bool) -> String {
    let mut out = TextBuilder::new(preserve_whitespace);
    let mut pos = 0;

    while pos < markup.len() {
        let rest = &markup[pos..];
        let Some(lt) = rest.find('<') else {
            out.push_run(rest);
            break;
        };
        out.push_run(&rest[..lt]);

        let at = &rest[lt..];
        if at.starts_with("<!--") {
            pos += lt + at.find("-->").map_or(at.len(), |i| i + 3);
            continue;
        }
        match read_tag(at) {
            Some(tag) => {
                if !tag.closing && tag.name == "br" {
                    out.push_break();
                }
                pos += lt + tag.len;
                if !tag.closing && !tag.self_closing && matches!(tag.name.as_str(), "script" | "style")
                {
                    let lower = markup[pos..].to_ascii_lowercase();
                    pos += lower
                        .find(&format!("</{}", tag.name))
                        .unwrap_or(markup.len() - pos);
                }
            }
            None => {
                out.push_run("<");
                pos += lt + 1;
            }
        }
    }

    out.finish()
}

struct TextBuilder {
    out: String,
    preserve_whitespace: bool,
    pending_space: bool,
}

impl TextBuilder {
    fn new(preserve_whitespace: bool) -> Self {
        Self {
            out: String::new(),
            preserve_whitespace,
            pending_space: false,
        }
    }

    fn push_run(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let decoded = html_escape::decode_html_entities(raw);
        if self.preserve_whitespace {
            self.out.push_str(&decoded);
            return;
        }
        for ch in decoded.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
            } else {
                if self.pending_space && !self.out.is_empty() && !self.out.ends_with('\n') {
                    self.out.push(' ');
                }
                self.pending_space = false;
                self.out.push(ch);
            }
        }
    }

    fn push_break(&mut self) {
        self.out.push('\n');
        self.pending_space = false;
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("<p>Hello</p>", "Hello")]
    #[case("<p>Hello <b>bold</b> world</p>", "Hello bold world")]
    #[case("<p>  lots   of\n\t space  </p>", "lots of space")]
    #[case("<p>a<br>b</p>", "a\nb")]
    #[case("<p>a <br/> b</p>", "a\nb")]
    #[case("<p>&lt;tag&gt; &amp; &quot;q&quot;</p>", "<tag> & \"q\"")]
    #[case("<p>x<!-- hidden -->y</p>", "xy")]
    #[case("<div><style>p { color: red }</style>shown</div>", "shown")]
    #[case("<img src=\"a.png\">", "")]
    #[case("1 < 2", "1 < 2")]
    #[case("<table><tr><td>a</td><td>b</td></tr></table>", "ab")]
    fn collapsed_text(#[case] markup: &str, #[case] expected: &str) {
        assert_eq!(visible_text(markup, false), expected);
    }

    #[test]
    fn preserved_whitespace_in_code() {
        let markup = "<pre><code>fn main() {\n    run();\n}</code></pre>";
        assert_eq!(visible_text(markup, true), "fn main() {\n    run();\n}");
    }

    #[test]
    fn unicode_counts_as_chars() {
        let text = visible_text("<p>héllo 🦀</p>", false);
        assert_eq!(text.chars().count(), 7);
    }
}

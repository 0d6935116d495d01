use pulldown_cmark::{Options, Parser, html};

/// Render Markdown to the markup dialect the editor surface produces.
///
/// Tables and strikethrough are enabled so imported reports keep their
/// tabular data as `<table>` blocks.
pub fn markdown_to_markup(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(source, options);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

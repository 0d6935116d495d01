// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_report_markup(sections: usize) -> String {
    let mut markup = String::from("<h1>Benchmark report</h1>\n");
    for section in 0..sections {
        markup.push_str(&format!("<h2>Section {section}</h2>\n"));
        markup.push_str("<p>Paragraph with enough content to wrap across a couple of lines when laid out at the default page width, which is what most report text looks like.</p>\n");
        markup.push_str("<ul><li>First point</li><li>Second point</li><li>Third point</li></ul>\n");
        if section % 4 == 0 {
            markup.push_str("<table><tr><th>Metric</th><th>Value</th></tr><tr><td>Rows</td><td>42</td></tr></table>\n");
        }
        if section % 10 == 0 {
            markup.push_str("<img src=\"chart.png\" height=\"320\">\n");
        }
    }
    markup
}

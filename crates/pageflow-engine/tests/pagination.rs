use pageflow_engine::{
    Block, CanonicalOffset, Document, MeasureError, Page, PageCapacity, TextMetrics, carry,
    flatten, flatten_markup, from_canonical, paginate, reflow, save_cursor, to_canonical,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> Document {
    let markup = std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap();
    Document::from_markup(&markup)
}

fn paragraphs(count: usize) -> Document {
    (1..=count)
        .map(|n| Block::paragraph(&format!("Block {n}")))
        .collect()
}

/// Heights keyed by the number in "Block N"
fn heights(values: &[f64]) -> impl Fn(&Block) -> Result<f64, MeasureError> + use<> {
    let values = values.to_vec();
    move |block: &Block| {
        block
            .text()
            .strip_prefix("Block ")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| values.get(n - 1).copied())
            .ok_or(MeasureError::NotRendered)
    }
}

fn page_texts(pages: &[Page]) -> Vec<Vec<String>> {
    pages
        .iter()
        .map(|page| page.blocks.iter().map(Block::text).collect())
        .collect()
}

#[test]
fn three_forty_high_blocks_fill_two_pages() {
    let pages = paginate(
        &paragraphs(3),
        &PageCapacity::with_content_height(100.0),
        &heights(&[40.0, 40.0, 40.0]),
    );

    assert_eq!(
        page_texts(&pages),
        vec![vec!["Block 1", "Block 2"], vec!["Block 3"]]
    );
    assert_eq!(pages[0].used_height, 80.0);
}

#[test]
fn block_taller_than_a_page_stands_alone() {
    let pages = paginate(
        &paragraphs(1),
        &PageCapacity::with_content_height(100.0),
        &heights(&[500.0]),
    );

    assert_eq!(pages.len(), 1);
    assert_eq!(page_texts(&pages), vec![vec!["Block 1"]]);
}

#[rstest]
#[case(&[30.0, 30.0, 30.0, 30.0, 30.0, 30.0, 30.0])]
#[case(&[99.0, 2.0, 99.0, 2.0])]
#[case(&[250.0, 10.0, 10.0, 250.0, 10.0])]
#[case(&[100.0, 100.0, 0.0, 0.0, 100.0])]
fn every_block_lands_once_in_order(#[case] values: &[f64]) {
    let doc = paragraphs(values.len());
    let pages = paginate(&doc, &PageCapacity::with_content_height(100.0), &heights(values));

    assert!(pages.iter().all(|page| !page.is_empty()));
    assert_eq!(flatten(&pages), doc);
    for (index, page) in pages.iter().enumerate() {
        assert_eq!(page.number, index + 1);
        assert!(page.used_height <= 100.0 || page.len() == 1);
    }
}

#[test]
fn realistic_report_paginates_and_round_trips() {
    let doc = fixture("quarterly_report.html");
    let capacity = PageCapacity::default();
    let metrics = TextMetrics::for_capacity(&capacity);
    let pages = paginate(&doc, &capacity, &metrics);

    assert!(pages.len() > 1);
    assert_eq!(flatten(&pages), doc);

    let markups: Vec<String> = pages.iter().map(Page::to_markup).collect();
    assert_eq!(flatten_markup(&markups), doc);
}

#[test]
fn every_canonical_offset_maps_back_to_itself() {
    let doc = fixture("quarterly_report.html");
    let capacity = PageCapacity::with_content_height(300.0);
    let pages = paginate(&doc, &capacity, &TextMetrics::for_capacity(&capacity));

    for offset in 0..=doc.text_len() {
        let address = from_canonical(CanonicalOffset(offset), &pages).unwrap();
        assert_eq!(to_canonical(&address, &pages), Some(CanonicalOffset(offset)));
    }
}

#[test]
fn caret_follows_text_through_a_reflow() {
    let capacity = PageCapacity::with_content_height(100.0);
    let measure = heights(&[40.0, 40.0, 40.0, 40.0]);
    let doc = paragraphs(3);
    let before = paginate(&doc, &capacity, &measure);

    // The user types a fourth block at the end of page 1
    let mut edited = before.clone();
    edited[0].blocks.push(Block::paragraph("Block 4"));
    let caret = pageflow_engine::Selection::caret(pageflow_engine::SurfacePoint::new(0, 2, 5));
    let address = save_cursor(Some(&caret), &edited).unwrap();

    let (document, after) = reflow(&edited, &capacity, &measure);
    let moved = carry(&address, &edited, &after).unwrap();

    assert_eq!(document.len(), 4);
    assert_eq!(moved.page_index, 1);
    assert_eq!(moved.char_offset, 5);
    assert_eq!(
        to_canonical(&moved, &after),
        to_canonical(&address, &edited)
    );
}

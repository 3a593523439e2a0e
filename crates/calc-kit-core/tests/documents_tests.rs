#![cfg(feature = "pdf")]

use calc_kit_core::documents::margins::{adjust_margins, MarginMode, MarginSpec, MarginUnit};
use calc_kit_core::documents::merge::{merge_documents, MERGED_FILE_NAME};
use calc_kit_core::documents::queue::{FileQueue, SourceFile};
use calc_kit_core::CalcKitError;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

// ===========================================================================
// Fixtures
// ===========================================================================

/// Build a one-page PDF whose MediaBox width identifies it.
fn one_page_pdf(width: i64, height: i64) -> Vec<u8> {
    page_pdf_with(width, height, Dictionary::new())
}

/// One-page PDF with extra page dictionary entries (CropBox, Rotate, ...).
fn page_pdf_with(width: i64, height: i64, extra: Dictionary) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"0 0 m 10 10 l S".to_vec(),
    ));
    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(width),
            Object::Integer(height),
        ],
    };
    for (key, value) in extra.iter() {
        page.set(key.clone(), value.clone());
    }
    let page_id = doc.add_object(page);
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn first_page_box(bytes: &[u8], key: &[u8]) -> Vec<f32> {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = *doc.get_pages().values().next().unwrap();
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    page.get(key)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect()
}

fn page_widths(bytes: &[u8]) -> Vec<f32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_object(id).unwrap().as_dict().unwrap();
            let media = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media[2].as_float().unwrap() - media[0].as_float().unwrap()
        })
        .collect()
}

// ===========================================================================
// Merge
// ===========================================================================

#[test]
fn test_merge_two_single_page_files_in_list_order() {
    let files = vec![
        SourceFile::new("big.pdf", one_page_pdf(500, 700)),
        SourceFile::new("small.pdf", one_page_pdf(300, 400)),
    ];
    let artifact = merge_documents(&files).unwrap();

    assert_eq!(artifact.file_name, MERGED_FILE_NAME);
    assert_eq!(artifact.page_count, 2);
    assert_eq!(artifact.size_bytes, artifact.bytes.len());
    assert_eq!(page_widths(&artifact.bytes), vec![500.0, 300.0]);
}

#[test]
fn test_reordered_queue_changes_page_order() {
    let mut queue = FileQueue::new();
    queue
        .push(SourceFile::new("a.pdf", one_page_pdf(200, 200)))
        .unwrap();
    queue
        .push(SourceFile::new("b.pdf", one_page_pdf(400, 400)))
        .unwrap();
    queue
        .push(SourceFile::new("c.pdf", one_page_pdf(600, 600)))
        .unwrap();
    assert!(queue.move_down(0));

    let artifact = merge_documents(queue.files()).unwrap();
    assert_eq!(page_widths(&artifact.bytes), vec![400.0, 200.0, 600.0]);
}

#[test]
fn test_merge_aborts_on_corrupt_file() {
    let files = vec![
        SourceFile::new("good.pdf", one_page_pdf(300, 300)),
        SourceFile::new("broken.pdf", b"%PDF-1.5 this is not a pdf".to_vec()),
    ];
    match merge_documents(&files) {
        Err(CalcKitError::DocumentProcessing { file, .. }) => assert_eq!(file, "broken.pdf"),
        other => panic!("expected DocumentProcessing, got {other:?}"),
    }
}

#[test]
fn test_merge_rejects_non_pdf() {
    let files = vec![
        SourceFile::new("good.pdf", one_page_pdf(300, 300)),
        SourceFile::new("photo.jpg", vec![0xFF, 0xD8, 0xFF]),
    ];
    assert!(matches!(
        merge_documents(&files),
        Err(CalcKitError::UnsupportedFile { .. })
    ));
}

#[test]
fn test_merge_needs_two_files() {
    let files = vec![SourceFile::new("only.pdf", one_page_pdf(300, 300))];
    assert!(merge_documents(&files).unwrap_err().is_validation());
}

// ===========================================================================
// Margins
// ===========================================================================

fn margins(mode: MarginMode) -> MarginSpec {
    MarginSpec {
        mode,
        unit: MarginUnit::Points,
        top: 10.0,
        right: 20.0,
        bottom: 10.0,
        left: 20.0,
    }
}

#[test]
fn test_add_margins_widens_pages() {
    let file = SourceFile::new("letter.pdf", one_page_pdf(612, 792));
    let artifact = adjust_margins(&file, &margins(MarginMode::Add)).unwrap();
    assert_eq!(artifact.file_name, "margins-added-letter.pdf");
    assert_eq!(artifact.page_count, 1);
    assert_eq!(page_widths(&artifact.bytes), vec![652.0]);
}

#[test]
fn test_remove_margins_narrows_pages() {
    let file = SourceFile::new("letter.pdf", one_page_pdf(612, 792));
    let artifact = adjust_margins(&file, &margins(MarginMode::Remove)).unwrap();
    assert_eq!(artifact.file_name, "margins-removed-letter.pdf");
    assert_eq!(page_widths(&artifact.bytes), vec![572.0]);
}

#[test]
fn test_remove_more_than_page_fails() {
    let file = SourceFile::new("tiny.pdf", one_page_pdf(30, 30));
    let err = adjust_margins(&file, &margins(MarginMode::Remove)).unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_add_margins_keeps_existing_crop() {
    let extra = dictionary! {
        "CropBox" => vec![
            Object::Integer(50),
            Object::Integer(50),
            Object::Integer(300),
            Object::Integer(400),
        ],
    };
    let file = SourceFile::new("cropped.pdf", page_pdf_with(612, 792, extra));
    let artifact = adjust_margins(&file, &margins(MarginMode::Add)).unwrap();

    assert_eq!(
        first_page_box(&artifact.bytes, b"MediaBox"),
        vec![-20.0, -10.0, 632.0, 802.0]
    );
    assert_eq!(
        first_page_box(&artifact.bytes, b"CropBox"),
        vec![30.0, 40.0, 320.0, 410.0]
    );
}

#[test]
fn test_rotated_page_takes_visible_top_margin() {
    let extra = dictionary! { "Rotate" => Object::Integer(90) };
    let file = SourceFile::new("landscape.pdf", page_pdf_with(612, 792, extra));
    let spec = MarginSpec {
        mode: MarginMode::Add,
        unit: MarginUnit::Points,
        top: 30.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };
    let artifact = adjust_margins(&file, &spec).unwrap();

    // Shown rotated clockwise, the visible top is the stored left edge.
    assert_eq!(
        first_page_box(&artifact.bytes, b"MediaBox"),
        vec![-30.0, 0.0, 612.0, 792.0]
    );
}

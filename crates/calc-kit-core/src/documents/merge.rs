//! Combine several PDFs into one, page order following list order.

use lopdf::{dictionary, Document, Object, ObjectId};

use super::artifact::{load, processing_error, save, PdfArtifact};
use super::queue::SourceFile;
use crate::error::CalcKitError;
use crate::CalcKitResult;

pub const MERGED_FILE_NAME: &str = "merged-document.pdf";

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Walk the `Parent` chain looking for an inherited attribute.
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    // A malformed tree could loop; real trees are shallow.
    for _ in 0..64 {
        let dict = doc.get_object(current?).ok()?.as_dict().ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// Copy inherited attributes onto each page so it survives being moved
/// under a new page tree.
fn flatten_inherited(doc: &mut Document) {
    let mut patches = Vec::new();
    for page_id in doc.get_pages().into_values() {
        for key in INHERITABLE_KEYS {
            let own = doc
                .get_object(page_id)
                .and_then(Object::as_dict)
                .map(|d| d.has(key))
                .unwrap_or(false);
            if !own {
                if let Some(value) = inherited_attribute(doc, page_id, key) {
                    patches.push((page_id, key, value));
                }
            }
        }
    }
    for (page_id, key, value) in patches {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set(key, value);
        }
    }
}

/// Merge every page of every file, in list order, into a new document.
///
/// Files are processed one after another; the first file that fails to load
/// aborts the whole merge and no output is produced.
pub fn merge_documents(files: &[SourceFile]) -> CalcKitResult<PdfArtifact> {
    if files.len() < 2 {
        return Err(CalcKitError::InsufficientData(
            "Select at least two PDF files to merge".into(),
        ));
    }

    let mut merged = Document::with_version("1.5");
    let mut next_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();

    for file in files {
        let mut doc = load(file)?;
        flatten_inherited(&mut doc);
        doc.renumber_objects_with(next_id);
        next_id = doc.max_id + 1;

        page_ids.extend(doc.get_pages().into_values());
        merged.objects.extend(std::mem::take(&mut doc.objects));
    }

    let pages_id: ObjectId = (next_id, 0);
    let catalog_id: ObjectId = (next_id + 1, 0);
    merged.max_id = next_id + 1;

    for &page_id in &page_ids {
        match merged.get_object_mut(page_id) {
            Ok(Object::Dictionary(dict)) => dict.set("Parent", pages_id),
            _ => {
                return Err(processing_error(
                    MERGED_FILE_NAME,
                    format!("page object {} {} is not a dictionary", page_id.0, page_id.1),
                ))
            }
        }
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();
    merged.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        }),
    );
    merged.objects.insert(
        catalog_id,
        Object::Dictionary(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        }),
    );
    merged.trailer.set("Root", catalog_id);

    // Drop the source catalogs, page trees and outlines nothing points at.
    merged.prune_objects();
    merged.renumber_objects();
    merged.compress();

    log::debug!("merged {} files into {} pages", files.len(), page_ids.len());
    save(merged, MERGED_FILE_NAME.to_string())
}

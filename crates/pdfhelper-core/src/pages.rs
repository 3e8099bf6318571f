//! Page tree helpers on top of lopdf

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::PdfHelperError;

/// US Letter, used when no MediaBox can be found.
pub const LETTER_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Parent chains deeper than this are treated as malformed.
const MAX_TREE_DEPTH: usize = 10;

/// Attributes a page may inherit from its ancestors in the page tree.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Look up `key` on a page, walking up `/Parent` links if it is not set
/// directly. Indirect values are resolved once.
pub fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(resolve(doc, value).clone());
        }
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        current = doc.get_dictionary(parent_id).ok()?;
    }

    None
}

fn resolve<'a>(doc: &'a Document, value: &'a Object) -> &'a Object {
    match value {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(value),
        other => other,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Effective MediaBox as `[llx, lly, urx, ury]`.
pub fn media_box(doc: &Document, page_id: ObjectId) -> [f64; 4] {
    let values: Option<Vec<f64>> = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|object| object.as_array().ok().cloned())
        .map(|array| array.iter().filter_map(number).collect());

    match values.as_deref() {
        Some([llx, lly, urx, ury]) => [*llx, *lly, *urx, *ury],
        _ => LETTER_MEDIA_BOX,
    }
}

pub fn page_height(doc: &Document, page_id: ObjectId) -> f64 {
    let [_, lly, _, ury] = media_box(doc, page_id);
    ury - lly
}

/// Effective `/Rotate` value, 0 when unset.
pub fn page_rotation(doc: &Document, page_id: ObjectId) -> i64 {
    inherited_attribute(doc, page_id, b"Rotate")
        .and_then(|object| number(&object))
        .map(|value| value as i64)
        .unwrap_or(0)
}

/// Copy inherited attributes onto the page itself so it survives being
/// re-parented.
pub fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), PdfHelperError> {
    let mut inherited = Vec::new();
    {
        let page = doc.get_dictionary(page_id)?;
        for key in INHERITABLE_KEYS {
            if !page.has(key) {
                if let Some(value) = inherited_attribute(doc, page_id, key) {
                    inherited.push((key, value));
                }
            }
        }
    }

    let page = page_dictionary_mut(doc, page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

pub fn page_dictionary_mut(
    doc: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, PdfHelperError> {
    doc.get_object_mut(page_id)?
        .as_dict_mut()
        .map_err(|_| PdfHelperError::OperationError(format!("Page {:?} is not a dictionary", page_id)))
}

/// Load a document, mapping failures to a parse error.
pub fn load_document(bytes: &[u8]) -> Result<Document, PdfHelperError> {
    Document::load_mem(bytes).map_err(|e| PdfHelperError::ParseError(e.to_string()))
}

/// Serialize a document to bytes.
pub fn save_document(doc: &mut Document) -> Result<Vec<u8>, PdfHelperError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfHelperError::OperationError(format!("Failed to save PDF: {}", e)))?;
    Ok(buffer)
}

//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::PdfHelperError;
use crate::pages::{flatten_inherited, page_dictionary_mut, save_document};

/// Merge multiple PDFs into one, pages in input order.
///
/// The algorithm:
/// 1. Load every input; the first one becomes the destination
/// 2. For each further source, shift its object ids past the destination's
///    highest id and import all of its objects
/// 3. Flatten inherited page attributes, then point every page at the
///    destination's page tree root
/// 4. Rewrite Kids and Count, compress and save
pub fn merge_documents(documents: Vec<Vec<u8>>) -> Result<Vec<u8>, PdfHelperError> {
    if documents.is_empty() {
        return Err(PdfHelperError::OperationError("No documents to merge".into()));
    }

    let mut loaded_docs = Vec::with_capacity(documents.len());
    for (i, doc_bytes) in documents.iter().enumerate() {
        let doc = Document::load_mem(doc_bytes).map_err(|e| {
            PdfHelperError::ParseError(format!("Failed to load document {}: {}", i + 1, e))
        })?;
        loaded_docs.push(doc);
    }

    let mut dest = loaded_docs.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut dest_page_refs = get_page_references(&dest);

    for source in loaded_docs {
        let source_pages = get_page_references(&source);
        let id_offset = dest_max_id;

        let mut remapped_objects = BTreeMap::new();
        for (old_id, object) in source.objects {
            let new_id = (old_id.0 + id_offset, old_id.1);
            remapped_objects.insert(new_id, remap_object_refs(object, id_offset));
        }
        dest.objects.extend(remapped_objects);

        dest_page_refs.extend(
            source_pages
                .into_iter()
                .map(|(number, generation)| (number + id_offset, generation)),
        );

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;
    debug!(pages = dest_page_refs.len(), "Merging page trees");

    update_page_tree(&mut dest, dest_page_refs)?;

    // Drops the source catalogs and page tree nodes no longer referenced
    dest.prune_objects();
    dest.compress();

    save_document(&mut dest)
}

fn get_page_references(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().values().copied().collect()
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

fn pages_root_id(doc: &Document) -> Result<ObjectId, PdfHelperError> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| PdfHelperError::OperationError("No Root in trailer".into()))?;

    doc.get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| PdfHelperError::OperationError("No Pages in catalog".into()))
}

/// Make `page_refs` the flat list of kids under the destination's root node.
fn update_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<(), PdfHelperError> {
    let pages_id = pages_root_id(doc)?;

    for &page_id in &page_refs {
        flatten_inherited(doc, page_id)?;
    }
    for &page_id in &page_refs {
        page_dictionary_mut(doc, page_id)?.set("Parent", Object::Reference(pages_id));
    }

    let kids = page_refs
        .iter()
        .map(|&id| Object::Reference(id))
        .collect::<Vec<_>>();

    let pages_dict = doc
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| PdfHelperError::OperationError("Invalid pages dictionary".into()))?;
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", Object::Integer(page_refs.len() as i64));

    Ok(())
}

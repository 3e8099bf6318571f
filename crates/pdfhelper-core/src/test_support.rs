//! In-memory PDFs for unit tests

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

/// One Letter-sized page per entry, each showing its line of text in Helvetica.
pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![100.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(line.as_bytes().to_vec(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// `page_count` pages labelled "Page 1", "Page 2", ...
pub fn numbered_pdf(page_count: u32) -> Vec<u8> {
    let labels: Vec<String> = (1..=page_count).map(|n| format!("Page {}", n)).collect();
    let lines: Vec<&str> = labels.iter().map(String::as_str).collect();
    text_pdf(&lines)
}

/// Raw content bytes of a page, all streams concatenated.
pub fn page_content(bytes: &[u8], page_number: u32) -> Vec<u8> {
    let doc = Document::load_mem(bytes).unwrap();
    let page_id = doc.get_pages()[&page_number];
    doc.get_page_content(page_id).unwrap()
}

/// Decoded operator names of a page, in order.
pub fn operators(bytes: &[u8], page_number: u32) -> Vec<String> {
    Content::decode(&page_content(bytes, page_number))
        .unwrap()
        .operations
        .into_iter()
        .map(|op| op.operator)
        .collect()
}

/// Numeric operands of every `operator` on a page, in order.
pub fn operands(bytes: &[u8], page_number: u32, operator: &str) -> Vec<Vec<f64>> {
    Content::decode(&page_content(bytes, page_number))
        .unwrap()
        .operations
        .into_iter()
        .filter(|op| op.operator == operator)
        .map(|op| {
            op.operands
                .iter()
                .filter_map(|o| match o {
                    Object::Integer(i) => Some(*i as f64),
                    Object::Real(r) => Some(f64::from(*r)),
                    _ => None,
                })
                .collect()
        })
        .collect()
}

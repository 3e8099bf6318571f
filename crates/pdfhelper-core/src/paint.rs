//! Drawing overlays onto a page
//!
//! `PagePainter` takes render-space geometry from the overlay planner,
//! converts it back to PDF user space and appends one content stream to the
//! page. The existing content is wrapped in `q`/`Q` first so a stray
//! transform left on the stack cannot shift the overlay.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::error::PdfHelperError;
use crate::geometry::{Point, Rect, RenderSpace};
use crate::overlay::flip_y;
use crate::pages::{inherited_attribute, page_dictionary_mut};

/// Resource name under which the replacement font is registered.
const FONT_RESOURCE: &str = "FRpl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    White,
    Black,
}

impl Color {
    fn rgb(self) -> [f32; 3] {
        match self {
            Color::White => [1.0, 1.0, 1.0],
            Color::Black => [0.0, 0.0, 0.0],
        }
    }
}

/// One of the PDF standard 14 fonts at a given size.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardFont {
    pub base_font: &'static str,
    pub size: f64,
}

impl StandardFont {
    /// Pick a standard font for a requested family name. Helvetica when unset.
    pub fn for_family(family: Option<&str>, size: f64) -> Self {
        Self {
            base_font: family.map(map_font_family).unwrap_or("Helvetica"),
            size,
        }
    }
}

/// Map a font family or font name to a standard 14 base font.
pub fn map_font_family(name: &str) -> &'static str {
    let lower = name.to_lowercase();

    match lower.as_str() {
        "serif" => return "Times-Roman",
        "sans-serif" | "cursive" | "fantasy" => return "Helvetica",
        "monospace" => return "Courier",
        _ => {}
    }

    let bold = lower.contains("bold");
    let italic = lower.contains("italic") || lower.contains("oblique");

    if lower.contains("times") || lower.contains("georgia") || lower.contains("garamond") {
        return match (bold, italic) {
            (true, true) => "Times-BoldItalic",
            (true, false) => "Times-Bold",
            (false, true) => "Times-Italic",
            (false, false) => "Times-Roman",
        };
    }

    if lower.contains("courier")
        || lower.contains("mono")
        || lower.contains("consolas")
        || lower.contains("monaco")
    {
        return match (bold, italic) {
            (true, true) => "Courier-BoldOblique",
            (true, false) => "Courier-Bold",
            (false, true) => "Courier-Oblique",
            (false, false) => "Courier",
        };
    }

    match (bold, italic) {
        (true, true) => "Helvetica-BoldOblique",
        (true, false) => "Helvetica-Bold",
        (false, true) => "Helvetica-Oblique",
        (false, false) => "Helvetica",
    }
}

/// WinAnsi byte for a character, if the encoding has one.
///
/// Printable ASCII and U+00A0..=U+00FF map to themselves; 0x80..=0x9F hold
/// typographic characters instead of the C1 controls.
fn win_ansi_byte(c: char) -> Option<u8> {
    let byte = match c {
        ' '..='~' | '\u{a0}'..='\u{ff}' => return u8::try_from(u32::from(c)).ok(),
        '\u{20ac}' => 0x80,
        '\u{201a}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201e}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02c6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8a,
        '\u{2039}' => 0x8b,
        '\u{0152}' => 0x8c,
        '\u{017d}' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02dc}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9a,
        '\u{203a}' => 0x9b,
        '\u{0153}' => 0x9c,
        '\u{017e}' => 0x9e,
        '\u{0178}' => 0x9f,
        _ => return None,
    };
    Some(byte)
}

/// Standard fonts only cover WinAnsi; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| win_ansi_byte(c).unwrap_or(b'?'))
        .collect()
}

/// Collects fill and text operations for one page.
#[derive(Debug)]
pub struct PagePainter {
    page_height: f64,
    operations: Vec<Operation>,
    font: Option<&'static str>,
}

impl PagePainter {
    pub fn new(page_height: f64) -> Self {
        Self {
            page_height,
            operations: Vec::new(),
            font: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Fill a render-space rectangle with a solid color.
    pub fn fill_rect(&mut self, rect: &Rect<RenderSpace>, color: Color) {
        let bottom = flip_y(rect.y, rect.height, self.page_height);
        let [r, g, b] = color.rgb();
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]),
            Operation::new(
                "re",
                vec![
                    real(rect.x),
                    real(bottom),
                    real(rect.width),
                    real(rect.height),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Draw black text with its baseline starting at a render-space point.
    pub fn draw_text(&mut self, anchor: &Point<RenderSpace>, text: &str, font: &StandardFont) {
        let baseline = flip_y(anchor.y, 0.0, self.page_height);
        self.font = Some(font.base_font);
        self.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("rg", Color::Black.rgb().map(Object::Real).to_vec()),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_RESOURCE.into(), real(font.size)]),
            Operation::new("Td", vec![real(anchor.x), real(baseline)]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    /// Append the collected operations to a page.
    pub fn apply(self, doc: &mut Document, page_id: ObjectId) -> Result<(), PdfHelperError> {
        if self.is_empty() {
            return Ok(());
        }

        let operation_count = self.operations.len();
        let overlay = Content {
            operations: self.operations,
        }
        .encode()
        .map_err(|e| PdfHelperError::OperationError(format!("Failed to encode overlay: {}", e)))?;

        if let Some(base_font) = self.font {
            register_font(doc, page_id, base_font)?;
        }

        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let close_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

        let page = page_dictionary_mut(doc, page_id)?;
        let existing = match page.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(other) => vec![other.clone()],
            Err(_) => Vec::new(),
        };

        let mut contents = Vec::with_capacity(existing.len() + 3);
        if !existing.is_empty() {
            contents.push(Object::Reference(open_id));
            contents.extend(existing);
            contents.push(Object::Reference(close_id));
        }
        contents.push(Object::Reference(overlay_id));
        page.set("Contents", Object::Array(contents));

        debug!(?page_id, operations = operation_count, "Painted overlay");
        Ok(())
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Give the page its own resource dictionary with the replacement font added.
fn register_font(doc: &mut Document, page_id: ObjectId, base_font: &str) -> Result<(), PdfHelperError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    });

    let mut resources = match inherited_attribute(doc, page_id, b"Resources") {
        Some(Object::Dictionary(dict)) => dict,
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc
            .get_dictionary(*id)
            .cloned()
            .unwrap_or_else(|_| Dictionary::new()),
        _ => Dictionary::new(),
    };
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    page_dictionary_mut(doc, page_id)?.set("Resources", Object::Dictionary(resources));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{operands, operators, page_content, text_pdf};
    use pretty_assertions::assert_eq;

    fn painted_bytes(paint: impl FnOnce(&mut PagePainter)) -> Vec<u8> {
        let bytes = text_pdf(&["Hello World"]);
        let mut doc = Document::load_mem(&bytes).unwrap();
        let page_id = doc.get_pages()[&1];
        let mut painter = PagePainter::new(792.0);
        paint(&mut painter);
        painter.apply(&mut doc, page_id).unwrap();
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_font_family_mapping() {
        assert_eq!(map_font_family("serif"), "Times-Roman");
        assert_eq!(map_font_family("Arial"), "Helvetica");
        assert_eq!(map_font_family("Consolas"), "Courier");
        assert_eq!(map_font_family("TimesNewRoman-BoldItalic"), "Times-BoldItalic");
        assert_eq!(map_font_family("Helvetica-Oblique"), "Helvetica-Oblique");
        assert_eq!(map_font_family("Comic Neue"), "Helvetica");
    }

    #[test]
    fn test_standard_font_defaults_to_helvetica() {
        let font = StandardFont::for_family(None, 11.0);
        assert_eq!(font.base_font, "Helvetica");
        assert_eq!(font.size, 11.0);
    }

    #[test]
    fn test_win_ansi_fallback() {
        assert_eq!(encode_win_ansi("Café"), b"Caf\xe9".to_vec());
        assert_eq!(encode_win_ansi("a\u{4e2d}b"), b"a?b".to_vec());
    }

    #[test]
    fn test_win_ansi_typographic_range() {
        assert_eq!(encode_win_ansi("\u{201c}\u{20ac}\u{201d}"), vec![0x93, 0x80, 0x94]);
        assert_eq!(encode_win_ansi("a\u{2014}b\u{2122}"), vec![b'a', 0x97, b'b', 0x99]);
        // C1 controls have no WinAnsi glyph
        assert_eq!(encode_win_ansi("\u{0093}\u{0080}"), b"??".to_vec());
        assert_eq!(encode_win_ansi("tab\there"), b"tab?here".to_vec());
    }

    #[test]
    fn test_empty_painter_leaves_page_alone() {
        let original = text_pdf(&["Hello World"]);
        let painted = painted_bytes(|_| {});
        assert_eq!(page_content(&painted, 1), page_content(&original, 1));
    }

    #[test]
    fn test_fill_rect_converts_back_to_pdf_space() {
        let painted = painted_bytes(|painter| {
            painter.fill_rect(&Rect::new(8.5, 73.5, 33.0, 8.0), Color::Black);
        });
        // 792 - (73.5 + 8)
        assert_eq!(operands(&painted, 1, "re"), vec![vec![8.5, 710.5, 33.0, 8.0]]);
        assert_eq!(operands(&painted, 1, "rg"), vec![vec![0.0, 0.0, 0.0]]);
        assert_eq!(operators(&painted, 1).first().map(String::as_str), Some("q"));
    }

    #[test]
    fn test_draw_text_registers_font() {
        let painted = painted_bytes(|painter| {
            let font = StandardFont::for_family(Some("Courier"), 10.0);
            painter.draw_text(&Point::new(100.0, 90.0), "Bye", &font);
        });
        assert_eq!(operands(&painted, 1, "Td").last(), Some(&vec![100.0, 702.0]));
        let content = String::from_utf8_lossy(&page_content(&painted, 1)).to_string();
        assert!(content.contains("/FRpl"), "content: {}", content);
        assert!(content.contains("(Bye) Tj"), "content: {}", content);

        let doc = Document::load_mem(&painted).unwrap();
        let page_id = doc.get_pages()[&1];
        let resources = doc.get_dictionary(page_id).unwrap().get(b"Resources").unwrap();
        let fonts = resources.as_dict().unwrap().get(b"Font").unwrap().as_dict().unwrap();
        assert!(fonts.has(b"F1"), "existing fonts are kept");
        let replacement = fonts.get(b"FRpl").unwrap().as_reference().unwrap();
        let base_font = doc
            .get_dictionary(replacement)
            .unwrap()
            .get(b"BaseFont")
            .unwrap()
            .as_name()
            .unwrap()
            .to_vec();
        assert_eq!(base_font, b"Courier".to_vec());
    }
}

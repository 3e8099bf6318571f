//! Page rotation

use lopdf::Object;
use tracing::debug;

use crate::error::{PdfHelperError, ValidationCode, ValidationError};
use crate::pages::{load_document, page_dictionary_mut, page_rotation, save_document};
use crate::ranges::{expand_to_page_set, parse_ranges};

/// Clockwise rotation in quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAngle {
    None,
    Clockwise90,
    Rotate180,
    Clockwise270,
}

impl RotationAngle {
    /// Accepts any multiple of 90, negative values turning counter-clockwise.
    pub fn from_degrees(degrees: i64) -> Result<Self, ValidationError> {
        match degrees.rem_euclid(360) {
            0 => Ok(RotationAngle::None),
            90 => Ok(RotationAngle::Clockwise90),
            180 => Ok(RotationAngle::Rotate180),
            270 => Ok(RotationAngle::Clockwise270),
            _ => Err(ValidationError::new(
                ValidationCode::AngleInvalid,
                format!("Angle must be a multiple of 90, got {}", degrees),
            )),
        }
    }

    pub fn to_degrees(self) -> i64 {
        match self {
            RotationAngle::None => 0,
            RotationAngle::Clockwise90 => 90,
            RotationAngle::Rotate180 => 180,
            RotationAngle::Clockwise270 => 270,
        }
    }

    /// Add this rotation to an existing `/Rotate` value, normalized to [0, 360).
    pub fn apply_to(self, current: i64) -> i64 {
        (current + self.to_degrees()).rem_euclid(360)
    }
}

/// Rotate the pages selected by `expression` by `degrees`.
pub fn rotate_pages(bytes: &[u8], expression: &str, degrees: i64) -> Result<Vec<u8>, PdfHelperError> {
    let angle = RotationAngle::from_degrees(degrees)?;
    let mut doc = load_document(bytes)?;
    let pages = doc.get_pages();
    let targets = expand_to_page_set(&parse_ranges(expression, pages.len() as u32)?);

    for page_number in &targets {
        let Some(&page_id) = pages.get(page_number) else {
            continue;
        };
        let rotation = angle.apply_to(page_rotation(&doc, page_id));
        page_dictionary_mut(&mut doc, page_id)?.set("Rotate", Object::Integer(rotation));
    }

    debug!(pages = targets.len(), degrees = angle.to_degrees(), "Rotated pages");
    save_document(&mut doc)
}

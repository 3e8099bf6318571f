//! Overlay geometry: where to paint and where to anchor replacement text

use crate::geometry::{ExtractionSpace, Point, Rect, RenderSpace};

/// Fraction of the box height used to lift the text anchor off the box bottom.
pub const BASELINE_OFFSET_RATIO: f64 = 0.2;

/// Flip a vertical span between bottom-left and top-left origins.
///
/// Returns the distance from the opposite edge to the far side of the span.
/// Applying it twice with the same height gives back `y`, so the same
/// function converts in both directions.
pub fn flip_y(y: f64, height: f64, page_height: f64) -> f64 {
    page_height - (y + height)
}

/// Rectangle to fill over a match, grown by `padding` on every side.
pub fn plan_paint(rect: &Rect<ExtractionSpace>, page_height: f64, padding: f64) -> Rect<RenderSpace> {
    let top = flip_y(rect.y, rect.height, page_height);
    Rect::new(
        rect.x - padding,
        top - padding,
        rect.width + 2.0 * padding,
        rect.height + 2.0 * padding,
    )
}

/// Where replacement text starts for a match.
pub fn plan_text_anchor(rect: &Rect<ExtractionSpace>, page_height: f64) -> Point<RenderSpace> {
    Point::new(
        rect.x,
        flip_y(rect.y, rect.height * BASELINE_OFFSET_RATIO, page_height),
    )
}

//! Rectangles and points tagged with the coordinate space they live in
//!
//! Extraction space is PDF user space as reported by the word extractor:
//! origin bottom-left, y increasing upward. Render space is what painting
//! code works in: origin top-left, y increasing downward. The space is a
//! type parameter so the two can never be mixed by accident.

use std::marker::PhantomData;

use serde::Serialize;

/// Origin bottom-left, y up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSpace {}

/// Origin top-left, y down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSpace {}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Rect<S> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> Rect<S> {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            space: PhantomData,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(bound = "")]
pub struct Point<S> {
    pub x: f64,
    pub y: f64,
    #[serde(skip)]
    space: PhantomData<S>,
}

impl<S> Point<S> {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            space: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_right_edge() {
        let rect: Rect<ExtractionSpace> = Rect::new(10.0, 20.0, 30.0, 5.0);
        assert_eq!(rect.right(), 40.0);
    }

    #[test]
    fn test_rects_in_same_space_compare_by_value() {
        let a: Rect<RenderSpace> = Rect::new(1.0, 2.0, 3.0, 4.0);
        let b: Rect<RenderSpace> = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(a, b);
    }
}

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle given by origin and size.
///
/// Width and height may be negative when built from inverted corners.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rectangle {
    /// A rectangle with lower-left corner `(x, y)`. Sizes may be negative.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn bottom(&self) -> f64 {
        self.y
    }

    /// `x + width`.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// `y + height`.
    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

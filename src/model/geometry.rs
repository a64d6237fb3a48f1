//! Pixel geometry: bounding boxes, page dimensions and rotation.

use serde::{Deserialize, Serialize};

/// Round half-way values towards positive infinity.
///
/// Box coordinates are rounded this way everywhere so that `-2.5` and `2.5`
/// move in the same direction after a rotation.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Pixel dimensions of a page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dims {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl Dims {
    /// Create new dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BBox {
    /// Create a new bounding box.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    /// Height in pixels.
    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Union of every box in `boxes`, or `None` when there are none.
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes
            .into_iter()
            .fold(None, |acc: Option<BBox>, b| match acc {
                Some(u) => Some(u.union(b)),
                None => Some(*b),
            })
    }

    /// Map this box from a rotated image frame back to the page frame.
    ///
    /// The box is translated by the page shift, then offset by how far the
    /// rotation moves its optical center `(left, bottom - height / 3)`.
    pub fn rotate(&self, rotation: &Rotation) -> BBox {
        let Rotation {
            cos,
            sin,
            shift_x,
            shift_y,
            ..
        } = *rotation;

        let x = self.left as f64 - shift_x / 2.0;
        let y = self.bottom as f64 - (self.bottom - self.top) as f64 / 3.0 - shift_y / 2.0;

        let left = self.left as f64 - shift_x;
        let right = self.right as f64 - shift_x;
        let top = self.top as f64 - shift_y;
        let bottom = self.bottom as f64 - shift_y;

        let adj_y = (1.0 - cos) * y - sin * left;
        let x_rot = x * cos - sin * y;
        let adj_x = x - x_rot;

        BBox {
            left: round_half_up(left - adj_x) as i32,
            top: round_half_up(top - adj_y) as i32,
            right: round_half_up(right - adj_x) as i32,
            bottom: round_half_up(bottom - adj_y) as i32,
        }
    }
}

/// Precomputed rotation parameters for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    /// Rotation angle in degrees
    pub degrees: f64,
    pub cos: f64,
    pub sin: f64,
    pub shift_x: f64,
    pub shift_y: f64,
}

impl Rotation {
    /// Rotation by `degrees` for a page of size `dims`.
    ///
    /// Non-finite shifts collapse to zero.
    pub fn new(degrees: f64, dims: Dims) -> Self {
        let radians = degrees.to_radians();
        let sin = radians.sin();
        let cos = radians.cos();

        let shift_x = finite_or_zero(-sin * dims.width as f64 / 2.0);
        let shift_y = finite_or_zero(sin * (dims.height as f64 - shift_x) / 2.0);

        Self {
            degrees,
            cos,
            sin,
            shift_x,
            shift_y,
        }
    }

    /// Horizontal page shift only, as used by margin estimation.
    pub fn shift_x_for(degrees: f64, dims: Dims) -> f64 {
        finite_or_zero(-degrees.to_radians().sin() * dims.width as f64 / 2.0)
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

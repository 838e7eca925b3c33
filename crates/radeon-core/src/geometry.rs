//! Primitive inputs.

/// Axis-aligned rectangle, `w`/`h` in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rectangle {
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }
}

/// Region with inclusive corners. Also used for line end points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Region {
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Region covering a `width` x `height` surface.
    #[must_use]
    pub fn of_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32 - 1, height as i32 - 1)
    }

    /// Region addressing the same pixels on a half-resolution plane.
    /// Negative corners round towards negative infinity like positive ones.
    #[must_use]
    pub const fn halved(self) -> Self {
        Self::new(
            self.x1.div_euclid(2),
            self.y1.div_euclid(2),
            self.x2.div_euclid(2),
            self.y2.div_euclid(2),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triangle {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub x3: i32,
    pub y3: i32,
}

/// Textured vertex; `s`/`t` are normalized texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub s: f32,
    pub t: f32,
}

/// How a textured vertex array forms triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleFormation {
    List,
    Strip,
    Fan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halved_floors_both_signs() {
        assert_eq!(Region::new(3, 5, 319, 239).halved(), Region::new(1, 2, 159, 119));
        assert_eq!(Region::new(-3, -1, 7, 0).halved(), Region::new(-2, -1, 3, 0));
    }
}

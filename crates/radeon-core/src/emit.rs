//! Decomposition of accelerated operations into vertex batches.

use radeon_registers::common::PrimType;

use crate::geometry::{Rectangle, Region, Triangle, TriangleFormation, Vertex};
use crate::vertex::{VertexBatch, VertexLayout};

/// How a generation rasterises an axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RectShape {
    /// Three corners: top-left, top-right, bottom-right.
    RectangleList,
    /// Four corners, clockwise from top-left.
    QuadList,
}

impl RectShape {
    const fn prim(self) -> PrimType {
        match self {
            Self::RectangleList => PrimType::RectangleList,
            Self::QuadList => PrimType::QuadList,
        }
    }

    fn push(self, batch: &mut VertexBatch, r: &Rectangle) {
        let (x1, y1) = (r.x as f32, r.y as f32);
        let (x2, y2) = ((r.x + r.w) as f32, (r.y + r.h) as f32);
        batch.push(&[x1, y1]);
        batch.push(&[x2, y1]);
        batch.push(&[x2, y2]);
        if self == Self::QuadList {
            batch.push(&[x1, y2]);
        }
    }
}

/// A 1x1 rectangle does not rasterise as an area primitive; it is sent as a
/// point instead.
#[must_use]
pub fn fill_rectangle(shape: RectShape, rect: &Rectangle) -> VertexBatch {
    if rect.w == 1 && rect.h == 1 {
        let mut batch = VertexBatch::new(PrimType::PointList, VertexLayout::Xy);
        batch.push(&[rect.x as f32, rect.y as f32]);
        return batch;
    }
    let mut batch = VertexBatch::new(shape.prim(), VertexLayout::Xy);
    shape.push(&mut batch, rect);
    batch
}

/// Border of `rect` as up to four non-overlapping one-pixel strips: top and
/// bottom span the full width, the sides fill the rows between.
#[must_use]
pub fn outline_edges(rect: &Rectangle) -> Vec<Rectangle> {
    let Rectangle { x, y, w, h } = *rect;
    let mut edges = Vec::with_capacity(4);
    if w <= 0 || h <= 0 {
        return edges;
    }
    edges.push(Rectangle::new(x, y, w, 1));
    if h > 1 {
        edges.push(Rectangle::new(x, y + h - 1, w, 1));
    }
    if h > 2 {
        edges.push(Rectangle::new(x, y + 1, 1, h - 2));
        if w > 1 {
            edges.push(Rectangle::new(x + w - 1, y + 1, 1, h - 2));
        }
    }
    edges
}

#[must_use]
pub fn draw_rectangle(shape: RectShape, rect: &Rectangle) -> VertexBatch {
    rectangles(shape, &outline_edges(rect))
}

/// Several rectangles as one primitive.
#[must_use]
pub fn rectangles(shape: RectShape, rects: &[Rectangle]) -> VertexBatch {
    let corners = if shape == RectShape::QuadList { 4 } else { 3 };
    let mut batch = VertexBatch::with_capacity(shape.prim(), VertexLayout::Xy, rects.len() * corners);
    for rect in rects {
        shape.push(&mut batch, rect);
    }
    batch
}

#[must_use]
pub fn draw_line(line: &Region) -> VertexBatch {
    let mut batch = VertexBatch::new(PrimType::LineList, VertexLayout::Xy);
    batch.push(&[line.x1 as f32, line.y1 as f32]);
    batch.push(&[line.x2 as f32, line.y2 as f32]);
    batch
}

#[must_use]
pub fn fill_triangle(tri: &Triangle) -> VertexBatch {
    let mut batch = VertexBatch::new(PrimType::TriangleList, VertexLayout::Xy);
    batch.push(&[tri.x1 as f32, tri.y1 as f32]);
    batch.push(&[tri.x2 as f32, tri.y2 as f32]);
    batch.push(&[tri.x3 as f32, tri.y3 as f32]);
    batch
}

/// Map `src` onto `dst`. Source coordinates are multiplied by `scale`
/// (`1.0` for texel addressing, `1/size` for normalized). With `rotate`
/// each destination corner samples the diagonally opposite source corner.
#[must_use]
pub fn stretch_blit(shape: RectShape, src: &Rectangle, dst: &Rectangle, rotate: bool, scale: (f32, f32)) -> VertexBatch {
    let (dx1, dy1) = (dst.x as f32, dst.y as f32);
    let (dx2, dy2) = ((dst.x + dst.w) as f32, (dst.y + dst.h) as f32);
    let (mut sx1, mut sy1) = (src.x as f32 * scale.0, src.y as f32 * scale.1);
    let (mut sx2, mut sy2) = ((src.x + src.w) as f32 * scale.0, (src.y + src.h) as f32 * scale.1);
    if rotate {
        std::mem::swap(&mut sx1, &mut sx2);
        std::mem::swap(&mut sy1, &mut sy2);
    }

    let mut batch = VertexBatch::new(shape.prim(), VertexLayout::XySt);
    batch.push(&[dx1, dy1, sx1, sy1]);
    batch.push(&[dx2, dy1, sx2, sy1]);
    batch.push(&[dx2, dy2, sx2, sy2]);
    if shape == RectShape::QuadList {
        batch.push(&[dx1, dy2, sx1, sy2]);
    }
    batch
}

/// Caller-supplied vertices; `s`/`t` are multiplied by `scale`.
#[must_use]
pub fn texture_triangles(vertices: &[Vertex], formation: TriangleFormation, scale: (f32, f32)) -> VertexBatch {
    let prim = match formation {
        TriangleFormation::List => PrimType::TriangleList,
        TriangleFormation::Strip => PrimType::TriangleStrip,
        TriangleFormation::Fan => PrimType::TriangleFan,
    };
    let mut batch = VertexBatch::with_capacity(prim, VertexLayout::XyzwSt, vertices.len());
    for v in vertices {
        batch.push(&[v.x, v.y, v.z, v.w, v.s * scale.0, v.t * scale.1]);
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pixel_fill_is_a_point() {
        let batch = fill_rectangle(RectShape::RectangleList, &Rectangle::new(5, 5, 1, 1));
        assert_eq!(batch.prim, PrimType::PointList);
        assert_eq!(batch.words(), &[5.0, 5.0]);
    }

    #[test]
    fn rectangle_list_uses_three_corners() {
        let batch = fill_rectangle(RectShape::RectangleList, &Rectangle::new(1, 2, 3, 4));
        assert_eq!(batch.words(), &[1.0, 2.0, 4.0, 2.0, 4.0, 6.0]);
        let quad = fill_rectangle(RectShape::QuadList, &Rectangle::new(1, 2, 3, 4));
        assert_eq!(quad.vertex_count(), 4);
    }

    #[test]
    fn outline_is_twelve_vertices_on_fixed_function() {
        let batch = draw_rectangle(RectShape::RectangleList, &Rectangle::new(0, 0, 10, 10));
        assert_eq!(batch.vertex_count(), 12);
        let quads = draw_rectangle(RectShape::QuadList, &Rectangle::new(0, 0, 10, 10));
        assert_eq!(quads.vertex_count(), 16);
    }

    #[test]
    fn outline_edges_do_not_overlap() {
        let edges = outline_edges(&Rectangle::new(2, 3, 5, 4));
        let mut pixels = Vec::new();
        for e in &edges {
            for y in e.y..e.y + e.h {
                for x in e.x..e.x + e.w {
                    pixels.push((x, y));
                }
            }
        }
        let count = pixels.len();
        pixels.sort_unstable();
        pixels.dedup();
        assert_eq!(pixels.len(), count);
        assert_eq!(count, 2 * 5 + 2 * 2);
    }

    #[test]
    fn thin_outlines_degenerate_cleanly() {
        assert_eq!(outline_edges(&Rectangle::new(0, 0, 4, 1)).len(), 1);
        assert_eq!(outline_edges(&Rectangle::new(0, 0, 4, 2)).len(), 2);
        assert_eq!(outline_edges(&Rectangle::new(0, 0, 1, 5)).len(), 3);
        assert!(outline_edges(&Rectangle::new(0, 0, 0, 5)).is_empty());
    }

    #[test]
    fn rotation_swaps_source_diagonal() {
        let src = Rectangle::new(0, 0, 10, 10);
        let dst = Rectangle::new(20, 20, 10, 10);
        let plain = stretch_blit(RectShape::RectangleList, &src, &dst, false, (1.0, 1.0));
        let rotated = stretch_blit(RectShape::RectangleList, &src, &dst, true, (1.0, 1.0));
        assert_eq!(&plain.words()[0..4], &[20.0, 20.0, 0.0, 0.0]);
        assert_eq!(&rotated.words()[0..4], &[20.0, 20.0, 10.0, 10.0]);
        assert_eq!(&rotated.words()[8..12], &[30.0, 30.0, 0.0, 0.0]);
    }

    #[test]
    fn texcoords_are_scaled() {
        let v = Vertex {
            x: 1.0,
            y: 2.0,
            z: 0.0,
            w: 1.0,
            s: 0.5,
            t: 0.25,
        };
        let batch = texture_triangles(&[v; 3], TriangleFormation::Fan, (64.0, 32.0));
        assert_eq!(batch.prim, PrimType::TriangleFan);
        assert_eq!(&batch.words()[0..6], &[1.0, 2.0, 0.0, 1.0, 32.0, 8.0]);
    }
}

//! Vertex batches streamed through the vertex port.

use radeon_registers::common::PrimType;

/// Per-vertex components, in port order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexLayout {
    /// `x, y`
    Xy,
    /// `x, y, s, t`
    XySt,
    /// `x, y, z, w, s, t`
    XyzwSt,
}

impl VertexLayout {
    /// Words per vertex.
    #[must_use]
    pub const fn stride(self) -> usize {
        match self {
            Self::Xy => 2,
            Self::XySt => 4,
            Self::XyzwSt => 6,
        }
    }

    /// Word index of `s`, if present.
    const fn st_index(self) -> Option<usize> {
        match self {
            Self::Xy => None,
            Self::XySt => Some(2),
            Self::XyzwSt => Some(4),
        }
    }
}

/// One primitive group ready for emission.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBatch {
    pub prim: PrimType,
    pub layout: VertexLayout,
    data: Vec<f32>,
}

impl VertexBatch {
    #[must_use]
    pub fn new(prim: PrimType, layout: VertexLayout) -> Self {
        Self {
            prim,
            layout,
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(prim: PrimType, layout: VertexLayout, vertices: usize) -> Self {
        Self {
            prim,
            layout,
            data: Vec::with_capacity(vertices * layout.stride()),
        }
    }

    /// Append one vertex; `words` must match the layout.
    pub fn push(&mut self, words: &[f32]) {
        assert_eq!(words.len(), self.layout.stride(), "vertex does not match {:?}", self.layout);
        self.data.extend_from_slice(words);
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.layout.stride()
    }

    #[must_use]
    pub fn words(&self) -> &[f32] {
        &self.data
    }

    /// The same primitives on a half-resolution plane.
    ///
    /// Within each primitive, a coordinate on the primitive's leading edge
    /// rounds down and any other coordinate rounds up, so the halved
    /// primitive always covers the chroma samples of every luma pixel the
    /// original covered. Texture coordinates are halved exactly when
    /// `halve_texcoords` is set (texel-space addressing of a half-size
    /// plane).
    #[must_use]
    pub fn halved(&self, halve_texcoords: bool) -> Self {
        let stride = self.layout.stride();
        let group = self.prim.group_size().unwrap_or_else(|| self.vertex_count().max(1)) * stride;
        let mut data = Vec::with_capacity(self.data.len());

        for prim in self.data.chunks(group) {
            let min = |axis: usize| {
                prim.chunks(stride)
                    .map(|v| v[axis])
                    .fold(f32::INFINITY, f32::min)
            };
            let (min_x, min_y) = (min(0), min(1));

            for v in prim.chunks(stride) {
                let mut out = v.to_vec();
                out[0] = halve(v[0], min_x);
                out[1] = halve(v[1], min_y);
                if let (true, Some(st)) = (halve_texcoords, self.layout.st_index()) {
                    out[st] *= 0.5;
                    out[st + 1] *= 0.5;
                }
                data.extend_from_slice(&out);
            }
        }

        Self {
            prim: self.prim,
            layout: self.layout,
            data,
        }
    }
}

fn halve(value: f32, leading: f32) -> f32 {
    if value <= leading {
        (value / 2.0).floor()
    } else {
        (value / 2.0).ceil()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, w: f32, h: f32) -> VertexBatch {
        let mut batch = VertexBatch::new(PrimType::RectangleList, VertexLayout::Xy);
        batch.push(&[x, y]);
        batch.push(&[x + w, y]);
        batch.push(&[x + w, y + h]);
        batch
    }

    #[test]
    fn even_rectangle_halves_exactly() {
        let half = rect(10.0, 20.0, 8.0, 6.0).halved(false);
        assert_eq!(half.words(), &[5.0, 10.0, 9.0, 10.0, 9.0, 13.0]);
    }

    #[test]
    fn odd_extents_round_outwards() {
        let half = rect(3.0, 1.0, 3.0, 1.0).halved(false);
        // x: 3 -> 1, 6 -> 3; y: 1 -> 0, 2 -> 1
        assert_eq!(half.words(), &[1.0, 0.0, 3.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn groups_are_halved_independently() {
        let mut batch = rect(0.0, 0.0, 4.0, 4.0);
        batch.push(&[5.0, 5.0]);
        batch.push(&[7.0, 5.0]);
        batch.push(&[7.0, 7.0]);
        let half = batch.halved(false);
        assert_eq!(&half.words()[6..], &[2.0, 2.0, 4.0, 2.0, 4.0, 4.0]);
    }

    #[test]
    fn texcoords_scale_only_when_asked() {
        let mut batch = VertexBatch::new(PrimType::QuadList, VertexLayout::XySt);
        for (x, y) in [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)] {
            batch.push(&[x, y, x, y]);
        }
        assert_eq!(batch.halved(false).words()[8..12], [2.0, 2.0, 4.0, 4.0]);
        assert_eq!(batch.halved(true).words()[8..12], [2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "vertex does not match")]
    fn push_rejects_wrong_stride() {
        VertexBatch::new(PrimType::PointList, VertexLayout::XySt).push(&[1.0, 2.0]);
    }
}

//! Planar 4:2:0 decomposition.
//!
//! A primitive aimed at a planar destination is drawn three times: once on
//! the luma plane, then, halved, on the Cb and Cr planes. The chroma passes
//! reuse the luma vertex data rather than recomputing it from the request,
//! and the luma configuration is restored before returning so the valid
//! state still describes the registers.

use crate::context::{Bus, Context};
use crate::error::AccelError;
use crate::gen::Generation;
use crate::state::Category;
use crate::surface::PixelFormat;
use crate::vertex::VertexBatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Luma,
    Cb,
    Cr,
}

/// Device addresses of the Cb and Cr planes that follow a luma plane of
/// `height` rows; `(0, 0)` for non-planar formats.
#[must_use]
pub fn plane_offsets(format: PixelFormat, offset: u32, pitch: u32, height: u32) -> (u32, u32) {
    if !format.is_planar() {
        return (0, 0);
    }
    let first = offset + pitch * height;
    let second = first + (pitch / 2) * (height / 2);
    if format == PixelFormat::Yv12 {
        (second, first)
    } else {
        (first, second)
    }
}

/// Emit `batch`, repeating it on the chroma planes of a planar destination,
/// then close the primitive group.
///
/// # Errors
/// Propagates FIFO failures; a hang mid-sequence leaves the planes partially
/// drawn.
pub fn emit<B: Bus, G: Generation>(ctx: &mut Context<B>, batch: &VertexBatch) -> Result<(), AccelError> {
    G::emit(ctx, batch)?;

    if ctx.hw.dst_format().is_some_and(PixelFormat::is_planar) {
        let planar_source = ctx.valid.category() == Some(Category::Blitting)
            && ctx.hw.src.is_some_and(|s| s.format.is_planar());
        let chroma = batch.halved(G::PIXEL_TEXCOORDS && planar_source);
        for plane in [Plane::Cb, Plane::Cr] {
            G::select_plane(ctx, plane)?;
            G::emit(ctx, &chroma)?;
        }
        G::select_plane(ctx, Plane::Luma)?;
    }

    G::finish_group(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i420_planes_follow_luma() {
        let (cb, cr) = plane_offsets(PixelFormat::I420, 0x1000, 64, 48);
        assert_eq!(cb, 0x1000 + 64 * 48);
        assert_eq!(cr, cb + 32 * 24);
    }

    #[test]
    fn yv12_swaps_chroma_planes() {
        let (i_cb, i_cr) = plane_offsets(PixelFormat::I420, 0, 64, 48);
        let (y_cb, y_cr) = plane_offsets(PixelFormat::Yv12, 0, 64, 48);
        assert_eq!((y_cb, y_cr), (i_cr, i_cb));
    }

    #[test]
    fn packed_formats_have_no_planes() {
        assert_eq!(plane_offsets(PixelFormat::Yuy2, 0x1000, 64, 48), (0, 0));
    }
}

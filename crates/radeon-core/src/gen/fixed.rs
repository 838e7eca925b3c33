//! Register programming shared by the fixed-function engines (R100, R200).
//! They differ in the texture and combiner banks, not in the render backend.

use radeon_registers::r100::{
    BlendCntlReg, ColorFormat, Rb3dCntl, Rb3dCntlReg, Rop, TexFormat, RB3D_BLENDCNTL, RB3D_CNTL, RB3D_COLOROFFSET,
    RB3D_COLORPITCH, RB3D_ROPCNTL, RE_TOP_LEFT, RE_WIDTH_HEIGHT,
};
use radeon_registers::{Register, YxReg};

use super::common;
use crate::context::{Bus, Context, DstState, SrcState};
use crate::error::AccelError;
use crate::geometry::Region;
use crate::planar::Plane;
use crate::state::{BlendFactor, Category};
use crate::surface::PixelFormat;

/// Registers of one texture unit.
pub struct TexUnit {
    pub format: u32,
    pub filter: u32,
    pub offset: u32,
    pub size: u32,
    pub pitch: u32,
}

impl TexUnit {
    /// Size, pitch and offset of a `width` x `height` image.
    pub fn extent(&self, offset: u32, width: u32, height: u32, pitch: u32) -> [(u32, u32); 3] {
        [
            (self.offset, offset),
            (self.size, tex_size(width, height)),
            (self.pitch, pitch.saturating_sub(32)),
        ]
    }
}

/// Texture size register: `w - 1` and `h - 1` in 16-bit halves.
#[must_use]
pub fn tex_size(width: u32, height: u32) -> u32 {
    YxReg::new(width.saturating_sub(1) as i32, height.saturating_sub(1) as i32).to_raw()
}

/// Colour buffer format for a destination.
#[must_use]
pub fn color_format(format: PixelFormat) -> ColorFormat {
    match format {
        PixelFormat::A8 | PixelFormat::Lut8 | PixelFormat::Alut44 | PixelFormat::I420 | PixelFormat::Yv12 => {
            ColorFormat::Rgb8
        }
        PixelFormat::Rgb332 => ColorFormat::Rgb332,
        PixelFormat::Argb1555 | PixelFormat::Rgb555 => ColorFormat::Argb1555,
        PixelFormat::Argb4444 | PixelFormat::Rgb444 => ColorFormat::Argb4444,
        PixelFormat::Rgb16 => ColorFormat::Rgb565,
        PixelFormat::Rgb32 | PixelFormat::Argb => ColorFormat::Argb8888,
        PixelFormat::Ayuv => ColorFormat::Ayuv444,
        PixelFormat::Yuy2 => ColorFormat::YuvYvyu,
        PixelFormat::Uyvy => ColorFormat::YuvVyuy,
    }
}

/// How a source is bound to a texture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexBinding {
    pub format: TexFormat,
    pub alpha: bool,
    pub yuv_to_rgb: bool,
}

/// Texel format for sampling `src` into a `dst` colour buffer.
///
/// Packed 4:2:2 copied into packed 4:2:2 moves raw pixel pairs; any other
/// YCbCr source is converted while sampling.
#[must_use]
pub fn tex_binding(src: PixelFormat, dst: PixelFormat) -> TexBinding {
    let pairs = src.is_packed_422() && dst.is_packed_422();
    let format = match src {
        PixelFormat::A8 | PixelFormat::Lut8 | PixelFormat::Alut44 => TexFormat::I8,
        PixelFormat::Rgb332 => TexFormat::Rgb332,
        PixelFormat::Argb1555 | PixelFormat::Rgb555 => TexFormat::Argb1555,
        PixelFormat::Argb4444 | PixelFormat::Rgb444 => TexFormat::Argb4444,
        PixelFormat::Rgb16 => TexFormat::Rgb565,
        PixelFormat::Rgb32 | PixelFormat::Argb => TexFormat::Argb8888,
        PixelFormat::Yuy2 | PixelFormat::Uyvy if pairs => TexFormat::Argb8888,
        PixelFormat::Yuy2 => TexFormat::Yvyu422,
        PixelFormat::Uyvy => TexFormat::Vyuy422,
        PixelFormat::I420 | PixelFormat::Yv12 => TexFormat::Y8,
        PixelFormat::Ayuv => unreachable!("AYUV is not sampled by fixed-function engines"),
    };
    TexBinding {
        format,
        alpha: src.has_alpha() || pairs,
        yuv_to_rgb: src.is_packed_422() && !pairs,
    }
}

/// Render backend enables for the requested blend and XOR state.
#[must_use]
pub fn render_flags(blend: bool, xor: bool) -> Rb3dCntl {
    let mut flags = Rb3dCntl::empty();
    flags.set(Rb3dCntl::ALPHA_BLEND_ENABLE, blend);
    flags.set(Rb3dCntl::ROP_ENABLE, xor);
    flags
}

/// RB3D_CNTL and RB3D_ROPCNTL for `flags`, recorded in the mirror.
pub fn render_writes<B>(ctx: &mut Context<B>, flags: Rb3dCntl) -> [(u32, u32); 2] {
    ctx.hw.rb3d_flags = flags.bits();
    let format = color_format(ctx.hw.dst().format);
    let rop = if flags.contains(Rb3dCntl::ROP_ENABLE) { Rop::Xor } else { Rop::Copy };
    [
        (RB3D_CNTL, Rb3dCntlReg::new(format, flags).to_raw()),
        (RB3D_ROPCNTL, rop.to_raw()),
    ]
}

pub fn set_destination<B: Bus>(ctx: &mut Context<B>, dst: &DstState) -> Result<(), AccelError> {
    let cntl = Rb3dCntlReg::new(color_format(dst.format), Rb3dCntl::from_bits_truncate(ctx.hw.rb3d_flags));
    let [a, b, c] = common::destination_2d(dst);
    ctx.mmio.submit(&[
        a,
        b,
        c,
        (RB3D_CNTL, cntl.to_raw()),
        (RB3D_COLOROFFSET, dst.offset),
        (RB3D_COLORPITCH, common::color_pitch_pixels(dst.format, dst.pitch)),
    ])
}

/// Rasteriser clip in colour buffer units.
fn re_clip(clip: &Region) -> [(u32, u32); 2] {
    [
        (RE_TOP_LEFT, YxReg::new(clip.x1, clip.y1).to_raw()),
        (RE_WIDTH_HEIGHT, YxReg::new(clip.x2, clip.y2).to_raw()),
    ]
}

pub fn set_clip<B: Bus>(ctx: &mut Context<B>, clip: &Region) -> Result<(), AccelError> {
    let storage = common::storage_clip(ctx.hw.dst().format, clip);
    let [a, b] = common::clip_2d(&storage);
    let [c, d] = re_clip(&storage);
    ctx.mmio.submit(&[a, b, c, d])?;
    ctx.hw.clip = *clip;
    Ok(())
}

pub fn set_blend_function<B: Bus>(ctx: &mut Context<B>, src: BlendFactor, dst: BlendFactor) -> Result<(), AccelError> {
    let alpha = ctx.hw.dst().format.has_alpha();
    let cntl = BlendCntlReg::new(src.code(alpha), dst.code(alpha));
    ctx.mmio.submit(&[(RB3D_BLENDCNTL, cntl.to_raw())])?;
    ctx.hw.blend = cntl.to_raw();
    Ok(())
}

/// Retarget the colour buffer, and a planar source, at one plane.
///
/// The Cr pass only moves base addresses; it always follows Cb, whose pitch
/// and clip it shares.
pub fn select_plane<B: Bus>(ctx: &mut Context<B>, plane: Plane, tfactor: u32, unit: &TexUnit) -> Result<(), AccelError> {
    let dst = ctx.hw.dst();
    let category = ctx.valid.category();
    let src: Option<SrcState> = ctx.hw.src.filter(|s| category == Some(Category::Blitting) && s.format.is_planar());

    let (offset, pitch, clip, constant) = match plane {
        Plane::Luma => (dst.offset, dst.pitch, ctx.hw.clip, ctx.hw.plane_colors[0]),
        Plane::Cb => (dst.cb_offset, dst.pitch / 2, ctx.hw.clip.halved(), ctx.hw.plane_colors[1]),
        Plane::Cr => (dst.cr_offset, dst.pitch / 2, ctx.hw.clip.halved(), ctx.hw.plane_colors[2]),
    };

    let mut writes: heapless::Vec<(u32, u32), 12> = heapless::Vec::new();
    writes.extend([(RB3D_COLOROFFSET, offset)]);
    if plane != Plane::Cr {
        writes.extend([(RB3D_COLORPITCH, pitch)]);
        writes.extend(re_clip(&clip));
    }
    if category == Some(Category::Drawing) {
        writes.extend([(tfactor, constant)]);
    }
    if let Some(src) = src {
        let (w, h) = common::chroma_size(&src);
        match plane {
            Plane::Luma => writes.extend(unit.extent(src.offset, src.width, src.height, src.pitch)),
            Plane::Cb => writes.extend(unit.extent(src.cb_offset, w, h, src.pitch / 2)),
            Plane::Cr => writes.extend([(unit.offset, src.cr_offset)]),
        }
    }
    ctx.mmio.submit(&writes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tex_size_packs_last_texel() {
        assert_eq!(tex_size(64, 32), (31 << 16) | 63);
        assert_eq!(tex_size(0, 0), 0);
    }

    #[test]
    fn packed_pairs_copy_raw() {
        let b = tex_binding(PixelFormat::Yuy2, PixelFormat::Uyvy);
        assert_eq!(b.format, TexFormat::Argb8888);
        assert!(!b.yuv_to_rgb);

        let b = tex_binding(PixelFormat::Yuy2, PixelFormat::Rgb32);
        assert_eq!(b.format, TexFormat::Yvyu422);
        assert!(b.yuv_to_rgb);
    }

    #[test]
    fn planar_sources_sample_one_plane() {
        let b = tex_binding(PixelFormat::Yv12, PixelFormat::I420);
        assert_eq!(b.format, TexFormat::Y8);
        assert!(!b.yuv_to_rgb);
    }

    #[test]
    fn render_flags_follow_request() {
        assert_eq!(render_flags(true, false), Rb3dCntl::ALPHA_BLEND_ENABLE);
        assert_eq!(render_flags(false, true), Rb3dCntl::ROP_ENABLE);
        assert!(render_flags(false, false).is_empty());
    }
}

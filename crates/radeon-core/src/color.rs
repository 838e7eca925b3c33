//! Colour conversion into native pixel encodings.

use crate::state::BlittingFlags;
use crate::surface::PixelFormat;

/// 8-bit per channel colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Colour channels scaled by alpha.
    #[must_use]
    pub const fn premultiplied(self) -> Self {
        let a = self.a as u32 + 1;
        Self {
            a: self.a,
            r: ((self.r as u32 * a) >> 8) as u8,
            g: ((self.g as u32 * a) >> 8) as u8,
            b: ((self.b as u32 * a) >> 8) as u8,
        }
    }

    /// BT.601 studio-range Y, Cb, Cr.
    #[must_use]
    pub const fn to_ycbcr(self) -> (u8, u8, u8) {
        let (r, g, b) = (self.r as i32, self.g as i32, self.b as i32);
        let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
        let cb = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
        let cr = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
        (y as u8, cb as u8, cr as u8)
    }

    /// `A[31:24] R[23:16] G[15:8] B[7:0]`.
    #[must_use]
    pub const fn argb(self) -> u32 {
        argb(self.a, self.r, self.g, self.b)
    }
}

const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Encode `color` (or palette `index`) as a pixel of `format`.
///
/// Planar formats yield the luma sample.
#[must_use]
pub fn pack(format: PixelFormat, color: Color, index: u8) -> u32 {
    let Color { a, r, g, b } = color;
    let (a, r, g, b) = (u32::from(a), u32::from(r), u32::from(g), u32::from(b));
    match format {
        PixelFormat::A8 => a,
        PixelFormat::Lut8 => u32::from(index),
        PixelFormat::Alut44 => (a & 0xf0) | (u32::from(index) & 0x0f),
        PixelFormat::Rgb332 => (r & 0xe0) | ((g & 0xe0) >> 3) | (b >> 6),
        PixelFormat::Argb1555 => ((a >> 7) << 15) | ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3),
        PixelFormat::Rgb555 => ((r >> 3) << 10) | ((g >> 3) << 5) | (b >> 3),
        PixelFormat::Argb4444 => ((a >> 4) << 12) | ((r >> 4) << 8) | (g & 0xf0) | (b >> 4),
        PixelFormat::Rgb444 => ((r >> 4) << 8) | (g & 0xf0) | (b >> 4),
        PixelFormat::Rgb16 => ((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3),
        PixelFormat::Rgb32 => (r << 16) | (g << 8) | b,
        PixelFormat::Argb => (a << 24) | (r << 16) | (g << 8) | b,
        PixelFormat::Ayuv => {
            let (y, cb, cr) = color.to_ycbcr();
            argb(color.a, y, cb, cr)
        }
        PixelFormat::Yuy2 => {
            let (y, cb, cr) = color.to_ycbcr();
            let (y, cb, cr) = (u32::from(y), u32::from(cb), u32::from(cr));
            y | (cb << 8) | (y << 16) | (cr << 24)
        }
        PixelFormat::Uyvy => {
            let (y, cb, cr) = color.to_ycbcr();
            let (y, cb, cr) = (u32::from(y), u32::from(cb), u32::from(cr));
            cb | (y << 8) | (cr << 16) | (y << 24)
        }
        PixelFormat::I420 | PixelFormat::Yv12 => u32::from(color.to_ycbcr().0),
    }
}

/// Constant colour as the 3D engine consumes it, ARGB ordered, for rendering
/// into `format`.
///
/// 8-bit destinations receive their sample in every colour channel; YCbCr
/// destinations carry Y, Cb, Cr in the R, G, B slots.
#[must_use]
pub fn constant(format: PixelFormat, color: Color, index: u8) -> u32 {
    match format {
        PixelFormat::A8 => argb(color.a, color.a, color.a, color.a),
        PixelFormat::Lut8 | PixelFormat::Alut44 => {
            let v = pack(format, color, index) as u8;
            argb(color.a, v, v, v)
        }
        PixelFormat::Ayuv | PixelFormat::Yuy2 | PixelFormat::Uyvy => {
            let (y, cb, cr) = color.to_ycbcr();
            argb(color.a, y, cb, cr)
        }
        PixelFormat::I420 | PixelFormat::Yv12 => plane_constants(color)[0],
        _ => color.argb(),
    }
}

/// Per-plane constants for planar destinations: Y, Cb, Cr, each replicated
/// across the colour channels.
#[must_use]
pub fn plane_constants(color: Color) -> [u32; 3] {
    let (y, cb, cr) = color.to_ycbcr();
    [
        argb(color.a, y, y, y),
        argb(color.a, cb, cb, cb),
        argb(color.a, cr, cr, cr),
    ]
}

/// Modulation constant for a blit under `flags`.
///
/// RGB holds the colorize colour, scaled by the constant alpha for
/// `SRC_PREMULTCOLOR`; alpha holds the constant alpha for
/// `BLEND_COLORALPHA`. Channels no flag asks for are one, so a single
/// multiply by the constant applies any combination.
#[must_use]
pub fn blit_modulation(color: Color, flags: BlittingFlags) -> Color {
    let rgb = |c: u8| {
        let c = if flags.contains(BlittingFlags::COLORIZE) { c } else { 0xff };
        if flags.contains(BlittingFlags::SRC_PREMULTCOLOR) {
            scale(c, color.a)
        } else {
            c
        }
    };
    Color {
        a: if flags.contains(BlittingFlags::BLEND_COLORALPHA) { color.a } else { 0xff },
        r: rgb(color.r),
        g: rgb(color.g),
        b: rgb(color.b),
    }
}

/// `c * k` with both in 0..=255 as fractions of one.
#[must_use]
pub const fn scale(c: u8, k: u8) -> u8 {
    (c as u32 * k as u32 / 0xff) as u8
}

/// Channel mask for colour-key comparison of `format` pixels; alpha never
/// takes part.
#[must_use]
pub fn key_mask(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Argb1555 | PixelFormat::Rgb555 => 0x7fff,
        PixelFormat::Argb4444 | PixelFormat::Rgb444 => 0x0fff,
        PixelFormat::Rgb32 | PixelFormat::Argb | PixelFormat::Ayuv => 0x00ff_ffff,
        PixelFormat::Alut44 => 0x0f,
        format => (1u32 << (format.bytes_per_pixel() * 8)) - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_rounds_down() {
        let c = Color::new(0x80, 0xff, 0x40, 0x00).premultiplied();
        assert_eq!(c, Color::new(0x80, 0x80, 0x20, 0x00));
        let opaque = Color::new(0xff, 0x12, 0x34, 0x56);
        assert_eq!(opaque.premultiplied(), opaque);
    }

    #[test]
    fn blit_modulation_composes_flags() {
        let c = Color::new(0x80, 0xff, 0x40, 0x00);
        assert_eq!(blit_modulation(c, BlittingFlags::empty()).argb(), 0xffff_ffff);
        assert_eq!(blit_modulation(c, BlittingFlags::COLORIZE).argb(), 0xffff_4000);
        assert_eq!(blit_modulation(c, BlittingFlags::SRC_PREMULTCOLOR).argb(), 0xff80_8080);
        assert_eq!(
            blit_modulation(c, BlittingFlags::COLORIZE | BlittingFlags::SRC_PREMULTCOLOR).argb(),
            0xff80_2000
        );
        assert_eq!(blit_modulation(c, BlittingFlags::BLEND_COLORALPHA).argb(), 0x80ff_ffff);
    }

    #[test]
    fn ycbcr_of_extremes() {
        assert_eq!(Color::new(0xff, 0xff, 0xff, 0xff).to_ycbcr(), (235, 128, 128));
        assert_eq!(Color::new(0xff, 0, 0, 0).to_ycbcr(), (16, 128, 128));
        let (y, cb, cr) = Color::new(0xff, 0xff, 0, 0).to_ycbcr();
        assert_eq!(y, 82);
        assert!(cb < 128 && cr > 200);
    }

    #[test]
    fn pack_16bit_formats() {
        let c = Color::new(0xff, 0xff, 0x80, 0x08);
        assert_eq!(pack(PixelFormat::Rgb16, c, 0), 0xfc01);
        assert_eq!(pack(PixelFormat::Argb1555, c, 0), 0xfe01);
        assert_eq!(pack(PixelFormat::Argb4444, c, 0), 0xff80);
    }

    #[test]
    fn pack_packed_422_duplicates_luma() {
        let white = Color::new(0xff, 0xff, 0xff, 0xff);
        assert_eq!(pack(PixelFormat::Yuy2, white, 0), 0x80eb_80eb);
        assert_eq!(pack(PixelFormat::Uyvy, white, 0), 0xeb80_eb80);
    }

    #[test]
    fn planar_constants_replicate_channels() {
        let [y, cb, cr] = plane_constants(Color::new(0x40, 0xff, 0xff, 0xff));
        assert_eq!(y, 0x40eb_ebeb);
        assert_eq!(cb, 0x4080_8080);
        assert_eq!(cr, 0x4080_8080);
    }

    #[test]
    fn indexed_constant_uses_palette_index() {
        let c = Color::new(0xf0, 0, 0, 0);
        assert_eq!(constant(PixelFormat::Lut8, c, 7), 0xf007_0707);
        assert_eq!(constant(PixelFormat::Alut44, c, 7), 0xf0f7_f7f7);
    }

    #[test]
    fn key_mask_ignores_alpha() {
        assert_eq!(key_mask(PixelFormat::Argb), 0x00ff_ffff);
        assert_eq!(key_mask(PixelFormat::Rgb16), 0xffff);
        assert_eq!(key_mask(PixelFormat::Lut8), 0xff);
    }
}

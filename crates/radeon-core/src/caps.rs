//! Capability negotiation.
//!
//! A pure decision over the requested operation, the formats and flags in
//! the state and the engine generation. Nothing that fails here ever reaches
//! a state programmer or emitter.

use radeon_registers::{r100, r300, Family};

use crate::config::DeviceConfig;
use crate::state::{Accel, AccelMask, BlendFactor, BlittingFlags, Category, DrawingFlags, OperationState};
use crate::surface::{PixelFormat, Storage, Surface};

/// Operations and flags accelerated for a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capability {
    pub accel: AccelMask,
    pub drawing_flags: DrawingFlags,
    pub blitting_flags: BlittingFlags,
}

impl Capability {
    /// Nothing accelerated; the host falls back to software.
    pub const NONE: Self = Self {
        accel: AccelMask::empty(),
        drawing_flags: DrawingFlags::empty(),
        blitting_flags: BlittingFlags::empty(),
    };

    #[must_use]
    pub fn supports(&self, accel: Accel) -> bool {
        self.accel.contains(accel.mask())
    }

    /// Everything the generation can do on an unrestricted RGB destination.
    fn full(family: Family) -> Self {
        let common = BlittingFlags::BLEND_ALPHACHANNEL
            | BlittingFlags::BLEND_COLORALPHA
            | BlittingFlags::COLORIZE
            | BlittingFlags::SRC_PREMULTCOLOR
            | BlittingFlags::XOR
            | BlittingFlags::ROTATE180
            | BlittingFlags::DEINTERLACE;
        let blitting_flags = match family {
            Family::R100 => common | BlittingFlags::SRC_COLORKEY,
            Family::R200 => common | BlittingFlags::SRC_COLORKEY | BlittingFlags::SRC_PREMULTIPLY,
            Family::R300 => common | BlittingFlags::SRC_PREMULTIPLY,
        };
        Self {
            accel: AccelMask::DRAWING | AccelMask::BLITTING,
            drawing_flags: DrawingFlags::all(),
            blitting_flags,
        }
    }
}

/// Largest source surface the generation can bind.
#[must_use]
pub fn max_texture_size(family: Family) -> u32 {
    match family {
        Family::R100 | Family::R200 => r100::MAX_TEXTURE_SIZE,
        Family::R300 => r300::MAX_TEXTURE_SIZE,
    }
}

fn reachable(config: &DeviceConfig, surface: &Surface) -> bool {
    surface.storage == Storage::Video || config.aux_offset.is_some()
}

/// Formats a generation can sample.
fn samples(family: Family, format: PixelFormat) -> bool {
    match format {
        // No AYUV texel layout on the fixed-function samplers.
        PixelFormat::Ayuv => family == Family::R300,
        _ => true,
    }
}

/// Decide what can be accelerated for `accel` under `state`.
#[must_use]
pub fn negotiate(family: Family, config: &DeviceConfig, state: &OperationState, accel: Accel) -> Capability {
    let dst = &state.destination;
    if !reachable(config, dst) {
        log::debug!("{accel:?}: destination in unreachable auxiliary memory");
        return Capability::NONE;
    }

    let mut cap = Capability::full(family);
    let format = dst.format;
    if format.is_indexed() {
        cap.accel = AccelMask::DRAWING | AccelMask::BLIT;
        cap.drawing_flags = DrawingFlags::empty();
        cap.blitting_flags = BlittingFlags::empty();
    } else if format.is_packed_422() {
        cap.accel = (AccelMask::DRAWING | AccelMask::BLITTING)
            - AccelMask::FILL_TRIANGLE
            - AccelMask::DRAW_LINE
            - AccelMask::TEXTURE_TRIANGLES;
        cap.drawing_flags = DrawingFlags::XOR;
        cap.blitting_flags &= BlittingFlags::SRC_COLORKEY | BlittingFlags::XOR;
    } else if format.is_planar() {
        cap.accel -= AccelMask::TEXTURE_TRIANGLES;
        cap.drawing_flags = DrawingFlags::XOR;
        cap.blitting_flags &= BlittingFlags::XOR | BlittingFlags::DEINTERLACE | BlittingFlags::ROTATE180;
    }

    if !cap.supports(accel) {
        log::debug!("{accel:?} not accelerated for {format:?} destinations");
        return Capability::NONE;
    }

    match accel.category() {
        Category::Drawing => {
            if !cap.drawing_flags.contains(state.drawing_flags) {
                log::debug!("drawing flags {:?} not supported", state.drawing_flags - cap.drawing_flags);
                return Capability::NONE;
            }
            if state.drawing_flags.contains(DrawingFlags::BLEND) && state.dst_blend == BlendFactor::SrcAlphaSat {
                return Capability::NONE;
            }
            cap.accel &= AccelMask::DRAWING;
        }
        Category::Blitting => {
            let Some(src) = state.source.as_ref() else {
                return Capability::NONE;
            };
            if !source_compatible(family, config, dst, src) {
                log::debug!("{:?} source not accelerated into {format:?}", src.format);
                return Capability::NONE;
            }
            let flags = state.blitting_flags;
            if !cap.blitting_flags.contains(flags) {
                log::debug!("blitting flags {:?} not supported", flags - cap.blitting_flags);
                return Capability::NONE;
            }
            if flags.intersects(BlittingFlags::BLEND) && state.dst_blend == BlendFactor::SrcAlphaSat {
                return Capability::NONE;
            }
            cap.accel &= AccelMask::BLITTING;
        }
    }
    cap
}

fn source_compatible(family: Family, config: &DeviceConfig, dst: &Surface, src: &Surface) -> bool {
    let max = max_texture_size(family);
    if src.width == 0 || src.height == 0 || src.width > max || src.height > max {
        return false;
    }
    if !reachable(config, src) || !samples(family, src.format) {
        return false;
    }
    let (d, s) = (dst.format, src.format);
    if d.is_indexed() {
        s == d && dst.shares_palette(src)
    } else if d.is_packed_422() {
        s.is_packed_422()
    } else if d.is_planar() {
        s.is_planar()
    } else {
        !s.is_planar() && !s.is_indexed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BlendFactor;

    fn state(dst: PixelFormat, src: Option<PixelFormat>) -> OperationState {
        let mut state = OperationState::new(Surface::new(dst, 64, 64, 0, 256));
        state.source = src.map(|f| Surface::new(f, 32, 32, 0x10000, 128));
        state
    }

    #[test]
    fn rgb_destination_accepts_everything_drawn() {
        let cap = negotiate(Family::R100, &DeviceConfig::default(), &state(PixelFormat::Rgb16, None), Accel::FillTriangle);
        assert!(cap.supports(Accel::FillRectangle));
        assert!(cap.supports(Accel::DrawLine));
        assert!(!cap.supports(Accel::Blit));
    }

    #[test]
    fn indexed_destination_only_blits_same_palette() {
        let mut st = state(PixelFormat::Lut8, Some(PixelFormat::Lut8));
        let config = DeviceConfig::default();
        let cap = negotiate(Family::R200, &config, &st, Accel::Blit);
        assert!(cap.supports(Accel::Blit));
        assert!(!cap.supports(Accel::StretchBlit));

        st.drawing_flags = DrawingFlags::BLEND;
        assert_eq!(negotiate(Family::R200, &config, &st, Accel::FillRectangle), Capability::NONE);

        let palette: crate::surface::Palette = std::sync::Arc::from(vec![crate::Color::default(); 2]);
        st.source = st.source.map(|s| s.with_palette(palette));
        assert_eq!(negotiate(Family::R200, &config, &st, Accel::Blit), Capability::NONE);
    }

    #[test]
    fn packed_422_destination_is_restricted() {
        let config = DeviceConfig::default();
        let mut st = state(PixelFormat::Yuy2, Some(PixelFormat::Uyvy));
        assert_eq!(negotiate(Family::R100, &config, &st, Accel::DrawLine), Capability::NONE);
        assert_eq!(negotiate(Family::R100, &config, &st, Accel::TextureTriangles), Capability::NONE);

        st.blitting_flags = BlittingFlags::SRC_COLORKEY;
        let cap = negotiate(Family::R100, &config, &st, Accel::Blit);
        assert!(cap.supports(Accel::Blit));
        assert_eq!(cap.blitting_flags, BlittingFlags::SRC_COLORKEY | BlittingFlags::XOR);

        st.blitting_flags = BlittingFlags::COLORIZE;
        assert_eq!(negotiate(Family::R100, &config, &st, Accel::Blit), Capability::NONE);

        st.blitting_flags = BlittingFlags::empty();
        st.source = Some(Surface::new(PixelFormat::Argb, 8, 8, 0, 32));
        assert_eq!(negotiate(Family::R100, &config, &st, Accel::Blit), Capability::NONE);
    }

    #[test]
    fn planar_destination_needs_planar_source() {
        let config = DeviceConfig::default();
        let mut st = state(PixelFormat::I420, Some(PixelFormat::Yv12));
        st.blitting_flags = BlittingFlags::DEINTERLACE | BlittingFlags::ROTATE180;
        assert!(negotiate(Family::R300, &config, &st, Accel::StretchBlit).supports(Accel::StretchBlit));

        st.source = Some(Surface::new(PixelFormat::Rgb16, 8, 8, 0, 16));
        assert_eq!(negotiate(Family::R300, &config, &st, Accel::Blit), Capability::NONE);
    }

    #[test]
    fn colorkey_is_fixed_function_only() {
        let config = DeviceConfig::default();
        let mut st = state(PixelFormat::Argb, Some(PixelFormat::Rgb16));
        st.blitting_flags = BlittingFlags::SRC_COLORKEY;
        assert!(negotiate(Family::R100, &config, &st, Accel::Blit).supports(Accel::Blit));
        assert!(negotiate(Family::R200, &config, &st, Accel::Blit).supports(Accel::Blit));
        assert_eq!(negotiate(Family::R300, &config, &st, Accel::Blit), Capability::NONE);
    }

    #[test]
    fn premultiply_needs_r200_or_later() {
        let config = DeviceConfig::default();
        let mut st = state(PixelFormat::Argb, Some(PixelFormat::Argb));
        st.blitting_flags = BlittingFlags::SRC_PREMULTIPLY;
        assert_eq!(negotiate(Family::R100, &config, &st, Accel::Blit), Capability::NONE);
        assert!(negotiate(Family::R200, &config, &st, Accel::Blit).supports(Accel::Blit));
    }

    #[test]
    fn oversized_source_is_rejected() {
        let config = DeviceConfig::default();
        let mut st = state(PixelFormat::Argb, None);
        st.source = Some(Surface::new(PixelFormat::Argb, 4096, 16, 0, 16384));
        assert_eq!(negotiate(Family::R100, &config, &st, Accel::Blit), Capability::NONE);
        assert!(negotiate(Family::R300, &config, &st, Accel::Blit).supports(Accel::Blit));
    }

    #[test]
    fn saturate_is_not_a_destination_factor() {
        let config = DeviceConfig::default();
        let mut st = state(PixelFormat::Argb, None);
        st.drawing_flags = DrawingFlags::BLEND;
        st.dst_blend = BlendFactor::SrcAlphaSat;
        assert_eq!(negotiate(Family::R200, &config, &st, Accel::FillRectangle), Capability::NONE);
        st.src_blend = BlendFactor::SrcAlphaSat;
        st.dst_blend = BlendFactor::One;
        assert!(negotiate(Family::R200, &config, &st, Accel::FillRectangle).supports(Accel::FillRectangle));
    }

    #[test]
    fn auxiliary_surfaces_need_an_aperture() {
        let mut st = state(PixelFormat::Argb, Some(PixelFormat::Argb));
        st.source = st.source.map(|s| s.with_storage(Storage::Auxiliary));
        assert_eq!(negotiate(Family::R100, &DeviceConfig::default(), &st, Accel::Blit), Capability::NONE);

        let config = DeviceConfig {
            aux_offset: Some(0xe000_0000),
            ..DeviceConfig::default()
        };
        assert!(negotiate(Family::R100, &config, &st, Accel::Blit).supports(Accel::Blit));
    }
}

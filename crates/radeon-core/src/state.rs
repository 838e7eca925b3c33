//! Rendering state handed in by the host framework.

use bitflags::bitflags;
use radeon_registers::r100::BlendFactorCode;

use crate::color::Color;
use crate::geometry::Region;
use crate::surface::Surface;

bitflags! {
    /// State fields changed since the last [`crate::Device::set_state`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modified: u32 {
        const DESTINATION = 1 << 0;
        const SOURCE = 1 << 1;
        const CLIP = 1 << 2;
        const COLOR = 1 << 3;
        const SRC_COLORKEY = 1 << 4;
        const SRC_BLEND = 1 << 5;
        const DST_BLEND = 1 << 6;
        const DRAWING_FLAGS = 1 << 7;
        const BLITTING_FLAGS = 1 << 8;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DrawingFlags: u32 {
        const BLEND = 1 << 0;
        const XOR = 1 << 1;
        const SRC_PREMULTIPLY = 1 << 2;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlittingFlags: u32 {
        /// Blend using the source alpha channel.
        const BLEND_ALPHACHANNEL = 1 << 0;
        /// Blend using the constant colour's alpha.
        const BLEND_COLORALPHA = 1 << 1;
        /// Modulate source colour by the constant colour.
        const COLORIZE = 1 << 2;
        /// Multiply source colour by source alpha.
        const SRC_PREMULTIPLY = 1 << 3;
        /// Multiply source colour by the constant alpha.
        const SRC_PREMULTCOLOR = 1 << 4;
        const SRC_COLORKEY = 1 << 5;
        const XOR = 1 << 6;
        const ROTATE180 = 1 << 7;
        /// Sample a single field of an interlaced source.
        const DEINTERLACE = 1 << 8;
    }
}

impl BlittingFlags {
    pub const BLEND: Self = Self::BLEND_ALPHACHANNEL.union(Self::BLEND_COLORALPHA);
    /// Flags that read the constant colour.
    pub const USES_COLOR: Self = Self::BLEND_COLORALPHA
        .union(Self::COLORIZE)
        .union(Self::SRC_PREMULTCOLOR);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendFactor {
    Zero,
    #[default]
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestAlpha,
    InvDestAlpha,
    DestColor,
    InvDestColor,
    SrcAlphaSat,
}

impl BlendFactor {
    /// Hardware encoding; destinations without alpha read it as opaque.
    #[must_use]
    pub fn code(self, dst_has_alpha: bool) -> BlendFactorCode {
        match self {
            Self::Zero => BlendFactorCode::Zero,
            Self::One => BlendFactorCode::One,
            Self::SrcColor => BlendFactorCode::SrcColor,
            Self::InvSrcColor => BlendFactorCode::InvSrcColor,
            Self::SrcAlpha => BlendFactorCode::SrcAlpha,
            Self::InvSrcAlpha => BlendFactorCode::InvSrcAlpha,
            Self::DestAlpha if !dst_has_alpha => BlendFactorCode::One,
            Self::DestAlpha => BlendFactorCode::DstAlpha,
            Self::InvDestAlpha if !dst_has_alpha => BlendFactorCode::Zero,
            Self::InvDestAlpha => BlendFactorCode::InvDstAlpha,
            Self::DestColor => BlendFactorCode::DstColor,
            Self::InvDestColor => BlendFactorCode::InvDstColor,
            Self::SrcAlphaSat => BlendFactorCode::SrcAlphaSaturate,
        }
    }
}

/// Accelerated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accel {
    FillRectangle,
    DrawRectangle,
    DrawLine,
    FillTriangle,
    Blit,
    StretchBlit,
    TextureTriangles,
}

/// Operations sharing one configuration of the texture/combiner hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Drawing,
    Blitting,
}

impl Accel {
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::FillRectangle | Self::DrawRectangle | Self::DrawLine | Self::FillTriangle => {
                Category::Drawing
            }
            Self::Blit | Self::StretchBlit | Self::TextureTriangles => Category::Blitting,
        }
    }

    #[must_use]
    pub const fn mask(self) -> AccelMask {
        match self {
            Self::FillRectangle => AccelMask::FILL_RECTANGLE,
            Self::DrawRectangle => AccelMask::DRAW_RECTANGLE,
            Self::DrawLine => AccelMask::DRAW_LINE,
            Self::FillTriangle => AccelMask::FILL_TRIANGLE,
            Self::Blit => AccelMask::BLIT,
            Self::StretchBlit => AccelMask::STRETCH_BLIT,
            Self::TextureTriangles => AccelMask::TEXTURE_TRIANGLES,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AccelMask: u32 {
        const FILL_RECTANGLE = 1 << 0;
        const DRAW_RECTANGLE = 1 << 1;
        const DRAW_LINE = 1 << 2;
        const FILL_TRIANGLE = 1 << 3;
        const BLIT = 1 << 16;
        const STRETCH_BLIT = 1 << 17;
        const TEXTURE_TRIANGLES = 1 << 18;
    }
}

impl AccelMask {
    pub const DRAWING: Self = Self::FILL_RECTANGLE
        .union(Self::DRAW_RECTANGLE)
        .union(Self::DRAW_LINE)
        .union(Self::FILL_TRIANGLE);
    pub const BLITTING: Self = Self::BLIT
        .union(Self::STRETCH_BLIT)
        .union(Self::TEXTURE_TRIANGLES);
}

/// Everything a batch of same-operation primitives renders with.
///
/// The setters record which fields changed in [`OperationState::modified`];
/// the device consumes and clears that set on the next `set_state`.
#[derive(Debug, Clone)]
pub struct OperationState {
    pub destination: Surface,
    pub source: Option<Surface>,
    pub clip: Region,
    pub color: Color,
    /// Palette index used instead of `color` on indexed destinations.
    pub color_index: u8,
    /// Source colour key, in the source's native pixel encoding.
    pub src_colorkey: u32,
    pub drawing_flags: DrawingFlags,
    pub blitting_flags: BlittingFlags,
    pub src_blend: BlendFactor,
    pub dst_blend: BlendFactor,
    pub modified: Modified,
}

impl OperationState {
    /// State rendering to all of `destination`, everything marked modified.
    #[must_use]
    pub fn new(destination: Surface) -> Self {
        let clip = Region::of_size(destination.width, destination.height);
        Self {
            destination,
            source: None,
            clip,
            color: Color::default(),
            color_index: 0,
            src_colorkey: 0,
            drawing_flags: DrawingFlags::empty(),
            blitting_flags: BlittingFlags::empty(),
            src_blend: BlendFactor::SrcAlpha,
            dst_blend: BlendFactor::InvSrcAlpha,
            modified: Modified::all(),
        }
    }

    pub fn set_destination(&mut self, destination: Surface) {
        self.destination = destination;
        self.modified |= Modified::DESTINATION;
    }

    pub fn set_source(&mut self, source: Option<Surface>) {
        self.source = source;
        self.modified |= Modified::SOURCE;
    }

    pub fn set_clip(&mut self, clip: Region) {
        self.clip = clip;
        self.modified |= Modified::CLIP;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.modified |= Modified::COLOR;
    }

    pub fn set_color_index(&mut self, index: u8) {
        self.color_index = index;
        self.modified |= Modified::COLOR;
    }

    pub fn set_src_colorkey(&mut self, key: u32) {
        self.src_colorkey = key;
        self.modified |= Modified::SRC_COLORKEY;
    }

    pub fn set_drawing_flags(&mut self, flags: DrawingFlags) {
        self.drawing_flags = flags;
        self.modified |= Modified::DRAWING_FLAGS;
    }

    pub fn set_blitting_flags(&mut self, flags: BlittingFlags) {
        self.blitting_flags = flags;
        self.modified |= Modified::BLITTING_FLAGS;
    }

    pub fn set_blend_function(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.src_blend = src;
        self.dst_blend = dst;
        self.modified |= Modified::SRC_BLEND | Modified::DST_BLEND;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelFormat;

    #[test]
    fn setters_record_modification() {
        let mut state = OperationState::new(Surface::new(PixelFormat::Rgb16, 64, 64, 0, 128));
        state.modified = Modified::empty();

        state.set_color(Color::new(0xff, 1, 2, 3));
        state.set_blend_function(BlendFactor::One, BlendFactor::Zero);
        assert_eq!(state.modified, Modified::COLOR | Modified::SRC_BLEND | Modified::DST_BLEND);
    }

    #[test]
    fn new_state_clips_to_destination() {
        let state = OperationState::new(Surface::new(PixelFormat::Argb, 320, 240, 0, 1280));
        assert_eq!(state.clip, Region::new(0, 0, 319, 239));
    }

    #[test]
    fn dest_alpha_factors_fold_on_opaque_destinations() {
        assert_eq!(BlendFactor::DestAlpha.code(false), BlendFactorCode::One);
        assert_eq!(BlendFactor::InvDestAlpha.code(false), BlendFactorCode::Zero);
        assert_eq!(BlendFactor::DestAlpha.code(true), BlendFactorCode::DstAlpha);
    }
}

//! Surface description consumed by the state programmers.

use std::sync::Arc;

use crate::color::Color;

/// Pixel formats the engines can be asked to render to or sample from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    A8,
    Lut8,
    Alut44,
    Rgb332,
    Argb1555,
    Rgb555,
    Argb4444,
    Rgb444,
    Rgb16,
    Rgb32,
    Argb,
    Ayuv,
    /// Packed 4:2:2, Y0 Cb Y1 Cr byte order.
    Yuy2,
    /// Packed 4:2:2, Cb Y0 Cr Y1 byte order.
    Uyvy,
    /// Planar 4:2:0, Y then Cb then Cr.
    I420,
    /// Planar 4:2:0, Y then Cr then Cb.
    Yv12,
}

impl PixelFormat {
    /// Bytes per pixel of the (luma) plane.
    #[must_use]
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::A8 | Self::Lut8 | Self::Alut44 | Self::Rgb332 | Self::I420 | Self::Yv12 => 1,
            Self::Argb1555
            | Self::Rgb555
            | Self::Argb4444
            | Self::Rgb444
            | Self::Rgb16
            | Self::Yuy2
            | Self::Uyvy => 2,
            Self::Rgb32 | Self::Argb | Self::Ayuv => 4,
        }
    }

    #[must_use]
    pub const fn is_planar(self) -> bool {
        matches!(self, Self::I420 | Self::Yv12)
    }

    /// Two horizontally adjacent pixels share one 32-bit storage unit.
    #[must_use]
    pub const fn is_packed_422(self) -> bool {
        matches!(self, Self::Yuy2 | Self::Uyvy)
    }

    #[must_use]
    pub const fn is_yuv(self) -> bool {
        matches!(self, Self::Ayuv | Self::Yuy2 | Self::Uyvy | Self::I420 | Self::Yv12)
    }

    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::A8 | Self::Alut44 | Self::Argb1555 | Self::Argb4444 | Self::Argb | Self::Ayuv
        )
    }

    #[must_use]
    pub const fn is_indexed(self) -> bool {
        matches!(self, Self::Lut8 | Self::Alut44)
    }
}

/// Which memory a surface lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Storage {
    /// Device-local memory.
    #[default]
    Video,
    /// System memory reachable through the auxiliary aperture.
    Auxiliary,
}

/// Colour lookup table shared between surfaces.
pub type Palette = Arc<[Color]>;

/// A buffer the engine reads or writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub storage: Storage,
    /// Byte offset of the buffer within its storage.
    pub offset: u32,
    /// Bytes per row of the (luma) plane.
    pub pitch: u32,
    /// Field (0 or 1) sampled by deinterlacing blits.
    pub field: u32,
    pub palette: Option<Palette>,
}

impl Surface {
    #[must_use]
    pub fn new(format: PixelFormat, width: u32, height: u32, offset: u32, pitch: u32) -> Self {
        Self {
            format,
            width,
            height,
            storage: Storage::Video,
            offset,
            pitch,
            field: 0,
            palette: None,
        }
    }

    #[must_use]
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: u32) -> Self {
        self.field = field & 1;
        self
    }

    /// Both surfaces use the same colour lookup table object.
    #[must_use]
    pub fn shares_palette(&self, other: &Surface) -> bool {
        match (&self.palette, &other.palette) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

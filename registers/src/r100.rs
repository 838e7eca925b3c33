//! Fixed-function pipeline (R100): single combiner stage per texture unit,
//! `A * B + C` colour and alpha equations.

use bitflags::bitflags;

use crate::reg::Register;

pub const RB3D_BLENDCNTL: u32 = 0x1c20;
pub const RB3D_ZSTENCILCNTL: u32 = 0x1c2c;
pub const PP_CNTL: u32 = 0x1c38;
pub const RB3D_CNTL: u32 = 0x1c3c;
pub const RB3D_COLOROFFSET: u32 = 0x1c40;
pub const RE_WIDTH_HEIGHT: u32 = 0x1c44;
pub const RB3D_COLORPITCH: u32 = 0x1c48;
pub const SE_CNTL: u32 = 0x1c4c;
pub const SE_COORD_FMT: u32 = 0x1c50;

pub const PP_TXFILTER_0: u32 = 0x1c54;
pub const PP_TXFORMAT_0: u32 = 0x1c58;
pub const PP_TXOFFSET_0: u32 = 0x1c5c;
pub const PP_TXCBLEND_0: u32 = 0x1c60;
pub const PP_TXABLEND_0: u32 = 0x1c64;
pub const PP_TFACTOR_0: u32 = 0x1c68;

pub const PP_TXFILTER_1: u32 = 0x1c6c;
pub const PP_TXFORMAT_1: u32 = 0x1c70;
pub const PP_TXOFFSET_1: u32 = 0x1c74;
pub const PP_TXCBLEND_1: u32 = 0x1c78;
pub const PP_TXABLEND_1: u32 = 0x1c7c;

pub const PP_TEX_SIZE_0: u32 = 0x1d04;
pub const PP_TEX_PITCH_0: u32 = 0x1d08;
pub const PP_TEX_SIZE_1: u32 = 0x1d0c;
pub const PP_TEX_PITCH_1: u32 = 0x1d10;

pub const RB3D_ROPCNTL: u32 = 0x1d80;
pub const RB3D_PLANEMASK: u32 = 0x1d84;

pub const SE_VTX_FMT: u32 = 0x2080;
pub const SE_CNTL_STATUS: u32 = 0x2140;
pub const RE_TOP_LEFT: u32 = 0x26c0;
pub const RB3D_DSTCACHE_CTLSTAT: u32 = 0x325c;

/// RB3D_DSTCACHE_CTLSTAT: flush and free the destination cache.
pub const RB3D_DC_FLUSH_ALL: u32 = 0xf;

/// Pitch granularity of the texture pitch registers, in bytes.
pub const TEX_PITCH_ALIGN: u32 = 32;

/// Largest texture dimension the fixed-function samplers accept.
pub const MAX_TEXTURE_SIZE: u32 = 2048;

/// SE_CNTL_STATUS: vertices arrive pre-transformed.
pub const SE_TCL_BYPASS: u32 = 1 << 8;

bitflags! {
    /// RB3D_CNTL enables (the colour format field is handled by [`Rb3dCntlReg`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rb3dCntl: u32 {
        const ALPHA_BLEND_ENABLE = 1 << 0;
        const PLANE_MASK_ENABLE = 1 << 1;
        const DITHER_ENABLE = 1 << 2;
        const ROUND_ENABLE = 1 << 3;
        const SCALE_DITHER_ENABLE = 1 << 4;
        const ROP_ENABLE = 1 << 6;
        const STENCIL_ENABLE = 1 << 7;
        const Z_ENABLE = 1 << 8;
    }
}

/// Colour buffer format, shared by the fixed-function generations.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Argb1555 = 3,
    Rgb565 = 4,
    Argb8888 = 6,
    Rgb332 = 7,
    Y8 = 8,
    Rgb8 = 9,
    YuvVyuy = 11,
    YuvYvyu = 12,
    Ayuv444 = 14,
    Argb4444 = 15,
}

impl ColorFormat {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            3 => Ok(Self::Argb1555),
            4 => Ok(Self::Rgb565),
            6 => Ok(Self::Argb8888),
            7 => Ok(Self::Rgb332),
            8 => Ok(Self::Y8),
            9 => Ok(Self::Rgb8),
            11 => Ok(Self::YuvVyuy),
            12 => Ok(Self::YuvYvyu),
            14 => Ok(Self::Ayuv444),
            15 => Ok(Self::Argb4444),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}

/// RB3D_CNTL
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Rb3dCntlReg(u32);

impl Register for Rb3dCntlReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl Rb3dCntlReg {
    pub const COLOR_FORMAT_OFFSET: usize = 10;
    pub const COLOR_FORMAT_WIDTH: usize = 4;
    pub const COLOR_FORMAT_MASK: u32 = 0xf;

    #[must_use]
    pub fn new(format: ColorFormat, flags: Rb3dCntl) -> Self {
        let mut reg = Self::default();
        reg.set_color_format(format);
        reg.set_flags(flags);
        reg
    }

    /// COLOR_FORMAT
    ///
    /// # Errors
    /// Returns an error if the field holds an unencoded format.
    #[inline(always)]
    pub fn color_format(&self) -> Result<ColorFormat, crate::encode::UnknownVariant<u8>> {
        let val = (self.0 >> Self::COLOR_FORMAT_OFFSET) & Self::COLOR_FORMAT_MASK;
        ColorFormat::from_bits(val as u8)
    }

    #[inline(always)]
    pub fn set_color_format(&mut self, val: ColorFormat) {
        let val = u32::from(val.bits());
        self.0 = (self.0 & !(Self::COLOR_FORMAT_MASK << Self::COLOR_FORMAT_OFFSET))
            | ((val & Self::COLOR_FORMAT_MASK) << Self::COLOR_FORMAT_OFFSET);
    }

    #[inline(always)]
    #[must_use]
    pub fn flags(&self) -> Rb3dCntl {
        Rb3dCntl::from_bits_truncate(self.0)
    }

    #[inline(always)]
    pub fn set_flags(&mut self, flags: Rb3dCntl) {
        self.0 = (self.0 & !Rb3dCntl::all().bits()) | flags.bits();
    }
}

/// Blend factor encoding used by every generation's blend controls.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactorCode {
    Zero = 32,
    One = 33,
    SrcColor = 34,
    InvSrcColor = 35,
    DstColor = 36,
    InvDstColor = 37,
    SrcAlpha = 38,
    InvSrcAlpha = 39,
    DstAlpha = 40,
    InvDstAlpha = 41,
    SrcAlphaSaturate = 42,
}

impl BlendFactorCode {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            32 => Ok(Self::Zero),
            33 => Ok(Self::One),
            34 => Ok(Self::SrcColor),
            35 => Ok(Self::InvSrcColor),
            36 => Ok(Self::DstColor),
            37 => Ok(Self::InvDstColor),
            38 => Ok(Self::SrcAlpha),
            39 => Ok(Self::InvSrcAlpha),
            40 => Ok(Self::DstAlpha),
            41 => Ok(Self::InvDstAlpha),
            42 => Ok(Self::SrcAlphaSaturate),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}

/// RB3D_BLENDCNTL
///
/// `dst = src * SRC_BLEND + dst * DST_BLEND`, clamped.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct BlendCntlReg(u32);

impl Register for BlendCntlReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl BlendCntlReg {
    pub const SRC_BLEND_OFFSET: usize = 16;
    pub const SRC_BLEND_WIDTH: usize = 6;
    pub const SRC_BLEND_MASK: u32 = 0x3f;

    pub const DST_BLEND_OFFSET: usize = 24;
    pub const DST_BLEND_WIDTH: usize = 6;
    pub const DST_BLEND_MASK: u32 = 0x3f;

    #[must_use]
    pub fn new(src: BlendFactorCode, dst: BlendFactorCode) -> Self {
        let src = u32::from(src.bits()) & Self::SRC_BLEND_MASK;
        let dst = u32::from(dst.bits()) & Self::DST_BLEND_MASK;
        Self((src << Self::SRC_BLEND_OFFSET) | (dst << Self::DST_BLEND_OFFSET))
    }

    /// SRC_BLEND
    ///
    /// # Errors
    /// Returns an error if the field holds an unencoded factor.
    pub fn src_blend(&self) -> Result<BlendFactorCode, crate::encode::UnknownVariant<u8>> {
        BlendFactorCode::from_bits(((self.0 >> Self::SRC_BLEND_OFFSET) & Self::SRC_BLEND_MASK) as u8)
    }

    /// DST_BLEND
    ///
    /// # Errors
    /// Returns an error if the field holds an unencoded factor.
    pub fn dst_blend(&self) -> Result<BlendFactorCode, crate::encode::UnknownVariant<u8>> {
        BlendFactorCode::from_bits(((self.0 >> Self::DST_BLEND_OFFSET) & Self::DST_BLEND_MASK) as u8)
    }
}

/// RB3D_ROPCNTL raster operation (bits 11:8).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rop {
    Xor = 0x6,
    Copy = 0xc,
}

impl Rop {
    pub const OFFSET: usize = 8;

    /// Register value selecting this operation.
    #[must_use]
    pub const fn to_raw(self) -> u32 {
        (self as u32) << Self::OFFSET
    }
}

bitflags! {
    /// PP_CNTL
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PpCntl: u32 {
        const TEX_0_ENABLE = 1 << 4;
        const TEX_1_ENABLE = 1 << 5;
        const TEX_BLEND_0_ENABLE = 1 << 12;
        const TEX_BLEND_1_ENABLE = 1 << 13;
    }
}

bitflags! {
    /// SE_CNTL
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SeCntl: u32 {
        const BFACE_SOLID = 3 << 1;
        const FFACE_SOLID = 3 << 3;
        const DIFFUSE_SHADE_FLAT = 1 << 6;
        const ALPHA_SHADE_FLAT = 1 << 8;
        const VTX_PIX_CENTER_OGL = 1 << 27;
        const ROUND_MODE_ROUND = 1 << 28;
    }
}

impl SeCntl {
    /// Flat, solid, pixel-centred setup used for every primitive.
    pub const DEFAULT: Self = Self::BFACE_SOLID
        .union(Self::FFACE_SOLID)
        .union(Self::DIFFUSE_SHADE_FLAT)
        .union(Self::ALPHA_SHADE_FLAT)
        .union(Self::VTX_PIX_CENTER_OGL)
        .union(Self::ROUND_MODE_ROUND);
}

bitflags! {
    /// SE_VTX_FMT: components following X/Y in each vertex.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SeVtxFmt: u32 {
        const W0 = 1 << 0;
        const ST0 = 1 << 7;
        const Z = 1 << 31;
    }
}

bitflags! {
    /// PP_TXFILTER_n
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxFilter: u32 {
        const MAG_FILTER_LINEAR = 1 << 0;
        const MIN_FILTER_LINEAR = 1 << 1;
        const CLAMP_S_EDGE = 2 << 15;
        const CLAMP_T_EDGE = 2 << 21;
    }
}

impl TxFilter {
    pub const NEAREST: Self = Self::CLAMP_S_EDGE.union(Self::CLAMP_T_EDGE);
    pub const LINEAR: Self = Self::NEAREST
        .union(Self::MAG_FILTER_LINEAR)
        .union(Self::MIN_FILTER_LINEAR);
}

/// Texel format of PP_TXFORMAT_n.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexFormat {
    I8 = 0,
    Ai88 = 1,
    Rgb332 = 2,
    Argb1555 = 3,
    Rgb565 = 4,
    Argb4444 = 5,
    Argb8888 = 6,
    Y8 = 8,
    Vyuy422 = 18,
    Yvyu422 = 19,
}

impl TexFormat {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            0 => Ok(Self::I8),
            1 => Ok(Self::Ai88),
            2 => Ok(Self::Rgb332),
            3 => Ok(Self::Argb1555),
            4 => Ok(Self::Rgb565),
            5 => Ok(Self::Argb4444),
            6 => Ok(Self::Argb8888),
            8 => Ok(Self::Y8),
            18 => Ok(Self::Vyuy422),
            19 => Ok(Self::Yvyu422),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}

bitflags! {
    /// PP_TXFORMAT_n modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxFormatFlags: u32 {
        const ALPHA_IN_MAP = 1 << 6;
        const NON_POWER2 = 1 << 7;
        const YUV_TO_RGB = 1 << 24;
    }
}

/// PP_TXFORMAT_n
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct TxFormatReg(u32);

impl Register for TxFormatReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl TxFormatReg {
    pub const FORMAT_OFFSET: usize = 0;
    pub const FORMAT_WIDTH: usize = 5;
    pub const FORMAT_MASK: u32 = 0x1f;

    #[must_use]
    pub fn new(format: TexFormat, flags: TxFormatFlags) -> Self {
        Self((u32::from(format.bits()) & Self::FORMAT_MASK) | flags.bits())
    }

    /// FORMAT
    ///
    /// # Errors
    /// Returns an error if the field holds an unencoded texel format.
    pub fn format(&self) -> Result<TexFormat, crate::encode::UnknownVariant<u8>> {
        TexFormat::from_bits(((self.0 >> Self::FORMAT_OFFSET) & Self::FORMAT_MASK) as u8)
    }

    #[must_use]
    pub fn flags(&self) -> TxFormatFlags {
        TxFormatFlags::from_bits_truncate(self.0)
    }
}

/// Colour combiner input.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorArg {
    Zero = 0,
    CurrentColor = 2,
    CurrentAlpha = 3,
    DiffuseColor = 4,
    DiffuseAlpha = 5,
    TfactorColor = 8,
    TfactorAlpha = 9,
    T0Color = 10,
    T0Alpha = 11,
    T1Color = 12,
    T1Alpha = 13,
}

/// Alpha combiner input.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaArg {
    Zero = 0,
    CurrentAlpha = 1,
    DiffuseAlpha = 2,
    TfactorAlpha = 4,
    T0Alpha = 5,
    T1Alpha = 6,
}

/// Inverts a combiner input (`1 - x`).
pub const COMP_ARG_A: u32 = 1 << 15;
pub const COMP_ARG_B: u32 = 1 << 16;

/// PP_TXCBLEND_n: `A * B + C`.
#[must_use]
pub const fn txcblend(a: ColorArg, b: ColorArg, c: ColorArg) -> u32 {
    (a as u32) | ((b as u32) << 5) | ((c as u32) << 10)
}

/// PP_TXABLEND_n: `A * B + C`.
#[must_use]
pub const fn txablend(a: AlphaArg, b: AlphaArg, c: AlphaArg) -> u32 {
    (a as u32) | ((b as u32) << 4) | ((c as u32) << 8)
}

/// Register name for tracing.
#[must_use]
pub fn name(offset: u32) -> Option<&'static str> {
    Some(match offset {
        RB3D_BLENDCNTL => "RB3D_BLENDCNTL",
        RB3D_ZSTENCILCNTL => "RB3D_ZSTENCILCNTL",
        PP_CNTL => "PP_CNTL",
        RB3D_CNTL => "RB3D_CNTL",
        RB3D_COLOROFFSET => "RB3D_COLOROFFSET",
        RE_WIDTH_HEIGHT => "RE_WIDTH_HEIGHT",
        RB3D_COLORPITCH => "RB3D_COLORPITCH",
        SE_CNTL => "SE_CNTL",
        SE_COORD_FMT => "SE_COORD_FMT",
        PP_TXFILTER_0 => "PP_TXFILTER_0",
        PP_TXFORMAT_0 => "PP_TXFORMAT_0",
        PP_TXOFFSET_0 => "PP_TXOFFSET_0",
        PP_TXCBLEND_0 => "PP_TXCBLEND_0",
        PP_TXABLEND_0 => "PP_TXABLEND_0",
        PP_TFACTOR_0 => "PP_TFACTOR_0",
        PP_TXFILTER_1 => "PP_TXFILTER_1",
        PP_TXFORMAT_1 => "PP_TXFORMAT_1",
        PP_TXOFFSET_1 => "PP_TXOFFSET_1",
        PP_TXCBLEND_1 => "PP_TXCBLEND_1",
        PP_TXABLEND_1 => "PP_TXABLEND_1",
        PP_TEX_SIZE_0 => "PP_TEX_SIZE_0",
        PP_TEX_PITCH_0 => "PP_TEX_PITCH_0",
        PP_TEX_SIZE_1 => "PP_TEX_SIZE_1",
        PP_TEX_PITCH_1 => "PP_TEX_PITCH_1",
        RB3D_ROPCNTL => "RB3D_ROPCNTL",
        RB3D_PLANEMASK => "RB3D_PLANEMASK",
        SE_VTX_FMT => "SE_VTX_FMT",
        SE_CNTL_STATUS => "SE_CNTL_STATUS",
        RE_TOP_LEFT => "RE_TOP_LEFT",
        RB3D_DSTCACHE_CTLSTAT => "RB3D_DSTCACHE_CTLSTAT",
        _ => return None,
    })
}

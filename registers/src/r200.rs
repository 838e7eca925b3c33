//! Extended fixed-function pipeline (R200).
//!
//! The render backend, rasteriser clip and `PP_CNTL` live at the R100
//! addresses in [`crate::r100`]; texture units, the register-file combiner stages and
//! vertex setup moved. Texture units sample into combiner registers R0/R1.

use bitflags::bitflags;

pub const PP_TXFILTER_0: u32 = 0x2c00;
pub const PP_TXFORMAT_0: u32 = 0x2c04;
pub const PP_TXFORMAT_X_0: u32 = 0x2c08;
pub const PP_TXSIZE_0: u32 = 0x2c0c;
pub const PP_TXPITCH_0: u32 = 0x2c10;
pub const PP_TXOFFSET_0: u32 = 0x2d00;

pub const PP_TXFILTER_1: u32 = 0x2c20;
pub const PP_TXFORMAT_1: u32 = 0x2c24;
pub const PP_TXFORMAT_X_1: u32 = 0x2c28;
pub const PP_TXSIZE_1: u32 = 0x2c2c;
pub const PP_TXPITCH_1: u32 = 0x2c30;
pub const PP_TXOFFSET_1: u32 = 0x2d18;

pub const PP_TFACTOR_0: u32 = 0x2ee0;
pub const PP_TXCBLEND_0: u32 = 0x2f00;
pub const PP_TXCBLEND2_0: u32 = 0x2f04;
pub const PP_TXABLEND_0: u32 = 0x2f08;
pub const PP_TXABLEND2_0: u32 = 0x2f0c;
pub const PP_TXCBLEND_1: u32 = 0x2f10;
pub const PP_TXCBLEND2_1: u32 = 0x2f14;
pub const PP_TXABLEND_1: u32 = 0x2f18;
pub const PP_TXABLEND2_1: u32 = 0x2f1c;

pub const SE_VTX_FMT_0: u32 = 0x2088;
pub const SE_VTX_FMT_1: u32 = 0x208c;
pub const SE_VTE_CNTL: u32 = 0x20b0;

bitflags! {
    /// PP_TXFORMAT_n modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxFormatFlags: u32 {
        const ALPHA_IN_MAP = 1 << 6;
        const NON_POWER2 = 1 << 7;
    }
}

bitflags! {
    /// PP_TXFILTER_n
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxFilter: u32 {
        const MAG_FILTER_LINEAR = 1 << 0;
        const MIN_FILTER_LINEAR = 1 << 1;
        const CLAMP_S_EDGE = 2 << 12;
        const CLAMP_T_EDGE = 2 << 17;
        const YUV_TO_RGB = 1 << 30;
    }
}

impl TxFilter {
    pub const NEAREST: Self = Self::CLAMP_S_EDGE.union(Self::CLAMP_T_EDGE);
    pub const LINEAR: Self = Self::NEAREST
        .union(Self::MAG_FILTER_LINEAR)
        .union(Self::MIN_FILTER_LINEAR);
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
    R0Color = 10,
    R0Alpha = 11,
    R1Color = 12,
    R1Alpha = 13,
}

/// Alpha combiner input.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaArg {
    Zero = 0,
    CurrentAlpha = 1,
    DiffuseAlpha = 2,
    TfactorAlpha = 4,
    R0Alpha = 5,
    R1Alpha = 6,
}

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

bitflags! {
    /// PP_TXCBLEND2_n / PP_TXABLEND2_n
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Blend2: u32 {
        const CLAMP_0_1 = 1 << 12;
        const OUTPUT_R0 = 1 << 16;
    }
}

bitflags! {
    /// SE_VTX_FMT_0
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VtxFmt0: u32 {
        const Z0 = 1 << 0;
        const W0 = 1 << 1;
    }
}

/// SE_VTX_FMT_1: texture coordinate count for unit 0 (bits 2:0).
pub const VTX_FMT_1_TEX0_ST: u32 = 2;

bitflags! {
    /// SE_VTE_CNTL: viewport transform bypass for pre-transformed vertices.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VteCntl: u32 {
        const VTX_XY_FMT = 1 << 8;
        const VTX_Z_FMT = 1 << 9;
        const VTX_W0_FMT = 1 << 10;
    }
}

/// Register name for tracing.
#[must_use]
pub fn name(offset: u32) -> Option<&'static str> {
    Some(match offset {
        PP_TXFILTER_0 => "R200_PP_TXFILTER_0",
        PP_TXFORMAT_0 => "R200_PP_TXFORMAT_0",
        PP_TXFORMAT_X_0 => "R200_PP_TXFORMAT_X_0",
        PP_TXSIZE_0 => "R200_PP_TXSIZE_0",
        PP_TXPITCH_0 => "R200_PP_TXPITCH_0",
        PP_TXOFFSET_0 => "R200_PP_TXOFFSET_0",
        PP_TXFILTER_1 => "R200_PP_TXFILTER_1",
        PP_TXFORMAT_1 => "R200_PP_TXFORMAT_1",
        PP_TXFORMAT_X_1 => "R200_PP_TXFORMAT_X_1",
        PP_TXSIZE_1 => "R200_PP_TXSIZE_1",
        PP_TXPITCH_1 => "R200_PP_TXPITCH_1",
        PP_TXOFFSET_1 => "R200_PP_TXOFFSET_1",
        PP_TFACTOR_0 => "R200_PP_TFACTOR_0",
        PP_TXCBLEND_0 => "R200_PP_TXCBLEND_0",
        PP_TXCBLEND2_0 => "R200_PP_TXCBLEND2_0",
        PP_TXABLEND_0 => "R200_PP_TXABLEND_0",
        PP_TXABLEND2_0 => "R200_PP_TXABLEND2_0",
        PP_TXCBLEND_1 => "R200_PP_TXCBLEND_1",
        PP_TXCBLEND2_1 => "R200_PP_TXCBLEND2_1",
        PP_TXABLEND_1 => "R200_PP_TXABLEND_1",
        PP_TXABLEND2_1 => "R200_PP_TXABLEND2_1",
        SE_VTX_FMT_0 => "R200_SE_VTX_FMT_0",
        SE_VTX_FMT_1 => "R200_SE_VTX_FMT_1",
        SE_VTE_CNTL => "R200_SE_VTE_CNTL",
        _ => return None,
    })
}

//! Programmable pipeline (R300): vertex and fragment processing run
//! microcode uploaded at engine reset.

use bitflags::bitflags;

pub mod microcode;

// Vertex assembly / processing
pub const VAP_PORT_DATA0: u32 = 0x2000;
pub const VAP_CNTL: u32 = 0x2080;
pub const VAP_VF_CNTL: u32 = 0x2084;
pub const VAP_OUTPUT_VTX_FMT_0: u32 = 0x2090;
pub const VAP_OUTPUT_VTX_FMT_1: u32 = 0x2094;
pub const VAP_VTX_SIZE: u32 = 0x20b4;
pub const VAP_PROG_STREAM_CNTL_0: u32 = 0x2150;
pub const VAP_PVS_UPLOAD_ADDRESS: u32 = 0x2200;
pub const VAP_PVS_UPLOAD_DATA: u32 = 0x2208;
pub const VAP_PVS_CODE_CNTL_0: u32 = 0x22d0;
pub const VAP_PVS_CODE_CNTL_1: u32 = 0x22d8;

pub const GB_ENABLE: u32 = 0x4008;
pub const TX_ENABLE: u32 = 0x4104;
pub const GA_COLOR_CONTROL: u32 = 0x4278;
pub const RS_COUNT: u32 = 0x4300;
pub const RS_INST_0: u32 = 0x4330;
pub const SC_SCISSOR0: u32 = 0x43e0;
pub const SC_SCISSOR1: u32 = 0x43e4;

// Texture units; unit n is at +4n.
pub const TX_FILTER0_0: u32 = 0x4400;
pub const TX_FILTER1_0: u32 = 0x4440;
pub const TX_SIZE_0: u32 = 0x4480;
pub const TX_FORMAT_0: u32 = 0x44c0;
pub const TX_FORMAT2_0: u32 = 0x4500;
pub const TX_OFFSET_0: u32 = 0x4540;

// Fragment shader unit
pub const US_CONFIG: u32 = 0x4600;
pub const US_PIXSIZE: u32 = 0x4604;
pub const US_CODE_OFFSET: u32 = 0x4608;
pub const US_CODE_ADDR_0: u32 = 0x460c;
pub const US_CODE_ADDR_1: u32 = 0x4610;
pub const US_CODE_ADDR_2: u32 = 0x4614;
pub const US_CODE_ADDR_3: u32 = 0x4618;
pub const US_TEX_INST_0: u32 = 0x4620;
pub const US_OUT_FMT_0: u32 = 0x46a4;
pub const US_ALU_RGB_ADDR_0: u32 = 0x46c0;
pub const US_ALU_ALPHA_ADDR_0: u32 = 0x47c0;
pub const US_ALU_RGB_INST_0: u32 = 0x48c0;
pub const US_ALU_ALPHA_INST_0: u32 = 0x49c0;

/// Fragment program constant 0; Y/Z/W follow at +4/+8/+12.
pub const PFS_PARAM_0_X: u32 = 0x4c00;

// Render backend
pub const RB3D_BLENDCNTL: u32 = 0x4e04;
pub const RB3D_ABLENDCNTL: u32 = 0x4e08;
pub const RB3D_ROPCNTL: u32 = 0x4e18;
pub const RB3D_COLOROFFSET0: u32 = 0x4e28;
pub const RB3D_COLORPITCH0: u32 = 0x4e38;
pub const RB3D_DSTCACHE_CTLSTAT: u32 = 0x4e4c;
pub const ZB_ZCACHE_CTLSTAT: u32 = 0x4f18;

/// Destination cache flush issued after every primitive group.
///
/// Replayed verbatim; the individual bits are not documented.
pub const DST_CACHE_FLUSH: [(u32, u32); 2] = [(RB3D_DSTCACHE_CTLSTAT, 0xa), (ZB_ZCACHE_CTLSTAT, 0x3)];

/// Scissor coordinates are biased so that negative guard-band values stay
/// representable.
pub const SCISSOR_OFFSET: i32 = 1440;

/// Largest texture dimension the sampler accepts.
pub const MAX_TEXTURE_SIZE: u32 = 4096;

/// Colour buffer format of RB3D_COLORPITCHn.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    Argb1555 = 3,
    Rgb565 = 4,
    Argb8888 = 6,
    Rgb332 = 7,
    I8 = 9,
    Vyuy = 11,
    Yvyu = 12,
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
            9 => Ok(Self::I8),
            11 => Ok(Self::Vyuy),
            12 => Ok(Self::Yvyu),
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

/// RB3D_COLORPITCHn: pitch in pixels (bits 13:0), format (bits 24:21).
#[must_use]
pub const fn color_pitch(pitch_pixels: u32, format: ColorFormat) -> u32 {
    (pitch_pixels & 0x3fff) | ((format as u32) << 21)
}

/// SC_SCISSORn corner.
#[must_use]
pub const fn scissor(x: i32, y: i32) -> u32 {
    let x = ((x + SCISSOR_OFFSET) as u32) & 0x1fff;
    let y = ((y + SCISSOR_OFFSET) as u32) & 0x1fff;
    x | (y << 13)
}

bitflags! {
    /// TX_FILTER0_n
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TxFilter0: u32 {
        const CLAMP_S_EDGE = 2 << 0;
        const CLAMP_T_EDGE = 2 << 3;
        const MAG_FILTER_NEAREST = 1 << 9;
        const MAG_FILTER_LINEAR = 2 << 9;
        const MIN_FILTER_NEAREST = 1 << 11;
        const MIN_FILTER_LINEAR = 2 << 11;
    }
}

impl TxFilter0 {
    pub const NEAREST: Self = Self::CLAMP_S_EDGE
        .union(Self::CLAMP_T_EDGE)
        .union(Self::MAG_FILTER_NEAREST)
        .union(Self::MIN_FILTER_NEAREST);
    pub const LINEAR: Self = Self::CLAMP_S_EDGE
        .union(Self::CLAMP_T_EDGE)
        .union(Self::MAG_FILTER_LINEAR)
        .union(Self::MIN_FILTER_LINEAR);
}

/// TX_SIZE_n: `w - 1` (bits 10:0), `h - 1` (bits 21:11), explicit pitch.
#[must_use]
pub const fn tx_size(width: u32, height: u32) -> u32 {
    (width.wrapping_sub(1) & 0x7ff) | ((height.wrapping_sub(1) & 0x7ff) << 11) | TX_PITCH_EN
}

pub const TX_PITCH_EN: u32 = 1 << 31;

/// Texel layout of TX_FORMAT_n.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexFormat {
    X8 = 0x0,
    Z3Y3X2 = 0x5,
    Z5Y6X5 = 0x6,
    W4Z4Y4X4 = 0xa,
    W1Z5Y5X5 = 0xb,
    W8Z8Y8X8 = 0xc,
    G8R8G8B8 = 0x15,
    R8G8B8G8 = 0x16,
}

/// Channel selector of the TX_FORMAT_n swizzle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sel {
    X = 0,
    Y = 1,
    Z = 2,
    W = 3,
    Zero = 4,
    One = 5,
}

/// TX_FORMAT_n: convert packed 4:2:2 YCbCr to RGB while sampling.
pub const TX_FORMAT_YUV_TO_RGB: u32 = 2 << 22;

/// TX_FORMAT_n with the given output swizzle in R, G, B, A order.
#[must_use]
pub const fn tx_format(format: TexFormat, swizzle: [Sel; 4]) -> u32 {
    (format as u32)
        | ((swizzle[0] as u32) << 8)
        | ((swizzle[1] as u32) << 11)
        | ((swizzle[2] as u32) << 14)
        | ((swizzle[3] as u32) << 17)
}

bitflags! {
    /// RB3D_BLENDCNTL enables; factors use [`crate::r100::BlendCntlReg`] packing.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlendCntl: u32 {
        const ALPHA_BLEND_ENABLE = 1 << 0;
        const SEPARATE_ALPHA_ENABLE = 1 << 1;
        const READ_ENABLE = 1 << 4;
    }
}

bitflags! {
    /// RB3D_ROPCNTL enables; the operation uses [`crate::r100::Rop`] encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RopCntl: u32 {
        const ROP_ENABLE = 1 << 2;
    }
}

/// Vertex stream element type of VAP_PROG_STREAM_CNTL_n.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    Float1 = 0,
    Float2 = 1,
    Float3 = 2,
    Float4 = 3,
}

/// One 16-bit half of VAP_PROG_STREAM_CNTL_n.
#[must_use]
pub const fn stream_element(ty: StreamType, dst_vec: u32, last: bool) -> u32 {
    (ty as u32) | ((dst_vec & 0x1f) << 8) | if last { 1 << 13 } else { 0 }
}

/// VAP_OUTPUT_VTX_FMT_0: position present.
pub const OUTPUT_VTX_POS_PRESENT: u32 = 1 << 0;

/// VAP_OUTPUT_VTX_FMT_1: two components for texture coordinate set 0.
pub const OUTPUT_VTX_TEX0_ST: u32 = 2;

/// VAP_CNTL for the pass-through vertex program.
pub const VAP_CNTL_PASSTHROUGH: u32 = 0x0000_0a0a;

/// GA_COLOR_CONTROL: flat shading, last vertex provokes.
pub const GA_COLOR_CONTROL_FLAT: u32 = 0x0003_aaaa;

/// RS_COUNT: interpolated components (bits 6:0), high precision enable.
#[must_use]
pub const fn rs_count(tex_components: u32) -> u32 {
    (tex_components & 0x7f) | if tex_components != 0 { 1 << 18 } else { 0 }
}

/// RS_INST_0 routing texture coordinate 0 to fragment register 0.
pub const RS_INST_TEX0: u32 = 1 << 3;

/// US_OUT_FMT_0: C4_8 output.
pub const US_OUT_FMT_C4_8: u32 = 0x0;

/// Register name for tracing.
#[must_use]
pub fn name(offset: u32) -> Option<&'static str> {
    Some(match offset {
        VAP_PORT_DATA0 => "VAP_PORT_DATA0",
        VAP_CNTL => "VAP_CNTL",
        VAP_VF_CNTL => "VAP_VF_CNTL",
        VAP_OUTPUT_VTX_FMT_0 => "VAP_OUTPUT_VTX_FMT_0",
        VAP_OUTPUT_VTX_FMT_1 => "VAP_OUTPUT_VTX_FMT_1",
        VAP_VTX_SIZE => "VAP_VTX_SIZE",
        VAP_PROG_STREAM_CNTL_0 => "VAP_PROG_STREAM_CNTL_0",
        VAP_PVS_UPLOAD_ADDRESS => "VAP_PVS_UPLOAD_ADDRESS",
        VAP_PVS_UPLOAD_DATA => "VAP_PVS_UPLOAD_DATA",
        VAP_PVS_CODE_CNTL_0 => "VAP_PVS_CODE_CNTL_0",
        VAP_PVS_CODE_CNTL_1 => "VAP_PVS_CODE_CNTL_1",
        GB_ENABLE => "GB_ENABLE",
        TX_ENABLE => "TX_ENABLE",
        GA_COLOR_CONTROL => "GA_COLOR_CONTROL",
        RS_COUNT => "RS_COUNT",
        RS_INST_0 => "RS_INST_0",
        SC_SCISSOR0 => "SC_SCISSOR0",
        SC_SCISSOR1 => "SC_SCISSOR1",
        TX_FILTER0_0 => "TX_FILTER0_0",
        0x4404 => "TX_FILTER0_1",
        TX_FILTER1_0 => "TX_FILTER1_0",
        0x4444 => "TX_FILTER1_1",
        TX_SIZE_0 => "TX_SIZE_0",
        0x4484 => "TX_SIZE_1",
        TX_FORMAT_0 => "TX_FORMAT_0",
        0x44c4 => "TX_FORMAT_1",
        TX_FORMAT2_0 => "TX_FORMAT2_0",
        0x4504 => "TX_FORMAT2_1",
        TX_OFFSET_0 => "TX_OFFSET_0",
        0x4544 => "TX_OFFSET_1",
        US_CONFIG => "US_CONFIG",
        US_PIXSIZE => "US_PIXSIZE",
        US_CODE_OFFSET => "US_CODE_OFFSET",
        US_CODE_ADDR_0 => "US_CODE_ADDR_0",
        US_CODE_ADDR_1 => "US_CODE_ADDR_1",
        US_CODE_ADDR_2 => "US_CODE_ADDR_2",
        US_CODE_ADDR_3 => "US_CODE_ADDR_3",
        US_OUT_FMT_0 => "US_OUT_FMT_0",
        PFS_PARAM_0_X => "PFS_PARAM_0_X",
        0x4c04 => "PFS_PARAM_0_Y",
        0x4c08 => "PFS_PARAM_0_Z",
        0x4c0c => "PFS_PARAM_0_W",
        RB3D_BLENDCNTL => "RB3D_BLENDCNTL",
        RB3D_ABLENDCNTL => "RB3D_ABLENDCNTL",
        RB3D_ROPCNTL => "RB3D_ROPCNTL",
        RB3D_COLOROFFSET0 => "RB3D_COLOROFFSET0",
        RB3D_COLORPITCH0 => "RB3D_COLORPITCH0",
        RB3D_DSTCACHE_CTLSTAT => "RB3D_DSTCACHE_CTLSTAT",
        ZB_ZCACHE_CTLSTAT => "ZB_ZCACHE_CTLSTAT",
        o if (US_TEX_INST_0..US_TEX_INST_0 + 32 * 4).contains(&o) => "US_TEX_INST",
        o if (US_ALU_RGB_ADDR_0..US_ALU_RGB_ADDR_0 + 64 * 4).contains(&o) => "US_ALU_RGB_ADDR",
        o if (US_ALU_ALPHA_ADDR_0..US_ALU_ALPHA_ADDR_0 + 64 * 4).contains(&o) => "US_ALU_ALPHA_ADDR",
        o if (US_ALU_RGB_INST_0..US_ALU_RGB_INST_0 + 64 * 4).contains(&o) => "US_ALU_RGB_INST",
        o if (US_ALU_ALPHA_INST_0..US_ALU_ALPHA_INST_0 + 64 * 4).contains(&o) => "US_ALU_ALPHA_INST",
        _ => return None,
    })
}

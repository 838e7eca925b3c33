//! Registers shared by every generation: bus manager, 2D engine state and
//! the vertex submission port.

use bitflags::bitflags;

use crate::reg::Register;

/// Command FIFO depth in 32-bit entries.
pub const FIFO_DEPTH: u32 = 64;

// Bus manager
pub const RBBM_SOFT_RESET: u32 = 0x00f0;
pub const HOST_PATH_CNTL: u32 = 0x0130;
pub const RBBM_STATUS: u32 = 0x0e40;

// 2D engine
pub const DST_OFFSET: u32 = 0x1404;
pub const DST_PITCH: u32 = 0x1408;
pub const DP_GUI_MASTER_CNTL: u32 = 0x146c;
pub const DP_BRUSH_FRGD_CLR: u32 = 0x147c;
pub const SRC_OFFSET: u32 = 0x15ac;
pub const SRC_PITCH: u32 = 0x15b0;
pub const CLR_CMP_CNTL: u32 = 0x15c0;
pub const CLR_CMP_CLR_SRC: u32 = 0x15c4;
pub const CLR_CMP_MASK: u32 = 0x15cc;
pub const DP_CNTL: u32 = 0x16c0;
pub const DP_WRITE_MASK: u32 = 0x16cc;
pub const SC_TOP_LEFT: u32 = 0x16ec;
pub const SC_BOTTOM_RIGHT: u32 = 0x16f0;

// Vertex port
pub const SE_PORT_DATA0: u32 = 0x2000;
pub const SE_VF_CNTL: u32 = 0x2084;

/// HOST_PATH_CNTL: host data path soft reset.
pub const HDP_SOFT_RESET: u32 = 1 << 26;

/// RBBM_STATUS
///
/// Free command FIFO entries and the global engine busy flag.
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct RbbmStatusReg(u32);

impl Register for RbbmStatusReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl RbbmStatusReg {
    pub const FIFO_CNT_OFFSET: usize = 0;
    pub const FIFO_CNT_WIDTH: usize = 7;
    pub const FIFO_CNT_MASK: u32 = 0x7f;

    pub const ACTIVE_OFFSET: usize = 31;
    pub const ACTIVE_WIDTH: usize = 1;
    pub const ACTIVE_MASK: u32 = 0x1;

    /// Free FIFO entries.
    #[inline(always)]
    #[must_use]
    pub fn fifo_cnt(&self) -> u32 {
        (self.0 >> Self::FIFO_CNT_OFFSET) & Self::FIFO_CNT_MASK
    }

    /// Set while any engine block still has work queued.
    #[inline(always)]
    #[must_use]
    pub fn active(&self) -> bool {
        (self.0 >> Self::ACTIVE_OFFSET) & Self::ACTIVE_MASK != 0
    }
}

bitflags! {
    /// RBBM_SOFT_RESET block selects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SoftReset: u32 {
        const CP = 1 << 0;
        const HI = 1 << 1;
        const SE = 1 << 2;
        const RE = 1 << 3;
        const PP = 1 << 4;
        const E2 = 1 << 5;
        const RB = 1 << 6;
        const HDP = 1 << 7;
    }
}

impl SoftReset {
    /// Blocks cycled by a full engine reset.
    pub const ENGINE: Self = Self::CP
        .union(Self::HI)
        .union(Self::SE)
        .union(Self::RE)
        .union(Self::PP)
        .union(Self::E2)
        .union(Self::RB);
}

/// DP_GUI_MASTER_CNTL destination datatype.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstDatatype {
    Cp8 = 2,
    Argb1555 = 3,
    Rgb565 = 4,
    Argb8888 = 6,
    Rgb332 = 7,
    Y8 = 8,
    Rgb8 = 9,
    Vyuy = 11,
    Yvyu = 12,
    Ayuv444 = 14,
    Argb4444 = 15,
}

impl DstDatatype {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            2 => Ok(Self::Cp8),
            3 => Ok(Self::Argb1555),
            4 => Ok(Self::Rgb565),
            6 => Ok(Self::Argb8888),
            7 => Ok(Self::Rgb332),
            8 => Ok(Self::Y8),
            9 => Ok(Self::Rgb8),
            11 => Ok(Self::Vyuy),
            12 => Ok(Self::Yvyu),
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

bitflags! {
    /// DP_GUI_MASTER_CNTL control bits outside the datatype and ROP fields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GmcFlags: u32 {
        const SRC_PITCH_OFFSET_CNTL = 1 << 0;
        const DST_PITCH_OFFSET_CNTL = 1 << 1;
        const DST_CLIPPING = 1 << 3;
        const BRUSH_SOLID_COLOR = 13 << 4;
        const BRUSH_NONE = 15 << 4;
        const SRC_DATATYPE_COLOR = 3 << 12;
        const BYTE_PIX_ORDER = 1 << 14;
        const DP_SRC_SOURCE_MEMORY = 2 << 24;
        const CLR_CMP_CNTL_DIS = 1 << 28;
        const WR_MSK_DIS = 1 << 30;
    }
}

/// DP_GUI_MASTER_CNTL
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct GuiMasterCntlReg(u32);

impl Register for GuiMasterCntlReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl GuiMasterCntlReg {
    pub const DST_DATATYPE_OFFSET: usize = 8;
    pub const DST_DATATYPE_WIDTH: usize = 4;
    pub const DST_DATATYPE_MASK: u32 = 0xf;

    pub const ROP3_OFFSET: usize = 16;
    pub const ROP3_WIDTH: usize = 8;
    pub const ROP3_MASK: u32 = 0xff;

    /// Pattern copy.
    pub const ROP3_PATCOPY: u8 = 0xf0;
    /// Pattern XOR destination.
    pub const ROP3_PATXOR: u8 = 0x5a;

    #[inline(always)]
    #[must_use]
    pub fn flags(&self) -> GmcFlags {
        GmcFlags::from_bits_truncate(self.0)
    }

    #[inline(always)]
    pub fn set_flags(&mut self, flags: GmcFlags) {
        let fields = (Self::DST_DATATYPE_MASK << Self::DST_DATATYPE_OFFSET)
            | (Self::ROP3_MASK << Self::ROP3_OFFSET);
        self.0 = (self.0 & fields) | flags.bits();
    }

    /// DST_DATATYPE
    ///
    /// # Errors
    /// Returns an error if the field holds an unencoded datatype.
    #[inline(always)]
    pub fn dst_datatype(&self) -> Result<DstDatatype, crate::encode::UnknownVariant<u8>> {
        let val = (self.0 >> Self::DST_DATATYPE_OFFSET) & Self::DST_DATATYPE_MASK;
        DstDatatype::from_bits(val as u8)
    }

    #[inline(always)]
    pub fn set_dst_datatype(&mut self, val: DstDatatype) {
        let val = u32::from(val.bits());
        self.0 = (self.0 & !(Self::DST_DATATYPE_MASK << Self::DST_DATATYPE_OFFSET))
            | ((val & Self::DST_DATATYPE_MASK) << Self::DST_DATATYPE_OFFSET);
    }

    #[inline(always)]
    #[must_use]
    pub fn rop3(&self) -> u8 {
        ((self.0 >> Self::ROP3_OFFSET) & Self::ROP3_MASK) as u8
    }

    #[inline(always)]
    pub fn set_rop3(&mut self, val: u8) {
        let val = u32::from(val);
        self.0 = (self.0 & !(Self::ROP3_MASK << Self::ROP3_OFFSET))
            | ((val & Self::ROP3_MASK) << Self::ROP3_OFFSET);
    }
}

bitflags! {
    /// CLR_CMP_CNTL
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClrCmpCntl: u32 {
        /// Reject pixels whose source colour equals CLR_CMP_CLR_SRC.
        const SRC_EQ_COLOR = 4;
        /// Compare against the source rather than the destination.
        const SOURCE = 1 << 24;
    }
}

bitflags! {
    /// DP_CNTL
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DpCntl: u32 {
        const DST_X_LEFT_TO_RIGHT = 1 << 0;
        const DST_Y_TOP_TO_BOTTOM = 1 << 1;
    }
}

/// Primitive topology for the vertex fetcher.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimType {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriangleList = 4,
    TriangleFan = 5,
    TriangleStrip = 6,
    /// Fixed-function only: three corners per axis-aligned rectangle.
    RectangleList = 8,
    /// Programmable pipeline only.
    QuadList = 13,
}

impl PrimType {
    /// Decode a bit pattern into an encoded enum variant.
    ///
    /// # Errors
    /// Returns an error if the bit pattern does not match any encoded variants.
    pub const fn from_bits(bits: u8) -> Result<Self, crate::encode::UnknownVariant<u8>> {
        match bits {
            1 => Ok(Self::PointList),
            2 => Ok(Self::LineList),
            3 => Ok(Self::LineStrip),
            4 => Ok(Self::TriangleList),
            5 => Ok(Self::TriangleFan),
            6 => Ok(Self::TriangleStrip),
            8 => Ok(Self::RectangleList),
            13 => Ok(Self::QuadList),
            bits => Err(crate::encode::UnknownVariant::new(bits)),
        }
    }

    /// The bit pattern of the variant
    #[must_use]
    pub const fn bits(&self) -> u8 {
        *self as u8
    }

    /// Vertices consumed by one primitive, or `None` for connected
    /// primitives where the whole batch forms a single group.
    #[must_use]
    pub const fn group_size(&self) -> Option<usize> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList | Self::RectangleList => Some(3),
            Self::QuadList => Some(4),
            Self::LineStrip | Self::TriangleFan | Self::TriangleStrip => None,
        }
    }
}

/// SE_VF_CNTL / VAP_VF_CNTL
#[repr(transparent)]
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct VfCntlReg(u32);

impl Register for VfCntlReg {
    fn from_raw(val: u32) -> Self {
        Self(val)
    }

    fn to_raw(self) -> u32 {
        self.0
    }
}

impl VfCntlReg {
    pub const PRIM_TYPE_OFFSET: usize = 0;
    pub const PRIM_TYPE_WIDTH: usize = 4;
    pub const PRIM_TYPE_MASK: u32 = 0xf;

    pub const PRIM_WALK_OFFSET: usize = 4;
    pub const PRIM_WALK_WIDTH: usize = 2;
    pub const PRIM_WALK_MASK: u32 = 0x3;
    /// Vertex data follows inline through the port.
    pub const PRIM_WALK_DATA: u32 = 3;

    pub const NUM_VERTICES_OFFSET: usize = 16;
    pub const NUM_VERTICES_WIDTH: usize = 16;
    pub const NUM_VERTICES_MASK: u32 = 0xffff;

    /// Inline-data primitive of `count` vertices.
    #[must_use]
    pub fn inline(prim: PrimType, count: u16) -> Self {
        let mut reg = Self::default();
        reg.set_prim_type(prim);
        reg.0 |= Self::PRIM_WALK_DATA << Self::PRIM_WALK_OFFSET;
        reg.set_num_vertices(count);
        reg
    }

    /// PRIM_TYPE
    ///
    /// # Errors
    /// Returns an error if the field holds an unencoded primitive type.
    #[inline(always)]
    pub fn prim_type(&self) -> Result<PrimType, crate::encode::UnknownVariant<u8>> {
        let val = (self.0 >> Self::PRIM_TYPE_OFFSET) & Self::PRIM_TYPE_MASK;
        PrimType::from_bits(val as u8)
    }

    #[inline(always)]
    pub fn set_prim_type(&mut self, val: PrimType) {
        let val = u32::from(val.bits());
        self.0 = (self.0 & !(Self::PRIM_TYPE_MASK << Self::PRIM_TYPE_OFFSET))
            | ((val & Self::PRIM_TYPE_MASK) << Self::PRIM_TYPE_OFFSET);
    }

    #[inline(always)]
    #[must_use]
    pub fn num_vertices(&self) -> u16 {
        ((self.0 >> Self::NUM_VERTICES_OFFSET) & Self::NUM_VERTICES_MASK) as u16
    }

    #[inline(always)]
    pub fn set_num_vertices(&mut self, val: u16) {
        let val = u32::from(val);
        self.0 = (self.0 & !(Self::NUM_VERTICES_MASK << Self::NUM_VERTICES_OFFSET))
            | ((val & Self::NUM_VERTICES_MASK) << Self::NUM_VERTICES_OFFSET);
    }
}

/// Register name for tracing.
#[must_use]
pub fn name(offset: u32) -> Option<&'static str> {
    Some(match offset {
        RBBM_SOFT_RESET => "RBBM_SOFT_RESET",
        HOST_PATH_CNTL => "HOST_PATH_CNTL",
        RBBM_STATUS => "RBBM_STATUS",
        DST_OFFSET => "DST_OFFSET",
        DST_PITCH => "DST_PITCH",
        DP_GUI_MASTER_CNTL => "DP_GUI_MASTER_CNTL",
        DP_BRUSH_FRGD_CLR => "DP_BRUSH_FRGD_CLR",
        SRC_OFFSET => "SRC_OFFSET",
        SRC_PITCH => "SRC_PITCH",
        CLR_CMP_CNTL => "CLR_CMP_CNTL",
        CLR_CMP_CLR_SRC => "CLR_CMP_CLR_SRC",
        CLR_CMP_MASK => "CLR_CMP_MASK",
        DP_CNTL => "DP_CNTL",
        DP_WRITE_MASK => "DP_WRITE_MASK",
        SC_TOP_LEFT => "SC_TOP_LEFT",
        SC_BOTTOM_RIGHT => "SC_BOTTOM_RIGHT",
        SE_PORT_DATA0 => "SE_PORT_DATA0",
        SE_VF_CNTL => "SE_VF_CNTL",
        _ => return None,
    })
}

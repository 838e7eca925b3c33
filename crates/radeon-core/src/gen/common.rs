//! Programming shared by every generation: the 2D engine registers and the
//! vertex port.

use radeon_registers::common::{
    ClrCmpCntl, DpCntl, DstDatatype, GmcFlags, GuiMasterCntlReg, VfCntlReg, CLR_CMP_CNTL, CLR_CMP_MASK, DP_CNTL,
    DP_GUI_MASTER_CNTL, DP_WRITE_MASK, DST_OFFSET, DST_PITCH, SC_BOTTOM_RIGHT, SC_TOP_LEFT, SE_PORT_DATA0, SE_VF_CNTL,
    SRC_OFFSET, SRC_PITCH,
};
use radeon_registers::{Register, YxReg};

use crate::context::{Bus, Context, DstState, SrcState};
use crate::error::AccelError;
use crate::geometry::Region;
use crate::surface::PixelFormat;
use crate::vertex::VertexBatch;

/// Stream a batch through the vertex port: the primitive header, then the
/// vertex words in FIFO-checked bursts of whole vertices.
pub fn emit_batch<B: Bus>(ctx: &mut Context<B>, batch: &VertexBatch) -> Result<(), AccelError> {
    let count = batch.vertex_count();
    let Ok(count16) = u16::try_from(count) else {
        unreachable!("{count} vertices exceed the primitive limit");
    };
    log::trace!("emit {:?} x{count}", batch.prim);

    let header = VfCntlReg::inline(batch.prim, count16);
    ctx.mmio.submit(&[(SE_VF_CNTL, header.to_raw())])?;

    let burst = ctx.config.burst_words(batch.layout.stride());
    for chunk in batch.words().chunks(burst) {
        ctx.mmio.reserve(chunk.len() as u32)?;
        for word in chunk {
            ctx.mmio.write(SE_PORT_DATA0, word.to_bits());
        }
    }
    Ok(())
}

/// 2D engine datatype for a destination format.
#[must_use]
pub fn dst_datatype(format: PixelFormat) -> DstDatatype {
    match format {
        PixelFormat::A8 | PixelFormat::Lut8 | PixelFormat::Alut44 | PixelFormat::I420 | PixelFormat::Yv12 => {
            DstDatatype::Cp8
        }
        PixelFormat::Rgb332 => DstDatatype::Rgb332,
        PixelFormat::Argb1555 | PixelFormat::Rgb555 => DstDatatype::Argb1555,
        PixelFormat::Argb4444 | PixelFormat::Rgb444 => DstDatatype::Argb4444,
        PixelFormat::Rgb16 => DstDatatype::Rgb565,
        PixelFormat::Rgb32 | PixelFormat::Argb => DstDatatype::Argb8888,
        PixelFormat::Ayuv => DstDatatype::Ayuv444,
        PixelFormat::Yuy2 => DstDatatype::Yvyu,
        PixelFormat::Uyvy => DstDatatype::Vyuy,
    }
}

/// 2D destination registers.
#[must_use]
pub fn destination_2d(dst: &DstState) -> [(u32, u32); 3] {
    let mut gmc = GuiMasterCntlReg::default();
    gmc.set_flags(
        GmcFlags::BRUSH_SOLID_COLOR | GmcFlags::SRC_DATATYPE_COLOR | GmcFlags::CLR_CMP_CNTL_DIS | GmcFlags::WR_MSK_DIS,
    );
    gmc.set_dst_datatype(dst_datatype(dst.format));
    gmc.set_rop3(GuiMasterCntlReg::ROP3_PATCOPY);
    [
        (DST_OFFSET, dst.offset),
        (DST_PITCH, dst.pitch),
        (DP_GUI_MASTER_CNTL, gmc.to_raw()),
    ]
}

#[must_use]
pub fn source_2d(src: &SrcState) -> [(u32, u32); 2] {
    [(SRC_OFFSET, src.offset), (SRC_PITCH, src.pitch)]
}

/// 2D scissor; the bottom-right corner is exclusive.
#[must_use]
pub fn clip_2d(clip: &Region) -> [(u32, u32); 2] {
    [
        (SC_TOP_LEFT, YxReg::new(clip.x1, clip.y1).to_raw()),
        (SC_BOTTOM_RIGHT, YxReg::new(clip.x2 + 1, clip.y2 + 1).to_raw()),
    ]
}

/// 2D engine defaults programmed after reset.
#[must_use]
pub fn defaults_2d() -> [(u32, u32); 4] {
    [
        (DP_CNTL, (DpCntl::DST_X_LEFT_TO_RIGHT | DpCntl::DST_Y_TOP_TO_BOTTOM).bits()),
        (DP_WRITE_MASK, 0xffff_ffff),
        (CLR_CMP_CNTL, 0),
        (CLR_CMP_MASK, 0xffff_ffff),
    ]
}

/// CLR_CMP_CNTL for source colour keying.
#[must_use]
pub fn colorkey_cntl(enabled: bool) -> u32 {
    if enabled {
        (ClrCmpCntl::SRC_EQ_COLOR | ClrCmpCntl::SOURCE).bits()
    } else {
        0
    }
}

/// Colour buffer pitch in pixels. Packed 4:2:2 buffers are addressed in
/// 32-bit pixel pairs.
#[must_use]
pub fn color_pitch_pixels(format: PixelFormat, pitch: u32) -> u32 {
    if format.is_packed_422() {
        pitch / 4
    } else {
        pitch / format.bytes_per_pixel()
    }
}

/// Clip in colour buffer units.
#[must_use]
pub fn storage_clip(format: PixelFormat, clip: &Region) -> Region {
    if format.is_packed_422() {
        Region::new(clip.x1.div_euclid(2), clip.y1, clip.x2.div_euclid(2), clip.y2)
    } else {
        *clip
    }
}

/// Texels per row as bound: a packed 4:2:2 source copied into a packed
/// 4:2:2 destination is sampled in pixel pairs.
#[must_use]
pub fn texel_width(src: &SrcState, dst_format: Option<PixelFormat>) -> u32 {
    if src.format.is_packed_422() && dst_format.is_some_and(PixelFormat::is_packed_422) {
        src.width.div_ceil(2)
    } else {
        src.width
    }
}

/// Size of the chroma plane of a planar source, rounded up.
#[must_use]
pub fn chroma_size(src: &SrcState) -> (u32, u32) {
    (src.width.div_ceil(2), src.height.div_ceil(2))
}

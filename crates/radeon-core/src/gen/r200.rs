//! R200: register-file combiners, YCbCr conversion in the filter register,
//! split vertex format.

use radeon_registers::common::{
    CLR_CMP_CLR_SRC, CLR_CMP_CNTL, CLR_CMP_MASK, DP_BRUSH_FRGD_CLR, DP_CNTL, DP_GUI_MASTER_CNTL, DP_WRITE_MASK,
    DST_OFFSET, DST_PITCH, SC_BOTTOM_RIGHT, SC_TOP_LEFT,
};
use radeon_registers::r100::{
    BlendCntlReg, BlendFactorCode, PpCntl, Rop, SeCntl, TexFormat, PP_CNTL, RB3D_BLENDCNTL, RB3D_CNTL,
    RB3D_COLOROFFSET, RB3D_COLORPITCH, RB3D_DC_FLUSH_ALL, RB3D_DSTCACHE_CTLSTAT, RB3D_PLANEMASK, RB3D_ROPCNTL,
    RB3D_ZSTENCILCNTL, RE_TOP_LEFT, RE_WIDTH_HEIGHT, SE_CNTL, SE_CNTL_STATUS, SE_TCL_BYPASS,
};
use radeon_registers::r200::{
    txablend, txcblend, AlphaArg, Blend2, ColorArg, TxFilter, TxFormatFlags, VteCntl, VtxFmt0, PP_TFACTOR_0,
    PP_TXABLEND2_0, PP_TXABLEND2_1, PP_TXABLEND_0, PP_TXABLEND_1, PP_TXCBLEND2_0, PP_TXCBLEND2_1, PP_TXCBLEND_0,
    PP_TXCBLEND_1, PP_TXFILTER_0, PP_TXFILTER_1, PP_TXFORMAT_0,
    PP_TXFORMAT_1, PP_TXFORMAT_X_0, PP_TXFORMAT_X_1, PP_TXOFFSET_0, PP_TXOFFSET_1, PP_TXPITCH_0, PP_TXPITCH_1,
    PP_TXSIZE_0, PP_TXSIZE_1, SE_VTE_CNTL, SE_VTX_FMT_0, SE_VTX_FMT_1, VTX_FMT_1_TEX0_ST,
};
use radeon_registers::{Family, Register};

use super::fixed::{self, TexBinding, TexUnit};
use super::{common, Generation};
use crate::color::{self, Color};
use crate::context::{Bus, Context, DstState, SrcState};
use crate::emit::RectShape;
use crate::error::AccelError;
use crate::geometry::Region;
use crate::planar::Plane;
use crate::state::{BlendFactor, BlittingFlags, DrawingFlags};
use crate::vertex::VertexLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct R200;

const UNIT0: TexUnit = TexUnit {
    format: PP_TXFORMAT_0,
    filter: PP_TXFILTER_0,
    offset: PP_TXOFFSET_0,
    size: PP_TXSIZE_0,
    pitch: PP_TXPITCH_0,
};

const UNIT1: TexUnit = TexUnit {
    format: PP_TXFORMAT_1,
    filter: PP_TXFILTER_1,
    offset: PP_TXOFFSET_1,
    size: PP_TXSIZE_1,
    pitch: PP_TXPITCH_1,
};

const SAVED: [u32; 27] = [
    DP_GUI_MASTER_CNTL,
    DP_CNTL,
    DP_WRITE_MASK,
    DST_OFFSET,
    DST_PITCH,
    SC_TOP_LEFT,
    SC_BOTTOM_RIGHT,
    CLR_CMP_CNTL,
    CLR_CMP_MASK,
    SE_CNTL_STATUS,
    SE_CNTL,
    SE_VTX_FMT_0,
    SE_VTX_FMT_1,
    SE_VTE_CNTL,
    PP_CNTL,
    PP_TXCBLEND2_0,
    PP_TXABLEND2_0,
    PP_TXCBLEND2_1,
    PP_TXABLEND2_1,
    RB3D_CNTL,
    RB3D_BLENDCNTL,
    RB3D_ROPCNTL,
    RB3D_PLANEMASK,
    RB3D_COLOROFFSET,
    RB3D_COLORPITCH,
    RE_TOP_LEFT,
    RE_WIDTH_HEIGHT,
];

/// Both combiners write R0, clamped.
const BLEND2_R0: u32 = Blend2::CLAMP_0_1.union(Blend2::OUTPUT_R0).bits();

fn tx_format(format: TexFormat, alpha: bool) -> u32 {
    let mut flags = TxFormatFlags::NON_POWER2;
    flags.set(TxFormatFlags::ALPHA_IN_MAP, alpha);
    u32::from(format.bits()) | flags.bits()
}

fn tx_filter(nearest: bool, yuv_to_rgb: bool) -> u32 {
    let mut filter = if nearest { TxFilter::NEAREST } else { TxFilter::LINEAR };
    filter.set(TxFilter::YUV_TO_RGB, yuv_to_rgb);
    filter.bits()
}

impl Generation for R200 {
    const FAMILY: Family = Family::R200;
    const RECT_SHAPE: RectShape = RectShape::RectangleList;
    const PIXEL_TEXCOORDS: bool = true;
    const SAVED_REGISTERS: &'static [u32] = &SAVED;

    fn restore<B: Bus>(ctx: &mut Context<B>) -> Result<(), AccelError> {
        let [a, b, c, d] = common::defaults_2d();
        ctx.mmio.submit(&[
            a,
            b,
            c,
            d,
            (SE_CNTL_STATUS, SE_TCL_BYPASS),
            (SE_CNTL, SeCntl::DEFAULT.bits()),
            (SE_VTX_FMT_0, 0),
            (SE_VTX_FMT_1, 0),
            (SE_VTE_CNTL, (VteCntl::VTX_XY_FMT | VteCntl::VTX_Z_FMT).bits()),
            (PP_CNTL, 0),
            (PP_TXCBLEND2_0, BLEND2_R0),
            (PP_TXABLEND2_0, BLEND2_R0),
            (RB3D_CNTL, 0),
            (RB3D_ZSTENCILCNTL, 0),
            (RB3D_ROPCNTL, Rop::Copy.to_raw()),
            (RB3D_PLANEMASK, 0xffff_ffff),
            (RB3D_BLENDCNTL, BlendCntlReg::new(BlendFactorCode::One, BlendFactorCode::Zero).to_raw()),
            (RB3D_DSTCACHE_CTLSTAT, RB3D_DC_FLUSH_ALL),
        ])
    }

    fn set_destination<B: Bus>(ctx: &mut Context<B>, dst: &DstState) -> Result<(), AccelError> {
        fixed::set_destination(ctx, dst)
    }

    fn set_source<B: Bus>(ctx: &mut Context<B>, src: &SrcState) -> Result<(), AccelError> {
        let dst_format = ctx.hw.dst().format;
        let TexBinding {
            format,
            alpha,
            yuv_to_rgb,
        } = fixed::tex_binding(src.format, dst_format);
        let width = common::texel_width(src, Some(dst_format));
        let [e0, e1, e2] = UNIT0.extent(src.offset, width, src.height, src.pitch);
        let [s0, s1] = common::source_2d(src);
        ctx.mmio.submit(&[
            (UNIT0.format, tx_format(format, alpha)),
            (PP_TXFORMAT_X_0, 0),
            (UNIT0.filter, tx_filter(src.nearest, yuv_to_rgb)),
            e0,
            e1,
            e2,
            s0,
            s1,
        ])
    }

    fn set_clip<B: Bus>(ctx: &mut Context<B>, clip: &Region) -> Result<(), AccelError> {
        fixed::set_clip(ctx, clip)
    }

    fn set_drawing_color<B: Bus>(
        ctx: &mut Context<B>,
        color: Color,
        index: u8,
        flags: DrawingFlags,
    ) -> Result<(), AccelError> {
        let dst = ctx.hw.dst();
        let color = if flags.contains(DrawingFlags::SRC_PREMULTIPLY) {
            color.premultiplied()
        } else {
            color
        };
        let constant = color::constant(dst.format, color, index);
        let pixel = color::pack(dst.format, color, index);
        ctx.hw.plane_colors = if dst.format.is_planar() {
            color::plane_constants(color)
        } else {
            [constant; 3]
        };

        if dst.format.is_packed_422() {
            let address = ctx.stage_pixel(pixel)?;
            let [e0, e1, e2] = UNIT1.extent(address, 1, 1, 32);
            ctx.mmio.submit(&[
                (UNIT1.format, tx_format(TexFormat::Argb8888, true)),
                (PP_TXFORMAT_X_1, 0),
                (UNIT1.filter, tx_filter(true, false)),
                e0,
                e1,
                e2,
            ])?;
        }
        ctx.mmio.submit(&[(PP_TFACTOR_0, constant), (DP_BRUSH_FRGD_CLR, pixel)])
    }

    fn set_blitting_color<B: Bus>(ctx: &mut Context<B>, color: Color, flags: BlittingFlags) -> Result<(), AccelError> {
        let constant = color::constant(ctx.hw.dst().format, color::blit_modulation(color, flags), 0);
        ctx.hw.plane_colors = [constant; 3];
        ctx.mmio.submit(&[(PP_TFACTOR_0, constant)])
    }

    fn set_src_colorkey<B: Bus>(ctx: &mut Context<B>, key: u32) -> Result<(), AccelError> {
        let mask = color::key_mask(ctx.hw.src().format);
        ctx.mmio.submit(&[(CLR_CMP_CLR_SRC, key & mask), (CLR_CMP_MASK, mask)])
    }

    fn set_blend_function<B: Bus>(ctx: &mut Context<B>, src: BlendFactor, dst: BlendFactor) -> Result<(), AccelError> {
        fixed::set_blend_function(ctx, src, dst)
    }

    fn set_drawing_flags<B: Bus>(ctx: &mut Context<B>, flags: DrawingFlags) -> Result<(), AccelError> {
        let (pp, cblend, ablend) = if ctx.hw.dst().format.is_packed_422() {
            (
                PpCntl::TEX_1_ENABLE | PpCntl::TEX_BLEND_0_ENABLE,
                txcblend(ColorArg::Zero, ColorArg::Zero, ColorArg::R1Color),
                txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::R1Alpha),
            )
        } else {
            (
                PpCntl::TEX_BLEND_0_ENABLE,
                txcblend(ColorArg::Zero, ColorArg::Zero, ColorArg::TfactorColor),
                txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::TfactorAlpha),
            )
        };
        let render = fixed::render_flags(flags.contains(DrawingFlags::BLEND), flags.contains(DrawingFlags::XOR));
        let [r0, r1] = fixed::render_writes(ctx, render);
        ctx.mmio.submit(&[
            (PP_CNTL, pp.bits()),
            (PP_TXCBLEND_0, cblend),
            (PP_TXCBLEND2_0, BLEND2_R0),
            (PP_TXABLEND_0, ablend),
            (PP_TXABLEND2_0, BLEND2_R0),
            r0,
            r1,
            (CLR_CMP_CNTL, 0),
            (SE_VTX_FMT_0, 0),
            (SE_VTX_FMT_1, 0),
            (SE_VTE_CNTL, (VteCntl::VTX_XY_FMT | VteCntl::VTX_Z_FMT).bits()),
        ])?;
        ctx.hw.drawing_flags = flags;
        ctx.hw.layout = Some(VertexLayout::Xy);
        Ok(())
    }

    fn set_blitting_flags<B: Bus>(
        ctx: &mut Context<B>,
        flags: BlittingFlags,
        layout: VertexLayout,
    ) -> Result<(), AccelError> {
        let cblend = if flags.intersects(BlittingFlags::COLORIZE | BlittingFlags::SRC_PREMULTCOLOR) {
            txcblend(ColorArg::R0Color, ColorArg::TfactorColor, ColorArg::Zero)
        } else {
            txcblend(ColorArg::Zero, ColorArg::Zero, ColorArg::R0Color)
        };
        let ablend = match (
            flags.contains(BlittingFlags::BLEND_ALPHACHANNEL),
            flags.contains(BlittingFlags::BLEND_COLORALPHA),
        ) {
            (true, true) => txablend(AlphaArg::R0Alpha, AlphaArg::TfactorAlpha, AlphaArg::Zero),
            (false, true) => txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::TfactorAlpha),
            _ => txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::R0Alpha),
        };
        let (fmt0, fmt1, vte) = match layout {
            VertexLayout::Xy => (VtxFmt0::empty(), 0, VteCntl::VTX_XY_FMT | VteCntl::VTX_Z_FMT),
            VertexLayout::XySt => (VtxFmt0::empty(), VTX_FMT_1_TEX0_ST, VteCntl::VTX_XY_FMT | VteCntl::VTX_Z_FMT),
            VertexLayout::XyzwSt => (VtxFmt0::Z0 | VtxFmt0::W0, VTX_FMT_1_TEX0_ST, VteCntl::all()),
        };
        // Stage 1 scales the modulated colour by the alpha stage 0 produced.
        let premultiply = flags.contains(BlittingFlags::SRC_PREMULTIPLY);
        let mut pp = PpCntl::TEX_0_ENABLE | PpCntl::TEX_BLEND_0_ENABLE;
        pp.set(PpCntl::TEX_BLEND_1_ENABLE, premultiply);
        if premultiply {
            ctx.mmio.submit(&[
                (PP_TXCBLEND_1, txcblend(ColorArg::R0Color, ColorArg::R0Alpha, ColorArg::Zero)),
                (PP_TXCBLEND2_1, BLEND2_R0),
                (PP_TXABLEND_1, txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::R0Alpha)),
                (PP_TXABLEND2_1, BLEND2_R0),
            ])?;
        }
        let render = fixed::render_flags(flags.intersects(BlittingFlags::BLEND), flags.contains(BlittingFlags::XOR));
        let [r0, r1] = fixed::render_writes(ctx, render);
        ctx.mmio.submit(&[
            (PP_CNTL, pp.bits()),
            (PP_TXCBLEND_0, cblend),
            (PP_TXCBLEND2_0, BLEND2_R0),
            (PP_TXABLEND_0, ablend),
            (PP_TXABLEND2_0, BLEND2_R0),
            r0,
            r1,
            (CLR_CMP_CNTL, common::colorkey_cntl(flags.contains(BlittingFlags::SRC_COLORKEY))),
            (SE_VTX_FMT_0, fmt0.bits()),
            (SE_VTX_FMT_1, fmt1),
            (SE_VTE_CNTL, vte.bits()),
        ])?;
        ctx.hw.blitting_flags = flags;
        ctx.hw.layout = Some(layout);
        Ok(())
    }

    fn select_plane<B: Bus>(ctx: &mut Context<B>, plane: Plane) -> Result<(), AccelError> {
        fixed::select_plane(ctx, plane, PP_TFACTOR_0, &UNIT0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yuv_conversion_lives_in_the_filter() {
        assert_eq!(tx_filter(false, true) & TxFilter::YUV_TO_RGB.bits(), TxFilter::YUV_TO_RGB.bits());
        assert_eq!(tx_filter(true, false), TxFilter::NEAREST.bits());
    }

    #[test]
    fn format_keeps_texel_code_in_low_bits() {
        assert_eq!(tx_format(TexFormat::Argb8888, true) & 0x1f, 6);
        assert_ne!(tx_format(TexFormat::Argb8888, true) & TxFormatFlags::ALPHA_IN_MAP.bits(), 0);
    }
}

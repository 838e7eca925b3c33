//! R100: one fixed-function texture combiner per unit, texture coordinates
//! in texels.

use radeon_registers::common::{
    CLR_CMP_CLR_SRC, CLR_CMP_CNTL, CLR_CMP_MASK, DP_BRUSH_FRGD_CLR, DP_CNTL, DP_GUI_MASTER_CNTL, DP_WRITE_MASK,
    DST_OFFSET, DST_PITCH, SC_BOTTOM_RIGHT, SC_TOP_LEFT,
};
use radeon_registers::r100::{
    txablend, txcblend, AlphaArg, BlendCntlReg, BlendFactorCode, ColorArg, PpCntl, Rop, SeCntl, SeVtxFmt, TexFormat,
    TxFilter, TxFormatFlags, TxFormatReg, PP_CNTL, PP_TEX_PITCH_0, PP_TEX_PITCH_1, PP_TEX_SIZE_0, PP_TEX_SIZE_1,
    PP_TFACTOR_0, PP_TXABLEND_0, PP_TXCBLEND_0, PP_TXFILTER_0, PP_TXFILTER_1, PP_TXFORMAT_0, PP_TXFORMAT_1,
    PP_TXOFFSET_0, PP_TXOFFSET_1, RB3D_BLENDCNTL, RB3D_CNTL, RB3D_COLOROFFSET, RB3D_COLORPITCH,
    RB3D_DC_FLUSH_ALL, RB3D_DSTCACHE_CTLSTAT, RB3D_PLANEMASK, RB3D_ROPCNTL, RB3D_ZSTENCILCNTL, RE_TOP_LEFT,
    RE_WIDTH_HEIGHT, SE_CNTL, SE_CNTL_STATUS, SE_COORD_FMT, SE_TCL_BYPASS, SE_VTX_FMT,
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
pub struct R100;

const UNIT0: TexUnit = TexUnit {
    format: PP_TXFORMAT_0,
    filter: PP_TXFILTER_0,
    offset: PP_TXOFFSET_0,
    size: PP_TEX_SIZE_0,
    pitch: PP_TEX_PITCH_0,
};

/// Samples the staged constant pixel when filling packed 4:2:2 targets.
const UNIT1: TexUnit = TexUnit {
    format: PP_TXFORMAT_1,
    filter: PP_TXFILTER_1,
    offset: PP_TXOFFSET_1,
    size: PP_TEX_SIZE_1,
    pitch: PP_TEX_PITCH_1,
};

const SAVED: [u32; 22] = [
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
    SE_COORD_FMT,
    SE_VTX_FMT,
    PP_CNTL,
    RB3D_CNTL,
    RB3D_BLENDCNTL,
    RB3D_ROPCNTL,
    RB3D_PLANEMASK,
    RB3D_COLOROFFSET,
    RB3D_COLORPITCH,
    RE_TOP_LEFT,
    RE_WIDTH_HEIGHT,
];

fn tx_format(binding: TexBinding) -> u32 {
    let mut flags = TxFormatFlags::NON_POWER2;
    flags.set(TxFormatFlags::ALPHA_IN_MAP, binding.alpha);
    flags.set(TxFormatFlags::YUV_TO_RGB, binding.yuv_to_rgb);
    TxFormatReg::new(binding.format, flags).to_raw()
}

fn tx_filter(nearest: bool) -> u32 {
    if nearest {
        TxFilter::NEAREST.bits()
    } else {
        TxFilter::LINEAR.bits()
    }
}

impl Generation for R100 {
    const FAMILY: Family = Family::R100;
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
            (SE_COORD_FMT, 0),
            (SE_CNTL, SeCntl::DEFAULT.bits()),
            (SE_VTX_FMT, 0),
            (PP_CNTL, 0),
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
        let binding = fixed::tex_binding(src.format, dst_format);
        let width = common::texel_width(src, Some(dst_format));
        let [e0, e1, e2] = UNIT0.extent(src.offset, width, src.height, src.pitch);
        let [s0, s1] = common::source_2d(src);
        ctx.mmio.submit(&[
            (UNIT0.format, tx_format(binding)),
            (UNIT0.filter, tx_filter(src.nearest)),
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
            let format = TxFormatReg::new(TexFormat::Argb8888, TxFormatFlags::NON_POWER2 | TxFormatFlags::ALPHA_IN_MAP);
            let [e0, e1, e2] = UNIT1.extent(address, 1, 1, 32);
            ctx.mmio.submit(&[
                (UNIT1.format, format.to_raw()),
                (UNIT1.filter, tx_filter(true)),
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
                txcblend(ColorArg::Zero, ColorArg::Zero, ColorArg::T1Color),
                txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::T1Alpha),
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
            (PP_TXABLEND_0, ablend),
            r0,
            r1,
            (CLR_CMP_CNTL, 0),
            (SE_VTX_FMT, 0),
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
        assert!(
            !flags.contains(BlittingFlags::SRC_PREMULTIPLY),
            "source premultiplication is not available on R100"
        );
        let cblend = if flags.intersects(BlittingFlags::COLORIZE | BlittingFlags::SRC_PREMULTCOLOR) {
            txcblend(ColorArg::T0Color, ColorArg::TfactorColor, ColorArg::Zero)
        } else {
            txcblend(ColorArg::Zero, ColorArg::Zero, ColorArg::T0Color)
        };
        let ablend = match (
            flags.contains(BlittingFlags::BLEND_ALPHACHANNEL),
            flags.contains(BlittingFlags::BLEND_COLORALPHA),
        ) {
            (true, true) => txablend(AlphaArg::T0Alpha, AlphaArg::TfactorAlpha, AlphaArg::Zero),
            (false, true) => txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::TfactorAlpha),
            _ => txablend(AlphaArg::Zero, AlphaArg::Zero, AlphaArg::T0Alpha),
        };
        let vtx = match layout {
            VertexLayout::Xy => SeVtxFmt::empty(),
            VertexLayout::XySt => SeVtxFmt::ST0,
            VertexLayout::XyzwSt => SeVtxFmt::Z | SeVtxFmt::W0 | SeVtxFmt::ST0,
        };
        let render = fixed::render_flags(flags.intersects(BlittingFlags::BLEND), flags.contains(BlittingFlags::XOR));
        let [r0, r1] = fixed::render_writes(ctx, render);
        ctx.mmio.submit(&[
            (PP_CNTL, (PpCntl::TEX_0_ENABLE | PpCntl::TEX_BLEND_0_ENABLE).bits()),
            (PP_TXCBLEND_0, cblend),
            (PP_TXABLEND_0, ablend),
            r0,
            r1,
            (CLR_CMP_CNTL, common::colorkey_cntl(flags.contains(BlittingFlags::SRC_COLORKEY))),
            (SE_VTX_FMT, vtx.bits()),
        ])?;
        ctx.hw.blitting_flags = flags;
        ctx.hw.layout = Some(layout);
        Ok(())
    }

    fn select_plane<B: Bus>(ctx: &mut Context<B>, plane: Plane) -> Result<(), AccelError> {
        fixed::select_plane(ctx, plane, PP_TFACTOR_0, &UNIT0)
    }
}

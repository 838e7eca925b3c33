//! R300: programmable vertex and fragment pipeline.
//!
//! All fragment programs are uploaded at reset; state changes only move the
//! code window. Texture coordinates are normalized and the destination
//! cache must be flushed after every primitive group.

use radeon_registers::common::{
    DP_BRUSH_FRGD_CLR, DP_CNTL, DP_GUI_MASTER_CNTL, DP_WRITE_MASK, DST_OFFSET, DST_PITCH, SC_BOTTOM_RIGHT,
    SC_TOP_LEFT,
};
use radeon_registers::r100::{BlendCntlReg, BlendFactorCode, Rop};
use radeon_registers::r300::microcode::{Program, PASSTHROUGH_VS, PVS_CODE_CNTL_0, PVS_CODE_CNTL_1};
use radeon_registers::r300::{
    color_pitch, rs_count, scissor, stream_element, tx_format, tx_size, BlendCntl, ColorFormat, RopCntl, Sel,
    StreamType, TexFormat, TxFilter0, DST_CACHE_FLUSH, GA_COLOR_CONTROL, GA_COLOR_CONTROL_FLAT, GB_ENABLE,
    OUTPUT_VTX_POS_PRESENT, OUTPUT_VTX_TEX0_ST, PFS_PARAM_0_X, RB3D_ABLENDCNTL, RB3D_BLENDCNTL, RB3D_COLOROFFSET0,
    RB3D_COLORPITCH0, RB3D_ROPCNTL, RS_COUNT, RS_INST_0, RS_INST_TEX0, SC_SCISSOR0, SC_SCISSOR1, TX_ENABLE,
    TX_FILTER0_0, TX_FILTER1_0, TX_FORMAT2_0, TX_FORMAT_0, TX_FORMAT_YUV_TO_RGB, TX_OFFSET_0, TX_SIZE_0,
    US_ALU_ALPHA_ADDR_0, US_ALU_ALPHA_INST_0, US_ALU_RGB_ADDR_0, US_ALU_RGB_INST_0, US_CODE_ADDR_0, US_CODE_ADDR_1,
    US_CODE_ADDR_2, US_CODE_ADDR_3, US_CODE_OFFSET, US_CONFIG, US_OUT_FMT_0, US_OUT_FMT_C4_8, US_PIXSIZE,
    US_TEX_INST_0, VAP_CNTL, VAP_CNTL_PASSTHROUGH, VAP_OUTPUT_VTX_FMT_0, VAP_OUTPUT_VTX_FMT_1,
    VAP_PROG_STREAM_CNTL_0, VAP_PVS_CODE_CNTL_0, VAP_PVS_CODE_CNTL_1, VAP_PVS_UPLOAD_ADDRESS, VAP_PVS_UPLOAD_DATA,
    VAP_VTX_SIZE,
};
use radeon_registers::{Family, Register};

use super::{common, Generation};
use crate::color::{self, Color};
use crate::context::{Bus, Context, DstState, SrcState};
use crate::emit::RectShape;
use crate::error::AccelError;
use crate::geometry::Region;
use crate::planar::Plane;
use crate::state::{BlendFactor, BlittingFlags, Category, DrawingFlags};
use crate::surface::PixelFormat;
use crate::vertex::VertexLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct R300;

/// Texture unit register stride.
const UNIT_STRIDE: u32 = 4;

const SAVED: [u32; 31] = [
    DP_GUI_MASTER_CNTL,
    DP_CNTL,
    DP_WRITE_MASK,
    DST_OFFSET,
    DST_PITCH,
    SC_TOP_LEFT,
    SC_BOTTOM_RIGHT,
    VAP_CNTL,
    VAP_VTX_SIZE,
    VAP_PROG_STREAM_CNTL_0,
    VAP_OUTPUT_VTX_FMT_0,
    VAP_OUTPUT_VTX_FMT_1,
    GB_ENABLE,
    GA_COLOR_CONTROL,
    TX_ENABLE,
    RS_COUNT,
    RS_INST_0,
    SC_SCISSOR0,
    SC_SCISSOR1,
    US_CONFIG,
    US_PIXSIZE,
    US_CODE_OFFSET,
    US_CODE_ADDR_0,
    US_CODE_ADDR_3,
    US_OUT_FMT_0,
    RB3D_BLENDCNTL,
    RB3D_ABLENDCNTL,
    RB3D_ROPCNTL,
    RB3D_COLOROFFSET0,
    RB3D_COLORPITCH0,
    TX_OFFSET_0,
];

const RGBA: [Sel; 4] = [Sel::Z, Sel::Y, Sel::X, Sel::W];
const RGB1: [Sel; 4] = [Sel::Z, Sel::Y, Sel::X, Sel::One];
const LUMA: [Sel; 4] = [Sel::X, Sel::X, Sel::X, Sel::One];

fn color_format(format: PixelFormat) -> ColorFormat {
    match format {
        PixelFormat::A8 | PixelFormat::Lut8 | PixelFormat::Alut44 | PixelFormat::I420 | PixelFormat::Yv12 => {
            ColorFormat::I8
        }
        PixelFormat::Rgb332 => ColorFormat::Rgb332,
        PixelFormat::Argb1555 | PixelFormat::Rgb555 => ColorFormat::Argb1555,
        PixelFormat::Argb4444 | PixelFormat::Rgb444 => ColorFormat::Argb4444,
        PixelFormat::Rgb16 => ColorFormat::Rgb565,
        PixelFormat::Rgb32 | PixelFormat::Argb | PixelFormat::Ayuv => ColorFormat::Argb8888,
        PixelFormat::Yuy2 => ColorFormat::Yvyu,
        PixelFormat::Uyvy => ColorFormat::Vyuy,
    }
}

/// TX_FORMAT and bytes per texel for sampling `src` into `dst`.
fn texture(src: PixelFormat, dst: PixelFormat) -> (u32, u32) {
    let pairs = src.is_packed_422() && dst.is_packed_422();
    match src {
        PixelFormat::A8 => (tx_format(TexFormat::X8, [Sel::One, Sel::One, Sel::One, Sel::X]), 1),
        PixelFormat::Lut8 | PixelFormat::I420 | PixelFormat::Yv12 => (tx_format(TexFormat::X8, LUMA), 1),
        PixelFormat::Alut44 => (tx_format(TexFormat::X8, [Sel::X; 4]), 1),
        PixelFormat::Rgb332 => (tx_format(TexFormat::Z3Y3X2, RGB1), 1),
        PixelFormat::Argb1555 => (tx_format(TexFormat::W1Z5Y5X5, RGBA), 2),
        PixelFormat::Rgb555 => (tx_format(TexFormat::W1Z5Y5X5, RGB1), 2),
        PixelFormat::Argb4444 => (tx_format(TexFormat::W4Z4Y4X4, RGBA), 2),
        PixelFormat::Rgb444 => (tx_format(TexFormat::W4Z4Y4X4, RGB1), 2),
        PixelFormat::Rgb16 => (tx_format(TexFormat::Z5Y6X5, RGB1), 2),
        PixelFormat::Rgb32 => (tx_format(TexFormat::W8Z8Y8X8, RGB1), 4),
        PixelFormat::Argb | PixelFormat::Ayuv => (tx_format(TexFormat::W8Z8Y8X8, RGBA), 4),
        PixelFormat::Yuy2 | PixelFormat::Uyvy if pairs => (tx_format(TexFormat::W8Z8Y8X8, RGBA), 4),
        PixelFormat::Yuy2 => (tx_format(TexFormat::G8R8G8B8, RGB1) | TX_FORMAT_YUV_TO_RGB, 2),
        PixelFormat::Uyvy => (tx_format(TexFormat::R8G8B8G8, RGB1) | TX_FORMAT_YUV_TO_RGB, 2),
    }
}

fn tx_filter(nearest: bool) -> u32 {
    if nearest {
        TxFilter0::NEAREST.bits()
    } else {
        TxFilter0::LINEAR.bits()
    }
}

/// PFS_PARAM_0 as normalized floats.
fn constant_writes(argb: u32) -> [(u32, u32); 4] {
    let channel = |shift: u32| (((argb >> shift) & 0xff) as f32 / 255.0).to_bits();
    [
        (PFS_PARAM_0_X, channel(16)),
        (PFS_PARAM_0_X + 4, channel(8)),
        (PFS_PARAM_0_X + 8, channel(0)),
        (PFS_PARAM_0_X + 12, channel(24)),
    ]
}

fn scissor_writes(clip: &Region) -> [(u32, u32); 2] {
    [
        (SC_SCISSOR0, scissor(clip.x1, clip.y1)),
        (SC_SCISSOR1, scissor(clip.x2, clip.y2)),
    ]
}

/// The blit's alpha is the constant alone, not the texel's.
fn constant_alpha_only(flags: BlittingFlags) -> bool {
    flags.contains(BlittingFlags::BLEND_COLORALPHA) && !flags.contains(BlittingFlags::BLEND_ALPHACHANNEL)
}

/// Fragment program for a blitting flag combination.
///
/// Colour is the texel times the constant from [`blit_constant`], then
/// times the output alpha for `SRC_PREMULTIPLY`. With constant alpha alone
/// that last factor is folded into the constant too.
fn blit_program(flags: BlittingFlags) -> Program {
    let premultiply = flags.contains(BlittingFlags::SRC_PREMULTIPLY);
    let coloralpha = flags.contains(BlittingFlags::BLEND_COLORALPHA);
    let modulate = flags.intersects(BlittingFlags::COLORIZE | BlittingFlags::SRC_PREMULTCOLOR);

    if constant_alpha_only(flags) {
        if modulate || premultiply {
            Program::BlitModulateColorAlpha
        } else {
            Program::BlitColorAlpha
        }
    } else if premultiply {
        if modulate || coloralpha {
            Program::BlitPremultiplyModulate
        } else {
            Program::BlitPremultiply
        }
    } else if coloralpha {
        Program::BlitModulate
    } else if modulate {
        Program::BlitColorize
    } else {
        Program::Blit
    }
}

/// PFS_PARAM_0 for a blit under `flags`.
fn blit_constant(color: Color, flags: BlittingFlags) -> u32 {
    let mut k = color::blit_modulation(color, flags);
    if flags.contains(BlittingFlags::SRC_PREMULTIPLY) && constant_alpha_only(flags) {
        k.r = color::scale(k.r, k.a);
        k.g = color::scale(k.g, k.a);
        k.b = color::scale(k.b, k.a);
    }
    k.argb()
}

/// Fragment program window, rasteriser routing and vertex stream layout.
fn program_writes(program: Program, layout: VertexLayout, tx_enable: u32) -> Vec<(u32, u32)> {
    let (stream, output_1) = match layout {
        VertexLayout::Xy => (stream_element(StreamType::Float2, 0, true), 0),
        VertexLayout::XySt => (
            stream_element(StreamType::Float2, 0, false) | (stream_element(StreamType::Float2, 1, true) << 16),
            OUTPUT_VTX_TEX0_ST,
        ),
        VertexLayout::XyzwSt => (
            stream_element(StreamType::Float4, 0, false) | (stream_element(StreamType::Float2, 1, true) << 16),
            OUTPUT_VTX_TEX0_ST,
        ),
    };
    let texcoords = program.texcoords();
    vec![
        (US_CONFIG, program.us_config()),
        (US_PIXSIZE, program.code().max_temp),
        (US_CODE_OFFSET, program.code_offset()),
        (US_CODE_ADDR_0, 0),
        (US_CODE_ADDR_1, 0),
        (US_CODE_ADDR_2, 0),
        (US_CODE_ADDR_3, program.code_addr()),
        (RS_COUNT, rs_count(texcoords)),
        (RS_INST_0, if texcoords == 0 { 0 } else { RS_INST_TEX0 }),
        (TX_ENABLE, tx_enable),
        (VAP_PROG_STREAM_CNTL_0, stream),
        (VAP_OUTPUT_VTX_FMT_0, OUTPUT_VTX_POS_PRESENT),
        (VAP_OUTPUT_VTX_FMT_1, output_1),
        (VAP_VTX_SIZE, layout.stride() as u32),
    ]
}

/// Blend and ROP control; blend factors come from the mirror.
fn render_writes<B>(ctx: &mut Context<B>, blend: bool, xor: bool) -> [(u32, u32); 3] {
    let enable = if blend {
        BlendCntl::ALPHA_BLEND_ENABLE | BlendCntl::READ_ENABLE
    } else {
        BlendCntl::empty()
    };
    ctx.hw.rb3d_flags = enable.bits();
    let rop = if xor {
        RopCntl::ROP_ENABLE.bits() | Rop::Xor.to_raw()
    } else {
        Rop::Copy.to_raw()
    };
    [
        (RB3D_BLENDCNTL, ctx.hw.blend | enable.bits()),
        (RB3D_ABLENDCNTL, ctx.hw.blend),
        (RB3D_ROPCNTL, rop),
    ]
}

/// One-time vertex and fragment microcode upload.
fn microcode_writes() -> Vec<(u32, u32)> {
    let mut writes = vec![
        (VAP_PVS_CODE_CNTL_0, PVS_CODE_CNTL_0),
        (VAP_PVS_CODE_CNTL_1, PVS_CODE_CNTL_1),
        (VAP_PVS_UPLOAD_ADDRESS, 0),
    ];
    writes.extend(PASSTHROUGH_VS.iter().map(|&word| (VAP_PVS_UPLOAD_DATA, word)));

    for program in Program::ALL {
        let code = program.code();
        let (alu_base, tex_base) = program.base();
        for (i, &inst) in code.tex.iter().enumerate() {
            writes.push((US_TEX_INST_0 + 4 * (tex_base + i as u32), inst));
        }
        for (i, inst) in code.alu.iter().enumerate() {
            let slot = 4 * (alu_base + i as u32);
            writes.push((US_ALU_RGB_ADDR_0 + slot, inst.rgb_addr));
            writes.push((US_ALU_ALPHA_ADDR_0 + slot, inst.alpha_addr));
            writes.push((US_ALU_RGB_INST_0 + slot, inst.rgb_inst));
            writes.push((US_ALU_ALPHA_INST_0 + slot, inst.alpha_inst));
        }
    }
    writes
}

impl Generation for R300 {
    const FAMILY: Family = Family::R300;
    const RECT_SHAPE: RectShape = RectShape::QuadList;
    const PIXEL_TEXCOORDS: bool = false;
    const SAVED_REGISTERS: &'static [u32] = &SAVED;

    fn restore<B: Bus>(ctx: &mut Context<B>) -> Result<(), AccelError> {
        let blend = BlendCntlReg::new(BlendFactorCode::One, BlendFactorCode::Zero).to_raw();
        let mut writes = common::defaults_2d().to_vec();
        writes.extend([
            (VAP_CNTL, VAP_CNTL_PASSTHROUGH),
            (GB_ENABLE, 0),
            (GA_COLOR_CONTROL, GA_COLOR_CONTROL_FLAT),
            (US_OUT_FMT_0, US_OUT_FMT_C4_8),
            (RB3D_BLENDCNTL, blend),
            (RB3D_ABLENDCNTL, blend),
            (RB3D_ROPCNTL, Rop::Copy.to_raw()),
        ]);
        writes.extend(microcode_writes());
        writes.extend(DST_CACHE_FLUSH);
        ctx.mmio.submit(&writes)?;
        ctx.hw.blend = blend;
        log::debug!("r300 microcode resident: {} programs", Program::ALL.len());
        Ok(())
    }

    fn set_destination<B: Bus>(ctx: &mut Context<B>, dst: &DstState) -> Result<(), AccelError> {
        let [a, b, c] = common::destination_2d(dst);
        let pitch = color_pitch(common::color_pitch_pixels(dst.format, dst.pitch), color_format(dst.format));
        ctx.mmio.submit(&[a, b, c, (RB3D_COLOROFFSET0, dst.offset), (RB3D_COLORPITCH0, pitch)])
    }

    fn set_source<B: Bus>(ctx: &mut Context<B>, src: &SrcState) -> Result<(), AccelError> {
        let dst_format = ctx.hw.dst().format;
        let (format, texel_bytes) = texture(src.format, dst_format);
        let width = common::texel_width(src, Some(dst_format));
        let [s0, s1] = common::source_2d(src);
        ctx.mmio.submit(&[
            (TX_FILTER0_0, tx_filter(src.nearest)),
            (TX_FILTER1_0, 0),
            (TX_SIZE_0, tx_size(width, src.height)),
            (TX_FORMAT_0, format),
            (TX_FORMAT2_0, (src.pitch / texel_bytes).saturating_sub(1)),
            (TX_OFFSET_0, src.offset),
            s0,
            s1,
        ])
    }

    fn set_clip<B: Bus>(ctx: &mut Context<B>, clip: &Region) -> Result<(), AccelError> {
        let storage = common::storage_clip(ctx.hw.dst().format, clip);
        let [a, b] = common::clip_2d(&storage);
        let [c, d] = scissor_writes(&storage);
        ctx.mmio.submit(&[a, b, c, d])?;
        ctx.hw.clip = *clip;
        Ok(())
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
            ctx.mmio.submit(&[
                (TX_FILTER0_0 + UNIT_STRIDE, tx_filter(true)),
                (TX_FILTER1_0 + UNIT_STRIDE, 0),
                (TX_SIZE_0 + UNIT_STRIDE, tx_size(1, 1)),
                (TX_FORMAT_0 + UNIT_STRIDE, tx_format(TexFormat::W8Z8Y8X8, RGBA)),
                (TX_FORMAT2_0 + UNIT_STRIDE, 0),
                (TX_OFFSET_0 + UNIT_STRIDE, address),
            ])?;
        }
        let [x, y, z, w] = constant_writes(constant);
        ctx.mmio.submit(&[x, y, z, w, (DP_BRUSH_FRGD_CLR, pixel)])
    }

    fn set_blitting_color<B: Bus>(ctx: &mut Context<B>, color: Color, flags: BlittingFlags) -> Result<(), AccelError> {
        let constant = blit_constant(color, flags);
        ctx.hw.plane_colors = [constant; 3];
        ctx.mmio.submit(&constant_writes(constant))
    }

    fn set_src_colorkey<B: Bus>(_ctx: &mut Context<B>, _key: u32) -> Result<(), AccelError> {
        unreachable!("source colour keying is not available on R300")
    }

    fn set_blend_function<B: Bus>(ctx: &mut Context<B>, src: BlendFactor, dst: BlendFactor) -> Result<(), AccelError> {
        let alpha = ctx.hw.dst().format.has_alpha();
        let factors = BlendCntlReg::new(src.code(alpha), dst.code(alpha)).to_raw();
        ctx.hw.blend = factors;
        ctx.mmio.submit(&[
            (RB3D_BLENDCNTL, factors | ctx.hw.rb3d_flags),
            (RB3D_ABLENDCNTL, factors),
        ])
    }

    fn set_drawing_flags<B: Bus>(ctx: &mut Context<B>, flags: DrawingFlags) -> Result<(), AccelError> {
        let (program, tx_enable) = if ctx.hw.dst().format.is_packed_422() {
            (Program::Fill422, 1 << 1)
        } else {
            (Program::Fill, 0)
        };
        let mut writes = program_writes(program, VertexLayout::Xy, tx_enable);
        writes.extend(render_writes(
            ctx,
            flags.contains(DrawingFlags::BLEND),
            flags.contains(DrawingFlags::XOR),
        ));
        ctx.mmio.submit(&writes)?;
        log::debug!("drawing program {program:?}");
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
            !flags.contains(BlittingFlags::SRC_COLORKEY),
            "source colour keying is not available on R300"
        );
        let program = blit_program(flags);
        let mut writes = program_writes(program, layout, 1);
        writes.extend(render_writes(
            ctx,
            flags.intersects(BlittingFlags::BLEND),
            flags.contains(BlittingFlags::XOR),
        ));
        ctx.mmio.submit(&writes)?;
        log::debug!("blitting program {program:?}");
        ctx.hw.blitting_flags = flags;
        ctx.hw.layout = Some(layout);
        Ok(())
    }

    fn select_plane<B: Bus>(ctx: &mut Context<B>, plane: Plane) -> Result<(), AccelError> {
        let dst = ctx.hw.dst();
        let category = ctx.valid.category();
        let src = ctx.hw.src.filter(|s| category == Some(Category::Blitting) && s.format.is_planar());

        let (offset, pitch, clip, constant) = match plane {
            Plane::Luma => (dst.offset, dst.pitch, ctx.hw.clip, ctx.hw.plane_colors[0]),
            Plane::Cb => (dst.cb_offset, dst.pitch / 2, ctx.hw.clip.halved(), ctx.hw.plane_colors[1]),
            Plane::Cr => (dst.cr_offset, dst.pitch / 2, ctx.hw.clip.halved(), ctx.hw.plane_colors[2]),
        };

        let mut writes = vec![(RB3D_COLOROFFSET0, offset)];
        if plane != Plane::Cr {
            writes.push((RB3D_COLORPITCH0, color_pitch(pitch, ColorFormat::I8)));
            writes.extend(scissor_writes(&clip));
        }
        if category == Some(Category::Drawing) {
            writes.extend(constant_writes(constant));
        }
        if let Some(src) = src {
            let (w, h) = common::chroma_size(&src);
            match plane {
                Plane::Luma => writes.extend([
                    (TX_OFFSET_0, src.offset),
                    (TX_SIZE_0, tx_size(src.width, src.height)),
                    (TX_FORMAT2_0, src.pitch.saturating_sub(1)),
                ]),
                Plane::Cb => writes.extend([
                    (TX_OFFSET_0, src.cb_offset),
                    (TX_SIZE_0, tx_size(w, h)),
                    (TX_FORMAT2_0, (src.pitch / 2).saturating_sub(1)),
                ]),
                Plane::Cr => writes.push((TX_OFFSET_0, src.cr_offset)),
            }
        }
        ctx.mmio.submit(&writes)
    }

    fn finish_group<B: Bus>(ctx: &mut Context<B>) -> Result<(), AccelError> {
        ctx.mmio.submit(&DST_CACHE_FLUSH)
    }

    fn emit_commands<B: Bus>(ctx: &mut Context<B>) -> Result<(), AccelError> {
        ctx.mmio.submit(&DST_CACHE_FLUSH)
    }
}

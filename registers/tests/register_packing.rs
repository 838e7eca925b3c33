//! Packing checks for the typed register layouts.

use radeon_registers::common::{DstDatatype, GuiMasterCntlReg, PrimType, RbbmStatusReg, SoftReset, VfCntlReg};
use radeon_registers::r100::{BlendCntlReg, BlendFactorCode, ColorFormat, Rb3dCntl, Rb3dCntlReg};
use radeon_registers::{r300, Family, Register, YxReg};

// ============================================================================
// Shared registers
// ============================================================================

#[test]
fn test_rbbm_status_fields() {
    let status = RbbmStatusReg::from_raw(0x8000_0040);
    assert_eq!(status.fifo_cnt(), 64);
    assert!(status.active());

    let idle = RbbmStatusReg::from_raw(0x0000_0005);
    assert_eq!(idle.fifo_cnt(), 5);
    assert!(!idle.active());
}

#[test]
fn test_engine_reset_mask() {
    assert_eq!(SoftReset::ENGINE.bits(), 0x7f);
    assert!(!SoftReset::ENGINE.contains(SoftReset::HDP));
}

#[test]
fn test_vf_cntl_inline_point() {
    let reg = VfCntlReg::inline(PrimType::PointList, 1);
    assert_eq!(reg.to_raw(), 0x0001_0031);
    assert_eq!(reg.prim_type(), Ok(PrimType::PointList));
    assert_eq!(reg.num_vertices(), 1);
}

#[test]
fn test_vf_cntl_rejects_unknown_prim() {
    let reg = VfCntlReg::from_raw(0x0000_0007);
    let err = reg.prim_type().unwrap_err();
    assert_eq!(err.bits(), 7);
}

#[test]
fn test_gui_master_cntl_fields() {
    let mut reg = GuiMasterCntlReg::default();
    reg.set_dst_datatype(DstDatatype::Rgb565);
    reg.set_rop3(GuiMasterCntlReg::ROP3_PATCOPY);
    assert_eq!(reg.to_raw(), 0x00f0_0400);
    assert_eq!(reg.dst_datatype(), Ok(DstDatatype::Rgb565));
    assert_eq!(reg.rop3(), 0xf0);
}

#[test]
fn test_yx_packs_negative_coordinates() {
    let reg = YxReg::new(-1, 2);
    assert_eq!(reg.to_raw(), 0x0002_ffff);
    assert_eq!(reg.x(), 0xffff);
    assert_eq!(reg.y(), 2);
}

// ============================================================================
// Generation-scoped registers
// ============================================================================

#[test]
fn test_rb3d_cntl_keeps_format_when_flags_change() {
    let mut reg = Rb3dCntlReg::new(ColorFormat::Argb8888, Rb3dCntl::ALPHA_BLEND_ENABLE);
    reg.set_flags(Rb3dCntl::ROP_ENABLE);
    assert_eq!(reg.color_format(), Ok(ColorFormat::Argb8888));
    assert_eq!(reg.flags(), Rb3dCntl::ROP_ENABLE);
    assert_eq!(reg.to_raw(), (6 << 10) | (1 << 6));
}

#[test]
fn test_blend_cntl_factors() {
    let reg = BlendCntlReg::new(BlendFactorCode::SrcAlpha, BlendFactorCode::InvSrcAlpha);
    assert_eq!(reg.to_raw(), (38 << 16) | (39 << 24));
    assert_eq!(reg.src_blend(), Ok(BlendFactorCode::SrcAlpha));
    assert_eq!(reg.dst_blend(), Ok(BlendFactorCode::InvSrcAlpha));
}

#[test]
fn test_r300_scissor_bias() {
    assert_eq!(r300::scissor(0, 0), 1440 | (1440 << 13));
    assert_eq!(r300::scissor(9, 19), 1449 | (1459 << 13));
}

#[test]
fn test_r300_color_pitch() {
    let raw = r300::color_pitch(512, r300::ColorFormat::Rgb565);
    assert_eq!(raw, 512 | (4 << 21));
}

#[test]
fn test_register_names_follow_family() {
    assert_eq!(Family::R100.register_name(0x2080), Some("SE_VTX_FMT"));
    assert_eq!(Family::R300.register_name(0x2080), Some("VAP_CNTL"));
    assert_eq!(Family::R200.register_name(0x1c3c), Some("RB3D_CNTL"));
    assert_eq!(Family::R300.register_name(0x1404), Some("DST_OFFSET"));
    assert_eq!(Family::R100.register_name(0x0004), None);
}

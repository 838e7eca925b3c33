//! Valid-state cache: what `set_state` writes, and what it skips.

mod common;

use common::MockBus;
use radeon_core::{
    Accel, AccelError, Aspect, BlittingFlags, Color, Device, Modified, OperationState, PixelFormat, Rectangle, Region,
    Surface, R100,
};
use radeon_registers::common::{DP_BRUSH_FRGD_CLR, DST_OFFSET, DST_PITCH, SC_TOP_LEFT, SRC_OFFSET};
use radeon_registers::r100::{
    txcblend, ColorArg, PP_CNTL, PP_TFACTOR_0, PP_TXCBLEND_0, PP_TXFORMAT_0, PP_TXOFFSET_0,
};

fn attach() -> (MockBus, Device<MockBus, R100>) {
    let bus = MockBus::new();
    let device = Device::<_, R100>::attach(bus.clone(), common::config()).unwrap();
    bus.clear();
    (bus, device)
}

fn blit_state() -> OperationState {
    let mut state = OperationState::new(common::rgb16_surface());
    state.set_source(Some(Surface::new(PixelFormat::Rgb16, 640, 480, 0x0010_0000, 1280)));
    state
}

// ============================================================================
// Skipping unchanged state
// ============================================================================

#[test]
fn test_first_set_state_programs_destination() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());

    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.writes_to(DST_OFFSET), vec![0x10000]);
    assert_eq!(bus.writes_to(DST_PITCH), vec![1024]);
    assert!(device.is_valid(Aspect::Destination));
    assert!(device.is_valid(Aspect::Clip));
    assert!(device.is_valid(Aspect::DrawingFlags));
    assert!(state.modified.is_empty());
}

#[test]
fn test_unchanged_state_writes_nothing() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert!(bus.writes().is_empty());
}

#[test]
fn test_color_change_rewrites_only_color() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    state.set_color(Color::new(0xff, 0x11, 0x22, 0x33));
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(
        bus.writes(),
        vec![(PP_TFACTOR_0, 0xff11_2233), (DP_BRUSH_FRGD_CLR, 0x1106)]
    );
}

#[test]
fn test_destination_move_keeps_format_dependent_state() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    state.set_destination(Surface::new(PixelFormat::Rgb16, 640, 480, 0x20000, 1024));
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.writes_to(DST_OFFSET), vec![0x20000]);
    assert_eq!(bus.count(SC_TOP_LEFT), 0);
    assert_eq!(bus.count(PP_TFACTOR_0), 0);
    assert_eq!(bus.count(PP_CNTL), 0);
}

#[test]
fn test_destination_format_change_reprograms_dependents() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    state.set_destination(Surface::new(PixelFormat::Argb, 640, 480, 0x20000, 2560));
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.writes_to(DST_PITCH), vec![2560]);
    assert_eq!(bus.count(SC_TOP_LEFT), 1);
    assert_eq!(bus.count(PP_TFACTOR_0), 1);
    assert_eq!(bus.count(PP_CNTL), 1);
}

#[test]
fn test_identical_destination_is_not_rewritten() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    state.set_destination(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert!(bus.writes().is_empty());
    assert!(device.is_valid(Aspect::Destination));
}

// ============================================================================
// Category switches
// ============================================================================

#[test]
fn test_switch_to_blitting_invalidates_drawing() {
    let (bus, mut device) = attach();
    let mut state = blit_state();
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    device.set_state(&mut state, Accel::Blit).unwrap();

    assert_eq!(bus.writes_to(PP_TXFORMAT_0).len(), 1);
    assert_eq!(bus.count(PP_CNTL), 1);
    assert!(!device.is_valid(Aspect::DrawingFlags));
    assert!(device.is_valid(Aspect::BlittingFlags));

    bus.clear();
    assert_eq!(device.fill_rectangle(&Rectangle::new(0, 0, 4, 4)), Ok(false));
    assert!(bus.writes().is_empty());
    assert_eq!(device.blit(&Rectangle::new(0, 0, 4, 4), 8, 8), Ok(true));
}

#[test]
fn test_switch_back_to_drawing_restores_color_and_flags() {
    let (bus, mut device) = attach();
    let mut state = blit_state();
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    device.set_state(&mut state, Accel::Blit).unwrap();
    bus.clear();

    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.count(PP_TFACTOR_0), 1);
    assert_eq!(bus.count(PP_CNTL), 1);
    assert_eq!(bus.count(DST_OFFSET), 0);
    assert!(!device.is_valid(Aspect::BlittingFlags));
}

#[test]
fn test_texture_triangles_rebinds_vertex_layout() {
    let (bus, mut device) = attach();
    let mut state = blit_state();
    device.set_state(&mut state, Accel::Blit).unwrap();
    bus.clear();

    device.set_state(&mut state, Accel::TextureTriangles).unwrap();

    assert_eq!(bus.count(PP_CNTL), 1);
    assert_eq!(device.blit(&Rectangle::new(0, 0, 4, 4), 8, 8), Ok(false));
}

// ============================================================================
// Primitives without programmed state
// ============================================================================

#[test]
fn test_primitive_before_set_state_is_refused() {
    let (bus, mut device) = attach();

    assert_eq!(device.fill_rectangle(&Rectangle::new(0, 0, 4, 4)), Ok(false));
    assert_eq!(device.blit(&Rectangle::new(0, 0, 4, 4), 0, 0), Ok(false));
    assert!(bus.writes().is_empty());
}

#[test]
fn test_invalidate_state_forces_full_reprogram() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    device.invalidate_state();
    assert_eq!(device.fill_rectangle(&Rectangle::new(0, 0, 4, 4)), Ok(false));
    bus.clear();

    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.writes_to(DST_OFFSET), vec![0x10000]);
    assert_eq!(bus.count(SC_TOP_LEFT), 1);
    assert_eq!(bus.count(PP_TFACTOR_0), 1);
}

#[test]
fn test_hang_drops_state_and_recovers() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.state.borrow_mut().hung = true;

    let rect = Rectangle::new(0, 0, 4, 4);
    let failure = (0..32).map(|_| device.fill_rectangle(&rect)).find(Result::is_err);

    assert!(matches!(failure, Some(Err(AccelError::FifoTimeout { .. }))));
    assert_eq!(device.fifo_stats().resets, 1);
    assert!(!device.is_valid(Aspect::Destination));
    assert_eq!(device.fill_rectangle(&rect), Ok(false));

    bus.clear();
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    assert_eq!(bus.writes_to(DST_OFFSET), vec![0x10000]);
    assert_eq!(device.fill_rectangle(&rect), Ok(true));
}

#[test]
fn test_engine_sync_timeout_is_reported() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.state.borrow_mut().hung = true;

    assert!(device.engine_sync().is_err());
    assert!(!device.is_valid(Aspect::Color));
    assert!(device.engine_sync().is_ok());
}

// ============================================================================
// State edited without modified flags
// ============================================================================

#[test]
fn test_moved_destination_is_reprogrammed_without_flag() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    state.destination = Surface::new(PixelFormat::Rgb16, 640, 480, 0x20000, 1024);
    state.modified = Modified::empty();
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.writes_to(DST_OFFSET), vec![0x20000]);
    assert_eq!(device.hw_state().dst.map(|d| d.offset), Some(0x20000));
}

#[test]
fn test_moved_source_is_reprogrammed_without_flag() {
    let (bus, mut device) = attach();
    let mut state = blit_state();
    device.set_state(&mut state, Accel::Blit).unwrap();
    bus.clear();

    state.source = Some(Surface::new(PixelFormat::Rgb16, 640, 480, 0x0030_0000, 1280));
    device.set_state(&mut state, Accel::Blit).unwrap();

    assert_eq!(bus.writes_to(SRC_OFFSET), vec![0x0030_0000]);
    assert_eq!(bus.writes_to(PP_TXOFFSET_0), vec![0x0030_0000]);
}

#[test]
fn test_changed_blitting_flags_are_reprogrammed_without_flag() {
    let (bus, mut device) = attach();
    let mut state = blit_state();
    device.set_state(&mut state, Accel::Blit).unwrap();
    bus.clear();

    state.blitting_flags = BlittingFlags::COLORIZE;
    device.set_state(&mut state, Accel::Blit).unwrap();

    assert_eq!(
        bus.writes_to(PP_TXCBLEND_0),
        vec![txcblend(ColorArg::T0Color, ColorArg::TfactorColor, ColorArg::Zero)]
    );
    assert_eq!(bus.count(PP_TFACTOR_0), 1);
}

#[test]
fn test_changed_clip_is_reprogrammed_without_flag() {
    let (bus, mut device) = attach();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    bus.clear();

    state.clip = Region::new(8, 4, 100, 50);
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    assert_eq!(bus.writes_to(SC_TOP_LEFT), vec![(4 << 16) | 8]);
    assert!(device.is_valid(Aspect::Clip));
}

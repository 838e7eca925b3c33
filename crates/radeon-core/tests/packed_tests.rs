//! Packed 4:2:2 destinations: staged constant pixel, halved clip and
//! pixel-pair coordinates.

mod common;

use common::{MockBus, FAMILIES};
use radeon_core::{color, Accel, AnyDevice, Color, Device, OperationState, PixelFormat, Rectangle, R100};
use radeon_registers::common::SC_BOTTOM_RIGHT;
use radeon_registers::r100::{PpCntl, PP_CNTL, PP_TXOFFSET_1, RE_WIDTH_HEIGHT};

const SCRATCH: u32 = 0x0080_0000;
const WHITE: Color = Color::new(0xff, 0xff, 0xff, 0xff);

fn yuy2_state() -> OperationState {
    let mut state = OperationState::new(common::surface(PixelFormat::Yuy2, 640, 480, 0x10000));
    state.set_color(WHITE);
    state
}

fn drawing() -> (MockBus, Device<MockBus, R100>, OperationState) {
    let bus = MockBus::new();
    let mut device = Device::<_, R100>::attach(bus.clone(), common::config()).unwrap();
    let mut state = yuy2_state();
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    (bus, device, state)
}

// ============================================================================
// Constant colour
// ============================================================================

#[test]
fn test_fill_color_is_staged_in_scratch() {
    for family in FAMILIES {
        let bus = MockBus::new();
        let mut device = AnyDevice::attach(family, bus.clone(), common::config()).unwrap();
        let mut state = yuy2_state();

        device.set_state(&mut state, Accel::FillRectangle).unwrap();

        assert_eq!(bus.vram(SCRATCH), Some(0x80eb_80eb), "{family:?}");
    }
}

#[test]
fn test_staged_pixel_is_sampled_by_second_unit() {
    let (bus, _device, _state) = drawing();

    assert_eq!(bus.last_write_to(PP_TXOFFSET_1), Some(SCRATCH));
    let pp = PpCntl::from_bits_truncate(bus.last_write_to(PP_CNTL).unwrap());
    assert!(pp.contains(PpCntl::TEX_1_ENABLE | PpCntl::TEX_BLEND_0_ENABLE));
    assert!(!pp.contains(PpCntl::TEX_0_ENABLE));
}

#[test]
fn test_same_color_is_not_restaged() {
    let (bus, mut device, mut state) = drawing();
    bus.state.borrow_mut().vram.clear();

    state.set_color(WHITE);
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    assert_eq!(bus.vram(SCRATCH), None);

    let red = Color::new(0xff, 0xff, 0x00, 0x00);
    state.set_color(red);
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    assert_eq!(bus.vram(SCRATCH), Some(color::pack(PixelFormat::Yuy2, red, 0)));
}

// ============================================================================
// Pixel pairs
// ============================================================================

#[test]
fn test_clip_is_halved_horizontally() {
    let (bus, _device, _state) = drawing();

    assert_eq!(bus.last_write_to(SC_BOTTOM_RIGHT), Some((480 << 16) | 320));
    assert_eq!(bus.last_write_to(RE_WIDTH_HEIGHT), Some((479 << 16) | 319));
}

#[test]
fn test_odd_span_covers_both_pairs() {
    let (bus, mut device, _state) = drawing();
    bus.clear();

    assert_eq!(device.fill_rectangle(&Rectangle::new(3, 0, 2, 1)), Ok(true));

    assert_eq!(bus.port_words(), vec![1.0, 0.0, 3.0, 0.0, 3.0, 1.0]);
}

#[test]
fn test_even_span_keeps_pair_count() {
    let (bus, mut device, _state) = drawing();
    bus.clear();

    device.fill_rectangle(&Rectangle::new(4, 2, 4, 3)).unwrap();

    assert_eq!(bus.port_words(), vec![2.0, 2.0, 4.0, 2.0, 4.0, 5.0]);
}

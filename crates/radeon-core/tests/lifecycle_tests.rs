//! Attach, detach and engine reset.

mod common;

use common::{MockBus, FAMILIES};
use radeon_core::{Accel, AnyDevice, Aspect, Device, Family, OperationState, Rectangle, R200};
use radeon_registers::common::{DP_GUI_MASTER_CNTL, DST_OFFSET, RBBM_SOFT_RESET};

#[test]
fn test_attach_resets_engine() {
    for family in FAMILIES {
        let bus = MockBus::new();
        let device = AnyDevice::attach(family, bus.clone(), common::config()).unwrap();

        assert_eq!(device.family(), family);
        assert_eq!(bus.writes_to(RBBM_SOFT_RESET), vec![0x7f, 0], "{family:?}");
        assert_eq!(device.fifo_stats().resets, 1);
        assert!(!device.is_valid(Aspect::Destination));
    }
}

#[test]
fn test_detach_restores_saved_registers() {
    for family in FAMILIES {
        let bus = MockBus::new();
        bus.set_reg(DST_OFFSET, 0x0040_0000);
        bus.set_reg(DP_GUI_MASTER_CNTL, 0x1234_5678);

        let mut device = AnyDevice::attach(family, bus.clone(), common::config()).unwrap();
        let mut state = OperationState::new(common::rgb16_surface());
        device.set_state(&mut state, Accel::FillRectangle).unwrap();
        device.fill_rectangle(&Rectangle::new(0, 0, 16, 16)).unwrap();
        assert_eq!(bus.last_write_to(DST_OFFSET), Some(0x10000));

        let returned = device.detach();

        assert_eq!(returned.last_write_to(DST_OFFSET), Some(0x0040_0000), "{family:?}");
        assert_eq!(returned.last_write_to(DP_GUI_MASTER_CNTL), Some(0x1234_5678));
        assert!(!returned.overflowed());
    }
}

#[test]
fn test_engine_reset_forgets_state() {
    let bus = MockBus::new();
    let mut device = Device::<_, R200>::attach(bus.clone(), common::config()).unwrap();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();
    assert_eq!(device.family(), Family::R200);

    device.engine_reset().unwrap();

    assert_eq!(device.fifo_stats().resets, 2);
    assert!(!device.is_valid(Aspect::Destination));
    assert!(device.hw_state().dst.is_none());
    assert_eq!(device.fill_rectangle(&Rectangle::new(0, 0, 4, 4)), Ok(false));
}

#[test]
fn test_hw_state_mirrors_programmed_destination() {
    let bus = MockBus::new();
    let mut device = Device::<_, R200>::attach(bus, common::config()).unwrap();
    let mut state = OperationState::new(common::rgb16_surface());
    device.set_state(&mut state, Accel::FillRectangle).unwrap();

    let dst = device.hw_state().dst();
    assert_eq!(dst.offset, 0x10000);
    assert_eq!(dst.pitch, 1024);
    assert_eq!(device.hw_state().clip, state.clip);
}

#[test]
fn test_engine_sync_waits_for_idle() {
    let bus = MockBus::new();
    let mut device = AnyDevice::attach(Family::R300, bus.clone(), common::config()).unwrap();
    bus.state.borrow_mut().busy_reads = 5;

    device.engine_sync().unwrap();

    assert!(device.fifo_stats().idle_wait_cycles > 0);
    assert_eq!(device.fifo_stats().resets, 1);
}

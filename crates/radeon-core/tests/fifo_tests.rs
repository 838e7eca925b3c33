//! Command FIFO admission control against the mock bus.

mod common;

use common::MockBus;
use radeon_core::mmio::Mmio;
use radeon_core::{AccelError, DeviceConfig};
use radeon_registers::common::{DST_OFFSET, HDP_SOFT_RESET, HOST_PATH_CNTL, RBBM_SOFT_RESET};

fn mmio(bus: &MockBus, fifo_timeout: u32) -> Mmio<MockBus> {
    let config = DeviceConfig {
        fifo_timeout,
        ..common::config()
    };
    Mmio::new(bus.clone(), &config)
}

// ============================================================================
// reserve
// ============================================================================

#[test]
fn test_reserve_polls_until_enough_entries_are_free() {
    let bus = MockBus::new();
    {
        let mut s = bus.state.borrow_mut();
        s.fifo_free = 2;
        s.fifo_step = 1;
    }
    let mut mmio = mmio(&bus, 1000);

    mmio.reserve(5).unwrap();

    // Free entries read back as 2, 3, 4, 5.
    assert_eq!(bus.state.borrow().status_reads, 4);
    assert_eq!(mmio.stats().wait_cycles, 3);
    assert_eq!(mmio.fifo_space(), 0);
}

#[test]
fn test_reserve_uses_cached_count() {
    let bus = MockBus::new();
    let mut mmio = mmio(&bus, 1000);

    mmio.reserve(10).unwrap();
    mmio.reserve(10).unwrap();

    assert_eq!(bus.state.borrow().status_reads, 1);
    assert_eq!(mmio.stats().cache_hits, 1);
    assert_eq!(mmio.fifo_space(), 44);
}

#[test]
#[should_panic(expected = "exceeds the FIFO")]
fn test_reserve_larger_than_fifo_panics() {
    let bus = MockBus::new();
    let mut mmio = mmio(&bus, 1000);
    let _ = mmio.reserve(65);
}

#[test]
fn test_reserve_timeout_resets_engine() {
    let bus = MockBus::new();
    bus.set_reg(HOST_PATH_CNTL, 0x1234);
    bus.state.borrow_mut().hung = true;
    let mut mmio = mmio(&bus, 100);

    let err = mmio.reserve(1).unwrap_err();

    assert_eq!(err, AccelError::FifoTimeout { requested: 1, free: 0 });
    assert_eq!(mmio.stats().resets, 1);
    assert_eq!(bus.writes_to(RBBM_SOFT_RESET), vec![0x7f, 0]);
    assert_eq!(bus.writes_to(HOST_PATH_CNTL), vec![0x1234 | HDP_SOFT_RESET, 0x1234]);
    assert!(!bus.state.borrow().hung);
}

#[test]
fn test_engine_usable_after_timeout() {
    let bus = MockBus::new();
    bus.state.borrow_mut().hung = true;
    let mut mmio = mmio(&bus, 10);

    assert!(mmio.reserve(4).is_err());
    mmio.submit(&[(DST_OFFSET, 0x100)]).unwrap();
    assert_eq!(bus.last_write_to(DST_OFFSET), Some(0x100));
}

// ============================================================================
// submit
// ============================================================================

#[test]
fn test_submit_splits_into_fifo_sized_reservations() {
    let bus = MockBus::new();
    let mut mmio = mmio(&bus, 1000);
    let writes: Vec<(u32, u32)> = (0..100).map(|i| (DST_OFFSET, i)).collect();

    mmio.submit(&writes).unwrap();

    assert_eq!(mmio.stats().reserve_calls, 2);
    assert_eq!(bus.count(DST_OFFSET), 100);
    assert!(!bus.overflowed());
}

#[test]
fn test_submit_never_overruns_a_slow_fifo() {
    let bus = MockBus::new();
    {
        let mut s = bus.state.borrow_mut();
        s.fifo_free = 0;
        s.fifo_step = 3;
    }
    let mut mmio = mmio(&bus, 10_000);
    let writes: Vec<(u32, u32)> = (0..200).map(|i| (DST_OFFSET, i)).collect();

    mmio.submit(&writes).unwrap();

    assert!(!bus.overflowed());
    assert_eq!(bus.writes_to(DST_OFFSET), (0..200).collect::<Vec<_>>());
}

#[test]
fn test_swapped_bus_byte_swaps_writes() {
    let bus = MockBus::new();
    let config = DeviceConfig {
        swap_bytes: true,
        ..common::config()
    };
    let mut mmio = Mmio::new(bus.clone(), &config);
    // Status reads come back swapped: 64 free entries in the low byte.
    bus.state.borrow_mut().fifo_free = 0x4000_0000;

    mmio.submit(&[(DST_OFFSET, 0x1234_5678)]).unwrap();

    assert_eq!(bus.last_write_to(DST_OFFSET), Some(0x7856_3412));
}

// ============================================================================
// idle_wait
// ============================================================================

#[test]
fn test_idle_wait_polls_busy_flag() {
    let bus = MockBus::new();
    bus.state.borrow_mut().busy_reads = 3;
    let mut mmio = mmio(&bus, 1000);

    mmio.idle_wait().unwrap();

    // The reservation poll sees the first busy status.
    assert_eq!(mmio.stats().idle_wait_cycles, 2);
    assert_eq!(mmio.stats().idle_calls, 1);
    assert_eq!(mmio.fifo_space(), 64);
}

#[test]
fn test_idle_timeout_resets_engine() {
    let bus = MockBus::new();
    bus.state.borrow_mut().busy_reads = u32::MAX;
    let mut mmio = mmio(&bus, 50);

    assert_eq!(mmio.idle_wait(), Err(AccelError::IdleTimeout));
    assert_eq!(mmio.stats().resets, 1);
}

// ============================================================================
// snapshot
// ============================================================================

#[test]
fn test_snapshot_restores_through_fifo() {
    let bus = MockBus::new();
    bus.set_reg(DST_OFFSET, 0xabcd);
    let mut mmio = mmio(&bus, 1000);

    let snapshot = mmio.snapshot(&[DST_OFFSET]);
    mmio.submit(&[(DST_OFFSET, 0)]).unwrap();
    mmio.restore(&snapshot).unwrap();

    assert_eq!(bus.writes_to(DST_OFFSET), vec![0, 0xabcd]);
}

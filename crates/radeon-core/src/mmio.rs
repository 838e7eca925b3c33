//! Register access and command FIFO admission control.
//!
//! Every queued register write must be covered by a preceding
//! [`Mmio::reserve`]; the cached free-entry count is only refreshed from the
//! hardware when it runs short.

use radeon_hal::RegisterBus;
use radeon_registers::common::{
    RbbmStatusReg, SoftReset, FIFO_DEPTH, HDP_SOFT_RESET, HOST_PATH_CNTL, RBBM_SOFT_RESET, RBBM_STATUS,
};
use radeon_registers::Register;

use crate::config::DeviceConfig;
use crate::error::AccelError;

/// Registers captured at attach.
pub const SNAPSHOT_CAPACITY: usize = 64;

/// Register values captured at attach and written back at detach.
pub type Snapshot = heapless::Vec<(u32, u32), SNAPSHOT_CAPACITY>;

/// FIFO admission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FifoStats {
    pub reserve_calls: u64,
    pub slots_requested: u64,
    /// Status polls that found too few free entries.
    pub wait_cycles: u64,
    /// Reservations satisfied from the cached count without polling.
    pub cache_hits: u64,
    pub idle_calls: u64,
    pub idle_wait_cycles: u64,
    pub resets: u64,
}

pub struct Mmio<B> {
    bus: B,
    /// Free entries the hardware reported, minus everything reserved since.
    fifo_space: u32,
    /// Writes still covered by the most recent reservation.
    budget: u32,
    timeout: u32,
    idle_budget: u32,
    swap_bytes: bool,
    stats: FifoStats,
}

impl<B: RegisterBus> Mmio<B> {
    pub fn new(bus: B, config: &DeviceConfig) -> Self {
        Self {
            bus,
            fifo_space: 0,
            budget: 0,
            timeout: config.fifo_timeout,
            idle_budget: config.idle_fifo_budget.min(FIFO_DEPTH),
            swap_bytes: config.swap_bytes,
            stats: FifoStats::default(),
        }
    }

    pub fn read(&mut self, reg: u32) -> u32 {
        let value = self.bus.read32(reg);
        if self.swap_bytes {
            value.swap_bytes()
        } else {
            value
        }
    }

    /// Queue a register write inside the current reservation.
    pub fn write(&mut self, reg: u32, value: u32) {
        debug_assert!(self.budget > 0, "write to {reg:#06x} outside a FIFO reservation");
        self.budget = self.budget.saturating_sub(1);
        self.write_direct(reg, value);
    }

    /// Write that bypasses the command FIFO (reset path only).
    fn write_direct(&mut self, reg: u32, value: u32) {
        let value = if self.swap_bytes { value.swap_bytes() } else { value };
        self.bus.write32(reg, value);
    }

    fn status(&mut self) -> RbbmStatusReg {
        RbbmStatusReg::from_raw(self.read(RBBM_STATUS))
    }

    /// Wait until `n` FIFO entries are free and claim them.
    ///
    /// # Errors
    /// [`AccelError::FifoTimeout`] after the poll bound; the engine has been
    /// reset.
    pub fn reserve(&mut self, n: u32) -> Result<(), AccelError> {
        assert!(n <= FIFO_DEPTH, "reservation of {n} entries exceeds the FIFO");

        self.stats.reserve_calls += 1;
        self.stats.slots_requested += u64::from(n);

        if self.fifo_space >= n {
            self.stats.cache_hits += 1;
        } else {
            let mut waitcycles: u32 = 0;
            loop {
                self.fifo_space = self.status().fifo_cnt();
                if self.fifo_space >= n {
                    break;
                }
                waitcycles += 1;
                if waitcycles > self.timeout {
                    let free = self.fifo_space;
                    log::error!("FIFO timeout: {n} entries requested, {free} free");
                    self.stats.wait_cycles += u64::from(waitcycles);
                    self.reset();
                    return Err(AccelError::FifoTimeout { requested: n, free });
                }
            }
            self.stats.wait_cycles += u64::from(waitcycles);
        }

        self.fifo_space -= n;
        self.budget = n;
        Ok(())
    }

    /// Reserve and write a block of registers, in order.
    ///
    /// # Errors
    /// Propagates [`Mmio::reserve`] failures; writes already queued stay
    /// queued.
    pub fn submit(&mut self, writes: &[(u32, u32)]) -> Result<(), AccelError> {
        for chunk in writes.chunks(FIFO_DEPTH as usize) {
            self.reserve(chunk.len() as u32)?;
            for &(reg, value) in chunk {
                self.write(reg, value);
            }
        }
        Ok(())
    }

    /// Wait for the engine to drain and go idle.
    ///
    /// # Errors
    /// [`AccelError::FifoTimeout`] or [`AccelError::IdleTimeout`]; the engine
    /// has been reset.
    pub fn idle_wait(&mut self) -> Result<(), AccelError> {
        self.stats.idle_calls += 1;
        self.reserve(self.idle_budget)?;

        let mut waitcycles: u32 = 0;
        while self.status().active() {
            waitcycles += 1;
            if waitcycles > self.timeout {
                log::error!("idle timeout after {waitcycles} polls");
                self.stats.idle_wait_cycles += u64::from(waitcycles);
                self.reset();
                return Err(AccelError::IdleTimeout);
            }
        }
        self.stats.idle_wait_cycles += u64::from(waitcycles);

        self.fifo_space = self.status().fifo_cnt();
        self.budget = 0;
        Ok(())
    }

    /// Soft-reset the engine blocks and the host data path.
    pub fn reset(&mut self) {
        log::info!("resetting engine");
        self.stats.resets += 1;

        let host_path = self.read(HOST_PATH_CNTL);
        self.write_direct(RBBM_SOFT_RESET, SoftReset::ENGINE.bits());
        let _ = self.read(RBBM_SOFT_RESET);
        self.write_direct(RBBM_SOFT_RESET, 0);
        let _ = self.read(RBBM_SOFT_RESET);

        self.write_direct(HOST_PATH_CNTL, host_path | HDP_SOFT_RESET);
        let _ = self.read(HOST_PATH_CNTL);
        self.write_direct(HOST_PATH_CNTL, host_path);

        self.fifo_space = 0;
        self.budget = 0;
    }

    /// Read back the given registers.
    pub fn snapshot(&mut self, regs: &[u32]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for &reg in regs.iter().take(SNAPSHOT_CAPACITY) {
            let value = self.read(reg);
            // Capacity is guaranteed by the `take` above.
            let _ = snapshot.push((reg, value));
        }
        snapshot
    }

    /// Write a snapshot back through the FIFO.
    ///
    /// # Errors
    /// Propagates [`Mmio::reserve`] failures.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), AccelError> {
        self.submit(snapshot)
    }

    #[must_use]
    pub fn stats(&self) -> &FifoStats {
        &self.stats
    }

    #[must_use]
    pub fn fifo_space(&self) -> u32 {
        self.fifo_space
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }
}

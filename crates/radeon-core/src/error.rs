use thiserror::Error;

/// Hardware hang detected while waiting on the engine.
///
/// By the time this reaches a caller the engine has been soft-reset and the
/// device's default state re-applied; the primitive in flight was dropped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccelError {
    #[error("command FIFO stalled with {free} of {requested} entries free, engine reset")]
    FifoTimeout { requested: u32, free: u32 },

    #[error("engine failed to go idle, engine reset")]
    IdleTimeout,
}

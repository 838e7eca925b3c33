//! 2D/3D acceleration for Radeon R100, R200 and R300 engines.
//!
//! Drawing and blitting requests become MMIO register programming through a
//! flow-controlled command FIFO. Programmed state is mirrored and tracked per
//! aspect so unchanged state is never rewritten.

pub mod caps;
pub mod color;
pub mod config;
pub mod context;
pub mod device;
pub mod emit;
pub mod error;
pub mod gen;
pub mod geometry;
pub mod mmio;
pub mod planar;
pub mod state;
pub mod surface;
pub mod valid;
pub mod vertex;

pub use caps::Capability;
pub use color::Color;
pub use config::DeviceConfig;
pub use context::Bus;
pub use device::{AnyDevice, Device, MAX_VERTICES};
pub use error::AccelError;
pub use gen::{Generation, R100, R200, R300};
pub use geometry::{Rectangle, Region, Triangle, TriangleFormation, Vertex};
pub use mmio::FifoStats;
pub use radeon_registers::Family;
pub use state::{Accel, AccelMask, BlendFactor, BlittingFlags, Category, DrawingFlags, Modified, OperationState};
pub use surface::{PixelFormat, Storage, Surface};
pub use valid::Aspect;

//! Register map for the Radeon 2D/3D acceleration engines.
//!
//! Addresses and field encodings are scoped per engine generation so that a
//! constant belonging to one pipeline cannot leak into the programming of
//! another. Registers every generation shares (bus manager, 2D engine,
//! vertex port) live in [`common`].
#![no_std]
#![allow(clippy::identity_op)]

pub mod common;
pub mod encode;
pub mod r100;
pub mod r200;
pub mod r300;
pub mod reg;

pub use crate::reg::{Register, YxReg};

/// Hardware pipeline family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Fixed-function combiner.
    R100,
    /// Extended fixed-function combiner.
    R200,
    /// Programmable vertex/fragment pipeline.
    R300,
}

impl Family {
    /// Register name for tracing, resolved in this family's address space.
    #[must_use]
    pub fn register_name(self, offset: u32) -> Option<&'static str> {
        match self {
            Self::R100 => r100::name(offset),
            Self::R200 => r200::name(offset).or_else(|| r100::name(offset)),
            Self::R300 => r300::name(offset),
        }
        .or_else(|| common::name(offset))
    }
}

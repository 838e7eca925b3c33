//! Field encoding helpers.

/// Error returned when a bit pattern does not match any variant of a field enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownVariant<T>(T);

impl<T: Copy> UnknownVariant<T> {
    #[must_use]
    pub const fn new(bits: T) -> Self {
        Self(bits)
    }

    /// The bit pattern that failed to decode.
    #[must_use]
    pub const fn bits(&self) -> T {
        self.0
    }
}

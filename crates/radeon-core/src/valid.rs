//! Valid-state cache.
//!
//! One bit per independently programmed aspect of the hardware state. A set
//! bit means the registers behind that aspect already hold the values the
//! current state asks for.

use bitflags::bitflags;

use crate::state::{Category, Modified};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Aspect {
    Destination,
    Source,
    Clip,
    Color,
    SrcColorkey,
    SrcBlend,
    DstBlend,
    DrawingFlags,
    BlittingFlags,
}

impl Aspect {
    pub const ALL: [Self; 9] = [
        Self::Destination,
        Self::Source,
        Self::Clip,
        Self::Color,
        Self::SrcColorkey,
        Self::SrcBlend,
        Self::DstBlend,
        Self::DrawingFlags,
        Self::BlittingFlags,
    ];

    const fn bit(self) -> AspectSet {
        match self {
            Self::Destination => AspectSet::DESTINATION,
            Self::Source => AspectSet::SOURCE,
            Self::Clip => AspectSet::CLIP,
            Self::Color => AspectSet::COLOR,
            Self::SrcColorkey => AspectSet::SRC_COLORKEY,
            Self::SrcBlend => AspectSet::SRC_BLEND,
            Self::DstBlend => AspectSet::DST_BLEND,
            Self::DrawingFlags => AspectSet::DRAWING_FLAGS,
            Self::BlittingFlags => AspectSet::BLITTING_FLAGS,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    struct AspectSet: u16 {
        const DESTINATION = 1 << 0;
        const SOURCE = 1 << 1;
        const CLIP = 1 << 2;
        const COLOR = 1 << 3;
        const SRC_COLORKEY = 1 << 4;
        const SRC_BLEND = 1 << 5;
        const DST_BLEND = 1 << 6;
        const DRAWING_FLAGS = 1 << 7;
        const BLITTING_FLAGS = 1 << 8;
    }
}

/// Valid aspects plus the operation category the combiner is set up for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidSet {
    valid: AspectSet,
    category: Option<Category>,
}

impl ValidSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            valid: AspectSet::empty(),
            category: None,
        }
    }

    #[must_use]
    pub fn is_valid(&self, aspect: Aspect) -> bool {
        self.valid.contains(aspect.bit())
    }

    /// True only if every aspect of a compound group is valid.
    #[must_use]
    pub fn all_valid(&self, aspects: &[Aspect]) -> bool {
        aspects.iter().all(|&a| self.is_valid(a))
    }

    pub fn set(&mut self, aspect: Aspect) {
        self.valid.insert(aspect.bit());
    }

    pub fn invalidate(&mut self, aspect: Aspect) {
        self.valid.remove(aspect.bit());
    }

    /// Forget everything, including the active category.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// Drop aspects the host reports as changed.
    pub fn apply_modified(&mut self, modified: Modified) {
        let rules: [(Modified, &[Aspect]); 9] = [
            (Modified::DESTINATION, &[Aspect::Destination]),
            (Modified::SOURCE, &[Aspect::Source]),
            (Modified::CLIP, &[Aspect::Clip]),
            (Modified::COLOR, &[Aspect::Color]),
            (Modified::SRC_COLORKEY, &[Aspect::SrcColorkey]),
            (Modified::SRC_BLEND, &[Aspect::SrcBlend]),
            (Modified::DST_BLEND, &[Aspect::DstBlend]),
            // Premultiplication is folded into the drawing colour.
            (Modified::DRAWING_FLAGS, &[Aspect::DrawingFlags, Aspect::Color]),
            // Colorize/premultcolor shape the constant; deinterlace reshapes
            // the source binding.
            (
                Modified::BLITTING_FLAGS,
                &[Aspect::BlittingFlags, Aspect::Color, Aspect::Source],
            ),
        ];
        for (flag, aspects) in rules {
            if modified.contains(flag) {
                for &aspect in aspects {
                    self.invalidate(aspect);
                }
            }
        }
    }

    /// The destination pixel format changed: every encoding derived from it
    /// is stale.
    pub fn destination_format_changed(&mut self) {
        for aspect in [
            Aspect::Source,
            Aspect::Clip,
            Aspect::Color,
            Aspect::SrcBlend,
            Aspect::DrawingFlags,
            Aspect::BlittingFlags,
        ] {
            self.invalidate(aspect);
        }
    }

    /// The source pixel format changed: the colour key mask is stale.
    pub fn source_format_changed(&mut self) {
        self.invalidate(Aspect::SrcColorkey);
    }

    /// Switch the shared texture/combiner hardware to `category`.
    pub fn enter_category(&mut self, category: Category) {
        if self.category == Some(category) {
            return;
        }
        match category {
            Category::Drawing => self.invalidate(Aspect::BlittingFlags),
            Category::Blitting => self.invalidate(Aspect::DrawingFlags),
        }
        self.invalidate(Aspect::Color);
        self.category = Some(category);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_valid() -> ValidSet {
        let mut valid = ValidSet::new();
        for aspect in Aspect::ALL {
            valid.set(aspect);
        }
        valid
    }

    #[test]
    fn starts_empty() {
        let valid = ValidSet::new();
        assert!(Aspect::ALL.iter().all(|&a| !valid.is_valid(a)));
        assert_eq!(valid.category(), None);
    }

    #[test]
    fn destination_format_change_invalidates_dependents() {
        let mut valid = all_valid();
        valid.destination_format_changed();
        for aspect in [Aspect::Source, Aspect::Clip, Aspect::Color, Aspect::SrcBlend] {
            assert!(!valid.is_valid(aspect), "{aspect:?} should be invalid");
        }
        assert!(valid.is_valid(Aspect::Destination));
        assert!(valid.is_valid(Aspect::DstBlend));
        assert!(!valid.all_valid(&[Aspect::SrcBlend, Aspect::DstBlend]));
    }

    #[test]
    fn category_switch_invalidates_other_flags() {
        let mut valid = all_valid();
        valid.enter_category(Category::Drawing);
        assert!(!valid.is_valid(Aspect::BlittingFlags));
        assert!(valid.is_valid(Aspect::DrawingFlags));

        valid.set(Aspect::BlittingFlags);
        valid.set(Aspect::Color);
        valid.enter_category(Category::Blitting);
        assert!(!valid.is_valid(Aspect::DrawingFlags));
        assert!(!valid.is_valid(Aspect::Color));
        assert!(valid.is_valid(Aspect::BlittingFlags));
    }

    #[test]
    fn aspects_are_independent() {
        for aspect in Aspect::ALL {
            let mut valid = ValidSet::new();
            valid.set(aspect);
            assert_eq!(Aspect::ALL.iter().filter(|&&a| valid.is_valid(a)).count(), 1);
        }
    }

    #[test]
    fn same_category_keeps_bits() {
        let mut valid = all_valid();
        valid.enter_category(Category::Blitting);
        valid.set(Aspect::DrawingFlags);
        valid.set(Aspect::Color);
        valid.enter_category(Category::Blitting);
        assert!(valid.all_valid(&Aspect::ALL));
    }

    #[test]
    fn modified_flags_map_to_aspects() {
        let mut valid = all_valid();
        valid.apply_modified(Modified::BLITTING_FLAGS);
        assert!(!valid.is_valid(Aspect::BlittingFlags));
        assert!(!valid.is_valid(Aspect::Color));
        assert!(!valid.is_valid(Aspect::Source));
        assert!(valid.is_valid(Aspect::DrawingFlags));

        let mut valid = all_valid();
        valid.apply_modified(Modified::CLIP | Modified::SRC_COLORKEY);
        assert!(!valid.is_valid(Aspect::Clip));
        assert!(!valid.is_valid(Aspect::SrcColorkey));
        assert!(valid.is_valid(Aspect::Destination));
    }

    #[test]
    fn source_format_change_drops_colorkey() {
        let mut valid = all_valid();
        valid.source_format_changed();
        assert!(!valid.is_valid(Aspect::SrcColorkey));
        assert!(valid.is_valid(Aspect::Source));
    }
}

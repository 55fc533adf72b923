//! Flag words carried by each index entry.
//!
//! The first word is always present; its low 12 bits hold the path length
//! and bits 12-13 the merge stage, both reached through accessors rather
//! than flag constants. The second word exists only when
//! [`EntryFlags::EXTENDED`] is set, which is legal from format version 3 on.

use bitflags::bitflags;

/// Longest path length representable in the name-length field; longer
/// paths store the saturated value and are recovered by NUL scanning.
pub const MAX_NAME_LENGTH: usize = 0x0FFF;

const STAGE_SHIFT: u16 = 12;
const STAGE_MASK: u16 = 0x3;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u16 {
        const ASSUME_VALID = 1 << 15;
        const EXTENDED = 1 << 14;
        // stage and name length occupy the remaining bits
        const _ = !0;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExtendedFlags: u16 {
        const RESERVED = 1 << 15;
        const SKIP_WORKTREE = 1 << 14;
        const INTENT_TO_ADD = 1 << 13;
        const _ = !0;
    }
}

impl EntryFlags {
    /// Merge stage (0 for a normally staged entry, 1-3 during conflicts).
    pub fn stage(&self) -> u8 {
        ((self.bits() >> STAGE_SHIFT) & STAGE_MASK) as u8
    }

    /// Path length as declared on disk, saturated at [`MAX_NAME_LENGTH`].
    pub fn name_length(&self) -> usize {
        (self.bits() & MAX_NAME_LENGTH as u16) as usize
    }

    /// Same flags with the name-length field replaced.
    pub fn with_name_length(self, length: usize) -> Self {
        let saturated = length.min(MAX_NAME_LENGTH) as u16;
        Self::from_bits_retain((self.bits() & !(MAX_NAME_LENGTH as u16)) | saturated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stage_and_name_length_are_packed_fields() {
        let flags = EntryFlags::from_bits_retain(0b1010_0000_0000_0101);
        assert!(flags.contains(EntryFlags::ASSUME_VALID));
        assert!(!flags.contains(EntryFlags::EXTENDED));
        assert_eq!(flags.stage(), 2);
        assert_eq!(flags.name_length(), 5);
    }

    #[test]
    fn name_length_saturates() {
        let flags = EntryFlags::default().with_name_length(60_000);
        assert_eq!(flags.name_length(), MAX_NAME_LENGTH);
    }

    #[test]
    fn replacing_name_length_keeps_the_upper_bits() {
        let flags = EntryFlags::ASSUME_VALID.with_name_length(7);
        assert!(flags.contains(EntryFlags::ASSUME_VALID));
        assert_eq!(flags.name_length(), 7);
    }
}

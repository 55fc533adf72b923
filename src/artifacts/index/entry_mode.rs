use crate::artifacts::objects::object_type::ObjectType;

#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
    Symlink,
}

/// Mode of a tree or index entry: a file variant or a directory.
///
/// The on-disk encoding packs a 4-bit object-type field and a 9-bit
/// permission field into the low 16 bits of a 32-bit word; only the four
/// canonical combinations below are valid.
#[derive(Debug, Clone, Copy, Eq, Ord, Default, PartialEq, PartialOrd)]
pub enum EntryMode {
    File(FileMode),
    #[default]
    Directory,
}

impl EntryMode {
    pub fn as_str(&self) -> &str {
        match self {
            EntryMode::File(FileMode::Regular) => "100644",
            EntryMode::File(FileMode::Executable) => "100755",
            EntryMode::File(FileMode::Symlink) => "120000",
            EntryMode::Directory => "40000",
        }
    }

    pub fn as_u32(&self) -> u32 {
        match self {
            EntryMode::File(FileMode::Regular) => 0o100644,
            EntryMode::File(FileMode::Executable) => 0o100755,
            EntryMode::File(FileMode::Symlink) => 0o120000,
            EntryMode::Directory => 0o40000,
        }
    }

    /// Decode a mode word by its object-type nibble and permission bits.
    pub fn from_u32(mode: u32) -> Option<Self> {
        let object_type = (mode >> 12) & 0xF;
        let permissions = mode & 0o777;

        match object_type {
            0b1000 if permissions & 0o111 != 0 => Some(EntryMode::File(FileMode::Executable)),
            0b1000 => Some(EntryMode::File(FileMode::Regular)),
            0b1010 => Some(EntryMode::File(FileMode::Symlink)),
            0b0100 => Some(EntryMode::Directory),
            _ => None,
        }
    }

    /// Parse the octal form used in serialized trees. Accepts the
    /// zero-padded directory spelling some writers emit.
    pub fn from_octal_str(mode: &str) -> Option<Self> {
        match mode {
            "100644" => Some(EntryMode::File(FileMode::Regular)),
            "100755" => Some(EntryMode::File(FileMode::Executable)),
            "120000" => Some(EntryMode::File(FileMode::Symlink)),
            "40000" | "040000" => Some(EntryMode::Directory),
            _ => None,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, EntryMode::Directory)
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryMode::File(_) => ObjectType::Blob,
            EntryMode::Directory => ObjectType::Tree,
        }
    }
}

impl From<FileMode> for EntryMode {
    fn from(mode: FileMode) -> Self {
        EntryMode::File(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(EntryMode::File(FileMode::Regular))]
    #[case(EntryMode::File(FileMode::Executable))]
    #[case(EntryMode::File(FileMode::Symlink))]
    #[case(EntryMode::Directory)]
    fn mode_word_round_trips(#[case] mode: EntryMode) {
        assert_eq!(EntryMode::from_u32(mode.as_u32()), Some(mode));
        assert_eq!(EntryMode::from_octal_str(mode.as_str()), Some(mode));
    }

    #[test]
    fn group_executable_bit_also_counts_as_executable() {
        assert_eq!(
            EntryMode::from_u32(0o100654),
            Some(EntryMode::File(FileMode::Executable))
        );
    }

    #[test]
    fn zero_padded_directory_spelling_is_accepted() {
        assert_eq!(
            EntryMode::from_octal_str("040000"),
            Some(EntryMode::Directory)
        );
    }

    #[test]
    fn unknown_object_type_is_rejected() {
        assert_eq!(EntryMode::from_u32(0o160000), None);
        assert_eq!(EntryMode::from_octal_str("160000"), None);
    }
}

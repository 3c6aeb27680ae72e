//! Base types for structure of RCO containers.

use binrw::BinRead;

/// Size in bytes of [`RcoHeader`]
pub const HEADER_SIZE: usize = 0x50;

/// Size in bytes of [`NodeRecord`]
pub const NODE_SIZE: usize = 0x1C;

/// Size in bytes of [`AttributeRecord`]
pub const ATTRIBUTE_SIZE: usize = 0x10;

/// Link value meaning "no related node"
pub const NO_LINK: i32 = -1;

/// Which of the two container flavours a buffer is expected to be
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ContainerKind {
    /// A top level `.rco` container
    Root,
    /// A locale container extracted from a root container
    Nested,
}

impl ContainerKind {
    /// The magic bytes this kind of container starts with
    pub const fn magic(self) -> &'static [u8; 4] {
        match self {
            ContainerKind::Root => b"RCOF",
            ContainerKind::Nested => b"RCSF",
        }
    }

    /// Identify the kind of container from its magic bytes
    pub fn from_magic(magic: &[u8; 4]) -> Option<Self> {
        [ContainerKind::Root, ContainerKind::Nested]
            .into_iter()
            .find(|kind| kind.magic() == magic)
    }
}

/// Location of a table inside the container
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct TableSpan {
    /// Offset from the start of the buffer
    pub offset: i32,

    /// Size of the table in bytes
    pub size: i32,
}

/// RCO container header
///
/// Defines the header of the container which starts with either "RCOF" or "RCSF" and then a version.
/// All data is stored in little endian format
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct RcoHeader {
    /// The magic identifying the container kind
    pub magic: [u8; 4],

    /// Format version
    pub version: i32,

    /// Node records
    pub tree: TableSpan,

    /// Length prefixed string ids
    pub id_table: TableSpan,

    /// Length prefixed hashed ids
    pub id_hash_table: TableSpan,

    /// Zero terminated 8-bit strings
    pub string_table: TableSpan,

    /// Zero terminated 16-bit strings
    pub wstring_table: TableSpan,

    /// 32-bit hashes
    pub hash_table: TableSpan,

    /// 32-bit signed integers
    pub int_array_table: TableSpan,

    /// 32-bit floats
    pub float_array_table: TableSpan,

    /// Embedded files
    pub file_table: TableSpan,
}

/// Tree node record
///
/// All links are relative to the start of the tree table, [`NO_LINK`] marks an absent relation.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct NodeRecord {
    /// Offset of the node name in the string table
    pub name: i32,

    /// Number of [`AttributeRecord`]s directly following this record
    pub attribute_count: i32,

    /// Offset of the parent node
    pub parent: i32,

    /// Offset of the previous sibling
    pub prev: i32,

    /// Offset of the next sibling
    pub next: i32,

    /// Offset of the first child
    pub first_child: i32,

    /// Offset of the last child
    pub last_child: i32,
}

/// Attribute record
///
/// The meaning of the two payload words depends on the type, see [`crate::value::AttributeKind`].
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct AttributeRecord {
    /// Offset of the attribute name in the string table
    pub name: i32,

    /// Raw type tag
    pub kind: u32,

    /// Immediate value or offset
    pub first: i32,

    /// Size, count or stride
    pub second: i32,
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use binrw::BinRead;
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{AttributeRecord, ContainerKind, NodeRecord, RcoHeader, TableSpan};

    #[test]
    fn read_header() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            b'R', b'C', b'O', b'F',
            0x10, 0x01, 0x00, 0x00,
            0x50, 0x00, 0x00, 0x00, 0x1C, 0x00, 0x00, 0x00,
            0x6C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x6C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x6C, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x74, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]);

        let expected = RcoHeader {
            magic: *b"RCOF",
            version: 0x110,
            tree: TableSpan {
                offset: 0x50,
                size: 0x1C,
            },
            id_table: TableSpan {
                offset: 0x6C,
                size: 0,
            },
            id_hash_table: TableSpan {
                offset: 0x6C,
                size: 0,
            },
            string_table: TableSpan {
                offset: 0x6C,
                size: 5,
            },
            wstring_table: TableSpan {
                offset: 0x74,
                size: 0,
            },
            hash_table: TableSpan {
                offset: 0x74,
                size: 0,
            },
            int_array_table: TableSpan {
                offset: 0x74,
                size: 0,
            },
            float_array_table: TableSpan {
                offset: 0x74,
                size: 0,
            },
            file_table: TableSpan {
                offset: 0x74,
                size: 0,
            },
        };

        assert_eq!(RcoHeader::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_node() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x04, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFF, 0xFF, 0xFF,
            0x3C, 0x00, 0x00, 0x00,
            0x3C, 0x00, 0x00, 0x00,
        ]);

        let expected = NodeRecord {
            name: 4,
            attribute_count: 2,
            parent: -1,
            prev: -1,
            next: -1,
            first_child: 0x3C,
            last_child: 0x3C,
        };

        assert_eq!(NodeRecord::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn read_attribute() -> Result<()> {
        #[rustfmt::skip]
        let mut input = Cursor::new(vec![
            0x08, 0x00, 0x00, 0x00,
            0x05, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
        ]);

        let expected = AttributeRecord {
            name: 8,
            kind: 5,
            first: 1,
            second: 4,
        };

        assert_eq!(AttributeRecord::read(&mut input)?, expected);

        Ok(())
    }

    #[test]
    fn kind_from_magic() {
        assert_eq!(ContainerKind::from_magic(b"RCOF"), Some(ContainerKind::Root));
        assert_eq!(ContainerKind::from_magic(b"RCSF"), Some(ContainerKind::Nested));
        assert_eq!(ContainerKind::from_magic(b"CXML"), None);
    }
}

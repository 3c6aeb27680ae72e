//! Bounds checked access to the header and side tables of a container.

use std::{fmt, io::Cursor};

use binrw::BinRead;
use byteorder::{ByteOrder, LittleEndian};
use widestring::U16String;

use crate::{
    error::{Error, Result},
    types::{
        AttributeRecord, ContainerKind, NodeRecord, RcoHeader, TableSpan, ATTRIBUTE_SIZE,
        HEADER_SIZE, NODE_SIZE,
    },
};

/// The regions of a container that offsets are relative to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Table {
    Tree,
    Id,
    IdHash,
    String,
    WString,
    Hash,
    IntArray,
    FloatArray,
    File,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Tree => "tree",
            Table::Id => "id",
            Table::IdHash => "id hash",
            Table::String => "string",
            Table::WString => "wide string",
            Table::Hash => "hash",
            Table::IntArray => "int array",
            Table::FloatArray => "float array",
            Table::File => "file",
        })
    }
}

/// A validated view over the bytes of one container
///
/// ```no_run
/// fn count_nodes(data: &[u8]) -> rco_cxml::error::Result<()> {
///     let container = rco_cxml::Container::new(data, rco_cxml::ContainerKind::Root)?;
///     let root = container.node(0)?;
///     println!("root is <{}>", container.string(root.name)?);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Container<'a> {
    data: &'a [u8],
    header: RcoHeader,
    kind: ContainerKind,
}

impl<'a> Container<'a> {
    /// Validate the magic for the requested kind and read the header.
    pub fn new(data: &'a [u8], kind: ContainerKind) -> Result<Container<'a>> {
        let magic = Self::magic_of(data);
        if magic != *kind.magic() {
            return Err(Error::InvalidMagic {
                expected: match kind {
                    ContainerKind::Root => "RCOF",
                    ContainerKind::Nested => "RCSF",
                },
                found: magic,
            });
        }

        if data.len() < HEADER_SIZE {
            return Err(Error::OutOfRange {
                table: Table::Tree,
                offset: 0,
                len: HEADER_SIZE as i64,
            });
        }

        let header = RcoHeader::read(&mut Cursor::new(&data[..HEADER_SIZE]))?;
        Ok(Container { data, header, kind })
    }

    /// Read a container of whichever kind its magic announces.
    pub fn detect(data: &'a [u8]) -> Result<Container<'a>> {
        let magic = Self::magic_of(data);
        let kind = ContainerKind::from_magic(&magic).ok_or(Error::InvalidMagic {
            expected: "RCOF or RCSF",
            found: magic,
        })?;
        Self::new(data, kind)
    }

    fn magic_of(data: &[u8]) -> [u8; 4] {
        let mut magic = [0u8; 4];
        let len = data.len().min(4);
        magic[..len].copy_from_slice(&data[..len]);
        magic
    }

    /// The parsed header
    pub fn header(&self) -> &RcoHeader {
        &self.header
    }

    /// Which flavour of container this is
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Size of the whole buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is empty, never true for a validated container
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn span(&self, table: Table) -> TableSpan {
        match table {
            Table::Tree => self.header.tree,
            Table::Id => self.header.id_table,
            Table::IdHash => self.header.id_hash_table,
            Table::String => self.header.string_table,
            Table::WString => self.header.wstring_table,
            Table::Hash => self.header.hash_table,
            Table::IntArray => self.header.int_array_table,
            Table::FloatArray => self.header.float_array_table,
            Table::File => self.header.file_table,
        }
    }

    /// Borrow `len` bytes starting `offset` bytes into `table`.
    pub fn resolve(&self, table: Table, offset: i64, len: i64) -> Result<&'a [u8]> {
        let out_of_range = || Error::OutOfRange { table, offset, len };

        let start = i64::from(self.span(table).offset)
            .checked_add(offset)
            .ok_or_else(out_of_range)?;
        let end = start.checked_add(len).ok_or_else(out_of_range)?;
        if start < 0 || len < 0 || end > self.data.len() as i64 {
            return Err(out_of_range());
        }

        Ok(&self.data[start as usize..end as usize])
    }

    /// Everything from `offset` into `table` up to the end of the buffer.
    fn tail(&self, table: Table, offset: i64) -> Result<&'a [u8]> {
        let start = i64::from(self.span(table).offset).saturating_add(offset);
        let remaining = self.data.len() as i64 - start;
        self.resolve(table, offset, remaining.max(0))
    }

    fn terminated(&self, table: Table, offset: i64) -> Result<&'a [u8]> {
        let tail = self.tail(table, offset)?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(Error::OutOfRange {
                table,
                offset,
                len: tail.len() as i64 + 1,
            })?;
        Ok(&tail[..end])
    }

    /// Zero terminated string at a byte offset into the string table.
    pub fn string(&self, offset: i32) -> Result<String> {
        let bytes = self.terminated(Table::String, i64::from(offset))?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Zero terminated wide string at an offset counted in 16-bit units.
    pub fn wstring(&self, unit_offset: i32) -> Result<U16String> {
        let offset = i64::from(unit_offset) * 2;
        let tail = self.tail(Table::WString, offset)?;

        let mut units = Vec::new();
        for chunk in tail.chunks_exact(2) {
            let unit = LittleEndian::read_u16(chunk);
            if unit == 0 {
                return Ok(U16String::from_vec(units));
            }
            units.push(unit);
        }

        Err(Error::OutOfRange {
            table: Table::WString,
            offset,
            len: tail.len() as i64 + 2,
        })
    }

    /// String id, skipping the 4 byte prefix of the entry.
    pub fn id(&self, offset: i32) -> Result<String> {
        let bytes = self.terminated(Table::Id, i64::from(offset) + 4)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Hashed id, skipping the 4 byte prefix of the entry.
    pub fn id_hash(&self, offset: i32) -> Result<u32> {
        let bytes = self.resolve(Table::IdHash, i64::from(offset) + 4, 4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    /// Hash at an element index.
    pub fn hash(&self, index: i32) -> Result<u32> {
        let bytes = self.resolve(Table::Hash, i64::from(index) * 4, 4)?;
        Ok(LittleEndian::read_u32(bytes))
    }

    /// `count` integers starting at an element index.
    pub fn int_array(&self, index: i32, count: i32) -> Result<Vec<i32>> {
        let bytes = self.resolve(
            Table::IntArray,
            i64::from(index) * 4,
            i64::from(count) * 4,
        )?;
        let mut values = vec![0; bytes.len() / 4];
        LittleEndian::read_i32_into(bytes, &mut values);
        Ok(values)
    }

    /// `count` floats starting at an element index.
    pub fn float_array(&self, index: i32, count: i32) -> Result<Vec<f32>> {
        let bytes = self.resolve(
            Table::FloatArray,
            i64::from(index) * 4,
            i64::from(count) * 4,
        )?;
        let mut values = vec![0.0; bytes.len() / 4];
        LittleEndian::read_f32_into(bytes, &mut values);
        Ok(values)
    }

    /// Embedded file bytes.
    pub fn file(&self, offset: i32, size: i32) -> Result<&'a [u8]> {
        self.resolve(Table::File, i64::from(offset), i64::from(size))
    }

    /// Node record at an offset into the tree table.
    pub fn node(&self, offset: i32) -> Result<NodeRecord> {
        let bytes = self.resolve(Table::Tree, i64::from(offset), NODE_SIZE as i64)?;
        Ok(NodeRecord::read(&mut Cursor::new(bytes))?)
    }

    /// The `count` attribute records following the node at `offset`.
    pub fn attributes(&self, offset: i32, count: i32) -> Result<Vec<AttributeRecord>> {
        let bytes = self.resolve(
            Table::Tree,
            i64::from(offset) + NODE_SIZE as i64,
            i64::from(count) * ATTRIBUTE_SIZE as i64,
        )?;

        let mut cursor = Cursor::new(bytes);
        (0..count)
            .map(|_| AttributeRecord::read(&mut cursor).map_err(Error::from))
            .collect()
    }
}

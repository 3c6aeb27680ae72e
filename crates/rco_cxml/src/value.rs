//! Typed attribute values resolved out of the side tables.

use std::path::PathBuf;

use widestring::U16String;

use crate::{
    error::{Error, Result},
    table::Container,
    types::AttributeRecord,
};

/// The type tag stored in an [`AttributeRecord`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u32)]
pub enum AttributeKind {
    /// Immediate signed integer
    Int = 1,
    /// Immediate float
    Float = 2,
    /// Offset into the string table
    String = 3,
    /// Offset in 16-bit units into the wide string table
    WString = 4,
    /// Element index into the hash table, with a stride of 4
    Hash = 5,
    /// Element index and count into the int array table
    IntArray = 6,
    /// Element index and count into the float array table
    FloatArray = 7,
    /// Byte offset and size into the file table
    Filename = 8,
    /// Offset into the id table
    Id = 9,
    /// Reference to an id, not resolved
    IdRef = 10,
    /// Offset into the id hash table
    IdHash = 11,
    /// Offset into the id hash table
    IdHashRef = 12,
}

impl TryFrom<u32> for AttributeKind {
    type Error = u32;

    fn try_from(value: u32) -> core::result::Result<Self, Self::Error> {
        Ok(match value {
            1 => AttributeKind::Int,
            2 => AttributeKind::Float,
            3 => AttributeKind::String,
            4 => AttributeKind::WString,
            5 => AttributeKind::Hash,
            6 => AttributeKind::IntArray,
            7 => AttributeKind::FloatArray,
            8 => AttributeKind::Filename,
            9 => AttributeKind::Id,
            10 => AttributeKind::IdRef,
            11 => AttributeKind::IdHash,
            12 => AttributeKind::IdHashRef,
            other => return Err(other),
        })
    }
}

/// One resolved attribute value, owning everything it copied out of the container
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    String(String),
    WString(U16String),
    Hash(u32),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    /// An embedded file
    Filename {
        /// The stored bytes, possibly zlib compressed
        data: Vec<u8>,
        /// Where the file was extracted to, relative to the output root
        output: Option<PathBuf>,
    },
    Id(String),
    /// The raw payload of an id reference. Never rendered.
    IdRef(i32),
    IdHash(u32),
    IdHashRef(u32),
}

impl Value {
    /// Resolve an attribute record against the container tables.
    ///
    /// Returns `Ok(None)` for type tags this library does not know about.
    pub fn resolve(record: &AttributeRecord, container: &Container<'_>) -> Result<Option<Value>> {
        let Ok(kind) = AttributeKind::try_from(record.kind) else {
            return Ok(None);
        };

        let value = match kind {
            AttributeKind::Int => Value::Int(record.first),
            AttributeKind::Float => Value::Float(f32::from_bits(record.first as u32)),
            AttributeKind::String => Value::String(container.string(record.first)?),
            AttributeKind::WString => Value::WString(container.wstring(record.first)?),
            AttributeKind::Hash => {
                if record.second != 4 {
                    return Err(Error::InvalidHashStride(record.second));
                }
                Value::Hash(container.hash(record.first)?)
            }
            AttributeKind::IntArray => {
                Value::IntArray(container.int_array(record.first, record.second)?)
            }
            AttributeKind::FloatArray => {
                Value::FloatArray(container.float_array(record.first, record.second)?)
            }
            AttributeKind::Filename => Value::Filename {
                data: container.file(record.first, record.second)?.to_vec(),
                output: None,
            },
            AttributeKind::Id => Value::Id(container.id(record.first)?),
            AttributeKind::IdRef => Value::IdRef(record.first),
            AttributeKind::IdHash => Value::IdHash(container.id_hash(record.first)?),
            AttributeKind::IdHashRef => Value::IdHashRef(container.id_hash(record.first)?),
        };

        Ok(Some(value))
    }

    /// The type tag this value was decoded from
    pub fn kind(&self) -> AttributeKind {
        match self {
            Value::Int(_) => AttributeKind::Int,
            Value::Float(_) => AttributeKind::Float,
            Value::String(_) => AttributeKind::String,
            Value::WString(_) => AttributeKind::WString,
            Value::Hash(_) => AttributeKind::Hash,
            Value::IntArray(_) => AttributeKind::IntArray,
            Value::FloatArray(_) => AttributeKind::FloatArray,
            Value::Filename { .. } => AttributeKind::Filename,
            Value::Id(_) => AttributeKind::Id,
            Value::IdRef(_) => AttributeKind::IdRef,
            Value::IdHash(_) => AttributeKind::IdHash,
            Value::IdHashRef(_) => AttributeKind::IdHashRef,
        }
    }
}

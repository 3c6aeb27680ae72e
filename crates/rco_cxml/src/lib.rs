//! This library handles decompiling **RCO** and **RCS** resource containers into XML.
//!
//! # RCO Container Format Documentation
//!
//! An RCO file is a compiled UI/resource tree. Every node of the tree carries a list of typed
//! attributes whose payloads live in a set of side tables, and some of those payloads are whole
//! embedded files (textures, sounds, nested locale containers). Locale containers use the same
//! layout with a different magic and are typically shipped with the `.rcs` extension.
//!
//! ## File Structure
//!
//! A container consists of a fixed header followed by the tables it references. Every offset in
//! the header is relative to the start of the file.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "RCOF" for a root container, "RCSF" for a locale  |
//! | 0x0004         | Version                | 4 bytes: Format version, usually 0x110                     |
//! | 0x0008         | Tree                   | 8 bytes: Offset and size of the node records               |
//! | 0x0010         | Id Table               | 8 bytes: Offset and size of the string id entries          |
//! | 0x0018         | Id Hash Table          | 8 bytes: Offset and size of the hashed id entries          |
//! | 0x0020         | String Table           | 8 bytes: Offset and size of the 8-bit strings              |
//! | 0x0028         | Wide String Table      | 8 bytes: Offset and size of the 16-bit strings             |
//! | 0x0030         | Hash Table             | 8 bytes: Offset and size of the 32-bit hashes              |
//! | 0x0038         | Int Array Table        | 8 bytes: Offset and size of the 32-bit integer arrays      |
//! | 0x0040         | Float Array Table      | 8 bytes: Offset and size of the 32-bit float arrays        |
//! | 0x0048         | File Table             | 8 bytes: Offset and size of the embedded files             |
//!
//! ### Tree
//!
//! The tree is a list of variable sized node records linked together by offsets relative to the
//! start of the tree table. The root node lives at offset zero. A value of `-1` means "no
//! relation".
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 4 bytes: Offset of the name in the string table         |
//! | 0x0004         | Attribute Count        | 4 bytes: Number of attribute records that follow        |
//! | 0x0008         | Parent                 | 4 bytes: Offset of the parent node                      |
//! | 0x000C         | Previous               | 4 bytes: Offset of the previous sibling                 |
//! | 0x0010         | Next                   | 4 bytes: Offset of the next sibling                     |
//! | 0x0014         | First Child            | 4 bytes: Offset of the first child                      |
//! | 0x0018         | Last Child             | 4 bytes: Offset of the last child                       |
//!
//! ### Attributes
//!
//! Each node header is immediately followed by `Attribute Count` records of 16 bytes.
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Name                   | 4 bytes: Offset of the name in the string table         |
//! | 0x0004         | Type                   | 4 bytes: One of the twelve [`value::AttributeKind`]s    |
//! | 0x0008         | First Word             | 4 bytes: Immediate value or table offset                |
//! | 0x000C         | Second Word            | 4 bytes: Size, count or stride depending on the type    |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.rco` for root containers, `.rcs` for locale containers
//! - **Endianness**: Little-endian for all multi-byte integers and floats
//! - **Compression**: Embedded files may be zlib compressed when their node carries
//!   `compress="on"` alongside the uncompressed `origsize`
//!

pub mod decode;
pub mod error;
pub mod extract;
pub mod table;
pub mod tree;
pub mod types;
pub mod value;
pub mod xml;

#[cfg(test)]
pub(crate) mod fixture;

pub use decode::{DecodeOptions, Decompiler};
pub use table::Container;
pub use tree::Document;
pub use types::ContainerKind;
pub use value::Value;

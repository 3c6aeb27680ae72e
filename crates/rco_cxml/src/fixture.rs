//! Assembles small containers in memory for tests and benchmarks.

#![allow(dead_code)]

use std::io::Write;

use flate2::{write::ZlibEncoder, Compression};

const NODE_SIZE: i32 = 0x1C;
const ATTRIBUTE_SIZE: i32 = 0x10;

#[derive(Debug, Clone)]
enum Payload {
    Int(i32),
    Float(f32),
    String(String),
    WString(Vec<u16>),
    Hash(u32),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    File(Vec<u8>),
    Id(String),
    IdRef(i32),
    IdHash(u32),
    IdHashRef(u32),
    Raw(u32, i32, i32),
}

/// One attribute of a fixture node
#[derive(Debug, Clone)]
pub struct Attr {
    name: String,
    payload: Payload,
}

impl Attr {
    fn new(name: &str, payload: Payload) -> Self {
        Attr {
            name: name.to_string(),
            payload,
        }
    }

    pub fn int(name: &str, value: i32) -> Self {
        Self::new(name, Payload::Int(value))
    }

    pub fn float(name: &str, value: f32) -> Self {
        Self::new(name, Payload::Float(value))
    }

    pub fn string(name: &str, value: &str) -> Self {
        Self::new(name, Payload::String(value.to_string()))
    }

    pub fn wstring(name: &str, units: &[u16]) -> Self {
        Self::new(name, Payload::WString(units.to_vec()))
    }

    pub fn hash(name: &str, value: u32) -> Self {
        Self::new(name, Payload::Hash(value))
    }

    pub fn int_array(name: &str, values: Vec<i32>) -> Self {
        Self::new(name, Payload::IntArray(values))
    }

    pub fn float_array(name: &str, values: Vec<f32>) -> Self {
        Self::new(name, Payload::FloatArray(values))
    }

    pub fn file(name: &str, data: Vec<u8>) -> Self {
        Self::new(name, Payload::File(data))
    }

    pub fn id(name: &str, value: &str) -> Self {
        Self::new(name, Payload::Id(value.to_string()))
    }

    pub fn id_ref(name: &str, value: i32) -> Self {
        Self::new(name, Payload::IdRef(value))
    }

    pub fn id_hash(name: &str, value: u32) -> Self {
        Self::new(name, Payload::IdHash(value))
    }

    pub fn id_hash_ref(name: &str, value: u32) -> Self {
        Self::new(name, Payload::IdHashRef(value))
    }

    /// An attribute record with arbitrary type tag and payload words
    pub fn raw(name: &str, kind: u32, first: i32, second: i32) -> Self {
        Self::new(name, Payload::Raw(kind, first, second))
    }
}

/// One tag of a fixture tree
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    attrs: Vec<Attr>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Node {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, attr: Attr) -> Self {
        self.attrs.push(attr);
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

struct Placed<'n> {
    node: &'n Node,
    offset: i32,
    parent: i32,
    prev: i32,
    next: i32,
    first_child: i32,
    last_child: i32,
}

/// Lays out a [`Node`] tree and its side tables the way the decoder expects them
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    magic: [u8; 4],
    ids: Vec<u8>,
    id_hashes: Vec<u8>,
    strings: Vec<u8>,
    wstrings: Vec<u8>,
    hashes: Vec<u8>,
    ints: Vec<u8>,
    floats: Vec<u8>,
    files: Vec<u8>,
}

impl ContainerBuilder {
    pub fn root() -> Self {
        ContainerBuilder {
            magic: *b"RCOF",
            ..Default::default()
        }
    }

    pub fn nested() -> Self {
        ContainerBuilder {
            magic: *b"RCSF",
            ..Default::default()
        }
    }

    fn add_string(&mut self, value: &str) -> i32 {
        let offset = self.strings.len() as i32;
        self.strings.extend_from_slice(value.as_bytes());
        self.strings.push(0);
        offset
    }

    fn encode(&mut self, payload: &Payload) -> (u32, i32, i32) {
        match payload {
            Payload::Int(v) => (1, *v, 0),
            Payload::Float(v) => (2, v.to_bits() as i32, 0),
            Payload::String(v) => (3, self.add_string(v), v.len() as i32),
            Payload::WString(units) => {
                let offset = (self.wstrings.len() / 2) as i32;
                for unit in units.iter().chain([0u16].iter()) {
                    self.wstrings.extend_from_slice(&unit.to_le_bytes());
                }
                (4, offset, units.len() as i32)
            }
            Payload::Hash(v) => {
                let index = (self.hashes.len() / 4) as i32;
                self.hashes.extend_from_slice(&v.to_le_bytes());
                (5, index, 4)
            }
            Payload::IntArray(values) => {
                let index = (self.ints.len() / 4) as i32;
                values
                    .iter()
                    .for_each(|v| self.ints.extend_from_slice(&v.to_le_bytes()));
                (6, index, values.len() as i32)
            }
            Payload::FloatArray(values) => {
                let index = (self.floats.len() / 4) as i32;
                values
                    .iter()
                    .for_each(|v| self.floats.extend_from_slice(&v.to_le_bytes()));
                (7, index, values.len() as i32)
            }
            Payload::File(data) => {
                let offset = self.files.len() as i32;
                self.files.extend_from_slice(data);
                (8, offset, data.len() as i32)
            }
            Payload::Id(v) => {
                let offset = self.ids.len() as i32;
                self.ids.extend_from_slice(&(v.len() as u32).to_le_bytes());
                self.ids.extend_from_slice(v.as_bytes());
                self.ids.push(0);
                (9, offset, 0)
            }
            Payload::IdRef(v) => (10, *v, 0),
            Payload::IdHash(v) => (11, self.add_id_hash(*v), 0),
            Payload::IdHashRef(v) => (12, self.add_id_hash(*v), 0),
            Payload::Raw(kind, first, second) => (*kind, *first, *second),
        }
    }

    fn add_id_hash(&mut self, value: u32) -> i32 {
        let offset = self.id_hashes.len() as i32;
        self.id_hashes.extend_from_slice(&4u32.to_le_bytes());
        self.id_hashes.extend_from_slice(&value.to_le_bytes());
        offset
    }

    fn place<'n>(
        node: &'n Node,
        parent: i32,
        cursor: &mut i32,
        placed: &mut Vec<Placed<'n>>,
    ) -> usize {
        let index = placed.len();
        let offset = *cursor;
        *cursor += NODE_SIZE + ATTRIBUTE_SIZE * node.attrs.len() as i32;
        placed.push(Placed {
            node,
            offset,
            parent,
            prev: -1,
            next: -1,
            first_child: -1,
            last_child: -1,
        });

        let children = node
            .children
            .iter()
            .map(|child| Self::place(child, offset, cursor, placed))
            .collect::<Vec<_>>();

        for pair in children.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            placed[a].next = placed[b].offset;
            placed[b].prev = placed[a].offset;
        }
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            placed[index].first_child = placed[first].offset;
            placed[index].last_child = placed[last].offset;
        }

        index
    }

    /// Serialize `root` and everything it references into a container buffer.
    pub fn build(mut self, root: &Node) -> Vec<u8> {
        let mut placed = Vec::new();
        Self::place(root, -1, &mut 0, &mut placed);

        let mut tree = Vec::new();
        for p in &placed {
            let name = self.add_string(&p.node.name);
            for field in [
                name,
                p.node.attrs.len() as i32,
                p.parent,
                p.prev,
                p.next,
                p.first_child,
                p.last_child,
            ] {
                tree.extend_from_slice(&field.to_le_bytes());
            }

            for attr in &p.node.attrs {
                let name = self.add_string(&attr.name);
                let (kind, first, second) = self.encode(&attr.payload);
                tree.extend_from_slice(&name.to_le_bytes());
                tree.extend_from_slice(&kind.to_le_bytes());
                tree.extend_from_slice(&first.to_le_bytes());
                tree.extend_from_slice(&second.to_le_bytes());
            }
        }

        let tables = [
            tree,
            self.ids,
            self.id_hashes,
            self.strings,
            self.wstrings,
            self.hashes,
            self.ints,
            self.floats,
            self.files,
        ];

        let mut out = Vec::new();
        out.extend_from_slice(&self.magic);
        out.extend_from_slice(&0x110i32.to_le_bytes());

        let mut offset = 0x50i32;
        for table in &tables {
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&(table.len() as i32).to_le_bytes());
            offset += table.len() as i32;
        }
        for table in &tables {
            out.extend_from_slice(table);
        }

        out
    }
}

/// Compress `data` the way embedded files with `compress="on"` are stored.
pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

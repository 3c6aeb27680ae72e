//! Rendering a [`Document`] as indented XML.
//!
//! Only newlines are escaped in text values, everything else is written as decoded. Values
//! holding `&`, `<` or `"` therefore produce markup that strict XML parsers reject.

use std::io::{self, Write};
use std::path::Path;

use itertools::Itertools;
use tracing::warn;

use crate::{
    error::{Error, Result},
    extract::Extractor,
    tree::{Document, TagId},
    value::Value,
};

/// The prolog written at the top of every document
pub const DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Counters collected while writing a document
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct WriteStats {
    /// Tags written
    pub tags: usize,
    /// Embedded files written or skipped because their tag has no output path
    pub extracted: usize,
    /// Embedded files that could not be written
    pub failed: usize,
}

enum Frame {
    Open(TagId, usize),
    Close(TagId, usize),
}

/// Streams a [`Document`] into a writer, extracting embedded files on the way
pub struct XmlWriter<W: Write> {
    inner: W,
    extractor: Extractor,
    stats: WriteStats,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(inner: W, extractor: Extractor) -> Self {
        XmlWriter {
            inner,
            extractor,
            stats: WriteStats::default(),
        }
    }

    /// Write the `<?xml ...?>` prolog
    pub fn write_declaration(&mut self) -> Result<()> {
        self.inner.write_all(DECLARATION.as_bytes())?;
        Ok(())
    }

    /// Write every top level tag and its descendants.
    ///
    /// The relative path of each extracted file is stored back into its attribute.
    pub fn write_document(&mut self, document: &mut Document) -> Result<WriteStats> {
        let mut stack = document
            .root()
            .map(|id| Frame::Open(id, 0))
            .into_iter()
            .collect::<Vec<_>>();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Open(id, level) => {
                    let indent = "  ".repeat(level);
                    write!(self.inner, "{}<{}", indent, document.tag(id).name)?;
                    self.write_attributes(document, id)?;
                    self.stats.tags += 1;

                    let tag = document.tag(id);
                    match tag.child {
                        None => {
                            self.inner.write_all(b" />\n")?;
                            if let Some(next) = tag.next {
                                stack.push(Frame::Open(next, level));
                            }
                        }
                        Some(child) => {
                            self.inner.write_all(b">\n")?;
                            // siblings follow once the subtree is closed
                            stack.push(Frame::Close(id, level));
                            stack.push(Frame::Open(child, level + 1));
                        }
                    }
                }
                Frame::Close(id, level) => {
                    let tag = document.tag(id);
                    writeln!(self.inner, "{}</{}>", "  ".repeat(level), tag.name)?;
                    if let Some(next) = tag.next {
                        stack.push(Frame::Open(next, level));
                    }
                }
            }
        }

        self.inner.flush()?;
        Ok(self.stats)
    }

    fn write_attributes(&mut self, document: &mut Document, id: TagId) -> Result<()> {
        for index in 0..document.tag(id).attributes.len() {
            let extracted = {
                let tag = document.tag(id);
                let attribute = &tag.attributes[index];
                write!(self.inner, " {}=\"", attribute.key)?;

                match &attribute.value {
                    Value::Filename { data, .. } => {
                        Some(self.extractor.output_path(tag).map(|relative| {
                            let written = self.extractor.write(tag, &relative, data);
                            (relative, written)
                        }))
                    }
                    value => {
                        write_value(&mut self.inner, value)?;
                        None
                    }
                }
            };

            match extracted {
                // a file that could not be written still renders the path it belongs at
                Some(Ok((relative, written))) => {
                    write_path(&mut self.inner, &relative)?;
                    if let Value::Filename { output, .. } =
                        &mut document.tag_mut(id).attributes[index].value
                    {
                        *output = Some(relative);
                    }
                    match written {
                        Ok(()) => self.stats.extracted += 1,
                        Err(e) => self.extract_failed(document, id, index, &e),
                    }
                }
                Some(Err(e)) => self.extract_failed(document, id, index, &e),
                None => {}
            }

            self.inner.write_all(b"\"")?;
        }

        Ok(())
    }

    fn extract_failed(&mut self, document: &Document, id: TagId, index: usize, e: &Error) {
        let tag = document.tag(id);
        warn!(
            "<{}> unable to extract {}: {}",
            tag.name, tag.attributes[index].key, e
        );
        self.stats.failed += 1;
    }

    /// Unwrap and return the inner writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Render one attribute value.
///
/// Embedded files render as their output path, or nothing before one was derived.
pub fn write_value<W: Write>(w: &mut W, value: &Value) -> io::Result<()> {
    match value {
        Value::Int(v) => write!(w, "{}", v),
        Value::Float(v) => w.write_all(format_float(*v).as_bytes()),
        Value::String(v) => write_text(w, v),
        Value::WString(v) => write_wide(w, v.as_slice()),
        Value::Hash(v) | Value::IdHash(v) | Value::IdHashRef(v) => write!(w, "0x{:08X}", v),
        Value::IntArray(values) => write!(w, "{}", values.iter().join(", ")),
        Value::FloatArray(values) => {
            write!(w, "{}", values.iter().map(|v| format_float(*v)).join(", "))
        }
        Value::Filename { output, .. } => match output {
            Some(path) => write_path(w, path),
            None => Ok(()),
        },
        Value::Id(v) => w.write_all(v.as_bytes()),
        Value::IdRef(_) => Ok(()),
    }
}

fn write_path<W: Write>(w: &mut W, path: &Path) -> io::Result<()> {
    let joined = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/");
    w.write_all(joined.as_bytes())
}

fn write_text<W: Write>(w: &mut W, text: &str) -> io::Result<()> {
    for (i, part) in text.split('\n').enumerate() {
        if i > 0 {
            w.write_all(b"&#xA;")?;
        }
        w.write_all(part.as_bytes())?;
    }
    Ok(())
}

/// Encode 16-bit units one at a time into at most three bytes each.
///
/// Surrogate pairs are not combined, each half is encoded on its own.
pub fn write_wide<W: Write>(w: &mut W, units: &[u16]) -> io::Result<()> {
    for &unit in units {
        match unit {
            0x0A => w.write_all(b"&#xA;")?,
            0x00..=0x7F => w.write_all(&[unit as u8])?,
            0x80..=0x7FF => w.write_all(&[
                (0xC0 | ((unit >> 6) & 0x1F)) as u8,
                (0x80 | (unit & 0x3F)) as u8,
            ])?,
            _ => w.write_all(&[
                (0xE0 | ((unit >> 12) & 0x0F)) as u8,
                (0x80 | ((unit >> 6) & 0x3F)) as u8,
                (0x80 | (unit & 0x3F)) as u8,
            ])?,
        }
    }
    Ok(())
}

/// Format a float like C's `%g`: six significant digits without trailing zeros.
pub fn format_float(value: f32) -> String {
    let v = f64::from(value);
    if v.is_nan() {
        return if v.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.5e}", v);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return format!("{}", value);
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return format!("{}", value);
    };

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

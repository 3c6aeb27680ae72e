//! Writing embedded files out of the tree.

use std::{
    borrow::Cow,
    fs,
    io::Read,
    path::{Component, Path, PathBuf},
};

use flate2::read::ZlibDecoder;
use tracing::{debug, info, instrument};

use crate::{
    error::{Error, Result},
    tree::Tag,
};

/// Tag names whose files are named after their `id` and `type` attributes
const RESOURCE_TAGS: [&str; 3] = ["texture", "file", "sounddata"];

/// Writes the files embedded in `filename` attributes below an output root
///
/// ```no_run
/// # fn doit(tag: &rco_cxml::tree::Tag, data: &[u8]) -> rco_cxml::error::Result<()> {
/// let extractor = rco_cxml::extract::Extractor::new("plugin");
/// let relative = extractor.extract(tag, data)?;
/// println!("wrote plugin/{}", relative.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    root: PathBuf,
}

impl Extractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Extractor { root: root.into() }
    }

    /// The directory files are written below
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative path the file of `tag` is written to.
    ///
    /// Tags that are neither `locale` nor one of the resource tags get an empty path. Paths that
    /// would leave the output root are rejected.
    pub fn output_path(&self, tag: &Tag) -> Result<PathBuf> {
        let missing = |name| Error::MissingAttribute {
            tag: tag.name.clone(),
            name,
        };

        let relative = if tag.name == "locale" {
            let id = tag.id("id").ok_or_else(|| missing("id"))?;
            Path::new("locale").join(format!("plugin_locale_{}.xml.rcs", id))
        } else if RESOURCE_TAGS.contains(&tag.name.as_str()) {
            let id = tag.int("id").ok_or_else(|| missing("id"))? as u32;
            let kind = tag.string("type").ok_or_else(|| missing("type"))?;

            let file_name = match kind.split_once('/') {
                Some((category, extension)) => {
                    format!("{}_0x{:08X}.{}", category, id, extension)
                }
                None => format!("{}_0x{:08X}.tex", tag.name, id),
            };
            Path::new(&tag.name).join(file_name)
        } else {
            return Ok(PathBuf::new());
        };

        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(Error::UnsafePath {
                tag: tag.name.clone(),
                path: relative,
            });
        }

        Ok(relative)
    }

    /// The bytes to write for `tag`, inflated when it carries `compress="on"`.
    pub fn payload<'d>(&self, tag: &Tag, data: &'d [u8]) -> Result<Cow<'d, [u8]>> {
        if tag.string("compress") != Some("on") {
            return Ok(Cow::Borrowed(data));
        }

        let expected = tag
            .int("origsize")
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| Error::MissingAttribute {
                tag: tag.name.clone(),
                name: "origsize",
            })?;

        let mut inflated = Vec::with_capacity(expected.min(data.len().saturating_mul(16)));
        ZlibDecoder::new(data)
            .take(expected as u64 + 1)
            .read_to_end(&mut inflated)
            .map_err(Error::Decompress)?;

        if inflated.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: inflated.len(),
            });
        }

        Ok(Cow::Owned(inflated))
    }

    /// Write the file of `tag` and return its path relative to the root.
    ///
    /// Intermediate directories are created and existing files are overwritten. Nothing is
    /// written when the tag has no output path.
    pub fn extract(&self, tag: &Tag, data: &[u8]) -> Result<PathBuf> {
        let relative = self.output_path(tag)?;
        self.write(tag, &relative, data)?;
        Ok(relative)
    }

    /// Write the payload of `tag` to `relative`, a path returned by [`Extractor::output_path`].
    #[instrument(skip_all, fields(tag = %tag.name), err)]
    pub fn write(&self, tag: &Tag, relative: &Path, data: &[u8]) -> Result<()> {
        let payload = self.payload(tag, data)?;

        if relative.as_os_str().is_empty() {
            debug!("no output path for <{}>, {} bytes dropped", tag.name, data.len());
            return Ok(());
        }

        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        info!("writing {}", path.display());
        fs::write(&path, &payload)?;

        Ok(())
    }
}

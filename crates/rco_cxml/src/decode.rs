//! Driving a whole container, and the locale containers it contains, to disk.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use bon::Builder;
use tracing::{debug, error, info, instrument};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    extract::Extractor,
    table::Container,
    tree::Document,
    types::ContainerKind,
    xml::{WriteStats, XmlWriter},
};

/// Name of the directory locale containers are extracted into
pub const LOCALE_DIR: &str = "locale";

/// Options controlling how containers are decoded
#[derive(Debug, Clone, Copy, Builder)]
pub struct DecodeOptions {
    /// Deepest level of nesting accepted before the container is rejected
    #[builder(default = 256)]
    pub max_depth: usize,

    /// Whether extracted locale containers are decoded after the root container
    #[builder(default = true)]
    pub decode_locales: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions::builder().build()
    }
}

/// Outcome of decoding one locale container
#[derive(Debug)]
pub struct NestedReport {
    /// The extracted `.rcs` file
    pub source: PathBuf,
    /// The written document
    pub result: Result<PathBuf>,
}

/// Outcome of decoding a container
#[derive(Debug)]
pub struct DecodeReport {
    /// The written document
    pub document: PathBuf,
    /// Number of tags in the container
    pub tags: usize,
    /// Embedded files written
    pub extracted: usize,
    /// Embedded files that could not be written
    pub failed: usize,
    /// Locale containers found after extraction, in directory order
    pub nested: Vec<NestedReport>,
}

impl DecodeReport {
    fn new(document: PathBuf, stats: WriteStats) -> Self {
        DecodeReport {
            document,
            tags: stats.tags,
            extracted: stats.extracted,
            failed: stats.failed,
            nested: Vec::new(),
        }
    }
}

/// Decodes containers into XML documents and extracted files
///
/// ```no_run
/// fn decompile(path: &std::path::Path) -> rco_cxml::error::Result<()> {
///     let decompiler = rco_cxml::Decompiler::new(rco_cxml::DecodeOptions::default());
///     let report = decompiler.decompile_file(path, ".")?;
///     println!("wrote {}", report.document.display());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decompiler {
    options: DecodeOptions,
}

impl Decompiler {
    pub fn new(options: DecodeOptions) -> Self {
        Decompiler { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Read a root container from disk and decode it into `<directory>/<file stem>/`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn decompile_file(
        &self,
        path: impl AsRef<Path>,
        directory: impl AsRef<Path>,
    ) -> Result<DecodeReport> {
        let path = path.as_ref();
        let data = fs::read(path)?;

        let name = path
            .file_stem()
            .ok_or_else(|| Error::CustomError(format!("{} has no file name", path.display())))?;

        self.decode(&data, directory.as_ref().join(name), ContainerKind::Root)
    }

    /// Decode one container held in memory.
    ///
    /// For a root container `output` is the directory to create, and the document is written to
    /// `<output>/<output name>.xml` before the extracted locale containers are decoded. For a
    /// nested container `output` is the path of the document itself, and its embedded files are
    /// written below a directory named after the document's stem.
    pub fn decode(
        &self,
        data: &[u8],
        output: impl AsRef<Path>,
        kind: ContainerKind,
    ) -> Result<DecodeReport> {
        let output = output.as_ref();
        let container = Container::new(data, kind)?;

        match kind {
            ContainerKind::Root => {
                let name = output.file_name().ok_or_else(|| {
                    Error::CustomError(format!("{} has no file name", output.display()))
                })?;
                let mut file_name = name.to_os_string();
                file_name.push(".xml");
                let document = output.join(file_name);

                let mut report = self.write(&container, &document, output)?;
                if self.options.decode_locales {
                    report.nested = self.decode_locales(&output.join(LOCALE_DIR));
                }
                Ok(report)
            }
            ContainerKind::Nested => {
                let root = output.with_extension("");
                self.write(&container, output, &root)
            }
        }
    }

    #[instrument(skip(self, container), fields(kind = ?container.kind()))]
    fn write(
        &self,
        container: &Container<'_>,
        document_path: &Path,
        root: &Path,
    ) -> Result<DecodeReport> {
        let mut document = Document::build(container, &self.options)?;
        debug!("built {} tags", document.len());

        if let Some(parent) = document_path.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("writing {}", document_path.display());

        let file = BufWriter::new(File::create(document_path)?);
        let mut writer = XmlWriter::new(file, Extractor::new(root));
        writer.write_declaration()?;
        let stats = writer.write_document(&mut document)?;

        for source in document.locale_sources() {
            debug!("locale source {}", source.display());
        }

        Ok(DecodeReport::new(document_path.to_path_buf(), stats))
    }

    /// List the extracted locale containers, one directory level deep and sorted by name.
    fn locale_entries(directory: &Path) -> Result<Vec<PathBuf>> {
        WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if !entry.file_type().is_file() => None,
                Ok(entry) => {
                    let is_rcs = entry
                        .path()
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("rcs"));
                    is_rcs.then(|| Ok(entry.into_path()))
                }
                Err(e) => Some(Err(Error::IOError(e.into()))),
            })
            .collect()
    }

    /// Decode every extracted locale container. Failures are logged and reported, never returned.
    fn decode_locales(&self, directory: &Path) -> Vec<NestedReport> {
        if !directory.is_dir() {
            return Vec::new();
        }

        let entries = match Self::locale_entries(directory) {
            Ok(entries) => entries,
            Err(e) => {
                error!("unable to list {}: {}", directory.display(), e);
                return Vec::new();
            }
        };
        info!("decoding {} locale containers", entries.len());

        entries
            .into_iter()
            .map(|source| {
                let result = fs::read(&source)
                    .map_err(Error::from)
                    .and_then(|data| {
                        self.decode(&data, source.with_extension(""), ContainerKind::Nested)
                    })
                    .map(|report| report.document);

                if let Err(e) = &result {
                    error!("unable to decode {}: {}", source.display(), e);
                }
                NestedReport { source, result }
            })
            .collect()
    }
}

use clap::Args;
use miette::{Context, Result};
use owo_colors::OwoColorize;
use rco_cxml::{DecodeOptions, Decompiler};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Args)]
pub struct DecompileArgs {
    /// An input RCO file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// The directory the `<name>/` output directory is created in
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    directory: PathBuf,

    /// Deepest tag nesting accepted before the file is rejected
    #[arg(long, value_name = "N", default_value_t = 256)]
    max_depth: usize,

    /// Leave extracted locale files undecoded
    #[arg(long, default_value_t = false)]
    no_locales: bool,
}

impl DecompileArgs {
    pub fn handle(&self) -> Result<()> {
        let options = DecodeOptions::builder()
            .max_depth(self.max_depth)
            .decode_locales(!self.no_locales)
            .build();

        let report = Decompiler::new(options)
            .decompile_file(&self.file, &self.directory)
            .context(format!("decompiling {}", &self.file.display()))?;

        info!(
            "{} tags, {} files extracted, {} failed",
            report.tags, report.extracted, report.failed
        );

        let mut failures = 0;
        for nested in &report.nested {
            match &nested.result {
                Ok(document) => println!("{} {}", "✅".green(), document.display()),
                Err(e) => {
                    failures += 1;
                    println!("{} {}: {}", "❌".red(), nested.source.display(), e.red());
                }
            }
        }
        if failures > 0 {
            warn!("{} of {} locale files could not be decoded", failures, report.nested.len());
        }

        println!("{} {}", "✅".green(), report.document.display());
        Ok(())
    }
}

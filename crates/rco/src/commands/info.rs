use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use rco_cxml::{types::TableSpan, Container, DecodeOptions, Document};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input RCO or RCS file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn span(name: &str, span: &TableSpan) {
    println!(
        "  {:<12} offset 0x{:08X} size 0x{:08X}",
        name.bold(),
        span.offset,
        span.size
    );
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        let container = Container::detect(&data)?;
        let header = container.header();

        println!(
            "{} {} version 0x{:X}, {} bytes",
            self.file.display().bold(),
            String::from_utf8_lossy(&header.magic).green(),
            header.version,
            container.len()
        );
        span("tree", &header.tree);
        span("id", &header.id_table);
        span("id hash", &header.id_hash_table);
        span("string", &header.string_table);
        span("wstring", &header.wstring_table);
        span("hash", &header.hash_table);
        span("int array", &header.int_array_table);
        span("float array", &header.float_array_table);
        span("file", &header.file_table);

        match Document::build(&container, &DecodeOptions::default()) {
            Ok(document) => println!("  {} tags", document.len()),
            Err(e) => println!("  {} {}", "tree unreadable:".red(), e),
        }

        Ok(())
    }
}

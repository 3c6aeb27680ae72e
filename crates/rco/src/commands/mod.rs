pub mod decompile;
pub mod info;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Decompile an RCO file into an XML document and its embedded files
    Decompile(decompile::DecompileArgs),
    /// Print the header of an RCO or RCS file
    Info(info::InfoArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Decompile(decompile) => decompile.handle(),
            Commands::Info(info) => info.handle(),
        }
    }
}

use clap::{Parser, Subcommand};
use movr_extract::models::ImageType;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about = "Rename vendor photography and copy it into the studio folder structure")]
pub struct Cli {
    /// Configuration file, on top of the one in the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// More logging (-v debug, -vv trace). Overrides MOVR_LOG.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show what would be recognised in each filename and the name it would get.
    Parse {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Image type to preview names for.
        #[arg(long = "type", value_parser = image_type)]
        image_type: Option<ImageType>,
        /// One JSON object per line instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Copy files into the destination under their canonical names.
    Commit {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Destination root. Defaults to the configured, then the most recent, one.
        #[arg(long)]
        dest: Option<PathBuf>,
        #[arg(long = "type", value_parser = image_type)]
        image_type: Option<ImageType>,
        /// Largest fraction of files allowed to have issues, in (0, 1].
        #[arg(long)]
        threshold: Option<f64>,
        /// Report what would happen without writing anything.
        #[arg(long)]
        dry_run: bool,
        /// Re-apply edits saved by the previous session.
        #[arg(long)]
        restore: bool,
    },
    /// Print the saved audit log.
    Log,
    /// Forget the saved session.
    Clear,
}

fn image_type(value: &str) -> Result<ImageType, String> {
    value.parse().map_err(|_| {
        let known: Vec<_> = ImageType::ALL.iter().map(ImageType::slug).collect();
        format!("unknown image type {value:?}, expected one of: {}", known.join(", "))
    })
}

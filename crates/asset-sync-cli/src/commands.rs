use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "asset-sync")]
#[command(about = "Keeps the product image store in line with the catalog", long_about = None)]
pub struct Cli {
    /// Print the run report as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Args)]
pub struct RootArgs {
    /// Image store root; defaults to the configured root (storage/products)
    pub root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog SQLite database; defaults to the configured catalog_db
    #[arg(long)]
    pub catalog: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List product folders and how many images each holds
    Scan(RootArgs),
    /// Convert legacy image formats to the canonical format, removing sources
    Convert {
        #[command(flatten)]
        root: RootArgs,
        /// Converter program to run as `<program> <input> <output>`
        #[arg(long)]
        converter: Option<String>,
    },
    /// Lower-case directory names, deepest directories first
    Rename(RootArgs),
    /// Match product folders against catalog records without images
    Match {
        #[command(flatten)]
        root: RootArgs,
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Report catalog image URLs that are not under the storage prefix
    AuditUrls(CatalogArgs),
    /// Show where an uploaded image would be stored
    UploadPath {
        /// Original file name of the upload
        file: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        product: Option<String>,
    },
    /// Print configuration values
    PrintConfig,
}

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Admin CLI for a PixelVault claim file
#[derive(Parser, Debug)]
#[command(name = "pixelvault", version, about = "PixelVault claim file CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a zero-filled claim file (640x480 slots of 628 B)
    Init {
        #[arg(long)]
        path: PathBuf,
    },
    /// Read the claim at (x, y)
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: i64,
        #[arg(long, allow_hyphen_values = true)]
        y: i64,
        /// JSON output
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Hex dump of the raw slot
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
    /// Claim pixel (x, y)
    Put {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        x: i64,
        #[arg(long, allow_hyphen_values = true)]
        y: i64,
        #[arg(long)]
        username: String,
        #[arg(long)]
        content: String,
        #[arg(long, allow_hyphen_values = true)]
        id: f64,
    },
    /// Check whether a username already holds a claim
    Exists {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        username: String,
    },
    /// Print file/claim summary
    Status {
        #[arg(long)]
        path: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Render the partially revealed image
    Render {
        #[arg(long)]
        path: PathBuf,
        /// 640x480 PNG to reveal
        #[arg(long)]
        secret: PathBuf,
        /// 640x480 PNG shown over unclaimed pixels
        #[arg(long)]
        cover: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render a project's directory structure as a tree, flat listing, or markdown"
)]
pub struct Cli {
    /// Directory to document
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format: tree, plain, or markdown
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Append human-readable file sizes to names
    #[arg(long, short = 's')]
    pub show_size: bool,

    /// Use a predefined set of options from presets.toml
    #[arg(long)]
    pub preset: Option<String>,

    /// Patterns for files or directories to exclude
    #[arg(long, num_args = 1..)]
    pub exclude: Option<Vec<String>>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Maximum depth to descend below the root
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Write the result to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

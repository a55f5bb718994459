use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Raised when a format name does not match any known renderer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported format: {0}")]
pub struct UnsupportedFormatError(pub String);

/// Which renderer the formatter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Tree,
    Plain,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = UnsupportedFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(OutputFormat::Tree),
            "plain" => Ok(OutputFormat::Plain),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(UnsupportedFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Tree => "tree",
            OutputFormat::Plain => "plain",
            OutputFormat::Markdown => "markdown",
        };
        f.write_str(name)
    }
}

/// Options that control a single formatting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructureConfig {
    pub format: OutputFormat,
    pub show_size: bool,
}

impl StructureConfig {
    /// Builds a config from a raw format name, e.g. one read from a preset file.
    pub fn parse(format: &str, show_size: bool) -> Result<Self, UnsupportedFormatError> {
        Ok(Self {
            format: format.parse()?,
            show_size,
        })
    }
}

/// Represents the final configuration after merging presets and CLI args.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub structure: StructureConfig,
    pub exclude: Vec<String>,
    pub include_hidden: bool,
    pub max_depth: Option<usize>,
    pub output: Option<PathBuf>,
}

/// One file or directory in the collected tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    pub path: PathBuf,
    pub rel_path: PathBuf,
    pub is_dir: bool,
    pub size: Option<u64>,
    pub children: Vec<DirectoryNode>,
}

impl DirectoryNode {
    pub fn file(path: impl Into<PathBuf>, rel_path: impl Into<PathBuf>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            rel_path: rel_path.into(),
            is_dir: false,
            size,
            children: Vec::new(),
        }
    }

    pub fn dir(
        path: impl Into<PathBuf>,
        rel_path: impl Into<PathBuf>,
        children: Vec<DirectoryNode>,
    ) -> Self {
        Self {
            path: path.into(),
            rel_path: rel_path.into(),
            is_dir: true,
            size: None,
            children,
        }
    }

    /// Final component of `path`, or an empty string for paths like `/`.
    pub fn name(&self) -> String {
        node_name(&self.path)
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(DirectoryNode::count_nodes).sum::<usize>()
    }

    /// Number of non-directory nodes in this subtree.
    pub fn count_files(&self) -> usize {
        if !self.is_dir {
            return 1;
        }
        self.children.iter().map(DirectoryNode::count_files).sum()
    }
}

fn node_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

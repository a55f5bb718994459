use crate::app::models::{DirectoryNode, RuntimeConfig};
use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};
use pathdiff::diff_paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A walked entry before it is attached to its parent.
struct Entry {
    path: PathBuf,
    rel_path: PathBuf,
    is_dir: bool,
    size: Option<u64>,
}

pub struct Scanner {
    root: PathBuf,
    exclude_set: GlobSet,
    include_hidden: bool,
    max_depth: Option<usize>,
}

impl Scanner {
    pub fn new(root: PathBuf, config: &RuntimeConfig) -> Result<Self> {
        if !root.is_dir() {
            bail!("Not a directory: {}", root.display());
        }

        Ok(Self {
            root,
            exclude_set: build_globset(&config.exclude)?,
            include_hidden: config.include_hidden,
            max_depth: config.max_depth,
        })
    }

    /// Walks the root (honouring .gitignore) and assembles a `DirectoryNode` tree.
    pub fn collect(&self) -> Result<DirectoryNode> {
        let root = self.root.clone();
        let exclude_set = self.exclude_set.clone();

        let walker = WalkBuilder::new(&self.root)
            .hidden(!self.include_hidden)
            .git_ignore(true)
            .max_depth(self.max_depth)
            .filter_entry(move |entry| keep_entry(&root, &exclude_set, entry))
            .build();

        let mut by_parent: HashMap<PathBuf, Vec<Entry>> = HashMap::new();
        let mut seen = 0usize;

        for result in walker {
            match result {
                Ok(entry) => {
                    if let Some(processed) = self.process_entry(&entry) {
                        if let Some(parent) = processed.path.parent() {
                            by_parent
                                .entry(parent.to_path_buf())
                                .or_default()
                                .push(processed);
                            seen += 1;
                        }
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        log::debug!("Collected {} entries under {}", seen, self.root.display());

        Ok(assemble(self.root.clone(), PathBuf::new(), &mut by_parent))
    }

    fn process_entry(&self, entry: &DirEntry) -> Option<Entry> {
        let path = entry.path();
        // The root is the node everything hangs off, not an entry.
        if path == self.root {
            return None;
        }

        let rel_path = diff_paths(path, &self.root)?;
        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());

        let size = if is_dir {
            None
        } else {
            match entry.metadata() {
                Ok(meta) => Some(meta.len()),
                Err(err) => {
                    log::warn!("Could not read metadata for {}: {}", path.display(), err);
                    None
                }
            }
        };

        Some(Entry {
            path: path.to_path_buf(),
            rel_path,
            is_dir,
            size,
        })
    }
}

/// Prunes `.git` and excluded paths before the walker descends into them.
fn keep_entry(root: &Path, exclude_set: &GlobSet, entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return true;
    }
    if entry.file_name() == ".git" {
        return false;
    }
    match diff_paths(entry.path(), root) {
        Some(relative) => !exclude_set.is_match(&relative),
        None => true,
    }
}

fn assemble(
    path: PathBuf,
    rel_path: PathBuf,
    by_parent: &mut HashMap<PathBuf, Vec<Entry>>,
) -> DirectoryNode {
    let entries = by_parent.remove(&path).unwrap_or_default();
    let children = entries
        .into_iter()
        .map(|entry| {
            if entry.is_dir {
                assemble(entry.path, entry.rel_path, by_parent)
            } else {
                DirectoryNode::file(entry.path, entry.rel_path, entry.size)
            }
        })
        .collect();

    DirectoryNode::dir(path, rel_path, children)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}

use crate::app::models::{DirectoryNode, OutputFormat, StructureConfig, UnsupportedFormatError};
use std::cmp::Ordering;
use std::path::PathBuf;
use thiserror::Error;

pub const HEADER_TITLE_PREFIX: &str = "# Project Structure: ";
pub const GENERATOR_TAG: &str = "# Generated by structure_gen";

const CONNECTOR_LAST: &str = "└── ";
const CONNECTOR_MID: &str = "├── ";
const EXTENSION_LAST: &str = "    ";
const EXTENSION_MID: &str = "│   ";

const MARKER_DIR: &str = "📁";
const MARKER_FILE: &str = "📄";

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    UnsupportedFormat(#[from] UnsupportedFormatError),
    #[error("Root of a structure must be a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Renders a collected directory tree as text.
///
/// The tree is only borrowed; sibling order comes from the renderers' own
/// sort rules, so output does not depend on how the collector ordered it.
pub struct StructureFormatter<'a> {
    config: &'a StructureConfig,
}

impl<'a> StructureFormatter<'a> {
    pub fn new(config: &'a StructureConfig) -> Self {
        Self { config }
    }

    /// Two header lines followed by the body of the configured format,
    /// joined by `\n` with no trailing newline.
    pub fn format_structure(&self, root: &DirectoryNode) -> Result<String, FormatError> {
        if !root.is_dir {
            return Err(FormatError::NotADirectory(root.path.clone()));
        }

        let mut lines = vec![
            format!("{}{}", HEADER_TITLE_PREFIX, root.name()),
            GENERATOR_TAG.to_string(),
        ];

        match self.config.format {
            OutputFormat::Tree => self.format_tree(root, "", true, &mut lines),
            OutputFormat::Plain => self.format_plain(root, &mut lines),
            OutputFormat::Markdown => self.format_markdown(root, 0, &mut lines),
        }

        log::debug!(
            "Rendered {} as {} ({} lines)",
            root.path.display(),
            self.config.format,
            lines.len() - 2
        );

        Ok(lines.join("\n"))
    }

    fn format_tree(&self, node: &DirectoryNode, prefix: &str, is_last: bool, lines: &mut Vec<String>) {
        let connector = if is_last { CONNECTOR_LAST } else { CONNECTOR_MID };
        lines.push(format!("{}{}{}", prefix, connector, self.format_name(node)));

        let extension = if is_last { EXTENSION_LAST } else { EXTENSION_MID };
        let child_prefix = format!("{}{}", prefix, extension);

        let children = sorted_files_first(&node.children);
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            self.format_tree(child, &child_prefix, i + 1 == count, lines);
        }
    }

    fn format_plain(&self, node: &DirectoryNode, lines: &mut Vec<String>) {
        if !node.is_dir {
            lines.push(node.rel_path.to_string_lossy().into_owned());
            return;
        }

        let mut children: Vec<(String, &DirectoryNode)> = node
            .children
            .iter()
            .map(|c| (c.rel_path.to_string_lossy().into_owned(), c))
            .collect();
        children.sort_by(|a, b| a.0.cmp(&b.0));

        for (_, child) in children {
            self.format_plain(child, lines);
        }
    }

    fn format_markdown(&self, node: &DirectoryNode, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let marker = if node.is_dir { MARKER_DIR } else { MARKER_FILE };
        lines.push(format!("{}- {} {}", indent, marker, self.format_name(node)));

        for child in sorted_files_first(&node.children) {
            self.format_markdown(child, depth + 1, lines);
        }
    }

    fn format_name(&self, node: &DirectoryNode) -> String {
        let name = node.name();
        match node.size {
            Some(size) if self.config.show_size => format!("{} ({})", name, format_size(size)),
            _ => name,
        }
    }
}

/// Files ahead of directories, then by name.
fn sorted_files_first(children: &[DirectoryNode]) -> Vec<&DirectoryNode> {
    let mut keyed: Vec<(bool, String, &DirectoryNode)> =
        children.iter().map(|c| (c.is_dir, c.name(), c)).collect();
    keyed.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });
    keyed.into_iter().map(|(_, _, c)| c).collect()
}

/// Human-readable byte count with one decimal, e.g. `1.5 KB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} PB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> DirectoryNode {
        DirectoryNode::dir(
            "/work/proj",
            "",
            vec![
                DirectoryNode::dir(
                    "/work/proj/sub",
                    "sub",
                    vec![DirectoryNode::file("/work/proj/sub/b.py", "sub/b.py", Some(2048))],
                ),
                DirectoryNode::file("/work/proj/a.py", "a.py", Some(100)),
            ],
        )
    }

    fn deep_tree() -> DirectoryNode {
        DirectoryNode::dir(
            "/r",
            "",
            vec![
                DirectoryNode::dir(
                    "/r/b",
                    "b",
                    vec![
                        DirectoryNode::dir(
                            "/r/b/c",
                            "b/c",
                            vec![DirectoryNode::file("/r/b/c/x", "b/c/x", None)],
                        ),
                        DirectoryNode::file("/r/b/y", "b/y", None),
                    ],
                ),
                DirectoryNode::dir("/r/a", "a", Vec::new()),
                DirectoryNode::file("/r/z", "z", None),
            ],
        )
    }

    fn render(root: &DirectoryNode, format: OutputFormat, show_size: bool) -> String {
        let config = StructureConfig { format, show_size };
        StructureFormatter::new(&config)
            .format_structure(root)
            .expect("formatting a directory root succeeds")
    }

    fn body(output: &str) -> Vec<&str> {
        output.lines().skip(2).collect()
    }

    #[test]
    fn format_size_picks_first_unit_below_1024() {
        assert_eq!(format_size(0), "0.0 B");
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(1023), "1023.0 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_size(1024u64.pow(4)), "1.0 TB");
    }

    #[test]
    fn format_size_falls_back_to_petabytes() {
        assert_eq!(format_size(1024u64.pow(5)), "1.0 PB");
        assert_eq!(format_size(1024u64.pow(6)), "1024.0 PB");
    }

    #[test]
    fn header_lines_come_first() {
        let output = render(&sample_tree(), OutputFormat::Plain, false);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "# Project Structure: proj");
        assert_eq!(lines[1], "# Generated by structure_gen");
        assert!(!output.ends_with('\n'));
    }

    #[test]
    fn tree_sorts_files_before_directories_and_shows_sizes() {
        let output = render(&sample_tree(), OutputFormat::Tree, true);
        assert_eq!(
            body(&output),
            vec![
                "└── proj",
                "    ├── a.py (100.0 B)",
                "    └── sub",
                "        └── b.py (2.0 KB)",
            ]
        );
    }

    #[test]
    fn tree_keeps_open_branches_with_vertical_bar() {
        let output = render(&deep_tree(), OutputFormat::Tree, false);
        assert_eq!(
            body(&output),
            vec![
                "└── r",
                "    ├── z",
                "    ├── a",
                "    └── b",
                "        ├── y",
                "        └── c",
                "            └── x",
            ]
        );

        let nested = DirectoryNode::dir(
            "/r",
            "",
            vec![
                DirectoryNode::dir("/r/a", "a", vec![DirectoryNode::file("/r/a/f", "a/f", None)]),
                DirectoryNode::dir("/r/b", "b", Vec::new()),
            ],
        );
        let output = render(&nested, OutputFormat::Tree, false);
        assert_eq!(
            body(&output),
            vec!["└── r", "    ├── a", "    │   └── f", "    └── b"]
        );
    }

    #[test]
    fn tree_line_count_matches_node_count() {
        let tree = deep_tree();
        let output = render(&tree, OutputFormat::Tree, false);
        assert_eq!(body(&output).len(), tree.count_nodes());
    }

    #[test]
    fn plain_lists_only_files_by_relative_path() {
        let output = render(&sample_tree(), OutputFormat::Plain, true);
        assert_eq!(body(&output), vec!["a.py", "sub/b.py"]);

        let tree = deep_tree();
        let output = render(&tree, OutputFormat::Plain, false);
        assert_eq!(body(&output), vec!["b/c/x", "b/y", "z"]);
        assert_eq!(body(&output).len(), tree.count_files());
    }

    #[test]
    fn plain_empty_directory_has_no_body() {
        let empty = DirectoryNode::dir("/e", "", Vec::new());
        let output = render(&empty, OutputFormat::Plain, false);
        assert_eq!(output, "# Project Structure: e\n# Generated by structure_gen");
    }

    #[test]
    fn markdown_indents_two_spaces_per_level() {
        let output = render(&sample_tree(), OutputFormat::Markdown, false);
        assert_eq!(
            body(&output),
            vec!["- 📁 proj", "  - 📄 a.py", "  - 📁 sub", "    - 📄 b.py"]
        );
    }

    #[test]
    fn size_is_omitted_when_disabled_or_missing() {
        let output = render(&sample_tree(), OutputFormat::Markdown, false);
        assert!(!output.contains("B)"));

        let tree = DirectoryNode::dir("/p", "", vec![DirectoryNode::file("/p/n", "n", None)]);
        let output = render(&tree, OutputFormat::Tree, true);
        assert_eq!(body(&output), vec!["└── p", "    └── n"]);
    }

    #[test]
    fn output_is_independent_of_child_order() {
        let mut reversed = deep_tree();
        reversed.children.reverse();
        for format in [OutputFormat::Tree, OutputFormat::Plain, OutputFormat::Markdown] {
            assert_eq!(render(&deep_tree(), format, false), render(&reversed, format, false));
        }
    }

    #[test]
    fn repeated_calls_are_identical() {
        let tree = deep_tree();
        let config = StructureConfig { format: OutputFormat::Markdown, show_size: true };
        let formatter = StructureFormatter::new(&config);
        let first = formatter.format_structure(&tree).unwrap();
        let second = formatter.format_structure(&tree).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn file_root_is_rejected() {
        let config = StructureConfig::default();
        let file = DirectoryNode::file("/p/a.py", "a.py", Some(1));
        let err = StructureFormatter::new(&config).format_structure(&file).unwrap_err();
        assert!(matches!(err, FormatError::NotADirectory(p) if p == PathBuf::from("/p/a.py")));
    }

    #[test]
    fn unsupported_format_fails_before_rendering() {
        let err: FormatError = StructureConfig::parse("xml", false).unwrap_err().into();
        assert_eq!(err.to_string(), "Unsupported format: xml");
    }
}

use crate::app::cli::Cli;
use crate::app::models::{RuntimeConfig, StructureConfig};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;

const DEFAULT_FORMAT: &str = "tree";

#[derive(Deserialize, Debug)]
struct PresetsFile {
    #[serde(flatten)]
    presets: HashMap<String, PresetConfig>,
}

#[derive(Deserialize, Debug, Clone, Default)]
struct PresetConfig {
    format: Option<String>,
    show_size: Option<bool>,
    exclude: Option<Vec<String>>,
    include_hidden: Option<bool>,
    max_depth: Option<usize>,
}

fn load_presets_file() -> Result<HashMap<String, PresetConfig>> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let config_path = home
        .join(".config")
        .join("structure_gen")
        .join("presets.toml");

    if !config_path.exists() {
        return Ok(HashMap::new());
    }

    log::debug!("Loading presets from {}", config_path.display());
    let content = fs::read_to_string(&config_path)
        .context(format!("Failed to read config at {:?}", config_path))?;

    parse_presets(&content)
}

fn parse_presets(content: &str) -> Result<HashMap<String, PresetConfig>> {
    let parsed: PresetsFile = toml::from_str(content).context("Failed to parse presets.toml")?;
    Ok(parsed.presets)
}

fn merge_vecs(preset_vec: Option<Vec<String>>, cli_vec: Option<Vec<String>>) -> Vec<String> {
    let mut combined = preset_vec.unwrap_or_default();
    if let Some(mut cli_items) = cli_vec {
        combined.append(&mut cli_items);
    }
    // Deduplicate while keeping order
    let mut seen = std::collections::HashSet::new();
    combined.retain(|item| seen.insert(item.clone()));
    combined
}

pub fn resolve_config(cli: Cli) -> Result<RuntimeConfig> {
    let presets = load_presets_file()?;
    resolve_with_presets(cli, &presets)
}

fn resolve_with_presets(cli: Cli, presets: &HashMap<String, PresetConfig>) -> Result<RuntimeConfig> {
    let root = cli
        .path
        .canonicalize()
        .context(format!("Failed to resolve path {}", cli.path.display()))?;

    // Determine preset to use: CLI flag > directory name > None
    let project_name = root.file_name().and_then(|n| n.to_str());
    let preset_key = cli.preset.as_deref().or(project_name);
    if let Some(name) = cli.preset.as_deref() {
        if !presets.contains_key(name) {
            log::warn!("Preset '{}' not found, using defaults", name);
        }
    }
    let preset = preset_key
        .and_then(|k| presets.get(k))
        .cloned()
        .unwrap_or_default();

    let format = cli
        .format
        .or(preset.format)
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    let structure = StructureConfig::parse(&format, cli.show_size || preset.show_size.unwrap_or(false))
        .context("Invalid configuration")?;

    Ok(RuntimeConfig {
        root,
        structure,
        exclude: merge_vecs(preset.exclude, cli.exclude),
        include_hidden: cli.hidden || preset.include_hidden.unwrap_or(false),
        max_depth: cli.max_depth.or(preset.max_depth),
        output: cli.output,
    })
}

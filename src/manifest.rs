use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::diagnostics::CompileError;

pub const MANIFEST_FILE: &str = "jmm.toml";

/// Build settings for one source file. Every field has a default, so a missing manifest
/// and an empty one behave the same.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub package_name: Option<String>,
    pub output_dir: PathBuf,
    pub emit_ir: bool,
    pub emit_asm: bool,
    pub deny_diagnostics: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            package_name: None,
            output_dir: PathBuf::from("."),
            emit_ir: true,
            emit_asm: true,
            deny_diagnostics: true,
        }
    }
}

// ---- TOML deserialization types ----

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlManifest {
    package: Option<TomlPackage>,
    build: Option<TomlBuild>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPackage {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct TomlBuild {
    output_dir: Option<String>,
    emit_ir: Option<bool>,
    emit_asm: Option<bool>,
    deny_diagnostics: Option<bool>,
}

/// Parse manifest text. `manifest_path` is used for error reporting and to resolve a
/// relative `output-dir` against the manifest's directory.
pub fn parse_manifest(text: &str, manifest_path: &Path) -> Result<BuildConfig, CompileError> {
    let parsed: TomlManifest = toml::from_str(text)
        .map_err(|e| CompileError::manifest(e.to_string(), manifest_path.to_path_buf()))?;

    let mut config = BuildConfig::default();
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    config.output_dir = base_dir.to_path_buf();

    if let Some(package) = parsed.package {
        if let Some(name) = package.name {
            if name.trim().is_empty() {
                return Err(CompileError::manifest(
                    "[package] name must not be empty",
                    manifest_path.to_path_buf(),
                ));
            }
            config.package_name = Some(name);
        }
    }

    if let Some(build) = parsed.build {
        if let Some(dir) = build.output_dir {
            config.output_dir = base_dir.join(dir);
        }
        if let Some(v) = build.emit_ir {
            config.emit_ir = v;
        }
        if let Some(v) = build.emit_asm {
            config.emit_asm = v;
        }
        if let Some(v) = build.deny_diagnostics {
            config.deny_diagnostics = v;
        }
    }

    Ok(config)
}

/// Look for `jmm.toml` in the directory containing `source_path`. No manifest yields the
/// default configuration with outputs next to the source.
pub fn find_config(source_path: &Path) -> Result<BuildConfig, CompileError> {
    let dir = source_path.parent().unwrap_or_else(|| Path::new("."));
    let candidate = dir.join(MANIFEST_FILE);
    if candidate.is_file() {
        return load_manifest(&candidate);
    }
    tracing::debug!(dir = %dir.display(), "no manifest found, using defaults");
    Ok(BuildConfig { output_dir: dir.to_path_buf(), ..BuildConfig::default() })
}

pub fn load_manifest(path: &Path) -> Result<BuildConfig, CompileError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CompileError::manifest(format!("cannot read manifest: {e}"), path.to_path_buf()))?;
    let config = parse_manifest(&text, path)?;
    tracing::debug!(manifest = %path.display(), ?config, "loaded manifest");
    Ok(config)
}

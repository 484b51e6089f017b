//! Bump command to increment the workspace version

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::style;
use semver::{BuildMetadata, Prerelease, Version};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};
use tracing::debug;

#[derive(Args, Debug)]
pub struct BumpArgs {
    /// Version component to increment
    #[arg(value_enum)]
    pub kind: BumpKind,

    /// Path to the manifest to update
    #[arg(long, default_value = "Cargo.toml")]
    pub manifest_path: PathBuf,

    /// Print the new version without writing the manifest
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Patch,
    Minor,
    Major,
}

#[derive(Debug, thiserror::Error)]
pub enum BumpError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest: {0}")]
    Manifest(#[from] toml_edit::TomlError),

    #[error("no version string in [workspace.package] or [package]")]
    MissingVersion,

    #[error("invalid version `{version}`: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },
}

/// Result of rewriting a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestBump {
    pub from: Version,
    pub to: Version,
    /// Updated manifest text, formatting and comments preserved
    pub manifest: String,
}

/// Next version for `kind`.
///
/// A pre-release is first released as-is: `1.2.3-rc.1` bumps to `1.2.3` for
/// patch, and likewise for minor/major when the lower components are
/// already zero. Build metadata is dropped.
pub fn increment(version: &Version, kind: BumpKind) -> Version {
    let prerelease = !version.pre.is_empty();
    let mut next = Version {
        pre: Prerelease::EMPTY,
        build: BuildMetadata::EMPTY,
        ..version.clone()
    };

    match kind {
        BumpKind::Patch => {
            if !prerelease {
                next.patch += 1;
            }
        }
        BumpKind::Minor => {
            if !(prerelease && version.patch == 0) {
                next.minor += 1;
                next.patch = 0;
            }
        }
        BumpKind::Major => {
            if !(prerelease && version.minor == 0 && version.patch == 0) {
                next.major += 1;
                next.minor = 0;
                next.patch = 0;
            }
        }
    }

    next
}

/// `[workspace.package].version`, else `[package].version`.
fn version_item(doc: &mut DocumentMut) -> Option<&mut Item> {
    let in_workspace = doc
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .is_some_and(|v| v.is_str());

    if in_workspace {
        doc.get_mut("workspace")?
            .get_mut("package")?
            .get_mut("version")
    } else {
        doc.get_mut("package")?.get_mut("version")
    }
}

/// Bump the version inside manifest text.
pub fn bump_manifest(contents: &str, kind: BumpKind) -> Result<ManifestBump, BumpError> {
    let mut doc: DocumentMut = contents.parse()?;
    let item = version_item(&mut doc).ok_or(BumpError::MissingVersion)?;
    let current = item.as_str().ok_or(BumpError::MissingVersion)?.to_string();

    let from = Version::parse(&current).map_err(|source| BumpError::InvalidVersion {
        version: current.clone(),
        source,
    })?;
    let to = increment(&from, kind);

    // keep the whitespace and trailing comment around the old value
    let decor = item.as_value().map(|v| v.decor().clone());
    *item = toml_edit::value(to.to_string());
    if let (Some(decor), Some(value)) = (decor, item.as_value_mut()) {
        *value.decor_mut() = decor;
    }

    Ok(ManifestBump {
        from,
        to,
        manifest: doc.to_string(),
    })
}

fn bump_file(path: &Path, kind: BumpKind, dry_run: bool) -> Result<ManifestBump, BumpError> {
    let contents = fs::read_to_string(path).map_err(|source| BumpError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let bumped = bump_manifest(&contents, kind)?;
    debug!(path = %path.display(), from = %bumped.from, to = %bumped.to, dry_run, "version bumped");

    if !dry_run {
        fs::write(path, &bumped.manifest).map_err(|source| BumpError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    Ok(bumped)
}

pub fn bump(args: BumpArgs) -> Result<()> {
    let bumped = bump_file(&args.manifest_path, args.kind, args.dry_run)?;

    println!(
        "Version updated from {} to {}",
        style(&bumped.from).dim(),
        style(&bumped.to).green().bold()
    );
    if args.dry_run {
        println!("{}", style("Dry run, manifest left unchanged").yellow());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKSPACE: &str = r#"[workspace]
members = ["crates/doz"]

[workspace.package]
version = "0.1.10" # released
edition = "2021"
"#;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    #[test]
    fn increments_components() {
        assert_eq!(increment(&v("0.1.10"), BumpKind::Patch), v("0.1.11"));
        assert_eq!(increment(&v("0.1.10"), BumpKind::Minor), v("0.2.0"));
        assert_eq!(increment(&v("0.1.10"), BumpKind::Major), v("1.0.0"));
    }

    #[test]
    fn prereleases_are_released_first() {
        assert_eq!(increment(&v("1.2.3-rc.1"), BumpKind::Patch), v("1.2.3"));
        assert_eq!(increment(&v("1.3.0-beta"), BumpKind::Minor), v("1.3.0"));
        assert_eq!(increment(&v("1.2.3-beta"), BumpKind::Minor), v("1.3.0"));
        assert_eq!(increment(&v("2.0.0-alpha"), BumpKind::Major), v("2.0.0"));
        assert_eq!(increment(&v("2.1.0-alpha"), BumpKind::Major), v("3.0.0"));
        assert_eq!(increment(&v("1.0.0+build.5"), BumpKind::Patch), v("1.0.1"));
    }

    #[test]
    fn rewrites_workspace_version_in_place() {
        let bumped = bump_manifest(WORKSPACE, BumpKind::Minor).unwrap();
        assert_eq!(bumped.from, v("0.1.10"));
        assert_eq!(bumped.to, v("0.2.0"));
        assert_eq!(
            bumped.manifest,
            WORKSPACE.replace(r#""0.1.10""#, r#""0.2.0""#)
        );
    }

    #[test]
    fn falls_back_to_package_version() {
        let manifest = "[package]\nname = \"demo\"\nversion = \"1.4.2\"\n";
        let bumped = bump_manifest(manifest, BumpKind::Patch).unwrap();
        assert_eq!(bumped.to, v("1.4.3"));
        assert!(bumped.manifest.contains("version = \"1.4.3\""));
    }

    #[test]
    fn inherited_version_is_missing() {
        let manifest = "[package]\nname = \"demo\"\nversion.workspace = true\n";
        assert!(matches!(
            bump_manifest(manifest, BumpKind::Patch),
            Err(BumpError::MissingVersion)
        ));
        assert!(matches!(
            bump_manifest("[dependencies]\n", BumpKind::Patch),
            Err(BumpError::MissingVersion)
        ));
    }

    #[test]
    fn invalid_inputs() {
        let err = bump_manifest("[package]\nversion = \"one\"\n", BumpKind::Patch).unwrap_err();
        assert!(matches!(err, BumpError::InvalidVersion { ref version, .. } if version == "one"));
        assert!(matches!(
            bump_manifest("[package", BumpKind::Patch),
            Err(BumpError::Manifest(_))
        ));
    }

    #[test]
    fn writes_manifest_unless_dry_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        fs::write(&path, WORKSPACE).unwrap();

        let bumped = bump_file(&path, BumpKind::Patch, true).unwrap();
        assert_eq!(bumped.to, v("0.1.11"));
        assert_eq!(fs::read_to_string(&path).unwrap(), WORKSPACE);

        bump_file(&path, BumpKind::Patch, false).unwrap();
        assert!(fs::read_to_string(&path)
            .unwrap()
            .contains(r#"version = "0.1.11" # released"#));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = bump_file(&dir.path().join("Cargo.toml"), BumpKind::Patch, false).unwrap_err();
        assert!(matches!(err, BumpError::Read { .. }));
        assert!(err.to_string().starts_with("failed to read"));
    }
}

//! `packtag clean`: delete rendered bundle files.
//!
//! A target containing `#` names one file per content hash, so every file
//! in the target's directory whose name matches the pattern with `#`
//! standing for a digest is removed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use packtag::bundle::{DEFAULT_GROUP, group_target};
use packtag::config::{BundleSection, PacktagConfig};
use packtag::freshness::DIGEST_HEX_LEN;
use packtag::resolve::PathMapper;
use packtag::utils::path::split_query;
use packtag::{debug, log};

pub fn run(config: &PacktagConfig, dry: bool) -> Result<()> {
    let paths = PathMapper::new(config.web_root(), config.engine.app_path.clone());

    let mut removed = 0;
    for section in &config.bundle {
        for file in artifacts(&paths, &section.target, &group_names(section))? {
            if dry {
                log!("clean"; "would remove {}", file.display());
                continue;
            }
            fs::remove_file(&file).with_context(|| format!("failed to remove {}", file.display()))?;
            debug!("clean"; "removed {}", file.display());
            removed += 1;
        }
    }

    if !dry {
        log!("clean"; "removed {} file{}", removed, if removed == 1 { "" } else { "s" });
    }
    Ok(())
}

/// Groups that may render to a suffixed target.
fn group_names(section: &BundleSection) -> Vec<String> {
    section
        .groups()
        .into_iter()
        .map(|group| group.name)
        .filter(|name| name != DEFAULT_GROUP)
        .collect()
}

/// Existing files rendered for `target` and its group variants.
fn artifacts(paths: &PathMapper, target: &str, groups: &[String]) -> Result<Vec<PathBuf>> {
    let mut targets = vec![target.to_string()];
    targets.extend(groups.iter().map(|group| group_target(target, group)));

    let mut files = Vec::new();
    for target in &targets {
        let (path, _) = split_query(target);
        let output = paths.to_fs(path);
        if path.contains('#') {
            files.extend(hashed_outputs(&output)?);
        } else if output.is_file() {
            files.push(output);
        }
    }
    Ok(files)
}

/// Files next to `pattern` whose name is the pattern with `#` replaced by a digest.
fn hashed_outputs(pattern: &Path) -> Result<Vec<PathBuf>> {
    let (Some(dir), Some(name)) = (pattern.parent(), pattern.file_name()) else {
        return Ok(Vec::new());
    };
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let name = name.to_string_lossy();
    let digest = format!("[0-9A-F]{{{DIGEST_HEX_LEN}}}");
    let pattern = name
        .split('#')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(digest.as_str());
    let re = Regex::new(&format!("^{pattern}$"))?;

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
        .filter(|entry| re.is_match(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DIGEST: &str = "0123456789ABCDEF0123456789ABCDEF";

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn test_hashed_outputs_match_digest_only() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, &format!("js/site_{DIGEST}.js"));
        touch(root, "js/site_latest.js");
        touch(root, &format!("js/site_{}.js", DIGEST.to_lowercase()));
        touch(root, &format!("js/site_{DIGEST}.js.map"));

        let paths = PathMapper::new(root, "/");
        let files = artifacts(&paths, "~/js/site_#.js", &[]).unwrap();
        assert_eq!(files, vec![root.join(format!("js/site_{DIGEST}.js"))]);
    }

    #[test]
    fn test_plain_target_and_groups() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "js/site.js");
        touch(root, "js/site-head.js");

        let paths = PathMapper::new(root, "/");
        let groups = vec!["head".to_string(), "footer".to_string()];
        let files = artifacts(&paths, "~/js/site.js?v=2", &groups).unwrap();
        assert_eq!(files, vec![root.join("js/site.js"), root.join("js/site-head.js")]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let paths = PathMapper::new(dir.path(), "/");
        assert!(artifacts(&paths, "~/out/site_#.js", &[]).unwrap().is_empty());
    }
}

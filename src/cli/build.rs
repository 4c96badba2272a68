//! `packtag build`: render every configured bundle.
//!
//! Bundles are rendered with `as_named`, so each one can be looked up (and
//! re-rendered on change) under its configured name afterwards.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use packtag::asset::BundleKind;
use packtag::config::PacktagConfig;
use packtag::{Engine, RenderMode, log};

use super::BuildArgs;

/// Outcome of one configured bundle.
#[derive(Debug, Serialize)]
pub struct Rendered {
    pub name: String,
    pub kind: BundleKind,
    pub mode: RenderMode,
    pub tag: String,
    pub dependent_files: Vec<PathBuf>,
}

/// Engine for `config`, with the command line's mode override applied.
pub fn engine(config: &PacktagConfig, args: &BuildArgs, watch: bool) -> Result<Engine> {
    let (builder, _) = config
        .engine_builder(args.debug_override())
        .context("failed to register embedded resources")?;
    builder
        .watch(watch || config.cache.watch)
        .build()
        .context("failed to create engine")
}

/// Render every bundle in configuration order, stopping at the first failure.
pub fn build_bundles(config: &PacktagConfig, engine: &Engine) -> Result<Vec<Rendered>> {
    config
        .bundle
        .iter()
        .map(|section| {
            let mut bundle = section.build(engine);
            let tag = bundle
                .as_named(&section.name, &section.target)
                .with_context(|| format!("failed to render bundle `{}`", section.name))?;
            Ok(Rendered {
                name: section.name.clone(),
                kind: section.kind,
                mode: bundle.mode(),
                tag,
                dependent_files: bundle.dependent_files().to_vec(),
            })
        })
        .collect()
}

/// Print rendered bundles, as JSON or as logged tags.
pub fn report(rendered: &[Rendered], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rendered)?);
        return Ok(());
    }
    for bundle in rendered {
        log!("build"; "{} ({}, {} file{})",
            bundle.name,
            bundle.mode.as_str(),
            bundle.dependent_files.len(),
            if bundle.dependent_files.len() == 1 { "" } else { "s" });
        println!("{}", bundle.tag.trim_end());
    }
    Ok(())
}

pub fn run(config: &PacktagConfig, args: &BuildArgs) -> Result<()> {
    let engine = engine(config, args, false)?;
    let rendered = build_bundles(config, &engine)?;
    report(&rendered, args.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(config: &str) -> (TempDir, PacktagConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::write(root.join("js/a.js"), "function a(){}").unwrap();
        fs::write(root.join("js/b.js"), "function b(){}").unwrap();
        let path = root.join("packtag.toml");
        fs::write(&path, config).unwrap();
        let config = PacktagConfig::from_path(&path).unwrap();
        (dir, config)
    }

    #[test]
    fn test_build_renders_each_bundle() {
        let (dir, config) = project(
            r#"
            [[bundle]]
            name = "site"
            kind = "js"
            target = "~/js/site.js"
            assets = ["~/js/a.js", "~/js/b.js"]
            minifier = "null"
            "#,
        );
        let engine = engine(&config, &BuildArgs::default(), false).unwrap();
        let rendered = build_bundles(&config, &engine).unwrap();

        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].mode, RenderMode::Release);
        assert_eq!(rendered[0].dependent_files.len(), 2);
        assert!(rendered[0].tag.contains("/js/site.js?r="));
        assert!(dir.path().join("js/site.js").is_file());
        assert_eq!(
            engine.javascript().render_named("site").unwrap(),
            rendered[0].tag
        );
    }

    #[test]
    fn test_debug_override() {
        let (_dir, config) = project(
            r#"
            [[bundle]]
            name = "site"
            kind = "js"
            target = "~/js/site.js"
            assets = ["~/js/a.js", "~/js/b.js"]
            "#,
        );
        let args = BuildArgs {
            debug: true,
            ..BuildArgs::default()
        };
        let engine = engine(&config, &args, false).unwrap();
        let rendered = build_bundles(&config, &engine).unwrap();
        assert_eq!(rendered[0].mode, RenderMode::Debug);
        assert_eq!(rendered[0].tag.matches("<script").count(), 2);
    }

    #[test]
    fn test_failure_names_the_bundle() {
        let (_dir, config) = project(
            r#"
            [[bundle]]
            name = "broken"
            kind = "js"
            target = "~/js/site.js"
            assets = ["~/js/missing.js"]
            "#,
        );
        let engine = engine(&config, &BuildArgs::default(), false).unwrap();
        let err = build_bundles(&config, &engine).unwrap_err();
        assert!(err.to_string().contains("`broken`"));
    }
}

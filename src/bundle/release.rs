//! Release rendering: one minified, content-hashed output per group.

use std::path::PathBuf;

use crate::asset::{AssetKind, Minifier};
use crate::cache::{RenderContext, RenderResult, RendererKind};
use crate::error::{BundleError, Result};
use crate::freshness::FileStamp;
use crate::render::{CacheRenderer, FileRenderer, Renderer, TagTemplate, render_attributes};
use crate::utils::path::split_query;

use super::{Bundle, RenderMode};

/// Placeholder replaced by the content hash.
const HASH_PLACEHOLDER: char = '#';

impl Bundle {
    /// Render every non-empty group.
    ///
    /// A group's tag is its remote tags followed by the tag of its bundled
    /// file. The first group with local content renders to the target
    /// itself; later groups add `-{group}` before the extension.
    pub(super) fn render_release(&self, context: &RenderContext) -> Result<RenderResult> {
        let template = TagTemplate::new(self.def.kind);
        let minifier = self
            .def
            .minifier
            .clone()
            .unwrap_or_else(|| self.engine.default_minifier(self.def.kind));

        let mut tag = String::new();
        let mut dependent_files = Vec::new();
        let mut stamps = Vec::new();
        let mut outputs = 0;

        for (name, group) in &self.def.groups {
            if group.is_empty() {
                continue;
            }
            let attributes = render_attributes(group.attributes());

            let mut files = Vec::new();
            for asset in group.assets() {
                match (asset.kind(), asset.remote_path.as_deref()) {
                    (AssetKind::Remote, Some(url)) => tag.push_str(&template.fill(&attributes, url)),
                    (AssetKind::Embedded, Some(locator)) => {
                        files.push(self.engine.resolvers().resolve_embedded(locator)?);
                    }
                    _ => files.extend(
                        self.engine
                            .resolvers()
                            .resolve_local(&asset.local_path, self.def.kind.extension())?
                            .into_iter()
                            .map(|file| file.path),
                    ),
                }
            }
            if files.is_empty() {
                continue;
            }

            stamps.extend(files.iter().map(|file| FileStamp::capture(file)));
            let suffix = (outputs > 0).then_some(name.as_str());
            outputs += 1;
            let url = self.render_group(&files, context, suffix, minifier.as_ref())?;
            tag.push_str(&template.fill(&attributes, &url));
            dependent_files.extend(files);
        }

        Ok(RenderResult {
            tag,
            dependent_files,
            stamps,
            mode: RenderMode::Release,
        })
    }

    /// Produce the payload of one group and return the URL to reference.
    fn render_group(
        &self,
        files: &[PathBuf],
        context: &RenderContext,
        suffix: Option<&str>,
        minifier: &dyn Minifier,
    ) -> Result<String> {
        let paths = self.engine.paths();
        let hasher = self.engine.hasher();
        let target = match suffix {
            Some(group) => group_target(&context.target, group),
            None => context.target.clone(),
        };
        let (path, query) = split_query(&target);

        if path.contains(HASH_PLACEHOLDER) {
            let content = self.minify(files, minifier)?;
            let hash = hasher.hash(content.as_bytes());
            let output = path.replace(HASH_PLACEHOLDER, &hash);
            self.renderer(context, &output, suffix).render(&content)?;
            return Ok(paths.to_url(&output));
        }

        let renderer = self.renderer(context, path, suffix);
        let existing = if self.def.render_only_if_missing {
            renderer.existing()?
        } else {
            None
        };
        let content = match existing {
            Some(content) => {
                crate::debug!("render"; "reusing existing output for {}", path);
                content
            }
            None => {
                let content = self.minify(files, minifier)?;
                renderer.render(&content)?;
                content
            }
        };

        let hash = hasher.hash(content.as_bytes());
        let mut url = format!("{}?{}={}", paths.to_url(path), self.def.hash_key_name, hash);
        if let Some(query) = query {
            url.push('&');
            url.push_str(query);
        }
        Ok(url)
    }

    /// Concatenate `files` (each followed by a newline), preprocess, minify.
    fn minify(&self, files: &[PathBuf], minifier: &dyn Minifier) -> Result<String> {
        let retry = self.engine.retry();
        let mut raw = String::new();
        for file in files {
            raw.push_str(&retry.read_to_string(file)?);
            raw.push('\n');
        }
        if let Some(preprocessor) = &self.def.preprocessor {
            raw = preprocessor.before_minify(raw);
        }
        minifier
            .minify(&raw)
            .map_err(|source| BundleError::Minify {
                minifier: minifier.name().to_string(),
                source,
            })
    }

    fn renderer(&self, context: &RenderContext, output: &str, suffix: Option<&str>) -> Box<dyn Renderer> {
        match &context.renderer {
            RendererKind::File => Box::new(FileRenderer::new(
                self.engine.paths().to_fs(output),
                self.engine.retry(),
            )),
            RendererKind::Cached { name } => {
                let key = match suffix {
                    Some(group) => format!("{}{}-{}", self.def.kind.cache_prefix(), name, group),
                    None => format!("{}{}", self.def.kind.cache_prefix(), name),
                };
                Box::new(CacheRenderer::new(self.engine.content().clone(), key))
            }
        }
    }
}

/// `target` with `-{group}` inserted before the file extension.
pub fn group_target(target: &str, group: &str) -> String {
    let (path, query) = split_query(target);
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    let mut grouped = match path[file_start..].rfind('.') {
        Some(dot) => {
            let dot = file_start + dot;
            format!("{}-{}{}", &path[..dot], group, &path[dot..])
        }
        None => format!("{path}-{group}"),
    };
    if let Some(query) = query {
        grouped.push('?');
        grouped.push_str(query);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_target() {
        assert_eq!(group_target("~/js/site.js", "head"), "~/js/site-head.js");
        assert_eq!(group_target("out/bundle#.js?v=2", "head"), "out/bundle#-head.js?v=2");
        assert_eq!(group_target("out.d/bundle", "head"), "out.d/bundle-head");
    }
}

//! Debug rendering: one tag per source file.

use crate::asset::AssetKind;
use crate::cache::RenderResult;
use crate::error::{BundleError, Result};
use crate::freshness::FileStamp;
use crate::render::{FileRenderer, Renderer, TagTemplate, render_attributes};

use super::{Bundle, RenderMode};

impl Bundle {
    /// Emit a tag per file, in group and insertion order.
    ///
    /// Remote assets point at their local fallback. Embedded resources are
    /// copied to their local path first. Nothing is minified or hashed.
    pub(super) fn render_debug(&self) -> Result<RenderResult> {
        let resolvers = self.engine.resolvers();
        let retry = self.engine.retry();
        let template = TagTemplate::new(self.def.kind);
        let extension = self.def.kind.extension();

        let mut tag = String::new();
        let mut dependent_files = Vec::new();
        let mut stamps = Vec::new();

        for group in self.def.groups.values() {
            let attributes = render_attributes(group.attributes());
            for asset in group.assets() {
                if asset.kind() == AssetKind::Embedded {
                    let locator = asset.remote_path.as_deref().ok_or_else(|| {
                        BundleError::resolve(&asset.local_path, "embedded resource without locator")
                    })?;
                    let extracted = resolvers.resolve_embedded(locator)?;
                    stamps.push(FileStamp::capture(&extracted));
                    let content = retry.read_to_string(&extracted)?;
                    FileRenderer::new(resolvers.paths.to_fs(&asset.local_path), retry)
                        .render(&content)?;

                    dependent_files.push(extracted);
                    tag.push_str(&template.fill(&attributes, &resolvers.paths.to_url(&asset.local_path)));
                    tag.push('\n');
                    continue;
                }

                for file in resolvers.resolve_local(&asset.local_path, extension)? {
                    tag.push_str(&template.fill(&attributes, &file.url));
                    tag.push('\n');
                    stamps.push(FileStamp::capture(&file.path));
                    dependent_files.push(file.path);
                }
            }
        }

        Ok(RenderResult {
            tag,
            dependent_files,
            stamps,
            mode: RenderMode::Debug,
        })
    }
}

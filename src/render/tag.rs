//! HTML tags for bundles.

use indexmap::IndexMap;

use crate::asset::BundleKind;

/// Markup template for one bundle kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTemplate {
    kind: BundleKind,
}

impl TagTemplate {
    pub const fn new(kind: BundleKind) -> Self {
        Self { kind }
    }

    /// Fill the template with pre-rendered `attributes` and a URL.
    pub fn fill(&self, attributes: &str, path: &str) -> String {
        match self.kind {
            BundleKind::JavaScript => {
                format!(r#"<script type="text/javascript" {attributes}src="{path}"></script>"#)
            }
            BundleKind::Stylesheet => {
                format!(r#"<link rel="stylesheet" type="text/css" {attributes}href="{path}" />"#)
            }
        }
    }

    pub fn render(&self, attributes: &IndexMap<String, String>, path: &str) -> String {
        self.fill(&render_attributes(attributes), path)
    }
}

/// `name="value" ` for every attribute, in insertion order.
pub fn render_attributes(attributes: &IndexMap<String, String>) -> String {
    attributes
        .iter()
        .map(|(name, value)| format!(r#"{name}="{value}" "#))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_tag() {
        let template = TagTemplate::new(BundleKind::JavaScript);
        assert_eq!(
            template.render(&IndexMap::new(), "/js/site.js?r=AB"),
            r#"<script type="text/javascript" src="/js/site.js?r=AB"></script>"#
        );
    }

    #[test]
    fn test_attributes_keep_order() {
        let mut attributes = IndexMap::new();
        attributes.insert("defer".to_string(), "defer".to_string());
        attributes.insert("charset".to_string(), "utf-8".to_string());

        let template = TagTemplate::new(BundleKind::JavaScript);
        assert_eq!(
            template.render(&attributes, "a.js"),
            r#"<script type="text/javascript" defer="defer" charset="utf-8" src="a.js"></script>"#
        );
    }

    #[test]
    fn test_stylesheet_tag() {
        let mut attributes = IndexMap::new();
        attributes.insert("media".to_string(), "screen".to_string());

        let template = TagTemplate::new(BundleKind::Stylesheet);
        assert_eq!(
            template.render(&attributes, "/css/site.css"),
            r#"<link rel="stylesheet" type="text/css" media="screen" href="/css/site.css" />"#
        );
    }
}

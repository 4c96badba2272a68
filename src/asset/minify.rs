//! Asset minification for JS and CSS bundles.
//!
//! Uses oxc for JavaScript and lightningcss for CSS. [`NullMinifier`]
//! passes content through untouched.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use crate::error::MinifyError;

/// Compresses the concatenated content of a bundle.
///
/// Implementations must be deterministic: equal input, equal output.
pub trait Minifier: Send + Sync {
    /// Stable name, part of the cache key.
    fn name(&self) -> &'static str;

    fn minify(&self, source: &str) -> Result<String, MinifyError>;
}

/// Pass-through minifier for debugging and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMinifier;

impl Minifier for NullMinifier {
    fn name(&self) -> &'static str {
        "null"
    }

    fn minify(&self, source: &str) -> Result<String, MinifyError> {
        Ok(source.to_string())
    }
}

/// JavaScript minifier (oxc: compress + mangle).
#[derive(Debug, Default, Clone, Copy)]
pub struct JsMinifier;

impl Minifier for JsMinifier {
    fn name(&self) -> &'static str {
        "oxc"
    }

    fn minify(&self, source: &str) -> Result<String, MinifyError> {
        minify_js(source)
    }
}

/// CSS minifier (lightningcss).
#[derive(Debug, Default, Clone, Copy)]
pub struct CssMinifier;

impl Minifier for CssMinifier {
    fn name(&self) -> &'static str {
        "lightningcss"
    }

    fn minify(&self, source: &str) -> Result<String, MinifyError> {
        minify_css(source)
    }
}

/// Minify JavaScript source code.
///
/// Scripts are parsed as classic scripts, the way a `<script>` tag
/// without `type="module"` loads them.
pub fn minify_js(source: &str) -> Result<String, MinifyError> {
    let allocator = Allocator::default();
    let source_type = SourceType::cjs();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(MinifyError::new(format!("parse errors: {:?}", ret.errors)));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = OxcMinifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify CSS source code.
pub fn minify_css(source: &str) -> Result<String, MinifyError> {
    let stylesheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| MinifyError::new(e.to_string()))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| MinifyError::new(e.to_string()))?;
    Ok(result.code)
}

//! TypeScript stripping for loader sources.
//!
//! QuickJS runs plain JavaScript only, so `.ts`/`.mts`/`.cts` modules go
//! through the oxc transformer first. JavaScript sources are parsed for
//! diagnostics and otherwise run exactly as written.

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::SourceType;
use oxc_transformer::{TransformOptions, Transformer};
use std::path::Path;

use crate::error::{DataError, Result};

pub(crate) fn transpile(path: &Path, source: &str) -> Result<String> {
    // CommonJS bodies run inside the `require` wrapper; everything else is an ES module.
    let commonjs = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cjs") || ext.eq_ignore_ascii_case("cts"));
    let source_type = SourceType::from_path(path)
        .unwrap_or_else(|_| SourceType::mjs())
        .with_module(!commonjs);

    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, source_type).parse();
    if !parsed.errors.is_empty() {
        return Err(DataError::compilation(path, join_errors(&parsed.errors)));
    }

    if !source_type.is_typescript() {
        return Ok(source.to_string());
    }

    let mut program = parsed.program;
    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let options = TransformOptions::default();
    let transformed =
        Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(DataError::compilation(path, join_errors(&transformed.errors)));
    }

    Ok(Codegen::new().build(&program).code)
}

fn join_errors<E: ToString>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

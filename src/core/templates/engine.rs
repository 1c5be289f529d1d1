//! Tera-backed template engine with a shared compile cache.
//!
//! Compiled templates live in an immutable snapshot (`Arc<Tera>` plus the
//! content fingerprint of every compiled name). Renders clone the `Arc` under
//! a short read lock; compiles build a new snapshot and swap it in under the
//! write lock, so readers never observe a half-updated set.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tera::{Context, Tera, Value};
use tracing::debug;

use crate::core::utils;
use crate::generation::{GenerationError, content_hash, error_chain};

/// Format used by the `current_date` constant and function default
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
struct CompiledSet {
    tera: Arc<Tera>,
    fingerprints: Arc<HashMap<String, String>>,
}

impl CompiledSet {
    fn empty() -> Self {
        Self {
            tera: Arc::new(base_tera()),
            fingerprints: Arc::new(HashMap::new()),
        }
    }
}

/// Compiles, caches and renders named templates
pub struct TemplateEngine {
    compiled: RwLock<CompiledSet>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("cached", &self.cache_count())
            .finish()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            compiled: RwLock::new(CompiledSet::empty()),
        }
    }

    /// Compile `source` under `name`.
    ///
    /// A name whose cached fingerprint matches `source` is not reparsed; a
    /// changed source replaces the cached template. A failed compile leaves
    /// the cache untouched.
    pub fn compile(&self, name: &str, source: &str) -> Result<(), GenerationError> {
        let fingerprint = content_hash(source.as_bytes());

        if self.is_cached(name, &fingerprint) {
            debug!(template = %name, "Template cache hit");
            return Ok(());
        }

        let mut compiled = self.compiled.write();
        // Another caller may have compiled the same source while we waited.
        if compiled.fingerprints.get(name) == Some(&fingerprint) {
            return Ok(());
        }

        let mut tera = Tera::clone(&compiled.tera);
        tera.add_raw_template(name, source)
            .map_err(|e| GenerationError::TemplateCompile {
                name: name.to_string(),
                diagnostics: error_chain(&e),
            })?;

        let mut fingerprints = HashMap::clone(&compiled.fingerprints);
        fingerprints.insert(name.to_string(), fingerprint);

        *compiled = CompiledSet {
            tera: Arc::new(tera),
            fingerprints: Arc::new(fingerprints),
        };
        debug!(template = %name, cached = compiled.fingerprints.len(), "Template compiled");
        Ok(())
    }

    /// Render a compiled template against `model`.
    ///
    /// The model must serialize to a map. The constants `current_date`,
    /// `current_year` and `generated_at` are added unless the model already
    /// defines them.
    pub fn render<M: Serialize>(&self, name: &str, model: &M) -> Result<String, GenerationError> {
        let tera = Arc::clone(&self.compiled.read().tera);

        let render_error = |e: tera::Error| GenerationError::Render {
            name: name.to_string(),
            message: error_chain(&e).join(": "),
        };

        let mut context = Context::from_serialize(model).map_err(render_error)?;
        insert_date_constants(&mut context);

        tera.render(name, &context).map_err(render_error)
    }

    /// Read a template file, compile it under `name` and render it
    pub async fn render_from_file<M: Serialize>(
        &self,
        name: &str,
        path: &Path,
        model: &M,
    ) -> Result<String, GenerationError> {
        let source = match tokio::fs::read_to_string(path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GenerationError::TemplateNotFound {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        self.compile(name, &source)?;
        self.render(name, model)
    }

    /// Drop every compiled template
    pub fn clear_cache(&self) {
        *self.compiled.write() = CompiledSet::empty();
        debug!("Template cache cleared");
    }

    pub fn cache_count(&self) -> usize {
        self.compiled.read().fingerprints.len()
    }

    pub fn is_compiled(&self, name: &str) -> bool {
        self.compiled.read().fingerprints.contains_key(name)
    }

    fn is_cached(&self, name: &str, fingerprint: &str) -> bool {
        self.compiled
            .read()
            .fingerprints
            .get(name)
            .is_some_and(|cached| cached == fingerprint)
    }
}

fn insert_date_constants(context: &mut Context) {
    let now = Utc::now();
    if !context.contains_key("current_date") {
        context.insert("current_date", &now.format(DATE_FORMAT).to_string());
    }
    if !context.contains_key("current_year") {
        context.insert("current_year", &now.year());
    }
    if !context.contains_key("generated_at") {
        context.insert("generated_at", &now.to_rfc3339());
    }
}

/// A Tera instance with the helper filters and functions registered
fn base_tera() -> Tera {
    let mut tera = Tera::default();
    tera.register_filter("pascal_case", string_filter("pascal_case", utils::to_pascal_case));
    tera.register_filter("camel_case", string_filter("camel_case", utils::to_camel_case));
    tera.register_filter("snake_case", string_filter("snake_case", utils::to_snake_case));
    // Replaces Tera's builtin `pluralize`, which only picks a suffix by count.
    tera.register_filter("pluralize", string_filter("pluralize", utils::pluralize));
    tera.register_filter("singularize", string_filter("singularize", utils::singularize));
    tera.register_function("current_date", current_date);
    tera
}

fn string_filter(
    filter: &'static str,
    convert: fn(&str) -> String,
) -> impl Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync {
    move |value, _args| {
        let text = value.as_str().ok_or_else(|| {
            tera::Error::msg(format!("Filter `{filter}` expects a string, got {value}"))
        })?;
        Ok(Value::String(convert(text)))
    }
}

fn current_date(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let format = match args.get("format") {
        Some(Value::String(format)) => format.as_str(),
        Some(other) => {
            return Err(tera::Error::msg(format!(
                "Function `current_date` expects a string format, got {other}"
            )));
        }
        None => DATE_FORMAT,
    };

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(tera::Error::msg(format!(
            "Function `current_date` received an invalid format: {format}"
        )));
    }

    Ok(Value::String(Utc::now().format(format).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_compile_and_render() {
        let engine = TemplateEngine::new();
        engine
            .compile("greeting", "public class {{ entity_name }} {}")
            .unwrap();
        let out = engine
            .render("greeting", &json!({"entity_name": "Customer"}))
            .unwrap();
        assert_eq!(out, "public class Customer {}");
        assert_eq!(engine.cache_count(), 1);
    }

    #[test]
    fn test_compile_same_source_is_cached() {
        let engine = TemplateEngine::new();
        engine.compile("t", "{{ a }}").unwrap();
        engine.compile("t", "{{ a }}").unwrap();
        assert_eq!(engine.cache_count(), 1);
        assert!(engine.is_compiled("t"));
    }

    #[test]
    fn test_changed_source_recompiles() {
        let engine = TemplateEngine::new();
        engine.compile("t", "one {{ a }}").unwrap();
        engine.compile("t", "two {{ a }}").unwrap();
        let out = engine.render("t", &json!({"a": 1})).unwrap();
        assert_eq!(out, "two 1");
        assert_eq!(engine.cache_count(), 1);
    }

    #[test]
    fn test_compile_error_names_template_and_keeps_cache() {
        let engine = TemplateEngine::new();
        engine.compile("good", "{{ a }}").unwrap();

        let err = engine.compile("broken", "{% if %}").unwrap_err();
        match &err {
            GenerationError::TemplateCompile { name, diagnostics } => {
                assert_eq!(name, "broken");
                assert!(!diagnostics.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("broken"));
        assert_eq!(engine.cache_count(), 1);
        assert!(!engine.is_compiled("broken"));
        assert_eq!(engine.render("good", &json!({"a": "ok"})).unwrap(), "ok");
    }

    #[test]
    fn test_render_error_is_wrapped_with_name() {
        let engine = TemplateEngine::new();
        engine.compile("needs_var", "{{ missing.field }}").unwrap();
        let err = engine.render("needs_var", &json!({})).unwrap_err();
        match err {
            GenerationError::Render { name, .. } => assert_eq!(name, "needs_var"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_uncompiled_template_fails() {
        let engine = TemplateEngine::new();
        assert!(matches!(
            engine.render("absent", &json!({})),
            Err(GenerationError::Render { .. })
        ));
    }

    #[test]
    fn test_helper_filters() {
        let engine = TemplateEngine::new();
        engine
            .compile(
                "helpers",
                "{{ n | pascal_case }} {{ n | camel_case }} {{ p | snake_case }} \
                 {{ w | pluralize }} {{ q | singularize }}",
            )
            .unwrap();
        let out = engine
            .render(
                "helpers",
                &json!({"n": "first_name", "p": "FirstName", "w": "category", "q": "boxes"}),
            )
            .unwrap();
        assert_eq!(out, "FirstName firstName first_name categories box");
    }

    #[test]
    fn test_filter_rejects_non_string() {
        let engine = TemplateEngine::new();
        engine.compile("num", "{{ n | pascal_case }}").unwrap();
        let err = engine.render("num", &json!({"n": 4})).unwrap_err();
        assert!(err.to_string().contains("pascal_case"));
    }

    #[test]
    fn test_date_constants_and_function() {
        let engine = TemplateEngine::new();
        engine
            .compile(
                "dates",
                "{{ current_year }}|{{ current_date }}|{{ current_date(format=\"%Y\") }}",
            )
            .unwrap();
        let out = engine.render("dates", &json!({})).unwrap();
        let parts: Vec<_> = out.split('|').collect();
        let year = Utc::now().year().to_string();
        assert_eq!(parts[0], year);
        assert_eq!(parts[1].len(), 10);
        assert_eq!(parts[2], year);
    }

    #[test]
    fn test_model_values_take_precedence_over_constants() {
        let engine = TemplateEngine::new();
        engine.compile("at", "{{ generated_at }}").unwrap();
        let out = engine
            .render("at", &json!({"generated_at": "fixed"}))
            .unwrap();
        assert_eq!(out, "fixed");
    }

    #[test]
    fn test_current_date_rejects_bad_format() {
        let engine = TemplateEngine::new();
        engine
            .compile("bad_date", "{{ current_date(format=\"%Q\") }}")
            .unwrap();
        assert!(engine.render("bad_date", &json!({})).is_err());
    }

    #[test]
    fn test_clear_cache() {
        let engine = TemplateEngine::new();
        engine.compile("a", "a").unwrap();
        engine.compile("b", "b").unwrap();
        assert_eq!(engine.cache_count(), 2);
        engine.clear_cache();
        assert_eq!(engine.cache_count(), 0);
        assert!(engine.render("a", &json!({})).is_err());
    }

    #[tokio::test]
    async fn test_render_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dto.tera");
        tokio::fs::write(&path, "{{ entity_name }}Dto").await.unwrap();

        let engine = TemplateEngine::new();
        let out = engine
            .render_from_file("dto", &path, &json!({"entity_name": "Order"}))
            .await
            .unwrap();
        assert_eq!(out, "OrderDto");
    }

    #[tokio::test]
    async fn test_render_from_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.tera");
        let engine = TemplateEngine::new();
        let err = engine
            .render_from_file("missing", &path, &json!({}))
            .await
            .unwrap_err();
        match err {
            GenerationError::TemplateNotFound { name, path: p } => {
                assert_eq!(name, "missing");
                assert_eq!(p, path);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_concurrent_compile_and_render() {
        let engine = Arc::new(TemplateEngine::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let name = format!("t{}", i % 4);
                    for _ in 0..25 {
                        engine.compile(&name, "{{ v }}").unwrap();
                        let out = engine.render(&name, &json!({"v": i})).unwrap();
                        assert_eq!(out, i.to_string());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(engine.cache_count(), 4);
    }
}

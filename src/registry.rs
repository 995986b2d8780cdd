//! Format registry for format discovery and selection

use crate::ast::Document;
use crate::error::FormatError;
use crate::format::Format;
use crate::formats::html::serializer::MarkupOptions;
use crate::formats::{HtmlFormat, MarkdownFormat, TreevizFormat};
use std::collections::HashMap;

/// Registry of document formats, keyed by name
///
/// ```ignore
/// let registry = FormatRegistry::with_defaults();
/// let doc = registry.parse(source, "markdown")?;
/// let html = registry.serialize(&doc, "html")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, Box<dyn Format>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, replacing any format with the same name
    pub fn register<F: Format + 'static>(&mut self, format: F) {
        self.formats
            .insert(format.name().to_string(), Box::new(format));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Format, FormatError> {
        self.formats
            .get(name)
            .map(|f| f.as_ref())
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn parse(&self, source: &str, format: &str) -> Result<Document, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support parsing",
                format
            )));
        }
        fmt.parse(source)
    }

    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String, FormatError> {
        let fmt = self.get(format)?;
        if !fmt.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support serialization",
                format
            )));
        }
        fmt.serialize(doc)
    }

    /// Create a registry with the built-in formats
    pub fn with_defaults() -> Self {
        Self::with_markup_options(MarkupOptions::default())
    }

    /// Built-in formats, with chart placeholder texts taken from `options`
    pub fn with_markup_options(options: MarkupOptions) -> Self {
        let mut registry = Self::new();
        registry.register(MarkdownFormat::new(options.clone()));
        registry.register(HtmlFormat::new(options));
        registry.register(TreevizFormat);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFormat;
    impl Format for TestFormat {
        fn name(&self) -> &str {
            "test"
        }
        fn supports_serialization(&self) -> bool {
            true
        }
        fn serialize(&self, _doc: &Document) -> Result<String, FormatError> {
            Ok("test output".to_string())
        }
    }

    #[test]
    fn test_register_and_serialize() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);
        assert!(registry.has("test"));
        assert_eq!(
            registry.serialize(&Document::default(), "test").unwrap(),
            "test output"
        );
    }

    #[test]
    fn test_parse_unsupported() {
        let mut registry = FormatRegistry::new();
        registry.register(TestFormat);
        assert!(matches!(
            registry.parse("x", "test"),
            Err(FormatError::NotSupported(_))
        ));
    }

    #[test]
    fn test_unknown_format() {
        let registry = FormatRegistry::default();
        assert_eq!(
            registry.get("pdf").err(),
            Some(FormatError::FormatNotFound("pdf".to_string()))
        );
    }

    #[test]
    fn test_defaults() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.list_formats(), vec!["html", "markdown", "treeviz"]);
        assert!(registry.get("markdown").unwrap().supports_parsing());
        assert!(!registry.get("html").unwrap().supports_parsing());
    }
}

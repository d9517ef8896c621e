//! Report content attached to an output.

use std::any::Any;
use std::fmt;

use evalkit_core::{Category, Comparable, EqualityContext};

use crate::error::Result;

/// Produces the report fragment of an output. Rendering is up to the caller.
pub trait ContentGenerator: Comparable + Send + Sync {
    /// The content body.
    fn generate_content(&self) -> Result<String>;

    /// Materialize the content.
    fn compute(&self) -> Result<Box<dyn ContentGenerator>>;

    /// Clone behind a box.
    fn boxed_clone(&self) -> Box<dyn ContentGenerator>;

    /// View as a comparable value.
    fn as_comparable(&self) -> &dyn Comparable;
}

impl Clone for Box<dyn ContentGenerator> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

/// Fixed text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextContent {
    text: String,
}

impl TextContent {
    /// Wrap `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// No content.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The wrapped text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TextContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextContent(len={})", self.text.len())
    }
}

impl Comparable for TextContent {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn category(&self) -> Category {
        Category::Content
    }

    fn equal_to(&self, other: &dyn Comparable, _ctx: &EqualityContext) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| self.text == o.text)
    }
}

impl ContentGenerator for TextContent {
    fn generate_content(&self) -> Result<String> {
        Ok(self.text.clone())
    }

    fn compute(&self) -> Result<Box<dyn ContentGenerator>> {
        Ok(Box::new(self.clone()))
    }

    fn boxed_clone(&self) -> Box<dyn ContentGenerator> {
        Box::new(self.clone())
    }

    fn as_comparable(&self) -> &dyn Comparable {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evalkit_core::objects_are_equal;

    #[test]
    fn test_text_content() {
        let content = TextContent::new("meow");
        assert_eq!(content.generate_content().unwrap(), "meow");
        assert_eq!(content.to_string(), "TextContent(len=4)");
    }

    #[test]
    fn test_text_content_equality() {
        assert!(objects_are_equal(&TextContent::new("a"), &TextContent::new("a"), false));
        assert!(!objects_are_equal(&TextContent::new("a"), &TextContent::empty(), false));
        assert!(!objects_are_equal(&TextContent::new("a"), &"a".to_string(), false));
    }

    #[test]
    fn test_text_content_compute() {
        let content = TextContent::new("report");
        let computed = content.compute().unwrap();
        assert!(objects_are_equal(&content, computed.as_comparable(), false));
    }
}

//! Curated sample documents
//!
//! Fixtures live in `fixtures/<name>.md` at the crate root and are loaded by name:
//!
//!     Fixtures::load("kitchensink").parse_live()

use crate::ast::Document;
use crate::formats::markdown::parser::{parse_markdown, ParseOptions};
use std::fmt;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum FixtureError {
    NotFound(String),
    Io(String),
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixtureError::NotFound(name) => write!(f, "Fixture not found: {}", name),
            FixtureError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for FixtureError {}

/// A loaded fixture document
#[derive(Debug, Clone)]
pub struct Fixtures {
    name: String,
    source: String,
}

impl Fixtures {
    pub fn dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    pub fn path(name: &str) -> PathBuf {
        Self::dir().join(format!("{}.md", name))
    }

    pub fn try_load(name: &str) -> Result<Self, FixtureError> {
        let path = Self::path(name);
        if !path.exists() {
            return Err(FixtureError::NotFound(path.display().to_string()));
        }
        let source = fs::read_to_string(&path).map_err(|e| FixtureError::Io(e.to_string()))?;
        Ok(Fixtures {
            name: name.to_string(),
            source,
        })
    }

    /// Load a fixture, panicking if it is missing (tests only)
    pub fn load(name: &str) -> Self {
        match Self::try_load(name) {
            Ok(fixture) => fixture,
            Err(e) => panic!("{}", e),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parse_live(&self) -> Document {
        parse_markdown(&self.source, &ParseOptions::live())
    }

    pub fn parse_pending(&self) -> Document {
        parse_markdown(&self.source, &ParseOptions::pending())
    }
}

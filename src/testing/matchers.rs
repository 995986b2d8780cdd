//! Text matching for assertions

#[derive(Debug, Clone)]
pub enum TextMatch {
    Exact(String),
    StartsWith(String),
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, actual: &str) -> bool {
        match self {
            TextMatch::Exact(expected) => actual == expected,
            TextMatch::StartsWith(prefix) => actual.starts_with(prefix),
            TextMatch::Contains(substring) => actual.contains(substring),
        }
    }

    pub fn assert(&self, actual: &str, context: &str) {
        let expectation = match self {
            TextMatch::Exact(expected) => format!("to be '{}'", expected),
            TextMatch::StartsWith(prefix) => format!("to start with '{}'", prefix),
            TextMatch::Contains(substring) => format!("to contain '{}'", substring),
        };
        assert!(
            self.matches(actual),
            "{}: Expected text {}, but got '{}'",
            context,
            expectation,
            actual
        );
    }
}

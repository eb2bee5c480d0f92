use serde::{Deserialize, Serialize};
use std::fmt;

/// A programming language supported by the execution engine.
///
/// The numeric ids are the Judge0 CE language ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Cpp,
    C,
    Go,
    Rust,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Java,
        Self::Cpp,
        Self::C,
        Self::Go,
        Self::Rust,
    ];

    /// Executor-specific language id.
    pub fn id(&self) -> i32 {
        match self {
            Self::Python => 71,
            Self::JavaScript => 63,
            Self::TypeScript => 74,
            Self::Java => 62,
            Self::Cpp => 54,
            Self::C => 50,
            Self::Go => 60,
            Self::Rust => 73,
        }
    }

    /// Canonical upper-case name, as used in problem snippets and reference solutions.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Python => "PYTHON",
            Self::JavaScript => "JAVASCRIPT",
            Self::TypeScript => "TYPESCRIPT",
            Self::Java => "JAVA",
            Self::Cpp => "CPP",
            Self::C => "C",
            Self::Go => "GO",
            Self::Rust => "RUST",
        }
    }

    /// Look up a language by name, ignoring case and surrounding whitespace.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.name().eq_ignore_ascii_case(name))
    }

    pub fn from_id(id: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|lang| lang.id() == id)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

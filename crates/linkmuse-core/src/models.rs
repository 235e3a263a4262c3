//! Data model shared by the inference and discovery crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::defaults;

// =============================================================================
// DOCUMENTS
// =============================================================================

/// A note owned by the host environment. The core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier, usually the vault-relative path (e.g. "topics/Rust.md").
    pub path: String,
    /// Display name: the basename without extension (e.g. "Rust").
    pub name: String,
    /// Text content.
    pub content: String,
}

impl Document {
    /// Create a document whose display name is derived from the path's file stem.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let name = Path::new(&path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(path.as_str())
            .to_string();
        Self {
            path,
            name,
            content: content.into(),
        }
    }

    /// Create a document with an explicit display name.
    pub fn with_name(
        path: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            content: content.into(),
        }
    }
}

// =============================================================================
// RELEVANCE
// =============================================================================

/// Structured relevance judgement between two notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceResult {
    /// Human-readable explanation of how the notes relate.
    pub explanation: String,
    /// Normalized score in `[0, 1]`. 0 means "no relevance or unparseable".
    pub relevance_score: f32,
}

impl RelevanceResult {
    /// Create a result, clamping the score into `[0, 1]`. NaN becomes 0.
    pub fn new(explanation: impl Into<String>, relevance_score: f32) -> Self {
        let relevance_score = if relevance_score.is_nan() {
            0.0
        } else {
            relevance_score.clamp(0.0, 1.0)
        };
        Self {
            explanation: explanation.into(),
            relevance_score,
        }
    }

    /// The placeholder returned when a model response could not be parsed.
    pub fn unparseable() -> Self {
        Self::new(defaults::UNPARSEABLE_EXPLANATION, 0.0)
    }
}

/// A suggested link from the focal note to a candidate, returned to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialLink {
    /// Candidate display name (what goes inside `[[...]]`).
    pub note_name: String,
    /// Candidate path.
    pub note_path: String,
    /// Score in `[0, 1]`.
    pub relevance_score: f32,
    /// Explanation from the relevance analysis.
    pub content: String,
}

impl PotentialLink {
    /// Build a link for `candidate` from its relevance result.
    pub fn from_result(candidate: &Document, result: RelevanceResult) -> Self {
        Self {
            note_name: candidate.name.clone(),
            note_path: candidate.path.clone(),
            relevance_score: result.relevance_score,
            content: result.explanation,
        }
    }
}

// =============================================================================
// BUDGET
// =============================================================================

/// Two independent bounds on a discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisBudget {
    /// How many candidates are sent to the LLM at all.
    pub max_notes_to_analyze: usize,
    /// How many top-ranked results are returned, applied after sorting.
    pub max_links_to_generate: usize,
}

impl Default for AnalysisBudget {
    fn default() -> Self {
        Self {
            max_notes_to_analyze: defaults::MAX_NOTES_TO_ANALYZE,
            max_links_to_generate: defaults::MAX_LINKS_TO_GENERATE,
        }
    }
}

impl AnalysisBudget {
    pub fn new(max_notes_to_analyze: usize, max_links_to_generate: usize) -> Self {
        Self {
            max_notes_to_analyze,
            max_links_to_generate,
        }
    }
}

// =============================================================================
// STATUS
// =============================================================================

/// Run states the host surfaces verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "detail")]
pub enum DiscoveryStatus {
    /// A run is in progress.
    Analyzing,
    /// The run finished with an empty list.
    NoLinksFound,
    /// The run finished with this many links.
    LinksFound(usize),
    /// The run aborted with this message.
    Error(String),
}

impl DiscoveryStatus {
    /// Status for a finished run with `count` links.
    pub fn for_count(count: usize) -> Self {
        if count == 0 {
            Self::NoLinksFound
        } else {
            Self::LinksFound(count)
        }
    }

    /// Whether this status should be shown as an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for DiscoveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzing => write!(f, "正在分析笔记关联..."),
            Self::NoLinksFound => write!(f, "未找到潜在关联的笔记"),
            Self::LinksFound(n) => write!(f, "已找到{}个潜在关联", n),
            Self::Error(msg) => write!(f, "生成关联时出错: {}", msg),
        }
    }
}

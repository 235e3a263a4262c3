//! Relevance analysis between two notes.
//!
//! Builds a title-first comparison prompt, sends it through a
//! [`PromptBackend`], and recovers a [`RelevanceResult`] from whatever the
//! model returned. Parsing runs the tiers of [`PARSE_CHAIN`] in order:
//!
//! ```text
//! FencedJson    ```json {...} ``` or bare JSON
//! EmbeddedJson  prose around the first parseable {...}
//! LabeledText   "关联性解释：... 关联程度：0.8" and similar
//! ```
//!
//! The first tier that yields something wins; its score is rescaled into
//! `[0, 1]`. When no tier matches the sentinel result is returned with score
//! 0. Parse failures never surface as errors.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use linkmuse_core::{defaults, PromptBackend, RelevanceAnalysis, RelevanceResult, Result};

// =============================================================================
// PROMPT
// =============================================================================

/// Cut `content` to `limit` characters, appending the truncation marker.
pub fn truncate_content(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((byte_idx, _)) => {
            format!("{}{}", &content[..byte_idx], defaults::TRUNCATION_MARKER)
        }
        None => content.to_string(),
    }
}

/// Build the comparison prompt. Contents are embedded as given.
pub fn relevance_prompt(title1: &str, title2: &str, content1: &str, content2: &str) -> String {
    format!(
        "请分析以下两篇笔记之间的关联性。\n\
         判断时以两篇笔记的标题为主要依据，笔记内容仅作为理解标题含义的辅助参考。\n\
         \n\
         笔记一标题：{title1}\n\
         笔记一内容：\n{content1}\n\
         \n\
         笔记二标题：{title2}\n\
         笔记二内容：\n{content2}\n\
         \n\
         在解释中请直接使用笔记的真实标题称呼它们，不要使用“笔记一”“笔记二”或“两段内容”之类的指代。\n\
         请只返回如下格式的JSON，不要使用markdown代码块包裹：\n\
         {{\"explanation\": \"关联性解释\", \"relevanceScore\": 0到1之间的数字}}"
    )
}

// =============================================================================
// PARSER CHAIN
// =============================================================================

/// One tier of the response parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// Strip surrounding code fences, then parse the rest as JSON.
    FencedJson,
    /// First `{...}` in the text that parses as a relevance object.
    EmbeddedJson,
    /// Labeled explanation and score phrases.
    LabeledText,
}

/// Tiers tried in order by [`parse_relevance_response`].
pub const PARSE_CHAIN: [ParseStrategy; 3] = [
    ParseStrategy::FencedJson,
    ParseStrategy::EmbeddedJson,
    ParseStrategy::LabeledText,
];

/// Un-normalized output of a single tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRelevance {
    pub explanation: String,
    /// Raw score as the model wrote it.
    pub score: f64,
}

impl ParseStrategy {
    /// Run this tier alone.
    pub fn parse(&self, raw: &str) -> Option<ParsedRelevance> {
        match self {
            Self::FencedJson => parse_fenced_json(raw),
            Self::EmbeddedJson => parse_embedded_json(raw),
            Self::LabeledText => parse_labeled_text(raw),
        }
    }
}

/// Recover a relevance result from a model response.
pub fn parse_relevance_response(raw: &str) -> RelevanceResult {
    for strategy in PARSE_CHAIN {
        if let Some(parsed) = strategy.parse(raw) {
            debug!(
                subsystem = "inference",
                component = "relevance",
                strategy = ?strategy,
                raw_score = parsed.score,
                "Parsed relevance response"
            );
            return RelevanceResult::new(parsed.explanation, rescale_score(parsed.score));
        }
    }

    warn!(
        subsystem = "inference",
        component = "relevance",
        response_len = raw.len(),
        "Could not parse relevance response, using sentinel"
    );
    RelevanceResult::unparseable()
}

/// Map a model score into `[0, 1]`.
///
/// Scores above 1 are assumed to be on a 10 or 100 point scale: above 10 is
/// divided by 100, otherwise by 10. This is lossy (11 becomes 0.11).
pub fn rescale_score(score: f64) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    let scaled = if score > 10.0 {
        score / 100.0
    } else if score > 1.0 {
        score / 10.0
    } else {
        score
    };
    scaled.clamp(0.0, 1.0) as f32
}

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*```[\w-]*[ \t]*\r?$|```[ \t]*$").expect("static fence regex")
    })
}

fn parse_fenced_json(raw: &str) -> Option<ParsedRelevance> {
    let cleaned = fence_regex().replace_all(raw, "");
    let value: Value = serde_json::from_str(cleaned.trim()).ok()?;
    from_json_value(&value)
}

fn parse_embedded_json(raw: &str) -> Option<ParsedRelevance> {
    raw.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(value)) => from_json_value(&value),
            _ => None,
        }
    })
}

/// Read a relevance object. Needs at least one known field.
fn from_json_value(value: &Value) -> Option<ParsedRelevance> {
    let object = value.as_object()?;
    let explanation = object.get("explanation");
    let score = object
        .get("relevanceScore")
        .or_else(|| object.get("relevance_score"));
    if explanation.is_none() && score.is_none() {
        return None;
    }

    let explanation = explanation
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(defaults::MISSING_EXPLANATION)
        .to_string();
    let score = score.and_then(json_number).unwrap_or(0.0);

    Some(ParsedRelevance { explanation, score })
}

fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Labeled text
// -----------------------------------------------------------------------------

const NUMBER: &str = r"(\d+(?:\.\d+)?)";

struct LabeledPatterns {
    explanations: Vec<Regex>,
    scores: Vec<Regex>,
    /// Where a labeled explanation stops.
    explanation_end: Regex,
    /// Where lead-in prose stops.
    prose_end: Regex,
}

fn labeled_patterns() -> &'static LabeledPatterns {
    static PATTERNS: OnceLock<LabeledPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let explanations = [
            r"关联性解释[：:]*\s*(.+)",
            r"分析结果[：:]*\s*(.+)",
            r"(两段内容.+)",
            r"(?i)explanation\s*[：:]\s*(.+)",
        ];
        let scores = [
            format!(r"关联程度(?:评分)?[为是]?[：:]*\s*{NUMBER}"),
            format!(r"相关度[为是]?[：:]*\s*{NUMBER}"),
            format!(r"相关性[为是]?[：:]*\s*{NUMBER}"),
            format!(r"评分[为是]?[：:]*\s*{NUMBER}"),
            format!(r"(?i)relevance\s*score\s*[：:]?\s*{NUMBER}"),
        ];
        LabeledPatterns {
            explanations: explanations
                .iter()
                .map(|p| Regex::new(p).expect("static explanation regex"))
                .collect(),
            scores: scores
                .iter()
                .map(|p| Regex::new(p).expect("static score regex"))
                .collect(),
            explanation_end: Regex::new(r"(?i)关联程度|relevance\s*score")
                .expect("static terminator regex"),
            prose_end: Regex::new(r"(?i)关联程度|相关度|相关性|评分|relevance\s*score")
                .expect("static terminator regex"),
        }
    })
}

fn parse_labeled_text(raw: &str) -> Option<ParsedRelevance> {
    let text = raw.trim();
    let patterns = labeled_patterns();

    let labeled = patterns.explanations.iter().find_map(|re| {
        let captured = re.captures(text)?.get(1)?.as_str();
        let explanation = cut_at(captured, &patterns.explanation_end);
        (!explanation.is_empty()).then(|| explanation.to_string())
    });

    let score = patterns.scores.iter().find_map(|re| {
        re.captures(text)?
            .get(1)?
            .as_str()
            .parse::<f64>()
            .ok()
    });

    match (labeled, score) {
        (Some(explanation), score) => Some(ParsedRelevance {
            explanation,
            score: score.unwrap_or(0.0),
        }),
        (None, Some(score)) => {
            let prose = cut_at(text, &patterns.prose_end);
            let explanation = if prose.is_empty() {
                defaults::MISSING_EXPLANATION.to_string()
            } else {
                prose.to_string()
            };
            Some(ParsedRelevance { explanation, score })
        }
        (None, None) => None,
    }
}

/// Text before the first line break or terminator, trimmed of punctuation.
fn cut_at<'a>(text: &'a str, terminator: &Regex) -> &'a str {
    let mut end = text.find(['\n', '\r']).unwrap_or(text.len());
    if let Some(m) = terminator.find(text) {
        end = end.min(m.start());
    }
    text[..end].trim().trim_end_matches(['，', ',', '。', '；', ';']).trim()
}

// =============================================================================
// ANALYZER
// =============================================================================

/// Relevance analysis over any prompt backend.
pub struct RelevanceAnalyzer<B: PromptBackend> {
    backend: B,
    content_truncation: usize,
}

impl<B: PromptBackend> RelevanceAnalyzer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            content_truncation: defaults::CONTENT_TRUNCATION,
        }
    }

    /// Characters of each note body sent to the model.
    pub fn with_content_truncation(mut self, limit: usize) -> Self {
        self.content_truncation = limit;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: PromptBackend> RelevanceAnalysis for RelevanceAnalyzer<B> {
    async fn analyze_relevance(
        &self,
        title1: &str,
        title2: &str,
        content1: &str,
        content2: &str,
    ) -> Result<RelevanceResult> {
        let prompt = relevance_prompt(
            title1,
            title2,
            &truncate_content(content1, self.content_truncation),
            &truncate_content(content2, self.content_truncation),
        );

        let response = self.backend.send_prompt(&prompt).await?;
        let result = parse_relevance_response(&response);

        debug!(
            subsystem = "inference",
            component = "relevance",
            op = "analyze_relevance",
            provider = self.backend.provider_id(),
            prompt_len = prompt.len(),
            response_len = response.len(),
            score = result.relevance_score,
            "Relevance analyzed"
        );
        Ok(result)
    }
}

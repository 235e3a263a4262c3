//! Centralized default constants for linkmuse.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// ANALYSIS BUDGET
// =============================================================================

/// How many candidate notes are sent to the LLM per discovery run.
pub const MAX_NOTES_TO_ANALYZE: usize = 20;

/// How many top-ranked links a discovery run returns.
pub const MAX_LINKS_TO_GENERATE: usize = 5;

/// Character budget for each note body embedded in a relevance prompt.
pub const CONTENT_TRUNCATION: usize = 1000;

/// Marker appended to a note body that was cut to the truncation budget.
pub const TRUNCATION_MARKER: &str = "...(内容已截断)";

/// Candidates scored at once. 1 keeps scoring strictly sequential.
pub const DISCOVERY_CONCURRENCY: usize = 1;

// =============================================================================
// PROVIDER REQUESTS
// =============================================================================

/// Sampling temperature for relevance analysis requests.
pub const TEMPERATURE: f32 = 0.3;

/// Completion token cap for relevance analysis requests.
pub const MAX_TOKENS: u32 = 1000;

/// Completion token cap for connection tests.
pub const TEST_MAX_TOKENS: u32 = 5;

/// Prompt sent by connection tests.
pub const TEST_PROMPT: &str = "Hello";

/// Per-request deadline in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Provider used when none is configured.
pub const DEFAULT_PROVIDER: &str = "siliconflow";

/// `anthropic-version` header value for the messages API.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

// =============================================================================
// PROVIDER ENDPOINTS AND MODELS
// =============================================================================

pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_MODEL: &str = "gpt-4";

pub const CLAUDE_URL: &str = "https://api.anthropic.com/v1/messages";
pub const CLAUDE_MODEL: &str = "claude-3-5-sonnet-latest";

pub const SILICONFLOW_URL: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const SILICONFLOW_MODEL: &str = "Qwen/Qwen2-7B-Instruct";

pub const VOLC_URL: &str = "https://ark.cn-beijing.volces.com/api/v3/chat/completions";
pub const VOLC_MODEL: &str = "deepseek-v3-241226";

// =============================================================================
// RELEVANCE PARSING
// =============================================================================

/// Explanation returned when a JSON result has no explanation field.
pub const MISSING_EXPLANATION: &str = "无法获取关联性解释";

/// Explanation of the sentinel result returned when nothing could be parsed.
pub const UNPARSEABLE_EXPLANATION: &str = "无法解析关联性解释";

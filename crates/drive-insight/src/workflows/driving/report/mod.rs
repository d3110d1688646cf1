//! Narrative report pipeline: prompt construction, the text-generation
//! boundary, response sanitization, and the fallback layers shown to users.

mod client;
pub mod display;
mod gemini;
pub mod prompt;
pub mod sanitize;

pub use client::{
    GenerationError, GenerationSettings, ReportClient, ReportText, TextGenerator,
    DEFAULT_MODEL, DEFAULT_TIMEOUT, FALLBACK_REPORT,
};
pub use display::{display_report, CONNECTION_ERROR_REPORT, FAILURE_MARKERS, PENDING_PLACEHOLDER};
pub use gemini::{GeminiGenerator, DEFAULT_BASE_URL};
pub use prompt::{build_prompt, ATTRIBUTION_LINE, NO_RISK_SUMMARY};
pub use sanitize::sanitize_report_text;

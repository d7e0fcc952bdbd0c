//! Practice sentence generation
//!
//! Pipeline for one `/api/prompt` request:
//! 1. Build the instruction for the requested category
//! 2. One call to the [`TextGenerator`]
//! 3. [`normalize`] the raw completion into a list
//! 4. Per object: look up alias keys, attach the romanized transliteration
//!
//! Non-object items are dropped; a completion that is not JSON at all is
//! passed through as raw text. Only the generator call can fail the request.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use tsuzuri_common::romaji::transliterate_value;

use crate::services::generative_client::{GenerativeError, TextGenerator};
use crate::services::normalizer::normalize;

/// Keys tried, in order, for the kana reading
pub const PHONETIC_KEYS: &[&str] = &["hiragana", "kana", "yomi"];

/// Keys tried, in order, for the kanji-kana text
pub const SCRIPT_KEYS: &[&str] = &["kanji", "text", "sentence"];

/// Field the transliteration is written to. Always overwritten.
pub const ROMANIZED_KEY: &str = "romanized";

/// Mirror of [`ROMANIZED_KEY`] read by the web frontend. Always overwritten.
pub const FRONTEND_ROMAJI_KEY: &str = "romaji";

/// Longest category accepted into the prompt, in characters
pub const MAX_CATEGORY_CHARS: usize = 64;

/// Generation parameters taken from configuration
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub max_output_tokens: u32,
}

/// The generative service call failed
#[derive(Debug, Error)]
#[error("generative service failed: {0}")]
pub struct UpstreamError(#[from] pub GenerativeError);

/// One sentence with its reading and derived romanization
#[derive(Debug, Clone, PartialEq)]
pub struct SentencePair {
    pub phonetic: Option<String>,
    pub script: Option<String>,
    pub romanized: String,
    /// The object as the model returned it
    pub source: Map<String, Value>,
}

impl SentencePair {
    /// Extract fields from a model object and derive the romanization
    pub fn from_object(source: Map<String, Value>) -> Self {
        let phonetic_value = first_match(&source, PHONETIC_KEYS);
        let romanized = phonetic_value.map(transliterate_value).unwrap_or_default();
        let phonetic = phonetic_value.and_then(Value::as_str).map(str::to_string);
        let script = first_match(&source, SCRIPT_KEYS)
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            phonetic,
            script,
            romanized,
            source,
        }
    }

    /// Original fields plus the romanized field and its frontend mirror
    pub fn to_value(&self) -> Value {
        let mut fields = self.source.clone();
        for key in [ROMANIZED_KEY, FRONTEND_ROMAJI_KEY] {
            fields.insert(key.to_string(), Value::String(self.romanized.clone()));
        }
        Value::Object(fields)
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum PracticeSet {
    /// Parsed and enriched sentences
    Enriched(Vec<SentencePair>),
    /// Model output that was not JSON, untouched
    Raw(String),
}

/// Wire shape of `/api/prompt`: both variants travel as a string in `text`
#[derive(Debug, Clone, Serialize)]
pub struct PromptPayload {
    pub text: String,
}

impl PracticeSet {
    /// The single place the dual transport shape is produced.
    pub fn into_payload(self) -> PromptPayload {
        let text = match self {
            PracticeSet::Enriched(pairs) => {
                Value::Array(pairs.iter().map(SentencePair::to_value).collect()).to_string()
            }
            PracticeSet::Raw(raw) => raw,
        };
        PromptPayload { text }
    }
}

/// Value of the first key in `keys` that holds a string
pub fn first_match<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| value.is_string())
}

/// Trimmed, length-capped category, or `default` when absent or blank
pub fn resolve_category(requested: Option<&str>, default: &str) -> String {
    let category = requested.map(str::trim).unwrap_or_default();
    let category = if category.is_empty() { default } else { category };
    category.chars().take(MAX_CATEGORY_CHARS).collect()
}

/// Instruction sent to the model for `category`
pub fn build_prompt(category: &str) -> String {
    format!(
        "「{category}」をテーマにした日本語のタイピング練習用の文章を作ってください。\n\
         短い文に区切り、全体で300〜350文字程度にしてください。\n\
         出力は次の形式のJSON配列のみとし、説明やコードブロックは付けないでください。\n\
         各要素は \"hiragana\"（ひらがなだけの読み）と \"kanji\"（漢字かな交じりの文）を持つオブジェクトです。\n\
         例: [{{\"hiragana\": \"ねこがにわでひなたぼっこをしている。\", \"kanji\": \"猫が庭で日向ぼっこをしている。\"}}]"
    )
}

/// Turn normalized model output into sentence pairs, skipping non-objects
pub fn enrich(items: Vec<Value>) -> Vec<SentencePair> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(object) => Some(SentencePair::from_object(object)),
            _ => None,
        })
        .collect()
}

/// Generate, parse and enrich a practice set for `category`
pub async fn build_practice_set(
    generator: &dyn TextGenerator,
    settings: &GenerationSettings,
    category: &str,
) -> Result<PracticeSet, UpstreamError> {
    let prompt = build_prompt(category);

    let raw = generator
        .generate_text(&prompt, &settings.model, settings.max_output_tokens)
        .await?;

    match normalize(&raw) {
        Ok(items) => {
            let received = items.len();
            let pairs = enrich(items);
            info!(
                category = %category,
                received,
                kept = pairs.len(),
                "Practice set generated"
            );
            Ok(PracticeSet::Enriched(pairs))
        }
        Err(malformed) => {
            warn!(
                category = %category,
                reason = %malformed.reason,
                "Model output is not JSON, passing raw text through"
            );
            Ok(PracticeSet::Raw(malformed.raw))
        }
    }
}

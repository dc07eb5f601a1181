use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub sample_questions: SampleQuestions,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub api_key: Option<String>,
	pub documents_collection: String,
	pub qa_collection: String,
	/// Optional. Set when the collections store the dense vector under a name.
	pub vector_name: Option<String>,
	pub vector_dim: u32,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: RerankProviders,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	/// Selects the wire format: "openai" (OpenAI-compatible) or "ollama".
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default = "default_embedding_attempts")]
	pub max_attempts: u32,
	#[serde(default = "default_retry_backoff_ms")]
	pub retry_backoff_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct RerankProviders {
	/// Score assigned to every document when the rerank service is unavailable. Only has to clear
	/// the category thresholds; it carries no relevance meaning.
	#[serde(default = "default_fallback_score")]
	pub fallback_score: f32,
	pub english: ProviderConfig,
	pub multilingual: ProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub general_program: String,
	pub general_threshold: f32,
	pub specific_threshold: f32,
	pub max_general: u32,
	pub max_specific: u32,
	pub short_conversation_turns: u32,
	pub primary_limit: u32,
	pub history_primary_limit: u32,
	pub history_limit: u32,
	pub history_turns: u32,
	pub max_rerank_candidates: u32,
	pub request_timeout_ms: u64,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			general_program: "general".to_string(),
			general_threshold: 0.25,
			specific_threshold: 0.35,
			max_general: 8,
			max_specific: 8,
			short_conversation_turns: 2,
			primary_limit: 10,
			history_primary_limit: 8,
			history_limit: 8,
			history_turns: 3,
			max_rerank_candidates: 20,
			request_timeout_ms: 30_000,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SampleQuestions {
	pub limit: u32,
	pub top_n: u32,
	pub min_relevance_score: f32,
}
impl Default for SampleQuestions {
	fn default() -> Self {
		Self { limit: 5, top_n: 3, min_relevance_score: 0.5 }
	}
}

fn default_embedding_attempts() -> u32 {
	2
}

fn default_retry_backoff_ms() -> u64 {
	200
}

fn default_fallback_score() -> f32 {
	1.0
}

mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, ProviderConfig, Providers, Qdrant, RerankProviders,
	Retrieval, SampleQuestions, Service, Storage,
};

use std::{fs, path::Path};

pub const EMBEDDING_PROVIDER_IDS: [&str; 2] = ["openai", "ollama"];
/// Rerank endpoints speak the Cohere wire format.
pub const RERANK_PROVIDER_IDS: [&str; 1] = ["cohere"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	validate_storage(cfg)?;
	validate_providers(cfg)?;
	validate_retrieval(&cfg.retrieval)?;
	validate_sample_questions(&cfg.sample_questions)?;

	Ok(())
}

fn validate_storage(cfg: &Config) -> Result<()> {
	let qdrant = &cfg.storage.qdrant;

	for (label, value) in [
		("storage.qdrant.url", &qdrant.url),
		("storage.qdrant.documents_collection", &qdrant.documents_collection),
		("storage.qdrant.qa_collection", &qdrant.qa_collection),
	] {
		if value.trim().is_empty() {
			return Err(Error::validation(format!("{label} must be non-empty.")));
		}
	}

	if qdrant.vector_dim == 0 {
		return Err(Error::validation("storage.qdrant.vector_dim must be greater than zero."));
	}
	if qdrant.timeout_ms == 0 {
		return Err(Error::validation("storage.qdrant.timeout_ms must be greater than zero."));
	}

	Ok(())
}

fn validate_providers(cfg: &Config) -> Result<()> {
	let embedding = &cfg.providers.embedding;

	if !EMBEDDING_PROVIDER_IDS.contains(&embedding.provider_id.as_str()) {
		return Err(Error::validation(
			"providers.embedding.provider_id must be one of openai or ollama.",
		));
	}
	if embedding.dimensions == 0 {
		return Err(Error::validation(
			"providers.embedding.dimensions must be greater than zero.",
		));
	}
	if embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::validation(
			"providers.embedding.dimensions must match storage.qdrant.vector_dim.",
		));
	}
	if embedding.max_attempts == 0 {
		return Err(Error::validation(
			"providers.embedding.max_attempts must be greater than zero.",
		));
	}
	if embedding.provider_id != "ollama" && embedding.api_key.trim().is_empty() {
		return Err(Error::validation("Provider embedding api_key must be non-empty."));
	}

	let rerank = &cfg.providers.rerank;

	if !rerank.fallback_score.is_finite() {
		return Err(Error::validation(
			"providers.rerank.fallback_score must be a finite number.",
		));
	}

	for (label, provider_id) in [
		("providers.rerank.english.provider_id", &rerank.english.provider_id),
		("providers.rerank.multilingual.provider_id", &rerank.multilingual.provider_id),
	] {
		if !RERANK_PROVIDER_IDS.contains(&provider_id.as_str()) {
			return Err(Error::validation(format!("{label} must be cohere.")));
		}
	}
	for (label, key) in [
		("rerank.english", &rerank.english.api_key),
		("rerank.multilingual", &rerank.multilingual.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::validation(format!("Provider {label} api_key must be non-empty.")));
		}
	}
	for (label, timeout_ms) in [
		("providers.embedding.timeout_ms", embedding.timeout_ms),
		("providers.rerank.english.timeout_ms", rerank.english.timeout_ms),
		("providers.rerank.multilingual.timeout_ms", rerank.multilingual.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::validation(format!("{label} must be greater than zero.")));
		}
	}

	Ok(())
}

fn validate_retrieval(retrieval: &Retrieval) -> Result<()> {
	if retrieval.general_program.trim().is_empty() {
		return Err(Error::validation("retrieval.general_program must be non-empty."));
	}

	for (label, threshold) in [
		("retrieval.general_threshold", retrieval.general_threshold),
		("retrieval.specific_threshold", retrieval.specific_threshold),
	] {
		validate_unit_interval(label, threshold)?;
	}
	for (label, value) in [
		("retrieval.max_general", retrieval.max_general),
		("retrieval.max_specific", retrieval.max_specific),
		("retrieval.primary_limit", retrieval.primary_limit),
		("retrieval.history_primary_limit", retrieval.history_primary_limit),
		("retrieval.history_limit", retrieval.history_limit),
		("retrieval.history_turns", retrieval.history_turns),
		("retrieval.max_rerank_candidates", retrieval.max_rerank_candidates),
	] {
		if value == 0 {
			return Err(Error::validation(format!("{label} must be greater than zero.")));
		}
	}

	if retrieval.request_timeout_ms == 0 {
		return Err(Error::validation("retrieval.request_timeout_ms must be greater than zero."));
	}

	Ok(())
}

fn validate_sample_questions(sample_questions: &SampleQuestions) -> Result<()> {
	if sample_questions.limit == 0 {
		return Err(Error::validation("sample_questions.limit must be greater than zero."));
	}
	if sample_questions.top_n == 0 {
		return Err(Error::validation("sample_questions.top_n must be greater than zero."));
	}

	validate_unit_interval("sample_questions.min_relevance_score", sample_questions.min_relevance_score)
}

fn validate_unit_interval(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() {
		return Err(Error::validation(format!("{label} must be a finite number.")));
	}
	if !(0.0..=1.0).contains(&value) {
		return Err(Error::validation(format!("{label} must be in the range 0.0-1.0.")));
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}
	if cfg.storage.qdrant.vector_name.as_deref().map(|name| name.trim().is_empty()).unwrap_or(false)
	{
		cfg.storage.qdrant.vector_name = None;
	}

	cfg.retrieval.general_program = cfg.retrieval.general_program.trim().to_lowercase();

	for provider in [&mut cfg.providers.rerank.english, &mut cfg.providers.rerank.multilingual] {
		provider.provider_id = provider.provider_id.trim().to_lowercase();
	}
}

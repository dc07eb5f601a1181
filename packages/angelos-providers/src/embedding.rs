use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use angelos_config::EmbeddingProviderConfig;

use crate::{Error, Result};

/// Wire formats understood by [`embed`]. Selected from `provider_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
	/// `POST {model, input[]}` answered with `data[].{index, embedding}`. Also covers Azure OpenAI
	/// and local OpenAI-compatible servers.
	OpenAi,
	/// `POST {model, prompt}` answered with `{embedding}`, one text per request.
	Ollama,
}
impl EmbeddingBackend {
	pub fn from_provider_id(provider_id: &str) -> Result<Self> {
		match provider_id {
			"openai" => Ok(Self::OpenAi),
			"ollama" => Ok(Self::Ollama),
			other => Err(Error::InvalidConfig {
				message: format!("Unsupported embedding provider {other}."),
			}),
		}
	}
}

pub async fn embed(
	client: &Client,
	cfg: &EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let vectors = match EmbeddingBackend::from_provider_id(&cfg.provider_id)? {
		EmbeddingBackend::OpenAi => embed_openai(client, cfg, texts).await?,
		EmbeddingBackend::Ollama => embed_ollama(client, cfg, texts).await?,
	};

	if vectors.len() != texts.len() {
		return Err(Error::invalid_response(format!(
			"Embedding provider returned {} vectors for {} inputs.",
			vectors.len(),
			texts.len()
		)));
	}

	Ok(vectors)
}

async fn embed_openai(
	client: &Client,
	cfg: &EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_openai_response(json)
}

async fn embed_ollama(
	client: &Client,
	cfg: &EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let url = crate::endpoint(&cfg.api_base, &cfg.path);
	let mut out = Vec::with_capacity(texts.len());

	for text in texts {
		let body = serde_json::json!({ "model": cfg.model, "prompt": text });
		let res = client
			.post(url.as_str())
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.headers(headers.clone())
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;

		out.push(parse_ollama_response(&json)?);
	}

	Ok(out)
}

fn parse_openai_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Embedding response is missing data array."))?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item
			.get("embedding")
			.ok_or_else(|| Error::invalid_response("Embedding item missing embedding array."))?;

		indexed.push((index, parse_vector(embedding)?));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

fn parse_ollama_response(json: &Value) -> Result<Vec<f32>> {
	let embedding = json
		.get("embedding")
		.ok_or_else(|| Error::invalid_response("Embedding response is missing embedding."))?;

	parse_vector(embedding)
}

fn parse_vector(value: &Value) -> Result<Vec<f32>> {
	let values = value
		.as_array()
		.ok_or_else(|| Error::invalid_response("Embedding must be an array."))?;
	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number = value
			.as_f64()
			.ok_or_else(|| Error::invalid_response("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_openai_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_openai_response(json).expect("parse failed");

		assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
	}

	#[test]
	fn parses_ollama_embedding() {
		let json = serde_json::json!({ "embedding": [0.25, -1.0] });

		assert_eq!(parse_ollama_response(&json).expect("parse failed"), vec![0.25, -1.0]);
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [{ "embedding": [0.1, "x"] }] });
		let err = parse_openai_response(json).expect_err("Expected parse error.");

		assert!(err.to_string().contains("numeric"), "Unexpected error: {err}");
	}

	#[test]
	fn backend_factory_selects_by_provider_id() {
		assert_eq!(
			EmbeddingBackend::from_provider_id("openai").expect("openai must be supported"),
			EmbeddingBackend::OpenAi
		);
		assert_eq!(
			EmbeddingBackend::from_provider_id("ollama").expect("ollama must be supported"),
			EmbeddingBackend::Ollama
		);
		assert!(EmbeddingBackend::from_provider_id("bert").is_err());
	}
}

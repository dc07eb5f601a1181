use std::{cmp::Ordering, time::Duration};

use reqwest::Client;
use serde_json::Value;

use angelos_config::ProviderConfig;
use angelos_domain::RerankResult;

use crate::{Error, Result};

/// Scores `docs` against `query` on a Cohere-compatible endpoint. Results come back sorted by
/// descending score, at most `top_n` long, with indices into `docs`.
pub async fn rerank(
	client: &Client,
	cfg: &ProviderConfig,
	query: &str,
	docs: &[String],
	top_n: usize,
) -> Result<Vec<RerankResult>> {
	let body = serde_json::json!({
		"model": cfg.model,
		"query": query,
		"documents": docs,
		"top_n": top_n,
		"return_documents": false,
	});
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_rerank_response(json, docs.len(), top_n)
}

fn parse_rerank_response(
	json: Value,
	doc_count: usize,
	top_n: usize,
) -> Result<Vec<RerankResult>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Rerank response is missing results array."))?;
	let mut out = Vec::with_capacity(results.len());

	for item in results {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.ok_or_else(|| Error::invalid_response("Rerank result missing index."))? as usize;
		let score = item
			.get("relevance_score")
			.or_else(|| item.get("score"))
			.and_then(|v| v.as_f64())
			.ok_or_else(|| Error::invalid_response("Rerank result missing score."))? as f32;

		if index < doc_count {
			out.push(RerankResult { index, relevance_score: score });
		}
	}

	out.sort_by(|left, right| {
		right.relevance_score.partial_cmp(&left.relevance_score).unwrap_or(Ordering::Equal)
	});
	out.truncate(top_n);

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_original_indices_sorted_by_score() {
		let json = serde_json::json!({
			"results": [
				{ "index": 1, "relevance_score": 0.2 },
				{ "index": 0, "relevance_score": 0.9 },
				{ "index": 2, "relevance_score": 0.5 }
			]
		});
		let results = parse_rerank_response(json, 3, 3).expect("parse failed");

		assert_eq!(
			results,
			vec![
				RerankResult { index: 0, relevance_score: 0.9 },
				RerankResult { index: 2, relevance_score: 0.5 },
				RerankResult { index: 1, relevance_score: 0.2 },
			]
		);
	}

	#[test]
	fn truncates_to_top_n_and_drops_unknown_indices() {
		let json = serde_json::json!({
			"data": [
				{ "index": 7, "score": 0.99 },
				{ "index": 0, "score": 0.4 },
				{ "index": 1, "score": 0.8 }
			]
		});
		let results = parse_rerank_response(json, 2, 1).expect("parse failed");

		assert_eq!(results, vec![RerankResult { index: 1, relevance_score: 0.8 }]);
	}

	#[test]
	fn missing_results_is_an_error() {
		let err = parse_rerank_response(serde_json::json!({ "id": "x" }), 2, 2)
			.expect_err("Expected parse error.");

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}
}

use std::{cmp::Ordering, time::Duration};

use angelos_config::ProviderConfig;
use angelos_domain::{Language, RerankResult};

use crate::{AngelosService, Error, Result};

impl AngelosService {
	/// Scores `documents` against `query` on the endpoint matching `language`. Never fails: when
	/// the endpoint is unavailable the documents keep their input order with the configured
	/// fallback score.
	pub async fn rerank(
		&self,
		query: &str,
		documents: &[String],
		language: Language,
		top_n: usize,
	) -> Vec<RerankResult> {
		if documents.is_empty() || top_n == 0 {
			return Vec::new();
		}

		let rerank_cfg = &self.cfg.providers.rerank;
		let endpoint =
			if language.is_english() { &rerank_cfg.english } else { &rerank_cfg.multilingual };

		match self.try_rerank(endpoint, query, documents, top_n).await {
			Ok(results) => results,
			Err(err) => {
				tracing::warn!(
					error = %err,
					provider_id = %endpoint.provider_id,
					model = %endpoint.model,
					language = language.as_str(),
					documents = documents.len(),
					"Rerank failed. Falling back to retrieval order; answer quality may degrade."
				);

				identity_fallback(documents.len(), top_n, rerank_cfg.fallback_score)
			},
		}
	}

	async fn try_rerank(
		&self,
		cfg: &ProviderConfig,
		query: &str,
		documents: &[String],
		top_n: usize,
	) -> Result<Vec<RerankResult>> {
		let mut results = tokio::time::timeout(
			Duration::from_millis(cfg.timeout_ms),
			self.providers.rerank.rerank(cfg, query, documents, top_n),
		)
		.await
		.map_err(|_| Error::Rerank {
			message: format!("Rerank provider timed out after {} ms.", cfg.timeout_ms),
		})?
		.map_err(|err| Error::Rerank { message: err.to_string() })?;

		results.retain(|result| result.index < documents.len());
		results.sort_by(|left, right| {
			right.relevance_score.partial_cmp(&left.relevance_score).unwrap_or(Ordering::Equal)
		});
		results.truncate(top_n);

		Ok(results)
	}
}

/// Input order preserved, `min(top_n, doc_count)` entries, all scored `score`.
pub fn identity_fallback(doc_count: usize, top_n: usize, score: f32) -> Vec<RerankResult> {
	(0..doc_count.min(top_n)).map(|index| RerankResult { index, relevance_score: score }).collect()
}

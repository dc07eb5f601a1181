use std::time::Duration;

use crate::{AngelosService, Error, Result};

impl AngelosService {
	/// Embeds one query text. Retries transient failures with a linear backoff; exhausting the
	/// attempts is fatal for the request.
	pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let attempts = cfg.max_attempts.max(1);
		let texts = [text.to_string()];
		let mut last_err = None;

		for attempt in 1..=attempts {
			match self.embed_attempt(&texts).await {
				Ok(vector) => return Ok(vector),
				Err(err) => {
					tracing::warn!(
						error = %err,
						attempt,
						max_attempts = attempts,
						"Query embedding attempt failed."
					);

					last_err = Some(err);
				},
			}

			if attempt < attempts {
				tokio::time::sleep(Duration::from_millis(
					cfg.retry_backoff_ms.saturating_mul(attempt as u64),
				))
				.await;
			}
		}

		Err(last_err.unwrap_or_else(|| Error::Embedding {
			message: "No embedding attempt was made.".to_string(),
		}))
	}

	async fn embed_attempt(&self, texts: &[String]) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let timeout = Duration::from_millis(cfg.timeout_ms);
		let vectors = tokio::time::timeout(timeout, self.providers.embedding.embed(cfg, texts))
			.await
			.map_err(|_| Error::Embedding {
				message: format!("Embedding provider timed out after {} ms.", cfg.timeout_ms),
			})?
			.map_err(|err| Error::Embedding { message: err.to_string() })?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Embedding {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};
		let expected = self.cfg.storage.qdrant.vector_dim as usize;

		if vector.len() != expected {
			return Err(Error::Embedding {
				message: format!(
					"Embedding dimension mismatch: expected {expected}, got {}.",
					vector.len()
				),
			});
		}

		Ok(vector)
	}
}

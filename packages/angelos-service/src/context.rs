use std::time::Duration;

use angelos_domain::ContentChunk;
use angelos_storage::qdrant::ScopeFilter;

use crate::{AngelosService, Error, Result};

impl AngelosService {
	/// Passages nearest to `query_vector` inside one scope. Failures degrade to an empty list so
	/// one unavailable scope never fails the whole request.
	pub async fn get_relevant_context(
		&self,
		query_vector: &[f32],
		study_program: &str,
		org_id: Option<i64>,
		limit: u32,
		filter_by_org: bool,
	) -> Vec<ContentChunk> {
		match self
			.try_relevant_context(query_vector, study_program, org_id, limit, filter_by_org)
			.await
		{
			Ok(chunks) => chunks,
			Err(err) => {
				tracing::warn!(
					error = %err,
					study_program,
					org_id,
					"Scoped retrieval failed. Continuing without this scope."
				);

				Vec::new()
			},
		}
	}

	pub async fn try_relevant_context(
		&self,
		query_vector: &[f32],
		study_program: &str,
		org_id: Option<i64>,
		limit: u32,
		filter_by_org: bool,
	) -> Result<Vec<ContentChunk>> {
		let scope = ScopeFilter::new(study_program, org_id, filter_by_org);
		let timeout_ms = self.cfg.storage.qdrant.timeout_ms;
		let chunks = tokio::time::timeout(
			Duration::from_millis(timeout_ms),
			self.store.search_documents(query_vector, &scope, limit as u64),
		)
		.await
		.map_err(|_| Error::Retrieval {
			message: format!(
				"Search in scope {} timed out after {timeout_ms} ms.",
				scope.study_program
			),
		})?
		.map_err(|err| Error::Retrieval { message: err.to_string() })?;

		tracing::debug!(
			study_program = %scope.study_program,
			org_id = scope.org_id,
			hits = chunks.len(),
			"Scoped retrieval finished."
		);

		Ok(chunks)
	}
}

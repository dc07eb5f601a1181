use std::time::Duration;

use angelos_domain::{Language, RerankResult, SampleQa};

use crate::AngelosService;

impl AngelosService {
	/// Up to `sample_questions.top_n` exemplars of the organization, most relevant first.
	pub async fn get_relevant_sample_questions(
		&self,
		query: &str,
		query_vector: &[f32],
		language: Language,
		org_id: i64,
	) -> Vec<SampleQa> {
		let candidates = self.search_sample_questions(query_vector, org_id).await;

		self.rank_sample_questions(query, candidates, language).await
	}

	pub async fn search_sample_questions(
		&self,
		query_vector: &[f32],
		org_id: i64,
	) -> Vec<SampleQa> {
		let limit = self.cfg.sample_questions.limit as u64;
		let timeout_ms = self.cfg.storage.qdrant.timeout_ms;

		match tokio::time::timeout(
			Duration::from_millis(timeout_ms),
			self.store.search_sample_questions(query_vector, org_id, limit),
		)
		.await
		{
			Ok(Ok(samples)) => samples,
			Ok(Err(err)) => {
				tracing::warn!(error = %err, org_id, "Sample question search failed.");

				Vec::new()
			},
			Err(_) => {
				tracing::warn!(org_id, timeout_ms, "Sample question search timed out.");

				Vec::new()
			},
		}
	}

	pub async fn rank_sample_questions(
		&self,
		query: &str,
		candidates: Vec<SampleQa>,
		language: Language,
	) -> Vec<SampleQa> {
		if candidates.is_empty() {
			return Vec::new();
		}

		let settings = &self.cfg.sample_questions;
		let corpus = sample_corpus(&candidates, language);
		let results = self.rerank(query, &corpus, language, settings.top_n as usize).await;

		select_sample_questions(candidates, &results, settings.min_relevance_score)
	}
}

/// Rerank documents for exemplars, labelled in the conversation language.
pub fn sample_corpus(samples: &[SampleQa], language: Language) -> Vec<String> {
	let (question_label, answer_label) = match language {
		Language::English => ("Question", "Answer"),
		Language::German => ("Frage", "Antwort"),
	};

	samples
		.iter()
		.map(|sample| {
			format!("{question_label}: {}\n{answer_label}: {}", sample.question, sample.answer)
		})
		.collect()
}

/// Exemplars in rank order whose score reaches `min_relevance_score`. Each exemplar appears once.
pub fn select_sample_questions(
	samples: Vec<SampleQa>,
	results: &[RerankResult],
	min_relevance_score: f32,
) -> Vec<SampleQa> {
	let mut slots: Vec<Option<SampleQa>> = samples.into_iter().map(Some).collect();

	results
		.iter()
		.filter(|result| result.relevance_score >= min_relevance_score)
		.filter_map(|result| slots.get_mut(result.index).and_then(Option::take))
		.collect()
}

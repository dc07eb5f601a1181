use std::time::Duration;

use serde::{Deserialize, Serialize};

use angelos_domain::{ChatTurn, ContentChunk, ContextBundle, Language, SampleQa, is_general_program};

use crate::{
	AngelosService, Error, Result, ScopedResults, aggregate,
	assemble::{AssemblyPolicy, assemble_contexts},
	chat_query::build_chat_queries,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
	pub messages: Vec<ChatTurn>,
	/// Falls back to the general program when absent.
	#[serde(default)]
	pub study_program: Option<String>,
	pub org_id: i64,
	#[serde(default = "default_filter_by_org")]
	pub filter_by_org: bool,
	/// Detected from the last user message when absent.
	#[serde(default)]
	pub language: Option<Language>,
}
impl ChatRequest {
	/// A single-question request with organization filtering on.
	pub fn question(text: impl Into<String>, study_program: Option<String>, org_id: i64) -> Self {
		Self {
			messages: vec![ChatTurn::user(text)],
			study_program,
			org_id,
			filter_by_org: true,
			language: None,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatContext {
	pub bundle: ContextBundle,
	pub sample_questions: Vec<SampleQa>,
	pub language: Language,
	pub primary_query: String,
	pub history_query: Option<String>,
}

impl AngelosService {
	/// Retrieves, reranks and assembles the grounding context for the latest user message.
	///
	/// Only embedding failures, invalid input and the overall deadline fail the request; every
	/// search or rerank problem degrades to fewer or fallback-ordered passages instead.
	pub async fn chat_context(&self, req: ChatRequest) -> Result<ChatContext> {
		let timeout_ms = self.cfg.retrieval.request_timeout_ms;

		match tokio::time::timeout(Duration::from_millis(timeout_ms), self.build_chat_context(&req))
			.await
		{
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(org_id = req.org_id, timeout_ms, "Chat context request timed out.");

				Err(Error::Timeout {
					message: format!("Chat context was not ready within {timeout_ms} ms."),
				})
			},
		}
	}

	async fn build_chat_context(&self, req: &ChatRequest) -> Result<ChatContext> {
		let retrieval = &self.cfg.retrieval;
		let general = retrieval.general_program.as_str();
		let study_program = req
			.study_program
			.as_deref()
			.map(str::trim)
			.filter(|program| !program.is_empty())
			.unwrap_or(general);
		let queries = build_chat_queries(&req.messages, study_program, retrieval)?;
		let language =
			req.language.unwrap_or_else(|| Language::detect(&queries.last_user_message));
		let (primary_vector, history_vector) = tokio::try_join!(
			self.embed_query(&queries.primary_query),
			self.embed_optional(queries.history_query.as_deref()),
		)?;
		let specific = (!is_general_program(study_program, general)).then_some(study_program);
		let org_id = Some(req.org_id);
		let filter_by_org = req.filter_by_org;
		let (general_primary, general_history, specific_primary, specific_history, samples) =
			tokio::join!(
				self.scoped_context(
					Some(primary_vector.as_slice()),
					Some(general),
					org_id,
					queries.primary_limit,
					filter_by_org
				),
				self.scoped_context(
					history_vector.as_deref(),
					Some(general),
					org_id,
					queries.history_limit,
					filter_by_org
				),
				self.scoped_context(
					Some(primary_vector.as_slice()),
					specific,
					org_id,
					queries.primary_limit,
					filter_by_org
				),
				self.scoped_context(
					history_vector.as_deref(),
					specific,
					org_id,
					queries.history_limit,
					filter_by_org
				),
				self.search_sample_questions(&primary_vector, req.org_id),
			);
		let candidates = aggregate(ScopedResults {
			general_primary,
			general_history,
			specific_primary,
			specific_history,
		});
		let documents: Vec<String> =
			candidates.iter().map(|candidate| candidate.content.clone()).collect();
		let top_n = documents.len().min(retrieval.max_rerank_candidates as usize);
		let (rerank_results, sample_questions) = tokio::join!(
			self.rerank(&queries.primary_query, &documents, language, top_n),
			self.rank_sample_questions(&queries.last_user_message, samples, language),
		);
		let bundle =
			assemble_contexts(candidates, &rerank_results, &AssemblyPolicy::from_config(retrieval));

		tracing::info!(
			org_id = req.org_id,
			study_program,
			language = language.as_str(),
			candidates = documents.len(),
			general = bundle.general_count,
			specific = bundle.specific_count,
			sample_questions = sample_questions.len(),
			"Chat context assembled."
		);

		Ok(ChatContext {
			bundle,
			sample_questions,
			language,
			primary_query: queries.primary_query,
			history_query: queries.history_query,
		})
	}

	async fn embed_optional(&self, text: Option<&str>) -> Result<Option<Vec<f32>>> {
		match text {
			Some(text) => self.embed_query(text).await.map(Some),
			None => Ok(None),
		}
	}

	/// Skipped slots (no history query, or no specific program) resolve to an empty list.
	async fn scoped_context(
		&self,
		vector: Option<&[f32]>,
		study_program: Option<&str>,
		org_id: Option<i64>,
		limit: u32,
		filter_by_org: bool,
	) -> Vec<ContentChunk> {
		match (vector, study_program) {
			(Some(vector), Some(study_program)) =>
				self.get_relevant_context(vector, study_program, org_id, limit, filter_by_org).await,
			_ => Vec::new(),
		}
	}
}

fn default_filter_by_org() -> bool {
	true
}

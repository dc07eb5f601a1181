use std::{collections::HashMap, time::Duration};

use qdrant_client::qdrant::{Condition, Filter, Query, QueryPointsBuilder, ScoredPoint, Value, value::Kind};

use angelos_domain::{ContentChunk, SampleQa, normalize_study_program};

use crate::{
	Error, Result,
	schema::{document, sample_question},
};

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub documents_collection: String,
	pub qa_collection: String,
	pub vector_name: Option<String>,
}
impl QdrantStore {
	pub fn new(cfg: &angelos_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url)
			.api_key(cfg.api_key.clone())
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self {
			client,
			documents_collection: cfg.documents_collection.clone(),
			qa_collection: cfg.qa_collection.clone(),
			vector_name: cfg.vector_name.clone(),
		})
	}

	/// Nearest passages inside one (study program, organization) scope.
	pub async fn search_documents(
		&self,
		vector: &[f32],
		scope: &ScopeFilter,
		limit: u64,
	) -> Result<Vec<ContentChunk>> {
		let points =
			self.nearest(&self.documents_collection, vector, scope.to_filter(), limit).await?;

		Ok(decode_chunks(&points))
	}

	/// Nearest exemplars of one organization. Exemplars are not filtered by study program.
	pub async fn search_sample_questions(
		&self,
		vector: &[f32],
		org_id: i64,
		limit: u64,
	) -> Result<Vec<SampleQa>> {
		let filter = Filter::must([Condition::matches(sample_question::ORG_ID, org_id)]);
		let points = self.nearest(&self.qa_collection, vector, filter, limit).await?;

		Ok(decode_sample_questions(&points))
	}

	async fn nearest(
		&self,
		collection: &str,
		vector: &[f32],
		filter: Filter,
		limit: u64,
	) -> Result<Vec<ScoredPoint>> {
		if vector.is_empty() {
			return Err(Error::InvalidArgument("Query vector must be non-empty.".to_string()));
		}
		if limit == 0 {
			return Ok(Vec::new());
		}

		let mut search = QueryPointsBuilder::new(collection)
			.query(Query::new_nearest(vector.to_vec()))
			.filter(filter)
			.limit(limit)
			.with_payload(true);

		if let Some(name) = self.vector_name.as_deref() {
			search = search.using(name);
		}

		let response = self.client.query(search).await?;

		Ok(response.result)
	}
}

/// Restricts a passage search to one study program and, optionally, one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFilter {
	pub study_program: String,
	pub org_id: Option<i64>,
}
impl ScopeFilter {
	pub fn new(study_program: &str, org_id: Option<i64>, filter_by_org: bool) -> Self {
		Self {
			study_program: normalize_study_program(study_program),
			org_id: if filter_by_org { org_id } else { None },
		}
	}

	/// `study_programs` is an array payload; a keyword match on an array field holds when any
	/// element equals the value.
	pub fn to_filter(&self) -> Filter {
		let mut must =
			vec![Condition::matches(document::STUDY_PROGRAMS, self.study_program.clone())];

		if let Some(org_id) = self.org_id {
			must.push(Condition::matches(document::ORG_ID, org_id));
		}

		Filter::must(must)
	}
}

pub fn decode_chunks(points: &[ScoredPoint]) -> Vec<ContentChunk> {
	points.iter().filter_map(|point| decode_chunk(&point.payload)).collect()
}

pub fn decode_sample_questions(points: &[ScoredPoint]) -> Vec<SampleQa> {
	points.iter().filter_map(|point| decode_sample_question(&point.payload)).collect()
}

fn decode_chunk(payload: &HashMap<String, Value>) -> Option<ContentChunk> {
	let Some(content) = payload_string(payload, document::CONTENT) else {
		tracing::debug!("Skipping passage without content.");

		return None;
	};

	Some(ContentChunk {
		kb_id: payload_string(payload, document::KB_ID),
		content,
		link: payload_string(payload, document::LINK).filter(|link| !link.trim().is_empty()),
		study_programs: payload_string_list(payload, document::STUDY_PROGRAMS),
		org_id: payload_i64(payload, document::ORG_ID),
	})
}

fn decode_sample_question(payload: &HashMap<String, Value>) -> Option<SampleQa> {
	let (Some(question), Some(answer)) = (
		payload_string(payload, sample_question::QUESTION),
		payload_string(payload, sample_question::ANSWER),
	) else {
		tracing::debug!("Skipping sample question without question or answer.");

		return None;
	};

	Some(SampleQa {
		kb_id: payload_string(payload, sample_question::KB_ID),
		topic: payload_string(payload, sample_question::TOPIC).unwrap_or_default(),
		question,
		answer,
		study_programs: payload_string_list(payload, sample_question::STUDY_PROGRAMS),
		org_id: payload_i64(payload, sample_question::ORG_ID),
	})
}

pub fn payload_string(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.to_string()),
		_ => None,
	}
}

pub fn payload_i64(payload: &HashMap<String, Value>, key: &str) -> Option<i64> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::IntegerValue(value)) => Some(*value),
		Some(Kind::DoubleValue(value)) =>
			if value.fract() == 0.0 {
				Some(*value as i64)
			} else {
				None
			},
		_ => None,
	}
}

pub fn payload_string_list(payload: &HashMap<String, Value>, key: &str) -> Vec<String> {
	let Some(value) = payload.get(key) else {
		return Vec::new();
	};

	match &value.kind {
		Some(Kind::ListValue(list)) => list
			.values
			.iter()
			.filter_map(|item| match &item.kind {
				Some(Kind::StringValue(text)) => Some(text.to_string()),
				_ => None,
			})
			.collect(),
		Some(Kind::StringValue(text)) => vec![text.to_string()],
		_ => Vec::new(),
	}
}

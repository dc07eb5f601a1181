use serde::{Deserialize, Serialize};

/// A passage stored in the document collection. Written by ingestion, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentChunk {
	pub kb_id: Option<String>,
	pub content: String,
	pub link: Option<String>,
	#[serde(default)]
	pub study_programs: Vec<String>,
	pub org_id: Option<i64>,
}
impl ContentChunk {
	pub fn new(content: impl Into<String>, link: Option<String>) -> Self {
		Self { kb_id: None, content: content.into(), link, study_programs: Vec::new(), org_id: None }
	}
}

/// An exemplar question/answer pair stored in the QA collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleQa {
	pub kb_id: Option<String>,
	pub topic: String,
	pub question: String,
	pub answer: String,
	#[serde(default)]
	pub study_programs: Vec<String>,
	pub org_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	General,
	Specific,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	pub content: String,
	pub link: Option<String>,
	pub category: Category,
	pub relevance_score: Option<f32>,
}
impl Candidate {
	pub fn from_chunk(chunk: ContentChunk, category: Category) -> Self {
		Self { content: chunk.content, link: chunk.link, category, relevance_score: None }
	}
}

/// One scored entry returned by the rerank service. `index` points into the submitted document
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
	pub index: usize,
	pub relevance_score: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBundle {
	pub general_context: String,
	pub specific_context: String,
	pub general_count: usize,
	pub specific_count: usize,
	/// Source links of the selected general passages, in context order. Passages without a link
	/// contribute nothing.
	#[serde(default)]
	pub general_links: Vec<String>,
	#[serde(default)]
	pub specific_links: Vec<String>,
}
impl ContextBundle {
	pub fn is_empty(&self) -> bool {
		self.general_count == 0 && self.specific_count == 0
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
	User,
	Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
	pub text: String,
	pub sender: Sender,
}
impl ChatTurn {
	pub fn user(text: impl Into<String>) -> Self {
		Self { text: text.into(), sender: Sender::User }
	}

	pub fn assistant(text: impl Into<String>) -> Self {
		Self { text: text.into(), sender: Sender::Assistant }
	}
}

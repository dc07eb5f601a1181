//! Payload field names of the collections maintained by the ingestion service.

/// Passage collection.
pub mod document {
	pub const KB_ID: &str = "kb_id";
	pub const CONTENT: &str = "content";
	pub const LINK: &str = "link";
	pub const STUDY_PROGRAMS: &str = "study_programs";
	pub const ORG_ID: &str = "org_id";
}

/// Exemplar question/answer collection.
pub mod sample_question {
	pub const KB_ID: &str = "kb_id";
	pub const TOPIC: &str = "topic";
	pub const QUESTION: &str = "question";
	pub const ANSWER: &str = "answer";
	pub const STUDY_PROGRAMS: &str = "study_programs";
	pub const ORG_ID: &str = "org_id";
}

use angelos_domain::{
	Candidate, Category, ChatTurn, ContentChunk, ContextBundle, Language, Sender,
	display_study_program, normalize_study_program,
};

#[test]
fn normalizes_study_program_names() {
	assert_eq!(normalize_study_program("Information Systems"), "information-systems");
	assert_eq!(normalize_study_program("  Management  "), "management");
	assert_eq!(normalize_study_program("general"), "general");
}

#[test]
fn normalization_is_idempotent() {
	for raw in ["Information Systems", " Data Engineering and Analytics ", "general", ""] {
		let once = normalize_study_program(raw);

		assert_eq!(normalize_study_program(&once), once);
	}
}

#[test]
fn display_form_inverts_normalization_for_simple_names() {
	let normalized = normalize_study_program("Information Systems");

	assert_eq!(display_study_program(&normalized), "Information Systems");
}

#[test]
fn detects_german_and_defaults_to_english() {
	let german = "Wann ist die Bewerbungsfrist für den Masterstudiengang und welche Unterlagen \
	              muss ich einreichen? Ich möchte mich im Sommersemester an der Hochschule \
	              einschreiben.";
	let english = "When is the application deadline for the master's program and which \
	               documents do I need to submit?";

	assert_eq!(Language::detect(german), Language::German);
	assert_eq!(Language::detect(english), Language::English);
	assert_eq!(Language::detect(""), Language::English);
	assert!(Language::default().is_english());
}

#[test]
fn short_ambiguous_questions_stay_english() {
	for text in ["When?", "Hi", "Exam dates?", "ok"] {
		assert_eq!(Language::detect(text), Language::English, "Misrouted {text:?}.");
	}
}

#[test]
fn chat_turns_use_lowercase_senders() {
	let turn: ChatTurn =
		serde_json::from_value(serde_json::json!({ "text": "Hi", "sender": "assistant" }))
			.expect("Failed to parse chat turn.");

	assert_eq!(turn.sender, Sender::Assistant);
	assert_eq!(
		serde_json::to_value(ChatTurn::user("Hello")).expect("Failed to serialize chat turn."),
		serde_json::json!({ "text": "Hello", "sender": "user" })
	);
}

#[test]
fn candidates_start_without_a_score() {
	let chunk = ContentChunk::new("Exam rules", Some("https://example.org/exams".to_string()));
	let candidate = Candidate::from_chunk(chunk, Category::Specific);

	assert_eq!(candidate.relevance_score, None);
	assert_eq!(candidate.category, Category::Specific);
	assert_eq!(candidate.link.as_deref(), Some("https://example.org/exams"));
}

#[test]
fn empty_bundle_reports_no_context() {
	assert!(ContextBundle::default().is_empty());

	let bundle = ContextBundle {
		general_context: "Link: -\nContent: A".to_string(),
		specific_context: String::new(),
		general_count: 1,
		specific_count: 0,
		general_links: Vec::new(),
		specific_links: Vec::new(),
	};

	assert!(!bundle.is_empty());
}

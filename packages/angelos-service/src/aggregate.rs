use angelos_domain::{Candidate, Category, ContentChunk};

/// Search results keyed by the slot they were dispatched for. Aggregation reads the slots in a
/// fixed order, so completion order of the concurrent searches never shows in the output.
#[derive(Debug, Default)]
pub struct ScopedResults {
	pub general_primary: Vec<ContentChunk>,
	pub general_history: Vec<ContentChunk>,
	pub specific_primary: Vec<ContentChunk>,
	pub specific_history: Vec<ContentChunk>,
}
impl ScopedResults {
	pub fn into_scopes(self) -> Vec<(Vec<ContentChunk>, Category)> {
		vec![
			(self.general_primary, Category::General),
			(self.general_history, Category::General),
			(self.specific_primary, Category::Specific),
			(self.specific_history, Category::Specific),
		]
	}
}

pub fn aggregate(results: ScopedResults) -> Vec<Candidate> {
	aggregate_scopes(results.into_scopes())
}

/// Flattens scopes in the given order, tagging each chunk with its scope's category. No
/// deduplication happens here.
pub fn aggregate_scopes(scopes: Vec<(Vec<ContentChunk>, Category)>) -> Vec<Candidate> {
	let total = scopes.iter().map(|(chunks, _)| chunks.len()).sum();
	let mut candidates = Vec::with_capacity(total);

	for (chunks, category) in scopes {
		candidates.extend(chunks.into_iter().map(|chunk| Candidate::from_chunk(chunk, category)));
	}

	candidates
}

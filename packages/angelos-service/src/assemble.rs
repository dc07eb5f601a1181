use std::{cmp::Ordering, collections::HashSet};

use angelos_config::Retrieval;
use angelos_domain::{Candidate, Category, ContextBundle, RerankResult};

pub const CONTEXT_SEPARATOR: &str = "\n-----\n";

/// Per-category relevance floor (inclusive) and item cap.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPolicy {
	pub general_threshold: f32,
	pub specific_threshold: f32,
	pub max_general: usize,
	pub max_specific: usize,
}
impl AssemblyPolicy {
	pub fn from_config(retrieval: &Retrieval) -> Self {
		Self {
			general_threshold: retrieval.general_threshold,
			specific_threshold: retrieval.specific_threshold,
			max_general: retrieval.max_general as usize,
			max_specific: retrieval.max_specific as usize,
		}
	}

	fn threshold(&self, category: Category) -> f32 {
		match category {
			Category::General => self.general_threshold,
			Category::Specific => self.specific_threshold,
		}
	}

	fn cap(&self, category: Category) -> usize {
		match category {
			Category::General => self.max_general,
			Category::Specific => self.max_specific,
		}
	}
}
impl Default for AssemblyPolicy {
	fn default() -> Self {
		Self::from_config(&Retrieval::default())
	}
}

/// Builds the general and specific context blocks from reranked candidates.
///
/// `rerank_results` index into `candidates`. Candidates the reranker did not return, and results
/// pointing outside `candidates`, are dropped. Within each category, items below the threshold are
/// removed, repeated content keeps only its highest-ranked occurrence, and the list is capped.
pub fn assemble_contexts(
	candidates: Vec<Candidate>,
	rerank_results: &[RerankResult],
	policy: &AssemblyPolicy,
) -> ContextBundle {
	let ranked = rank_candidates(&candidates, rerank_results);
	let general = select(&ranked, Category::General, policy);
	let specific = select(&ranked, Category::Specific, policy);

	ContextBundle {
		general_context: format_context(&general),
		specific_context: format_context(&specific),
		general_count: general.len(),
		specific_count: specific.len(),
		general_links: source_links(&general),
		specific_links: source_links(&specific),
	}
}

fn rank_candidates(candidates: &[Candidate], rerank_results: &[RerankResult]) -> Vec<Candidate> {
	let mut ranked: Vec<Candidate> = rerank_results
		.iter()
		.filter_map(|result| {
			candidates.get(result.index).map(|candidate| Candidate {
				relevance_score: Some(result.relevance_score),
				..candidate.clone()
			})
		})
		.collect();

	// Stable, so equal scores keep the reranker's order.
	ranked.sort_by(|left, right| {
		score_of(right).partial_cmp(&score_of(left)).unwrap_or(Ordering::Equal)
	});

	ranked
}

fn select<'a>(
	ranked: &'a [Candidate],
	category: Category,
	policy: &AssemblyPolicy,
) -> Vec<&'a Candidate> {
	let threshold = policy.threshold(category);
	let cap = policy.cap(category);
	let mut seen = HashSet::new();
	let mut selected = Vec::new();

	for candidate in ranked {
		if selected.len() >= cap {
			break;
		}
		let score = score_of(candidate);

		if candidate.category != category || score.is_nan() || score < threshold {
			continue;
		}
		if seen.insert(candidate.content.as_str()) {
			selected.push(candidate);
		}
	}

	selected
}

fn source_links(candidates: &[&Candidate]) -> Vec<String> {
	candidates
		.iter()
		.filter_map(|candidate| candidate_link(candidate))
		.map(str::to_string)
		.collect()
}

fn candidate_link(candidate: &Candidate) -> Option<&str> {
	candidate.link.as_deref().filter(|link| !link.trim().is_empty())
}

fn score_of(candidate: &Candidate) -> f32 {
	candidate.relevance_score.unwrap_or(f32::NEG_INFINITY)
}

pub fn format_context(candidates: &[&Candidate]) -> String {
	candidates
		.iter()
		.map(|candidate| {
			let link = candidate_link(candidate).unwrap_or("-");

			format!("Link: {link}\nContent: {}", candidate.content)
		})
		.collect::<Vec<_>>()
		.join(CONTEXT_SEPARATOR)
}

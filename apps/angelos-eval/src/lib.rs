mod cli;

pub use cli::{VERSION, styles};

use std::{
	collections::HashSet,
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use angelos_config::Config;
use angelos_domain::{ChatTurn, ContextBundle, Language};
use angelos_service::{AngelosService, ChatContext, ChatRequest};
use angelos_storage::qdrant::QdrantStore;

#[derive(Debug, Parser)]
#[command(version = VERSION, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	/// Pretty-print the JSON report.
	#[arg(long)]
	pub pretty: bool,
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	defaults: Option<EvalDefaults>,
	requests: Vec<EvalRequest>,
}

#[derive(Debug, Default, Deserialize, Clone)]
struct EvalDefaults {
	org_id: Option<i64>,
	study_program: Option<String>,
	filter_by_org: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct EvalRequest {
	id: Option<String>,
	messages: Vec<ChatTurn>,
	study_program: Option<String>,
	org_id: Option<i64>,
	filter_by_org: Option<bool>,
	language: Option<Language>,
	#[serde(default)]
	expected_links: Vec<String>,
}

#[derive(Debug)]
struct MergedRequest {
	id: String,
	request: ChatRequest,
	expected_links: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: EvalDatasetInfo,
	summary: EvalSummary,
	requests: Vec<RequestReport>,
}

#[derive(Debug, Serialize)]
struct EvalDatasetInfo {
	name: String,
	config_path: String,
	request_count: usize,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	#[serde(skip_serializing_if = "Option::is_none")]
	mean_link_recall: Option<f64>,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
	error_count: usize,
}

#[derive(Debug, Default, Serialize)]
struct RequestReport {
	id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	language: Option<Language>,
	#[serde(skip_serializing_if = "Option::is_none")]
	primary_query: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	history_query: Option<String>,
	general_count: usize,
	specific_count: usize,
	general_context: String,
	specific_context: String,
	sample_questions: Vec<String>,
	latency_ms: f64,
	expected_links: Vec<String>,
	retrieved_links: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	link_recall: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = angelos_config::load(&args.config)?;

	init_tracing(&config);

	let dataset = load_dataset(&args.dataset)?;
	let output = eval_config(&args.config, config, &dataset).await?;
	let json = if args.pretty {
		serde_json::to_string_pretty(&output)?
	} else {
		serde_json::to_string(&output)?
	};

	println!("{json}");

	Ok(())
}

fn init_tracing(config: &Config) {
	let filter = EnvFilter::try_new(&config.service.log_level)
		.unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.requests.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one request."));
	}

	Ok(dataset)
}

async fn eval_config(
	config_path: &Path,
	config: Config,
	dataset: &EvalDataset,
) -> color_eyre::Result<EvalOutput> {
	let store = QdrantStore::new(&config.storage.qdrant)?;
	let service = AngelosService::new(config, store);
	let defaults = dataset.defaults.clone().unwrap_or_default();
	let mut reports = Vec::with_capacity(dataset.requests.len());
	let mut latencies_ms = Vec::with_capacity(dataset.requests.len());

	for (index, request) in dataset.requests.iter().enumerate() {
		let merged = merge_request(&defaults, request, index)?;
		let started = Instant::now();
		let result = service.chat_context(merged.request).await;
		let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
		let report = match result {
			Ok(context) => success_report(merged.id, context, merged.expected_links, latency_ms),
			Err(err) => {
				tracing::error!(error = %err, request_id = %merged.id, "Chat context failed.");

				RequestReport {
					id: merged.id,
					latency_ms,
					expected_links: merged.expected_links,
					error: Some(err.user_message().to_string()),
					..Default::default()
				}
			},
		};

		latencies_ms.push(latency_ms);
		reports.push(report);
	}

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "eval".to_string()),
			config_path: config_path.display().to_string(),
			request_count: reports.len(),
		},
		summary: summarize(&reports, &latencies_ms),
		requests: reports,
	})
}

fn merge_request(
	defaults: &EvalDefaults,
	request: &EvalRequest,
	index: usize,
) -> color_eyre::Result<MergedRequest> {
	let id = request.id.clone().unwrap_or_else(|| format!("request-{}", index + 1));
	let org_id = request
		.org_id
		.or(defaults.org_id)
		.ok_or_else(|| eyre::eyre!("Request {id} has no org_id and the dataset sets no default."))?;

	Ok(MergedRequest {
		request: ChatRequest {
			messages: request.messages.clone(),
			study_program: request.study_program.clone().or_else(|| defaults.study_program.clone()),
			org_id,
			filter_by_org: request.filter_by_org.or(defaults.filter_by_org).unwrap_or(true),
			language: request.language,
		},
		id,
		expected_links: request.expected_links.clone(),
	})
}

fn success_report(
	id: String,
	context: ChatContext,
	expected_links: Vec<String>,
	latency_ms: f64,
) -> RequestReport {
	let retrieved_links = context_links(&context.bundle);
	let link_recall = link_recall(&expected_links, &retrieved_links);

	RequestReport {
		id,
		language: Some(context.language),
		primary_query: Some(context.primary_query),
		history_query: context.history_query,
		general_count: context.bundle.general_count,
		specific_count: context.bundle.specific_count,
		general_context: context.bundle.general_context,
		specific_context: context.bundle.specific_context,
		sample_questions: context
			.sample_questions
			.into_iter()
			.map(|sample| sample.question)
			.collect(),
		latency_ms,
		expected_links,
		retrieved_links,
		link_recall,
		error: None,
	}
}

/// Source links of the selected passages across both blocks, first occurrence only.
fn context_links(bundle: &ContextBundle) -> Vec<String> {
	let mut seen = HashSet::new();

	bundle
		.general_links
		.iter()
		.chain(&bundle.specific_links)
		.filter(|link| seen.insert(link.as_str()))
		.cloned()
		.collect()
}

fn link_recall(expected: &[String], retrieved: &[String]) -> Option<f64> {
	let expected: HashSet<&str> = expected.iter().map(String::as_str).collect();

	if expected.is_empty() {
		return None;
	}

	let hits = retrieved.iter().filter(|link| expected.contains(link.as_str())).count();

	Some(hits as f64 / expected.len() as f64)
}

fn summarize(reports: &[RequestReport], latencies_ms: &[f64]) -> EvalSummary {
	let recalls: Vec<f64> = reports.iter().filter_map(|report| report.link_recall).collect();
	let mean_link_recall =
		(!recalls.is_empty()).then(|| recalls.iter().sum::<f64>() / recalls.len() as f64);
	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	EvalSummary {
		mean_link_recall,
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
		error_count: reports.iter().filter(|report| report.error.is_some()).count(),
	}
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn request(json: serde_json::Value) -> EvalRequest {
		serde_json::from_value(json).expect("Request must deserialize.")
	}

	#[test]
	fn loads_fixture_dataset() {
		let path =
			Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_dataset.json");
		let dataset = load_dataset(&path).expect("Fixture dataset must load.");

		assert_eq!(dataset.name.as_deref(), Some("advising-smoke"));
		assert_eq!(dataset.requests.len(), 3);
		assert_eq!(dataset.requests[2].language, Some(Language::German));
	}

	#[test]
	fn request_fields_override_dataset_defaults() {
		let defaults = EvalDefaults {
			org_id: Some(1),
			study_program: Some("informatics".to_string()),
			filter_by_org: Some(false),
		};
		let merged = merge_request(
			&defaults,
			&request(serde_json::json!({
				"messages": [{ "text": "Hi", "sender": "user" }],
				"org_id": 2
			})),
			0,
		)
		.expect("Request must merge.");

		assert_eq!(merged.id, "request-1");
		assert_eq!(merged.request.org_id, 2);
		assert_eq!(merged.request.study_program.as_deref(), Some("informatics"));
		assert!(!merged.request.filter_by_org);
	}

	#[test]
	fn missing_org_id_is_an_error() {
		let result = merge_request(
			&EvalDefaults::default(),
			&request(serde_json::json!({
				"id": "q1",
				"messages": [{ "text": "Hi", "sender": "user" }]
			})),
			0,
		);

		assert!(result.is_err());
	}

	#[test]
	fn merges_unique_links_from_both_blocks() {
		let bundle = ContextBundle {
			general_count: 2,
			specific_count: 2,
			general_links: vec!["https://a".to_string()],
			specific_links: vec!["https://a".to_string(), "https://b".to_string()],
			..Default::default()
		};

		assert_eq!(context_links(&bundle), vec!["https://a", "https://b"]);
	}

	#[test]
	fn link_lines_inside_content_are_not_sources() {
		let bundle = ContextBundle {
			general_context: "Link: -\nContent: See the office page.\nLink: https://not-a-source"
				.to_string(),
			general_count: 1,
			..Default::default()
		};

		assert!(context_links(&bundle).is_empty());
	}

	#[test]
	fn link_recall_counts_expected_hits() {
		let expected = vec!["https://a".to_string(), "https://b".to_string()];
		let retrieved = vec!["https://b".to_string(), "https://c".to_string()];

		assert_eq!(link_recall(&expected, &retrieved), Some(0.5));
		assert_eq!(link_recall(&[], &retrieved), None);
	}

	#[test]
	fn percentile_interpolates_between_ranks() {
		let values = vec![10.0, 20.0, 30.0, 40.0];

		assert_eq!(percentile(&values, 0.5), 25.0);
		assert_eq!(percentile(&values, 1.0), 40.0);
		assert_eq!(percentile(&[], 0.95), 0.0);
	}

	#[test]
	fn summary_skips_requests_without_expected_links() {
		let reports = vec![
			RequestReport { id: "a".to_string(), link_recall: Some(1.0), ..Default::default() },
			RequestReport { id: "b".to_string(), link_recall: None, ..Default::default() },
			RequestReport {
				id: "c".to_string(),
				error: Some("failed".to_string()),
				..Default::default()
			},
		];
		let summary = summarize(&reports, &[5.0, 15.0, 25.0]);

		assert_eq!(summary.mean_link_recall, Some(1.0));
		assert_eq!(summary.error_count, 1);
		assert_eq!(summary.latency_ms_p50, 15.0);
	}
}

pub mod aggregate;
pub mod assemble;
pub mod chat_query;
pub mod context;
pub mod embedder;
pub mod pipeline;
pub mod rerank;
pub mod sample_questions;

mod error;

pub use aggregate::{ScopedResults, aggregate, aggregate_scopes};
pub use assemble::{AssemblyPolicy, CONTEXT_SEPARATOR, assemble_contexts, format_context};
pub use chat_query::{ChatQueries, build_chat_queries};
pub use error::{Error, Result, USER_FACING_FAILURE};
pub use pipeline::{ChatContext, ChatRequest};

use std::{future::Future, pin::Pin, sync::Arc};

use reqwest::Client;

use angelos_config::{Config, EmbeddingProviderConfig, ProviderConfig};
use angelos_domain::{ContentChunk, RerankResult, SampleQa};
use angelos_providers::{embedding, rerank as rerank_api};
use angelos_storage::qdrant::{QdrantStore, ScopeFilter};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, angelos_providers::Result<Vec<Vec<f32>>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
		top_n: usize,
	) -> BoxFuture<'a, angelos_providers::Result<Vec<RerankResult>>>;
}

/// Read side of the vector index. Implemented by [`QdrantStore`] and by in-memory stores in tests.
pub trait ContentStore
where
	Self: Send + Sync,
{
	fn search_documents<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a ScopeFilter,
		limit: u64,
	) -> BoxFuture<'a, angelos_storage::Result<Vec<ContentChunk>>>;

	fn search_sample_questions<'a>(
		&'a self,
		vector: &'a [f32],
		org_id: i64,
		limit: u64,
	) -> BoxFuture<'a, angelos_storage::Result<Vec<SampleQa>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, rerank: Arc<dyn RerankProvider>) -> Self {
		Self { embedding, rerank }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders::default());

		Self { embedding: provider.clone(), rerank: provider }
	}
}

/// Talks to the configured HTTP endpoints through one pooled client.
#[derive(Default)]
pub struct HttpProviders {
	client: Client,
}
impl HttpProviders {
	pub fn new(client: Client) -> Self {
		Self { client }
	}
}
impl EmbeddingProvider for HttpProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, angelos_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(&self.client, cfg, texts))
	}
}
impl RerankProvider for HttpProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
		top_n: usize,
	) -> BoxFuture<'a, angelos_providers::Result<Vec<RerankResult>>> {
		Box::pin(rerank_api::rerank(&self.client, cfg, query, docs, top_n))
	}
}

impl ContentStore for QdrantStore {
	fn search_documents<'a>(
		&'a self,
		vector: &'a [f32],
		scope: &'a ScopeFilter,
		limit: u64,
	) -> BoxFuture<'a, angelos_storage::Result<Vec<ContentChunk>>> {
		Box::pin(QdrantStore::search_documents(self, vector, scope, limit))
	}

	fn search_sample_questions<'a>(
		&'a self,
		vector: &'a [f32],
		org_id: i64,
		limit: u64,
	) -> BoxFuture<'a, angelos_storage::Result<Vec<SampleQa>>> {
		Box::pin(QdrantStore::search_sample_questions(self, vector, org_id, limit))
	}
}

pub struct AngelosService {
	pub cfg: Config,
	pub store: Arc<dyn ContentStore>,
	pub providers: Providers,
}
impl AngelosService {
	pub fn new(cfg: Config, store: QdrantStore) -> Self {
		Self { cfg, store: Arc::new(store), providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn ContentStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}
}

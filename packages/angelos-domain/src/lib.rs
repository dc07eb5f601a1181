pub mod language;
pub mod model;
pub mod study_program;

pub use language::Language;
pub use model::{
	Candidate, Category, ChatTurn, ContentChunk, ContextBundle, RerankResult, SampleQa, Sender,
};
pub use study_program::{display_study_program, is_general_program, normalize_study_program};

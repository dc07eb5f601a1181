use angelos_config::Retrieval;
use angelos_domain::{ChatTurn, Sender, display_study_program, is_general_program};

use crate::{Error, Result};

/// Search queries derived from a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatQueries {
	pub last_user_message: String,
	pub primary_query: String,
	/// Present only for conversations longer than the short-conversation threshold.
	pub history_query: Option<String>,
	pub primary_limit: u32,
	pub history_limit: u32,
}

/// Short conversations search with the program-anchored question alone. Longer ones search the
/// bare question with a smaller limit plus a second, program-anchored query built from the most
/// recent user turns.
pub fn build_chat_queries(
	history: &[ChatTurn],
	study_program: &str,
	retrieval: &Retrieval,
) -> Result<ChatQueries> {
	let user_turns: Vec<&str> = history
		.iter()
		.filter(|turn| turn.sender == Sender::User)
		.map(|turn| turn.text.trim())
		.filter(|text| !text.is_empty())
		.collect();
	let Some(last_user_message) = user_turns.last().map(|text| text.to_string()) else {
		return Err(Error::InvalidRequest {
			message: "Conversation must contain at least one user message.".to_string(),
		});
	};
	let program = program_anchor(study_program, &retrieval.general_program);

	if history.len() <= retrieval.short_conversation_turns as usize {
		return Ok(ChatQueries {
			primary_query: anchored(program.as_deref(), &last_user_message),
			last_user_message,
			history_query: None,
			primary_limit: retrieval.primary_limit,
			history_limit: 0,
		});
	}

	let recent = user_turns.len().saturating_sub(retrieval.history_turns as usize);
	let history_text = user_turns[recent..].join(" ");

	Ok(ChatQueries {
		primary_query: last_user_message.clone(),
		last_user_message,
		history_query: Some(anchored(program.as_deref(), &history_text)),
		primary_limit: retrieval.history_primary_limit,
		history_limit: retrieval.history_limit,
	})
}

fn program_anchor(study_program: &str, general_program: &str) -> Option<String> {
	if is_general_program(study_program, general_program) {
		None
	} else {
		Some(display_study_program(study_program))
	}
}

fn anchored(program: Option<&str>, text: &str) -> String {
	match program {
		Some(program) => format!("{program}: {text}"),
		None => text.to_string(),
	}
}

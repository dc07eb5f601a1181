use serde::{Deserialize, Serialize};

/// Minimum detector confidence before a non-English guess is trusted.
const MIN_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
	#[default]
	English,
	German,
}
impl Language {
	/// Falls back to English for anything that is not confidently German, including input too
	/// short to classify.
	pub fn detect(text: &str) -> Self {
		let Some(info) = whatlang::detect(text) else {
			return Self::English;
		};

		if !info.is_reliable() || info.confidence() < MIN_CONFIDENCE {
			return Self::English;
		}

		match info.lang() {
			whatlang::Lang::Deu => Self::German,
			_ => Self::English,
		}
	}

	pub fn is_english(self) -> bool {
		self == Self::English
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::English => "english",
			Self::German => "german",
		}
	}
}

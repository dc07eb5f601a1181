/// Canonical form used in the `study_programs` payload array: trimmed, lowercase, with spaces
/// replaced by hyphens.
pub fn normalize_study_program(study_program: &str) -> String {
	study_program.trim().to_lowercase().replace(' ', "-")
}

/// Human-readable form used to anchor queries, e.g. "information-systems" becomes
/// "Information Systems".
pub fn display_study_program(study_program: &str) -> String {
	let spaced = study_program.trim().replace('-', " ");
	let mut out = String::with_capacity(spaced.len());

	for (i, word) in spaced.split(' ').enumerate() {
		if i > 0 {
			out.push(' ');
		}

		let mut chars = word.chars();

		if let Some(first) = chars.next() {
			out.extend(first.to_uppercase());
			out.push_str(&chars.as_str().to_lowercase());
		}
	}

	out
}

pub fn is_general_program(study_program: &str, general_program: &str) -> bool {
	let normalized = normalize_study_program(study_program);

	normalized.is_empty() || normalized == normalize_study_program(general_program)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn title_cases_each_word() {
		assert_eq!(display_study_program("information-systems"), "Information Systems");
		assert_eq!(display_study_program("MANAGEMENT-and-technology"), "Management And Technology");
	}

	#[test]
	fn empty_program_counts_as_general() {
		assert!(is_general_program("", "general"));
		assert!(is_general_program(" General ", "general"));
		assert!(!is_general_program("information-systems", "general"));
	}
}

//! Fuzzy similarity between book titles and author names.
//!
//! All scores are in `0.0..=1.0`. Inputs are normalized first: lowercased,
//! punctuation folded to spaces, a leading English article dropped, and runs
//! of whitespace collapsed.

use crate::candidate::Candidate;

/// Weight of title similarity when both sides name an author.
const TITLE_WEIGHT: f64 = 0.7;

/// Score for a query that prefixes a word of the field without equalling it.
const PREFIX_SCORE: f64 = 0.9;

const ARTICLES: [&str; 3] = ["the", "a", "an"];

/// Normalizes text for comparison.
pub fn normalize(text: &str) -> String {
	let folded: String = text.chars().map(|c| if c.is_alphanumeric() { c } else { ' ' }).flat_map(char::to_lowercase).collect();
	let mut words: Vec<&str> = folded.split_whitespace().collect();
	if words.len() > 1 && ARTICLES.contains(&words[0]) {
		words.remove(0);
	}
	words.join(" ")
}

/// Normalizes a personal name, turning "Last, First" into "first last".
pub fn normalize_author(name: &str) -> String {
	match name.split_once(',') {
		Some((last, first)) if !first.trim().is_empty() => normalize(&format!("{} {}", first.trim(), last.trim())),
		_ => normalize(name),
	}
}

/// Blend of edit distance and Jaro-Winkler over already normalized text.
fn blended(a: &str, b: &str) -> f64 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}
	(strsim::normalized_levenshtein(a, b) + strsim::jaro_winkler(a, b)) / 2.0
}

/// Drops a subtitle (`"Dune: Deluxe Edition"` -> `"Dune"`).
fn main_title(title: &str) -> Option<&str> {
	title.split_once(':').map(|(main, _)| main).filter(|main| !main.trim().is_empty())
}

/// Similarity of two titles, also trying each without its subtitle.
pub fn title_similarity(a: &str, b: &str) -> f64 {
	let variants = |title: &str| {
		let mut forms = vec![normalize(title)];
		if let Some(main) = main_title(title) {
			forms.push(normalize(main));
		}
		forms
	};

	let left = variants(a);
	let right = variants(b);
	let mut best = 0.0_f64;
	for l in &left {
		for r in &right {
			best = best.max(blended(l, r));
		}
	}
	best
}

/// Similarity of two author names, ignoring word order.
pub fn author_similarity(a: &str, b: &str) -> f64 {
	let a = normalize_author(a);
	let b = normalize_author(b);
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	let mut a_words: Vec<&str> = a.split(' ').collect();
	let mut b_words: Vec<&str> = b.split(' ').collect();
	a_words.sort_unstable();
	b_words.sort_unstable();
	if a_words == b_words {
		return 1.0;
	}
	strsim::jaro_winkler(&a, &b)
}

/// Scores how well `candidate` matches a known book.
///
/// Title similarity alone when either side lacks an author; otherwise a
/// weighted blend with the best matching candidate author.
pub fn match_score(title: &str, author: Option<&str>, candidate: &Candidate) -> f64 {
	let title_score = title_similarity(title, &candidate.title);
	let Some(author) = author.filter(|author| !author.trim().is_empty()) else {
		return title_score;
	};
	if candidate.authors.is_empty() {
		return title_score;
	}

	let author_score = candidate.authors.iter().map(|name| author_similarity(author, name)).fold(0.0, f64::max);
	TITLE_WEIGHT * title_score + (1.0 - TITLE_WEIGHT) * author_score
}

/// Scores one field against a partially typed query.
fn field_score(query: &str, field: &str) -> f64 {
	let field = normalize(field);
	if field.is_empty() {
		return 0.0;
	}
	if field == query {
		return 1.0;
	}
	if field.starts_with(query) || field.split(' ').any(|word| word.starts_with(query)) {
		return PREFIX_SCORE;
	}
	strsim::jaro_winkler(query, &field)
}

/// Scores a candidate against free-text input.
///
/// The query may name the title, an author, or a title followed by an author
/// (`"dune frank herbert"`); the best reading wins.
pub fn query_score(query: &str, candidate: &Candidate) -> f64 {
	let query = normalize(query);
	if query.is_empty() {
		return 0.0;
	}
	let title = normalize(&candidate.title);
	candidate
		.authors
		.iter()
		.map(|author| {
			let author = normalize_author(author);
			field_score(&query, &author).max(field_score(&query, &format!("{title} {author}")))
		})
		.fold(field_score(&query, &candidate.title), f64::max)
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("The Left Hand of Darkness", "left hand of darkness")]
	#[case("  Ender's   Game ", "ender s game")]
	#[case("A Fire Upon the Deep", "fire upon the deep")]
	#[case("The", "the")]
	#[case("Do Androids Dream of Electric Sheep?", "do androids dream of electric sheep")]
	#[case("ROADSIDE PICNIC", "roadside picnic")]
	fn normalizes(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize(input), expected);
	}

	#[rstest]
	#[case("Herbert, Frank", "frank herbert")]
	#[case("Ursula K. Le Guin", "ursula k le guin")]
	#[case("Lem,", "lem")]
	fn normalizes_authors(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(normalize_author(input), expected);
	}

	#[test]
	fn identical_titles_after_normalization_score_one() {
		assert_eq!(title_similarity("The Left Hand of Darkness", "Left Hand of Darkness"), 1.0);
		assert_eq!(title_similarity("Dune", "Dune: Deluxe Edition"), 1.0);
	}

	#[test]
	fn sequel_is_not_confused_with_original() {
		assert!(title_similarity("Dune", "Dune Messiah") < 0.75);
	}

	#[test]
	fn typo_still_scores_high() {
		assert!(title_similarity("Hyperion", "Hyperon") > 0.85);
	}

	#[test]
	fn unrelated_titles_score_low() {
		assert!(title_similarity("Foundation", "Neuromancer") < 0.5);
		assert_eq!(title_similarity("", "Neuromancer"), 0.0);
	}

	#[test]
	fn author_order_does_not_matter() {
		assert_eq!(author_similarity("Frank Herbert", "Herbert, Frank"), 1.0);
		assert!(author_similarity("Frank Herbert", "Brian Herbert") < 1.0);
	}

	#[test]
	fn author_breaks_title_ties() {
		let original = Candidate::new("Dune").with_author("Frank Herbert");
		let other = Candidate::new("Dune").with_author("Someone Else");
		let with_author = match_score("Dune", Some("Frank Herbert"), &original);
		assert_eq!(with_author, 1.0);
		assert!(match_score("Dune", Some("Frank Herbert"), &other) < with_author);
		assert_eq!(match_score("Dune", None, &other), 1.0);
	}

	#[rstest]
	#[case("Dune", 1.0)]
	#[case("dun", PREFIX_SCORE)]
	#[case("herb", PREFIX_SCORE)]
	#[case("frank herbert", 1.0)]
	#[case("dune frank herbert", 1.0)]
	fn query_matches_title_or_author(#[case] query: &str, #[case] expected: f64) {
		let candidate = Candidate::new("Dune").with_author("Herbert, Frank");
		assert_eq!(query_score(query, &candidate), expected);
	}

	#[test]
	fn blank_query_scores_zero() {
		assert_eq!(query_score("  ", &Candidate::new("Dune")), 0.0);
	}
}

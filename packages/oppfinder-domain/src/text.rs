use std::{collections::HashSet, fs, path::Path, sync::Arc};

use unicode_segmentation::UnicodeSegmentation;

use crate::{Error, Result};

/// Immutable stop-word list shared by the query builder and the text normalizer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StopWords {
	words: Arc<[String]>,
}
impl StopWords {
	/// Reads one stop word per line. Blank lines are skipped.
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::StopWords { path: path.to_path_buf(), source: err })?;

		Ok(Self::parse(&raw))
	}

	pub fn parse(raw: &str) -> Self {
		Self::from_words(raw.lines())
	}

	pub fn from_words<I, S>(words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let words = words
			.into_iter()
			.map(|word| word.as_ref().trim().to_string())
			.filter(|word| !word.is_empty())
			.collect::<Vec<_>>();

		Self { words: words.into() }
	}

	pub fn as_slice(&self) -> &[String] {
		&self.words
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}

/// Lowercases free text, strips punctuation, and drops stop words.
#[derive(Clone, Debug, Default)]
pub struct TextNormalizer {
	stop_words: HashSet<String>,
}
impl TextNormalizer {
	pub fn new(stop_words: &StopWords) -> Self {
		let stop_words = stop_words.as_slice().iter().map(|word| word.to_lowercase()).collect();

		Self { stop_words }
	}

	/// Returns the surviving words joined by single spaces. May be empty.
	pub fn normalize(&self, text: &str) -> String {
		let collapsed = collapse_whitespace(text);
		let mut out = String::with_capacity(collapsed.len());

		for word in collapsed.unicode_words() {
			let word = word.to_lowercase();

			if self.stop_words.contains(&word) {
				continue;
			}
			if !out.is_empty() {
				out.push(' ');
			}

			out.push_str(&word);
		}

		out
	}
}

/// Collapses every whitespace run into a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

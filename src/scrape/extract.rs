//! Layered translation extraction from a dictionary page.
//!
//! The structured pass looks for the markup conventions dictionary pages use for translation
//! headings. Only when it finds nothing does the fallback scan visible text for runs of the
//! target language's script.

// crates.io
use scraper::{ElementRef, Html, Selector};
// self
use crate::_prelude::*;

/// Markup conventions that carry one translation per element, matched in document order.
const STRUCTURED_SELECTORS: &[&str] = &[
	"h3.translation__item__pharse",
	".translation__item__phrase",
	"[data-translation]",
	"strong.translation",
	"span.translation",
	".dense-translation",
];
/// Fallback candidates longer than this are sentences, not translations.
const MAX_FALLBACK_CHARS: usize = 50;
/// Navigation and chrome text that matches the target script on dictionary pages.
const BOILERPLATE: &[&str] = &[
	"glosbe", "翻訳", "辞書", "例文", "ログイン", "ログアウト", "検索", "日本語", "英語",
	"発音", "文法", "もっと見る", "翻译", "词典", "例句", "登录", "搜索", "中文", "英语",
	"번역", "사전", "예문", "로그인", "검색", "한국어", "영어", "перевод", "словарь",
	"примеры", "войти", "поиск", "русский", "английский",
];
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Writing systems the fallback scan can recognize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
	/// Hiragana, katakana, and kanji.
	Japanese,
	/// Han ideographs.
	Chinese,
	/// Hangul.
	Korean,
	/// Cyrillic.
	Cyrillic,
	/// Greek.
	Greek,
	/// Arabic.
	Arabic,
	/// Hebrew.
	Hebrew,
	/// Thai.
	Thai,
	/// Devanagari.
	Devanagari,
}
impl Script {
	/// Maps a locale's primary language subtag to its script.
	pub fn for_locale(locale: &str) -> Option<Self> {
		let primary = locale.split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();

		match primary.as_str() {
			"ja" => Some(Self::Japanese),
			"zh" => Some(Self::Chinese),
			"ko" => Some(Self::Korean),
			"ru" | "uk" | "bg" | "sr" | "be" | "mk" | "kk" => Some(Self::Cyrillic),
			"el" => Some(Self::Greek),
			"ar" | "fa" | "ur" => Some(Self::Arabic),
			"he" | "yi" => Some(Self::Hebrew),
			"th" => Some(Self::Thai),
			"hi" | "mr" | "ne" => Some(Self::Devanagari),
			_ => None,
		}
	}

	/// Returns `true` if `c` belongs to this script.
	pub fn contains(self, c: char) -> bool {
		let c = c as u32;

		match self {
			Self::Japanese => matches!(
				c,
				0x3040..=0x309F
					| 0x30A0..=0x30FF
					| 0x3400..=0x4DBF
					| 0x4E00..=0x9FFF
					| 0x3005
					| 0xFF66..=0xFF9F
			),
			Self::Chinese => matches!(c, 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF),
			Self::Korean => matches!(c, 0x1100..=0x11FF | 0x3130..=0x318F | 0xAC00..=0xD7AF),
			Self::Cyrillic => matches!(c, 0x0400..=0x052F),
			Self::Greek => matches!(c, 0x0370..=0x03FF | 0x1F00..=0x1FFF),
			Self::Arabic => matches!(c, 0x0600..=0x06FF | 0x0750..=0x077F),
			Self::Hebrew => matches!(c, 0x0590..=0x05FF),
			Self::Thai => matches!(c, 0x0E00..=0x0E7F),
			Self::Devanagari => matches!(c, 0x0900..=0x097F),
		}
	}

	/// Scripts whose words are separated by spaces keep multi-word runs together.
	fn spaced(self) -> bool {
		!matches!(self, Self::Japanese | Self::Chinese | Self::Thai)
	}
}

/// Extracts up to `limit` unique translation candidates from `html`, in first-seen order.
pub fn extract_translations(
	html: &str,
	word: &str,
	target_locale: &str,
	limit: usize,
) -> Vec<String> {
	let document = Html::parse_document(html);
	let mut candidates = structured_candidates(&document);

	if candidates.is_empty()
		&& let Some(script) = Script::for_locale(target_locale)
	{
		candidates = script_candidates(&document, script, word);
	}

	dedup_in_order(candidates, limit)
}

fn structured_candidates(document: &Html) -> Vec<String> {
	let Ok(selector) = Selector::parse(&STRUCTURED_SELECTORS.join(", ")) else {
		return Vec::new();
	};

	document
		.select(&selector)
		.filter_map(|element| {
			let raw = match element.value().attr("data-translation") {
				Some(value) => value.to_owned(),
				None => element.text().collect::<String>(),
			};
			let text = collapse_whitespace(&raw);

			(!text.is_empty()).then_some(text)
		})
		.collect()
}

fn script_candidates(document: &Html, script: Script, word: &str) -> Vec<String> {
	let word = word.to_lowercase();
	let mut candidates = Vec::new();

	for node in document.root_element().descendants() {
		let Some(text) = node.value().as_text() else { continue };
		let hidden = node
			.ancestors()
			.filter_map(ElementRef::wrap)
			.any(|element| SKIPPED_ELEMENTS.contains(&element.value().name()));

		if hidden {
			continue;
		}

		for run in script_runs(text, script) {
			let lowered = run.to_lowercase();

			if run.chars().count() > MAX_FALLBACK_CHARS
				|| lowered == word
				|| BOILERPLATE.contains(&lowered.as_str())
			{
				continue;
			}

			candidates.push(run);
		}
	}

	candidates
}

/// Splits `text` into maximal runs of `script` characters.
fn script_runs(text: &str, script: Script) -> Vec<String> {
	let mut runs = Vec::new();
	let mut current = String::new();
	let mut pending_space = false;

	for c in text.chars() {
		if script.contains(c) {
			if pending_space {
				current.push(' ');
			}

			current.push(c);
			pending_space = false;
		} else if c.is_whitespace() && script.spaced() && !current.is_empty() {
			pending_space = true;
		} else {
			if !current.is_empty() {
				runs.push(std::mem::take(&mut current));
			}

			pending_space = false;
		}
	}

	if !current.is_empty() {
		runs.push(current);
	}

	runs
}

fn collapse_whitespace(raw: &str) -> String {
	raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn dedup_in_order(candidates: Vec<String>, limit: usize) -> Vec<String> {
	let mut seen = HashSet::new();

	candidates
		.into_iter()
		.filter(|candidate| seen.insert(candidate.clone()))
		.take(limit)
		.collect()
}

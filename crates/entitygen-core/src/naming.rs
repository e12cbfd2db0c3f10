//! Naming utilities for code generation.
//!
//! Converts raw table and column identifiers into Java class names, field
//! names and pluralized collection field names, and keeps the results valid
//! Java identifiers. Every function here is pure and locale-independent, so
//! repeated runs over an unchanged schema produce identical names.

use crate::rule::ClassNameRule;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Java reserved words and literals that cannot be used as identifiers.
static JAVA_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
	[
		"abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
		"continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
		"float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
		"long", "native", "new", "package", "private", "protected", "public", "return", "short",
		"static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
		"transient", "try", "void", "volatile", "while", // Literals
		"true", "false", "null", // Contextual
		"var", "yield", "record", "_",
	]
	.into_iter()
	.collect()
});

static UNCOUNTABLE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
	[
		"data",
		"deer",
		"equipment",
		"feedback",
		"fish",
		"information",
		"metadata",
		"money",
		"news",
		"rice",
		"series",
		"sheep",
		"software",
		"species",
		"staff",
	]
	.into_iter()
	.collect()
});

const IRREGULAR: &[(&str, &str)] = &[
	("axis", "axes"),
	("child", "children"),
	("foot", "feet"),
	("goose", "geese"),
	("man", "men"),
	("mouse", "mice"),
	("ox", "oxen"),
	("person", "people"),
	("tooth", "teeth"),
	("woman", "women"),
];

const F_TO_VES: &[&str] = &[
	"calf", "half", "knife", "leaf", "life", "loaf", "shelf", "thief", "wife", "wolf",
];

const O_TO_OES: &[&str] = &["echo", "hero", "potato", "tomato", "veto"];

/// Check if a string is a Java reserved word.
pub fn is_java_keyword(name: &str) -> bool {
	JAVA_KEYWORDS.contains(name)
}

/// Sanitize an identifier to be a valid Java identifier.
///
/// - Drops characters that cannot appear in an identifier
/// - Prefixes digit-leading identifiers with an underscore
/// - Suffixes reserved words with an underscore
///
/// # Examples
///
/// ```rust
/// use entitygen_core::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("class"), "class_");
/// assert_eq!(sanitize_identifier("1column"), "_1column");
/// assert_eq!(sanitize_identifier("total$"), "total$");
/// assert_eq!(sanitize_identifier("my.field"), "myfield");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
	let mut result = String::with_capacity(name.len() + 1);

	for ch in name.chars() {
		if ch.is_alphanumeric() || ch == '_' || ch == '$' {
			result.push(ch);
		}
	}

	if result.is_empty() {
		return "_".to_string();
	}

	if result.starts_with(|c: char| c.is_ascii_digit()) {
		result.insert(0, '_');
	}

	if is_java_keyword(&result) {
		result.push('_');
	}

	result
}

/// Camel-case an identifier: the whole input is lowercased, then each word
/// after a delimiter (`_`, `-`, space) is capitalized.
fn to_camel_case(s: &str, capitalize_first: bool) -> String {
	let mut result = String::with_capacity(s.len());
	let mut capitalize_next = false;

	for ch in s.chars() {
		if ch == '_' || ch == '-' || ch.is_whitespace() {
			capitalize_next = !result.is_empty();
		} else if capitalize_next || (result.is_empty() && capitalize_first) {
			result.extend(ch.to_uppercase());
			capitalize_next = false;
		} else {
			result.extend(ch.to_lowercase());
		}
	}

	result
}

/// Resolve the class name for a table.
///
/// Class name rules are checked first (exact table name, first hit wins);
/// otherwise the table name is converted to upper camel case.
///
/// # Examples
///
/// ```rust
/// use entitygen_core::to_class_name;
///
/// assert_eq!(to_class_name("BLOG_ARTICLE", &[]), "BlogArticle");
/// assert_eq!(to_class_name("tag", &[]), "Tag");
/// ```
pub fn to_class_name(table_name: &str, rules: &[ClassNameRule]) -> String {
	if let Some(rule) = rules.iter().find(|r| r.table_name == table_name) {
		return rule.class_name.clone();
	}

	sanitize_identifier(&to_camel_case(table_name, true))
}

/// Convert a table or column identifier to a lower camel case field name.
///
/// # Examples
///
/// ```rust
/// use entitygen_core::to_field_name;
///
/// assert_eq!(to_field_name("BLOG_ID"), "blogId");
/// assert_eq!(to_field_name("created_at"), "createdAt");
/// assert_eq!(to_field_name("CLASS"), "class_");
/// ```
pub fn to_field_name(identifier: &str) -> String {
	sanitize_identifier(&to_camel_case(identifier, false))
}

/// Field name for a collection of rows of the given table.
///
/// # Examples
///
/// ```rust
/// use entitygen_core::to_list_field_name;
///
/// assert_eq!(to_list_field_name("ARTICLE"), "articles");
/// assert_eq!(to_list_field_name("BLOG_CATEGORY"), "blogCategories");
/// ```
pub fn to_list_field_name(table_name: &str) -> String {
	to_field_name(&pluralize(table_name))
}

/// Pluralize the last word of an identifier using English rules.
///
/// Words are separated by `_`, `-` or spaces. All-uppercase words get an
/// uppercase suffix, other words keep the case of their shared stem.
///
/// # Examples
///
/// ```rust
/// use entitygen_core::pluralize;
///
/// assert_eq!(pluralize("article"), "articles");
/// assert_eq!(pluralize("ADDRESS"), "ADDRESSES");
/// assert_eq!(pluralize("blog_category"), "blog_categories");
/// assert_eq!(pluralize("person"), "people");
/// ```
pub fn pluralize(word: &str) -> String {
	let split = word
		.rfind(|c: char| c == '_' || c == '-' || c == ' ')
		.map(|i| i + 1)
		.unwrap_or(0);
	let (head, last) = word.split_at(split);
	if last.is_empty() {
		return word.to_string();
	}

	let lower = last.to_lowercase();
	let plural = pluralize_lowercase(&lower);

	let shouting = last.chars().any(char::is_alphabetic) && !last.chars().any(char::is_lowercase);
	if shouting {
		return format!("{}{}", head, plural.to_uppercase());
	}
	if lower.len() != last.len() {
		return format!("{}{}", head, plural);
	}

	// Keep the original spelling of the stem shared with the plural form.
	let common = lower
		.char_indices()
		.zip(plural.chars())
		.take_while(|((_, a), b)| a == b)
		.last()
		.map(|((i, a), _)| i + a.len_utf8())
		.unwrap_or(0);
	let mut result = String::with_capacity(head.len() + plural.len());
	result.push_str(head);
	if common == 0 && last.starts_with(char::is_uppercase) {
		result.push_str(&to_camel_case(&plural, true));
	} else {
		result.push_str(&last[..common]);
		result.push_str(&plural[common..]);
	}
	result
}

fn pluralize_lowercase(word: &str) -> String {
	if UNCOUNTABLE.contains(word) {
		return word.to_string();
	}

	if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
		return (*plural).to_string();
	}

	if F_TO_VES.contains(&word) {
		let stem = word.trim_end_matches('e').trim_end_matches('f');
		return format!("{}ves", stem);
	}

	if O_TO_OES.contains(&word) {
		return format!("{}es", word);
	}

	if let Some(stem) = word.strip_suffix("sis") {
		return format!("{}ses", stem);
	}

	if word.ends_with('s')
		|| word.ends_with('x')
		|| word.ends_with('z')
		|| word.ends_with("ch")
		|| word.ends_with("sh")
	{
		return format!("{}es", word);
	}

	if let Some(stem) = word.strip_suffix('y')
		&& stem.ends_with(|c: char| c.is_alphabetic() && !"aeiou".contains(c))
	{
		return format!("{}ies", stem);
	}

	format!("{}s", word)
}

//! # Generation Rules
//!
//! Rules let a configuration override naming, typing and decoration
//! decisions for a given class or field. Every rule kind shares the same
//! matching shape:
//!
//! - an optional single target (`className`, `fieldName`, `tableName`)
//! - an optional list of targets (`classNames`, `fieldNames`, `tableNames`)
//!
//! A target matches a candidate when it is equal to it, or when the
//! candidate matches the target read as a regular expression over the whole
//! candidate. A rule declaring no target at a scope is global at that scope.
//! Class and field scopes compose with a logical AND.
//!
//! ```yaml
//! fieldTypeRules:
//!   - className: Article
//!     fieldNames: [".*Count", "total"]
//!     typeName: long
//! ```

mod kinds;
mod payload;

pub use kinds::{
	AdditionalCodePosition, AdditionalCodeRule, ClassAdditionalCommentRule, ClassAnnotationRule,
	ClassNameRule, FieldAdditionalCommentRule, FieldAnnotationRule, FieldDefaultValueRule,
	FieldTypeRule, ImportRule, InterfaceRule, TableExclusionRule, TableScanRule,
};
pub use payload::{Annotation, AnnotationAttribute, Interface};

use crate::config::ConfigError;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A rule target identifier.
///
/// The identifier is compiled once, as a regular expression anchored at
/// both ends, when the rule is built or deserialized. A plain name is a
/// regex matching exactly itself, so literal targets keep working.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pattern {
	raw: String,
	regex: Regex,
}

impl Pattern {
	/// Compile a target identifier.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::InvalidPattern`] if the identifier is not a
	/// valid regular expression.
	pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
		let raw = raw.into();
		let regex = Regex::new(&format!("^(?:{})$", raw)).map_err(|source| {
			ConfigError::InvalidPattern {
				pattern: raw.clone(),
				source,
			}
		})?;
		Ok(Self { raw, regex })
	}

	/// The identifier as written in the configuration.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Exact equality first, then a whole-string regex match.
	pub fn matches(&self, candidate: &str) -> bool {
		self.raw == candidate || self.regex.is_match(candidate)
	}
}

impl TryFrom<String> for Pattern {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl TryFrom<&str> for Pattern {
	type Error = ConfigError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}

impl From<Pattern> for String {
	fn from(pattern: Pattern) -> Self {
		pattern.raw
	}
}

impl PartialEq for Pattern {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Pattern").field(&self.raw).finish()
	}
}

impl fmt::Display for Pattern {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

/// Shared single-or-list matching used by every target scope.
fn matches_target(single: Option<&Pattern>, list: &[Pattern], candidate: &str) -> bool {
	let single = single.filter(|p| !p.as_str().is_empty());
	if single.is_none() && list.is_empty() {
		// global rule
		return true;
	}

	if let Some(target) = single
		&& target.matches(candidate)
	{
		return true;
	}

	list.iter().any(|target| target.matches(candidate))
}

/// Deserialize a list that may be written as an explicit null (`~`).
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn compile_all<I, S>(names: I) -> Result<Vec<Pattern>, ConfigError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	names.into_iter().map(Pattern::new).collect()
}

/// Class-scoped targets of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassTarget {
	/// A single class name or pattern
	#[serde(skip_serializing_if = "Option::is_none")]
	pub class_name: Option<Pattern>,
	/// Several class names or patterns
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
	pub class_names: Vec<Pattern>,
}

impl ClassTarget {
	/// Target every class.
	pub fn any() -> Self {
		Self::default()
	}

	/// Target a single class name or pattern.
	pub fn class(name: impl Into<String>) -> Result<Self, ConfigError> {
		Ok(Self {
			class_name: Some(Pattern::new(name)?),
			class_names: Vec::new(),
		})
	}

	/// Target any of several class names or patterns.
	pub fn classes<I, S>(names: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self {
			class_name: None,
			class_names: compile_all(names)?,
		})
	}

	pub fn matches(&self, class_name: &str) -> bool {
		matches_target(self.class_name.as_ref(), &self.class_names, class_name)
	}
}

/// Field-scoped targets of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldTarget {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field_name: Option<Pattern>,
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
	pub field_names: Vec<Pattern>,
}

impl FieldTarget {
	/// Target every field.
	pub fn any() -> Self {
		Self::default()
	}

	pub fn field(name: impl Into<String>) -> Result<Self, ConfigError> {
		Ok(Self {
			field_name: Some(Pattern::new(name)?),
			field_names: Vec::new(),
		})
	}

	pub fn fields<I, S>(names: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self {
			field_name: None,
			field_names: compile_all(names)?,
		})
	}

	pub fn matches(&self, field_name: &str) -> bool {
		matches_target(self.field_name.as_ref(), &self.field_names, field_name)
	}
}

/// Table-scoped targets, used by the scan and exclusion rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableTarget {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub table_name: Option<Pattern>,
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_empty")]
	pub table_names: Vec<Pattern>,
}

impl TableTarget {
	pub fn any() -> Self {
		Self::default()
	}

	pub fn table(name: impl Into<String>) -> Result<Self, ConfigError> {
		Ok(Self {
			table_name: Some(Pattern::new(name)?),
			table_names: Vec::new(),
		})
	}

	pub fn tables<I, S>(names: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self {
			table_name: None,
			table_names: compile_all(names)?,
		})
	}

	pub fn matches(&self, table_name: &str) -> bool {
		matches_target(self.table_name.as_ref(), &self.table_names, table_name)
	}
}

/// Rules applying to a whole class.
pub trait ClassMatcher {
	fn class_target(&self) -> &ClassTarget;

	/// Whether this rule applies to the given class.
	fn matches(&self, class_name: &str) -> bool {
		self.class_target().matches(class_name)
	}
}

/// Rules applying to a field of a class.
pub trait FieldMatcher {
	fn class_target(&self) -> &ClassTarget;

	fn field_target(&self) -> &FieldTarget;

	/// Whether this rule applies to the given field. Both scopes must match.
	fn matches(&self, class_name: &str, field_name: &str) -> bool {
		self.class_target().matches(class_name) && self.field_target().matches(field_name)
	}
}

/// Rules selecting tables for generation.
pub trait TableMatcher {
	fn table_target(&self) -> &TableTarget;

	fn matches(&self, table_name: &str) -> bool {
		self.table_target().matches(table_name)
	}
}

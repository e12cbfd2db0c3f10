//! Rule kinds.
//!
//! Each kind pairs a target (class, class and field, or table) with its own
//! payload. Targets are flattened into the rule so configuration files keep
//! a single flat mapping per rule.

use super::payload::{Annotation, Interface};
use super::{ClassMatcher, ClassTarget, FieldMatcher, FieldTarget, TableMatcher, TableTarget};
use serde::{Deserialize, Serialize};

macro_rules! impl_class_matcher {
	($($rule:ty),+ $(,)?) => {
		$(
			impl ClassMatcher for $rule {
				fn class_target(&self) -> &ClassTarget {
					&self.class
				}
			}
		)+
	};
}

macro_rules! impl_field_matcher {
	($($rule:ty),+ $(,)?) => {
		$(
			impl FieldMatcher for $rule {
				fn class_target(&self) -> &ClassTarget {
					&self.class
				}

				fn field_target(&self) -> &FieldTarget {
					&self.field
				}
			}
		)+
	};
}

macro_rules! impl_table_matcher {
	($($rule:ty),+ $(,)?) => {
		$(
			impl TableMatcher for $rule {
				fn table_target(&self) -> &TableTarget {
					&self.table
				}
			}
		)+
	};
}

/// Overrides the class name generated for a table.
///
/// Unlike the other rules this one compares table names exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassNameRule {
	pub table_name: String,
	pub class_name: String,
}

impl ClassNameRule {
	pub fn new(table_name: impl Into<String>, class_name: impl Into<String>) -> Self {
		Self {
			table_name: table_name.into(),
			class_name: class_name.into(),
		}
	}
}

/// Adds annotations to matching classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassAnnotationRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	#[serde(deserialize_with = "crate::rule::null_as_empty")]
	pub annotations: Vec<Annotation>,
}

impl ClassAnnotationRule {
	pub fn new(class: ClassTarget, annotations: Vec<Annotation>) -> Self {
		Self { class, annotations }
	}
}

/// Makes matching classes implement interfaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InterfaceRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	#[serde(deserialize_with = "crate::rule::null_as_empty")]
	pub interfaces: Vec<Interface>,
}

impl InterfaceRule {
	pub fn new(class: ClassTarget, interfaces: Vec<Interface>) -> Self {
		Self { class, interfaces }
	}
}

/// Appends comment lines to the class Javadoc.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClassAdditionalCommentRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	/// One or more lines separated by `\n`
	pub comment: String,
}

impl ClassAdditionalCommentRule {
	pub fn new(class: ClassTarget, comment: impl Into<String>) -> Self {
		Self {
			class,
			comment: comment.into(),
		}
	}
}

/// Adds an import to matching classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	/// Fully qualified name, or a wildcard such as `java.util.*`
	pub import_value: String,
}

impl ImportRule {
	pub fn new(class: ClassTarget, import_value: impl Into<String>) -> Self {
		Self {
			class,
			import_value: import_value.into(),
		}
	}
}

/// Where raw additional code is placed inside the class body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdditionalCodePosition {
	#[serde(alias = "top", alias = "TOP")]
	Top,
	#[default]
	#[serde(alias = "bottom", alias = "BOTTOM")]
	Bottom,
}

/// Inserts raw Java code into matching classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdditionalCodeRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	pub code: String,
	pub position: AdditionalCodePosition,
}

impl AdditionalCodeRule {
	pub fn new(class: ClassTarget, code: impl Into<String>, position: AdditionalCodePosition) -> Self {
		Self {
			class,
			code: code.into(),
			position,
		}
	}
}

/// Overrides the Java type of matching fields. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldTypeRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	#[serde(flatten)]
	pub field: FieldTarget,
	pub type_name: String,
}

impl FieldTypeRule {
	pub fn new(class: ClassTarget, field: FieldTarget, type_name: impl Into<String>) -> Self {
		Self {
			class,
			field,
			type_name: type_name.into(),
		}
	}
}

/// Adds annotations to matching fields. All matches accumulate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldAnnotationRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	#[serde(flatten)]
	pub field: FieldTarget,
	#[serde(deserialize_with = "crate::rule::null_as_empty")]
	pub annotations: Vec<Annotation>,
}

impl FieldAnnotationRule {
	pub fn new(class: ClassTarget, field: FieldTarget, annotations: Vec<Annotation>) -> Self {
		Self {
			class,
			field,
			annotations,
		}
	}
}

/// Gives matching fields an initializer. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDefaultValueRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	#[serde(flatten)]
	pub field: FieldTarget,
	/// Java expression used verbatim
	pub default_value: String,
}

impl FieldDefaultValueRule {
	pub fn new(class: ClassTarget, field: FieldTarget, default_value: impl Into<String>) -> Self {
		Self {
			class,
			field,
			default_value: default_value.into(),
		}
	}
}

/// Appends comment lines to the Javadoc of matching fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldAdditionalCommentRule {
	#[serde(flatten)]
	pub class: ClassTarget,
	#[serde(flatten)]
	pub field: FieldTarget,
	pub comment: String,
}

impl FieldAdditionalCommentRule {
	pub fn new(class: ClassTarget, field: FieldTarget, comment: impl Into<String>) -> Self {
		Self {
			class,
			field,
			comment: comment.into(),
		}
	}
}

/// Selects tables when the scan mode is rule based.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableScanRule {
	#[serde(flatten)]
	pub table: TableTarget,
}

impl TableScanRule {
	pub fn new(table: TableTarget) -> Self {
		Self { table }
	}
}

/// Drops tables from generation regardless of the scan mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableExclusionRule {
	#[serde(flatten)]
	pub table: TableTarget,
}

impl TableExclusionRule {
	pub fn new(table: TableTarget) -> Self {
		Self { table }
	}
}

impl_class_matcher!(
	ClassAnnotationRule,
	InterfaceRule,
	ClassAdditionalCommentRule,
	ImportRule,
	AdditionalCodeRule,
);

impl_field_matcher!(
	FieldTypeRule,
	FieldAnnotationRule,
	FieldDefaultValueRule,
	FieldAdditionalCommentRule,
);

impl_table_matcher!(TableScanRule, TableExclusionRule);

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn test_field_rule_from_yaml_flattens_targets() {
		let yaml = r#"
className: Article
fieldNames: [".*Count", total]
typeName: long
"#;
		let rule: FieldTypeRule = serde_yaml::from_str(yaml).unwrap();
		assert_eq!(rule.type_name, "long");
		assert!(rule.matches("Article", "viewCount"));
		assert!(rule.matches("Article", "total"));
		assert!(!rule.matches("Article", "title"));
		assert!(!rule.matches("Blog", "total"));
	}

	#[test]
	fn test_global_class_rule_from_yaml() {
		let yaml = r#"
annotations:
  - className: lombok.ToString
"#;
		let rule: ClassAnnotationRule = serde_yaml::from_str(yaml).unwrap();
		assert!(rule.matches("Anything"));
		assert_eq!(rule.annotations[0].class_name, "lombok.ToString");
	}

	#[rstest]
	#[case("Top", AdditionalCodePosition::Top)]
	#[case("top", AdditionalCodePosition::Top)]
	#[case("Bottom", AdditionalCodePosition::Bottom)]
	#[case("BOTTOM", AdditionalCodePosition::Bottom)]
	fn test_additional_code_position(#[case] raw: &str, #[case] expected: AdditionalCodePosition) {
		let yaml = format!("code: \"int x;\"\nposition: {}\n", raw);
		let rule: AdditionalCodeRule = serde_yaml::from_str(&yaml).unwrap();
		assert_eq!(rule.position, expected);
	}

	#[test]
	fn test_additional_code_position_defaults_to_bottom() {
		let rule: AdditionalCodeRule = serde_yaml::from_str("code: \"int x;\"\n").unwrap();
		assert_eq!(rule.position, AdditionalCodePosition::Bottom);
	}

	#[test]
	fn test_table_rules() {
		let scan = TableScanRule::new(TableTarget::tables(["BLOG", "ARTICLE.*"]).unwrap());
		assert!(scan.matches("BLOG"));
		assert!(scan.matches("ARTICLE_TAG"));
		assert!(!scan.matches("USER"));

		let exclusion: TableExclusionRule = serde_yaml::from_str("tableName: \"flyway_.*\"\n").unwrap();
		assert!(exclusion.matches("flyway_schema_history"));
		assert!(!exclusion.matches("BLOG"));
	}

	#[test]
	fn test_class_name_rule_from_toml() {
		let rule: ClassNameRule = toml::from_str("tableName = \"T_USER\"\nclassName = \"User\"\n").unwrap();
		assert_eq!(rule, ClassNameRule::new("T_USER", "User"));
	}
}

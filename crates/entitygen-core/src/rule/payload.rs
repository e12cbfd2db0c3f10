//! Rule payloads shared by several rule kinds.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the resolved class name in interface generics.
pub const CLASS_NAME_PLACEHOLDER: &str = "{className}";

/// An annotation supplied by configuration.
///
/// The set of annotations is open-ended, so this is a plain name plus an
/// ordered list of members. Member values are Java expressions written
/// verbatim (`"\"users\""`, `"true"`, `"CascadeType.ALL"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Annotation {
	/// Simple or fully qualified annotation type, without `@`
	pub class_name: String,
	#[serde(deserialize_with = "crate::rule::null_as_empty")]
	pub attributes: Vec<AnnotationAttribute>,
}

impl Annotation {
	pub fn new(class_name: impl Into<String>) -> Self {
		Self {
			class_name: class_name.into(),
			attributes: Vec::new(),
		}
	}

	pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push(AnnotationAttribute {
			name: name.into(),
			value: value.into(),
		});
		self
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationAttribute {
	pub name: String,
	pub value: String,
}

/// An interface a generated class implements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Interface {
	/// Simple or fully qualified interface name
	pub name: String,
	/// Type arguments; `{className}` stands for the generated class
	#[serde(deserialize_with = "crate::rule::null_as_empty")]
	pub generics_class_names: Vec<String>,
}

impl Interface {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			generics_class_names: Vec::new(),
		}
	}

	pub fn with_generic(mut self, class_name: impl Into<String>) -> Self {
		self.generics_class_names.push(class_name.into());
		self
	}

	/// Type arguments with the class name placeholder substituted.
	pub fn resolved_generics(&self, class_name: &str) -> Vec<String> {
		self.generics_class_names
			.iter()
			.map(|generic| generic.replace(CLASS_NAME_PLACEHOLDER, class_name))
			.collect()
	}
}

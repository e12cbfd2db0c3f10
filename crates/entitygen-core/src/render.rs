//! Java source model and renderer.
//!
//! [`EntityClass`] is the assembled, not yet rendered entity. Type names in
//! the model are written fully qualified; [`EntityClass::render`] decides
//! imports and shortens names when doing so is unambiguous.
//!
//! Rendering is a pure function of the model. Members are emitted in model
//! order and imports are sorted, so equal models render to identical text.

use crate::rule::Annotation;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

const INDENT: &str = "  ";

/// Identifier chains such as `Article`, `java.util.List` or `Map.Entry`.
static TYPE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*")
		.expect("type token regex is valid")
});

/// Annotation types accepted as marking an identity field.
pub const ID_ANNOTATIONS: &[&str] = &["Id", "jakarta.persistence.Id", "javax.persistence.Id"];

/// Value of an annotation member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValue {
	/// Java expression emitted verbatim
	Literal(String),
	/// String emitted as a quoted Java literal
	Str(String),
	/// `Type.CONSTANT`; the type takes part in import resolution
	Constant { type_name: String, constant: String },
	/// Array of nested annotations, emitted one per line
	Annotations(Vec<JavaAnnotation>),
}

/// An annotation ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaAnnotation {
	/// Annotation type, usually fully qualified
	pub type_name: String,
	pub members: Vec<(String, MemberValue)>,
}

impl JavaAnnotation {
	pub fn new(type_name: impl Into<String>) -> Self {
		Self {
			type_name: type_name.into(),
			members: Vec::new(),
		}
	}

	pub fn member(mut self, name: impl Into<String>, value: MemberValue) -> Self {
		self.members.push((name.into(), value));
		self
	}

	pub fn literal(self, name: impl Into<String>, value: impl ToString) -> Self {
		self.member(name, MemberValue::Literal(value.to_string()))
	}

	pub fn string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.member(name, MemberValue::Str(value.into()))
	}

	/// Look up a member value by name.
	pub fn get(&self, name: &str) -> Option<&MemberValue> {
		self.members.iter().find(|(n, _)| n == name).map(|(_, v)| v)
	}

	/// Whether this annotation has the given type, qualified or not.
	pub fn is(&self, type_name: &str) -> bool {
		self.type_name == type_name
	}
}

impl From<&Annotation> for JavaAnnotation {
	fn from(annotation: &Annotation) -> Self {
		Self {
			type_name: annotation.class_name.clone(),
			members: annotation
				.attributes
				.iter()
				.map(|a| (a.name.clone(), MemberValue::Literal(a.value.clone())))
				.collect(),
		}
	}
}

/// What produced a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// Mapped from a single column
	Column,
	/// Reference to the parent side of imported keys
	ManyToOne,
	/// Collection of the child side of exported keys
	OneToMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityField {
	pub name: String,
	/// Java type expression, e.g. `java.util.List<Article>` or `int`
	pub type_name: String,
	pub kind: FieldKind,
	pub annotations: Vec<JavaAnnotation>,
	/// Initializer expression
	pub initializer: Option<String>,
	pub javadoc: Vec<String>,
}

impl EntityField {
	pub fn new(name: impl Into<String>, type_name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			type_name: type_name.into(),
			kind,
			annotations: Vec::new(),
			initializer: None,
			javadoc: Vec::new(),
		}
	}

	pub fn annotation(&self, type_name: &str) -> Option<&JavaAnnotation> {
		self.annotations.iter().find(|a| a.is(type_name))
	}

	pub fn is_identity(&self) -> bool {
		self.annotations
			.iter()
			.any(|a| ID_ANNOTATIONS.contains(&a.type_name.as_str()))
	}
}

/// An assembled entity class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityClass {
	pub package_name: String,
	pub class_name: String,
	pub table_name: String,
	pub javadoc: Vec<String>,
	pub annotations: Vec<JavaAnnotation>,
	/// Implemented interfaces as type expressions
	pub interfaces: Vec<String>,
	pub fields: Vec<EntityField>,
	/// Imports requested by configuration, emitted as written
	pub extra_imports: Vec<String>,
	/// Raw code placed before the fields
	pub top_code: Vec<String>,
	/// Raw code placed after the fields
	pub bottom_code: Vec<String>,
}

impl EntityClass {
	pub fn new(
		package_name: impl Into<String>,
		class_name: impl Into<String>,
		table_name: impl Into<String>,
	) -> Self {
		Self {
			package_name: package_name.into(),
			class_name: class_name.into(),
			table_name: table_name.into(),
			javadoc: Vec::new(),
			annotations: Vec::new(),
			interfaces: Vec::new(),
			fields: Vec::new(),
			extra_imports: Vec::new(),
			top_code: Vec::new(),
			bottom_code: Vec::new(),
		}
	}

	pub fn field(&self, name: &str) -> Option<&EntityField> {
		self.fields.iter().find(|f| f.name == name)
	}

	pub fn has_identity_field(&self) -> bool {
		self.fields.iter().any(EntityField::is_identity)
	}

	/// Render the class as a Java compilation unit.
	pub fn render(&self) -> String {
		let names = NameResolver::new(self);
		let mut out = String::new();

		if !self.package_name.is_empty() {
			out.push_str(&format!("package {};\n\n", self.package_name));
		}

		let imports = names.import_lines(&self.extra_imports);
		if !imports.is_empty() {
			for import in &imports {
				out.push_str(&format!("import {};\n", import));
			}
			out.push('\n');
		}

		write_javadoc(&mut out, &self.javadoc, "");
		for annotation in &self.annotations {
			write_annotation(&mut out, annotation, &names, "");
		}

		// Entities are always public so JPA providers in other packages can load them
		out.push_str(&format!("public class {}", self.class_name));
		if !self.interfaces.is_empty() {
			let interfaces: Vec<_> = self.interfaces.iter().map(|i| names.type_expr(i)).collect();
			out.push_str(&format!(" implements {}", interfaces.join(", ")));
		}
		out.push_str(" {\n");

		let mut members: Vec<String> = Vec::new();
		members.extend(self.top_code.iter().map(|code| indent_code(code)));
		members.extend(self.fields.iter().map(|field| render_field(field, &names)));
		members.extend(self.bottom_code.iter().map(|code| indent_code(code)));
		out.push_str(&members.join("\n"));

		out.push_str("}\n");
		out
	}
}

/// Decides which qualified names are imported and how each is written.
struct NameResolver<'a> {
	package_name: &'a str,
	/// Qualified name to simple name, for names that can be shortened
	short: HashMap<String, String>,
}

impl<'a> NameResolver<'a> {
	fn new(entity: &'a EntityClass) -> Self {
		let mut type_exprs: Vec<&str> = Vec::new();
		for annotation in &entity.annotations {
			collect_annotation_types(annotation, &mut type_exprs);
		}
		type_exprs.extend(entity.interfaces.iter().map(String::as_str));
		for field in &entity.fields {
			type_exprs.push(&field.type_name);
			for annotation in &field.annotations {
				collect_annotation_types(annotation, &mut type_exprs);
			}
		}

		// Simple names that must keep meaning what they mean unqualified
		let mut reserved: HashSet<&str> = HashSet::new();
		reserved.insert(entity.class_name.as_str());
		let mut qualified: BTreeSet<&str> = BTreeSet::new();
		for &expr in &type_exprs {
			for token in TYPE_TOKEN.find_iter(expr) {
				let token = token.as_str();
				if is_qualified_name(token) {
					qualified.insert(token);
				} else if !token.contains('.') {
					reserved.insert(token);
				}
			}
		}

		let mut claimed: HashMap<&str, &str> = HashMap::new();
		for import in &entity.extra_imports {
			if let Some((_, simple)) = import.rsplit_once('.')
				&& simple != "*"
			{
				claimed.entry(simple).or_insert(import.as_str());
			}
		}

		let mut short = HashMap::new();
		for name in qualified {
			let Some((_, simple)) = name.rsplit_once('.') else {
				continue;
			};
			if reserved.contains(simple) {
				continue;
			}
			if claimed.get(simple).is_some_and(|owner| *owner != name) {
				continue;
			}
			claimed.insert(simple, name);
			short.insert(name.to_string(), simple.to_string());
		}

		Self {
			package_name: &entity.package_name,
			short,
		}
	}

	/// Sorted import lines: shortened names outside `java.lang` and the
	/// entity's package, plus configured imports.
	fn import_lines(&self, extra_imports: &[String]) -> BTreeSet<String> {
		let mut lines: BTreeSet<String> = self
			.short
			.keys()
			.filter(|name| {
				let package = name.rsplit_once('.').map(|(p, _)| p).unwrap_or_default();
				package != "java.lang" && package != self.package_name
			})
			.cloned()
			.collect();
		lines.extend(
			extra_imports
				.iter()
				.map(|i| i.trim())
				.filter(|i| !i.is_empty())
				.map(str::to_string),
		);
		lines
	}

	fn name<'n>(&'n self, type_name: &'n str) -> &'n str {
		self.short.get(type_name).map(String::as_str).unwrap_or(type_name)
	}

	fn type_expr(&self, expr: &str) -> String {
		TYPE_TOKEN
			.replace_all(expr, |caps: &Captures<'_>| self.name(&caps[0]).to_string())
			.into_owned()
	}
}

/// `a.b.C`: a lowercase package segment first, an uppercase type last.
fn is_qualified_name(token: &str) -> bool {
	let Some((package, simple)) = token.rsplit_once('.') else {
		return false;
	};
	package.starts_with(|c: char| c.is_ascii_lowercase())
		&& simple.starts_with(|c: char| c.is_ascii_uppercase())
}

fn collect_annotation_types<'a>(annotation: &'a JavaAnnotation, out: &mut Vec<&'a str>) {
	out.push(&annotation.type_name);
	for (_, value) in &annotation.members {
		match value {
			MemberValue::Constant { type_name, .. } => out.push(type_name),
			MemberValue::Annotations(nested) => {
				for inner in nested {
					collect_annotation_types(inner, out);
				}
			}
			MemberValue::Literal(_) | MemberValue::Str(_) => {}
		}
	}
}

fn render_field(field: &EntityField, names: &NameResolver<'_>) -> String {
	let mut out = String::new();
	write_javadoc(&mut out, &field.javadoc, INDENT);
	for annotation in &field.annotations {
		write_annotation(&mut out, annotation, names, INDENT);
	}
	out.push_str(&format!(
		"{}private {} {}",
		INDENT,
		names.type_expr(&field.type_name),
		field.name
	));
	if let Some(initializer) = &field.initializer {
		out.push_str(&format!(" = {}", initializer));
	}
	out.push_str(";\n");
	out
}

fn write_javadoc(out: &mut String, lines: &[String], indent: &str) {
	if lines.is_empty() {
		return;
	}
	out.push_str(&format!("{}/**\n", indent));
	for line in lines {
		let line = line.replace("*/", "*&#47;");
		if line.is_empty() {
			out.push_str(&format!("{} *\n", indent));
		} else {
			out.push_str(&format!("{} * {}\n", indent, line));
		}
	}
	out.push_str(&format!("{} */\n", indent));
}

fn write_annotation(out: &mut String, annotation: &JavaAnnotation, names: &NameResolver<'_>, indent: &str) {
	let type_name = names.name(&annotation.type_name);
	match annotation.members.as_slice() {
		[] => out.push_str(&format!("{}@{}\n", indent, type_name)),
		[(name, value)] if name == "value" => match value {
			MemberValue::Annotations(nested) => {
				out.push_str(&format!("{}@{}({{\n", indent, type_name));
				let inner_indent = format!("{}{}{}", indent, INDENT, INDENT);
				let rendered: Vec<String> = nested
					.iter()
					.map(|a| format!("{}{}", inner_indent, inline_annotation(a, names)))
					.collect();
				out.push_str(&rendered.join(",\n"));
				out.push_str(&format!("\n{}}})\n", indent));
			}
			_ => out.push_str(&format!(
				"{}@{}({})\n",
				indent,
				type_name,
				member_value(value, names)
			)),
		},
		members => {
			out.push_str(&format!("{}@{}(\n", indent, type_name));
			let member_indent = format!("{}{}{}", indent, INDENT, INDENT);
			let rendered: Vec<String> = members
				.iter()
				.map(|(name, value)| format!("{}{} = {}", member_indent, name, member_value(value, names)))
				.collect();
			out.push_str(&rendered.join(",\n"));
			out.push_str(&format!("\n{})\n", indent));
		}
	}
}

fn inline_annotation(annotation: &JavaAnnotation, names: &NameResolver<'_>) -> String {
	let type_name = names.name(&annotation.type_name);
	match annotation.members.as_slice() {
		[] => format!("@{}", type_name),
		[(name, value)] if name == "value" => format!("@{}({})", type_name, member_value(value, names)),
		members => {
			let rendered: Vec<String> = members
				.iter()
				.map(|(name, value)| format!("{} = {}", name, member_value(value, names)))
				.collect();
			format!("@{}({})", type_name, rendered.join(", "))
		}
	}
}

fn member_value(value: &MemberValue, names: &NameResolver<'_>) -> String {
	match value {
		MemberValue::Literal(literal) => literal.clone(),
		MemberValue::Str(s) => java_string(s),
		MemberValue::Constant {
			type_name,
			constant,
		} => format!("{}.{}", names.name(type_name), constant),
		MemberValue::Annotations(nested) => {
			let rendered: Vec<String> = nested.iter().map(|a| inline_annotation(a, names)).collect();
			format!("{{{}}}", rendered.join(", "))
		}
	}
}

/// Quote a string as a Java literal.
pub fn java_string(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('"');
	for ch in s.chars() {
		match ch {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

/// Indent each line of a raw code block into the class body.
fn indent_code(code: &str) -> String {
	let mut out = String::new();
	for line in code.trim_end().lines() {
		if line.trim().is_empty() {
			out.push('\n');
		} else {
			out.push_str(INDENT);
			out.push_str(line);
			out.push('\n');
		}
	}
	out
}

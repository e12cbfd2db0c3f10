//! Entity assembly.
//!
//! Turns one [`Table`] plus the generation rules into an [`EntityClass`]:
//!
//! 1. Columns not referenced by an imported key become plain fields
//! 2. Imported keys, grouped by referenced table, become `@ManyToOne` fields
//! 3. Exported keys, grouped by referencing table, become `@OneToMany` fields
//!
//! Assembly is a pure function of the table and configuration. No state is
//! kept between tables, so tables can be assembled in any order or in
//! parallel.

use crate::config::GeneratorConfig;
use crate::metadata::{Column, Key, Table};
use crate::naming::{to_class_name, to_field_name, to_list_field_name};
use crate::render::{EntityClass, EntityField, FieldKind, JavaAnnotation, MemberValue};
use crate::rule::{AdditionalCodePosition, ClassMatcher, FieldMatcher, Interface};
use crate::sql_types::{DECIMAL_TYPE, STRING_TYPE, to_java_type, to_primitive_if_possible};
use crate::{EntityGenError, Result};

const LOMBOK_ANNOTATIONS: &[&str] = &[
	"lombok.Data",
	"lombok.Builder",
	"lombok.NoArgsConstructor",
	"lombok.AllArgsConstructor",
];

const PERSISTENCE: &str = "jakarta.persistence";

fn persistence(name: &str) -> String {
	format!("{}.{}", PERSISTENCE, name)
}

/// Assembles entity classes for one generation run.
pub struct EntityAssembler<'a> {
	config: &'a GeneratorConfig,
}

impl<'a> EntityAssembler<'a> {
	pub fn new(config: &'a GeneratorConfig) -> Self {
		Self { config }
	}

	/// Assemble and render the entity for `table`.
	///
	/// # Errors
	///
	/// Returns [`EntityGenError::SchemaIntegrity`] when no field of the
	/// entity is an identity field.
	pub fn assemble(&self, table: &Table) -> Result<String> {
		Ok(self.assemble_entity(table)?.render())
	}

	/// Assemble the entity model for `table` without rendering it.
	pub fn assemble_entity(&self, table: &Table) -> Result<EntityClass> {
		let config = self.config;
		let class_name = to_class_name(&table.name, &config.class_name_rules);

		if table.primary_key_columns().count() > 1 {
			tracing::warn!(
				table = %table.name,
				"Composite primary key: every key column is annotated with @Id"
			);
		}

		let mut entity = EntityClass::new(&config.package_name, &class_name, &table.name);
		entity.javadoc = self.class_javadoc(table, &class_name);
		entity.annotations = self.class_annotations(table, &class_name);
		entity.interfaces = self.class_interfaces(&class_name);
		entity.extra_imports = self.class_imports(&class_name);
		self.additional_code(&mut entity);

		for column in &table.columns {
			if config.generate_relationships && table.imported_key_for(&column.name).is_some() {
				continue;
			}
			entity.fields.push(self.column_field(table, column, &class_name));
		}

		if config.generate_relationships {
			entity.fields.extend(self.many_to_one_fields(table));
			entity.fields.extend(self.one_to_many_fields(table));
		}

		if !entity.has_identity_field() {
			return Err(EntityGenError::SchemaIntegrity {
				table_name: table.name.clone(),
				class_name,
			});
		}

		tracing::debug!(
			table = %table.name,
			class = %entity.class_name,
			fields = entity.fields.len(),
			"Assembled entity"
		);
		Ok(entity)
	}

	fn class_javadoc(&self, table: &Table, class_name: &str) -> Vec<String> {
		let comments = self
			.config
			.class_additional_comment_rules
			.iter()
			.filter(|rule| rule.matches(class_name))
			.map(|rule| rule.comment.as_str());
		javadoc_lines(table.remarks.as_deref(), comments)
	}

	fn class_annotations(&self, table: &Table, class_name: &str) -> Vec<JavaAnnotation> {
		let mut annotations = Vec::new();

		if self.config.lombok_enabled {
			annotations.extend(LOMBOK_ANNOTATIONS.iter().map(|name| JavaAnnotation::new(*name)));
		}
		annotations.push(JavaAnnotation::new(persistence("Entity")));
		annotations.push(JavaAnnotation::new(persistence("Table")).string("name", &table.name));

		annotations.extend(
			self.config
				.class_annotation_rules
				.iter()
				.filter(|rule| rule.matches(class_name))
				.flat_map(|rule| rule.annotations.iter())
				.map(JavaAnnotation::from),
		);
		annotations
	}

	fn class_interfaces(&self, class_name: &str) -> Vec<String> {
		self.config
			.interface_rules
			.iter()
			.filter(|rule| rule.matches(class_name))
			.flat_map(|rule| rule.interfaces.iter())
			.map(|interface| interface_type(interface, class_name))
			.collect()
	}

	fn class_imports(&self, class_name: &str) -> Vec<String> {
		let mut imports: Vec<String> = Vec::new();
		for rule in &self.config.import_rules {
			if rule.matches(class_name) && !imports.contains(&rule.import_value) {
				imports.push(rule.import_value.clone());
			}
		}
		imports
	}

	fn additional_code(&self, entity: &mut EntityClass) {
		for rule in &self.config.additional_code_rules {
			if !rule.matches(&entity.class_name) || rule.code.trim().is_empty() {
				continue;
			}
			match rule.position {
				AdditionalCodePosition::Top => entity.top_code.push(rule.code.clone()),
				AdditionalCodePosition::Bottom => entity.bottom_code.push(rule.code.clone()),
			}
		}
	}

	/// Resolve the Java type of a plain field.
	///
	/// A matching field type rule wins and is used as written. Otherwise the
	/// column type is mapped, then narrowed to a primitive for non-nullable
	/// columns if enabled.
	fn field_type(&self, column: &Column, class_name: &str, field_name: &str) -> String {
		if let Some(rule) = self
			.config
			.field_type_rules
			.iter()
			.find(|rule| rule.matches(class_name, field_name))
		{
			return rule.type_name.clone();
		}

		let java_type = to_java_type(column.type_code);
		if self.config.use_primitive_for_non_null_field && !column.nullable {
			to_primitive_if_possible(java_type).to_string()
		} else {
			java_type.to_string()
		}
	}

	fn column_field(&self, table: &Table, column: &Column, class_name: &str) -> EntityField {
		let field_name = to_field_name(&column.name);
		let type_name = self.field_type(column, class_name, &field_name);
		let mut field = EntityField::new(&field_name, type_name, FieldKind::Column);

		field.annotations.push(column_annotation(column, table.is_unique(&column.name)));
		if column.primary_key {
			field.annotations.push(JavaAnnotation::new(persistence("Id")));
		}
		if column.auto_increment {
			let mut generated = JavaAnnotation::new(persistence("GeneratedValue"));
			if let Some(strategy) = self.config.generation_strategy() {
				generated = generated.member(
					"strategy",
					MemberValue::Constant {
						type_name: persistence("GenerationType"),
						constant: strategy.to_string(),
					},
				);
			}
			field.annotations.push(generated);
		}

		field.annotations.extend(
			self.config
				.field_annotation_rules
				.iter()
				.filter(|rule| rule.matches(class_name, &field_name))
				.flat_map(|rule| rule.annotations.iter())
				.map(JavaAnnotation::from),
		);

		field.initializer = self
			.config
			.field_default_value_rules
			.iter()
			.find(|rule| rule.matches(class_name, &field_name))
			.map(|rule| rule.default_value.clone());

		let comments = self
			.config
			.field_additional_comment_rules
			.iter()
			.filter(|rule| rule.matches(class_name, &field_name))
			.map(|rule| rule.comment.as_str());
		field.javadoc = javadoc_lines(column.remarks.as_deref(), comments);

		field
	}

	/// One `@ManyToOne` field per referenced table, in first-seen order.
	fn many_to_one_fields(&self, table: &Table) -> Vec<EntityField> {
		group_by(&table.imported_keys, |key| &key.primary_key_table_name)
			.into_iter()
			.map(|(referenced_table, keys)| {
				let class_name = to_class_name(referenced_table, &self.config.class_name_rules);
				let mut field = EntityField::new(
					to_field_name(referenced_table),
					class_name,
					FieldKind::ManyToOne,
				);
				field.annotations.push(JavaAnnotation::new(persistence("ManyToOne")));

				let join_columns: Vec<_> = keys.iter().map(|key| join_column(table, key)).collect();
				match <[JavaAnnotation; 1]>::try_from(join_columns) {
					Ok([single]) => field.annotations.push(single),
					Err(many) => field.annotations.push(
						JavaAnnotation::new(persistence("JoinColumns"))
							.member("value", MemberValue::Annotations(many)),
					),
				}
				field
			})
			.collect()
	}

	/// One `@OneToMany` field per referencing table, in first-seen order.
	fn one_to_many_fields(&self, table: &Table) -> Vec<EntityField> {
		let mapped_by = to_field_name(&table.name);
		group_by(&table.exported_keys, |key| &key.foreign_key_table_name)
			.into_iter()
			.map(|(referencing_table, _)| {
				let class_name = to_class_name(referencing_table, &self.config.class_name_rules);
				let mut field = EntityField::new(
					to_list_field_name(referencing_table),
					format!("java.util.List<{}>", class_name),
					FieldKind::OneToMany,
				);
				field
					.annotations
					.push(JavaAnnotation::new(persistence("OneToMany")).string("mappedBy", &mapped_by));
				field
			})
			.collect()
	}
}

/// `@Column(name, nullable, unique[, length][, precision, scale])`.
///
/// Length and precision follow the mapped column type, not any overridden
/// field type.
fn column_annotation(column: &Column, unique: bool) -> JavaAnnotation {
	let mut annotation = JavaAnnotation::new(persistence("Column"))
		.string("name", &column.name)
		.literal("nullable", column.nullable)
		.literal("unique", unique);

	match to_java_type(column.type_code) {
		STRING_TYPE => {
			annotation = annotation.literal("length", column.column_size);
		}
		DECIMAL_TYPE => {
			annotation = annotation
				.literal("precision", column.column_size)
				.literal("scale", column.decimal_digits);
		}
		_ => {}
	}
	annotation
}

fn join_column(table: &Table, key: &Key) -> JavaAnnotation {
	let nullable = table
		.column(&key.foreign_key_column_name)
		.map(|c| c.nullable)
		.unwrap_or(true);
	JavaAnnotation::new(persistence("JoinColumn"))
		.string("name", &key.foreign_key_column_name)
		.string("referencedColumnName", &key.primary_key_column_name)
		.literal("nullable", nullable)
}

fn interface_type(interface: &Interface, class_name: &str) -> String {
	let generics = interface.resolved_generics(class_name);
	if generics.is_empty() {
		interface.name.clone()
	} else {
		format!("{}<{}>", interface.name, generics.join(", "))
	}
}

/// Schema remarks without empty lines, then rule comments split on `\n`.
fn javadoc_lines<'c>(remarks: Option<&str>, comments: impl Iterator<Item = &'c str>) -> Vec<String> {
	let mut lines: Vec<String> = remarks
		.into_iter()
		.flat_map(str::lines)
		.filter(|line| !line.trim().is_empty())
		.map(str::to_string)
		.collect();
	lines.extend(comments.flat_map(|c| c.split('\n')).map(str::to_string));
	lines
}

/// Order-preserving grouping: groups appear in first-occurrence order.
fn group_by<'k>(keys: &'k [Key], by: impl Fn(&Key) -> &String) -> Vec<(&'k str, Vec<&'k Key>)> {
	let mut groups: Vec<(&str, Vec<&Key>)> = Vec::new();
	for key in keys {
		let name = by(key).as_str();
		match groups.iter_mut().find(|(group, _)| *group == name) {
			Some((_, members)) => members.push(key),
			None => groups.push((name, vec![key])),
		}
	}
	groups
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::metadata::Index;
	use crate::rule::{
		Annotation, ClassAnnotationRule, ClassTarget, FieldAnnotationRule, FieldTarget, FieldTypeRule,
	};
	use crate::sql_types::SqlType;
	use rstest::rstest;

	fn blog() -> Table {
		Table::new("BLOG")
			.with_column(Column::new("ID", SqlType::Integer).primary_key().auto_increment())
			.with_column(Column::new("NAME", SqlType::VarChar).not_null().with_size(100))
	}

	#[test]
	fn test_plain_fields() {
		let config = GeneratorConfig::default();
		let entity = EntityAssembler::new(&config).assemble_entity(&blog()).unwrap();

		assert_eq!(entity.class_name, "Blog");
		let id = entity.field("id").unwrap();
		assert_eq!(id.type_name, "Integer");
		let names: Vec<_> = id.annotations.iter().map(|a| a.type_name.as_str()).collect();
		assert_eq!(
			names,
			vec![
				"jakarta.persistence.Column",
				"jakarta.persistence.Id",
				"jakarta.persistence.GeneratedValue"
			]
		);

		let name = entity.field("name").unwrap();
		let column = name.annotation("jakarta.persistence.Column").unwrap();
		assert_eq!(column.get("length"), Some(&MemberValue::Literal("100".to_string())));
		assert_eq!(column.get("nullable"), Some(&MemberValue::Literal("false".to_string())));
	}

	#[rstest]
	#[case(SqlType::VarChar, true, false)]
	#[case(SqlType::Char, true, false)]
	#[case(SqlType::Decimal, false, true)]
	#[case(SqlType::Numeric, false, true)]
	#[case(SqlType::Integer, false, false)]
	#[case(SqlType::Timestamp, false, false)]
	fn test_length_and_precision_follow_mapped_type(
		#[case] sql_type: SqlType,
		#[case] has_length: bool,
		#[case] has_precision: bool,
	) {
		let column = Column::new("VALUE", sql_type).with_precision(9, 2);
		let annotation = column_annotation(&column, false);
		assert_eq!(annotation.get("length").is_some(), has_length);
		assert_eq!(annotation.get("precision").is_some(), has_precision);
		assert_eq!(annotation.get("scale").is_some(), has_precision);
	}

	#[test]
	fn test_primitive_narrowing_only_for_non_nullable() {
		let table = blog()
			.with_column(Column::new("VIEWS", SqlType::BigInt).not_null())
			.with_column(Column::new("LIKES", SqlType::BigInt));
		let config = GeneratorConfig::default().with_primitive_for_non_null_field(true);
		let entity = EntityAssembler::new(&config).assemble_entity(&table).unwrap();

		assert_eq!(entity.field("views").unwrap().type_name, "long");
		assert_eq!(entity.field("likes").unwrap().type_name, "Long");
		assert_eq!(entity.field("name").unwrap().type_name, "String");
	}

	#[test]
	fn test_field_type_rule_first_match_wins() {
		let mut config = GeneratorConfig::default().with_primitive_for_non_null_field(true);
		config.field_type_rules = vec![
			FieldTypeRule::new(ClassTarget::class("Blog").unwrap(), FieldTarget::field("name").unwrap(), "BlogName"),
			FieldTypeRule::new(ClassTarget::any(), FieldTarget::field("name").unwrap(), "Ignored"),
		];
		let entity = EntityAssembler::new(&config).assemble_entity(&blog()).unwrap();
		let name = entity.field("name").unwrap();
		assert_eq!(name.type_name, "BlogName");

		// @Column still describes the mapped String column
		assert!(name.annotation("jakarta.persistence.Column").unwrap().get("length").is_some());
	}

	#[test]
	fn test_generated_value_without_strategy() {
		let config = GeneratorConfig::default().with_generated_value_strategy(None);
		let rendered = EntityAssembler::new(&config).assemble(&blog()).unwrap();
		assert!(rendered.contains("  @GeneratedValue\n"));
		assert!(!rendered.contains("GenerationType"));
	}

	#[test]
	fn test_identity_from_rule_annotation() {
		let table = Table::new("AUDIT_LOG")
			.with_column(Column::new("LOG_ID", SqlType::BigInt).not_null())
			.with_column(Column::new("MESSAGE", SqlType::VarChar));

		let config = GeneratorConfig::default();
		let err = EntityAssembler::new(&config).assemble(&table).unwrap_err();
		assert!(matches!(err, EntityGenError::SchemaIntegrity { ref class_name, .. } if class_name == "AuditLog"));

		let mut config = GeneratorConfig::default();
		config.field_annotation_rules.push(FieldAnnotationRule::new(
			ClassTarget::class("AuditLog").unwrap(),
			FieldTarget::field("logId").unwrap(),
			vec![Annotation::new("javax.persistence.Id")],
		));
		let entity = EntityAssembler::new(&config).assemble_entity(&table).unwrap();
		assert!(entity.field("logId").unwrap().is_identity());
	}

	#[test]
	fn test_class_annotations_order() {
		let mut config = GeneratorConfig::default();
		config.class_annotation_rules.push(ClassAnnotationRule::new(
			ClassTarget::any(),
			vec![Annotation::new("lombok.ToString").with_attribute("callSuper", "false")],
		));
		config.class_annotation_rules.push(ClassAnnotationRule::new(
			ClassTarget::class("Other").unwrap(),
			vec![Annotation::new("lombok.Value")],
		));

		let entity = EntityAssembler::new(&config).assemble_entity(&blog()).unwrap();
		let names: Vec<_> = entity.annotations.iter().map(|a| a.type_name.as_str()).collect();
		assert_eq!(
			names,
			vec![
				"lombok.Data",
				"lombok.Builder",
				"lombok.NoArgsConstructor",
				"lombok.AllArgsConstructor",
				"jakarta.persistence.Entity",
				"jakarta.persistence.Table",
				"lombok.ToString",
			]
		);

		let without_lombok = GeneratorConfig::default().with_lombok(false);
		let entity = EntityAssembler::new(&without_lombok).assemble_entity(&blog()).unwrap();
		assert_eq!(entity.annotations[0].type_name, "jakarta.persistence.Entity");
	}

	#[test]
	fn test_table_annotation_uses_table_name() {
		let mut config = GeneratorConfig::default();
		config.class_name_rules.push(crate::rule::ClassNameRule::new("BLOG", "Weblog"));
		let rendered = EntityAssembler::new(&config).assemble(&blog()).unwrap();
		assert!(rendered.contains("public class Weblog {"));
		assert!(rendered.contains("@Table(\n    name = \"BLOG\"\n)"));
	}

	#[test]
	fn test_unique_from_index() {
		let table = blog().with_index(Index::unique(Some("UK_NAME"), "NAME"));
		let config = GeneratorConfig::default();
		let entity = EntityAssembler::new(&config).assemble_entity(&table).unwrap();
		let column = entity
			.field("name")
			.unwrap()
			.annotation("jakarta.persistence.Column")
			.unwrap();
		assert_eq!(column.get("unique"), Some(&MemberValue::Literal("true".to_string())));
	}

	#[test]
	fn test_javadoc_lines() {
		let lines = javadoc_lines(Some("first\n\nsecond"), ["rule one\nrule two"].into_iter());
		assert_eq!(lines, vec!["first", "second", "rule one", "rule two"]);
		assert!(javadoc_lines(None, std::iter::empty()).is_empty());
	}

	#[test]
	fn test_relationships_disabled() {
		let table = Table::new("ARTICLE")
			.with_column(Column::new("ID", SqlType::Integer).primary_key())
			.with_column(Column::new("BLOG_ID", SqlType::Integer).not_null())
			.with_imported_key(Key::new("BLOG", "ID", "ARTICLE", "BLOG_ID"))
			.with_exported_key(Key::new("ARTICLE", "ID", "COMMENT", "ARTICLE_ID"));
		let config = GeneratorConfig::default().with_relationships(false);
		let entity = EntityAssembler::new(&config).assemble_entity(&table).unwrap();

		let names: Vec<_> = entity.fields.iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec!["id", "blogId"]);
		assert!(entity.fields.iter().all(|f| f.kind == FieldKind::Column));
	}
}

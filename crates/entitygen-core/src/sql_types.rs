//! SQL type codes and their Java counterparts.
//!
//! Type codes follow the JDBC `java.sql.Types` numbering, which is what
//! database-introspection interfaces report for each column.

/// Java type used for arbitrary-precision decimal columns.
pub const DECIMAL_TYPE: &str = "java.math.BigDecimal";

/// Java type used for character columns.
pub const STRING_TYPE: &str = "String";

/// SQL column type, numbered like `java.sql.Types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
	Array,
	BigInt,
	Binary,
	Bit,
	Blob,
	Boolean,
	Char,
	Clob,
	Date,
	Decimal,
	Double,
	Float,
	Integer,
	LongNVarChar,
	LongVarBinary,
	LongVarChar,
	NChar,
	NClob,
	Numeric,
	NVarChar,
	Real,
	Ref,
	SmallInt,
	Struct,
	Time,
	TimeWithTimezone,
	Timestamp,
	TimestampWithTimezone,
	TinyInt,
	VarBinary,
	VarChar,
	/// Any code outside the table above
	Other(i32),
}

impl SqlType {
	/// The JDBC type code.
	pub fn code(self) -> i32 {
		match self {
			SqlType::Array => 2003,
			SqlType::BigInt => -5,
			SqlType::Binary => -2,
			SqlType::Bit => -7,
			SqlType::Blob => 2004,
			SqlType::Boolean => 16,
			SqlType::Char => 1,
			SqlType::Clob => 2005,
			SqlType::Date => 91,
			SqlType::Decimal => 3,
			SqlType::Double => 8,
			SqlType::Float => 6,
			SqlType::Integer => 4,
			SqlType::LongNVarChar => -16,
			SqlType::LongVarBinary => -4,
			SqlType::LongVarChar => -1,
			SqlType::NChar => -15,
			SqlType::NClob => 2011,
			SqlType::Numeric => 2,
			SqlType::NVarChar => -9,
			SqlType::Real => 7,
			SqlType::Ref => 2006,
			SqlType::SmallInt => 5,
			SqlType::Struct => 2002,
			SqlType::Time => 92,
			SqlType::TimeWithTimezone => 2013,
			SqlType::Timestamp => 93,
			SqlType::TimestampWithTimezone => 2014,
			SqlType::TinyInt => -6,
			SqlType::VarBinary => -3,
			SqlType::VarChar => 12,
			SqlType::Other(code) => code,
		}
	}

	/// Resolve a JDBC type code. Unknown codes become [`SqlType::Other`].
	pub fn from_code(code: i32) -> Self {
		match code {
			2003 => SqlType::Array,
			-5 => SqlType::BigInt,
			-2 => SqlType::Binary,
			-7 => SqlType::Bit,
			2004 => SqlType::Blob,
			16 => SqlType::Boolean,
			1 => SqlType::Char,
			2005 => SqlType::Clob,
			91 => SqlType::Date,
			3 => SqlType::Decimal,
			8 => SqlType::Double,
			6 => SqlType::Float,
			4 => SqlType::Integer,
			-16 => SqlType::LongNVarChar,
			-4 => SqlType::LongVarBinary,
			-1 => SqlType::LongVarChar,
			-15 => SqlType::NChar,
			2011 => SqlType::NClob,
			2 => SqlType::Numeric,
			-9 => SqlType::NVarChar,
			7 => SqlType::Real,
			2006 => SqlType::Ref,
			5 => SqlType::SmallInt,
			2002 => SqlType::Struct,
			92 => SqlType::Time,
			2013 => SqlType::TimeWithTimezone,
			93 => SqlType::Timestamp,
			2014 => SqlType::TimestampWithTimezone,
			-6 => SqlType::TinyInt,
			-3 => SqlType::VarBinary,
			12 => SqlType::VarChar,
			other => SqlType::Other(other),
		}
	}

	/// Parse a declared column type such as `VARCHAR(50)` or `DECIMAL(9, 2)`.
	///
	/// Returns the type together with the optional size and scale found
	/// between parentheses. Names that match no known type fall back to
	/// SQLite affinity rules, so the result is never an error.
	///
	/// # Examples
	///
	/// ```rust
	/// use entitygen_core::SqlType;
	///
	/// assert_eq!(SqlType::from_type_name("VARCHAR(50)"), (SqlType::VarChar, Some(50), None));
	/// assert_eq!(SqlType::from_type_name("numeric(9,2)"), (SqlType::Numeric, Some(9), Some(2)));
	/// ```
	pub fn from_type_name(declared: &str) -> (Self, Option<i32>, Option<i32>) {
		let declared = declared.trim();
		let (base, args) = match declared.find('(') {
			Some(open) => {
				let close = declared.rfind(')').unwrap_or(declared.len());
				let inner = if close > open {
					&declared[open + 1..close]
				} else {
					""
				};
				(declared[..open].trim(), inner)
			}
			None => (declared, ""),
		};

		let mut numbers = args.split(',').map(|n| n.trim().parse::<i32>().ok());
		let size = numbers.next().flatten();
		let scale = numbers.next().flatten();

		let upper = base.to_ascii_uppercase();
		let sql_type = match upper.as_str() {
			"ARRAY" => SqlType::Array,
			"BIGINT" | "INT8" | "UNSIGNED BIG INT" => SqlType::BigInt,
			"BINARY" => SqlType::Binary,
			"BIT" => SqlType::Bit,
			"BLOB" | "BYTEA" => SqlType::Blob,
			"BOOLEAN" | "BOOL" => SqlType::Boolean,
			"CHAR" | "CHARACTER" => SqlType::Char,
			"CLOB" => SqlType::Clob,
			"DATE" => SqlType::Date,
			"DECIMAL" | "DEC" => SqlType::Decimal,
			"DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => SqlType::Double,
			"FLOAT" => SqlType::Float,
			"INTEGER" | "INT" | "INT4" | "MEDIUMINT" => SqlType::Integer,
			"LONGVARCHAR" | "TEXT" | "LONGTEXT" | "MEDIUMTEXT" => SqlType::LongVarChar,
			"NCHAR" | "NATIVE CHARACTER" => SqlType::NChar,
			"NCLOB" => SqlType::NClob,
			"NUMERIC" => SqlType::Numeric,
			"NVARCHAR" | "NVARCHAR2" => SqlType::NVarChar,
			"REAL" | "FLOAT4" => SqlType::Real,
			"SMALLINT" | "INT2" => SqlType::SmallInt,
			"TIME" => SqlType::Time,
			"TIME WITH TIME ZONE" | "TIMETZ" => SqlType::TimeWithTimezone,
			"TIMESTAMP" | "DATETIME" => SqlType::Timestamp,
			"TIMESTAMP WITH TIME ZONE" | "TIMESTAMPTZ" => SqlType::TimestampWithTimezone,
			"TINYINT" => SqlType::TinyInt,
			"VARBINARY" => SqlType::VarBinary,
			"VARCHAR" | "VARYING CHARACTER" | "CHARACTER VARYING" => SqlType::VarChar,
			_ => Self::from_affinity(&upper),
		};

		(sql_type, size, scale)
	}

	/// SQLite column affinity rules for names outside the known table.
	fn from_affinity(upper: &str) -> Self {
		if upper.contains("INT") {
			SqlType::Integer
		} else if upper.contains("CHAR") || upper.contains("CLOB") || upper.contains("TEXT") {
			SqlType::VarChar
		} else if upper.is_empty() || upper.contains("BLOB") {
			SqlType::Blob
		} else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
			SqlType::Double
		} else {
			SqlType::Numeric
		}
	}
}

/// Map a JDBC type code to the Java type name of a generated field.
///
/// Codes outside the mapping table resolve to `String`; this never fails.
///
/// # Examples
///
/// ```rust
/// use entitygen_core::to_java_type;
///
/// assert_eq!(to_java_type(4), "Integer");
/// assert_eq!(to_java_type(3), "java.math.BigDecimal");
/// assert_eq!(to_java_type(1111), "String");
/// ```
pub fn to_java_type(type_code: i32) -> &'static str {
	match SqlType::from_code(type_code) {
		SqlType::Array => "java.sql.Array",
		SqlType::BigInt => "Long",
		// Wrapper like BOOLEAN; narrowed to `boolean` for non-null columns when primitives are enabled
		SqlType::Bit => "Boolean",
		SqlType::Blob => "java.sql.Blob",
		SqlType::Boolean => "Boolean",
		SqlType::Char => STRING_TYPE,
		SqlType::Clob => "java.sql.Clob",
		SqlType::Date => "java.sql.Date",
		SqlType::Decimal => DECIMAL_TYPE,
		SqlType::Double => "Double",
		SqlType::Float => "Float",
		SqlType::Integer => "Integer",
		SqlType::LongVarChar => STRING_TYPE,
		SqlType::Numeric => DECIMAL_TYPE,
		SqlType::Real => "Float",
		SqlType::Ref => "java.sql.Ref",
		SqlType::SmallInt => "Short",
		SqlType::Struct => "java.sql.Struct",
		SqlType::Time | SqlType::TimeWithTimezone => "java.sql.Time",
		SqlType::Timestamp | SqlType::TimestampWithTimezone => "java.sql.Timestamp",
		SqlType::TinyInt => "Byte",
		SqlType::VarChar => STRING_TYPE,
		_ => STRING_TYPE,
	}
}

/// Narrow a wrapper type to its primitive, e.g. `Integer` -> `int`.
///
/// Anything that is not a numeric or boolean wrapper passes through.
pub fn to_primitive_if_possible(type_name: &str) -> &str {
	match type_name {
		"Byte" => "byte",
		"Short" => "short",
		"Integer" => "int",
		"Long" => "long",
		"Double" => "double",
		"Float" => "float",
		"Boolean" => "boolean",
		other => other,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(SqlType::Array, "java.sql.Array")]
	#[case(SqlType::BigInt, "Long")]
	#[case(SqlType::Bit, "Boolean")]
	#[case(SqlType::Blob, "java.sql.Blob")]
	#[case(SqlType::Boolean, "Boolean")]
	#[case(SqlType::Char, "String")]
	#[case(SqlType::Clob, "java.sql.Clob")]
	#[case(SqlType::Date, "java.sql.Date")]
	#[case(SqlType::Decimal, "java.math.BigDecimal")]
	#[case(SqlType::Double, "Double")]
	#[case(SqlType::Float, "Float")]
	#[case(SqlType::Integer, "Integer")]
	#[case(SqlType::LongVarChar, "String")]
	#[case(SqlType::Numeric, "java.math.BigDecimal")]
	#[case(SqlType::Real, "Float")]
	#[case(SqlType::Ref, "java.sql.Ref")]
	#[case(SqlType::SmallInt, "Short")]
	#[case(SqlType::Struct, "java.sql.Struct")]
	#[case(SqlType::Time, "java.sql.Time")]
	#[case(SqlType::TimeWithTimezone, "java.sql.Time")]
	#[case(SqlType::Timestamp, "java.sql.Timestamp")]
	#[case(SqlType::TimestampWithTimezone, "java.sql.Timestamp")]
	#[case(SqlType::TinyInt, "Byte")]
	#[case(SqlType::VarChar, "String")]
	fn test_mapping_table(#[case] sql_type: SqlType, #[case] expected: &str) {
		assert_eq!(to_java_type(sql_type.code()), expected);
	}

	#[rstest]
	#[case(1111)]
	#[case(-3)]
	#[case(0)]
	#[case(i32::MAX)]
	fn test_unknown_codes_fall_back_to_string(#[case] code: i32) {
		assert_eq!(to_java_type(code), STRING_TYPE);
	}

	#[rstest]
	#[case("Byte", "byte")]
	#[case("Short", "short")]
	#[case("Integer", "int")]
	#[case("Long", "long")]
	#[case("Double", "double")]
	#[case("Float", "float")]
	#[case("Boolean", "boolean")]
	#[case("String", "String")]
	#[case("java.math.BigDecimal", "java.math.BigDecimal")]
	#[case("java.sql.Timestamp", "java.sql.Timestamp")]
	fn test_primitive_narrowing(#[case] input: &str, #[case] expected: &str) {
		assert_eq!(to_primitive_if_possible(input), expected);
	}

	#[test]
	fn test_non_null_bit_narrows_to_primitive_boolean() {
		let java_type = to_java_type(SqlType::Bit.code());
		assert_eq!(java_type, "Boolean");
		assert_eq!(to_primitive_if_possible(java_type), "boolean");
	}

	#[test]
	fn test_code_round_trip_for_known_types() {
		for code in [2003, -5, -7, 2004, 16, 1, 2005, 91, 3, 8, 6, 4, -1, 2, 7, 2006, 5, 2002] {
			assert_eq!(SqlType::from_code(code).code(), code);
		}
		assert_eq!(SqlType::from_code(4242), SqlType::Other(4242));
	}

	#[rstest]
	#[case("INTEGER", SqlType::Integer, None, None)]
	#[case("varchar(255)", SqlType::VarChar, Some(255), None)]
	#[case("DECIMAL(10, 2)", SqlType::Decimal, Some(10), Some(2))]
	#[case("TEXT", SqlType::LongVarChar, None, None)]
	#[case("timestamp with time zone", SqlType::TimestampWithTimezone, None, None)]
	#[case("UNSIGNED MEDIUM INTEGER", SqlType::Integer, None, None)]
	#[case("VARYING CHARACTER(10)", SqlType::VarChar, Some(10), None)]
	#[case("", SqlType::Blob, None, None)]
	#[case("MONEY", SqlType::Numeric, None, None)]
	fn test_from_type_name(
		#[case] declared: &str,
		#[case] expected: SqlType,
		#[case] size: Option<i32>,
		#[case] scale: Option<i32>,
	) {
		assert_eq!(SqlType::from_type_name(declared), (expected, size, scale));
	}
}

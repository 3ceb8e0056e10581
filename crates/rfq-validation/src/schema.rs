//! Structural schema checking over JSON values.
//!
//! A small combinator layer: schemas are built from typed fields and nested
//! objects, then evaluated against a `serde_json::Value`. This is the first
//! phase of validation; semantic rules run afterwards on values that are
//! already structurally sound.

use crate::ValidationError;
use serde_json::Value;

/// Expected type of a field.
#[derive(Debug)]
pub enum FieldType {
	String,
	/// A non-negative JSON integer.
	Integer,
	Array(Box<FieldType>),
	Object(Schema),
}

/// A named field inside an object schema.
#[derive(Debug)]
pub struct Field {
	pub name: String,
	pub field_type: FieldType,
	pub required: bool,
}

impl Field {
	/// A field that must be present.
	pub fn required(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			required: true,
		}
	}

	/// A field that may be absent; absence is never an error.
	pub fn optional(name: impl Into<String>, field_type: FieldType) -> Self {
		Self {
			name: name.into(),
			field_type,
			required: false,
		}
	}
}

/// An object schema.
#[derive(Debug)]
pub struct Schema {
	fields: Vec<Field>,
}

impl Schema {
	pub fn new(fields: Vec<Field>) -> Self {
		Self { fields }
	}

	/// Validates `value` as an object conforming to this schema.
	///
	/// `path` is the location of `value` in the enclosing payload and
	/// prefixes every reported field path.
	pub fn validate(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
		let object = value
			.as_object()
			.ok_or_else(|| ValidationError::new(path, type_mismatch("object", value)))?;

		for field in &self.fields {
			let field_path = join(path, &field.name);
			match object.get(&field.name) {
				Some(field_value) if !field_value.is_null() => {
					validate_type(&field_path, field_value, &field.field_type)?;
				}
				_ if field.required => {
					return Err(ValidationError::new(field_path, "missing required field"));
				}
				_ => {}
			}
		}
		Ok(())
	}
}

fn validate_type(path: &str, value: &Value, expected: &FieldType) -> Result<(), ValidationError> {
	match expected {
		FieldType::String => {
			if !value.is_string() {
				return Err(ValidationError::new(path, type_mismatch("string", value)));
			}
		}
		FieldType::Integer => {
			if !value.is_u64() {
				return Err(ValidationError::new(
					path,
					type_mismatch("non-negative integer", value),
				));
			}
		}
		FieldType::Array(inner) => {
			let items = value
				.as_array()
				.ok_or_else(|| ValidationError::new(path, type_mismatch("array", value)))?;
			for (i, item) in items.iter().enumerate() {
				validate_type(&format!("{}[{}]", path, i), item, inner)?;
			}
		}
		FieldType::Object(schema) => {
			schema.validate(value, path)?;
		}
	}
	Ok(())
}

fn join(path: &str, name: &str) -> String {
	if path.is_empty() {
		name.to_string()
	} else {
		format!("{}.{}", path, name)
	}
}

fn type_mismatch(expected: &str, actual: &Value) -> String {
	let actual = match actual {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	};
	format!("expected {}, got {}", expected, actual)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn order_schema() -> Schema {
		Schema::new(vec![
			Field::required("maker", FieldType::String),
			Field::required("expiry", FieldType::Integer),
			Field::optional("tags", FieldType::Array(Box::new(FieldType::String))),
			Field::optional(
				"meta",
				FieldType::Object(Schema::new(vec![Field::required(
					"nonce",
					FieldType::String,
				)])),
			),
		])
	}

	#[test]
	fn accepts_conforming_objects() {
		let value = json!({"maker": "mm1", "expiry": 10, "tags": ["a"]});
		assert!(order_schema().validate(&value, "").is_ok());
	}

	#[test]
	fn reports_missing_required_field() {
		let value = json!({"expiry": 10});
		let err = order_schema().validate(&value, "").unwrap_err();
		assert_eq!(err.path, "maker");
	}

	#[test]
	fn reports_nested_paths() {
		let value = json!({"maker": "mm1", "expiry": 10, "meta": {"nonce": 1}});
		let err = order_schema().validate(&value, "").unwrap_err();
		assert_eq!(err.path, "meta.nonce");

		let value = json!({"maker": "mm1", "expiry": 10, "tags": ["a", 2]});
		let err = order_schema().validate(&value, "").unwrap_err();
		assert_eq!(err.path, "tags[1]");
	}

	#[test]
	fn absent_optional_fields_are_fine() {
		let value = json!({"maker": "mm1", "expiry": 10, "meta": null});
		assert!(order_schema().validate(&value, "").is_ok());
	}

	#[test]
	fn rejects_negative_integers() {
		let value = json!({"maker": "mm1", "expiry": -5});
		let err = order_schema().validate(&value, "").unwrap_err();
		assert_eq!(err.path, "expiry");
	}
}

use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// A predicate every supplied value of a column must pass.
pub type ValidateFunc = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// The closed set of value kinds a column may hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    #[serde(rename = "string")]
    Text,
    Number,
    Boolean,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Text => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
        }
    }

    pub(crate) fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (DataType::Text, Value::String(_))
                | (DataType::Number, Value::Number(_))
                | (DataType::Boolean, Value::Bool(_))
        )
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let datatype = match self {
            DataType::Text => "TXT",
            DataType::Number => "NUM",
            DataType::Boolean => "BOOL",
        };
        write!(f, "{}", datatype)
    }
}

/// Name of the JSON kind of `value`, as reported in type mismatches.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The contract of a single column.
///
/// Built with [`ColumnDefinition::new`] and the chained setters; anything
/// left alone keeps its default (text, not unique, not required, not
/// auto-incrementing, nullable, null default, no validator).
#[derive(Clone)]
pub struct ColumnDefinition {
    pub(super) name: String,
    pub(super) datatype: DataType,
    pub(super) unique: bool,
    pub(super) required: bool,
    pub(super) auto_increment: bool,
    pub(super) nullable: bool,
    pub(super) default: Value,
    pub(super) validate_func: Option<ValidateFunc>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>) -> ColumnDefinition {
        ColumnDefinition {
            name: name.into(),
            datatype: DataType::default(),
            unique: false,
            required: false,
            auto_increment: false,
            nullable: true,
            default: Value::Null,
            validate_func: None,
        }
    }

    pub fn datatype(mut self, datatype: DataType) -> Self {
        self.datatype = datatype;
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn validate_with<F>(mut self, func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate_func = Some(Arc::new(func));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_datatype(&self) -> DataType {
        self.datatype
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn get_default(&self) -> &Value {
        &self.default
    }

    pub fn has_validator(&self) -> bool {
        self.validate_func.is_some()
    }

    fn to_serialized(&self) -> SerializedColumn {
        SerializedColumn {
            datatype: self.datatype,
            unique: self.unique,
            required: self.required,
            auto_increment: self.auto_increment,
            nullable: self.nullable,
            default: self.default.clone(),
        }
    }

    fn from_serialized(name: String, column: SerializedColumn) -> ColumnDefinition {
        ColumnDefinition {
            name,
            datatype: column.datatype,
            unique: column.unique,
            required: column.required,
            auto_increment: column.auto_increment,
            nullable: column.nullable,
            default: column.default,
            validate_func: None,
        }
    }
}

impl Debug for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("name", &self.name)
            .field("datatype", &self.datatype)
            .field("unique", &self.unique)
            .field("required", &self.required)
            .field("auto_increment", &self.auto_increment)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .field("validate_func", &self.validate_func.is_some())
            .finish()
    }
}

/// On-disk form of a column. The validator is a closure and never leaves
/// memory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedColumn {
    #[serde(rename = "type", default)]
    pub datatype: DataType,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Value,
}

fn default_nullable() -> bool {
    true
}

/// On-disk form of a [`Schema`]: one entry of the schema file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SerializedSchema {
    #[serde(rename = "lastID")]
    pub last_id: u64,
    pub columns: IndexMap<String, SerializedColumn>,
}

/// The column contract and id counter of one table.
#[derive(Clone, Debug)]
pub struct Schema {
    table_name: String,
    columns: IndexMap<String, ColumnDefinition>,
    pub(super) last_id: u64,
}

impl Schema {
    pub fn new(table_name: impl Into<String>) -> Schema {
        //! Create an empty schema for the table `table_name`.

        Schema {
            table_name: table_name.into(),
            columns: IndexMap::new(),
            last_id: 0,
        }
    }

    pub fn restore(table_name: impl Into<String>, serialized: SerializedSchema) -> Schema {
        //! Rebuild a schema from its on-disk form.
        //!
        //! Column validators cannot be persisted, so restored columns carry
        //! none.

        let columns = serialized
            .columns
            .into_iter()
            .map(|(name, column)| {
                (
                    name.clone(),
                    ColumnDefinition::from_serialized(name, column),
                )
            })
            .collect();

        Schema {
            table_name: table_name.into(),
            columns,
            last_id: serialized.last_id,
        }
    }

    pub fn add_column(&mut self, column: ColumnDefinition) -> StoreResult<()> {
        //! Append a column to the schema.
        //!
        //! Fails with [`StoreError::DuplicateColumn`] when a column of the same
        //! name, ignoring case, is already present.

        let lowered = column.name.to_lowercase();
        if self
            .columns
            .keys()
            .any(|existing| existing.to_lowercase() == lowered)
        {
            return Err(StoreError::DuplicateColumn(column.name));
        }

        self.columns.insert(column.name.clone(), column);
        Ok(())
    }

    pub fn with_column(mut self, column: ColumnDefinition) -> StoreResult<Schema> {
        self.add_column(column)?;
        Ok(self)
    }

    pub fn serialize(&self) -> SerializedSchema {
        SerializedSchema {
            last_id: self.last_id,
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.to_serialized()))
                .collect(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.values()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.get(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub(super) fn auto_increment_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .values()
            .filter(|column| column.auto_increment)
            .map(|column| column.name.as_str())
    }
}

impl Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let schema: Vec<String> = self
            .columns
            .values()
            .map(|column| format!("{} ({})", column.name, column.datatype))
            .collect();
        write!(f, "{}", schema.join(" | "))
    }
}

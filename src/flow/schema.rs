use super::OrderedMap;
use crate::error::SchemaError;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

tag_enum! {
    /// The root of a parameter schema is always an object.
    SchemaRootType, "schema root type", {
        Object => "object",
    }
}

/// Type description of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertySchema {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<String>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Integer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Array {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        items: Box<PropertySchema>,
    },
    Object(ObjectSchema),
}

impl PropertySchema {
    pub fn string(description: impl Into<String>) -> Self {
        PropertySchema::String {
            description: Some(description.into()),
            choices: Vec::new(),
        }
    }

    /// A string restricted to `choices`.
    pub fn one_of<I, S>(description: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropertySchema::String {
            description: Some(description.into()),
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn number(description: impl Into<String>) -> Self {
        PropertySchema::Number {
            description: Some(description.into()),
        }
    }

    pub fn integer(description: impl Into<String>) -> Self {
        PropertySchema::Integer {
            description: Some(description.into()),
        }
    }

    pub fn boolean(description: impl Into<String>) -> Self {
        PropertySchema::Boolean {
            description: Some(description.into()),
        }
    }

    pub fn array(description: impl Into<String>, items: PropertySchema) -> Self {
        PropertySchema::Array {
            description: Some(description.into()),
            items: Box::new(items),
        }
    }

    pub fn object(schema: ObjectSchema) -> Self {
        PropertySchema::Object(schema)
    }

    /// The JSON-schema type name of this property.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertySchema::String { .. } => "string",
            PropertySchema::Number { .. } => "number",
            PropertySchema::Integer { .. } => "integer",
            PropertySchema::Boolean { .. } => "boolean",
            PropertySchema::Array { .. } => "array",
            PropertySchema::Object(_) => "object",
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            PropertySchema::String { description, .. }
            | PropertySchema::Number { description }
            | PropertySchema::Integer { description }
            | PropertySchema::Boolean { description }
            | PropertySchema::Array { description, .. } => description.as_deref(),
            PropertySchema::Object(schema) => schema.description.as_deref(),
        }
    }

    fn check(&self, tool_id: &str, path: &str) -> Result<(), SchemaError> {
        match self {
            PropertySchema::Object(schema) => schema.check(tool_id, path),
            PropertySchema::Array { items, .. } => items.check(tool_id, &format!("{}[]", path)),
            _ => Ok(()),
        }
    }
}

/// An object with named properties and a list of required ones.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: OrderedMap<PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares an optional property.
    pub fn property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        self.properties.insert(name, schema);
        self
    }

    /// Declares a property and marks it required.
    pub fn required_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
        let name = name.into();
        self.required.push(name.clone());
        self.properties.insert(name, schema);
        self
    }

    /// Marks names as required without declaring them.
    pub fn require<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Every required field must be declared in `properties`, at every level.
    pub(crate) fn check(&self, tool_id: &str, path: &str) -> Result<(), SchemaError> {
        let mut seen = AHashSet::new();
        for field in &self.required {
            if !seen.insert(field.as_str()) {
                return Err(SchemaError::RepeatedRequiredField {
                    tool_id: tool_id.to_string(),
                    path: path.to_string(),
                    field: field.clone(),
                });
            }
            if !self.properties.contains_key(field) {
                return Err(SchemaError::UndeclaredRequiredField {
                    tool_id: tool_id.to_string(),
                    path: path.to_string(),
                    field: field.clone(),
                });
            }
        }
        for (name, property) in self.properties.iter() {
            property.check(tool_id, &format!("{}.{}", path, name))?;
        }
        Ok(())
    }
}

/// The parameter schema of a tool: a root object schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    kind: SchemaRootType,
    #[serde(flatten)]
    root: ObjectSchema,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::new(ObjectSchema::default())
    }
}

impl ParameterSchema {
    pub fn new(root: ObjectSchema) -> Self {
        Self {
            kind: SchemaRootType::Object,
            root,
        }
    }

    pub fn root(&self) -> &ObjectSchema {
        &self.root
    }

    pub fn properties(&self) -> &OrderedMap<PropertySchema> {
        &self.root.properties
    }

    pub fn required(&self) -> &[String] {
        &self.root.required
    }

    pub(crate) fn check(&self, tool_id: &str) -> Result<(), SchemaError> {
        self.root.check(tool_id, "parameters")
    }
}

impl From<ObjectSchema> for ParameterSchema {
    fn from(root: ObjectSchema) -> Self {
        Self::new(root)
    }
}

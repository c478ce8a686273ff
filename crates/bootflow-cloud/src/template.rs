//! Declarative template documents and their composition
//!
//! A [`Template`] is three named mappings (parameters, resources, outputs)
//! plus a description. Fragment builders each return a partial template;
//! [`compose`] folds them into one document. A name that reappears in a later
//! fragment replaces the earlier entry, so the caller's ordering is also the
//! conflict-resolution rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// A declarative infrastructure document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(
        rename = "AWSTemplateFormatVersion",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub format_version: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resources: BTreeMap<String, Resource>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Parameter {
    pub fn string(description: impl Into<String>, default: Option<&str>) -> Self {
        Self {
            description: description.into(),
            kind: "String".to_string(),
            default: default.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
}

impl Resource {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.depends_on = Some(name.into());
        self
    }

    pub fn retain(mut self) -> Self {
        self.deletion_policy = Some("Retain".to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: serde_json::Value,
}

impl Output {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }
}

/// `{"Ref": name}`
pub fn reference(name: &str) -> serde_json::Value {
    serde_json::json!({ "Ref": name })
}

/// `{"Fn::GetAtt": [name, attribute]}`
pub fn get_att(name: &str, attribute: &str) -> serde_json::Value {
    serde_json::json!({ "Fn::GetAtt": [name, attribute] })
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            format_version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, resource: Resource) -> Self {
        self.resources.insert(name.into(), resource);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, output: Output) -> Self {
        self.outputs.insert(name.into(), output);
        self
    }

    /// Fold `fragments` into this template, later entries winning on name
    /// collisions. Only the three mappings are merged; format version and
    /// description stay as they are on `self`.
    pub fn merge<I>(mut self, fragments: I) -> Self
    where
        I: IntoIterator<Item = Template>,
    {
        for fragment in fragments {
            self.merge_in(fragment);
        }
        self
    }

    pub fn merge_in(&mut self, fragment: Template) {
        self.parameters.extend(fragment.parameters);
        self.resources.extend(fragment.resources);
        self.outputs.extend(fragment.outputs);
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Compose `base` with `fragments` in order.
pub fn compose<I>(base: Template, fragments: I) -> Template
where
    I: IntoIterator<Item = Template>,
{
    base.merge(fragments)
}

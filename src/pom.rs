//! Read-only access to parsed POM documents.
//!
//! A POM is parsed into a `serde_json::Value` tree: text-only elements
//! become strings, empty elements become `null`, elements with children
//! become objects, and repeated children become arrays. Attributes and
//! namespaces are dropped. Accessors never fail; missing values read as `""`.

use serde_json::{Map, Value};

use crate::repository::ArtifactError;

/// Packaging type of artifacts that are themselves dependency manifests.
pub const POM_PACKAGING: &str = "pom";

/// A parsed metadata document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pom {
    document: Value,
}

impl Pom {
    /// Wraps an already parsed document tree.
    #[must_use]
    pub fn from_value(document: Value) -> Self {
        Self { document }
    }

    /// Parses POM XML.
    ///
    /// `source` names the document in errors, typically its URL.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::MalformedDocument`] if `xml` is not
    /// well-formed.
    pub fn parse(xml: &str, source: &str) -> Result<Self, ArtifactError> {
        let document = roxmltree::Document::parse(xml)
            .map_err(|error| ArtifactError::malformed_document(source, error.to_string()))?;
        let root = document.root_element();
        let mut top = Map::new();
        top.insert(root.tag_name().name().to_string(), element_to_value(root));
        Ok(Self {
            document: Value::Object(top),
        })
    }

    /// The underlying document tree.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Looks up `key` under `project`, then at the top level.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&Value> {
        lookup(&self.document, key)
    }

    /// String value of `key`, or `""` when absent or not a string.
    #[must_use]
    pub fn attribute(&self, key: &str) -> &str {
        attribute(&self.document, key)
    }

    /// Maven `groupId`.
    #[must_use]
    pub fn group_id(&self) -> &str {
        self.attribute("groupId")
    }

    /// Maven `artifactId`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.attribute("artifactId")
    }

    #[must_use]
    pub fn version(&self) -> &str {
        self.attribute("version")
    }

    /// Maven `packaging`, e.g. `pom` or `zip`.
    #[must_use]
    pub fn packaging_type(&self) -> &str {
        self.attribute("packaging")
    }

    #[must_use]
    pub fn url(&self) -> &str {
        self.attribute("url")
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.attribute("description")
    }

    #[must_use]
    pub fn maintainer(&self) -> &str {
        self.attribute("maintainer")
    }

    /// License as `"{name} <{url}>"`, `"{name}"`, or `""`.
    ///
    /// Only the first license is considered when several are listed.
    #[must_use]
    pub fn license(&self) -> String {
        let license = match self.node("licenses").and_then(|licenses| licenses.get("license")) {
            Some(Value::Array(items)) => items.first(),
            other => other,
        };
        let Some(license) = license else {
            return String::new();
        };
        let field = |key: &str| {
            license
                .get(key)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
        };
        match (field("name"), field("url")) {
            (Some(name), Some(url)) => format!("{name} <{url}>"),
            (Some(name), None) => name.to_string(),
            (None, Some(url)) => format!("<{url}>"),
            (None, None) => String::new(),
        }
    }
}

fn lookup<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    document
        .get("project")
        .and_then(|project| project.get(key))
        .or_else(|| document.get(key))
}

/// String value of `key` in `document` with the `project` fallback.
pub(crate) fn attribute<'a>(document: &'a Value, key: &str) -> &'a str {
    lookup(document, key).and_then(Value::as_str).unwrap_or("")
}

fn element_to_value(node: roxmltree::Node<'_, '_>) -> Value {
    let children: Vec<_> = node.children().filter(roxmltree::Node::is_element).collect();
    if children.is_empty() {
        let text: String = node
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();
        let text = text.trim();
        return if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        };
    }

    let mut object = Map::new();
    for child in children {
        let key = child.tag_name().name().to_string();
        let value = element_to_value(child);
        match object.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                object.insert(key, value);
            }
        }
    }
    Value::Object(object)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const EXAMPLE_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.audeering.data.database</groupId>
  <artifactId>database</artifactId>
  <version>1.1.3</version>
  <packaging>pom</packaging>
  <description>Test database</description>
  <maintainer>Firstname Lastname</maintainer>
  <url>https://gitlab.audeering.com/data/database</url>
  <licenses>
    <license>
      <name>CC0 1.0</name>
      <url>https://creativecommons.org/publicdomain/zero/1.0/</url>
    </license>
  </licenses>
  <dependencies>
    <dependency>
      <groupId>com.audeering.data.database</groupId>
      <artifactId>database-metadata</artifactId>
      <version>2.1.0</version>
    </dependency>
    <dependency>
      <groupId>com.audeering.data.database</groupId>
      <artifactId>database-data</artifactId>
      <version>1.0.1</version>
    </dependency>
  </dependencies>
</project>"#;

    pub(crate) const EMPTY_POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
</project>"#;

    #[test]
    fn test_accessors_on_example_pom() {
        let pom = Pom::parse(EXAMPLE_POM, "example.pom").unwrap();
        assert_eq!(pom.group_id(), "com.audeering.data.database");
        assert_eq!(pom.name(), "database");
        assert_eq!(pom.version(), "1.1.3");
        assert_eq!(pom.packaging_type(), "pom");
        assert_eq!(pom.description(), "Test database");
        assert_eq!(pom.maintainer(), "Firstname Lastname");
        assert_eq!(pom.url(), "https://gitlab.audeering.com/data/database");
        assert_eq!(
            pom.license(),
            "CC0 1.0 <https://creativecommons.org/publicdomain/zero/1.0/>"
        );
    }

    #[test]
    fn test_accessors_on_empty_pom() {
        let pom = Pom::parse(EMPTY_POM, "empty.pom").unwrap();
        assert_eq!(pom.group_id(), "");
        assert_eq!(pom.name(), "");
        assert_eq!(pom.version(), "");
        assert_eq!(pom.packaging_type(), "");
        assert_eq!(pom.description(), "");
        assert_eq!(pom.maintainer(), "");
        assert_eq!(pom.url(), "");
        assert_eq!(pom.license(), "");
    }

    #[test]
    fn test_repeated_children_become_array() {
        let pom = Pom::parse(EXAMPLE_POM, "example.pom").unwrap();
        let dependencies = pom
            .node("dependencies")
            .and_then(|deps| deps.get("dependency"))
            .unwrap();
        assert_eq!(dependencies.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_attribute_falls_back_to_top_level() {
        let pom = Pom::from_value(serde_json::json!({"groupId": "a.b", "version": {"x": 1}}));
        assert_eq!(pom.group_id(), "a.b");
        // Non-string values read as empty.
        assert_eq!(pom.version(), "");
    }

    #[test]
    fn test_license_name_only() {
        let pom = Pom::from_value(serde_json::json!({
            "project": {"licenses": {"license": {"name": "MIT", "url": null}}}
        }));
        assert_eq!(pom.license(), "MIT");
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let error = Pom::parse("<project><groupId>", "broken.pom").unwrap_err();
        let msg = error.to_string();
        assert!(msg.contains("broken.pom"), "got: {msg}");
    }
}

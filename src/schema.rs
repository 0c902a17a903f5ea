//! Pre-compiled YANG module schemas
//!
//! A schema file describes every data node of one module by its absolute
//! path (`/module:top/child/leaf`), its kind and, for leaves, its type.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{NetconfError, Result};
use crate::types::YangType;

/// Statement kind of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Container,
    List,
    Leaf,
    LeafList,
    Rpc,
    Input,
    Output,
}

impl NodeKind {
    /// Nodes that may appear more than once under the same parent
    pub fn is_multi(self) -> bool {
        matches!(self, NodeKind::List | NodeKind::LeafList)
    }

    pub fn is_leaf(self) -> bool {
        matches!(self, NodeKind::Leaf | NodeKind::LeafList)
    }
}

/// A single data node of a module
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: NodeKind,
    /// Leaf type, present for leaf and leaf-list nodes
    pub yang_type: Option<YangType>,
    /// List keys in declaration order
    pub keys: Vec<String>,
}

/// Represents a parsed module schema
#[derive(Debug, Clone)]
pub struct ModuleSchema {
    /// Module name
    pub module_name: String,
    /// Module revision
    pub module_revision: String,
    /// XML namespace of the module
    pub namespace: String,
    /// Formatted module name prefix (e.g., "/{module-name}:")
    pub module_prefix: String,
    /// Mapping from node path to node
    pub nodes: HashMap<String, SchemaNode>,
}

/// Raw schema file structure for deserialization
#[derive(Debug, Deserialize)]
struct RawSchemaFile {
    #[serde(rename = "module-name")]
    module_name: String,
    #[serde(rename = "module-revision")]
    module_revision: String,
    namespace: String,
    #[serde(alias = "nodes")]
    node: Vec<RawSchemaNode>,
}

#[derive(Debug, Deserialize)]
struct RawSchemaNode {
    path: String,
    kind: NodeKind,
    #[serde(rename = "type")]
    node_type: Option<Value>,
    #[serde(default)]
    key: Vec<String>,
}

impl ModuleSchema {
    /// Parse a schema file from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawSchemaFile = serde_json::from_str(content)?;
        let module_prefix = format!("/{}:", raw.module_name);

        let mut nodes = HashMap::with_capacity(raw.node.len());
        for item in raw.node {
            if !item.path.starts_with(&module_prefix) {
                return Err(NetconfError::InvalidSchema(format!(
                    "{} is outside module {}",
                    item.path, raw.module_name
                )));
            }

            let yang_type = item.node_type.as_ref().map(YangType::from_schema_type);
            if item.kind.is_leaf() != yang_type.is_some() {
                return Err(NetconfError::InvalidSchema(format!(
                    "{}: only leaf nodes carry a type",
                    item.path
                )));
            }

            nodes.insert(
                item.path,
                SchemaNode {
                    kind: item.kind,
                    yang_type,
                    keys: item.key,
                },
            );
        }

        // Every nested node needs its parent
        for path in nodes.keys() {
            if let Some((parent, _)) = path.rsplit_once('/')
                && !parent.is_empty()
                && !nodes.contains_key(parent)
            {
                return Err(NetconfError::InvalidSchema(format!(
                    "{} has no parent node",
                    path
                )));
            }
        }

        Ok(ModuleSchema {
            module_name: raw.module_name,
            module_revision: raw.module_revision,
            namespace: raw.namespace,
            module_prefix,
            nodes,
        })
    }

    /// Path of a top-level node of this module
    pub fn top_path(&self, name: &str) -> String {
        format!("{}{}", self.module_prefix, name)
    }

    /// Path of a child node
    pub fn child_path(parent: &str, name: &str) -> String {
        format!("{}/{}", parent, name)
    }

    /// Get the node at a path
    pub fn get_node(&self, path: &str) -> Option<&SchemaNode> {
        self.nodes.get(path)
    }

    /// Get the node at a path, failing if absent
    pub fn require_node(&self, path: &str) -> Result<&SchemaNode> {
        self.get_node(path)
            .ok_or_else(|| NetconfError::SchemaNodeNotFound(path.to_string()))
    }

    /// Get YANG type for a leaf path
    pub fn get_type(&self, path: &str) -> Option<&YangType> {
        self.nodes.get(path).and_then(|n| n.yang_type.as_ref())
    }

    /// Module-qualified name, as used for RFC 7951 top-level members
    pub fn qualified_name(&self, name: &str) -> String {
        format!("{}:{}", self.module_name, name)
    }
}

impl std::str::FromStr for ModuleSchema {
    type Err = NetconfError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SCHEMA: &str = r#"{
        "module-name": "example-1",
        "module-revision": "unknown",
        "namespace": "urn:example:1",
        "node": [
            {"path": "/example-1:greeting", "kind": "container"},
            {"path": "/example-1:greeting/author", "kind": "leaf", "type": "string"},
            {"path": "/example-1:greeting/line", "kind": "list", "key": ["number"]},
            {"path": "/example-1:greeting/line/number", "kind": "leaf", "type": "uint8"}
        ]
    }"#;

    #[test]
    fn test_parse_schema_file() {
        let schema: ModuleSchema = SAMPLE_SCHEMA.parse().unwrap();

        assert_eq!(schema.module_name, "example-1");
        assert_eq!(schema.namespace, "urn:example:1");
        assert_eq!(schema.module_prefix, "/example-1:");
        assert_eq!(schema.top_path("greeting"), "/example-1:greeting");
        assert_eq!(schema.qualified_name("greeting"), "example-1:greeting");
    }

    #[test]
    fn test_node_lookup() {
        let schema: ModuleSchema = SAMPLE_SCHEMA.parse().unwrap();

        let line = schema.get_node("/example-1:greeting/line").unwrap();
        assert_eq!(line.kind, NodeKind::List);
        assert_eq!(line.keys, vec!["number".to_string()]);
        assert_eq!(
            schema.get_type("/example-1:greeting/author"),
            Some(&YangType::String)
        );
        assert!(matches!(
            schema.require_node("/example-1:greeting/missing"),
            Err(NetconfError::SchemaNodeNotFound(_))
        ));
    }

    #[test]
    fn test_reject_orphan_node() {
        let orphan = r#"{
            "module-name": "m", "module-revision": "r", "namespace": "urn:m",
            "node": [{"path": "/m:a/b", "kind": "leaf", "type": "string"}]
        }"#;
        assert!(matches!(
            ModuleSchema::from_json_str(orphan),
            Err(NetconfError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_reject_untyped_leaf() {
        let untyped = r#"{
            "module-name": "m", "module-revision": "r", "namespace": "urn:m",
            "node": [{"path": "/m:a", "kind": "leaf"}]
        }"#;
        assert!(matches!(
            ModuleSchema::from_json_str(untyped),
            Err(NetconfError::InvalidSchema(_))
        ));
    }
}

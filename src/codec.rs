//! Codec service: model objects to and from XML or JSON

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::debug;

use crate::entity::Entity;
use crate::error::{NetconfError, Result};
use crate::schema::ModuleSchema;
use crate::types::{YangType, cast_from_json, cast_to_json};
use crate::xml::{XmlElement, XmlEncoder, decode_children};

/// Serialization used by a codec provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingFormat {
    #[default]
    Xml,
    /// RFC 7951 JSON encoding of YANG data
    Json,
}

impl FromStr for EncodingFormat {
    type Err = NetconfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(NetconfError::UnsupportedEncoding(format!(
                "'{}' (expected xml or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for EncodingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingFormat::Xml => f.write_str("xml"),
            EncodingFormat::Json => f.write_str("json"),
        }
    }
}

/// Local encoding context for the codec service
#[derive(Debug, Clone, Default)]
pub struct CodecServiceProvider {
    format: EncodingFormat,
    pretty: bool,
}

impl CodecServiceProvider {
    pub fn new(format: EncodingFormat) -> Self {
        debug!(%format, "codec provider created");
        Self {
            format,
            pretty: false,
        }
    }

    /// Pretty-print encoded output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format(&self) -> EncodingFormat {
        self.format
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Release the provider
    pub fn close(self) {
        debug!(format = %self.format, "codec provider closed");
    }
}

/// Converts model objects to and from their serialized representation
#[derive(Debug, Clone, Copy, Default)]
pub struct CodecService;

impl CodecService {
    pub fn new() -> Self {
        Self
    }

    /// Encode a model object using the provider's format
    pub fn encode<E: Entity>(&self, provider: &CodecServiceProvider, entity: &E) -> Result<String> {
        let schema = E::schema()?;
        let path = schema.top_path(E::YANG_NAME);
        let value = serde_json::to_value(entity)?;
        debug!(node = %path, format = %provider.format, "encoding entity");

        match provider.format {
            EncodingFormat::Xml => XmlEncoder::new(&schema)
                .pretty(provider.pretty)
                .encode(E::YANG_NAME, &path, &value),
            EncodingFormat::Json => {
                let tree = to_json_tree(&schema, &value, &path)?;
                let mut root = Map::new();
                root.insert(schema.qualified_name(E::YANG_NAME), tree);
                let root = Value::Object(root);
                if provider.pretty {
                    Ok(serde_json::to_string_pretty(&root)?)
                } else {
                    Ok(serde_json::to_string(&root)?)
                }
            }
        }
    }

    /// Decode a payload produced by `encode` (or by a device) into a model object
    pub fn decode<E: Entity>(&self, provider: &CodecServiceProvider, payload: &str) -> Result<E> {
        let schema = E::schema()?;
        let path = schema.top_path(E::YANG_NAME);
        debug!(node = %path, format = %provider.format, "decoding entity");

        let value = match provider.format {
            EncodingFormat::Xml => {
                let root = XmlElement::parse(payload)?;
                if root.name != E::YANG_NAME {
                    return Err(NetconfError::MissingData(format!(
                        "expected <{}>, found <{}>",
                        E::YANG_NAME,
                        root.name
                    )));
                }
                if let Some(ns) = root.namespace.as_deref()
                    && ns != schema.namespace
                {
                    return Err(NetconfError::Xml(format!(
                        "unexpected namespace {} for <{}>",
                        ns, root.name
                    )));
                }
                decode_children(&schema, &path, &root.children)?
            }
            EncodingFormat::Json => {
                let document: Value = serde_json::from_str(payload)?;
                let qualified = schema.qualified_name(E::YANG_NAME);
                let tree = document
                    .get(&qualified)
                    .ok_or_else(|| NetconfError::MissingData(format!("member \"{}\"", qualified)))?;
                from_json_tree(&schema, tree, &path)?
            }
        };

        Ok(serde_json::from_value(value)?)
    }
}

/// Validate and cast a data tree to RFC 7951 leaf representations
fn to_json_tree(schema: &ModuleSchema, value: &Value, path: &str) -> Result<Value> {
    process_json_tree(schema, value, path, &cast_to_json)
}

/// Cast RFC 7951 leaves back to their in-memory representation
fn from_json_tree(schema: &ModuleSchema, value: &Value, path: &str) -> Result<Value> {
    process_json_tree(schema, value, path, &cast_from_json)
}

type LeafCast = dyn Fn(&Value, &YangType) -> Result<Value>;

fn process_json_tree(
    schema: &ModuleSchema,
    value: &Value,
    path: &str,
    cast: &LeafCast,
) -> Result<Value> {
    let node = schema.require_node(path)?;

    if let Some(yang_type) = &node.yang_type {
        return match value {
            // Leaf-list
            Value::Array(items) if node.kind.is_multi() => items
                .iter()
                .map(|item| cast(item, yang_type))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => cast(value, yang_type),
        };
    }

    match value {
        Value::Object(map) => {
            let mut new_map = Map::new();
            for (key, v) in map {
                if v.is_null() {
                    continue;
                }
                let child_path = ModuleSchema::child_path(path, key);
                new_map.insert(key.clone(), process_json_tree(schema, v, &child_path, cast)?);
            }
            Ok(Value::Object(new_map))
        }
        Value::Array(arr) if node.kind.is_multi() => {
            let mut new_arr = Vec::with_capacity(arr.len());
            for elem in arr {
                new_arr.push(process_json_tree(schema, elem, path, cast)?);
            }
            Ok(Value::Array(new_arr))
        }
        _ => Err(NetconfError::TypeConversion(format!(
            "{} expects an object, got {}",
            path, value
        ))),
    }
}

//! XML encoding of YANG data trees
//!
//! Data trees are carried as `serde_json::Value` between the typed model
//! structs and the wire. Encoding walks the tree against the module schema,
//! validating leaves and emitting list keys first. Decoding parses the
//! document into a small element tree and casts leaf text using the schema.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{NetconfError, Result};
use crate::schema::{ModuleSchema, SchemaNode};
use crate::types::{cast_from_text, cast_to_text};

/// A parsed XML element with its namespace resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Local name (prefix stripped)
    pub name: String,
    /// Resolved namespace URI
    pub namespace: Option<String>,
    /// Attributes other than namespace declarations
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Concatenated, trimmed character data
    pub text: String,
}

impl XmlElement {
    /// Parse a document with a single root element
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut scopes: Vec<Vec<(Option<String>, String)>> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(NetconfError::Xml("multiple root elements".into()));
                    }
                    let element = open_element(&start, &mut scopes)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    if root.is_some() {
                        return Err(NetconfError::Xml("multiple root elements".into()));
                    }
                    let element = open_element(&start, &mut scopes)?;
                    scopes.pop();
                    close_element(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| NetconfError::Xml("unbalanced end tag".into()))?;
                    scopes.pop();
                    close_element(element, &mut stack, &mut root);
                }
                Event::Text(text) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(utf8(&data)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(NetconfError::Xml("unexpected end of document".into()));
        }
        root.ok_or_else(|| NetconfError::Xml("document has no root element".into()))
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given local name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| NetconfError::Xml(e.to_string()))
}

fn split_qname(qname: QName<'_>) -> Result<(Option<String>, String)> {
    let prefix = match qname.prefix() {
        Some(p) => Some(utf8(p.into_inner())?.to_string()),
        None => None,
    };
    let local = utf8(qname.local_name().into_inner())?.to_string();
    Ok((prefix, local))
}

fn open_element(
    start: &BytesStart<'_>,
    scopes: &mut Vec<Vec<(Option<String>, String)>>,
) -> Result<XmlElement> {
    let mut declared = Vec::new();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        if key == "xmlns" {
            declared.push((None, value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declared.push((Some(prefix.to_string()), value));
        } else {
            let (_, local) = split_qname(attr.key)?;
            attributes.push((local, value));
        }
    }
    scopes.push(declared);

    let (prefix, name) = split_qname(start.name())?;
    // Innermost declaration wins
    let namespace = scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| uri.clone());

    Ok(XmlElement {
        name,
        namespace,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn close_element(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => *root = Some(element),
    }
}

/// Schema-validating XML encoder for one module
#[derive(Debug, Clone, Copy)]
pub struct XmlEncoder<'a> {
    schema: &'a ModuleSchema,
    pretty: bool,
}

impl<'a> XmlEncoder<'a> {
    pub fn new(schema: &'a ModuleSchema) -> Self {
        Self {
            schema,
            pretty: false,
        }
    }

    /// Indent nested elements by two spaces
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Encode `value` as element `name` carrying the module namespace
    ///
    /// `path` is the schema node whose children `value` holds. For RPC
    /// input the element is the RPC name while `path` points at its input.
    pub fn encode(&self, name: &str, path: &str, value: &Value) -> Result<String> {
        let mut writer = if self.pretty {
            Writer::new_with_indent(Vec::new(), b' ', 2)
        } else {
            Writer::new(Vec::new())
        };

        let node = self.schema.require_node(path)?;
        let mut start = BytesStart::new(name);
        start.push_attribute(("xmlns", self.schema.namespace.as_str()));
        self.write_element(&mut writer, start, path, node, value)?;

        String::from_utf8(writer.into_inner()).map_err(|e| NetconfError::Xml(e.to_string()))
    }

    fn write_element(
        &self,
        writer: &mut Writer<Vec<u8>>,
        start: BytesStart<'_>,
        path: &str,
        node: &SchemaNode,
        value: &Value,
    ) -> Result<()> {
        if node.kind.is_leaf() {
            let yang_type = node
                .yang_type
                .as_ref()
                .ok_or_else(|| NetconfError::InvalidSchema(format!("{} has no type", path)))?;
            let text = cast_to_text(value, yang_type)?;
            let end = start.to_end().into_owned();
            if text.is_empty() {
                writer.write_event(Event::Empty(start))?;
            } else {
                writer.write_event(Event::Start(start))?;
                writer.write_event(Event::Text(BytesText::new(&text)))?;
                writer.write_event(Event::End(end))?;
            }
            return Ok(());
        }

        let map = value.as_object().ok_or_else(|| {
            NetconfError::TypeConversion(format!("{} expects an object, got {}", path, value))
        })?;
        let children = self.ordered_children(node, map);
        if children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        let end: BytesEnd<'static> = start.to_end().into_owned();
        writer.write_event(Event::Start(start))?;
        for (name, child) in children {
            let child_path = ModuleSchema::child_path(path, name);
            let child_node = self.schema.require_node(&child_path)?;
            match child {
                Value::Array(items) if child_node.kind.is_multi() => {
                    for item in items {
                        self.write_element(writer, BytesStart::new(name), &child_path, child_node, item)?;
                    }
                }
                _ => self.write_element(writer, BytesStart::new(name), &child_path, child_node, child)?,
            }
        }
        writer.write_event(Event::End(end))?;
        Ok(())
    }

    /// List keys first, then the remaining children in tree order; nulls dropped
    fn ordered_children<'v>(
        &self,
        node: &SchemaNode,
        map: &'v Map<String, Value>,
    ) -> Vec<(&'v str, &'v Value)> {
        let keys = node
            .keys
            .iter()
            .filter_map(|k| map.get_key_value(k.as_str()));
        let rest = map.iter().filter(|(k, _)| !node.keys.contains(k));
        keys.chain(rest)
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.as_str(), v))
            .collect()
    }
}

/// Decode the children of the node at `path` into a JSON object
///
/// Elements from other namespaces and elements unknown to the schema are skipped.
pub fn decode_children(schema: &ModuleSchema, path: &str, children: &[XmlElement]) -> Result<Value> {
    let mut map = Map::new();

    for child in children {
        if child
            .namespace
            .as_deref()
            .is_some_and(|ns| ns != schema.namespace)
        {
            debug!(element = %child.name, "skipping element from foreign namespace");
            continue;
        }

        let child_path = ModuleSchema::child_path(path, &child.name);
        let Some(node) = schema.get_node(&child_path) else {
            debug!(path = %child_path, "skipping element not in schema");
            continue;
        };

        let value = decode_element(schema, &child_path, node, child)?;
        if node.kind.is_multi() {
            let entry = map
                .entry(child.name.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(value);
            }
        } else {
            map.insert(child.name.clone(), value);
        }
    }

    Ok(Value::Object(map))
}

fn decode_element(
    schema: &ModuleSchema,
    path: &str,
    node: &SchemaNode,
    element: &XmlElement,
) -> Result<Value> {
    match &node.yang_type {
        Some(yang_type) => cast_from_text(&element.text, yang_type),
        None => decode_children(schema, path, &element.children),
    }
}

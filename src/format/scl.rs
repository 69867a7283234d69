// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of sld-designer and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Cow;

use log::debug;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use smol_str::SmolStr;

use crate::model::{Document, DocumentError, Element, NodeData, NodeId, QName};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, thiserror::Error)]
pub enum SclParseError {
    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("expected an SCL root element, found `{found}`")]
    UnexpectedRoot { found: String },
    #[error("failed to build document tree: {0}")]
    Tree(#[from] DocumentError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SclExportError {
    #[error("no prefix is bound for namespace `{uri}`")]
    UnboundNamespace { uri: SmolStr },
    #[error("failed to write XML: {0}")]
    Write(String),
}

/// Parses an SCL document.
///
/// Namespace declarations from anywhere in the input are collected onto the root; a prefix
/// declared twice keeps its first binding. Comments and processing instructions inside the root
/// element are kept; whitespace-only text is not.
pub fn parse_scl(input: &str) -> Result<Document, SclParseError> {
    let xml = roxmltree::Document::parse(input)?;
    let root = xml.root_element();
    if root.tag_name().name() != "SCL" {
        return Err(SclParseError::UnexpectedRoot {
            found: root.tag_name().name().to_owned(),
        });
    }

    let mut doc = Document::new(element_of(root));
    for node in root.descendants().filter(|node| node.is_element()) {
        for ns in node.namespaces() {
            if ns.name() != Some("xml") {
                doc.bind_namespace(ns.name(), ns.uri());
            }
        }
    }

    let doc_root = doc.root();
    let mut stack = vec![(root, doc_root)];
    while let Some((source, target)) = stack.pop() {
        for child in source.children() {
            let id = match child.node_type() {
                roxmltree::NodeType::Element => {
                    let id = doc.alloc(element_of(child));
                    stack.push((child, id));
                    id
                }
                roxmltree::NodeType::Text => match child.text() {
                    Some(text) if !text.trim().is_empty() => doc.alloc_text(text),
                    _ => continue,
                },
                roxmltree::NodeType::Comment => doc.alloc_comment(child.text().unwrap_or_default()),
                roxmltree::NodeType::PI => match child.pi() {
                    Some(pi) => doc.alloc_processing_instruction(pi.target, pi.value),
                    None => continue,
                },
                roxmltree::NodeType::Root => continue,
            };
            doc.append_child(target, id)?;
        }
    }
    debug!(
        nodes = doc.len(),
        cnodes = doc.index().node_count(),
        pins = doc.index().terminal_count();
        "parsed SCL document"
    );
    Ok(doc)
}

fn element_of(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let mut element = Element::new(tag.namespace(), tag.name());
    for attribute in node.attributes() {
        element = element.with_attr(
            QName::new(attribute.namespace(), attribute.name()),
            attribute.value(),
        );
    }
    element
}

type XmlWriter = Writer<Vec<u8>>;

/// Serializes `doc` as indented XML with every namespace declared on the root.
pub fn export_scl(doc: &Document) -> Result<String, SclExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    write_node(doc, doc.root(), &mut writer)?;
    let mut out =
        String::from_utf8(writer.into_inner()).map_err(|err| SclExportError::Write(err.to_string()))?;
    out.push('\n');
    Ok(out)
}

fn write_event(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), SclExportError> {
    writer
        .write_event(event)
        .map_err(|err| SclExportError::Write(err.to_string()))
}

fn write_node(doc: &Document, id: NodeId, writer: &mut XmlWriter) -> Result<(), SclExportError> {
    let Some(data) = doc.data(id) else {
        return Ok(());
    };
    let element = match data {
        NodeData::Element(element) => element,
        NodeData::Text(text) => {
            let escaped = escape_preserving(text, &['\r']);
            return write_event(writer, Event::Text(BytesText::from_escaped(escaped)));
        }
        NodeData::Comment(text) => {
            return write_event(writer, Event::Comment(BytesText::from_escaped(text.as_str())));
        }
        NodeData::ProcessingInstruction { target, value } => {
            let content = match value {
                Some(value) => format!("{target} {value}"),
                None => target.clone(),
            };
            return write_event(writer, Event::PI(BytesPI::new(content)));
        }
    };

    let name = qualified(doc, element.ns(), element.local_name(), true)?;
    let mut start = BytesStart::new(name.as_str());
    if id == doc.root() {
        for binding in doc.namespaces() {
            let key = match &binding.prefix {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_owned(),
            };
            push_attribute(&mut start, &key, &binding.uri);
        }
    }
    for attribute in element.attributes() {
        let key = qualified(
            doc,
            attribute.name.ns.as_deref(),
            &attribute.name.local,
            false,
        )?;
        push_attribute(&mut start, &key, &attribute.value);
    }

    let children = doc.children(id);
    if children.is_empty() {
        return write_event(writer, Event::Empty(start));
    }
    write_event(writer, Event::Start(start))?;
    for child in children {
        write_node(doc, *child, writer)?;
    }
    write_event(writer, Event::End(BytesEnd::new(name.as_str())))
}

/// Attribute values keep their whitespace characters as references; a parser would normalize
/// literal ones to spaces.
fn push_attribute(start: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = escape_preserving(value, &['\r', '\n', '\t']);
    start.push_attribute((key.as_bytes(), escaped.as_bytes()));
}

fn escape_preserving<'a>(value: &'a str, preserved: &[char]) -> Cow<'a, str> {
    let escaped = escape(value);
    if !escaped.contains(preserved) {
        return escaped;
    }
    let mut out = String::with_capacity(escaped.len() + 8);
    for ch in escaped.chars() {
        match ch {
            ch if preserved.contains(&ch) => out.push_str(&format!("&#{};", u32::from(ch))),
            ch => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// `prefix:local` for a namespaced name. Unprefixed elements may use the default namespace;
/// attributes never do.
fn qualified(
    doc: &Document,
    ns: Option<&str>,
    local: &str,
    is_element: bool,
) -> Result<String, SclExportError> {
    let Some(uri) = ns else {
        return Ok(local.to_owned());
    };
    if uri == XML_NS {
        return Ok(format!("xml:{local}"));
    }
    if is_element {
        let is_default = doc
            .namespaces()
            .iter()
            .any(|binding| binding.prefix.is_none() && binding.uri == uri);
        if is_default {
            return Ok(local.to_owned());
        }
    }
    match doc.prefix_for(uri) {
        Some(prefix) => Ok(format!("{prefix}:{local}")),
        None => Err(SclExportError::UnboundNamespace {
            uri: SmolStr::new(uri),
        }),
    }
}

//! BODYSTRUCTURE decoding.
//!
//! The parser keeps BODYSTRUCTURE as a raw [`ListValue`] tree. This module
//! walks it into a [`MimePart`] tree whose part ids can be used directly as
//! `BODY[...]` section specifiers: the root is `TEXT`, its children are
//! `1`, `2`, ... and deeper parts are dotted (`1.2`).

use crate::parser::ListValue;
use crate::{Error, Result};

/// Id given to the root part.
pub const ROOT_PART_ID: &str = "TEXT";

/// A node of a decoded body structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MimePart {
    /// `multipart/*` container.
    Multipart(Multipart),
    /// Leaf part.
    Single(SinglePart),
}

/// `multipart/*` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Multipart {
    /// Section id.
    pub id: String,
    /// Lowercased subtype (`mixed`, `alternative`, ...).
    pub subtype: String,
    /// Child parts in order.
    pub parts: Vec<MimePart>,
}

/// Non-multipart node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinglePart {
    /// Section id.
    pub id: String,
    /// Lowercased `type/subtype`.
    pub mime_type: String,
    /// Content-Type parameters.
    pub params: Vec<(String, String)>,
    /// Content-Transfer-Encoding.
    pub encoding: Option<String>,
    /// Encoded size in bytes.
    pub size: u64,
    /// Lowercased disposition (`inline`, `attachment`).
    pub disposition: Option<String>,
    /// Disposition parameters; always carries `size`.
    pub disposition_params: Vec<(String, String)>,
}

impl MimePart {
    /// Section id of this node.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Multipart(mp) => &mp.id,
            Self::Single(part) => &part.id,
        }
    }

    /// Leaf parts in depth-first order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&SinglePart> {
        match self {
            Self::Single(part) => vec![part],
            Self::Multipart(mp) => mp.parts.iter().flat_map(Self::leaves).collect(),
        }
    }

    /// Finds a node by section id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id() == id {
            return Some(self);
        }
        match self {
            Self::Single(_) => None,
            Self::Multipart(mp) => mp.parts.iter().find_map(|p| p.find(id)),
        }
    }
}

/// Decodes a BODYSTRUCTURE list.
///
/// # Errors
///
/// [`Error::UnsupportedStructure`] for encapsulated `message/rfc822` parts
/// anywhere in the tree and for shapes that are not a body structure.
pub fn decode(structure: &ListValue) -> Result<MimePart> {
    decode_part(structure, ROOT_PART_ID)
}

fn decode_part(value: &ListValue, id: &str) -> Result<MimePart> {
    let items = value
        .as_list()
        .ok_or_else(|| unsupported(id, "body structure is not a list"))?;

    if matches!(items.first(), Some(ListValue::List(_))) {
        decode_multipart(items, id)
    } else {
        decode_single(items, id)
    }
}

fn decode_multipart(items: &[ListValue], id: &str) -> Result<MimePart> {
    let mut parts = Vec::new();
    let mut subtype = String::from("mixed");
    for (i, item) in items.iter().enumerate() {
        if let ListValue::List(_) = item {
            let child_id = if id.eq_ignore_ascii_case(ROOT_PART_ID) {
                (i + 1).to_string()
            } else {
                format!("{id}.{}", i + 1)
            };
            parts.push(decode_part(item, &child_id)?);
        } else {
            if let Some(s) = item.as_str() {
                subtype = s.to_ascii_lowercase();
            }
            break;
        }
    }
    Ok(MimePart::Multipart(Multipart {
        id: id.to_string(),
        subtype,
        parts,
    }))
}

fn decode_single(items: &[ListValue], id: &str) -> Result<MimePart> {
    let field = |i: usize| items.get(i).and_then(ListValue::as_str);
    let kind = field(0).ok_or_else(|| unsupported(id, "missing body type"))?;
    let subtype = field(1).ok_or_else(|| unsupported(id, "missing body subtype"))?;
    let mime_type = format!("{kind}/{subtype}").to_ascii_lowercase();

    if mime_type == "message/rfc822" {
        return Err(unsupported(id, "message/rfc822"));
    }

    let params = items.get(2).map(pairs).unwrap_or_default();
    let encoding = field(5).map(str::to_string);
    let size = items.get(6).and_then(ListValue::as_number).unwrap_or(0);

    // Text parts carry an extra line-count field before the extensions.
    let disposition_index = if kind.eq_ignore_ascii_case("text") { 9 } else { 8 };
    let mut disposition = None;
    let mut disposition_params = Vec::new();
    if let Some(list) = items.get(disposition_index).and_then(ListValue::as_list) {
        disposition = list
            .first()
            .and_then(ListValue::as_str)
            .map(str::to_ascii_lowercase);
        if let Some(params) = list.get(1) {
            disposition_params = pairs(params)
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect();
        }
    }
    if !disposition_params.iter().any(|(k, _)| k == "size") {
        disposition_params.push(("size".to_string(), size.to_string()));
    }

    Ok(MimePart::Single(SinglePart {
        id: id.to_string(),
        mime_type,
        params,
        encoding,
        size,
        disposition,
        disposition_params,
    }))
}

fn pairs(value: &ListValue) -> Vec<(String, String)> {
    value
        .as_list()
        .map(|items| {
            items
                .chunks_exact(2)
                .filter_map(|kv| Some((kv[0].as_str()?.to_string(), kv[1].as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn unsupported(id: &str, what: &str) -> Error {
    Error::UnsupportedStructure(format!("part {id}: {what}"))
}

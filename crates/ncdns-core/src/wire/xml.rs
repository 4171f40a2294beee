// # XML Normalizer
//
// Converts the registrar's attribute-heavy XML into a canonical
// `serde_json::Value` tree:
//
// - attributes become keys prefixed with `@_`
// - element text becomes `#text` (or the whole value for text-only elements)
// - repeatable elements are ALWAYS arrays, even with a single instance
// - an absent repeatable element has no key at all (never an empty array)
// - scalar values that look boolean or numeric are coerced, losslessly
//
// Downstream code never checks "object or array?" itself.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// Prefix applied to attribute names in the normalized tree
pub const ATTRIBUTE_PREFIX: &str = "@_";

/// Key holding element text when the element also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Elements that may occur more than once under the same parent.
const REPEATABLE_ELEMENTS: &[&str] = &[
    "Error",
    "Warning",
    "host",
    "Host",
    "Forward",
    "Nameserver",
    "Domain",
    "DomainCheckResult",
    "Tld",
    "Product",
    "ProductCategory",
    "ProductType",
    "Price",
    "Address",
    "Transfer",
];

/// Whether an element name is treated as a sequence
pub fn is_repeatable(name: &str) -> bool {
    REPEATABLE_ELEMENTS.contains(&name)
}

/// A parsed element before normalization
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::parse(format!("bad attribute in <{name}>: {e}")))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::parse(format!("bad attribute value in <{name}>: {e}")))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Default::default()
        })
    }
}

/// Parse an XML document and normalize it.
///
/// Returns the root element's name and its normalized value.
pub fn parse_document(xml: &str) -> Result<(String, Value)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(Element::open(&start)?),
            Ok(Event::Empty(start)) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::parse("closing tag without matching opening tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(text)) => {
                let text = text
                    .unescape()
                    .map_err(|e| Error::parse(format!("bad text content: {e}")))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::parse(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::parse(format!("unexpected end of document inside <{}>", open.name)));
    }

    let root = root.ok_or_else(|| Error::parse("document has no root element"))?;
    let value = normalize(&root);
    Ok((root.name, value))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(Error::parse(format!(
            "document has more than one root element (second: <{}>)",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}

fn normalize(element: &Element) -> Value {
    let text = element.text.trim();

    if element.attributes.is_empty() && element.children.is_empty() {
        return if text.is_empty() {
            Value::Object(Map::new())
        } else {
            coerce(text)
        };
    }

    let mut map = Map::new();
    for (key, value) in &element.attributes {
        map.insert(format!("{ATTRIBUTE_PREFIX}{key}"), coerce(value));
    }

    // Group children by name, preserving document order within each group.
    let mut groups: Vec<(&str, Vec<Value>)> = Vec::new();
    for child in &element.children {
        let value = normalize(child);
        match groups.iter_mut().find(|(name, _)| *name == child.name) {
            Some((_, values)) => values.push(value),
            None => groups.push((child.name.as_str(), vec![value])),
        }
    }

    for (name, mut values) in groups {
        let value = if is_repeatable(name) {
            Value::Array(values)
        } else if values.len() > 1 {
            tracing::warn!(
                "<{}> repeated {} times under <{}>; keeping all as a sequence",
                name,
                values.len(),
                element.name
            );
            Value::Array(values)
        } else {
            values.pop().unwrap_or(Value::Null)
        };
        map.insert(name.to_string(), value);
    }

    if !text.is_empty() {
        map.insert(TEXT_KEY.to_string(), coerce(text));
    }

    Value::Object(map)
}

/// Coerce a scalar to bool or number when that is lossless.
///
/// Only text that renders back identically is converted, so `007`, `1.50`,
/// `+1` and `TRUE` stay strings.
pub fn coerce(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let numeric_shape = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c == '.');
    if !numeric_shape {
        return Value::String(raw.to_string());
    }

    if let Ok(n) = raw.parse::<i64>() {
        let value = Value::from(n);
        if value.to_string() == raw {
            return value;
        }
    }

    if let Ok(f) = raw.parse::<f64>()
        && let Some(n) = Number::from_f64(f)
    {
        let value = Value::Number(n);
        if value.to_string() == raw {
            return value;
        }
    }

    Value::String(raw.to_string())
}

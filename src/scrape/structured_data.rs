//! JSON-LD product records embedded in a page
//!
//! Every `<script type="application/ld+json">` block is an independent,
//! fallible parse. A block that is not valid JSON contributes nothing and the
//! scan moves on to the next one.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Selector for embedded JSON-LD blocks
pub const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

const PRODUCT_TYPE: &str = "Product";

/// The part of a `Product` record the extractor cares about
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Product name, when it is a plain string
    pub name: Option<String>,

    /// Product image(s)
    pub image: Option<ImageField>,
}

/// The shapes an `image` value takes in the wild
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    /// A single URL
    One(String),
    /// Several URLs, best first
    Many(Vec<String>),
    /// Anything else (e.g. an `ImageObject`), which we do not read
    Other(Value),
}

impl ProductRecord {
    /// Read the fields leniently; a field of an unexpected shape is absent
    fn from_value(value: &Value) -> Self {
        Self {
            name: value.get("name").and_then(Value::as_str).map(str::to_string),
            image: value
                .get("image")
                .cloned()
                .and_then(|image| serde_json::from_value(image).ok()),
        }
    }

    /// The image URL, taking the first entry of a list
    pub fn first_image(&self) -> Option<&str> {
        match self.image.as_ref()? {
            ImageField::One(url) => Some(url),
            ImageField::Many(urls) => urls.first().map(String::as_str),
            ImageField::Other(_) => None,
        }
    }
}

/// Whether a record declares `Product` as its type (alone or in a list)
fn is_product(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(kind)) => kind == PRODUCT_TYPE,
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == PRODUCT_TYPE),
        _ => false,
    }
}

/// First `Product` record across `blocks`, in document order.
///
/// The match is made on the declared type alone, so the first product is used
/// even when its other fields are unreadable. Later records are never
/// consulted once one matches.
pub fn first_product<I, S>(blocks: I) -> Option<ProductRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let product = blocks
        .into_iter()
        .filter_map(|block| parse_block(block.as_ref()))
        .flatten()
        .find(is_product)?;
    debug!("Found JSON-LD product record");
    Some(ProductRecord::from_value(&product))
}

/// Records in one block; a top-level array is read as a list of records
fn parse_block(block: &str) -> Option<Vec<Value>> {
    match serde_json::from_str(block) {
        Ok(Value::Array(values)) => Some(values),
        Ok(value) => Some(vec![value]),
        Err(e) => {
            warn!("Skipping malformed JSON-LD block: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_product() {
        let record = first_product([
            r#"{"@context":"https://schema.org","@type":"Product","name":"Desk Lamp","image":"https://cdn.example/lamp.jpg"}"#,
        ])
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("Desk Lamp"));
        assert_eq!(record.first_image(), Some("https://cdn.example/lamp.jpg"));
    }

    #[test]
    fn test_image_list_takes_first() {
        let record = first_product([
            r#"{"@type":"Product","name":"Lamp","image":["/a.jpg","/b.jpg"]}"#,
        ])
        .unwrap();
        assert_eq!(record.first_image(), Some("/a.jpg"));
    }

    #[test]
    fn test_malformed_block_does_not_stop_scan() {
        let record = first_product([
            r#"{"@type": "Product", "name": "Broken"#,
            r#"{"@type":"Product","name":"Valid","image":"https://cdn.example/v.png"}"#,
        ])
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("Valid"));
        assert_eq!(record.first_image(), Some("https://cdn.example/v.png"));
    }

    #[test]
    fn test_first_product_wins() {
        let record = first_product([
            r#"{"@type":"Organization","name":"Shop Inc"}"#,
            r#"{"@type":"Product","name":"First"}"#,
            r#"{"@type":"Product","name":"Second","image":"https://cdn.example/2.png"}"#,
        ])
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("First"));
        assert_eq!(record.first_image(), None);
    }

    #[test]
    fn test_top_level_array() {
        let record = first_product([
            r#"[{"@type":"BreadcrumbList"},{"@type":"Product","name":"In Array"}]"#,
        ])
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("In Array"));
    }

    #[test]
    fn test_image_object_is_not_read() {
        let record = first_product([
            r#"{"@type":"Product","name":"Obj","image":{"@type":"ImageObject","url":"https://cdn.example/o.png"}}"#,
        ])
        .unwrap();
        assert_eq!(record.name.as_deref(), Some("Obj"));
        assert_eq!(record.first_image(), None);
    }

    #[test]
    fn test_first_product_used_even_with_odd_name() {
        let record = first_product([
            r#"{"@type":"Product","name":{"@value":"First"},"image":"/first.jpg"}"#,
            r#"{"@type":"Product","name":"Second","image":"/second.jpg"}"#,
        ])
        .unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.first_image(), Some("/first.jpg"));

        let record = first_product([
            r#"{"@type":"Product","name":42,"image":7}"#,
            r#"{"@type":"Product","name":"Second","image":"/second.jpg"}"#,
        ])
        .unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.first_image(), None);
    }

    #[test]
    fn test_type_list_containing_product() {
        let record = first_product([r#"{"@type":["Thing","Product"],"name":"Multi"}"#]).unwrap();
        assert_eq!(record.name.as_deref(), Some("Multi"));
    }

    #[test]
    fn test_no_product() {
        assert!(first_product(Vec::<String>::new()).is_none());
        assert!(first_product([r#"{"@type":"WebSite","name":"Home"}"#, "not json"]).is_none());
    }
}

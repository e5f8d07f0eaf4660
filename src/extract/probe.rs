use serde_json::Value;

/// Keys that commonly wrap the category array in API responses, in lookup order
const WRAPPER_KEYS: [&str; 4] = ["brands", "makes", "categories", "data"];

/// Bound on nested wrapper objects
const MAX_WRAPPER_DEPTH: usize = 4;

const NAME_KEYS: [&str; 3] = ["name", "brand", "make"];
const LOCATOR_KEYS: [&str; 2] = ["url", "slug"];

/// One category named by a structured-data response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub name: String,
    /// Absolute URL, root-relative path or bare slug, when the entry has one
    pub locator: Option<String>,
}

/// Decodes structured-data responses into category entries
pub struct StructuredDataProbe;

impl StructuredDataProbe {
    /// Decodes a response body, returning None for anything that is not a
    /// JSON object or array
    pub fn decode(body: &[u8]) -> Option<Value> {
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
            _ => None,
        }
    }

    /// Finds the category array inside a decoded response
    ///
    /// The array may be the top-level value or sit under one of the wrapper
    /// keys. The first wrapper key present wins, even when its value turns
    /// out not to hold an array.
    pub fn category_array(value: &Value) -> Option<&Vec<Value>> {
        let mut current = value;
        for _ in 0..=MAX_WRAPPER_DEPTH {
            match current {
                Value::Array(items) => return Some(items),
                Value::Object(map) => {
                    current = WRAPPER_KEYS.iter().find_map(|key| map.get(*key))?;
                }
                _ => return None,
            }
        }
        None
    }

    /// Extracts every usable category entry from a decoded response
    ///
    /// Items without a non-empty name are skipped.
    pub fn entries(value: &Value) -> Vec<CategoryEntry> {
        let Some(items) = Self::category_array(value) else {
            return Vec::new();
        };

        items.iter().filter_map(entry_from_item).collect()
    }
}

fn entry_from_item(item: &Value) -> Option<CategoryEntry> {
    let object = item.as_object()?;
    let name = first_string(object, &NAME_KEYS)?;
    let locator = first_string(object, &LOCATOR_KEYS);
    Some(CategoryEntry { name, locator })
}

fn first_string(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

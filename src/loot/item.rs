//! Loot item metadata decoding

use crate::chain::{felt_to_str, Felt};
use crate::error::{LootError, LootResult};

use serde_json::{Map, Value};

/// A decoded metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum ItemValue {
    Int(Felt),
    Text(String),
}

impl std::fmt::Display for ItemValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemValue::Int(felt) => write!(f, "{}", felt),
            ItemValue::Text(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemEntry {
    pub name: String,
    pub value: ItemValue,
}

/// Item metadata as returned by `getItemByTokenId`
#[derive(Debug, Clone, PartialEq)]
pub struct LootItem {
    /// First raw value of the response, the item id
    pub id: String,
    pub entries: Vec<ItemEntry>,
}

impl LootItem {
    /// Decode a whitespace-separated response, one value per field name.
    ///
    /// Indices in `string_fields` hold packed short strings; everything else
    /// is an integer. Values past the last field are ignored.
    pub fn decode(
        function: &str,
        response: &str,
        fields: &[String],
        string_fields: &[usize],
    ) -> LootResult<Self> {
        let values: Vec<&str> = response.split_whitespace().collect();
        let id = match values.first() {
            Some(id) if values.len() >= fields.len() => id.to_string(),
            // The item id is always the first value, even with no named fields
            _ => {
                return Err(LootError::MissingOutput {
                    function: function.to_string(),
                    expected: fields.len().max(1),
                    got: values.len(),
                })
            }
        };

        let entries = fields
            .iter()
            .zip(&values)
            .enumerate()
            .map(|(i, (name, raw))| {
                let felt: Felt = raw.parse().map_err(|e| {
                    LootError::Decode(format!("field {} ({}): {}", i, name, e))
                })?;
                let value = if string_fields.contains(&i) {
                    ItemValue::Text(felt_to_str(&felt)?)
                } else {
                    ItemValue::Int(felt)
                };
                Ok(ItemEntry {
                    name: name.clone(),
                    value,
                })
            })
            .collect::<LootResult<Vec<_>>>()?;

        Ok(Self {
            id,
            entries,
        })
    }

    pub fn header(&self) -> String {
        format!("_________ LOOT ITEM - {}___________", self.id)
    }

    /// One `name : value` line per field, in field order
    pub fn pretty_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{} : {}", e.name, e.value))
            .collect()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&ItemValue> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.value)
    }

    /// JSON object keyed by field name; integers become decimal strings
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|e| (e.name.clone(), Value::String(e.value.to_string())))
            .collect();
        Value::Object(map)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Country = String;

pub const FIRST_PARAGRAPH: &str = "first_paragraph";

/// One leader as returned by the API. Fields are kept verbatim and in
/// upstream order; only `first_paragraph` is ever added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderRecord(Map<String, Value>);

impl LeaderRecord {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn first_name(&self) -> &str {
        self.str_field("first_name").unwrap_or_default()
    }

    // null for mononymous leaders
    pub fn last_name(&self) -> Option<&str> {
        self.str_field("last_name")
    }

    pub fn wikipedia_url(&self) -> Option<&str> {
        self.str_field("wikipedia_url").map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn display_name(&self) -> String {
        match self.last_name() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name(), last),
            _ => self.first_name().to_string(),
        }
    }

    pub fn first_paragraph(&self) -> Option<&str> {
        self.str_field(FIRST_PARAGRAPH)
    }

    pub fn set_first_paragraph(&mut self, paragraph: String) {
        self.0.insert(FIRST_PARAGRAPH.to_string(), Value::String(paragraph));
    }
}

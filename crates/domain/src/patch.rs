use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 发送给 Ghost 的增量字段集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataPatch(Map<String, Value>);

impl MetadataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ghost Admin API 的更新请求体: `{"posts": [{...}]}`
    pub fn to_update_body(&self) -> Value {
        serde_json::json!({ "posts": [Value::Object(self.0.clone())] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_fields_in_posts_array() {
        let mut patch = MetadataPatch::new();
        patch.set("meta_title", "Hello").set("og_description", Value::Null);

        let body = patch.to_update_body();
        assert_eq!(body["posts"][0]["meta_title"], "Hello");
        assert!(body["posts"][0]["og_description"].is_null());
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.get_str("meta_title"), Some("Hello"));
    }
}

//! Serde helpers shared by request types.

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable patch field.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`: a missing
/// field stays `None`, an explicit `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        image_url: Option<Option<String>>,
    }

    #[test]
    fn test_missing_null_and_value_are_distinct() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"image_url":"/a.png"}"#).unwrap();

        assert_eq!(missing.image_url, None);
        assert_eq!(null.image_url, Some(None));
        assert_eq!(value.image_url, Some(Some("/a.png".to_string())));
    }
}

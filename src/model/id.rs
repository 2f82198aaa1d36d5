use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Accepts an id sent either as a JSON number or as a numeric string
/// (`"userId": "2"`), which is what HTML form values produce.
pub fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<RawId>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(raw) => raw,
    };

    let value = match raw {
        RawId::Number(n) => n,
        RawId::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<i64>()
                .map_err(|_| de::Error::custom(format!("invalid id: {s:?}")))?
        }
    };

    i32::try_from(value)
        .map(Some)
        .map_err(|_| de::Error::custom(format!("id out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Body {
        #[serde(default, deserialize_with = "super::lenient_id")]
        user_id: Option<i32>,
    }

    fn parse(value: serde_json::Value) -> Result<Option<i32>, serde_json::Error> {
        serde_json::from_value::<Body>(value).map(|b| b.user_id)
    }

    #[test]
    fn numbers_and_numeric_strings_are_accepted() {
        assert_eq!(parse(json!({ "userId": 2 })).unwrap(), Some(2));
        assert_eq!(parse(json!({ "userId": "2" })).unwrap(), Some(2));
        assert_eq!(parse(json!({ "userId": " 17 " })).unwrap(), Some(17));
    }

    #[test]
    fn absent_null_and_blank_mean_missing() {
        assert_eq!(parse(json!({})).unwrap(), None);
        assert_eq!(parse(json!({ "userId": null })).unwrap(), None);
        assert_eq!(parse(json!({ "userId": "" })).unwrap(), None);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse(json!({ "userId": "abc" })).is_err());
        assert!(parse(json!({ "userId": 1.5 })).is_err());
        assert!(parse(json!({ "userId": 9_999_999_999i64 })).is_err());
    }
}

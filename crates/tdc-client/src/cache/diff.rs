use serde::Serialize;
use serde_json::{Map, Value};

/// Top-level fields of `edited` that differ from `snapshot`.
///
/// Used to build PATCH bodies that carry only what the user changed, so
/// fields the server computes are never written back.
pub fn json_diff<T: Serialize>(snapshot: &T, edited: &T) -> Map<String, Value> {
    let (Ok(Value::Object(before)), Ok(Value::Object(after))) =
        (serde_json::to_value(snapshot), serde_json::to_value(edited))
    else {
        return Map::new();
    };

    let mut changed = Map::new();
    // fields skipped on serialization (cleared options) are sent as null
    for key in before.keys() {
        if !after.contains_key(key) {
            changed.insert(key.clone(), Value::Null);
        }
    }
    for (key, value) in after {
        if before.get(&key) != Some(&value) {
            changed.insert(key, value);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Team {
        id: i64,
        team_name: String,
        video_freeze: bool,
        members: Vec<String>,
    }

    #[test]
    fn test_only_changed_fields() {
        let before = Team {
            id: 1,
            team_name: "Skyhawks".into(),
            video_freeze: false,
            members: vec!["a".into()],
        };
        let after = Team {
            id: 1,
            team_name: "Skyhawks".into(),
            video_freeze: true,
            members: vec!["a".into(), "b".into()],
        };

        let diff = json_diff(&before, &after);
        assert_eq!(diff.len(), 2);
        assert_eq!(diff["video_freeze"], Value::Bool(true));
        assert!(diff.contains_key("members"));
        assert!(json_diff(&before, &before).is_empty());
    }

    #[test]
    fn test_cleared_option_becomes_null() {
        #[derive(Serialize)]
        struct Profile {
            #[serde(skip_serializing_if = "Option::is_none")]
            phone: Option<String>,
        }

        let diff = json_diff(&Profile { phone: Some("98".into()) }, &Profile { phone: None });
        assert_eq!(diff["phone"], Value::Null);
    }
}

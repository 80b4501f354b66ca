//! Typed search hit decoded from a Qdrant point payload.

use serde_json::Value;

/// One passage returned by similarity search.
///
/// `score` is the raw vector similarity reported by Qdrant. It is meaningful
/// only relative to other hits from the same search, not to scores coming
/// from other retrieval sources.
#[derive(Clone, Debug)]
pub struct PassageHit {
    pub score: f32,
    pub chunk_id: String,
    pub chapter_id: i32,
    pub section_id: String,
    pub section_title: String,
    pub preview_text: String,
}

impl PassageHit {
    /// Decodes a hit from a payload JSON object.
    ///
    /// Missing or mistyped fields fall back to defaults; a partially indexed
    /// point should degrade the citation, not fail the whole search.
    pub fn from_payload(score: f32, payload: &Value) -> Self {
        let str_field = |key: &str| {
            payload
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let chapter_id = payload
            .get("chapter_id")
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0);

        Self {
            score,
            chunk_id: str_field("chunk_id"),
            chapter_id,
            section_id: str_field("section_id"),
            section_title: str_field("section_title"),
            preview_text: str_field("preview_text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_payload() {
        let payload = json!({
            "chunk_id": "ch3-ros-001",
            "chapter_id": 3,
            "section_id": "3.1",
            "section_title": "ROS 2 Architecture",
            "preview_text": "ROS 2 is built on DDS...",
        });
        let hit = PassageHit::from_payload(0.91, &payload);
        assert_eq!(hit.chunk_id, "ch3-ros-001");
        assert_eq!(hit.chapter_id, 3);
        assert_eq!(hit.section_title, "ROS 2 Architecture");
        assert!((hit.score - 0.91).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_fields_degrade_to_defaults() {
        let payload = json!({ "chapter_id": "not a number" });
        let hit = PassageHit::from_payload(0.5, &payload);
        assert_eq!(hit.chapter_id, 0);
        assert!(hit.chunk_id.is_empty());
        assert!(hit.preview_text.is_empty());
    }
}

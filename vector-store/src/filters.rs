//! Chapter filter conversion to a Qdrant `Filter`.

use qdrant_client::qdrant::{Condition, FieldCondition, Filter, Match, condition::ConditionOneOf};
use tracing::trace;

/// Builds a filter that restricts search to points whose `chapter_id`
/// payload field equals the given chapter.
pub fn chapter_filter(chapter_id: i32) -> Filter {
    trace!("filters::chapter_filter chapter_id={chapter_id}");

    let condition = Condition {
        condition_one_of: Some(ConditionOneOf::Field(FieldCondition {
            key: "chapter_id".to_string(),
            r#match: Some(Match {
                match_value: Some(qdrant_client::qdrant::r#match::MatchValue::Integer(
                    i64::from(chapter_id),
                )),
            }),
            ..Default::default()
        })),
    };

    Filter {
        must: vec![condition],
        ..Default::default()
    }
}

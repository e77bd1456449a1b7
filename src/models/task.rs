use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    /// The user who created the task. Forced server-side on creation and
    /// used to scope every read and mutation.
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /tasks`.
///
/// Unknown fields (including an attempted `owner`) are ignored here rather
/// than rejected; the owner is always taken from the authenticated session.
#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Payload for `PATCH /tasks/{id}`.
///
/// The allowed fields are exactly description and completed. Any other key
/// fails deserialization, rejecting the whole update with no partial apply.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdate {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Query parameters for `GET /tasks`.
///
/// All three arrive as raw strings and are coerced leniently: `completed`
/// treats anything other than the literal `"true"` as false, and
/// non-numeric `limit`/`skip` values are ignored rather than rejected.
/// This matches the historical behaviour of the API.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<String>,
    pub limit: Option<String>,
    pub skip: Option<String>,
}

impl TaskQuery {
    pub fn completed_filter(&self) -> Option<bool> {
        self.completed.as_deref().map(|value| value == "true")
    }

    pub fn limit(&self) -> Option<i64> {
        Self::pagination_value(self.limit.as_deref())
    }

    pub fn skip(&self) -> Option<i64> {
        Self::pagination_value(self.skip.as_deref())
    }

    /// Non-numeric and negative values are ignored rather than rejected;
    /// a negative LIMIT/OFFSET would be a database error, not a filter.
    fn pagination_value(raw: Option<&str>) -> Option<i64> {
        raw.and_then(|value| value.parse().ok())
            .filter(|value| *value >= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_filter_coercion() {
        let query = TaskQuery {
            completed: Some("true".to_string()),
            ..Default::default()
        };
        assert_eq!(query.completed_filter(), Some(true));

        let query = TaskQuery {
            completed: Some("false".to_string()),
            ..Default::default()
        };
        assert_eq!(query.completed_filter(), Some(false));

        // Anything other than "true" selects incomplete tasks.
        let query = TaskQuery {
            completed: Some("yes".to_string()),
            ..Default::default()
        };
        assert_eq!(query.completed_filter(), Some(false));

        let query = TaskQuery::default();
        assert_eq!(query.completed_filter(), None);
    }

    #[test]
    fn test_pagination_ignores_non_numeric_values() {
        let query = TaskQuery {
            limit: Some("10".to_string()),
            skip: Some("twenty".to_string()),
            ..Default::default()
        };
        assert_eq!(query.limit(), Some(10));
        assert_eq!(query.skip(), None);
    }

    #[test]
    fn test_pagination_ignores_negative_values() {
        let query = TaskQuery {
            limit: Some("-1".to_string()),
            skip: Some("-20".to_string()),
            ..Default::default()
        };
        assert_eq!(query.limit(), None);
        assert_eq!(query.skip(), None);

        let query = TaskQuery {
            limit: Some("0".to_string()),
            ..Default::default()
        };
        assert_eq!(query.limit(), Some(0));
    }

    #[test]
    fn test_task_update_rejects_unknown_fields() {
        let result: Result<TaskUpdate, _> =
            serde_json::from_str(r#"{"description": "x", "owner": "other"}"#);
        assert!(result.is_err());

        let result: Result<TaskUpdate, _> =
            serde_json::from_str(r#"{"description": "x", "completed": true}"#);
        assert!(result.is_ok());
    }

    #[test]
    fn test_task_create_ignores_extra_fields() {
        let create: TaskCreate =
            serde_json::from_str(r#"{"description": "walk the dog", "owner": "someone-else"}"#)
                .unwrap();
        assert_eq!(create.description.as_deref(), Some("walk the dog"));
        assert_eq!(create.completed, None);
    }
}

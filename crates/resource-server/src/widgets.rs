//! In-memory widget resource.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use resource_manager::{
    HandlerError, HandlerResult, Id, InvalidSpec, Pagination, RequestContext, ResourceHandler,
    ResourceSpec,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ResourceSpec for Widget {
    fn has_id(&self) -> bool {
        self.id.as_ref().is_some_and(|id| !id.is_empty())
    }

    fn validate(&self) -> Result<(), InvalidSpec> {
        if self.name.trim().is_empty() {
            return Err(InvalidSpec::new("name must not be empty"));
        }
        Ok(())
    }
}

/// Widgets keyed by id. `query` matches a case-insensitive substring of the
/// name or color.
#[derive(Debug, Default)]
pub struct WidgetStore {
    widgets: RwLock<BTreeMap<Id, Widget>>,
}

impl WidgetStore {
    fn matching(&self, query: &str) -> Vec<Widget> {
        let query = query.to_lowercase();
        self.widgets
            .read()
            .values()
            .filter(|w| {
                query.is_empty()
                    || w.name.to_lowercase().contains(&query)
                    || w
                        .color
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }
}

fn stored_id(widget: &Widget) -> HandlerResult<Id> {
    widget
        .id
        .clone()
        .ok_or_else(|| HandlerError::msg("widget has no id"))
}

#[async_trait]
impl ResourceHandler<Widget> for WidgetStore {
    async fn count(&self, _ctx: &RequestContext, query: &str) -> HandlerResult<usize> {
        Ok(self.matching(query).len())
    }

    async fn list(&self, ctx: &RequestContext, pagination: &Pagination) -> HandlerResult<Vec<Widget>> {
        let mut widgets = self.matching(pagination.query());

        match pagination.sort_by() {
            "name" => widgets.sort_by(|a, b| a.name.cmp(&b.name)),
            "createdAt" => widgets.sort_by_key(|w| w.created_at),
            _ => {}
        }
        if pagination.is_descending() {
            widgets.reverse();
        }

        debug!(
            request_id = ctx.request_id(),
            matched = widgets.len(),
            "Listing widgets"
        );
        Ok(pagination.window(widgets).collect())
    }

    async fn get(&self, _ctx: &RequestContext, id: &Id) -> HandlerResult<Widget> {
        self.widgets
            .read()
            .get(id)
            .cloned()
            .ok_or(HandlerError::NotFound)
    }

    async fn create(&self, _ctx: &RequestContext, mut spec: Widget) -> HandlerResult<Widget> {
        let id = stored_id(&spec)?;
        let mut widgets = self.widgets.write();
        if widgets.contains_key(&id) {
            return Err(HandlerError::msg(format!("widget '{}' already exists", id)));
        }

        spec.created_at.get_or_insert_with(Utc::now);
        widgets.insert(id, spec.clone());
        Ok(spec)
    }

    async fn update(&self, _ctx: &RequestContext, mut spec: Widget) -> HandlerResult<Widget> {
        let id = stored_id(&spec)?;
        let mut widgets = self.widgets.write();
        let existing = widgets.get_mut(&id).ok_or(HandlerError::NotFound)?;

        if spec.created_at.is_none() {
            spec.created_at = existing.created_at;
        }
        *existing = spec.clone();
        Ok(spec)
    }

    async fn delete(&self, _ctx: &RequestContext, id: &Id) -> HandlerResult<()> {
        self.widgets
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or(HandlerError::NotFound)
    }

    fn set_id(&self, mut spec: Widget, id: Id) -> Widget {
        spec.id = Some(id);
        spec
    }

    fn sorting_fields(&self) -> &[&'static str] {
        &["name", "createdAt"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_manager::Operation;

    fn ctx(operation: Operation) -> RequestContext {
        RequestContext::new(operation, "widget", None)
    }

    fn widget(id: &str, name: &str, color: Option<&str>) -> Widget {
        Widget {
            id: Some(Id::new(id)),
            name: name.to_string(),
            color: color.map(str::to_string),
            created_at: None,
        }
    }

    async fn seeded() -> WidgetStore {
        let store = WidgetStore::default();
        for w in [
            widget("3", "crank", Some("Red")),
            widget("1", "bolt", None),
            widget("2", "axle", Some("blue")),
        ] {
            store.create(&ctx(Operation::Create), w).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_create_sets_created_at() {
        let store = WidgetStore::default();
        let created = store
            .create(&ctx(Operation::Create), widget("1", "bolt", None))
            .await
            .unwrap();
        assert!(created.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_fails() {
        let store = seeded().await;
        let err = store
            .create(&ctx(Operation::Create), widget("1", "again", None))
            .await
            .unwrap_err();
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_get_and_delete_not_found() {
        let store = seeded().await;
        let missing = Id::new("9");
        assert!(store.get(&ctx(Operation::Get), &missing).await.unwrap_err().is_not_found());
        assert!(
            store
                .delete(&ctx(Operation::Delete), &missing)
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let store = seeded().await;
        let before = store.get(&ctx(Operation::Get), &Id::new("1")).await.unwrap();

        let updated = store
            .update(&ctx(Operation::Update), widget("1", "nut", None))
            .await
            .unwrap();
        assert_eq!(updated.name, "nut");
        assert_eq!(updated.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = seeded().await;
        let err = store
            .update(&ctx(Operation::Update), widget("7", "ghost", None))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_query_sort_and_window() {
        let store = seeded().await;

        let all = store
            .list(&ctx(Operation::List), &Pagination::default().with_sort("name", "asc"))
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["axle", "bolt", "crank"]);

        let page = store
            .list(
                &ctx(Operation::List),
                &Pagination::new(1, 1).with_sort("name", "desc"),
            )
            .await
            .unwrap();
        assert_eq!(page[0].name, "bolt");

        assert_eq!(store.count(&ctx(Operation::List), "RED").await.unwrap(), 1);
        assert_eq!(store.count(&ctx(Operation::List), "").await.unwrap(), 3);
    }

    #[test]
    fn test_validate() {
        assert!(widget("1", "bolt", None).validate().is_ok());
        assert!(widget("1", "", None).validate().is_err());
    }

    #[test]
    fn test_wire_names() {
        let value = serde_json::to_value(Widget {
            created_at: Some(DateTime::<Utc>::UNIX_EPOCH),
            ..widget("1", "bolt", Some("red"))
        })
        .unwrap();
        assert_eq!(value["createdAt"], "1970-01-01T00:00:00Z");
        assert_eq!(value["color"], "red");
    }
}

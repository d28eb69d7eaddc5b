//! Widget resource type and handlers used across the integration tests.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use resource_manager::{
    HandlerError, HandlerResult, Id, InvalidSpec, Operation, Pagination, RequestContext,
    ResourceHandler, ResourceSpec,
};
use serde::{Deserialize, Serialize};

/// A widget spec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub size: u32,
}

impl Widget {
    pub fn new(name: &str, size: u32) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            size,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(Id::new(id));
        self
    }
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

/// In-memory widget store. Clones share state.
///
/// Widgets are kept in insertion order; `query` filters on a name substring.
#[derive(Debug, Clone, Default)]
pub struct WidgetStore {
    widgets: Arc<RwLock<Vec<Widget>>>,
    calls: Arc<Mutex<Vec<(Operation, Option<String>)>>>,
}

impl WidgetStore {
    /// Inserts widgets directly, bypassing the dispatcher.
    pub fn seed(&self, widgets: impl IntoIterator<Item = Widget>) {
        self.widgets.write().extend(widgets);
    }

    pub fn all(&self) -> Vec<Widget> {
        self.widgets.read().clone()
    }

    pub fn find(&self, id: &str) -> Option<Widget> {
        self.widgets
            .read()
            .iter()
            .find(|w| w.id.as_ref().is_some_and(|i| i.as_str() == id))
            .cloned()
    }

    /// Operations the dispatcher invoked, with the request id of each call.
    pub fn calls(&self) -> Vec<(Operation, Option<String>)> {
        self.calls.lock().clone()
    }

    pub fn called(&self, operation: Operation) -> bool {
        self.calls.lock().iter().any(|(op, _)| *op == operation)
    }

    fn record(&self, ctx: &RequestContext) {
        self.calls
            .lock()
            .push((ctx.operation(), ctx.request_id().map(str::to_string)));
    }

    fn matching(&self, query: &str) -> Vec<Widget> {
        self.widgets
            .read()
            .iter()
            .filter(|w| query.is_empty() || w.name.contains(query))
            .cloned()
            .collect()
    }
}

fn position(widgets: &[Widget], id: &Id) -> Option<usize> {
    widgets.iter().position(|w| w.id.as_ref() == Some(id))
}

#[async_trait]
impl ResourceHandler<Widget> for WidgetStore {
    async fn count(&self, ctx: &RequestContext, query: &str) -> HandlerResult<usize> {
        self.record(ctx);
        Ok(self.matching(query).len())
    }

    async fn list(&self, _ctx: &RequestContext, pagination: &Pagination) -> HandlerResult<Vec<Widget>> {
        let mut widgets = self.matching(pagination.query());

        let compare: Option<fn(&Widget, &Widget) -> Ordering> = match pagination.sort_by() {
            "name" => Some(|a, b| a.name.cmp(&b.name)),
            "size" => Some(|a, b| a.size.cmp(&b.size)),
            _ => None,
        };
        if let Some(compare) = compare {
            widgets.sort_by(compare);
            if pagination.is_descending() {
                widgets.reverse();
            }
        }

        Ok(pagination.window(widgets).collect())
    }

    async fn get(&self, ctx: &RequestContext, id: &Id) -> HandlerResult<Widget> {
        self.record(ctx);
        let widgets = self.widgets.read();
        position(&widgets, id)
            .map(|i| widgets[i].clone())
            .ok_or(HandlerError::NotFound)
    }

    async fn create(&self, ctx: &RequestContext, spec: Widget) -> HandlerResult<Widget> {
        self.record(ctx);
        self.widgets.write().push(spec.clone());
        Ok(spec)
    }

    async fn update(&self, ctx: &RequestContext, spec: Widget) -> HandlerResult<Widget> {
        self.record(ctx);
        let id = spec.id.clone().ok_or(HandlerError::NotFound)?;
        let mut widgets = self.widgets.write();
        let index = position(&widgets, &id).ok_or(HandlerError::NotFound)?;
        widgets[index] = spec.clone();
        Ok(spec)
    }

    async fn delete(&self, ctx: &RequestContext, id: &Id) -> HandlerResult<()> {
        self.record(ctx);
        let mut widgets = self.widgets.write();
        let index = position(&widgets, id).ok_or(HandlerError::NotFound)?;
        widgets.remove(index);
        Ok(())
    }

    fn set_id(&self, mut spec: Widget, id: Id) -> Widget {
        spec.id = Some(id);
        spec
    }

    fn sorting_fields(&self) -> &[&'static str] {
        &["name", "size"]
    }
}

/// A handler whose every call fails with a storage error.
#[derive(Debug, Clone, Default)]
pub struct FailingStore;

fn unavailable<T>() -> HandlerResult<T> {
    Err(HandlerError::msg("storage unavailable"))
}

#[async_trait]
impl ResourceHandler<Widget> for FailingStore {
    async fn count(&self, _ctx: &RequestContext, _query: &str) -> HandlerResult<usize> {
        unavailable()
    }

    async fn list(&self, _ctx: &RequestContext, _pagination: &Pagination) -> HandlerResult<Vec<Widget>> {
        unavailable()
    }

    async fn get(&self, _ctx: &RequestContext, _id: &Id) -> HandlerResult<Widget> {
        unavailable()
    }

    async fn create(&self, _ctx: &RequestContext, _spec: Widget) -> HandlerResult<Widget> {
        unavailable()
    }

    async fn update(&self, _ctx: &RequestContext, _spec: Widget) -> HandlerResult<Widget> {
        unavailable()
    }

    async fn delete(&self, _ctx: &RequestContext, _id: &Id) -> HandlerResult<()> {
        unavailable()
    }

    fn set_id(&self, mut spec: Widget, id: Id) -> Widget {
        spec.id = Some(id);
        spec
    }

    fn sorting_fields(&self) -> &[&'static str] {
        &["name"]
    }
}

/// Five widgets, `w-1` .. `w-5`, named `alpha` .. `echo`.
pub fn five_widgets() -> Vec<Widget> {
    ["alpha", "bravo", "charlie", "delta", "echo"]
        .iter()
        .enumerate()
        .map(|(i, name)| Widget::new(name, (i as u32 + 1) * 10).with_id(&format!("w-{}", i + 1)))
        .collect()
}

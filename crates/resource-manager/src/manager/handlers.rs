//! Request pipelines for the five operations.
//!
//! Every pipeline is linear with early returns:
//!
//! 1. negotiate an encoder (failure: 400, plain text)
//! 2. set `Content-Type` from the encoder
//! 3. extract parameters or body (failure: 400, encoded)
//! 4. call the handler (not found: 404 empty, other: 500 encoded)
//! 5. wrap, encode and answer with the operation's success status

use std::sync::Arc;

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::{Manager, UpdateIdPolicy};
use crate::encoding::Encoder;
use crate::error::{EncodingError, HandlerError, ManagerError, ManagerResult};
use crate::handler::{RequestContext, ResourceHandler};
use crate::operation::Operation;
use crate::pagination::Pagination;
use crate::resource::{Id, Resource, ResourceList, ResourceSpec, Values};

const X_REQUEST_ID: &str = "x-request-id";

impl<T, H> Manager<T, H>
where
    T: ResourceSpec,
    H: ResourceHandler<T>,
{
    /// Serves `GET /{plural}`.
    pub async fn list(&self, request: Request) -> Response {
        let (parts, _body) = request.into_parts();
        let encoder = match self.negotiate(&parts.headers) {
            Ok(encoder) => encoder,
            Err(response) => return response,
        };
        let ctx = self.context(Operation::List, &parts.headers);
        let result = self.list_resources(&ctx, parts.uri.query()).await;
        self.respond(encoder.as_ref(), Operation::List, result)
    }

    /// Serves `GET /{plural}/{id}`.
    pub async fn get(&self, id: String, request: Request) -> Response {
        let encoder = match self.negotiate(request.headers()) {
            Ok(encoder) => encoder,
            Err(response) => return response,
        };
        let ctx = self.context(Operation::Get, request.headers());
        let id = Id::from(id);

        debug!(resource_type = %self.resource_type_singular, id = %id, "Processing get request");

        let result = match self.handler.get(&ctx, &id).await {
            Ok(spec) => self.wrap(spec).map(Some),
            Err(err) => Err(self.handler_error(Operation::Get, err)),
        };
        self.respond(encoder.as_ref(), Operation::Get, result)
    }

    /// Serves `POST /{plural}`.
    pub async fn create(&self, request: Request) -> Response {
        self.operation_with_body(Operation::Create, None, request)
            .await
    }

    /// Serves `PUT /{plural}/{id}`.
    pub async fn update(&self, id: String, request: Request) -> Response {
        self.operation_with_body(Operation::Update, Some(Id::from(id)), request)
            .await
    }

    /// Serves `DELETE /{plural}/{id}`.
    pub async fn delete(&self, id: String, request: Request) -> Response {
        let encoder = match self.negotiate(request.headers()) {
            Ok(encoder) => encoder,
            Err(response) => return response,
        };
        let ctx = self.context(Operation::Delete, request.headers());
        let id = Id::from(id);

        debug!(resource_type = %self.resource_type_singular, id = %id, "Processing delete request");

        let result = match self.handler.delete(&ctx, &id).await {
            Ok(()) => Ok(None),
            Err(err) => Err(self.handler_error(Operation::Delete, err)),
        };
        self.respond(encoder.as_ref(), Operation::Delete, result)
    }

    async fn list_resources(
        &self,
        ctx: &RequestContext,
        query: Option<&str>,
    ) -> ManagerResult<Option<Values>> {
        let pagination = Pagination::from_query(query, self.handler.sorting_fields())?;

        debug!(
            resource_type = %self.resource_type_singular,
            take = pagination.take(),
            skip = pagination.skip(),
            query = pagination.query(),
            sort_by = pagination.sort_by(),
            sort_direction = pagination.sort_direction(),
            "Processing list request"
        );

        let (count, items) = tokio::join!(
            self.handler.count(ctx, pagination.query()),
            self.handler.list(ctx, &pagination),
        );
        let count = count.map_err(|err| self.handler_error(Operation::List, err))?;
        let items = items.map_err(|err| self.handler_error(Operation::List, err))?;

        let mut list = ResourceList::new(count);
        for item in items {
            list.push(&Resource::new(self.resource_type_singular.as_str(), item))
                .map_err(marshal_error)?;
        }

        list.to_values().map(Some).map_err(marshal_error)
    }

    async fn operation_with_body(
        &self,
        operation: Operation,
        path_id: Option<Id>,
        request: Request,
    ) -> Response {
        let (parts, body) = request.into_parts();
        let encoder = match self.negotiate(&parts.headers) {
            Ok(encoder) => encoder,
            Err(response) => return response,
        };
        let ctx = self.context(operation, &parts.headers);

        debug!(
            resource_type = %self.resource_type_singular,
            operation = %operation,
            encoder = encoder.name(),
            "Processing {} request",
            operation.as_str().to_lowercase()
        );

        let result = self
            .write_resource(&ctx, encoder.as_ref(), path_id, body)
            .await;
        self.respond(encoder.as_ref(), operation, result)
    }

    /// Stores a resource supplied as envelope values rather than through a
    /// request.
    ///
    /// The values go through the same steps as a `POST` body: decoding, the
    /// resource type check, validation and id assignment, then
    /// [`ResourceHandler::create`].
    ///
    /// # Errors
    ///
    /// [`ManagerError::BadRequest`] when the values do not decode or
    /// validate; otherwise the handler's failure mapped as for `POST`.
    pub async fn provision(&self, ctx: &RequestContext, values: Values) -> ManagerResult<T> {
        debug!(
            resource_type = %self.resource_type_singular,
            request_id = ctx.request_id(),
            "Provisioning resource"
        );
        self.store_values(ctx, Operation::Create, None, values).await
    }

    async fn write_resource(
        &self,
        ctx: &RequestContext,
        encoder: &dyn Encoder,
        path_id: Option<Id>,
        body: Body,
    ) -> ManagerResult<Option<Values>> {
        let values = self.read_values(encoder, body).await.map_err(|message| {
            ManagerError::bad_request(format!("cannot parse body: {}", message))
        })?;

        let stored = self
            .store_values(ctx, ctx.operation(), path_id, values)
            .await?;
        self.wrap(stored).map(Some)
    }

    async fn store_values(
        &self,
        ctx: &RequestContext,
        operation: Operation,
        path_id: Option<Id>,
        values: Values,
    ) -> ManagerResult<T> {
        let resource = Resource::<T>::from_values(values).map_err(|err| {
            ManagerError::bad_request(format!("cannot unmarshal body values: {}", err))
        })?;

        if self.config.strict_resource_type && resource.resource_type != self.resource_type_singular
        {
            return Err(ManagerError::bad_request(format!(
                "resource type mismatch: expected '{}', got '{}'",
                self.resource_type_singular, resource.resource_type
            )));
        }

        let mut spec = resource.into_spec();
        spec.validate().map_err(|err| {
            ManagerError::bad_request(format!("invalid {}: {}", self.resource_type_singular, err))
        })?;

        if !spec.has_id() {
            let id = match (operation, path_id, self.config.update_id_policy) {
                (Operation::Update, Some(id), UpdateIdPolicy::FromPath) => id,
                _ => (self.config.id_generator)(),
            };
            debug!(id = %id, "Assigning id");
            spec = self.handler.set_id(spec, id);
        }

        match operation {
            Operation::Create => self.handler.create(ctx, spec).await,
            _ => self.handler.update(ctx, spec).await,
        }
        .map_err(|err| self.handler_error(operation, err))
    }

    async fn read_values(&self, encoder: &dyn Encoder, body: Body) -> Result<Values, String> {
        let bytes = axum::body::to_bytes(body, self.config.body_limit)
            .await
            .map_err(|err| format!("cannot read request body: {}", err))?;

        if bytes.is_empty() {
            return Err("request body is empty".to_string());
        }

        encoder
            .unmarshal(&bytes)
            .map_err(|err| format!("cannot unmarshal request: {}", err))
    }

    pub(super) fn wrap(&self, spec: T) -> ManagerResult<Values> {
        Resource::new(self.resource_type_singular.as_str(), spec)
            .to_values()
            .map_err(marshal_error)
    }

    fn negotiate(&self, headers: &HeaderMap) -> Result<Arc<dyn Encoder>, Response> {
        self.config
            .negotiator
            .select_from_request(headers)
            .map_err(|err| {
                warn!(
                    resource_type = %self.resource_type_singular,
                    error = %err,
                    "Content negotiation failed"
                );
                (
                    StatusCode::BAD_REQUEST,
                    format!("cannot process request: {}", err),
                )
                    .into_response()
            })
    }

    fn context(&self, operation: Operation, headers: &HeaderMap) -> RequestContext {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        RequestContext::new(operation, self.resource_type_singular.as_str(), request_id)
    }

    fn handler_error(&self, operation: Operation, err: HandlerError) -> ManagerError {
        match &err {
            HandlerError::NotFound => debug!(
                resource_type = %self.resource_type_singular,
                operation = %operation,
                "Resource not found"
            ),
            HandlerError::Other(cause) => {
                let cause = format!("{:#}", cause);
                error!(
                    resource_type = %self.resource_type_singular,
                    operation = %operation,
                    error = %cause,
                    "Resource handler failed"
                );
            }
        }
        ManagerError::from_handler(err, operation.verb(), &self.resource_type_singular)
    }

    fn respond(
        &self,
        encoder: &dyn Encoder,
        operation: Operation,
        result: ManagerResult<Option<Values>>,
    ) -> Response {
        let response = match result {
            Ok(Some(values)) => match encoder.marshal(&values) {
                Ok(body) => (operation.success_status(), body).into_response(),
                Err(err) => error_response(encoder, marshal_error(err)),
            },
            Ok(None) => operation.success_status().into_response(),
            Err(err) => {
                if err.status_code().is_client_error() && err.status_code() != StatusCode::NOT_FOUND
                {
                    warn!(
                        resource_type = %self.resource_type_singular,
                        operation = %operation,
                        error = %err,
                        "Rejected request"
                    );
                }
                error_response(encoder, err)
            }
        };
        with_content_type(response, encoder)
    }
}

fn marshal_error(err: EncodingError) -> ManagerError {
    error!(error = %err, "cannot marshal entity");
    ManagerError::internal(format!("cannot marshal entity: {}", err))
}

fn error_response(encoder: &dyn Encoder, err: ManagerError) -> Response {
    let status = err.status_code();
    match err.body_message() {
        Some(message) => write_error(encoder, status, message),
        None => status.into_response(),
    }
}

/// Encodes `{code, error}` with the negotiated encoder.
///
/// The body is a fixed two-field mapping; if it cannot be encoded the encoder
/// itself is broken and the process is aborted.
fn write_error(encoder: &dyn Encoder, status: StatusCode, message: &str) -> Response {
    let mut body = Values::new();
    body.insert("code".to_string(), Value::from(status.as_u16()));
    body.insert("error".to_string(), Value::from(message));

    match encoder.marshal(&body) {
        Ok(bytes) => (status, bytes).into_response(),
        Err(err) => {
            error!(encoder = encoder.name(), error = %err, "cannot marshal error body");
            std::process::abort();
        }
    }
}

fn with_content_type(mut response: Response, encoder: &dyn Encoder) -> Response {
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(encoder.response_content_type()),
    );
    response
}

//! The five operations a resource manager can expose.

use std::fmt;

use axum::http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

/// A CRUD operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `GET /{plural}`
    List,
    /// `POST /{plural}`
    Create,
    /// `GET /{plural}/{id}`
    Get,
    /// `PUT /{plural}/{id}`
    Update,
    /// `DELETE /{plural}/{id}`
    Delete,
}

impl Operation {
    /// Every operation, in route registration order.
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Create,
        Operation::Get,
        Operation::Update,
        Operation::Delete,
    ];

    /// Returns the HTTP method the operation is bound to.
    pub fn method(self) -> Method {
        match self {
            Operation::List | Operation::Get => Method::GET,
            Operation::Create => Method::POST,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Returns true if the operation is bound to `/{plural}/{id}`.
    pub fn targets_item(self) -> bool {
        matches!(
            self,
            Operation::Get | Operation::Update | Operation::Delete
        )
    }

    /// Status code of a successful response.
    pub fn success_status(self) -> StatusCode {
        match self {
            Operation::Create => StatusCode::CREATED,
            Operation::Delete => StatusCode::NO_CONTENT,
            Operation::List | Operation::Get | Operation::Update => StatusCode::OK,
        }
    }

    /// Progressive verb used in error messages ("error getting resource ...").
    pub fn verb(self) -> &'static str {
        match self {
            Operation::List => "listing",
            Operation::Create => "creating",
            Operation::Get => "getting",
            Operation::Update => "updating",
            Operation::Delete => "deleting",
        }
    }

    /// Capitalized name used in route names.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "List",
            Operation::Create => "Create",
            Operation::Get => "Get",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

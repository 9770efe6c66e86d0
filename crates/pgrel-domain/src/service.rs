//! Adapter results shaped for callers.
//!
//! Errors become a [`ResponseError`] carrying a stable code:
//!
//! | error                         | code  |
//! |-------------------------------|-------|
//! | unique violation on `email`   | `110` |
//! | unique violation on `username`| `113` |
//! | other unique violation        | `201` |
//! | not-null violation            | `203` |
//! | validation                    | `400` |
//! | not found                     | `404` |
//! | anything else                 | `500` |

use pgrel::{OrmError, OrmResult, Page, PageMeta};
use serde::Serialize;

pub const EMAIL_EXISTED: &str = "110";
pub const USERNAME_EXISTED: &str = "113";
pub const UNIQUE_VIOLATION: &str = "201";
pub const NOT_NULL_VIOLATION: &str = "203";
pub const BAD_REQUEST: &str = "400";
pub const NOT_FOUND: &str = "404";
pub const INTERNAL: &str = "500";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct ResponseError {
    pub code: String,
    pub message: String,
    /// Column or input the error is about, when known.
    #[serde(rename = "source", skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ResponseError {
    pub fn new(code: &str, message: impl Into<String>, field: Option<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            field,
        }
    }

    pub fn not_found() -> Self {
        Self::new(NOT_FOUND, "Not found", None)
    }
}

impl From<OrmError> for ResponseError {
    fn from(err: OrmError) -> Self {
        let message = err.to_string();
        match err {
            OrmError::UniqueViolation { column, .. } => {
                let code = match column.as_deref() {
                    Some("email") => EMAIL_EXISTED,
                    Some("username") => USERNAME_EXISTED,
                    _ => UNIQUE_VIOLATION,
                };
                Self::new(code, message, column)
            }
            OrmError::NotNullViolation { column, .. } => Self::new(NOT_NULL_VIOLATION, message, column),
            OrmError::NotFound(_) => Self::new(NOT_FOUND, message, None),
            OrmError::Validation(_) | OrmError::InvalidOrder(_) => {
                Self::new(BAD_REQUEST, message, None)
            }
            _ => Self::new(INTERNAL, message, None),
        }
    }
}

pub type ServiceResult<T> = Result<T, ResponseError>;

/// A page as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

fn failed(err: OrmError) -> ResponseError {
    tracing::error!(error = %err, "adapter call failed");
    ResponseError::from(err)
}

pub fn respond_one<T>(result: OrmResult<T>) -> ServiceResult<T> {
    result.map_err(failed)
}

/// Like [`respond_one`], with a missing row reported as not found.
pub fn respond_get_one<T>(result: OrmResult<Option<T>>) -> ServiceResult<T> {
    result.map_err(failed)?.ok_or_else(ResponseError::not_found)
}

pub fn respond_many<T>(result: OrmResult<Vec<T>>) -> ServiceResult<Vec<T>> {
    result.map_err(failed)
}

pub fn respond_page<T>(result: OrmResult<Page<T>>) -> ServiceResult<PageResponse<T>> {
    let page = result.map_err(failed)?;
    Ok(PageResponse {
        data: page.data,
        pagination: page.meta,
    })
}

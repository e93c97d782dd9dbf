//! Blocking execution seam for hosts that run calls inline.
//!
//! Async hosts execute `HttpRequest`s themselves and feed the outcome to
//! `TodoController::complete`; this trait only serves hosts that are happy
//! to block, such as scripts and tests.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Implementations return non-2xx statuses as `Ok`; status interpretation
/// belongs to the client's `parse_*` methods. Only failures to obtain a
/// response at all become `ApiError::Transport`.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

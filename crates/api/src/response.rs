//! Shared response envelope types for API handlers.
//!
//! All JSON responses use a `{ "data": ... }` envelope. Responses backed by
//! the two-tier stores also name the serving tier in
//! [`STORAGE_TIER_HEADER`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tablebuilder_db::store::{Served, StorageTier};

/// Response header naming the tier (`remote` or `local`) that served a call.
pub const STORAGE_TIER_HEADER: &str = "x-storage-tier";

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `[(x-storage-tier, tier)]`, usable as response parts.
pub fn tier_header(tier: StorageTier) -> [(&'static str, &'static str); 1] {
    [(STORAGE_TIER_HEADER, tier.as_str())]
}

/// Wrap a served value in the data envelope with its tier header.
pub fn served_json<T: Serialize>(status: StatusCode, served: Served<T>) -> Response {
    (
        status,
        tier_header(served.tier),
        Json(DataResponse { data: served.value }),
    )
        .into_response()
}

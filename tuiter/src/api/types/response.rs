use actix_web::HttpResponse;
use serde_json::json;

use crate::errors::TuiterError;

pub type Response = Result<HttpResponse, TuiterError>;

/// Body returned by delete endpoints, shaped like the store's delete result.
pub fn deleted(count: u64) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "deletedCount": count }))
}

use actix_web::{HttpResponse, ResponseError};
use colored::Colorize;
use log::error;
use mongodb::error::{ErrorKind, WriteFailure};
use serde_json::json;
use std::error::Error;
use std::fmt;

const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug)]
pub enum TuiterError {
    // 400s
    Unauthenticated,
    Unauthorized(&'static str),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PollClosed,
    ValidationError((String, String)),
    // 500
    MongoError(mongodb::error::Error),
    BsonSerError(bson::ser::Error),
    BsonDeError(bson::de::Error),
    ClientSessionError(String),
    InternalServerError(String),
}

impl fmt::Display for TuiterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuiterError::Unauthenticated => write!(f, "Unauthenticated: no active session"),
            TuiterError::Unauthorized(e) => write!(f, "Unauthorized: {}", e),
            TuiterError::Forbidden(e) => write!(f, "Forbidden: {}", e),
            TuiterError::NotFound(e) => write!(f, "Not Found: {}", e),
            TuiterError::Conflict(e) => write!(f, "Conflict: {}", e),
            TuiterError::PollClosed => write!(f, "Poll Closed: poll no longer accepts responses"),
            TuiterError::ValidationError((field, message)) => {
                write!(f, "Validation Error: {}: {}", field, message)
            }
            TuiterError::MongoError(e) => write!(f, "Mongo Error: \n{}", e),
            TuiterError::BsonSerError(e) => write!(f, "Bson Serialization Error: \n{}", e),
            TuiterError::BsonDeError(e) => write!(f, "Bson Deserialization Error: \n{}", e),
            TuiterError::ClientSessionError(e) => write!(f, "Session Error: {}", e),
            TuiterError::InternalServerError(e) => write!(f, "InternalServerError: \n{}", e),
        }
    }
}

impl Error for TuiterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TuiterError::MongoError(e) => Some(e),
            TuiterError::BsonSerError(e) => Some(e),
            TuiterError::BsonDeError(e) => Some(e),
            TuiterError::Unauthenticated => None,
            TuiterError::Unauthorized(_) => None,
            TuiterError::Forbidden(_) => None,
            TuiterError::NotFound(_) => None,
            TuiterError::Conflict(_) => None,
            TuiterError::PollClosed => None,
            TuiterError::ValidationError(_) => None,
            TuiterError::ClientSessionError(_) => None,
            TuiterError::InternalServerError(_) => None,
        }
    }
}

impl ResponseError for TuiterError {
    fn error_response(&self) -> HttpResponse {
        match self {
            TuiterError::Unauthenticated => HttpResponse::Unauthorized().json(json!({
                "status": 401,
                "message": "You must be logged in to perform this action!"
            })),
            TuiterError::Unauthorized(e) => HttpResponse::Unauthorized().json(json!({
                "status": 401,
                "message": e
            })),
            TuiterError::Forbidden(e) => HttpResponse::Forbidden().json(json!({
                "status": 403,
                "message": e
            })),
            TuiterError::NotFound(e) => HttpResponse::NotFound().json(json!({
                "status": 404,
                "message": e
            })),
            TuiterError::Conflict(e) => HttpResponse::Conflict().json(json!({
                "status": 409,
                "message": e
            })),
            TuiterError::PollClosed => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": "Poll is closed"
            })),
            TuiterError::ValidationError((field, message)) => HttpResponse::BadRequest().json(json!({
                "status": 400,
                "message": {field: message}
            })),
            _ => {
                error!("{}", self.to_string().red());

                HttpResponse::InternalServerError().json(json!({
                    "status": 500,
                    "message": "Something went wrong"
                }))
            }
        }
    }
}

impl From<mongodb::error::Error> for TuiterError {
    fn from(e: mongodb::error::Error) -> Self {
        if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = e.kind.as_ref() {
            if write_error.code == DUPLICATE_KEY_CODE {
                return TuiterError::Conflict(write_error.message.clone());
            }
        }

        TuiterError::MongoError(e)
    }
}

impl From<bson::ser::Error> for TuiterError {
    fn from(e: bson::ser::Error) -> Self {
        TuiterError::BsonSerError(e)
    }
}

impl From<bson::de::Error> for TuiterError {
    fn from(e: bson::de::Error) -> Self {
        TuiterError::BsonDeError(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let cases = [
            (TuiterError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (TuiterError::Unauthorized("Invalid password"), StatusCode::UNAUTHORIZED),
            (TuiterError::Forbidden("creator only".to_string()), StatusCode::FORBIDDEN),
            (TuiterError::NotFound("tuit".to_string()), StatusCode::NOT_FOUND),
            (TuiterError::Conflict("dup".to_string()), StatusCode::CONFLICT),
            (TuiterError::PollClosed, StatusCode::BAD_REQUEST),
            (
                TuiterError::ValidationError(("tuit".to_string(), "is empty".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                TuiterError::InternalServerError("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.error_response().status(), status, "{}", error);
        }
    }
}

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use order_fulfillment_engine::traits::{FulfillmentError, OrderQueryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Client errors carry a human-readable `message`; unexpected faults an `error`, per the storefront contract.
        let body = if self.status_code().is_client_error() {
            serde_json::json!({ "success": false, "message": self.to_string() })
        } else {
            serde_json::json!({ "success": false, "error": self.to_string() })
        };
        HttpResponse::build(self.status_code()).insert_header(ContentType::json()).body(body.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing or malformed authorization header.")]
    MissingBearerToken,
    #[error("Bearer token is invalid or expired. {0}")]
    ValidationError(String),
    #[error("No token verification key is configured.")]
    NotConfigured,
}

impl From<FulfillmentError> for ServerError {
    fn from(e: FulfillmentError) -> Self {
        match e {
            FulfillmentError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            FulfillmentError::OrderNotFound(_) => Self::NoRecordFound("Order not found or unauthorized".to_string()),
            FulfillmentError::OrderNotOwned => {
                Self::InsufficientPermissions("Unauthorized - order does not belong to your store".to_string())
            },
            FulfillmentError::QueryError(OrderQueryError::DatabaseError(e)) => {
                Self::BackendError(format!("Database error: {e}"))
            },
            FulfillmentError::QueryError(e @ OrderQueryError::EmptyQuery) => Self::ValidationError(e.to_string()),
            e @ (FulfillmentError::ProductNotFound(_)
            | FulfillmentError::MixedStoreItems
            | FulfillmentError::InvalidOrder(_)
            | FulfillmentError::OrderModificationNoOp
            | FulfillmentError::StatusTransitionForbidden { .. }) => Self::ValidationError(e.to_string()),
        }
    }
}

impl From<OrderQueryError> for ServerError {
    fn from(e: OrderQueryError) -> Self {
        match e {
            OrderQueryError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
            e @ OrderQueryError::EmptyQuery => Self::ValidationError(e.to_string()),
        }
    }
}

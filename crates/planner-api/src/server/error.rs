#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
struct HttpApiError {
    status: StatusCode,
    error: ApiError,
}

impl HttpApiError {
    fn invalid_body(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::invalid_request(
                "request body is not a valid simulation request",
                Some(rejection.body_text()),
            ),
        }
    }

    fn invalid_query(rejection: QueryRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::invalid_request(
                "query string is invalid",
                Some(rejection.body_text()),
            ),
        }
    }
}

impl From<ApiError> for HttpApiError {
    fn from(error: ApiError) -> Self {
        let status = match error.error_code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
            ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        Self { status, error }
    }
}

impl IntoResponse for HttpApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

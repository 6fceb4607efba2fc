use lambda_http::{http, Body, Response};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("request answered with status {}", .0.status())]
    HttpError(Response<Body>),
    #[error("{0}")]
    LambdaError(lambda_http::Error),
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Error::LambdaError(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::LambdaError(Box::new(err))
    }
}

pub mod endpoint;
pub mod errors;

use lambda_http::http::StatusCode;
use lambda_http::{Body, Error as LambdaError, Request as LambdaRequest, Response as LambdaResponse};
use serde::Serialize;
use tracing::{error, info};

use self::endpoint::{InferenceEndpoint, JSON_CONTENT_TYPE};
use self::errors::Error;

const EMPTY_PAYLOAD_ERROR: &str = "Request payload is empty";
const BINARY_PAYLOAD_ERROR: &str = "Request payload is not valid UTF-8 text";

/// Body expected by the model server: one input string per instance.
#[derive(Debug, Serialize)]
struct EndpointRequest<'a> {
    instances: [&'a str; 1],
}

fn text_response(status: StatusCode, message: impl Into<String>) -> Result<LambdaResponse<Body>, Error> {
    let response = LambdaResponse::builder()
        .status(status)
        .header("content-type", "text/plain")
        .body(Body::from(message.into()))?;

    Ok(response)
}

fn extract_text(request: &LambdaRequest) -> Result<&str, Error> {
    let text = match request.body() {
        Body::Empty => "",
        Body::Text(text) => text.as_str(),
        Body::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                return Err(Error::HttpError(text_response(
                    StatusCode::BAD_REQUEST,
                    BINARY_PAYLOAD_ERROR,
                )?))
            }
        },
    };

    if text.is_empty() {
        return Err(Error::HttpError(text_response(
            StatusCode::BAD_REQUEST,
            EMPTY_PAYLOAD_ERROR,
        )?));
    }

    Ok(text)
}

#[tracing::instrument(skip_all, fields(endpoint = endpoint.name()))]
pub async fn process_request<E>(
    request: LambdaRequest,
    endpoint: &E,
) -> Result<LambdaResponse<Body>, Error>
where
    E: InferenceEndpoint + ?Sized,
{
    let text = extract_text(&request)?;
    info!("Invoking endpoint {} with body: {}", endpoint.name(), text);

    let payload = serde_json::to_vec(&EndpointRequest { instances: [text] })?;
    let prediction = match endpoint.invoke(payload).await {
        Ok(val) => val,
        Err(err) => {
            error!("Endpoint invocation failed: {}", err);
            return Err(Error::HttpError(text_response(
                StatusCode::BAD_GATEWAY,
                err.to_string(),
            )?));
        }
    };

    let content_type = prediction
        .content_type
        .unwrap_or_else(|| JSON_CONTENT_TYPE.to_owned());
    let body = match String::from_utf8(prediction.body) {
        Ok(text) => Body::Text(text),
        Err(err) => Body::Binary(err.into_bytes()),
    };

    let response = LambdaResponse::builder()
        .status(StatusCode::OK)
        .header("content-type", content_type)
        .body(body)?;

    Ok(response)
}

/// Runs one request, turning prepared HTTP errors into ordinary responses.
pub async fn handle<E>(
    request: LambdaRequest,
    endpoint: &E,
) -> Result<LambdaResponse<Body>, LambdaError>
where
    E: InferenceEndpoint + ?Sized,
{
    match process_request(request, endpoint).await {
        Ok(val) => Ok(val),
        Err(Error::HttpError(val)) => Ok(val),
        Err(Error::LambdaError(err)) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use lambda_http::http;

    use super::endpoint::{InvokeError, Prediction};
    use super::*;

    struct FakeEndpoint {
        answer: fn() -> Result<Prediction, InvokeError>,
        payloads: Mutex<Vec<Vec<u8>>>,
    }

    impl FakeEndpoint {
        fn new(answer: fn() -> Result<Prediction, InvokeError>) -> Self {
            Self {
                answer,
                payloads: Mutex::new(Vec::new()),
            }
        }

        fn payloads(&self) -> Vec<serde_json::Value> {
            self.payloads
                .lock()
                .unwrap()
                .iter()
                .map(|payload| serde_json::from_slice(payload).unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl InferenceEndpoint for FakeEndpoint {
        fn name(&self) -> &str {
            "sentiment-endpoint"
        }

        async fn invoke(&self, payload: Vec<u8>) -> Result<Prediction, InvokeError> {
            self.payloads.lock().unwrap().push(payload);
            (self.answer)()
        }
    }

    fn positive() -> Result<Prediction, InvokeError> {
        Ok(Prediction {
            content_type: Some("application/jsonlines".into()),
            body: br#"[{"label":["__label__positive"],"prob":[0.97]}]"#.to_vec(),
        })
    }

    fn request(body: Body) -> LambdaRequest {
        http::Request::builder()
            .method("POST")
            .uri("/predict")
            .body(body)
            .unwrap()
    }

    fn body_text(response: &LambdaResponse<Body>) -> &str {
        std::str::from_utf8(response.body().as_ref()).unwrap()
    }

    #[tokio::test]
    async fn wraps_body_as_single_instance_and_relays_prediction() {
        let endpoint = FakeEndpoint::new(positive);

        let response = handle(request(Body::from("what a great movie")), &endpoint)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "application/jsonlines"
        );
        assert_eq!(
            body_text(&response),
            r#"[{"label":["__label__positive"],"prob":[0.97]}]"#
        );
        assert_eq!(
            endpoint.payloads(),
            vec![serde_json::json!({ "instances": ["what a great movie"] })]
        );
    }

    #[tokio::test]
    async fn defaults_to_json_content_type() {
        let endpoint = FakeEndpoint::new(|| {
            Ok(Prediction {
                content_type: None,
                body: b"{}".to_vec(),
            })
        });

        let response = handle(request(Body::from("meh")), &endpoint).await.unwrap();

        assert_eq!(response.headers()["content-type"], JSON_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn empty_body_is_rejected_without_invoking() {
        let endpoint = FakeEndpoint::new(positive);

        let response = handle(request(Body::Empty), &endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(&response), EMPTY_PAYLOAD_ERROR);
        assert!(endpoint.payloads().is_empty());
    }

    #[tokio::test]
    async fn non_utf8_body_is_rejected() {
        let endpoint = FakeEndpoint::new(positive);

        let response = handle(request(Body::Binary(vec![0xff, 0xfe, 0x00])), &endpoint)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(&response), BINARY_PAYLOAD_ERROR);
        assert!(endpoint.payloads().is_empty());
    }

    #[tokio::test]
    async fn model_error_maps_to_bad_gateway() {
        let endpoint = FakeEndpoint::new(|| {
            Err(InvokeError::Model {
                status: 500,
                message: "model crashed".into(),
            })
        });

        let response = handle(request(Body::from("text")), &endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            body_text(&response),
            "model returned status 500: model crashed"
        );
    }

    #[tokio::test]
    async fn unavailable_endpoint_maps_to_bad_gateway() {
        let endpoint =
            FakeEndpoint::new(|| Err(InvokeError::Service("endpoint not found".into())));

        let response = handle(request(Body::from("text")), &endpoint).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(&response), "endpoint not found");
    }
}

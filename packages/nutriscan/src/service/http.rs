use super::{InferenceTransport, RawResponse, ServiceRequest, DOCUMENT_FIELD};
use crate::config::ServiceConfig;
use crate::error::{ConfigError, Error, TransportError};
use crate::log::TRANSPORT;
use crate::VERSION;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: ServiceConfig,
    client: Client,
}

impl HttpTransport {
    ///
    /// The overall request deadline is enforced by the submission client,
    /// only the connect phase is bounded here.
    ///
    pub fn init(config: &ServiceConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .user_agent(format!("nutriscan/{VERSION}"))
            .build()
            .map_err(ConfigError::from)?;

        Ok(HttpTransport {
            config: config.clone(),
            client,
        })
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    fn endpoint(&self, path: &str) -> String {
        self.config.endpoint(path)
    }

    async fn send(&self, request: ServiceRequest) -> Result<RawResponse, TransportError> {
        let url = self.endpoint(request.path());

        let builder = match request {
            ServiceRequest::Predict(body) => {
                debug!(target: TRANSPORT, msg = "POST json", url, ?body);
                self.client.post(&url).json(&body)
            }
            ServiceRequest::UploadReport(document) | ServiceRequest::PredictWeekly(document) => {
                debug!(
                    target: TRANSPORT,
                    msg = "POST multipart",
                    url,
                    file_name = document.file_name,
                    bytes = document.len()
                );
                let part = Part::bytes(document.content.to_vec()).file_name(document.file_name);
                self.client
                    .post(&url)
                    .multipart(Form::new().part(DOCUMENT_FIELD, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|err| transport_error(&url, &err))?;

        let status = response.status().as_u16();

        let body = response
            .bytes()
            .await
            .map_err(|err| transport_error(&url, &err))?;

        debug!(target: TRANSPORT, msg = "Response received", url, status, bytes = body.len());

        Ok(RawResponse { status, body })
    }
}

///
/// reqwest wraps the interesting cause (refused, dns, reset) a few levels down
///
fn transport_error(url: &str, err: &reqwest::Error) -> TransportError {
    let mut reason = if err.is_connect() {
        "connection failed".to_string()
    } else if err.is_timeout() {
        "timed out".to_string()
    } else {
        "request failed".to_string()
    };

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }

    TransportError {
        endpoint: url.to_string(),
        reason,
    }
}

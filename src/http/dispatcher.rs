use reqwest::Method;
use tracing::{debug, warn};

use crate::{NotiflowError, Result};

use super::models::*;

/// Issues exactly one HTTP call per `send`. No retries.
#[derive(Clone, Default)]
pub struct Dispatcher {
    client: reqwest::Client,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `request` and classify the outcome.
    ///
    /// * 2xx: `Ok` with the decoded body; a body that is not JSON is kept raw.
    /// * other status: [`NotiflowError::Http`] with the status and body verbatim.
    /// * no response: [`NotiflowError::Transport`].
    /// * request could not be built: [`NotiflowError::Configuration`].
    pub async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        let mut builder = self.client.request(Method::POST, &request.url).headers(request.headers);
        builder = match &request.body {
            RequestBody::Json(json) => builder.body(serde_json::to_vec(json)?),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        debug!("sending POST {}", request.url);
        let res = builder.send().await.map_err(classify_send_error)?;

        let status = res.status();
        let text = res.text().await.map_err(|err| NotiflowError::Transport(format!("failed to read response body: {}", err)))?;
        let body = ResponseBody::parse(text);

        if !status.is_success() {
            warn!("POST {} answered with status {}", request.url, status.as_u16());
            return Err(NotiflowError::Http {
                status: status.as_u16(),
                body: body.into_value(),
            });
        }

        if let ResponseBody::Raw(raw) = &body {
            warn!("response from {} is not JSON, forwarding it raw: {}", request.url, raw);
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn classify_send_error(err: reqwest::Error) -> NotiflowError {
    if err.is_builder() {
        NotiflowError::Configuration(format!("invalid request: {}", err))
    } else {
        NotiflowError::Transport(format!("no response received from server: {}", err))
    }
}

//! HTTP signaling: the one-shot offer/answer exchange with the remote host.
//!
//! ```text
//! POST http://{host}/offer
//! {"password": "...", "offer": base64(local description)}
//!
//! 200 OK        {"Offer": base64(answer description)}
//! anything else  body text is the error message
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::transport::{HandshakeAnswer, HandshakeError, HandshakeRequest, Signaler};

#[derive(Debug, Serialize)]
struct OfferBody<'a> {
    password: &'a str,
    offer: String,
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    #[serde(rename = "Offer")]
    offer: String,
}

/// Talks to the remote host's `/offer` endpoint.
#[derive(Debug, Clone)]
pub struct HttpSignaler {
    offer_url: String,
    http: reqwest::Client,
}

impl HttpSignaler {
    /// `host` is `name[:port]`, without a scheme.
    pub fn new(host: &str) -> Self {
        Self {
            offer_url: format!("http://{host}/offer"),
            http: reqwest::Client::new(),
        }
    }

    pub fn offer_url(&self) -> &str {
        &self.offer_url
    }
}

/// Decodes the body of a successful `/offer` response.
fn decode_answer(body: &str) -> Result<HandshakeAnswer, HandshakeError> {
    let body: AnswerBody =
        serde_json::from_str(body).map_err(|e| HandshakeError::Malformed(e.to_string()))?;
    let bytes = BASE64_STANDARD
        .decode(body.offer.trim())
        .map_err(|e| HandshakeError::Malformed(format!("answer is not base64: {e}")))?;
    let description = String::from_utf8(bytes)
        .map_err(|e| HandshakeError::Malformed(format!("answer is not UTF-8: {e}")))?;
    Ok(HandshakeAnswer { description })
}

#[async_trait]
impl Signaler for HttpSignaler {
    async fn exchange(&self, request: HandshakeRequest) -> Result<HandshakeAnswer, HandshakeError> {
        let body = OfferBody {
            password: &request.password,
            offer: BASE64_STANDARD.encode(request.offer.as_bytes()),
        };
        debug!(url = %self.offer_url, "sending offer");

        let response = self
            .http
            .post(&self.offer_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HandshakeError::Request(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HandshakeError::Request(e.to_string()))?;

        if status != StatusCode::OK {
            debug!(%status, "offer rejected");
            return Err(HandshakeError::Rejected(text));
        }
        decode_answer(&text)
    }
}

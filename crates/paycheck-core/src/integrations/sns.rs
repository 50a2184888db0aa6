//! Amazon SNS publisher -- sends the summary to a topic via the Query API.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

use crate::config::SnsSettings;
use crate::error::{ConfigError, PublishError};
use crate::integrations::aws_auth::{resolve_credentials, RequestToSign, SigV4Signer};
use crate::integrations::traits::MessagePublisher;

const SERVICE: &str = "sns";
const API_VERSION: &str = "2010-03-31";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

pub struct SnsPublisher {
    settings: SnsSettings,
    endpoint: Url,
    http_client: Client,
}

impl SnsPublisher {
    /// # Errors
    ///
    /// Returns an error if no usable endpoint can be derived from the region.
    pub fn new(settings: SnsSettings) -> Result<Self, ConfigError> {
        let endpoint = match &settings.endpoint {
            Some(url) => url.clone(),
            None => {
                let raw = format!("https://sns.{}.amazonaws.com/", settings.region);
                Url::parse(&raw).map_err(|e| ConfigError::InvalidValue {
                    key: "AWS_REGION".into(),
                    message: format!("cannot build SNS endpoint '{raw}': {e}"),
                })?
            }
        };

        Ok(Self {
            settings,
            endpoint,
            http_client: Client::new(),
        })
    }

    fn host(&self) -> String {
        let host = self.endpoint.host_str().unwrap_or_default();
        match self.endpoint.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }
}

fn form_encode(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Pull `<MessageId>` out of a `PublishResponse` document.
///
/// `PublishResponse` carries exactly one unprefixed `MessageId` element with
/// text content only, so a plain scan finds it; CDATA and namespaced tags are
/// not handled. The predefined entities are decoded.
fn extract_message_id(xml: &str) -> Option<String> {
    let start = xml.find("<MessageId>")? + "<MessageId>".len();
    let len = xml[start..].find("</MessageId>")?;
    let id = unescape_xml(xml[start..start + len].trim());
    (!id.is_empty()).then_some(id)
}

fn unescape_xml(text: &str) -> String {
    // `&amp;` last so `&amp;lt;` stays `&lt;`
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl MessagePublisher for SnsPublisher {
    async fn publish(&self, message: &str, destination: &str) -> Result<String, PublishError> {
        let credentials = resolve_credentials(&self.settings.credentials)?;

        let body = form_encode(&[
            ("Action", "Publish"),
            ("Message", message),
            ("TopicArn", destination),
            ("Version", API_VERSION),
        ]);

        let host = self.host();
        let signed = SigV4Signer::new(&credentials, &self.settings.region, SERVICE).sign(
            &RequestToSign {
                method: "POST",
                host: &host,
                path: self.endpoint.path(),
                query: "",
                content_type: FORM_CONTENT_TYPE,
                body: body.as_bytes(),
            },
            Utc::now(),
        );

        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header("x-amz-date", &signed.amz_date)
            .header(AUTHORIZATION, &signed.authorization);
        if let Some(token) = &signed.security_token {
            request = request.header("x-amz-security-token", token);
        }

        let resp = request.body(body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PublishError::Status { status, body });
        }

        let text = resp.text().await?;
        extract_message_id(&text).ok_or(PublishError::MissingMessageId)
    }
}

//! AWS credential resolution and Signature Version 4 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::{AwsCredentials, CredentialSource};
use crate::error::PublishError;
use crate::integrations::aws_profile::ProfileFiles;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Turn the configured source into concrete keys.
///
/// # Errors
///
/// Returns [`PublishError::Credentials`] when neither the environment nor the
/// shared credentials file provides a key pair.
pub fn resolve_credentials(source: &CredentialSource) -> Result<AwsCredentials, PublishError> {
    match source {
        CredentialSource::Static(creds) => Ok(creds.clone()),
        CredentialSource::Environment => credentials_from_lookup(|key| std::env::var(key).ok()),
    }
}

/// Ambient credential chain: the standard `AWS_ACCESS_KEY_ID` /
/// `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN` variables first, then the
/// active profile of the shared credentials file.
pub fn credentials_from_lookup<F>(lookup: F) -> Result<AwsCredentials, PublishError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let env_problem = match (get("AWS_ACCESS_KEY_ID"), get("AWS_SECRET_ACCESS_KEY")) {
        (Some(access_key_id), Some(secret_access_key)) => {
            return Ok(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: get("AWS_SESSION_TOKEN"),
            });
        }
        (None, _) => "AWS_ACCESS_KEY_ID is not set",
        (Some(_), None) => "AWS_SECRET_ACCESS_KEY is not set",
    };

    let files = ProfileFiles::from_lookup(get);
    let section = files
        .credentials_section()
        .map_err(|e| PublishError::Credentials(format!("{env_problem}; {e}")))?;
    let field = |key: &str| section.get(key).filter(|v| !v.is_empty()).cloned();

    match (field("aws_access_key_id"), field("aws_secret_access_key")) {
        (Some(access_key_id), Some(secret_access_key)) => {
            tracing::debug!(profile = files.profile(), "using shared credentials file");
            Ok(AwsCredentials {
                access_key_id,
                secret_access_key,
                session_token: field("aws_session_token"),
            })
        }
        _ => Err(PublishError::Credentials(format!(
            "{env_problem}; profile '{}' has no aws_access_key_id/aws_secret_access_key",
            files.profile()
        ))),
    }
}

/// The parts of an HTTP request covered by the signature.
#[derive(Debug, Clone, Copy)]
pub struct RequestToSign<'a> {
    pub method: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    /// Already in canonical (sorted, encoded) form; empty when absent.
    pub query: &'a str,
    pub content_type: &'a str,
    pub body: &'a [u8],
}

/// Headers to attach to the signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
    pub security_token: Option<String>,
}

pub struct SigV4Signer<'a> {
    credentials: &'a AwsCredentials,
    region: &'a str,
    service: &'a str,
}

impl<'a> SigV4Signer<'a> {
    pub fn new(credentials: &'a AwsCredentials, region: &'a str, service: &'a str) -> Self {
        Self {
            credentials,
            region,
            service,
        }
    }

    pub fn sign(&self, request: &RequestToSign<'_>, at: DateTime<Utc>) -> SignedHeaders {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date = at.format("%Y%m%d").to_string();
        let scope = format!("{date}/{}/{}/aws4_request", self.region, self.service);

        let mut headers = vec![
            ("content-type", request.content_type.to_string()),
            ("host", request.host.to_string()),
            ("x-amz-date", amz_date.clone()),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token", token.clone()));
        }

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{}\n", value.trim()))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            request.method,
            request.path,
            request.query,
            canonical_headers,
            signed_headers,
            sha256_hex(request.body),
        );

        let string_to_sign = format!(
            "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
            sha256_hex(canonical_request.as_bytes())
        );

        let key = self.signing_key(&date);
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes()));

        SignedHeaders {
            authorization: format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                self.credentials.access_key_id
            ),
            amz_date,
            security_token: self.credentials.session_token.clone(),
        }
    }

    fn signing_key(&self, date: &str) -> Vec<u8> {
        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac(secret.as_bytes(), date.as_bytes());
        let k_region = hmac(&k_date, self.region.as_bytes());
        let k_service = hmac(&k_region, self.service.as_bytes());
        hmac(&k_service, b"aws4_request")
    }
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take keys of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

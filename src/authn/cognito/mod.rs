pub mod config;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{CredentialVerifier, Verdict};
use config::CognitoConfig;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

/// Cognito errors that mean "wrong credentials" rather than a broken call.
const REJECTIONS: &[&str] = &[
    "NotAuthorizedException",
    "UserNotFoundException",
    "UserNotConfirmedException",
    "PasswordResetRequiredException",
    "CodeMismatchException",
    "ExpiredCodeException",
];

/// Provider parameters read from the identity provider record.
#[derive(Debug, Deserialize)]
struct CognitoParams {
    cognito_client_id: String,
    cognito_user_pool_region: String,

    #[serde(default = "default_mfa")]
    mfa: bool,

    #[serde(default = "default_mfa_token_length")]
    mfa_token_length: usize,
}

/// Verifies passwords through the Cognito user pool app client named by the
/// provider record, using the `USER_PASSWORD_AUTH` flow.
pub struct CognitoVerifier {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    authentication_result: Option<Value>,
    challenge_name: Option<String>,
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

enum CallResult {
    Ok(InitiateAuthResponse),
    Rejected(String),
}

impl CognitoVerifier {
    pub fn new(cfg: &CognitoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build cognito http client")?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
        })
    }

    fn endpoint(&self, region: &str) -> String {
        if !self.endpoint.is_empty() {
            return self.endpoint.clone();
        }
        format!("https://cognito-idp.{region}.amazonaws.com/")
    }

    async fn call(&self, region: &str, action: &str, body: Value) -> Result<CallResult> {
        let url = self.endpoint(region);
        debug!("Cognito {action} request to {url}");
        let resp = self
            .client
            .post(&url)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .header("Content-Type", CONTENT_TYPE)
            .body(serde_json::to_vec(&body)?)
            .send()
            .await
            .with_context(|| format!("send cognito {action} request"))?;

        let status = resp.status();
        let data = resp
            .bytes()
            .await
            .with_context(|| format!("read cognito {action} response"))?;

        if status == StatusCode::OK {
            let resp: InitiateAuthResponse = serde_json::from_slice(&data)
                .with_context(|| format!("decode cognito {action} response"))?;
            return Ok(CallResult::Ok(resp));
        }

        let err: ErrorResponse = serde_json::from_slice(&data).unwrap_or(ErrorResponse {
            kind: None,
            message: None,
        });
        // `__type` may be namespaced, e.g. `com.amazon...#NotAuthorizedException`
        let kind = err
            .kind
            .as_deref()
            .map(|k| k.rsplit('#').next().unwrap_or(k))
            .unwrap_or("")
            .to_string();
        let message = err.message.unwrap_or_default();

        if REJECTIONS.contains(&kind.as_str()) {
            return Ok(CallResult::Rejected(format!("{kind}: {message}")));
        }
        bail!("cognito {action} failed with status {status}: {kind} {message}");
    }
}

#[async_trait]
impl CredentialVerifier for CognitoVerifier {
    async fn verify(
        &self,
        username: &str,
        secret: &str,
        params: &Map<String, Value>,
    ) -> Result<Verdict> {
        let params: CognitoParams = serde_json::from_value(Value::Object(params.clone()))
            .context("parse cognito module_config")?;

        let (password, code) = if params.mfa {
            match split_mfa(secret, params.mfa_token_length) {
                Some((password, code)) => (password, Some(code)),
                None => {
                    return Ok(Verdict::Rejected(String::from(
                        "password does not end with a valid MFA code",
                    )))
                }
            }
        } else {
            (secret, None)
        };

        let region = params.cognito_user_pool_region.as_str();
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": params.cognito_client_id,
            "AuthParameters": {
                "USERNAME": username,
                "PASSWORD": password,
            },
        });
        let resp = match self.call(region, "InitiateAuth", body).await? {
            CallResult::Ok(resp) => resp,
            CallResult::Rejected(reason) => return Ok(Verdict::Rejected(reason)),
        };

        if resp.authentication_result.is_some() {
            info!("Cognito authentication successful for user '{username}'");
            return Ok(Verdict::Accepted);
        }

        let challenge = resp.challenge_name.unwrap_or_default();
        let code_key = match challenge.as_str() {
            "SOFTWARE_TOKEN_MFA" => "SOFTWARE_TOKEN_MFA_CODE",
            "SMS_MFA" => "SMS_MFA_CODE",
            "" => bail!("cognito returned neither a result nor a challenge"),
            _ => {
                warn!("Unsupported cognito challenge {challenge} for user '{username}'");
                return Ok(Verdict::Rejected(format!("unsupported challenge {challenge}")));
            }
        };
        let code = match code {
            Some(code) => code,
            None => {
                return Ok(Verdict::Rejected(format!(
                    "{challenge} required but MFA is not enabled for this provider"
                )))
            }
        };

        let body = json!({
            "ChallengeName": challenge,
            "ClientId": params.cognito_client_id,
            "Session": resp.session.unwrap_or_default(),
            "ChallengeResponses": {
                "USERNAME": username,
                code_key: code,
            },
        });
        let resp = match self.call(region, "RespondToAuthChallenge", body).await? {
            CallResult::Ok(resp) => resp,
            CallResult::Rejected(reason) => return Ok(Verdict::Rejected(reason)),
        };

        if resp.authentication_result.is_some() {
            info!("Cognito MFA authentication successful for user '{username}'");
            return Ok(Verdict::Accepted);
        }
        Ok(Verdict::Rejected(String::from(
            "MFA challenge did not complete",
        )))
    }
}

/// Splits `<password><code>` where the code is the last `len` characters and
/// all digits.
fn split_mfa(secret: &str, len: usize) -> Option<(&str, &str)> {
    let count = secret.chars().count();
    if len == 0 || count <= len {
        return None;
    }
    let (idx, _) = secret.char_indices().nth(count - len)?;
    let (password, code) = secret.split_at(idx);
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((password, code))
}

fn default_mfa() -> bool {
    false
}

fn default_mfa_token_length() -> usize {
    6
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves canned responses, one connection per response, and keeps the
    /// `(X-Amz-Target, body)` of every request.
    async fn mock_cognito(responses: Vec<(u16, Value)>) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_server = seen.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let (target, req) = read_request(&mut socket).await;
                seen_server.lock().unwrap().push((target, req));

                let body = body.to_string();
                let resp = format!(
                    "HTTP/1.1 {status} Mock\r\nContent-Type: {CONTENT_TYPE}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(resp.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });

        (format!("http://{addr}/"), seen)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> (String, Value) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(pos) = text.find("\r\n\r\n") {
                let head = &text[..pos];
                let length = head
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + length {
                    let target = head
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("x-amz-target")
                                .then(|| v.trim().to_string())
                        })
                        .unwrap_or_default();
                    let body = serde_json::from_slice(&buf[pos + 4..pos + 4 + length]).unwrap();
                    return (target, body);
                }
            }
            if n == 0 {
                panic!("connection closed before full request");
            }
        }
    }

    fn verifier(endpoint: String) -> CognitoVerifier {
        let mut cfg = <CognitoConfig as crate::config::CommonConfig>::default();
        cfg.endpoint = endpoint;
        CognitoVerifier::new(&cfg).unwrap()
    }

    fn params(mfa: bool) -> Map<String, Value> {
        json!({
            "cognito_client_id": "client-1",
            "cognito_user_pool_region": "eu-west-1",
            "mfa": mfa,
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_split_mfa() {
        assert_eq!(split_mfa("secret123456", 6), Some(("secret", "123456")));
        assert_eq!(split_mfa("pässwörd0001", 4), Some(("pässwörd", "0001")));
        assert_eq!(split_mfa("123456", 6), None);
        assert_eq!(split_mfa("12345", 6), None);
        assert_eq!(split_mfa("secretabcdef", 6), None);
        assert_eq!(split_mfa("secret", 0), None);
    }

    #[test]
    fn test_default_endpoint() {
        let v = verifier(String::new());
        assert_eq!(
            v.endpoint("us-east-2"),
            "https://cognito-idp.us-east-2.amazonaws.com/"
        );
    }

    #[tokio::test]
    async fn test_password_accepted() {
        let (endpoint, seen) = mock_cognito(vec![(
            200,
            json!({"AuthenticationResult": {"AccessToken": "t"}}),
        )])
        .await;

        let verdict = verifier(endpoint)
            .verify("alice", "pw", &params(false))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Accepted);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].0, "AWSCognitoIdentityProviderService.InitiateAuth");
        assert_eq!(seen[0].1["ClientId"], "client-1");
        assert_eq!(seen[0].1["AuthFlow"], "USER_PASSWORD_AUTH");
        assert_eq!(seen[0].1["AuthParameters"]["USERNAME"], "alice");
        assert_eq!(seen[0].1["AuthParameters"]["PASSWORD"], "pw");
    }

    #[tokio::test]
    async fn test_password_rejected() {
        let (endpoint, _) = mock_cognito(vec![(
            400,
            json!({"__type": "NotAuthorizedException", "message": "Incorrect username or password."}),
        )])
        .await;

        let verdict = verifier(endpoint)
            .verify("alice", "bad", &params(false))
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::Rejected(reason) if reason.starts_with("NotAuthorizedException")));
    }

    #[tokio::test]
    async fn test_service_error() {
        let (endpoint, _) = mock_cognito(vec![(
            400,
            json!({"__type": "com.amazonaws#ResourceNotFoundException", "message": "no client"}),
        )])
        .await;

        let result = verifier(endpoint).verify("alice", "pw", &params(false)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mfa_challenge() {
        let (endpoint, seen) = mock_cognito(vec![
            (
                200,
                json!({"ChallengeName": "SOFTWARE_TOKEN_MFA", "Session": "sess-1"}),
            ),
            (200, json!({"AuthenticationResult": {"AccessToken": "t"}})),
        ])
        .await;

        let verdict = verifier(endpoint)
            .verify("alice", "pw654321", &params(true))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Accepted);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].1["AuthParameters"]["PASSWORD"], "pw");
        assert_eq!(
            seen[1].0,
            "AWSCognitoIdentityProviderService.RespondToAuthChallenge"
        );
        assert_eq!(seen[1].1["Session"], "sess-1");
        assert_eq!(
            seen[1].1["ChallengeResponses"]["SOFTWARE_TOKEN_MFA_CODE"],
            "654321"
        );
    }

    #[tokio::test]
    async fn test_mfa_code_missing() {
        let verdict = verifier(String::from("http://127.0.0.1:9/"))
            .verify("alice", "pw", &params(true))
            .await
            .unwrap();
        assert!(matches!(verdict, Verdict::Rejected(_)));
    }

    #[tokio::test]
    async fn test_invalid_params() {
        let result = verifier(String::new())
            .verify("alice", "pw", &Map::new())
            .await;
        assert!(result.is_err());
    }
}

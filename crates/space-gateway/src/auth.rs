use reqwest::Client;
use serde::Deserialize;

use crate::error::GatewayError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
}

/// Exchange credentials for a bearer token.
pub async fn fetch_token(
  client: &Client,
  auth_url: &str,
  username: &str,
  password: &str,
) -> Result<String, GatewayError> {
  let response = client
    .post(auth_url)
    .form(&[("username", username), ("password", password)])
    .send()
    .await?;

  let status = response.status();
  if !status.is_success() {
    let body = response.text().await.unwrap_or_default();
    return Err(GatewayError::Auth(format!("status {}: {}", status.as_u16(), body)));
  }

  let token: TokenResponse = response
    .json()
    .await
    .map_err(|e| GatewayError::Auth(format!("invalid token response: {}", e)))?;
  Ok(token.access_token)
}

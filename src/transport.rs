//! Outbound network seam for the completion service

use async_trait::async_trait;
use log::{debug, error, trace};

/// Raw HTTP outcome; status handling belongs to the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse
{   pub status: u16
  , pub body: String
}

impl TransportResponse
{   pub fn is_success(&self) -> bool
    {   (200..300).contains(&self.status)
    }
}

/// Sends one chat-completion POST and returns status and body
#[async_trait]
pub trait Transport: Send + Sync
{   async fn post_chat(
      &self
    , url: &str
    , api_key: &str
    , body: &crate::request::ChatCompletionRequest
    ) -> Result<TransportResponse, crate::error::Error>;
}

/// reqwest-backed transport with a request deadline
#[derive(Debug, Clone)]
pub struct HttpTransport
{   http_client: reqwest::Client
}

impl HttpTransport
{   pub fn new(config: &crate::config::GatewayConfig)
      -> Result<Self, crate::error::Error>
    {   debug!(
          "Creating HttpTransport with timeout {}s",
          config.timeout_secs
        );
        let http_client = reqwest::Client::builder()
          .timeout(config.timeout())
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        Ok(HttpTransport
        {   http_client
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> crate::error::Error
{   if e.is_timeout()
    {   error!("Request timed out: {}", e);
        crate::error::Error::Timeout
    } else
    {   error!("HTTP error: {}", e);
        crate::error::Error::HttpError(e.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport
{   async fn post_chat(
      &self
    , url: &str
    , api_key: &str
    , body: &crate::request::ChatCompletionRequest
    ) -> Result<TransportResponse, crate::error::Error>
    {   trace!("POST {} model={}", url, body.model);

        let response = self.http_client
          .post(url)
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .header("Accept", "application/json")
          .json(body)
          .send()
          .await
          .map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        trace!("Response status: {}", status);

        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse
        {   status
          , body
        })
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn success_range()
    {   let ok = TransportResponse { status: 204, body: String::new() };
        let redirect = TransportResponse { status: 302, body: String::new() };
        let server = TransportResponse { status: 500, body: String::new() };
        assert!(ok.is_success());
        assert!(!redirect.is_success());
        assert!(!server.is_success());
    }

    #[test]
    fn transport_builds_from_config()
    {   let config = crate::config::GatewayConfig::new("k");
        assert!(HttpTransport::new(&config).is_ok());
    }

    fn request_body() -> crate::request::ChatCompletionRequest
    {   crate::request::ChatCompletionRequest
        {   model: "m".to_string()
          , messages: vec![]
          , max_tokens: 1
          , temperature: 0.0
          , top_p: 1.0
          , stream: false
        }
    }

    #[tokio::test]
    async fn silent_server_times_out()
    {   let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
          .await
          .unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
          let mut held = Vec::new();
          loop
          {   match listener.accept().await
              {   Ok((socket, _)) => held.push(socket)
                , Err(_) => break
              }
          }
        });

        let mut config = crate::config::GatewayConfig::new("k");
        config.api_base = format!("http://{}/v1", addr);
        config.timeout_secs = 1;
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
          .post_chat(&config.completions_url(), "k", &request_body())
          .await
          .unwrap_err();
        assert_eq!(err, crate::error::Error::Timeout);
        assert!(err.is_gateway_error());
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error()
    {   let mut config = crate::config::GatewayConfig::new("k");
        config.api_base = "http://127.0.0.1:9".to_string();
        config.timeout_secs = 2;
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
          .post_chat(&config.completions_url(), "k", &request_body())
          .await
          .unwrap_err();
        assert!(err.is_gateway_error(), "{:?}", err);
    }
}

//! One request in, one completion out

use log::{debug, error, info, trace};

use crate::catalog::TemplateCatalog;
use crate::config::GatewayConfig;
use crate::error::Error;
use crate::request::{
  ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
  CompletionRequest, CompletionResult, Role,
};
use crate::transport::{HttpTransport, Transport};

/// Translates a validated request into one outbound call.
///
/// Holds no mutable state: concurrent `run` calls proceed
/// independently, and identical requests issue identical calls.
/// Retries, if wanted, are the caller's business.
pub struct CompletionGateway<T = HttpTransport>
{   config: GatewayConfig
  , catalog: TemplateCatalog
  , transport: T
}

impl CompletionGateway<HttpTransport>
{   /// Gateway over the real HTTP transport
    pub fn from_config(config: GatewayConfig)
      -> Result<Self, Error>
    {   let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> CompletionGateway<T>
{   pub fn with_transport(config: GatewayConfig, transport: T)
      -> Result<Self, Error>
    {   config.validate()?;
        let catalog = TemplateCatalog::builtin();
        catalog.validate()?;
        info!(
          "CompletionGateway ready: model={} endpoint={}",
          config.model,
          config.completions_url()
        );
        Ok(CompletionGateway
        {   config
          , catalog
          , transport
        })
    }

    pub fn config(&self) -> &GatewayConfig
    {   &self.config
    }

    pub fn catalog(&self) -> &TemplateCatalog
    {   &self.catalog
    }

    /// Validate and assemble the wire request without sending it
    pub fn build_request(&self, request: &CompletionRequest)
      -> Result<ChatCompletionRequest, Error>
    {   request.validate()?;
        let spec = self.catalog.spec_for(request.mode)?;
        Ok(ChatCompletionRequest
        {   model: self.config.model.clone()
          , messages: vec![
              ChatMessage
              {   role: Role::System
                , content: spec.instruction.to_string()
              }
            , ChatMessage
              {   role: Role::User
                , content: request.user_text.clone()
              }
            ]
          , max_tokens: spec.max_output_tokens
          , temperature: spec.temperature
          , top_p: spec.top_p
          , stream: false
        })
    }

    pub async fn run(&self, request: &CompletionRequest)
      -> CompletionResult
    {   let body = self.build_request(request)?;
        debug!(
          "Sending {} request ({} chars) to {}",
          request.mode,
          request.user_text.chars().count(),
          self.config.model
        );

        let response = self.transport
          .post_chat(
            &self.config.completions_url(),
            &self.config.api_key,
            &body
          )
          .await?;

        if !response.is_success()
        {   error!(
              "Completion service returned status {}",
              response.status
            );
            return Err(Error::ApiError
            {   status: response.status
              , body: response.body
            });
        }

        trace!("Response body: {} bytes", response.body.len());
        extract_content(&response.body)
    }
}

/// Pull the first choice's content out of a response body
pub fn extract_content(body: &str) -> CompletionResult
{   let parsed: ChatCompletionResponse = serde_json::from_str(body)
      .map_err(|e| {
        error!("Parse error: {}", e);
        Error::ParseError(e.to_string())
      })?;

    let choice = parsed.choices
      .into_iter()
      .next()
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse
      })?;

    choice.message.content.ok_or_else(|| {
      error!("First choice has no message content");
      Error::ParseError("choice has no message content".to_string())
    })
}

//! Request/result types and the chat-completion wire format

use serde::{Deserialize, Serialize};

/// One transformation invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest
{   pub mode: crate::catalog::Mode
  , /// Sent verbatim, never trimmed
    pub user_text: String
}

impl CompletionRequest
{   pub fn new(
      mode: crate::catalog::Mode
    , user_text: impl Into<String>
    ) -> Self
    {   CompletionRequest
        {   mode
          , user_text: user_text.into()
        }
    }

    /// Reject empty or whitespace-only text
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.user_text.trim().is_empty()
        {   return Err(crate::error::Error::EmptyInput);
        }
        Ok(())
    }
}

/// Output text on success, never both
pub type CompletionResult = Result<String, crate::error::Error>;

// ===== Wire Types =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: u32
  , pub temperature: f32
  , pub top_p: f32
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::catalog::Mode;

    #[test]
    fn whitespace_only_text_is_rejected()
    {   for text in ["", "   ", "\n\t "]
        {   let req = CompletionRequest::new(Mode::MetaPrompt, text);
            assert_eq!(req.validate(), Err(crate::error::Error::EmptyInput));
        }
        assert!(CompletionRequest::new(Mode::MetaPrompt, " hi ")
          .validate()
          .is_ok());
    }

    #[test]
    fn request_serializes_lowercase_roles()
    {   let body = ChatCompletionRequest
        {   model: "m".to_string()
          , messages: vec![
              ChatMessage { role: Role::System, content: "s".to_string() }
            , ChatMessage { role: Role::User, content: "u".to_string() }
            ]
          , max_tokens: 16
          , temperature: 0.5
          , top_p: 1.0
          , stream: false
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 16);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn response_tolerates_extra_fields_and_null_content()
    {   let raw = r#"{
          "id": "cmpl-1",
          "object": "chat.completion",
          "choices": [
            {"index": 0, "message": {"role": "assistant", "content": null},
             "finish_reason": "stop"}
          ],
          "usage": {"total_tokens": 3}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices.len(), 1);
        assert!(parsed.choices[0].message.content.is_none());
    }
}

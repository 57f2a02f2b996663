use std::fmt;

/// Coarse failure classes surfaced to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   /// No call made, user must supply text
    EmptyInput
  , /// Mode name outside the closed set
    UnknownMode
  , /// Network, transport or parsing failure talking to the service
    GatewayError
  , /// Missing credential or bad configuration value
    Configuration
  , /// Local file I/O (saving output)
    Io
}

/// Error type for promptopt operations
/// Implements Clone so results can be handed around freely
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Input text was empty or whitespace only
    EmptyInput
  , /// Mode name not in the catalog
    UnknownMode(String)
  , /// API key is missing
    MissingApiKey(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned a non-success status
    ApiError
    {   status: u16
      , body: String
    }
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Timeout error
    Timeout
  , /// Local I/O error
    Io(String)
}

impl Error
{   /// Map onto the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::EmptyInput => ErrorKind::EmptyInput
          , Error::UnknownMode(_) => ErrorKind::UnknownMode
          , Error::MissingApiKey(_)
          | Error::InvalidConfiguration(_) => ErrorKind::Configuration
          , Error::HttpError(_)
          | Error::ApiError { .. }
          | Error::ParseError(_)
          | Error::NoChoicesInResponse
          | Error::Timeout => ErrorKind::GatewayError
          , Error::Io(_) => ErrorKind::Io
        }
    }

    /// Displayable message for the UI
    pub fn detail(&self) -> String
    {   self.to_string()
    }

    pub fn is_gateway_error(&self) -> bool
    {   self.kind() == ErrorKind::GatewayError
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::EmptyInput => {
              write!(f, "Input text is empty")
            }
          , Error::UnknownMode(name) => {
              write!(f, "Unknown mode: {}", name)
            }
          , Error::MissingApiKey(source) => {
              write!(f, "Missing API key: {}", source)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError { status, body } => {
              let body = if body.trim().is_empty()
                { "<empty body>" }
                else
                { body.as_str() };
              write!(f, "API error (status {}): {}", status, body)
            }
          , Error::ParseError(msg) => {
              write!(f, "Malformed response: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f,
                "Malformed response: API response contained no choices"
              )
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn transport_failures_fold_into_gateway_error()
    {   let errors = vec![
          Error::HttpError("connection refused".to_string())
        , Error::ApiError { status: 500, body: String::new() }
        , Error::ParseError("eof".to_string())
        , Error::NoChoicesInResponse
        , Error::Timeout
        ];
        for e in errors
        {   assert_eq!(e.kind(), ErrorKind::GatewayError, "{:?}", e);
            assert!(!e.detail().is_empty());
        }
    }

    #[test]
    fn api_error_detail_never_blank()
    {   let e = Error::ApiError { status: 502, body: "  ".to_string() };
        assert_eq!(e.detail(), "API error (status 502): <empty body>");
    }

    #[test]
    fn input_and_mode_errors_keep_their_kind()
    {   assert_eq!(Error::EmptyInput.kind(), ErrorKind::EmptyInput);
        assert_eq!(
          Error::UnknownMode("x".to_string()).kind()
        , ErrorKind::UnknownMode
        );
        assert_eq!(
          Error::MissingApiKey("env".to_string()).kind()
        , ErrorKind::Configuration
        );
    }
}

//! Form-level handling: submit, collect stats, offer a download

use std::path::{Path, PathBuf};
use log::{debug, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::catalog::Mode;
use crate::gateway::CompletionGateway;
use crate::request::CompletionRequest;
use crate::stats::{format_thousands, LengthStats};
use crate::transport::Transport;

pub const EMPTY_INPUT_WARNING: &str = "Please enter a prompt to optimize.";

/// A finished transformation with its statistics
#[derive(Debug, Clone, PartialEq)]
pub struct Completion
{   pub mode: Mode
  , pub original: String
  , pub output: String
  , pub stats: LengthStats
}

impl Completion
{   pub fn download_file_name(&self) -> &'static str
    {   self.mode.download_file_name()
    }

    /// Write the output as plain text into `dir`
    pub fn save_to(&self, dir: &Path)
      -> Result<PathBuf, crate::error::Error>
    {   std::fs::create_dir_all(dir)?;
        let path = dir.join(self.download_file_name());
        std::fs::write(&path, &self.output)?;
        info!("Saved {} output to {}", self.mode, path.display());
        Ok(path)
    }
}

/// Result of one form action
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome
{   Completed(Completion)
  , /// Input rejected before any call was made
    Rejected(String)
  , /// The call failed; the session stays usable
    Failed(String)
}

/// Stateless wrapper the UI drives once per action
pub struct Session<T>
{   gateway: CompletionGateway<T>
}

impl<T: Transport> Session<T>
{   pub fn new(gateway: CompletionGateway<T>) -> Self
    {   Session
        {   gateway
        }
    }

    pub fn gateway(&self) -> &CompletionGateway<T>
    {   &self.gateway
    }

    pub async fn submit(&self, mode: Mode, text: &str) -> Outcome
    {   let request = CompletionRequest::new(mode, text);
        if request.validate().is_err()
        {   debug!("Rejected empty {} input", mode);
            return Outcome::Rejected(EMPTY_INPUT_WARNING.to_string());
        }
        match self.gateway.run(&request).await
        {   Ok(output) => {
              let stats = LengthStats::new(text, &output);
              Outcome::Completed(Completion
              {   mode
                , original: text.to_string()
                , output
                , stats
              })
            }
          , Err(e) => {
              warn!("{} failed: {}", mode, e);
              Outcome::Failed(format!("Error: {}", e.detail()))
            }
        }
    }
}

/// Metrics block shown under a completion
pub fn render_metrics(stats: &LengthStats) -> String
{   format!(
      "Original Length:  {} chars\n\
       Optimized Length: {} chars\n\
       Reduction:        {} chars\n\
       Compression:      {}\n",
      format_thousands(stats.original_chars as i64),
      format_thousands(stats.output_chars as i64),
      format_thousands(stats.difference()),
      stats.reduction_display()
    )
}

/// Full text report for a completion; `compare` adds the original
pub fn render_report(completion: &Completion, compare: bool) -> String
{   let mut out = String::new();
    out.push_str(&format!("== {} ==\n\n", completion.mode.label()));
    out.push_str(&completion.output);
    if !completion.output.ends_with('\n')
    {   out.push('\n');
    }
    out.push_str("\n-- Metrics --\n");
    out.push_str(&render_metrics(&completion.stats));
    if compare
    {   out.push_str("\n-- Original --\n");
        out.push_str(&completion.original);
        if !completion.original.ends_with('\n')
        {   out.push('\n');
        }
    }
    out
}

// ===== Interactive Form =====

/// One line typed into the interactive form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand<'a>
{   Quit
  , Run
  , /// `/mode <name>`; the name may be empty
    SwitchMode(&'a str)
  , /// Anything else is prompt text, kept verbatim
    Text(&'a str)
}

/// Commands are whole words; `/models ...` is prompt text
pub fn parse_form_line(line: &str) -> FormCommand<'_>
{   let command = line.trim();
    match command
    {   "/quit" => FormCommand::Quit
      , "/run" => FormCommand::Run
      , "/mode" => FormCommand::SwitchMode("")
      , _ => match command.strip_prefix("/mode ")
        {   Some(name) => FormCommand::SwitchMode(name.trim())
          , None => FormCommand::Text(line)
        }
    }
}

/// What the form reports back to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent
{   ModeChanged(Mode)
  , Outcome(Outcome)
  , /// Recoverable problem with one line or command
    Notice(String)
}

/// Counts of submitted actions once the input ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormSummary
{   pub submitted: usize
  , pub failed: usize
}

/// Drive the form from a line reader until `/quit` or end of input.
///
/// Prompt text left over at end of input is submitted. A line that
/// is not valid UTF-8 is reported and skipped.
pub async fn run_form<T, R, F>(
  session: &Session<T>
, mut reader: R
, mut mode: Mode
, mut emit: F
) -> Result<FormSummary, crate::error::Error>
  where T: Transport
      , R: AsyncBufRead + Unpin
      , F: FnMut(FormEvent)
{   let mut summary = FormSummary::default();
    let mut buffer = String::new();
    let mut raw = Vec::new();

    loop
    {   raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0
        {   break;
        }
        while matches!(raw.last(), Some(b'\n') | Some(b'\r'))
        {   raw.pop();
        }
        let line = match std::str::from_utf8(&raw)
        {   Ok(line) => line
          , Err(e) => {
              warn!("Skipping non UTF-8 input line: {}", e);
              emit(FormEvent::Notice(
                "Skipped a line that is not valid UTF-8".to_string()
              ));
              continue;
            }
        };

        match parse_form_line(line)
        {   FormCommand::Quit => {
              debug!("Form quit requested");
              return Ok(summary);
            }
          , FormCommand::SwitchMode(name) => match name.parse::<Mode>()
            {   Ok(m) => {
                  mode = m;
                  emit(FormEvent::ModeChanged(mode));
                }
              , Err(e) => emit(FormEvent::Notice(e.to_string()))
            }
          , FormCommand::Run => {
              submit_buffer(
                session, mode, &mut buffer, &mut summary, &mut emit
              ).await;
            }
          , FormCommand::Text(text) => {
              if !buffer.is_empty()
              {   buffer.push('\n');
              }
              buffer.push_str(text);
            }
        }
    }

    if !buffer.trim().is_empty()
    {   debug!("Submitting prompt left pending at end of input");
        emit(FormEvent::Notice(
          "End of input: submitting pending prompt".to_string()
        ));
        submit_buffer(
          session, mode, &mut buffer, &mut summary, &mut emit
        ).await;
    }
    Ok(summary)
}

async fn submit_buffer<T, F>(
  session: &Session<T>
, mode: Mode
, buffer: &mut String
, summary: &mut FormSummary
, emit: &mut F
)
  where T: Transport
      , F: FnMut(FormEvent)
{   let outcome = session.submit(mode, buffer.as_str()).await;
    buffer.clear();
    summary.submitted += 1;
    if !matches!(outcome, Outcome::Completed(_))
    {   summary.failed += 1;
    }
    emit(FormEvent::Outcome(outcome));
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn slash_words_stay_prompt_text()
    {   let line = "/models should be listed first";
        assert_eq!(parse_form_line(line), FormCommand::Text(line));
        assert_eq!(parse_form_line("/modest"), FormCommand::Text("/modest"));
        assert_eq!(parse_form_line("/running"), FormCommand::Text("/running"));
    }

    #[test]
    fn whole_word_commands()
    {   assert_eq!(parse_form_line(" /quit "), FormCommand::Quit);
        assert_eq!(parse_form_line("/run"), FormCommand::Run);
        assert_eq!(parse_form_line("/mode"), FormCommand::SwitchMode(""));
        assert_eq!(
          parse_form_line("/mode  meta ")
        , FormCommand::SwitchMode("meta")
        );
        assert_eq!(parse_form_line("  text  "), FormCommand::Text("  text  "));
    }

    fn completion(original: &str, output: &str) -> Completion
    {   Completion
        {   mode: Mode::GeneralOptimize
          , original: original.to_string()
          , output: output.to_string()
          , stats: LengthStats::new(original, output)
        }
    }

    #[test]
    fn metrics_block_formats_counts()
    {   let c = completion(&"a".repeat(1500), &"b".repeat(500));
        let text = render_metrics(&c.stats);
        assert!(text.contains("Original Length:  1,500 chars"));
        assert!(text.contains("Optimized Length: 500 chars"));
        assert!(text.contains("Reduction:        1,000 chars"));
        assert!(text.contains("Compression:      66.7%"));
    }

    #[test]
    fn report_includes_original_only_when_comparing()
    {   let c = completion("the original prompt", "short");
        assert!(!render_report(&c, false).contains("the original prompt"));
        let report = render_report(&c, true);
        assert!(report.contains("-- Original --\nthe original prompt\n"));
        assert!(report.starts_with("== Smart Prompt Optimization =="));
    }

    #[test]
    fn save_writes_mode_named_file()
    {   let dir = tempfile::tempdir().unwrap();
        let mut c = completion("in", "result text");
        c.mode = Mode::MetaPrompt;
        let path = c.save_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("meta_prompt.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "result text");
    }
}

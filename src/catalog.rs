//! Fixed transformation modes and their instruction templates

use std::fmt;
use std::str::FromStr;
use log::debug;
use serde::{Deserialize, Serialize};

/// Named transformation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode
{   /// Condense any prompt into an imperative, sectioned version
    GeneralOptimize
  , /// Rewrite for clarity and technical specificity
    MetaPrompt
  , /// Condense HTML email generation prompts under fixed headings
    EmailTemplateOptimize
}

impl Mode
{   pub const ALL: [Mode; 3] = [
      Mode::GeneralOptimize
    , Mode::MetaPrompt
    , Mode::EmailTemplateOptimize
    ];

    /// Stable kebab-case identifier
    pub fn name(&self) -> &'static str
    {   match self
        {   Mode::GeneralOptimize => "general-optimize"
          , Mode::MetaPrompt => "meta-prompt"
          , Mode::EmailTemplateOptimize => "email-template-optimize"
        }
    }

    pub fn label(&self) -> &'static str
    {   match self
        {   Mode::GeneralOptimize => "Smart Prompt Optimization"
          , Mode::MetaPrompt => "Meta Prompting"
          , Mode::EmailTemplateOptimize => "Email Template Optimization"
        }
    }

    /// File name offered when saving the output
    pub fn download_file_name(&self) -> &'static str
    {   match self
        {   Mode::GeneralOptimize => "optimized_prompt.txt"
          , Mode::MetaPrompt => "meta_prompt.txt"
          , Mode::EmailTemplateOptimize => "email_template_prompt.txt"
        }
    }
}

impl fmt::Display for Mode
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.name())
    }
}

impl FromStr for Mode
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   match s.trim().to_ascii_lowercase().as_str()
        {   "general-optimize" | "smart" | "general" => {
              Ok(Mode::GeneralOptimize)
            }
          , "meta-prompt" | "meta" => Ok(Mode::MetaPrompt)
          , "email-template-optimize" | "email" => {
              Ok(Mode::EmailTemplateOptimize)
            }
          , _ => Err(crate::error::Error::UnknownMode(s.to_string()))
        }
    }
}

/// Instruction text and sampling parameters for one mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSpec
{   pub instruction: &'static str
  , pub max_output_tokens: u32
  , pub temperature: f32
  , pub top_p: f32
}

impl ModeSpec
{   /// Check the declared parameter bounds
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.instruction.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "instruction must not be empty".to_string()
            ));
        }
        if self.max_output_tokens == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "max_output_tokens must be > 0".to_string()
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("temperature {} outside [0, 2]", self.temperature)
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!("top_p {} outside (0, 1]", self.top_p)
            ));
        }
        Ok(())
    }
}

const GENERAL_OPTIMIZE_INSTRUCTION: &str = "\
You are an expert prompt engineer. Transform the user's prompt, whatever its domain, into a concise, professional, imperative version.

1. Identify the domain and the core task of the input prompt.
2. Keep the role declaration from the input, if present.
3. Preserve every functional requirement, technical specification, input/output format and validation rule. Do not drop requirements.
4. Replace verbose explanations with direct imperative statements.
5. Replace embedded code examples with the format requirements they illustrate.
6. Consolidate repeated statements into a single directive.
7. Organize the result under clear section headings with bullet or numbered lists.
8. Output plain structured text only. Do NOT add commentary, explanations or markdown code blocks outside the structure.
";

const META_PROMPT_INSTRUCTION: &str = "\
You are an expert prompt engineer. Analyze and refine the user's prompt to be:
- Clear and unambiguous
- Technically detailed (frameworks, APIs, formats)
- Well-structured and professional
- Free of redundancy

Output only the refined prompt without explanations. Preserve the original role.";

const EMAIL_TEMPLATE_INSTRUCTION: &str = "\
You are an expert prompt engineer specializing in requirements structuring for cross-client compatible HTML email template generation.

Transform any verbose email template generation prompt into a concise, professional requirements document with this structure:

---
1. Start with the role declaration from the input.
2. Summarize core task in ONE sentence (purpose of the template).
3. Present all requirements as easily scannable bullet or numbered lists under clear section headings (STRICT RULES, DYNAMIC VARIABLES HANDLING, STRUCTURE & LAYOUT REQUIREMENTS, COMPATIBILITY, TYPOGRAPHY & BUTTONS, FOOTER, ACCESSIBILITY, RESPONSIVENESS, DELIVERABLE FORMAT, etc.).
4. Always include every technical, compatibility, variable handling, HTML, CSS, and JSON rule from the input prompt. Do not drop requirements.
5. Where possible, prefer clear imperative bullets (e.g. 'Use table-based layout (max 600px)...').
6. Omit redundant prose/boilerplate from input; focus on clear, direct requirements.
7. Organize everything into clean sections, using ----- lines to separate major blocks.
8. For dynamic variables, show variable rules as a list with named placeholder examples.
9. Do NOT add markdown code blocks, headings, or explanations outside the structure. Output as plain text.
10. If input prompt refers to sections (e.g., user input, branding, assets), mention them as variables, not as JSON.stringify calls.

STRICTLY follow this structure and condensation style. Output must be instantly usable for advanced LLM prompt engineering with no further editing needed.
";

static ENTRIES: [(Mode, ModeSpec); 3] = [
  ( Mode::GeneralOptimize
  , ModeSpec
    {   instruction: GENERAL_OPTIMIZE_INSTRUCTION
      , max_output_tokens: 8192
      , temperature: 0.2
      , top_p: 0.95
    }
  )
, ( Mode::MetaPrompt
  , ModeSpec
    {   instruction: META_PROMPT_INSTRUCTION
      , max_output_tokens: 8192
      , temperature: 0.3
      , top_p: 1.0
    }
  )
, ( Mode::EmailTemplateOptimize
  , ModeSpec
    {   instruction: EMAIL_TEMPLATE_INSTRUCTION
      , max_output_tokens: 8192
      , temperature: 0.2
      , top_p: 0.95
    }
  )
];

/// Immutable mapping from mode to its spec
#[derive(Debug, Clone, Copy)]
pub struct TemplateCatalog
{   entries: &'static [(Mode, ModeSpec)]
}

impl TemplateCatalog
{   /// The built-in catalog covering every mode
    pub fn builtin() -> Self
    {   TemplateCatalog
        {   entries: &ENTRIES
        }
    }

    pub fn spec_for(&self, mode: Mode)
      -> Result<&'static ModeSpec, crate::error::Error>
    {   let entries: &'static [(Mode, ModeSpec)] = self.entries;
        entries
          .iter()
          .find(|(m, _)| *m == mode)
          .map(|(_, spec)| spec)
          .ok_or_else(|| {
            crate::error::Error::UnknownMode(mode.name().to_string())
          })
    }

    /// Resolve by mode name, e.g. from a CLI flag
    pub fn spec_for_name(&self, name: &str)
      -> Result<&'static ModeSpec, crate::error::Error>
    {   let mode: Mode = name.parse()?;
        self.spec_for(mode)
    }

    /// Every mode must map to exactly one spec within bounds
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   for mode in Mode::ALL
        {   let count = self.entries
              .iter()
              .filter(|(m, _)| *m == mode)
              .count();
            if count != 1
            {   return Err(crate::error::Error::InvalidConfiguration(
                  format!("mode {} has {} specs", mode, count)
                ));
            }
            self.spec_for(mode)?.validate()?;
        }
        debug!("Validated {} catalog entries", self.entries.len());
        Ok(())
    }
}

impl Default for TemplateCatalog
{   fn default() -> Self
    {   TemplateCatalog::builtin()
    }
}

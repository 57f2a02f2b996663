//! Length statistics shown next to a completion

/// Character counts of the input and output text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthStats
{   pub original_chars: usize
  , pub output_chars: usize
}

impl LengthStats
{   /// Counts Unicode scalar values, not bytes
    pub fn new(original: &str, output: &str) -> Self
    {   LengthStats
        {   original_chars: original.chars().count()
          , output_chars: output.chars().count()
        }
    }

    /// `original - output`; negative when the output grew
    pub fn difference(&self) -> i64
    {   self.original_chars as i64 - self.output_chars as i64
    }

    /// None when the original is empty
    pub fn reduction_percent(&self) -> Option<f64>
    {   if self.original_chars == 0
        {   return None;
        }
        Some(self.difference() as f64 / self.original_chars as f64 * 100.0)
    }

    /// One decimal, e.g. "60.0%"; expansion shows as a negative value
    pub fn reduction_display(&self) -> String
    {   match self.reduction_percent()
        {   Some(pct) => format!("{:.1}%", pct)
          , None => "n/a".to_string()
        }
    }
}

/// Thousands-separated integer, e.g. "-12,345"
pub fn format_thousands(n: i64) -> String
{   let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate()
    {   if i > 0 && (digits.len() - i) % 3 == 0
        {   out.push(',');
        }
        out.push(c);
    }
    if n < 0
    {   out.insert(0, '-');
    }
    out
}

//! Dump options DTO

/// Options for the full structural dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// Render node payloads as hex with an ASCII column
    pub text: bool,
    /// Also dump blocks that failed verification, as truncated hex
    pub raw_invalid: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            text: true,
            raw_invalid: false,
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets payload text rendering
    pub fn with_text(mut self, text: bool) -> Self {
        self.text = text;
        self
    }

    /// Enables the raw dump of unverified blocks
    pub fn with_raw_invalid(mut self, raw_invalid: bool) -> Self {
        self.raw_invalid = raw_invalid;
        self
    }
}

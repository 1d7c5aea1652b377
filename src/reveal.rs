//! Placeholder typing cycle for the interactive prompt.
//!
//! The prompt hint is "typed" one character at a time, held briefly once
//! complete, then replaced by the next hint, wrapping around forever. The
//! cycle itself is pure — a caller steps it from a ticker and draws the
//! current frame however it likes.

/// Rotating prompt hints shown while waiting for input.
pub const DEFAULT_PLACEHOLDERS: [&str; 4] = [
    "Search anything...",
    "Ask me anything...",
    "Your smart AI awaits...",
    "Explore the unknown...",
];

/// Incremental typing state over a rotating list of prompts.
///
/// Each [`tick`](PlaceholderCycle::tick) either reveals one more character
/// of the current prompt or, once the prompt is fully shown, burns one of
/// `hold_ticks` before wrapping to the next prompt and starting over.
pub struct PlaceholderCycle {
    prompts: Vec<String>,
    hold_ticks: u32,
    index: usize,
    cursor: usize,
    held: u32,
}

impl PlaceholderCycle {
    /// Create a cycle over `prompts`, holding each fully typed prompt for
    /// `hold_ticks` ticks. Empty prompt lists fall back to the defaults.
    pub fn new(prompts: Vec<String>, hold_ticks: u32) -> Self {
        let prompts = if prompts.is_empty() {
            DEFAULT_PLACEHOLDERS.iter().map(|s| s.to_string()).collect()
        } else {
            prompts
        };
        Self {
            prompts,
            hold_ticks,
            index: 0,
            cursor: 0,
            held: 0,
        }
    }

    /// The default prompts with hold derived from the configured intervals.
    pub fn with_defaults(hold_ticks: u32) -> Self {
        Self::new(Vec::new(), hold_ticks)
    }

    /// Advance one tick and return the visible frame.
    pub fn tick(&mut self) -> &str {
        let total = self.current().chars().count();
        if self.cursor < total {
            self.cursor += 1;
        } else if self.held < self.hold_ticks {
            self.held += 1;
        } else {
            self.index = (self.index + 1) % self.prompts.len();
            self.cursor = 0;
            self.held = 0;
        }
        self.frame()
    }

    /// The currently visible prefix of the current prompt.
    pub fn frame(&self) -> &str {
        let prompt = self.current();
        match prompt.char_indices().nth(self.cursor) {
            Some((byte, _)) => &prompt[..byte],
            None => prompt,
        }
    }

    /// Width to pad redraws to, so a shorter frame erases a longer one.
    pub fn max_width(&self) -> usize {
        self.prompts
            .iter()
            .map(|p| p.chars().count())
            .max()
            .unwrap_or(0)
    }

    fn current(&self) -> &str {
        &self.prompts[self.index]
    }
}

//! # askbar
//!
//! An AI answer bar: queries go out to a hosted completion API through a
//! thin relay, and answers come back to the user through a typed,
//! character-by-character reveal.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────────┐   ┌────────────┐
//! │   Input     │──▶│ Query Session  │──▶│ Completion │──▶ hosted API
//! │ CLI / HTTP  │   │  Controller    │   │   Relay    │
//! └────────────┘   └──────┬─────────┘   └────────────┘
//!                         │ timed reveal
//!                         ▼
//!                   ┌────────────┐
//!                   │ AnswerSink │  (terminal, tests, ...)
//!                   └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! askbar ask "why is the sky blue"      # typed answer in the terminal
//! askbar ask                            # interactive prompt
//! askbar serve                          # POST /api/search for browsers
//! askbar history list                   # recent queries
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`session`] | Query lifecycle and timed reveal |
//! | [`relay`] | Completion provider abstraction |
//! | [`reveal`] | Placeholder typing cycle |
//! | [`server`] | HTTP relay server |
//! | [`history`] | Bounded recent-queries log |
//! | [`ask`] | Terminal ask command |

pub mod ask;
pub mod config;
pub mod history;
pub mod relay;
pub mod reveal;
pub mod server;
pub mod session;

//! Interactive chat over the indexed repositories.
//!
//! Slash commands, markdown rendering with highlighted code blocks, and the
//! input loop. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

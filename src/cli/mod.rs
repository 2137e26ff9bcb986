// CLI module
// Public interface for the command-line front-end

mod commands;
pub mod console;
mod conversation;
pub mod conversation_loop;
mod input;
mod repl;

pub use commands::{format_help, Command};
pub use console::{ConsoleObserver, ConsolePrompter};
pub use conversation::{ConversationHistory, TokenEstimate, COMPACT_KEEP};
pub use conversation_loop::{ConversationLoop, LoopObserver, LoopState, NullObserver};
pub use input::InputHandler;
pub use repl::{project_listing, Repl, GUIDE_FILE};

// Tool implementations
//
// One module per handler kind. Each exposes `execute(args, ctx)`.

// Read-only tools
pub mod glob;
pub mod grep;
pub mod ls;
pub mod read;

// File mutation
pub mod edit;
pub mod write;

// Command execution
pub mod bash;
pub mod git;

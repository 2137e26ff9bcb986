// Line editor for the REPL prompt
//
// Prompt history is stored beside the global config file and shared by every
// project. Blank lines and immediate repeats are not recorded.

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};

use crate::config::ConfigStore;

/// Entries kept across sessions
pub const HISTORY_LIMIT: usize = 100;

pub struct InputHandler {
    editor: DefaultEditor,
    history_path: PathBuf,
}

impl InputHandler {
    /// Editor whose history file belongs to `store`
    pub fn for_store(store: &ConfigStore) -> Result<Self> {
        Self::open(store.history_path())
    }

    pub fn open(history_path: PathBuf) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(HISTORY_LIMIT)
            .and_then(|b| b.history_ignore_dups(true))
            .context("Invalid history settings")?
            .auto_add_history(false)
            .build();
        let mut editor =
            DefaultEditor::with_config(config).context("Failed to initialize line editor")?;

        load_history(&mut editor, &history_path);
        Ok(Self {
            editor,
            history_path,
        })
    }

    /// Next trimmed line, or `None` once the user presses Ctrl+C or Ctrl+D
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let line = match self.editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err).context("Failed to read input"),
        };

        let line = line.trim();
        self.remember(line)?;
        Ok(Some(line.to_string()))
    }

    fn remember(&mut self, line: &str) -> Result<()> {
        if !line.is_empty() {
            self.editor
                .add_history_entry(line)
                .context("Failed to record history entry")?;
        }
        Ok(())
    }

    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }

    pub fn save_history(&mut self) -> Result<()> {
        if let Some(dir) = self.history_path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        self.editor
            .save_history(&self.history_path)
            .with_context(|| format!("Failed to write {}", self.history_path.display()))
    }
}

/// A missing or unreadable history file starts the session empty
fn load_history(editor: &mut DefaultEditor, path: &Path) {
    if !path.exists() {
        return;
    }
    if let Err(e) = editor.load_history(path) {
        tracing::debug!(path = %path.display(), "Ignoring unreadable history: {}", e);
    }
}

// Conversation loop
//
// Drives one user turn: request a completion, run the directives it contains
// and feed each result back to the model before moving on. Follow-up
// responses are processed depth-first, so a directive's consequences are
// fully resolved before the next directive of an earlier response runs.

use std::sync::Arc;

use super::conversation::ConversationHistory;
use crate::ollama::{ChatMessage, ChatModel, NetworkError};
use crate::tools::{PermissionGate, ToolCall, ToolCallParser, ToolError, ToolExecutor, ToolOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    AwaitingResponse,
    ProcessingDirectives,
    Exited,
}

/// UI hooks for loop progress. All methods default to no-ops.
pub trait LoopObserver: Send {
    fn on_request(&mut self) {}
    /// Cumulative response text so far
    fn on_progress(&mut self, _text: &str) {}
    fn on_response(&mut self, _text: &str) {}
    fn on_tool_start(&mut self, _call: &ToolCall) {}
    fn on_tool_result(&mut self, _call: &ToolCall, _outcome: &Result<ToolOutput, ToolError>) {}
    fn on_exchange_error(&mut self, _error: &NetworkError) {}
}

/// Observer that ignores every event
pub struct NullObserver;

impl LoopObserver for NullObserver {}

/// Message appended after a successful tool call
pub fn tool_result_message(name: &str, output: &ToolOutput) -> String {
    format!("Tool result for {}:\n```\n{}\n```", name, output.render())
}

/// Message appended after a failed or denied tool call
pub fn tool_error_message(name: &str, error: &ToolError) -> String {
    format!("Tool {} failed with error: {}", name, error)
}

pub struct ConversationLoop {
    model: Arc<dyn ChatModel>,
    executor: ToolExecutor,
    gate: PermissionGate,
    system_prompt: ChatMessage,
    observer: Box<dyn LoopObserver>,
    state: LoopState,
}

impl ConversationLoop {
    pub fn new(
        model: Arc<dyn ChatModel>,
        executor: ToolExecutor,
        gate: PermissionGate,
        system_prompt: impl Into<String>,
        observer: Box<dyn LoopObserver>,
    ) -> Self {
        Self {
            model,
            executor,
            gate,
            system_prompt: ChatMessage::system(system_prompt),
            observer,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn exit(&mut self) {
        self.state = LoopState::Exited;
    }

    pub fn model(&self) -> &Arc<dyn ChatModel> {
        &self.model
    }

    pub fn executor(&self) -> &ToolExecutor {
        &self.executor
    }

    pub fn gate_mut(&mut self) -> &mut PermissionGate {
        &mut self.gate
    }

    /// Process one user input to completion.
    ///
    /// Only a failure of the initial exchange is returned; failed follow-ups
    /// are reported to the observer and the remaining directives still run.
    pub async fn submit(
        &mut self,
        history: &mut ConversationHistory,
        input: &str,
    ) -> Result<(), NetworkError> {
        if self.state == LoopState::Exited {
            return Ok(());
        }

        history.add_user_message(input);
        let directives = match self.exchange(history).await {
            Ok(directives) => directives,
            Err(e) => {
                self.observer.on_exchange_error(&e);
                self.state = LoopState::Idle;
                return Err(e);
            }
        };

        // Pending directives per response, innermost follow-up on top
        let mut pending: Vec<std::vec::IntoIter<ToolCall>> = vec![directives.into_iter()];

        while let Some(frame) = pending.last_mut() {
            let Some(call) = frame.next() else {
                pending.pop();
                continue;
            };

            self.state = LoopState::ProcessingDirectives;
            self.observer.on_tool_start(&call);
            let outcome = self.executor.execute(&call, &mut self.gate).await;
            self.observer.on_tool_result(&call, &outcome);

            let message = match &outcome {
                Ok(output) => tool_result_message(&call.name, output),
                Err(e) => tool_error_message(&call.name, e),
            };
            history.add_user_message(message);

            match self.exchange(history).await {
                Ok(follow_up) if !follow_up.is_empty() => pending.push(follow_up.into_iter()),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(tool = %call.name, "Follow-up exchange failed: {}", e);
                    self.observer.on_exchange_error(&e);
                }
            }
        }

        self.state = LoopState::Idle;
        Ok(())
    }

    /// Send the history, record the reply and return its directives
    async fn exchange(&mut self, history: &mut ConversationHistory) -> Result<Vec<ToolCall>, NetworkError> {
        self.state = LoopState::AwaitingResponse;
        self.observer.on_request();

        let messages = history.with_system(&self.system_prompt);
        let observer = &mut self.observer;
        let mut on_progress = |text: &str| observer.on_progress(text);
        let response = self
            .model
            .chat_completion(&messages, Some(&mut on_progress))
            .await?;

        self.observer.on_response(&response);
        history.add_assistant_message(response.clone());

        let directives = ToolCallParser::parse(&response);
        if !directives.is_empty() {
            tracing::debug!(count = directives.len(), "Parsed tool directives");
        }
        Ok(directives)
    }
}

// System prompt construction
//
// Describes the available tools and the JSON directive format the parser
// understands.

use std::path::Path;

use super::registry::ToolRegistry;

pub struct ToolPromptFormatter;

impl ToolPromptFormatter {
    /// Full system prompt for a session rooted at `working_dir`
    pub fn system_prompt(registry: &ToolRegistry, working_dir: &Path) -> String {
        let mut prompt = String::from(
            "You are Ollama Code, an AI coding assistant running in the user's terminal. \
             You help with software engineering tasks: reading and writing code, \
             running commands and working with git.\n",
        );
        prompt.push_str(&format!(
            "\nThe current working directory is {}. All paths are relative to it.\n",
            working_dir.display()
        ));
        prompt.push_str(&Self::format_tools_for_prompt(registry));
        prompt
    }

    /// Tool catalogue and usage rules
    pub fn format_tools_for_prompt(registry: &ToolRegistry) -> String {
        let mut prompt = String::from("\n# Available Tools\n\n");
        prompt.push_str("To use a tool, reply with a JSON code block in exactly this format:\n\n");
        prompt.push_str("```json\n");
        prompt.push_str("{\"name\": \"ToolName\", \"arguments\": {\"param\": \"value\"}}\n");
        prompt.push_str("```\n\n");
        prompt.push_str(
            "You will receive the tool result in the next message. \
             Use one code block per tool call.\n\n",
        );

        for entry in registry.definitions() {
            prompt.push_str(&format!("## {}\n", entry.name));
            prompt.push_str(&format!("{}.", entry.description));
            if entry.requires_permission {
                prompt.push_str(" Requires user approval.");
            }
            prompt.push_str("\n\n**Parameters:**\n");
            for p in entry.parameters {
                let required = if p.required { " (required)" } else { "" };
                prompt.push_str(&format!(
                    "- `{}` ({}){}: {}\n",
                    p.name, p.kind, required, p.description
                ));
            }
            prompt.push_str("\n**Example:**\n```json\n");
            prompt.push_str(&format!(
                "{{\"name\": \"{}\", \"arguments\": {}}}\n",
                entry.name, entry.example
            ));
            prompt.push_str("```\n\n");
        }

        prompt.push_str("## Important Rules:\n\n");
        prompt.push_str("1. Explain what you are about to do before calling a tool\n");
        prompt.push_str("2. Read files before editing them\n");
        prompt.push_str("3. Shell commands may not use pipes, redirection or command chaining\n");
        prompt.push_str("4. When no tool is needed, answer directly without a code block\n");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::parser::ToolCallParser;

    #[test]
    fn test_prompt_lists_every_tool() {
        let registry = ToolRegistry::new();
        let prompt = ToolPromptFormatter::system_prompt(&registry, Path::new("/work"));
        for name in registry.list().keys() {
            assert!(prompt.contains(&format!("## {}", name)), "{}", name);
        }
        assert!(prompt.contains("/work"));
    }

    #[test]
    fn test_examples_parse_as_directives() {
        let registry = ToolRegistry::new();
        let prompt = ToolPromptFormatter::format_tools_for_prompt(&registry);
        let names: Vec<String> = ToolCallParser::parse(&prompt)
            .into_iter()
            .map(|c| c.name)
            .collect();
        let expected: Vec<&str> = registry.definitions().iter().map(|e| e.name).collect();
        // Format illustration first, then one example per tool
        assert_eq!(names[0], "ToolName");
        assert_eq!(&names[1..], expected.as_slice());
    }
}

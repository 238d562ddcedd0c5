//! Slash commands for interactive mode

use pulse_agent::ChatSession;

/// Canned prompts offered to the user
pub const TEMPLATES: &[&str] = &[
    "create post for all of my activities",
    "delete all of my activities",
];

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Start a fresh session
    NewSession,
    /// Send this text as a user turn
    Send(String),
    /// Show a message to the user (not sent to agent)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command
pub fn execute_command(input: &str, session: &ChatSession) -> Option<CommandResult> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;
    let parts: Vec<&str> = rest.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let args = parts.get(1).map(|s| s.trim()).unwrap_or("");

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "templates" => CommandResult::Message(templates_message()),

        "t" | "template" => template(args),

        "transcript" => {
            let transcript = session.transcript();
            if transcript.is_empty() {
                CommandResult::Message("Transcript is empty.".to_string())
            } else {
                CommandResult::Message(transcript)
            }
        }

        "history" => CommandResult::Message(history_message(session)),

        "new" | "clear" | "c" => CommandResult::NewSession,

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn template(args: &str) -> CommandResult {
    match args.parse::<usize>() {
        Ok(n) if (1..=TEMPLATES.len()).contains(&n) => {
            CommandResult::Send(TEMPLATES[n - 1].to_string())
        }
        _ => CommandResult::Message(format!(
            "Usage: /t <1-{}>\n{}",
            TEMPLATES.len(),
            templates_message()
        )),
    }
}

fn templates_message() -> String {
    TEMPLATES
        .iter()
        .enumerate()
        .map(|(i, t)| format!("  {}. {}", i + 1, t))
        .collect::<Vec<_>>()
        .join("\n")
}

fn history_message(session: &ChatSession) -> String {
    let conv = session.snapshot();
    if conv.messages.is_empty() {
        return "No messages yet.".to_string();
    }

    conv.messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let label = match m.kind {
                Some(kind) => kind.as_str(),
                None => m.sender.role(),
            };
            let first_line = m.text.lines().next().unwrap_or("");
            format!("  {}: [{}] {}", i, label, crate::ui::truncate_chars(first_line, 60))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /templates           List canned prompts
  /t <n>               Send canned prompt n
  /transcript          Show the history sent to the agent
  /history             List messages in this session
  /new, /clear, /c     Start a fresh session
  /quit, /exit, /q     Exit pulse

Press Ctrl-C while the agent is working to cancel the turn.
At the prompt, Ctrl-C or Ctrl-D exits."#
        .to_string()
}

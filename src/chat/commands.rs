//! Slash command parsing for the chat application.
//!
//! Directives are matched exactly as typed.  Anything that is not a directive,
//! including unrecognised `/words`, is a chat turn and goes to the model.

/// Prefix of the attach directive, including the separating space.
const ATTACH_PREFIX: &str = "/attach ";

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Ingest a file into the conversation.
    Attach(String),

    /// Show the attachment registry.
    List,

    /// Display help information.
    Help,

    /// Display session statistics.
    Stats,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a directive, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use attache::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
/// assert_eq!(
///     parse_command("/attach notes.txt"),
///     Some(ChatCommand::Attach("notes.txt".to_string()))
/// );
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let command = match input {
        "/quit" => ChatCommand::Quit,
        "/list" => ChatCommand::List,
        "/help" => ChatCommand::Help,
        "/stats" => ChatCommand::Stats,
        "/attach" => ChatCommand::Invalid("/attach requires a file path".to_string()),
        _ => {
            let path = input.strip_prefix(ATTACH_PREFIX)?.trim();
            if path.is_empty() {
                ChatCommand::Invalid("/attach requires a file path".to_string())
            } else {
                ChatCommand::Attach(path.to_string())
            }
        }
    };

    Some(command)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Commands:
  /attach <filepath> - Upload a file for context
  /list - Show active attachments
  /stats - Show session statistics
  /help - Show this help message
  /quit - Exit the program"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn directives_are_case_sensitive() {
        assert_eq!(parse_command("/QUIT"), None);
        assert_eq!(parse_command("/List"), None);
    }

    #[test]
    fn parse_attach() {
        assert_eq!(
            parse_command("/attach notes.txt"),
            Some(ChatCommand::Attach("notes.txt".to_string()))
        );
        assert_eq!(
            parse_command("/attach   my docs/report 1.pdf  "),
            Some(ChatCommand::Attach("my docs/report 1.pdf".to_string()))
        );
        assert!(matches!(
            parse_command("/attach"),
            Some(ChatCommand::Invalid(msg)) if msg.contains("requires")
        ));
        assert!(matches!(
            parse_command("/attach    "),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_list_help_stats() {
        assert_eq!(parse_command("/list"), Some(ChatCommand::List));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
    }

    #[test]
    fn non_commands() {
        assert_eq!(parse_command("Hello, model!"), None);
        assert_eq!(parse_command("/list all"), None);
        assert_eq!(parse_command("/attachments please"), None);
        assert_eq!(parse_command("/unknown"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/attach <filepath>"));
        assert!(help.contains("/list"));
        assert!(help.contains("/quit"));
    }
}

//! Command parsing for the CLI
//!
//! The prompt understands two exit keywords; every other non-blank line is
//! a question for the agent. Keywords must be typed without surrounding
//! whitespace, and questions are forwarded exactly as typed.

/// Words that end the session, matched case-insensitively
pub const EXIT_KEYWORDS: [&str; 2] = ["quit", "exit"];

/// Command types
#[derive(Debug, Clone, PartialEq)]
pub enum CommandType {
    /// Exit the application
    Quit,
    /// Natural language question
    Query { text: String },
    /// Blank line
    Empty,
}

/// Parsed command
#[derive(Debug, Clone)]
pub struct Command {
    /// The type of command
    pub command_type: CommandType,
}

impl Command {
    /// Parse a command from user input
    pub fn parse(input: &str) -> Self {
        let command_type = if input.trim().is_empty() {
            CommandType::Empty
        } else if EXIT_KEYWORDS
            .iter()
            .any(|keyword| input.eq_ignore_ascii_case(keyword))
        {
            CommandType::Quit
        } else {
            CommandType::Query {
                text: input.to_string(),
            }
        };

        Command { command_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quit_command() {
        for input in ["quit", "QUIT", "exit", "Exit"] {
            let cmd = Command::parse(input);
            assert_eq!(cmd.command_type, CommandType::Quit, "input: {input:?}");
        }
    }

    #[test]
    fn test_padded_keyword_is_forwarded_as_typed() {
        let cmd = Command::parse("  quit  ");
        assert_eq!(
            cmd.command_type,
            CommandType::Query {
                text: "  quit  ".to_string()
            }
        );
    }

    #[test]
    fn test_parse_query() {
        let cmd = Command::parse("How many employees are there?");
        assert_eq!(
            cmd.command_type,
            CommandType::Query {
                text: "How many employees are there?".to_string()
            }
        );
    }

    #[test]
    fn test_exit_keyword_inside_question_is_a_query() {
        let cmd = Command::parse("quit smoking stats");
        assert!(matches!(cmd.command_type, CommandType::Query { .. }));

        let cmd = Command::parse("/exit");
        assert_ne!(cmd.command_type, CommandType::Quit);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Command::parse("").command_type, CommandType::Empty);
        assert_eq!(Command::parse("   \t").command_type, CommandType::Empty);
    }
}

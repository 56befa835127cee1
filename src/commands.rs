use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "start the bot and get our updates.")]
    Start,
    #[command(description = "display this text.")]
    Help,
    #[command(description = "show the price list.")]
    Price,
    #[command(description = "links to our channels.")]
    Subscribe,
}

/// Commands reserved for the configured admin. Parsed by hand from the raw
/// text so that empty or quoted arguments reach the handler untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminCommand {
    Broadcast { text: String },
    ListUsers,
    Poll { args: String },
}

pub const ADMIN_DESCRIPTIONS: &str = "Admin commands:\n\
    /broadcast <text> - send a message to all subscribers\n\
    /listusers - list all subscribers\n\
    /poll \"Question\" \"Option 1\" \"Option 2\" [...] - send a poll to all subscribers";

/// `bot_name` is this bot's username. A `/cmd@OtherBot` mention yields `None`.
pub fn parse_admin_command(text: &str, bot_name: &str) -> Option<AdminCommand> {
    let text = text.trim_start();
    let (head, rest) = match text.find(char::is_whitespace) {
        Some(idx) => text.split_at(idx),
        None => (text, ""),
    };

    let name = head.strip_prefix('/')?;
    let name = match name.split_once('@') {
        Some((cmd, mention)) if mention.eq_ignore_ascii_case(bot_name) => cmd,
        Some(_) => return None,
        None => name,
    };

    match name {
        "broadcast" => Some(AdminCommand::Broadcast {
            text: rest.trim().to_string(),
        }),
        "listusers" => Some(AdminCommand::ListUsers),
        "poll" => Some(AdminCommand::Poll {
            args: rest.trim().to_string(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_commands_parse() {
        assert_eq!(Command::parse("/start", "infobot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/price", "infobot").unwrap(), Command::Price);
        assert_eq!(Command::parse("/subscribe@infobot", "infobot").unwrap(), Command::Subscribe);
        assert!(Command::parse("/Price", "infobot").is_err());
    }

    #[test]
    fn test_admin_commands_parse() {
        assert_eq!(
            parse_admin_command("/broadcast  Hello   world ", "infobot"),
            Some(AdminCommand::Broadcast {
                text: "Hello   world".to_string()
            })
        );
        assert_eq!(
            parse_admin_command("/broadcast", "infobot"),
            Some(AdminCommand::Broadcast { text: String::new() })
        );
        assert_eq!(parse_admin_command("/listusers", "infobot"), Some(AdminCommand::ListUsers));
        assert_eq!(
            parse_admin_command("/poll@infobot \"Q\" \"A\" \"B\"", "infobot"),
            Some(AdminCommand::Poll {
                args: "\"Q\" \"A\" \"B\"".to_string()
            })
        );
    }

    #[test]
    fn test_non_admin_text_is_ignored() {
        assert_eq!(parse_admin_command("/start", "infobot"), None);
        assert_eq!(parse_admin_command("broadcast hello", "infobot"), None);
        assert_eq!(parse_admin_command("/Broadcast hello", "infobot"), None);
        assert_eq!(parse_admin_command("/broadcasting hello", "infobot"), None);
        assert_eq!(parse_admin_command("", "infobot"), None);
    }

    #[test]
    fn test_mention_of_another_bot_is_ignored() {
        assert_eq!(parse_admin_command("/broadcast@OtherBot hi", "infobot"), None);
        assert_eq!(parse_admin_command("/poll@OtherBot \"Q\" \"A\" \"B\"", "infobot"), None);
        assert_eq!(parse_admin_command("/listusers@", "infobot"), None);
        assert_eq!(
            parse_admin_command("/broadcast@infobot hi", "infobot"),
            Some(AdminCommand::Broadcast { text: "hi".to_string() })
        );
        assert_eq!(
            parse_admin_command("/listusers@InfoBot", "infobot"),
            Some(AdminCommand::ListUsers)
        );
    }

    #[test]
    fn test_multiline_broadcast_keeps_text() {
        assert_eq!(
            parse_admin_command("/broadcast\nline one\nline two", "infobot"),
            Some(AdminCommand::Broadcast {
                text: "line one\nline two".to_string()
            })
        );
    }
}

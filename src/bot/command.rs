//! Command parsing.

/// A command the bot answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Link the chat to the account with this email
    Start(Option<String>),
    WhoAmI,
    Ping,
}

impl BotCommand {
    /// Parse a message text.
    ///
    /// Accepts an `@BotName` suffix on the command word. Plain text, unknown
    /// commands and commands addressed to another bot yield `None`.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let mut words = text.split_whitespace();
        let head = words.next()?.strip_prefix('/')?;

        let name = match head.split_once('@') {
            Some((name, target)) => {
                if let Some(me) = bot_username {
                    if !target.eq_ignore_ascii_case(me) {
                        return None;
                    }
                }
                name
            }
            None => head,
        };

        match name {
            "start" => Some(BotCommand::Start(words.next().map(str::to_string))),
            "whoami" => Some(BotCommand::WhoAmI),
            "ping" => Some(BotCommand::Ping),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("/ping", None), Some(BotCommand::Ping));
        assert_eq!(BotCommand::parse("  /whoami  ", None), Some(BotCommand::WhoAmI));
        assert_eq!(
            BotCommand::parse("/start Mgr@Example.com extra", None),
            Some(BotCommand::Start(Some("Mgr@Example.com".to_string())))
        );
        assert_eq!(BotCommand::parse("/start", None), Some(BotCommand::Start(None)));
    }

    #[test]
    fn test_bot_name_suffix() {
        assert_eq!(
            BotCommand::parse("/ping@OffboardingBot", Some("offboardingbot")),
            Some(BotCommand::Ping)
        );
        assert_eq!(BotCommand::parse("/ping@OtherBot", Some("OffboardingBot")), None);
        assert_eq!(BotCommand::parse("/ping@AnyBot", None), Some(BotCommand::Ping));
    }

    #[test]
    fn test_ignores_text_and_unknown_commands() {
        assert_eq!(BotCommand::parse("hello", None), None);
        assert_eq!(BotCommand::parse("", None), None);
        assert_eq!(BotCommand::parse("/help", None), None);
        assert_eq!(BotCommand::parse("ping /ping", None), None);
    }
}

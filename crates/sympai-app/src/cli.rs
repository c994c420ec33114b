use clap::Parser;

/// SympAI: chat with the SympAI backend from the terminal.
#[derive(Parser, Debug)]
#[command(name = "sympai", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Do not generate a title for the conversation.
    #[arg(long)]
    pub no_title: bool,

    /// Locale named in the title prompt (overrides the config).
    #[arg(long)]
    pub language: Option<String>,

    /// The message to send.
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

impl Args {
    pub fn message_text(&self) -> String {
        self.message.join(" ")
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_words_are_joined() {
        let args = Args::parse_from(["sympai", "--no-title", "hello", "there"]);
        assert!(args.no_title);
        assert_eq!(args.message_text(), "hello there");
    }

    #[test]
    fn options_are_parsed() {
        let args = Args::parse_from([
            "sympai",
            "--config",
            "/tmp/c.toml",
            "--log-level",
            "debug",
            "--language",
            "ja",
            "hi",
        ]);
        assert_eq!(args.config.as_deref(), Some("/tmp/c.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.language.as_deref(), Some("ja"));
        assert!(!args.no_title);
    }

    #[test]
    fn message_is_required() {
        assert!(Args::try_parse_from(["sympai"]).is_err());
    }
}

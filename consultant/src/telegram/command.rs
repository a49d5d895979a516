//! Chat command parsing.

/// What an incoming text asks for. Anything that is not a known command is a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    End,
    Help,
    /// `/register <login> <password>`; missing parts are empty strings.
    Register { login: String, password: String },
    Login { login: String, password: String },
    /// `/product <id>`: show a product and ask about it from now on.
    Product(String),
    Question(String),
}

impl Command {
    /// Parses trimmed text. Accepts `/cmd@botname`; command names are case-insensitive.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Command::Question(text.to_string());
        };
        let mut parts = rest.split_whitespace();
        let head = parts.next().unwrap_or("");
        let name = head.split('@').next().unwrap_or("").to_lowercase();
        let args: Vec<&str> = parts.collect();

        match name.as_str() {
            "start" => Command::Start,
            "end" => Command::End,
            "help" => Command::Help,
            "register" | "login" => {
                let login = args.first().copied().unwrap_or("").to_string();
                let password = args.get(1..).map(|p| p.join(" ")).unwrap_or_default();
                if name == "register" {
                    Command::Register { login, password }
                } else {
                    Command::Login { login, password }
                }
            }
            "product" => Command::Product(args.first().copied().unwrap_or("").to_string()),
            _ => Command::Question(text.to_string()),
        }
    }
}

/// Text safe to write to logs: `/register` and `/login` keep only the command word.
pub fn loggable_text(text: &str) -> &str {
    match Command::parse(text) {
        Command::Register { .. } | Command::Login { .. } => {
            text.split_whitespace().next().unwrap_or("")
        }
        _ => text,
    }
}

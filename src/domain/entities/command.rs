/// Commands the bridge answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotCommand {
    /// Greets the user
    Start,
    /// Asks the scale to report its status over MQTT
    Status,
}

impl BotCommand {
    pub fn all() -> &'static [BotCommand] {
        &[BotCommand::Start, BotCommand::Status]
    }

    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Start => "start",
            BotCommand::Status => "status",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BotCommand::Start => "Iniciar o monitor da balança",
            BotCommand::Status => "Solicitar o status da balança",
        }
    }

    /// Looks up a command by name, ignoring case and a leading `/`.
    pub fn from_name(input: &str) -> Option<Self> {
        let input = input.trim_start_matches('/');
        Self::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(input))
    }
}

impl std::fmt::Display for BotCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

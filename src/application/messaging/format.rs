//! Outbound chat texts and Telegram MarkdownV2 escaping

/// Characters MarkdownV2 treats as markup
pub const RESERVED_MARKDOWN: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

pub const WELCOME_MESSAGE: &str = "*Bem-vindo ao Monitor de Balança* ⚖️\n\n\
Recebendo dados do sensor...\n\
Status importantes serão enviados aqui.";

pub const CONNECTED_MESSAGE: &str = "✅ *Conectado ao servidor MQTT!*";

/// Escape special characters for Telegram MarkdownV2
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if RESERVED_MARKDOWN.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn status_message(payload: &str) -> String {
    format!("🔔 Status: {}", payload)
}

pub fn weight_message(payload: &str) -> String {
    format!("⚖️ Peso atual: *{} kg*", payload)
}

pub fn broker_error_message(error: &str) -> String {
    format!("⚠️ *Erro MQTT:* {}", error)
}

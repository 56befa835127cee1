pub const WELCOME_TEXT: &str = "👋 Welcome!\n\n\
    You are now subscribed to our announcements.\n\
    Use /price to see the price list, /subscribe for our channels, /help for all commands.";

pub const PRICE_TEXT: &str = "💰 Price list\n\n\
    • Basic - 10 USD / month\n\
    • Standard - 25 USD / month\n\
    • Premium - 50 USD / month\n\n\
    Questions? Just write to us here.";

pub const SUBSCRIBE_TEXT: &str = "📢 Our channels\n\n\
    • News: https://t.me/infobot_news\n\
    • Chat: https://t.me/infobot_chat";

pub const ADMINS_ONLY: &str = "⛔ Admins only.";
pub const BROADCAST_USAGE: &str = "Usage: /broadcast <text>";
pub const NO_SUBSCRIBERS: &str = "No subscribers yet.";
pub const DATABASE_ERROR: &str = "❌ Database error.";
pub const AI_ERROR: &str = "Sorry, something went wrong while contacting the AI. Please try again later.";

/// Telegram rejects messages above 4096 characters.
pub const MESSAGE_LIMIT: usize = 4096;

/// Splits `text` into chunks no longer than `limit` characters, cutting on
/// line boundaries where possible.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();

        if line_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed > limit {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

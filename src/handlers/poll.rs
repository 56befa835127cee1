use thiserror::Error;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const MAX_QUESTION_LEN: usize = 300;
pub const MAX_OPTION_LEN: usize = 100;

pub const POLL_USAGE: &str = "Usage: /poll \"Question\" \"Option 1\" \"Option 2\" [...]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDefinition {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PollError {
    #[error("Syntax error: {0}")]
    Syntax(&'static str),

    #[error("The poll needs a question.")]
    MissingQuestion,

    #[error("A poll needs at least 2 options, got {0}.")]
    TooFewOptions(usize),

    #[error("A poll can have at most 10 options, got {0}.")]
    TooManyOptions(usize),

    #[error("The question and the options must not be empty.")]
    EmptyText,

    #[error("{0}")]
    TooLong(String),
}

/// Splits an argument line the way a POSIX shell would: whitespace separates
/// words, single quotes are literal, double quotes honour `\"` and `\\`.
pub fn split_quoted(input: &str) -> Result<Vec<String>, PollError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A token may be empty (`""`), so presence is tracked apart from content.
    let mut in_token = false;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(PollError::Syntax("unterminated single quote")),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(PollError::Syntax("unterminated double quote")),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(PollError::Syntax("unterminated double quote")),
                    }
                }
            }
            '\\' => match chars.next() {
                Some(ch) => {
                    in_token = true;
                    current.push(ch);
                }
                None => return Err(PollError::Syntax("trailing backslash")),
            },
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_poll(args: &str) -> Result<PollDefinition, PollError> {
    let mut tokens = split_quoted(args)?.into_iter();
    let question = tokens.next().ok_or(PollError::MissingQuestion)?;
    let options: Vec<String> = tokens.collect();

    if options.len() < MIN_OPTIONS {
        return Err(PollError::TooFewOptions(options.len()));
    }
    if options.len() > MAX_OPTIONS {
        return Err(PollError::TooManyOptions(options.len()));
    }
    if question.trim().is_empty() || options.iter().any(|o| o.trim().is_empty()) {
        return Err(PollError::EmptyText);
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(PollError::TooLong(format!(
            "The question is longer than {} characters.",
            MAX_QUESTION_LEN
        )));
    }
    if let Some(long) = options.iter().find(|o| o.chars().count() > MAX_OPTION_LEN) {
        return Err(PollError::TooLong(format!(
            "Option \"{}\" is longer than {} characters.",
            long.chars().take(20).collect::<String>(),
            MAX_OPTION_LEN
        )));
    }

    Ok(PollDefinition { question, options })
}

use crate::error::{ParserError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Bare identifier, numeral or double-quoted string
    Id { text: String, quoted: bool },
    /// `->`
    Arrow,
    /// `--`
    Line,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Equals,
    Semicolon,
    Comma,
    Colon,
    Plus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    /// Identifier text, when this token is an unquoted keyword candidate
    pub fn keyword(&self) -> Option<String> {
        match &self.kind {
            TokenKind::Id {
                text,
                quoted: false,
            } => Some(text.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// Split dot source into tokens, dropping whitespace and comments
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut line = 1;
    let mut at_line_start = true;

    while pos < chars.len() {
        let c = chars[pos];

        if c == '\n' {
            line += 1;
            pos += 1;
            at_line_start = true;
            continue;
        }
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // `#` lines are preprocessor output and ignored like comments
        if c == '#' && at_line_start {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }
        at_line_start = false;

        let next = chars.get(pos + 1).copied();
        if c == '/' && next == Some('/') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }
        if c == '/' && next == Some('*') {
            let start_line = line;
            pos += 2;
            loop {
                match (chars.get(pos), chars.get(pos + 1)) {
                    (Some('*'), Some('/')) => {
                        pos += 2;
                        break;
                    }
                    (Some(ch), _) => {
                        if *ch == '\n' {
                            line += 1;
                        }
                        pos += 1;
                    }
                    (None, _) => {
                        return Err(ParserError::parse(start_line, "unterminated comment"))
                    }
                }
            }
            continue;
        }

        let simple = match c {
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '}' => Some(TokenKind::RBrace),
            '=' => Some(TokenKind::Equals),
            ';' => Some(TokenKind::Semicolon),
            ',' => Some(TokenKind::Comma),
            ':' => Some(TokenKind::Colon),
            '+' => Some(TokenKind::Plus),
            _ => None,
        };
        if let Some(kind) = simple {
            tokens.push(Token { kind, line });
            pos += 1;
            continue;
        }

        if c == '-' && next == Some('>') {
            tokens.push(Token {
                kind: TokenKind::Arrow,
                line,
            });
            pos += 2;
            continue;
        }
        if c == '-' && next == Some('-') {
            tokens.push(Token {
                kind: TokenKind::Line,
                line,
            });
            pos += 2;
            continue;
        }

        if c == '"' {
            let start_line = line;
            let mut text = String::new();
            pos += 1;
            loop {
                match chars.get(pos) {
                    Some('"') => {
                        pos += 1;
                        break;
                    }
                    Some('\\') if chars.get(pos + 1) == Some(&'"') => {
                        text.push('"');
                        pos += 2;
                    }
                    // Escaped line continuation
                    Some('\\') if chars.get(pos + 1) == Some(&'\n') => {
                        line += 1;
                        pos += 2;
                    }
                    Some(ch) => {
                        if *ch == '\n' {
                            line += 1;
                        }
                        text.push(*ch);
                        pos += 1;
                    }
                    None => return Err(ParserError::parse(start_line, "unterminated string")),
                }
            }
            tokens.push(Token {
                kind: TokenKind::Id { text, quoted: true },
                line: start_line,
            });
            continue;
        }

        if c == '<' {
            return Err(ParserError::parse(line, "HTML strings are not supported"));
        }

        if is_numeral_start(c, next) {
            let start = pos;
            pos += 1;
            while pos < chars.len() && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Id {
                    text: chars[start..pos].iter().collect(),
                    quoted: false,
                },
                line,
            });
            continue;
        }

        if is_id_start(c) {
            let start = pos;
            while pos < chars.len() && is_id_continue(chars[pos]) {
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Id {
                    text: chars[start..pos].iter().collect(),
                    quoted: false,
                },
                line,
            });
            continue;
        }

        return Err(ParserError::parse(line, format!("unexpected character {c:?}")));
    }

    Ok(tokens)
}

fn is_numeral_start(c: char, next: Option<char>) -> bool {
    c.is_ascii_digit()
        || (c == '.' && next.is_some_and(|n| n.is_ascii_digit()))
        || (c == '-' && next.is_some_and(|n| n.is_ascii_digit() || n == '.'))
}

fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

//! Brace-nested key/value text shared by both material grammars
//!
//! ```text
//! "Layer0"
//! {
//!     "g_flWearAmount" "0.15"   // comment
//!     "Compiled Textures" { "g_tColor" "materials/x.vtex" }
//! }
//! ```
//!
//! Keys and values may be quoted or bare. A bare token may embed a quoted
//! section (`resource:"materials/x.vtex"`), which stays part of the token.
//! The `key = value` form is accepted too: a bracketed scalar list
//! (`[0.5, 0.5, 1.0]`) is one token and a bracketed list of blocks reads as
//! a block of anonymous entries.

use super::material_parser::ParseError;

/// One `key value` or `key { ... }` entry
#[derive(Debug, Clone, PartialEq)]
pub struct KvPair {
    /// Entry key
    pub key: String,
    /// Entry value
    pub value: KvValue,
}

/// Value side of a [`KvPair`]
#[derive(Debug, Clone, PartialEq)]
pub enum KvValue {
    /// Scalar text
    Text(String),
    /// Nested block
    Block(Vec<KvPair>),
}

impl KvPair {
    /// Child entries if this is a block
    pub fn children(&self) -> Option<&[KvPair]> {
        match &self.value {
            KvValue::Block(children) => Some(children),
            KvValue::Text(_) => None,
        }
    }

    /// Scalar text if this is a text entry
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            KvValue::Text(text) => Some(text),
            KvValue::Block(_) => None,
        }
    }
}

/// Look up the first text child whose key matches one of `keys` (case-insensitive)
pub fn find_text<'a>(children: &'a [KvPair], keys: &[&str]) -> Option<&'a str> {
    children.iter().find_map(|pair| {
        let text = pair.text()?;
        keys.iter().any(|k| pair.key.eq_ignore_ascii_case(k)).then_some(text)
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Str { text: String, quoted: bool },
    Open,
    Close,
}

/// Parse a whole document into its top-level entries
pub fn parse_document(source: &str) -> Result<Vec<KvPair>, ParseError> {
    let tokens = tokenize(source)?;
    let mut cursor = 0;
    let pairs = parse_pairs(&tokens, &mut cursor, 0)?;
    if cursor < tokens.len() {
        return Err(ParseError::UnbalancedBraces);
    }
    Ok(pairs)
}

fn parse_pairs(tokens: &[Token], cursor: &mut usize, depth: usize) -> Result<Vec<KvPair>, ParseError> {
    let mut pairs = Vec::new();
    while *cursor < tokens.len() {
        let key = match &tokens[*cursor] {
            Token::Close => {
                if depth == 0 {
                    return Err(ParseError::UnbalancedBraces);
                }
                *cursor += 1;
                return Ok(pairs);
            }
            Token::Open => {
                // Anonymous block, e.g. a bare `{` after a header line
                *cursor += 1;
                let children = parse_pairs(tokens, cursor, depth + 1)?;
                pairs.push(KvPair { key: String::new(), value: KvValue::Block(children) });
                continue;
            }
            Token::Str { text, .. } => text.clone(),
        };
        *cursor += 1;

        // `key = value` separators
        if matches!(tokens.get(*cursor), Some(Token::Str { text, quoted: false }) if text == "=") {
            *cursor += 1;
        }

        let value = match tokens.get(*cursor) {
            Some(Token::Str { text, .. }) => {
                *cursor += 1;
                KvValue::Text(text.clone())
            }
            Some(Token::Open) => {
                *cursor += 1;
                KvValue::Block(parse_pairs(tokens, cursor, depth + 1)?)
            }
            Some(Token::Close) | None => {
                return Err(ParseError::UnexpectedToken(format!("key '{key}' has no value")));
            }
        };
        pairs.push(KvPair { key, value });

        // Platform conditionals such as [$WIN32] trail a value
        while let Some(Token::Str { text, quoted: false }) = tokens.get(*cursor) {
            if text.starts_with("[$") || text.starts_with("[!$") {
                *cursor += 1;
            } else {
                break;
            }
        }
    }
    if depth > 0 {
        return Err(ParseError::UnbalancedBraces);
    }
    Ok(pairs)
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() || c == ',' => {
                chars.next();
            }
            '[' if opens_block_array(&chars) => {
                chars.next();
                tokens.push(Token::Open);
            }
            ']' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '[' if !is_conditional(&chars) => {
                let mut text = String::new();
                for c in chars.by_ref() {
                    text.push(c);
                    if c == ']' {
                        break;
                    }
                }
                if !text.ends_with(']') {
                    return Err(ParseError::UnbalancedBraces);
                }
                tokens.push(Token::Str { text, quoted: false });
            }
            '{' => {
                chars.next();
                tokens.push(Token::Open);
            }
            '}' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '/' if starts_comment(&chars) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '"' => {
                chars.next();
                let text = read_quoted(&mut chars)?;
                tokens.push(Token::Str { text, quoted: true });
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '{' || c == '}' {
                        break;
                    }
                    chars.next();
                    if c == '"' {
                        text.push('"');
                        text.push_str(&read_quoted(&mut chars)?);
                        text.push('"');
                    } else {
                        text.push(c);
                    }
                }
                tokens.push(Token::Str { text, quoted: false });
            }
        }
    }
    Ok(tokens)
}

/// `[` whose contents hold blocks rather than scalars
fn opens_block_array(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    let mut lookahead = chars.clone();
    lookahead.next();
    for c in lookahead {
        match c {
            '{' => return true,
            ']' | '"' => return false,
            _ => {}
        }
    }
    false
}

/// `[$WIN32]` style platform conditional
fn is_conditional(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    let mut lookahead = chars.clone();
    lookahead.next();
    matches!(lookahead.next(), Some('$' | '!'))
}

fn starts_comment(chars: &std::iter::Peekable<std::str::Chars<'_>>) -> bool {
    let mut lookahead = chars.clone();
    lookahead.next();
    lookahead.next() == Some('/')
}

/// Read up to the closing quote; the opening quote is already consumed
fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String, ParseError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(text),
            Some('\\') => match chars.peek() {
                Some('"') => {
                    text.push('"');
                    chars.next();
                }
                Some('\\') => {
                    text.push('\\');
                    chars.next();
                }
                _ => text.push('\\'),
            },
            Some(c) => text.push(c),
            None => return Err(ParseError::UnterminatedString),
        }
    }
}

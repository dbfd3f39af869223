use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Null,
    Number,
    Identifier,
    String,
    // Keywords
    NewAvenger,
    NewEternal,
    Worthy,
    Otherwise,
    FightUntil,
    EndGame,
    Team,
    Multiverse,
    Madness,
    Default,
    WakandaForEach,
    WakandaFor,
    Assemble,
    Snap,
    In,
    To,
    Step,
    /// Mainstream keyword spelling (`if`, `let`, ...) that is not part of the language.
    Reserved,
    // Operators and punctuation
    Minus,
    Equals,
    CompoundAssign,
    Semicolon,
    Comma,
    Dot,
    Colon,
    BinaryOperator,
    LogicalOperator,
    ComparisonOperator,
    Not,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
        }
    }
}

lazy_static! {
    static ref RE_NUMBER: Regex = Regex::new(r"^[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?").unwrap();
    static ref RE_IDENT: Regex = Regex::new(r"^[\p{Alphabetic}_][\p{Alphabetic}0-9_]*").unwrap();
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut m = HashMap::new();
        m.insert("null", TokenKind::Null);
        m.insert("newAvenger", TokenKind::NewAvenger);
        m.insert("newEternal", TokenKind::NewEternal);
        m.insert("ifWorthy", TokenKind::Worthy);
        m.insert("otherwise", TokenKind::Otherwise);
        m.insert("fightUntil", TokenKind::FightUntil);
        m.insert("endGame", TokenKind::EndGame);
        m.insert("team", TokenKind::Team);
        m.insert("multiverse", TokenKind::Multiverse);
        m.insert("madness", TokenKind::Madness);
        m.insert("default", TokenKind::Default);
        m.insert("wakandaForEach", TokenKind::WakandaForEach);
        m.insert("wakandaFor", TokenKind::WakandaFor);
        m.insert("assemble", TokenKind::Assemble);
        m.insert("snap", TokenKind::Snap);
        m.insert("in", TokenKind::In);
        m.insert("to", TokenKind::To);
        m.insert("step", TokenKind::Step);
        m.insert("and", TokenKind::LogicalOperator);
        m.insert("or", TokenKind::LogicalOperator);
        for word in RESERVED {
            m.insert(word, TokenKind::Reserved);
        }
        m
    };
}

const RESERVED: [&str; 12] = [
    "if", "else", "while", "for", "switch", "case", "let", "const", "return", "break", "true",
    "false",
];

/// Longest spellings first so `<MINUS>` wins over `<` and `+=` over `+`.
const SYMBOLS: &[(&str, TokenKind)] = &[
    ("<MINUS>", TokenKind::Minus),
    ("<=", TokenKind::ComparisonOperator),
    (">=", TokenKind::ComparisonOperator),
    ("==", TokenKind::ComparisonOperator),
    ("!=", TokenKind::ComparisonOperator),
    ("&&", TokenKind::LogicalOperator),
    ("||", TokenKind::LogicalOperator),
    ("+=", TokenKind::CompoundAssign),
    ("-=", TokenKind::CompoundAssign),
    ("*=", TokenKind::CompoundAssign),
    ("/=", TokenKind::CompoundAssign),
    ("%=", TokenKind::CompoundAssign),
    ("^=", TokenKind::CompoundAssign),
    ("<", TokenKind::ComparisonOperator),
    (">", TokenKind::ComparisonOperator),
    ("=", TokenKind::Equals),
    ("!", TokenKind::Not),
    ("+", TokenKind::BinaryOperator),
    ("-", TokenKind::BinaryOperator),
    ("*", TokenKind::BinaryOperator),
    ("/", TokenKind::BinaryOperator),
    ("%", TokenKind::BinaryOperator),
    ("^", TokenKind::BinaryOperator),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    (".", TokenKind::Dot),
    (":", TokenKind::Colon),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("{", TokenKind::OpenBrace),
    ("}", TokenKind::CloseBrace),
    ("[", TokenKind::OpenBracket),
    ("]", TokenKind::CloseBracket),
];

/// Splits `source` into tokens, always terminated by an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut line = 1;
    let mut pos = 0;

    while let Some(ch) = source[pos..].chars().next() {
        let rest = &source[pos..];
        match ch {
            '\n' => {
                line += 1;
                pos += 1;
            }
            ' ' | '\t' | '\r' => pos += 1,
            // $ comment $; an unclosed comment runs to the end of input
            '$' => {
                let len = rest[1..].find('$').map_or(rest.len(), |end| end + 2);
                line += rest[..len].matches('\n').count();
                pos += len;
            }
            '"' => {
                let close = rest[1..]
                    .find('"')
                    .ok_or_else(|| SyntaxError::new(line, "unterminated string literal"))?;
                let text = &rest[1..1 + close];
                tokens.push(Token::new(TokenKind::String, text, line));
                line += text.matches('\n').count();
                pos += close + 2;
            }
            _ => {
                if let Some(m) = RE_NUMBER.find(rest) {
                    tokens.push(Token::new(TokenKind::Number, m.as_str(), line));
                    pos += m.end();
                } else if let Some(m) = RE_IDENT.find(rest) {
                    let word = m.as_str();
                    let kind = KEYWORDS.get(word).copied().unwrap_or(TokenKind::Identifier);
                    tokens.push(Token::new(kind, word, line));
                    pos += m.end();
                } else if let Some((symbol, kind)) =
                    SYMBOLS.iter().find(|(symbol, _)| rest.starts_with(symbol))
                {
                    tokens.push(Token::new(*kind, *symbol, line));
                    pos += symbol.len();
                } else {
                    return Err(SyntaxError::new(line, format!("unrecognized character '{}'", ch)));
                }
            }
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "EndOfFile", line));
    Ok(tokens)
}

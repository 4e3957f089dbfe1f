//! Source structurer for BareBones programs
//!
//! Turns raw source text into an ordered, addressable [`Program`]:
//!
//! 1. The text is split into fragments on `;`, ignoring separators inside
//!    double-quoted strings and dropping `#` comments
//! 2. Each fragment is split on whitespace; a token that opens a quoted string is
//!    re-merged with the following tokens until the string closes
//! 3. The first token becomes the statement's operation, the rest its arguments
//!
//! Block boundaries (`while`/`if`/`elif`/`else`/`func` ... `end`) are matched once
//! when the program is built, so jump targets are plain addresses at run time.

use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod semantic_validator;

#[cfg(test)]
mod tests;

/* ===================== Error Types ===================== */

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A token opened a double-quoted string that never closes
    #[error("unterminated string literal on line {line}: {fragment}")]
    UnterminatedString { line: usize, fragment: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

/* ===================== Keywords ===================== */

/// Reserved operation keywords of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Print,
    Incr,
    Decr,
    Copy,
    Set,
    Clear,
    Init,
    While,
    If,
    Elif,
    Else,
    End,
    Func,
    Return,
    Eval,
    To,
    Not,
    Do,
}

impl Keyword {
    pub const ALL: [Keyword; 18] = [
        Keyword::Print,
        Keyword::Incr,
        Keyword::Decr,
        Keyword::Copy,
        Keyword::Set,
        Keyword::Clear,
        Keyword::Init,
        Keyword::While,
        Keyword::If,
        Keyword::Elif,
        Keyword::Else,
        Keyword::End,
        Keyword::Func,
        Keyword::Return,
        Keyword::Eval,
        Keyword::To,
        Keyword::Not,
        Keyword::Do,
    ];

    pub fn parse(word: &str) -> Option<Keyword> {
        let keyword = match word {
            "print" => Keyword::Print,
            "incr" => Keyword::Incr,
            "decr" => Keyword::Decr,
            "copy" => Keyword::Copy,
            "set" => Keyword::Set,
            "clear" => Keyword::Clear,
            "init" => Keyword::Init,
            "while" => Keyword::While,
            "if" => Keyword::If,
            "elif" => Keyword::Elif,
            "else" => Keyword::Else,
            "end" => Keyword::End,
            "func" => Keyword::Func,
            "return" => Keyword::Return,
            "eval" => Keyword::Eval,
            "to" => Keyword::To,
            "not" => Keyword::Not,
            "do" => Keyword::Do,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Print => "print",
            Keyword::Incr => "incr",
            Keyword::Decr => "decr",
            Keyword::Copy => "copy",
            Keyword::Set => "set",
            Keyword::Clear => "clear",
            Keyword::Init => "init",
            Keyword::While => "while",
            Keyword::If => "if",
            Keyword::Elif => "elif",
            Keyword::Else => "else",
            Keyword::End => "end",
            Keyword::Func => "func",
            Keyword::Return => "return",
            Keyword::Eval => "eval",
            Keyword::To => "to",
            Keyword::Not => "not",
            Keyword::Do => "do",
        }
    }

    /// Keywords that open a block closed by `end`
    pub fn opens_block(self) -> bool {
        matches!(
            self,
            Keyword::While | Keyword::If | Keyword::Elif | Keyword::Else | Keyword::Func
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ===================== Statement Model ===================== */

/// One parsed instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// First token of the statement
    pub operation: String,
    /// Remaining tokens, quoted strings already merged into single tokens
    pub arguments: Vec<String>,
    /// All tokens joined by single spaces
    pub text: String,
    /// 1-based source line where the statement starts
    pub line: usize,
}

impl Statement {
    /// Build a statement from its tokens. Returns `None` for an empty token list.
    pub fn from_tokens(mut tokens: Vec<String>, line: usize) -> Option<Statement> {
        if tokens.is_empty() {
            return None;
        }
        let text = tokens.join(" ");
        let operation = tokens.remove(0);
        Some(Statement {
            operation,
            arguments: tokens,
            text,
            line,
        })
    }

    pub fn keyword(&self) -> Option<Keyword> {
        Keyword::parse(&self.operation)
    }

    pub fn opens_block(&self) -> bool {
        self.keyword().is_some_and(Keyword::opens_block)
    }

    pub fn closes_block(&self) -> bool {
        self.keyword() == Some(Keyword::End)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/* ===================== Program ===================== */

/// Immutable, addressable statement sequence
///
/// Addresses are indices into `statements` and stay stable for the lifetime of
/// the program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    statements: Vec<Rc<Statement>>,
    /// `block_ends[a]` is the address of the `end` closing the opener at `a`
    block_ends: Vec<Option<usize>>,
}

impl Program {
    /// Structure source text into a program
    pub fn parse(source: &str) -> ParseResult<Program> {
        let mut statements = Vec::new();
        for fragment in split_fragments(source) {
            let tokens = tokenize(&fragment)?;
            if let Some(statement) = Statement::from_tokens(tokens, fragment.line) {
                statements.push(statement);
            }
        }
        Ok(Program::from_statements(statements))
    }

    pub fn from_statements(statements: Vec<Statement>) -> Program {
        let statements: Vec<Rc<Statement>> = statements.into_iter().map(Rc::new).collect();
        let block_ends = match_blocks(&statements);
        Program {
            statements,
            block_ends,
        }
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn get(&self, address: usize) -> Option<&Rc<Statement>> {
        self.statements.get(address)
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().map(|s| s.as_ref())
    }

    /// Address of the `end` matching the block opener at `address`
    ///
    /// `None` when `address` is not an opener or the program ends before the
    /// block is closed.
    pub fn block_end(&self, address: usize) -> Option<usize> {
        self.block_ends.get(address).copied().flatten()
    }

    /// Copy the statements in `range` into a program of their own
    pub fn slice(&self, range: Range<usize>) -> Program {
        let statements = self.statements[range]
            .iter()
            .map(|s| Statement::clone(s))
            .collect();
        Program::from_statements(statements)
    }

    /// Source text that reparses to this program
    pub fn source_text(&self) -> String {
        self.statements
            .iter()
            .map(|s| format!("{};\n", s.text))
            .collect()
    }
}

impl Serialize for Program {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.statements.iter().map(|s| s.as_ref()))
    }
}

impl<'de> Deserialize<'de> for Program {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let statements = Vec::<Statement>::deserialize(deserializer)?;
        Ok(Program::from_statements(statements))
    }
}

/* ===================== Block Matcher ===================== */

/// Match every block opener with its closing `end` by depth counting
///
/// Openers push their address; each `end` closes the innermost open block.
/// An `end` with no open block is left alone, and openers still open when the
/// sequence runs out have no match.
fn match_blocks(statements: &[Rc<Statement>]) -> Vec<Option<usize>> {
    let mut ends = vec![None; statements.len()];
    let mut open: Vec<usize> = Vec::new();

    for (address, statement) in statements.iter().enumerate() {
        if statement.opens_block() {
            open.push(address);
        } else if statement.closes_block() {
            if let Some(opener) = open.pop() {
                ends[opener] = Some(address);
            }
        }
    }

    ends
}

/* ===================== Structurer ===================== */

/// Raw statement text with the line it starts on
#[derive(Debug, Clone, PartialEq)]
struct Fragment {
    text: String,
    line: usize,
}

/// Split source into statement fragments
///
/// `;` outside double quotes separates statements. A `#` that is the first
/// non-blank character of a line or of a fragment comments out the rest of
/// that line. Blank fragments are dropped.
fn split_fragments(source: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut start_line: Option<usize> = None;
    let mut line = 1;
    let mut in_quote = false;
    let mut in_comment = false;
    let mut prev: Option<char> = None;

    for c in source.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
                line += 1;
                current.push(c);
            }
            prev = Some(c);
            continue;
        }

        match c {
            '"' if prev != Some('\\') => in_quote = !in_quote,
            ';' if !in_quote => {
                push_fragment(&mut fragments, &mut current, start_line.take());
                prev = Some(c);
                continue;
            }
            '#' if !in_quote && at_line_start(&current) => {
                in_comment = true;
                prev = Some(c);
                continue;
            }
            _ => {}
        }

        if c == '\n' {
            line += 1;
        } else if !c.is_whitespace() && start_line.is_none() {
            start_line = Some(line);
        }
        current.push(c);
        prev = Some(c);
    }
    push_fragment(&mut fragments, &mut current, start_line);

    fragments
}

/// True when nothing but whitespace precedes the cursor on the current line of
/// the fragment being built
fn at_line_start(current: &str) -> bool {
    let tail = current.rsplit('\n').next().unwrap_or("");
    tail.chars().all(char::is_whitespace)
}

fn push_fragment(fragments: &mut Vec<Fragment>, current: &mut String, line: Option<usize>) {
    let text = std::mem::take(current);
    if let Some(line) = line {
        if !text.trim().is_empty() {
            fragments.push(Fragment { text, line });
        }
    }
}

/// Split a fragment into tokens, merging quoted strings that contain spaces
fn tokenize(fragment: &Fragment) -> ParseResult<Vec<String>> {
    let words: Vec<&str> = fragment.text.split_whitespace().collect();
    let mut tokens = Vec::with_capacity(words.len());
    let mut i = 0;

    while i < words.len() {
        let word = words[i];
        if opens_string(word) {
            let mut merged = word.to_string();
            loop {
                i += 1;
                let Some(next) = words.get(i) else {
                    return Err(ParseError::UnterminatedString {
                        line: fragment.line,
                        fragment: fragment.text.trim().to_string(),
                    });
                };
                merged.push(' ');
                merged.push_str(next);
                if ends_string(next) {
                    break;
                }
            }
            tokens.push(merged);
        } else {
            tokens.push(word.to_string());
        }
        i += 1;
    }

    Ok(tokens)
}

/// A token that starts a quoted string without closing it
fn opens_string(word: &str) -> bool {
    word.starts_with('"') && !(word.len() >= 2 && ends_string(word))
}

/// A token ending in an unescaped double quote
fn ends_string(word: &str) -> bool {
    word.ends_with('"') && !word.ends_with("\\\"")
}

//! Phrase exclusion analysis
//!
//! The model is asked for a list-of-strings literal naming the phrases that
//! must survive translation untouched. Its reply is untrusted free text: the
//! first bracketed span is located with a regex and handed to a small
//! dedicated parser that only understands quoted strings. Any deviation
//! degrades to an empty list.

use regex::Regex;
use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, warn};

use crate::core::client::TextGenerator;
use crate::core::models::Language;
use crate::core::prompts;

/// First `[`…`]` span, non-greedy, across newlines
fn list_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\[.*?\]").expect("static pattern compiles"))
}

/// Why a model reply could not be read as a phrase list
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExclusionParseError {
    #[error("no bracketed list in response")]
    NoListFound,

    #[error("syntax error at byte {position}: {message}")]
    Syntax {
        position: usize,
        message: String,
    },
}

/// Extract the phrase list from a raw model reply
pub fn parse_exclusion_response(response: &str) -> Result<Vec<String>, ExclusionParseError> {
    let span = list_pattern()
        .find(response)
        .ok_or(ExclusionParseError::NoListFound)?;
    parse_string_list(span.as_str())
}

/// Parse a `['a', "b", ]` literal. Only quoted strings are accepted.
pub fn parse_string_list(input: &str) -> Result<Vec<String>, ExclusionParseError> {
    let mut parser = ListParser {
        input,
        chars: input.char_indices().peekable(),
    };
    parser.list()
}

struct ListParser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> ListParser<'a> {
    fn list(&mut self) -> Result<Vec<String>, ExclusionParseError> {
        let mut items = Vec::new();
        self.expect('[')?;
        self.skip_whitespace();

        if self.eat(']') {
            return self.finish(items);
        }

        loop {
            items.push(self.string()?);
            self.skip_whitespace();

            if self.eat(']') {
                break;
            }
            self.expect(',')?;
            self.skip_whitespace();
            // trailing comma
            if self.eat(']') {
                break;
            }
        }

        self.finish(items)
    }

    fn finish(&mut self, items: Vec<String>) -> Result<Vec<String>, ExclusionParseError> {
        self.skip_whitespace();
        match self.chars.peek() {
            None => Ok(items),
            Some(&(pos, _)) => Err(self.error(pos, "unexpected trailing characters")),
        }
    }

    fn string(&mut self) -> Result<String, ExclusionParseError> {
        let (start, quote) = match self.chars.next() {
            Some((pos, c)) if c == '"' || c == '\'' => (pos, c),
            Some((pos, c)) => return Err(self.error(pos, &format!("expected string, found '{}'", c))),
            None => return Err(self.error(self.input.len(), "expected string")),
        };

        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => return Err(self.error(start, "unterminated string")),
                Some((_, c)) if c == quote => return Ok(value),
                Some((pos, '\n')) => return Err(self.error(pos, "newline in string")),
                Some((pos, '\\')) => self.escape(pos, &mut value)?,
                Some((_, c)) => value.push(c),
            }
        }
    }

    fn escape(&mut self, pos: usize, out: &mut String) -> Result<(), ExclusionParseError> {
        let (_, c) = self
            .chars
            .next()
            .ok_or_else(|| self.error(pos, "dangling escape"))?;
        match c {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'x' => out.push(self.hex_char(pos, 2)?),
            'u' => out.push(self.hex_char(pos, 4)?),
            'U' => out.push(self.hex_char(pos, 8)?),
            // unknown escapes keep the backslash
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_char(&mut self, pos: usize, digits: usize) -> Result<char, ExclusionParseError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or_else(|| self.error(pos, "truncated hex escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error(pos, "escape is not a valid character"))
    }

    fn expect(&mut self, expected: char) -> Result<(), ExclusionParseError> {
        match self.chars.next() {
            Some((_, c)) if c == expected => Ok(()),
            Some((pos, c)) => Err(self.error(pos, &format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(self.input.len(), &format!("expected '{}'", expected))),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn error(&self, position: usize, message: &str) -> ExclusionParseError {
        ExclusionParseError::Syntax {
            position,
            message: message.to_string(),
        }
    }
}

/// Remove every occurrence of each phrase, in list order
pub fn remove_phrases(text: &str, phrases: &[String]) -> String {
    phrases
        .iter()
        .filter(|phrase| !phrase.is_empty())
        .fold(text.to_string(), |reduced, phrase| reduced.replace(phrase.as_str(), ""))
}

/// Asks the model which phrases must stay untranslated
#[derive(Debug, Clone)]
pub struct ExclusionAnalyzer {
    generator: Arc<dyn TextGenerator>,
}

impl ExclusionAnalyzer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Best effort: any failure yields an empty list
    pub async fn find_exclusions(&self, text: &str, source: Language) -> Vec<String> {
        let prompt = prompts::exclusion_prompt(text, source);

        let response = match self.generator.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error identifying non-translatable phrases: {}", e);
                return Vec::new();
            }
        };

        match parse_exclusion_response(&response) {
            Ok(phrases) => {
                debug!("Model flagged {} phrases to keep verbatim", phrases.len());
                phrases
            }
            Err(e) => {
                warn!("Ignoring unparsable exclusion list: {}", e);
                Vec::new()
            }
        }
    }
}

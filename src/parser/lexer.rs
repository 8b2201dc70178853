//! Logos-based lexer for PHP
//!
//! Logos handles the PHP-mode token set. The wrapper switches between inline
//! HTML and PHP code on `<?php` / `?>`, demotes keywords used as member names
//! back to identifiers, and stops tokenizing after `__halt_compiler();`.

use super::keywords::keyword_kind;
use super::syntax_kind::SyntaxKind;
use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Html,
    Php,
    /// Everything after `__halt_compiler();`
    Data,
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    mode: Mode,
    inner: Option<logos::Lexer<'a, LogosToken>>,
    base: usize,
    last_significant: Option<SyntaxKind>,
    halting: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            mode: Mode::Html,
            inner: None,
            base: 0,
            last_significant: None,
            halting: false,
        }
    }

    fn token(&mut self, kind: SyntaxKind, end: usize) -> Token<'a> {
        let start = self.pos;
        self.pos = end;
        if !kind.is_trivia() {
            self.last_significant = Some(kind);
        }
        Token {
            kind,
            text: &self.input[start..end],
            offset: TextSize::new(start as u32),
        }
    }

    fn enter_php(&mut self) {
        self.mode = Mode::Php;
        self.base = self.pos;
        self.inner = Some(LogosToken::lexer(&self.input[self.pos..]));
    }

    fn next_html(&mut self) -> Token<'a> {
        let rest = &self.input[self.pos..];
        let mut search = 0;
        while let Some(found) = rest[search..].find("<?") {
            let at = search + found;
            if let Some(tag_len) = open_tag_len(&rest[at..]) {
                if at > 0 {
                    return self.token(SyntaxKind::INLINE_HTML, self.pos + at);
                }
                let kind = if rest.starts_with("<?=") {
                    SyntaxKind::OPEN_TAG_ECHO
                } else {
                    SyntaxKind::OPEN_TAG
                };
                let token = self.token(kind, self.pos + tag_len);
                self.enter_php();
                return token;
            }
            search = at + 2;
        }
        self.token(SyntaxKind::INLINE_HTML, self.input.len())
    }

    fn next_php(&mut self) -> Option<Token<'a>> {
        let inner = self.inner.as_mut()?;
        let result = inner.next()?;
        let span = inner.span();
        let end = self.base + span.end;
        let text = &self.input[self.pos..end];

        let kind = match result {
            Ok(LogosToken::Ident) if text.contains('\\') => {
                let first = text.split('\\').next().unwrap_or_default();
                if first.eq_ignore_ascii_case("namespace") {
                    SyntaxKind::NAME_RELATIVE
                } else {
                    SyntaxKind::NAME_QUALIFIED
                }
            }
            Ok(LogosToken::Ident) => self.classify_ident(text),
            Ok(LogosToken::Backslash) if text.len() > 1 => SyntaxKind::NAME_FULLY_QUALIFIED,
            Ok(LogosToken::Question) if text.starts_with("?>") => SyntaxKind::CLOSE_TAG,
            Ok(LogosToken::Question) if text == "?->" => SyntaxKind::NULLSAFE_ARROW,
            Ok(LogosToken::Dot) if text == "..." => SyntaxKind::ELLIPSIS,
            Ok(LogosToken::Dot) if text.len() > 1 && text != ".=" => SyntaxKind::NUMBER,
            Ok(LogosToken::BlockComment) if is_doc_comment(text) => SyntaxKind::DOC_COMMENT,
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        let token = self.token(kind, end);
        match kind {
            SyntaxKind::CLOSE_TAG if self.halting => self.mode = Mode::Data,
            SyntaxKind::CLOSE_TAG => {
                self.mode = Mode::Html;
                self.inner = None;
            }
            SyntaxKind::HALT_COMPILER_KW => self.halting = true,
            SyntaxKind::SEMICOLON if self.halting => self.mode = Mode::Data,
            _ => {}
        }
        Some(token)
    }

    fn classify_ident(&self, text: &str) -> SyntaxKind {
        let member_position = matches!(
            self.last_significant,
            Some(
                SyntaxKind::ARROW
                    | SyntaxKind::NULLSAFE_ARROW
                    | SyntaxKind::COLON_COLON
                    | SyntaxKind::FUNCTION_KW
                    | SyntaxKind::CONST_KW
            )
        );
        if member_position {
            return SyntaxKind::IDENT;
        }
        keyword_kind(text).unwrap_or(SyntaxKind::IDENT)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.input.len() {
            return None;
        }
        match self.mode {
            Mode::Html => Some(self.next_html()),
            Mode::Php => match self.next_php() {
                Some(token) => Some(token),
                // logos stopped early; keep the stream lossless
                None if self.pos < self.input.len() => {
                    Some(self.token(SyntaxKind::ERROR, self.input.len()))
                }
                None => None,
            },
            Mode::Data => Some(self.token(SyntaxKind::INLINE_HTML, self.input.len())),
        }
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Length of the open tag at the start of `text`, including the single
/// whitespace character PHP folds into it.
fn open_tag_len(text: &str) -> Option<usize> {
    if text.starts_with("<?=") {
        return Some(3);
    }
    let is_long = text.len() >= 5 && text[..5].eq_ignore_ascii_case("<?php");
    let tag = if is_long { 5 } else { 2 };
    let rest = &text[tag..];
    if rest.starts_with("\r\n") {
        Some(tag + 2)
    } else if rest.starts_with([' ', '\t', '\n', '\r']) {
        Some(tag + 1)
    } else if rest.is_empty() && is_long {
        Some(tag)
    } else {
        None
    }
}

fn is_doc_comment(text: &str) -> bool {
    text.len() > 4 && text.starts_with("/**") && text[3..].starts_with(|c: char| c.is_whitespace())
}

fn line_comment(lex: &mut logos::Lexer<LogosToken>) {
    let rest = lex.remainder();
    let bytes = rest.as_bytes();
    let mut len = 0;
    while len < bytes.len() {
        match bytes[len] {
            b'\n' | b'\r' => break,
            b'?' if bytes.get(len + 1) == Some(&b'>') => break,
            _ => len += 1,
        }
    }
    lex.bump(len);
}

fn block_comment(lex: &mut logos::Lexer<LogosToken>) {
    let rest = lex.remainder();
    let len = rest.find("*/").map(|at| at + 2).unwrap_or(rest.len());
    lex.bump(len);
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

/// Length of the `\Segment` parts following a name (or a leading backslash).
fn name_tail_len(rest: &str, leading_segment: bool) -> usize {
    let mut len = 0;
    let mut expect_separator = !leading_segment;
    loop {
        let tail = &rest[len..];
        let separator = usize::from(expect_separator);
        if expect_separator && !tail.starts_with('\\') {
            return len;
        }
        let segment = &tail[separator..];
        if !segment.starts_with(is_name_start) {
            return len;
        }
        let segment_len = segment.find(|c: char| !is_name_char(c)).unwrap_or(segment.len());
        len += separator + segment_len;
        expect_separator = true;
    }
}

fn name_tail(lex: &mut logos::Lexer<LogosToken>) {
    let len = name_tail_len(lex.remainder(), false);
    lex.bump(len);
}

fn fully_qualified_name(lex: &mut logos::Lexer<LogosToken>) {
    let len = name_tail_len(lex.remainder(), true);
    lex.bump(len);
}

/// `?`, `?->` and the `?>` close tag (which swallows one newline)
fn question(lex: &mut logos::Lexer<LogosToken>) {
    let rest = lex.remainder();
    if rest.starts_with("->") {
        lex.bump(2);
    } else if rest.starts_with('>') {
        let newline = if rest[1..].starts_with("\r\n") {
            2
        } else if rest[1..].starts_with('\n') {
            1
        } else {
            0
        };
        lex.bump(1 + newline);
    }
}

/// `.`, `.=`, `...` and floats like `.5`
fn dot(lex: &mut logos::Lexer<LogosToken>) {
    let rest = lex.remainder();
    if rest.starts_with("..") {
        lex.bump(2);
    } else if rest.starts_with('=') {
        lex.bump(1);
    } else if rest.starts_with(|c: char| c.is_ascii_digit()) {
        let digits = rest.find(|c: char| !(c.is_ascii_digit() || c == '_')).unwrap_or(rest.len());
        let mut len = digits;
        let exponent = &rest[len..];
        if exponent.starts_with(['e', 'E']) {
            let sign = usize::from(exponent[1..].starts_with(['+', '-']));
            let after = &exponent[1 + sign..];
            let exp_digits = after.find(|c: char| !(c.is_ascii_digit() || c == '_')).unwrap_or(after.len());
            if exp_digits > 0 {
                len += 1 + sign + exp_digits;
            }
        }
        lex.bump(len);
    }
}

/// Consume a heredoc or nowdoc body after `<<<`.
fn heredoc(lex: &mut logos::Lexer<LogosToken>) -> bool {
    let rest = lex.remainder();
    let header = rest.trim_start_matches([' ', '\t']);
    let mut consumed = rest.len() - header.len();
    let quote = header.chars().next().filter(|c| *c == '\'' || *c == '"');
    let label_start = quote.map_or(0, |_| 1);
    let label_len = header[label_start..]
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || !c.is_ascii()))
        .unwrap_or(header.len() - label_start);
    if label_len == 0 {
        return false;
    }
    let label = &header[label_start..label_start + label_len];
    consumed += label_start + label_len + quote.map_or(0, |_| 1);

    let body = &rest[consumed..];
    let Some(newline) = body.find('\n') else {
        return false;
    };
    let mut offset = newline + 1;
    while offset <= body.len() {
        let line = &body[offset..];
        let trimmed = line.trim_start_matches([' ', '\t']);
        let indent = line.len() - trimmed.len();
        if let Some(after) = trimmed.strip_prefix(label) {
            let terminated = !after.starts_with(|c: char| c.is_alphanumeric() || c == '_' || !c.is_ascii());
            if terminated {
                lex.bump(consumed + offset + indent + label.len());
                return true;
            }
        }
        match line.find('\n') {
            Some(next) => offset += next + 1,
            None => break,
        }
    }
    lex.bump(rest.len());
    true
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[token("//", line_comment)]
    #[token("#", line_comment)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    // =========================================================================
    // NAMES AND LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*", name_tail)]
    Ident,

    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*")]
    Variable,

    #[regex(r"'([^'\\]|\\[\x00-\x{10FFFF}])*'")]
    #[regex(r#""([^"\\]|\\[\x00-\x{10FFFF}])*""#)]
    #[regex(r"`([^`\\]|\\[\x00-\x{10FFFF}])*`")]
    String,

    #[token("<<<", heredoc)]
    Heredoc,

    #[regex(r"[0-9][0-9_]*")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9_]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9_]+")]
    Number,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("#[")]
    AttrOpen,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("=")]
    Eq,
    #[token("?", question)]
    Question,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token(".", dot)]
    Dot,
    #[token("\\", fully_qualified_name)]
    Backslash,
    #[token("$")]
    Dollar,

    #[token("==")]
    #[token("===")]
    #[token("!=")]
    #[token("!==")]
    #[token("<>")]
    #[token("<=>")]
    #[token("<=")]
    #[token(">=")]
    #[token("<")]
    #[token(">")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("**")]
    #[token("!")]
    #[token("~")]
    #[token("^")]
    #[token("<<")]
    #[token(">>")]
    #[token("&&")]
    #[token("||")]
    #[token("??")]
    #[token("??=")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("**=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    #[token("++")]
    #[token("--")]
    #[token("@")]
    Operator,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment => SyntaxKind::BLOCK_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Variable => SyntaxKind::VARIABLE,
            LogosToken::String => SyntaxKind::STRING,
            LogosToken::Heredoc => SyntaxKind::HEREDOC,
            LogosToken::Number => SyntaxKind::NUMBER,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::AttrOpen => SyntaxKind::ATTR_OPEN,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::ColonColon => SyntaxKind::COLON_COLON,
            LogosToken::Arrow => SyntaxKind::ARROW,
            LogosToken::FatArrow => SyntaxKind::FAT_ARROW,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Question => SyntaxKind::QUESTION,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::Amp => SyntaxKind::AMP,
            LogosToken::Dot => SyntaxKind::OPERATOR,
            LogosToken::Backslash => SyntaxKind::BACKSLASH,
            LogosToken::Dollar => SyntaxKind::DOLLAR,
            LogosToken::Operator => SyntaxKind::OPERATOR,
        }
    }
}

//! Statement-level recursive descent parser for PHP
//!
//! Builds the arena tree from the token stream. Expressions are never
//! parsed: a statement that is not one of the recognized shapes is
//! consumed up to its terminator (skipping balanced brackets) and kept as
//! `Other`. Every recognized shape records enough payload for planning.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::errors::{ErrorCode, SyntaxError};
use super::lexer::Lexer;
use super::syntax_kind::SyntaxKind;
use super::tree::{ClassKind, Directive, Node, NodeId, NodeKind, RawToken, SyntaxTree, UseItem};
use crate::base::SymbolKind;

/// Parse PHP source into a syntax tree. Never fails; problems are collected
/// as errors on the tree.
pub fn parse(input: &str) -> SyntaxTree {
    let tokens: Vec<RawToken> = Lexer::new(input)
        .map(|token| RawToken {
            kind: token.kind,
            range: TextRange::at(token.offset, TextSize::of(token.text)),
        })
        .collect();
    let mut parser = Parser::new(input, &tokens);
    parser.parse_source_file();
    let (nodes, errors) = parser.finish();
    SyntaxTree::new(input.to_string(), tokens, nodes, errors)
}

/// The parser state. Positions index `significant`, not `tokens`.
struct Parser<'a> {
    input: &'a str,
    tokens: &'a [RawToken],
    significant: Vec<usize>,
    /// Position of the matching closer for every opener
    matching: Vec<Option<usize>>,
    pos: usize,
    nodes: Vec<Node>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: &'a [RawToken]) -> Self {
        let significant: Vec<usize> = (0..tokens.len()).filter(|&i| !tokens[i].kind.is_trivia()).collect();
        let mut parser = Self {
            input,
            tokens,
            matching: vec![None; significant.len()],
            significant,
            pos: 0,
            nodes: Vec::new(),
            errors: Vec::new(),
        };
        parser.match_brackets();
        parser
    }

    fn finish(self) -> (Vec<Node>, Vec<SyntaxError>) {
        (self.nodes, self.errors)
    }

    fn match_brackets(&mut self) {
        let mut stack: Vec<usize> = Vec::new();
        for p in 0..self.significant.len() {
            let kind = self.kind_at(p);
            if kind == SyntaxKind::ERROR {
                self.errors
                    .push(SyntaxError::from_code(ErrorCode::E0101, self.range_at(p)));
            } else if kind.is_opening_bracket() {
                stack.push(p);
            } else if kind.is_closing_bracket() {
                match stack.iter().rposition(|&open| closes(self.kind_at(open), kind)) {
                    Some(depth) => {
                        for &unclosed in &stack[depth + 1..] {
                            self.errors
                                .push(SyntaxError::from_code(ErrorCode::E0201, self.range_at(unclosed)));
                        }
                        self.matching[stack[depth]] = Some(p);
                        stack.truncate(depth);
                    }
                    None => self
                        .errors
                        .push(SyntaxError::from_code(ErrorCode::E0202, self.range_at(p))),
                }
            }
        }
        for open in stack {
            self.errors.push(
                SyntaxError::from_code(ErrorCode::E0201, self.range_at(open))
                    .with_hint(format!("'{}' is never closed", self.text_at(open))),
            );
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn kind_at(&self, p: usize) -> SyntaxKind {
        self.significant
            .get(p)
            .map(|&i| self.tokens[i].kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn text_at(&self, p: usize) -> &'a str {
        let input: &'a str = self.input;
        self.significant
            .get(p)
            .map(|&i| &input[self.tokens[i].range])
            .unwrap_or("")
    }

    fn range_at(&self, p: usize) -> TextRange {
        match self.significant.get(p) {
            Some(&i) => self.tokens[i].range,
            None => TextRange::empty(TextSize::of(self.input)),
        }
    }

    fn token_at(&self, p: usize) -> usize {
        self.significant.get(p).copied().unwrap_or(self.tokens.len())
    }

    fn current(&self) -> SyntaxKind {
        self.kind_at(self.pos)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.kind_at(self.pos + n)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.significant.len()
    }

    fn at_terminator(&self) -> bool {
        self.at(SyntaxKind::SEMICOLON) || self.at(SyntaxKind::CLOSE_TAG)
    }

    /// Position just past the bracket group opened at `p`
    fn skip_group(&self, p: usize) -> usize {
        match self.matching.get(p).copied().flatten() {
            Some(close) => close + 1,
            None => self.significant.len(),
        }
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_terminator(&mut self) -> bool {
        if self.at_terminator() {
            self.bump();
            true
        } else {
            if !self.at_eof() {
                self.error(ErrorCode::E0203);
            }
            false
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, code: ErrorCode) {
        let range = self.range_at(self.pos);
        self.errors.push(SyntaxError::from_code(code, range));
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let first_token = self.token_at(self.pos);
        self.nodes.push(Node {
            kind: NodeKind::Other,
            parent,
            children: Vec::new(),
            first_token,
            end_token: first_token,
            doc: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    fn finish_node(&mut self, id: NodeId, kind: NodeKind) {
        let end_token = match self.pos.checked_sub(1) {
            Some(last) => self.token_at(last) + 1,
            None => 0,
        };
        let node = &mut self.nodes[id.index()];
        node.kind = kind;
        node.end_token = end_token.max(node.first_token);
        if id != NodeId::ROOT {
            node.doc = leading_doc(self.tokens, node.first_token);
        }
    }

    // =========================================================================
    // Grammar rules
    // =========================================================================

    /// SourceFile = (Namespace | Statement)*
    fn parse_source_file(&mut self) {
        let root = self.start_node(None);
        while !self.at_eof() {
            if self.at_namespace_header() {
                self.parse_namespace(root);
            } else {
                self.parse_statement(root);
            }
        }
        self.nodes[root.index()].kind = NodeKind::SourceFile;
        self.nodes[root.index()].first_token = 0;
        self.nodes[root.index()].end_token = self.tokens.len();
    }

    fn at_namespace_header(&self) -> bool {
        self.at(SyntaxKind::NAMESPACE_KW)
            && matches!(
                self.nth(1),
                SyntaxKind::IDENT | SyntaxKind::NAME_QUALIFIED | SyntaxKind::L_BRACE
            )
    }

    /// Namespace = 'namespace' Name? ('{' Statement* '}' | ';' Statement*)
    fn parse_namespace(&mut self, root: NodeId) {
        let id = self.start_node(Some(root));
        self.bump();
        let (name, name_token) = if matches!(self.current(), SyntaxKind::IDENT | SyntaxKind::NAME_QUALIFIED) {
            let name = SmolStr::new(self.text_at(self.pos));
            let token = self.token_at(self.pos);
            self.bump();
            (Some(name), Some(token))
        } else {
            (None, None)
        };

        let braced = if self.at(SyntaxKind::L_BRACE) {
            self.bump();
            self.parse_statements_until(id, &[SyntaxKind::R_BRACE]);
            self.eat(SyntaxKind::R_BRACE);
            true
        } else {
            if self.at_terminator() {
                self.bump();
            } else {
                self.error(ErrorCode::E0503);
            }
            while !self.at_eof() && !self.at_namespace_header() {
                self.parse_statement(id);
            }
            false
        };
        self.finish_node(
            id,
            NodeKind::Namespace {
                name,
                name_token,
                braced,
            },
        );
    }

    fn parse_statements_until(&mut self, parent: NodeId, stop: &[SyntaxKind]) {
        while !self.at_eof() && !stop.contains(&self.current()) {
            self.parse_statement(parent);
        }
    }

    fn parse_statement(&mut self, parent: NodeId) {
        let id = self.start_node(Some(parent));
        let kind = match self.current() {
            SyntaxKind::SEMICOLON | SyntaxKind::CLOSE_TAG => {
                self.bump();
                NodeKind::Nop
            }
            SyntaxKind::INLINE_HTML => {
                let blank = self.text_at(self.pos).trim().is_empty();
                self.bump();
                NodeKind::InlineHtml { blank }
            }
            SyntaxKind::USE_KW => self.parse_use(),
            SyntaxKind::CONST_KW => self.parse_const(),
            SyntaxKind::DECLARE_KW if self.nth(1) == SyntaxKind::L_PAREN => self.parse_declare(id),
            SyntaxKind::IF_KW => self.parse_if(id),
            SyntaxKind::RETURN_KW => {
                self.consume_statement();
                NodeKind::Return
            }
            SyntaxKind::EXIT_KW => {
                self.consume_statement();
                NodeKind::Exit
            }
            SyntaxKind::HALT_COMPILER_KW => {
                self.pos = self.significant.len();
                NodeKind::Other
            }
            SyntaxKind::IDENT if self.is_define_call() => self.parse_define(),
            _ => match self.declaration_start() {
                Some((keyword, DeclarationShape::ClassLike(class_kind))) => self.parse_class_like(keyword, class_kind),
                Some((keyword, DeclarationShape::Function)) => self.parse_function(keyword),
                None => {
                    self.consume_statement();
                    NodeKind::Other
                }
            },
        };
        self.finish_node(id, kind);
    }

    /// Find a class-like or function declaration starting at the current
    /// position, past attributes and modifiers. Returns the keyword position.
    fn declaration_start(&self) -> Option<(usize, DeclarationShape)> {
        let mut p = self.pos;
        loop {
            match self.kind_at(p) {
                SyntaxKind::ATTR_OPEN => p = self.skip_group(p),
                SyntaxKind::ABSTRACT_KW | SyntaxKind::FINAL_KW | SyntaxKind::READONLY_KW => p += 1,
                _ => break,
            }
        }
        let named = |q: usize| self.kind_at(q) == SyntaxKind::IDENT;
        let shape = match self.kind_at(p) {
            SyntaxKind::CLASS_KW if named(p + 1) => DeclarationShape::ClassLike(ClassKind::Class),
            SyntaxKind::INTERFACE_KW if named(p + 1) => DeclarationShape::ClassLike(ClassKind::Interface),
            SyntaxKind::TRAIT_KW if named(p + 1) => DeclarationShape::ClassLike(ClassKind::Trait),
            SyntaxKind::IDENT if self.text_at(p).eq_ignore_ascii_case("enum") && named(p + 1) => {
                DeclarationShape::ClassLike(ClassKind::Enum)
            }
            SyntaxKind::FUNCTION_KW => {
                let name = if self.kind_at(p + 1) == SyntaxKind::AMP { p + 2 } else { p + 1 };
                if named(name) && self.kind_at(name + 1) == SyntaxKind::L_PAREN {
                    DeclarationShape::Function
                } else {
                    return None;
                }
            }
            _ => return None,
        };
        Some((p, shape))
    }

    /// ClassLike = Attribute* Modifier* Keyword Name Header '{' Body '}'
    fn parse_class_like(&mut self, keyword: usize, kind: ClassKind) -> NodeKind {
        let name_pos = keyword + 1;
        let name = SmolStr::new(self.text_at(name_pos));
        let name_token = self.token_at(name_pos);
        self.pos = name_pos + 1;
        self.consume_body();
        NodeKind::ClassLike { kind, name, name_token }
    }

    /// Function = Attribute* 'function' '&'? Name '(' Params ')' ReturnType? '{' Body '}'
    fn parse_function(&mut self, keyword: usize) -> NodeKind {
        let name_pos = if self.kind_at(keyword + 1) == SyntaxKind::AMP { keyword + 2 } else { keyword + 1 };
        let name = SmolStr::new(self.text_at(name_pos));
        let name_token = self.token_at(name_pos);
        self.pos = self.skip_group(name_pos + 1);
        self.consume_body();
        NodeKind::Function { name, name_token }
    }

    /// Skip a declaration header up to and including its `{...}` body
    fn consume_body(&mut self) {
        while !self.at_eof() {
            match self.current() {
                SyntaxKind::L_BRACE => {
                    self.pos = self.skip_group(self.pos);
                    return;
                }
                SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET | SyntaxKind::ATTR_OPEN => {
                    self.pos = self.skip_group(self.pos);
                }
                SyntaxKind::SEMICOLON | SyntaxKind::R_BRACE => break,
                _ => self.bump(),
            }
        }
        self.error(ErrorCode::E0301);
    }

    /// Const = 'const' Name '=' Expr (',' Name '=' Expr)* ';'
    fn parse_const(&mut self) -> NodeKind {
        let start = self.pos;
        self.consume_statement();
        let mut names = Vec::new();
        for p in start + 1..self.pos {
            let declares = self.kind_at(p) == SyntaxKind::IDENT
                && self.kind_at(p + 1) == SyntaxKind::EQ
                && matches!(self.kind_at(p - 1), SyntaxKind::CONST_KW | SyntaxKind::COMMA);
            if declares && !self.inside_group(start, p) {
                names.push((SmolStr::new(self.text_at(p)), self.token_at(p)));
            }
        }
        NodeKind::Const { names }
    }

    /// True when `p` lies inside a bracket group opened after `start`
    fn inside_group(&self, start: usize, p: usize) -> bool {
        (start..p).any(|open| self.kind_at(open).is_opening_bracket() && self.skip_group(open) > p)
    }

    /// Use = 'use' ('function' | 'const')? UseItem (',' UseItem)* ';'
    fn parse_use(&mut self) -> NodeKind {
        self.bump();
        let kind = self.eat_use_kind().unwrap_or(SymbolKind::Type);
        let mut items = Vec::new();
        loop {
            if !matches!(
                self.current(),
                SyntaxKind::IDENT | SyntaxKind::NAME_QUALIFIED | SyntaxKind::NAME_FULLY_QUALIFIED
            ) {
                return self.malformed_use();
            }
            let name = self.text_at(self.pos).trim_start_matches('\\');
            let name_token = self.token_at(self.pos);
            self.bump();

            if self.at(SyntaxKind::BACKSLASH) && self.nth(1) == SyntaxKind::L_BRACE {
                let prefix = SmolStr::new(name);
                self.bump();
                self.bump();
                if !self.parse_group_items(kind, &prefix, &mut items) {
                    return self.malformed_use();
                }
            } else {
                let alias = self.eat_alias();
                items.push(UseItem {
                    kind,
                    name: SmolStr::new(name),
                    alias,
                    name_token,
                    group_prefix: None,
                });
            }

            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        if !self.eat_terminator() {
            return self.malformed_use();
        }
        NodeKind::Use { items }
    }

    fn parse_group_items(&mut self, kind: SymbolKind, prefix: &SmolStr, items: &mut Vec<UseItem>) -> bool {
        while !self.at(SyntaxKind::R_BRACE) {
            let item_kind = self.eat_use_kind().unwrap_or(kind);
            if !matches!(self.current(), SyntaxKind::IDENT | SyntaxKind::NAME_QUALIFIED) {
                return false;
            }
            let name = format!("{}\\{}", prefix, self.text_at(self.pos));
            let name_token = self.token_at(self.pos);
            self.bump();
            let alias = self.eat_alias();
            items.push(UseItem {
                kind: item_kind,
                name: SmolStr::new(name),
                alias,
                name_token,
                group_prefix: Some(prefix.clone()),
            });
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        self.eat(SyntaxKind::R_BRACE)
    }

    fn eat_use_kind(&mut self) -> Option<SymbolKind> {
        if self.eat(SyntaxKind::FUNCTION_KW) {
            Some(SymbolKind::Function)
        } else if self.eat(SyntaxKind::CONST_KW) {
            Some(SymbolKind::Constant)
        } else {
            None
        }
    }

    fn eat_alias(&mut self) -> Option<SmolStr> {
        if self.at(SyntaxKind::AS_KW) && self.nth(1) == SyntaxKind::IDENT {
            self.bump();
            let alias = SmolStr::new(self.text_at(self.pos));
            self.bump();
            Some(alias)
        } else {
            None
        }
    }

    fn malformed_use(&mut self) -> NodeKind {
        self.error(ErrorCode::E0501);
        self.consume_statement();
        NodeKind::Other
    }

    /// Declare = 'declare' '(' Directive (',' Directive)* ')' (';' | '{' ... '}' | ':' ... 'enddeclare' ';')
    fn parse_declare(&mut self, id: NodeId) -> NodeKind {
        self.bump();
        let open = self.pos;
        let close = self.skip_group(open).saturating_sub(1);
        let mut directives = Vec::new();
        let mut p = open + 1;
        while p < close {
            if self.kind_at(p) == SyntaxKind::IDENT && self.kind_at(p + 1) == SyntaxKind::EQ {
                let value_start = p + 2;
                let mut value_end = value_start;
                while value_end < close && self.kind_at(value_end) != SyntaxKind::COMMA {
                    value_end += 1;
                }
                let value: String = (value_start..value_end).map(|q| self.text_at(q)).collect();
                directives.push(Directive {
                    key: SmolStr::new(self.text_at(p).to_ascii_lowercase()),
                    value: SmolStr::new(value),
                });
                p = value_end + 1;
            } else {
                self.errors
                    .push(SyntaxError::from_code(ErrorCode::E0502, self.range_at(p)));
                break;
            }
        }
        self.pos = close + 1;

        let block = if self.at(SyntaxKind::L_BRACE) {
            self.bump();
            self.parse_statements_until(id, &[SyntaxKind::R_BRACE]);
            self.eat(SyntaxKind::R_BRACE);
            true
        } else if self.at(SyntaxKind::COLON) {
            self.bump();
            self.parse_statements_until(id, &[SyntaxKind::ENDDECLARE_KW]);
            self.eat(SyntaxKind::ENDDECLARE_KW);
            self.eat_terminator();
            true
        } else {
            self.eat_terminator();
            false
        };
        NodeKind::Declare { directives, block }
    }

    /// If = 'if' '(' Expr ')' Branch ('elseif' '(' Expr ')' Branch)* ('else' Branch)?
    ///
    /// Branch statements of every arm become children of the `If` node.
    fn parse_if(&mut self, id: NodeId) -> NodeKind {
        self.bump();
        self.pos = self.skip_group(self.pos);

        if self.eat(SyntaxKind::COLON) {
            let arms = [SyntaxKind::ELSEIF_KW, SyntaxKind::ELSE_KW, SyntaxKind::ENDIF_KW];
            self.parse_statements_until(id, &arms);
            loop {
                match self.current() {
                    SyntaxKind::ELSEIF_KW if !self.at_eof() => {
                        self.bump();
                        self.pos = self.skip_group(self.pos);
                        self.eat(SyntaxKind::COLON);
                        self.parse_statements_until(id, &arms);
                    }
                    SyntaxKind::ELSE_KW if !self.at_eof() => {
                        self.bump();
                        self.eat(SyntaxKind::COLON);
                        self.parse_statements_until(id, &arms);
                    }
                    SyntaxKind::ENDIF_KW if !self.at_eof() => {
                        self.bump();
                        self.eat_terminator();
                        break;
                    }
                    _ => {
                        self.error(ErrorCode::E0203);
                        break;
                    }
                }
            }
            return NodeKind::If;
        }

        self.parse_branch(id);
        loop {
            if self.eat(SyntaxKind::ELSEIF_KW) {
                self.pos = self.skip_group(self.pos);
                self.parse_branch(id);
            } else if self.eat(SyntaxKind::ELSE_KW) {
                self.parse_branch(id);
                break;
            } else {
                break;
            }
        }
        NodeKind::If
    }

    fn parse_branch(&mut self, id: NodeId) {
        if self.eat(SyntaxKind::L_BRACE) {
            self.parse_statements_until(id, &[SyntaxKind::R_BRACE]);
            self.eat(SyntaxKind::R_BRACE);
        } else if !self.at_eof() {
            self.parse_statement(id);
        }
    }

    fn is_define_call(&self) -> bool {
        self.text_at(self.pos).eq_ignore_ascii_case("define")
            && self.nth(1) == SyntaxKind::L_PAREN
            && matches!(
                self.kind_at(self.skip_group(self.pos + 1)),
                SyntaxKind::SEMICOLON | SyntaxKind::CLOSE_TAG
            )
    }

    /// Define = 'define' '(' Literal ',' Expr ')' ';'
    fn parse_define(&mut self) -> NodeKind {
        let first_arg = self.pos + 2;
        let name = if self.kind_at(first_arg) == SyntaxKind::STRING && self.kind_at(first_arg + 1) == SyntaxKind::COMMA {
            string_literal_value(self.text_at(first_arg)).map(SmolStr::new)
        } else {
            None
        };
        self.pos = self.skip_group(self.pos + 1);
        self.eat_terminator();
        NodeKind::Define { name }
    }

    /// Consume an unrecognized statement up to its terminator.
    ///
    /// Control structures end at their closing brace; `try` and `do` keep
    /// going through their `catch`/`finally`/`while` tails.
    fn consume_statement(&mut self) {
        let start = self.pos;
        let control = self.at(SyntaxKind::L_BRACE)
            || (self.at(SyntaxKind::KEYWORD)
                && matches!(
                    self.text_at(self.pos).to_ascii_lowercase().as_str(),
                    "for" | "foreach" | "while" | "switch" | "try" | "do"
                ));
        let is_do = self.at(SyntaxKind::KEYWORD) && self.text_at(self.pos).eq_ignore_ascii_case("do");
        while !self.at_eof() {
            match self.current() {
                SyntaxKind::SEMICOLON | SyntaxKind::CLOSE_TAG => {
                    self.bump();
                    return;
                }
                kind if kind.is_closing_bracket() => break,
                SyntaxKind::INLINE_HTML if self.pos > start => break,
                kind if kind.is_opening_bracket() => {
                    self.pos = self.skip_group(self.pos);
                    let ends_block = kind == SyntaxKind::L_BRACE
                        && control
                        && !is_do
                        && !(self.at(SyntaxKind::CATCH_KW) || self.at(SyntaxKind::FINALLY_KW));
                    if ends_block {
                        return;
                    }
                }
                _ => self.bump(),
            }
        }
        if self.pos == start {
            self.error(ErrorCode::E0901);
            self.bump();
        }
    }
}

enum DeclarationShape {
    ClassLike(ClassKind),
    Function,
}

fn closes(open: SyntaxKind, close: SyntaxKind) -> bool {
    matches!(
        (open, close),
        (SyntaxKind::L_PAREN, SyntaxKind::R_PAREN)
            | (SyntaxKind::L_BRACE, SyntaxKind::R_BRACE)
            | (SyntaxKind::L_BRACKET, SyntaxKind::R_BRACKET)
            | (SyntaxKind::ATTR_OPEN, SyntaxKind::R_BRACKET)
    )
}

/// Doc comment directly preceding `first_token`, with only whitespace and
/// plain comments in between.
fn leading_doc(tokens: &[RawToken], first_token: usize) -> Option<usize> {
    let mut i = first_token;
    while i > 0 {
        i -= 1;
        match tokens[i].kind {
            SyntaxKind::DOC_COMMENT => return Some(i),
            SyntaxKind::WHITESPACE | SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT => {}
            _ => return None,
        }
    }
    None
}

/// Value of a single- or double-quoted literal without interpolation
pub fn string_literal_value(text: &str) -> Option<&str> {
    let quote = text.chars().next()?;
    if !matches!(quote, '\'' | '"') || text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if inner.contains('\\') || (quote == '"' && inner.contains('$')) {
        return None;
    }
    Some(inner)
}

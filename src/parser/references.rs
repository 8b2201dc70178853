//! Reference scanner: classifies name tokens as type, function or constant
//! references from their surrounding tokens.
//!
//! PHP decides the kind of a name syntactically, so a window of neighbours
//! plus a little bracket state is enough: `new X`, `X::`, `catch (X`, type
//! positions of parameters, properties and return types are types; `x(` is
//! a function call; every other bare name is a constant.

use smol_str::SmolStr;

use super::keywords::is_builtin_name;
use super::syntax_kind::SyntaxKind;
use super::tree::{NodeKind, SyntaxTree};
use crate::base::SymbolKind;

/// A name token used as a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRef {
    pub token: usize,
    pub kind: SymbolKind,
    /// The name as written
    pub text: SmolStr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bracket {
    Params,
    Catch,
    Paren,
    Brace,
    /// `{ ... }` of a trait `use`: conflict resolution and method aliases
    TraitRules,
    Square,
    Attribute,
}

#[derive(Default)]
struct ScanState {
    stack: Vec<Bracket>,
    heritage: bool,
    trait_use: bool,
    return_type: bool,
    return_type_pending: bool,
}

/// Scan `first..end` (token indices) for references. Names inside `use`
/// import statements are not references and are never returned.
pub fn scan_references(tree: &SyntaxTree, first: usize, end: usize) -> Vec<NameRef> {
    let imports: Vec<(usize, usize)> = tree
        .nodes()
        .filter(|(_, node)| matches!(node.kind, NodeKind::Use { .. }))
        .map(|(_, node)| (node.first_token, node.end_token))
        .collect();
    let in_import = |token: usize| imports.iter().any(|&(a, b)| token >= a && token < b);

    let significant: Vec<usize> = (first..end.min(tree.token_count()))
        .filter(|&i| tree.token_kind(i).is_some_and(|kind| !kind.is_trivia()))
        .collect();
    let scanner = Scanner { tree, significant: &significant };

    let mut state = ScanState::default();
    let mut refs = Vec::new();
    for p in 0..significant.len() {
        let kind = scanner.kind(p);
        if kind.is_name() {
            if in_import(significant[p]) {
                continue;
            }
            if let Some(ref_kind) = scanner.classify(p, &state) {
                refs.push(NameRef {
                    token: significant[p],
                    kind: ref_kind,
                    text: SmolStr::new(tree.token_text(significant[p])),
                });
            }
            continue;
        }
        scanner.advance_state(p, kind, &mut state, in_import(significant[p]));
    }
    refs
}

struct Scanner<'t> {
    tree: &'t SyntaxTree,
    significant: &'t [usize],
}

impl Scanner<'_> {
    fn kind(&self, p: usize) -> SyntaxKind {
        self.significant
            .get(p)
            .and_then(|&i| self.tree.token_kind(i))
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn prev(&self, p: usize, n: usize) -> SyntaxKind {
        p.checked_sub(n).map_or(SyntaxKind::ERROR, |q| self.kind(q))
    }

    fn text(&self, p: usize) -> &str {
        self.significant.get(p).map_or("", |&i| self.tree.token_text(i))
    }

    fn is_visibility(&self, p: usize) -> bool {
        match self.kind(p) {
            SyntaxKind::READONLY_KW => true,
            SyntaxKind::KEYWORD => matches!(
                self.text(p).to_ascii_lowercase().as_str(),
                "public" | "protected" | "private" | "var"
            ),
            _ => false,
        }
    }

    fn advance_state(&self, p: usize, kind: SyntaxKind, state: &mut ScanState, in_import: bool) {
        if state.return_type && !matches!(
            kind,
            SyntaxKind::PIPE | SyntaxKind::AMP | SyntaxKind::QUESTION | SyntaxKind::L_PAREN | SyntaxKind::R_PAREN | SyntaxKind::STATIC_KW
        ) {
            state.return_type = false;
        }
        match kind {
            SyntaxKind::L_PAREN => {
                let role = if state.return_type {
                    Bracket::Paren
                } else if self.opens_params(p) {
                    Bracket::Params
                } else if self.prev(p, 1) == SyntaxKind::CATCH_KW {
                    Bracket::Catch
                } else {
                    Bracket::Paren
                };
                state.stack.push(role);
            }
            SyntaxKind::R_PAREN => {
                if state.stack.pop() == Some(Bracket::Params) && self.kind(p + 1) == SyntaxKind::COLON {
                    state.return_type_pending = true;
                }
            }
            SyntaxKind::COLON if state.return_type_pending => {
                state.return_type_pending = false;
                state.return_type = true;
            }
            SyntaxKind::L_BRACE => {
                state.stack.push(if state.trait_use { Bracket::TraitRules } else { Bracket::Brace });
                state.heritage = false;
                state.trait_use = false;
            }
            SyntaxKind::L_BRACKET => state.stack.push(Bracket::Square),
            SyntaxKind::ATTR_OPEN => state.stack.push(Bracket::Attribute),
            SyntaxKind::R_BRACE | SyntaxKind::R_BRACKET => {
                state.stack.pop();
            }
            SyntaxKind::EXTENDS_KW | SyntaxKind::IMPLEMENTS_KW => state.heritage = true,
            SyntaxKind::USE_KW if !in_import && self.kind(p + 1).is_name() => state.trait_use = true,
            SyntaxKind::SEMICOLON => {
                state.trait_use = false;
                state.heritage = false;
            }
            _ => {}
        }
    }

    /// `(` opening a parameter list: after `function`, `fn`, a function
    /// name, or a closure `use`
    fn opens_params(&self, p: usize) -> bool {
        match self.prev(p, 1) {
            SyntaxKind::FUNCTION_KW | SyntaxKind::FN_KW | SyntaxKind::USE_KW => true,
            SyntaxKind::IDENT => {
                self.prev(p, 2) == SyntaxKind::FUNCTION_KW
                    || (self.prev(p, 2) == SyntaxKind::AMP && self.prev(p, 3) == SyntaxKind::FUNCTION_KW)
            }
            SyntaxKind::AMP => matches!(self.prev(p, 2), SyntaxKind::FUNCTION_KW | SyntaxKind::FN_KW),
            _ => false,
        }
    }

    fn classify(&self, p: usize, state: &ScanState) -> Option<SymbolKind> {
        let kind = self.kind(p);
        let prev = self.prev(p, 1);
        let next = self.kind(p + 1);

        if matches!(
            prev,
            SyntaxKind::ARROW
                | SyntaxKind::NULLSAFE_ARROW
                | SyntaxKind::COLON_COLON
                | SyntaxKind::FUNCTION_KW
                | SyntaxKind::CONST_KW
                | SyntaxKind::CLASS_KW
                | SyntaxKind::INTERFACE_KW
                | SyntaxKind::TRAIT_KW
                | SyntaxKind::GOTO_KW
                | SyntaxKind::NAMESPACE_KW
        ) {
            return None;
        }
        if prev == SyntaxKind::AMP && self.prev(p, 2) == SyntaxKind::FUNCTION_KW {
            return None;
        }

        if kind == SyntaxKind::IDENT {
            let text = self.text(p);
            // enum declarations: the `enum` keyword and the name after it
            if text.eq_ignore_ascii_case("enum") && next == SyntaxKind::IDENT {
                return None;
            }
            if prev == SyntaxKind::IDENT && self.text(p - 1).eq_ignore_ascii_case("enum") {
                return None;
            }
            if next == SyntaxKind::EQ && !state.return_type {
                return None;
            }
            if next == SyntaxKind::COLON {
                let named_argument = matches!(prev, SyntaxKind::L_PAREN | SyntaxKind::COMMA);
                let label = matches!(
                    prev,
                    SyntaxKind::SEMICOLON | SyntaxKind::L_BRACE | SyntaxKind::R_BRACE | SyntaxKind::ERROR
                );
                if named_argument || label {
                    return None;
                }
            }
            if prev == SyntaxKind::CASE_KW && matches!(next, SyntaxKind::SEMICOLON | SyntaxKind::EQ) {
                return None;
            }
            if is_builtin_name(text) {
                return None;
            }
            if prev == SyntaxKind::AS_KW {
                return None;
            }
        }

        let innermost = state.stack.last().copied();
        if innermost == Some(Bracket::TraitRules) {
            // `T::m insteadof U;` and `m as alias;`: only trait names are references
            let method = matches!(next, SyntaxKind::AS_KW | SyntaxKind::INSTEADOF_KW)
                || prev == SyntaxKind::AS_KW
                || (p > 0 && self.is_visibility(p - 1));
            return (!method).then_some(SymbolKind::Type);
        }
        let is_type = matches!(
            prev,
            SyntaxKind::NEW_KW | SyntaxKind::INSTANCEOF_KW | SyntaxKind::INSTEADOF_KW | SyntaxKind::EXTENDS_KW | SyntaxKind::IMPLEMENTS_KW
        ) || state.heritage
            || state.trait_use
            || state.return_type
            || innermost == Some(Bracket::Catch)
            || prev == SyntaxKind::ATTR_OPEN
            || (prev == SyntaxKind::COMMA && innermost == Some(Bracket::Attribute))
            || next == SyntaxKind::COLON_COLON
            || self.in_type_run(p, &state.stack);
        if is_type {
            return Some(SymbolKind::Type);
        }
        if kind == SyntaxKind::IDENT && p > 0 && self.is_visibility(p - 1) {
            // trait method alias: `as protected name;`
            return None;
        }
        if next == SyntaxKind::L_PAREN {
            return Some(SymbolKind::Function);
        }
        Some(SymbolKind::Constant)
    }

    /// True when the name sits in a parameter or property type: a run of
    /// names joined by `|`, `&`, `?` and DNF parentheses that ends at a
    /// variable, a by-reference variable or a variadic.
    fn in_type_run(&self, p: usize, stack: &[Bracket]) -> bool {
        // DNF groups sit on top of the parameter list
        let in_params = stack.iter().rev().find(|&&b| b != Bracket::Paren) == Some(&Bracket::Params);
        // `f(FLAG & $x)` is a bitwise expression, not a by-reference parameter
        let is_boundary = |q: usize| match self.kind(q) {
            SyntaxKind::L_PAREN | SyntaxKind::COMMA | SyntaxKind::R_BRACKET => in_params,
            SyntaxKind::STATIC_KW => true,
            _ => self.is_visibility(q),
        };

        let mut start = p;
        while start > 0 {
            let prev = self.kind(start - 1);
            let inside = prev.is_name()
                || matches!(
                    prev,
                    SyntaxKind::PIPE | SyntaxKind::AMP | SyntaxKind::QUESTION | SyntaxKind::R_PAREN
                )
                || (prev == SyntaxKind::L_PAREN
                    && start >= 2
                    && (matches!(self.kind(start - 2), SyntaxKind::PIPE | SyntaxKind::AMP) || is_boundary(start - 2)));
            if !inside {
                break;
            }
            start -= 1;
        }
        if start == 0 || !is_boundary(start - 1) {
            return false;
        }

        let mut q = start;
        let mut depth = 0i32;
        loop {
            match self.kind(q) {
                kind if kind.is_name() => {}
                SyntaxKind::PIPE | SyntaxKind::AMP | SyntaxKind::QUESTION => {}
                SyntaxKind::L_PAREN => depth += 1,
                SyntaxKind::R_PAREN => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                SyntaxKind::VARIABLE | SyntaxKind::ELLIPSIS => break,
                _ => return false,
            }
            q += 1;
        }
        if depth != 0 || q == start {
            return false;
        }
        let before_end = self.kind(q - 1);
        let closes_type = |kind: SyntaxKind| kind.is_name() || kind == SyntaxKind::R_PAREN;
        closes_type(before_end) || (before_end == SyntaxKind::AMP && closes_type(self.prev(q, 2)))
    }
}

//! Doc comment micro-grammar
//!
//! Finds class names in `/** ... */` comments: the type expression after
//! typed tags (`@param`, `@return`, `@var`, ...), the signature of
//! `@method`, and annotation tags written as class names
//! (`@ORM\Entity(...)`). Ranges are relative to the comment start.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::keywords::is_builtin_name;

/// A class name found inside a doc comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub range: TextRange,
    /// The name as written
    pub name: SmolStr,
}

/// Tags followed by a type expression
const TYPED_TAGS: &[&str] = &[
    "extends",
    "implements",
    "mixin",
    "param",
    "property",
    "property-read",
    "property-write",
    "return",
    "see",
    "throws",
    "uses",
    "var",
];

const TEMPLATE_TAGS: &[&str] = &["template", "template-contravariant", "template-covariant"];

/// Doc-only pseudo types that never name a class
const PSEUDO_TYPES: &[&str] = &[
    "boolean", "callback", "double", "empty", "integer", "is", "list", "number", "numeric", "resource",
    "scalar",
];

/// Extract class references from a doc comment
pub fn doc_references(comment: &str) -> Vec<DocRef> {
    let templates = template_names(comment);
    let mut refs = Vec::new();
    for (line_start, line) in lines(comment) {
        let Some(at) = tag_start(line) else { continue };
        let tag_len = line[at + 1..]
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '\\' | '-')))
            .unwrap_or(line.len() - at - 1);
        let tag = &line[at + 1..at + 1 + tag_len];
        let after_tag = at + 1 + tag_len;
        let normalized = normalize_tag(tag);

        if is_annotation(tag) {
            let start = line_start + at + 1;
            refs.push(doc_ref(start, tag));
            collect_nested_annotations(line, line_start, after_tag, &mut refs);
        } else if normalized == "method" {
            collect_method(line, line_start, after_tag, &templates, &mut refs);
        } else if TEMPLATE_TAGS.contains(&normalized) {
            if let Some(bound) = template_bound(line, after_tag) {
                let end = type_expression_end(line, bound);
                collect_names(line, line_start, bound, end, &templates, &mut refs);
            }
        } else if TYPED_TAGS.contains(&normalized) {
            let start = skip_spaces(line, after_tag);
            let end = type_expression_end(line, start);
            if normalized != "see" && normalized != "uses" || !line[start..end].contains("://") {
                collect_names(line, line_start, start, end, &templates, &mut refs);
            }
        }
    }
    refs
}

fn doc_ref(start: usize, name: &str) -> DocRef {
    DocRef {
        range: TextRange::at(TextSize::new(start as u32), TextSize::of(name)),
        name: SmolStr::new(name),
    }
}

/// Lines with their byte offsets
fn lines(comment: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    comment.split_inclusive('\n').map(move |line| {
        let start = offset;
        offset += line.len();
        (start, line.trim_end_matches(['\n', '\r']))
    })
}

/// Offset of the `@` opening a tag at the start of a comment line
fn tag_start(line: &str) -> Option<usize> {
    let body = line.find(|c: char| !(c.is_whitespace() || c == '/' || c == '*'))?;
    line[body..].starts_with('@').then_some(body)
}

/// `phpstan-param` and `psalm-param` behave like `param`
fn normalize_tag(tag: &str) -> &str {
    tag.strip_prefix("phpstan-")
        .or_else(|| tag.strip_prefix("psalm-"))
        .unwrap_or(tag)
}

fn is_annotation(tag: &str) -> bool {
    tag.chars().next().is_some_and(|c| c.is_ascii_uppercase() || c == '\\') && !tag.contains('-')
}

fn template_names(comment: &str) -> Vec<String> {
    let mut names = Vec::new();
    for (_, line) in lines(comment) {
        let Some(at) = tag_start(line) else { continue };
        let rest = &line[at + 1..];
        let tag_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if !TEMPLATE_TAGS.contains(&normalize_tag(&rest[..tag_len])) {
            continue;
        }
        let name: String = rest[tag_len..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        if !name.is_empty() {
            names.push(name);
        }
    }
    names
}

/// Start of the bound type in `@template T of Bound`
fn template_bound(line: &str, after_tag: usize) -> Option<usize> {
    let name_start = skip_spaces(line, after_tag);
    let name_end = line[name_start..]
        .find(char::is_whitespace)
        .map_or(line.len(), |i| name_start + i);
    let keyword = skip_spaces(line, name_end);
    line[keyword..]
        .strip_prefix("of")
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(|_| skip_spaces(line, keyword + 2))
}

fn skip_spaces(line: &str, from: usize) -> usize {
    line[from..]
        .find(|c: char| !c.is_whitespace())
        .map_or(line.len(), |i| from + i)
}

/// End of a type expression starting at `start`: the first whitespace
/// outside brackets that does not sit next to a `|`, `&` or `,`
fn type_expression_end(line: &str, start: usize) -> usize {
    let bytes = line.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' | b'"' => quote = Some(b),
            b'<' | b'(' | b'{' | b'[' => depth += 1,
            b'>' | b')' | b'}' | b']' => depth -= 1,
            b' ' | b'\t' if depth <= 0 => {
                let before = line[..i].trim_end().as_bytes().last().copied();
                let after = line[i..].trim_start().as_bytes().first().copied();
                let joined = matches!(before, Some(b'|' | b'&'))
                    || matches!(after, Some(b'|' | b'&'));
                if !joined {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    line.len()
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

/// Collect class names between `start` and `end` of `line`
fn collect_names(line: &str, line_start: usize, start: usize, end: usize, templates: &[String], refs: &mut Vec<DocRef>) {
    let text = &line[..end];
    let mut i = start;
    let mut quote: Option<char> = None;
    while i < end {
        let Some(c) = text[i..].chars().next() else { break };
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            i += c.len_utf8();
            continue;
        }
        if c == '\'' || c == '"' {
            quote = Some(c);
            i += 1;
            continue;
        }
        let qualified = c == '\\' && text[i + 1..].starts_with(is_name_start);
        if !(is_name_start(c) || qualified) {
            i += c.len_utf8();
            continue;
        }
        let name_end = name_run_end(text, i);
        let name = &text[i..name_end];
        if is_class_name(text, i, name_end, templates) {
            refs.push(doc_ref(line_start + i, name));
        }
        i = name_end;
    }
}

fn name_run_end(text: &str, start: usize) -> usize {
    let mut end = start;
    let mut chars = text[start..].char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        let accepted = if c == '\\' {
            chars.peek().is_some_and(|&(_, next)| is_name_start(next))
        } else {
            is_name_char(c)
        };
        if !accepted {
            break;
        }
        end = start + offset + c.len_utf8();
    }
    end
}

fn is_class_name(text: &str, start: usize, end: usize, templates: &[String]) -> bool {
    let name = &text[start..end];
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    if matches!(before, Some('$' | '-' | '.' | ':' | '@')) || matches!(after, Some('-' | '(' | ':' | '.')) {
        // `Foo::bar` keeps `Foo`
        if !text[end..].starts_with("::") {
            return false;
        }
    }
    if before.is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    if name.contains('\\') {
        return true;
    }
    !(is_builtin_name(name)
        || PSEUDO_TYPES.contains(&name.to_ascii_lowercase().as_str())
        || templates.iter().any(|t| t == name))
}

/// `@method [static] ReturnType name(Type $a, ...)`
fn collect_method(line: &str, line_start: usize, after_tag: usize, templates: &[String], refs: &mut Vec<DocRef>) {
    let Some(open) = line[after_tag..].find('(').map(|i| after_tag + i) else {
        return;
    };
    let head = line[after_tag..open].trim_end();
    let name_start = head
        .rfind(char::is_whitespace)
        .map_or(after_tag, |i| after_tag + i + 1);
    collect_names(line, line_start, after_tag, name_start, templates, refs);

    let close = line[open..].rfind(')').map_or(line.len(), |i| open + i);
    let params = &line[..close];
    let mut param_start = open + 1;
    for segment in params[open + 1..].split(',') {
        let segment_end = param_start + segment.len();
        let type_end = segment
            .find(['$', '='])
            .map_or(segment_end, |i| param_start + i);
        collect_names(line, line_start, param_start, type_end, templates, refs);
        param_start = segment_end + 1;
    }
}

/// `@Outer(inner=@Inner\Name(...))`
fn collect_nested_annotations(line: &str, line_start: usize, from: usize, refs: &mut Vec<DocRef>) {
    let mut search = from;
    while let Some(found) = line[search..].find('@') {
        let at = search + found;
        let end = name_run_end(line, at + 1);
        let name = &line[at + 1..end];
        if end > at + 1 && is_annotation(name) {
            refs.push(doc_ref(line_start + at + 1, name));
        }
        search = end.max(at + 1);
    }
}

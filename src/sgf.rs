//! SGF (Smart Game Format) reading and writing.
//!
//! The parser accepts an SGF collection and produces one [`GameNode`] tree
//! per game. It is iterative throughout: nodes are first collected into an
//! arena with parent links, then assembled bottom-up, so a main line of any
//! length never recurses.
//!
//! ## Accepted syntax
//!
//! - Game trees `( ... )` containing nodes `;` with properties `ID[value]...`
//! - Property identifiers made of uppercase letters; lowercase letters inside
//!   an identifier (`AddBlack`, an FF[1-3] relic) are dropped
//! - `\]` and `\\` escapes, and backslash-newline soft line breaks
//! - Anything outside a game tree is ignored
//!
//! The non-standard `TG` property is moved into [`GameNode::tags`].

use std::collections::BTreeSet;

use crate::constants::PROP_TAGS;
use crate::error::{Error, Result};
use crate::node::{GameNode, Properties};

/// Parse an SGF collection into its game trees.
pub fn parse(text: &str) -> Result<Vec<GameNode>> {
    let mut parser = Parser {
        bytes: text.as_bytes(),
        pos: 0,
    };
    let mut arena: Vec<RawNode> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    // Attach point recorded at every open '(' so sibling variations hang
    // off the same parent.
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut current: Option<usize> = None;

    loop {
        parser.skip_whitespace();
        let Some(b) = parser.peek() else {
            break;
        };
        match b {
            b'(' => {
                parser.pos += 1;
                open.push(current);
            }
            b')' => {
                if open.is_empty() {
                    return Err(Error::parse(parser.pos, "unbalanced ')'"));
                }
                parser.pos += 1;
                current = open.pop().flatten();
            }
            b';' if !open.is_empty() => {
                parser.pos += 1;
                let idx = arena.len();
                let mut raw = RawNode::default();
                parser.parse_properties(&mut raw)?;
                arena.push(raw);
                match current {
                    Some(parent) => arena[parent].children.push(idx),
                    None => roots.push(idx),
                }
                current = Some(idx);
            }
            _ if open.is_empty() => parser.pos += 1,
            other => {
                return Err(Error::parse(
                    parser.pos,
                    format!("unexpected character '{}'", other as char),
                ));
            }
        }
    }

    if !open.is_empty() {
        return Err(Error::parse(parser.pos, "unclosed '('"));
    }
    if roots.is_empty() {
        return Err(Error::NoGame);
    }
    Ok(assemble(arena, &roots))
}

/// Parse an SGF collection and return its first game.
pub fn parse_game(text: &str) -> Result<GameNode> {
    parse(text)?.into_iter().next().ok_or(Error::NoGame)
}

/// Serialize game trees back to SGF text, one game per line.
pub fn to_sgf(games: &[GameNode]) -> String {
    enum Step<'a> {
        Open,
        Node(&'a GameNode),
        Close,
    }

    let mut out = String::new();
    for game in games {
        let mut stack = vec![Step::Close, Step::Node(game), Step::Open];
        while let Some(step) = stack.pop() {
            match step {
                Step::Open => out.push('('),
                Step::Close => out.push(')'),
                Step::Node(node) => {
                    out.push(';');
                    write_node(&mut out, node);
                    if let [only] = node.children.as_slice() {
                        stack.push(Step::Node(only));
                    } else {
                        for child in node.children.iter().rev() {
                            stack.push(Step::Close);
                            stack.push(Step::Node(child));
                            stack.push(Step::Open);
                        }
                    }
                }
            }
        }
        out.push('\n');
    }
    out
}

fn write_node(out: &mut String, node: &GameNode) {
    for (key, values) in &node.properties {
        out.push_str(key);
        if values.is_empty() {
            out.push_str("[]");
        }
        for value in values {
            write_value(out, value);
        }
    }
    if !node.tags.is_empty() {
        out.push_str(PROP_TAGS);
        for tag in &node.tags {
            write_value(out, tag);
        }
    }
}

fn write_value(out: &mut String, value: &str) {
    out.push('[');
    for c in value.chars() {
        if c == ']' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
}

#[derive(Default)]
struct RawNode {
    properties: Properties,
    tags: BTreeSet<String>,
    children: Vec<usize>,
}

// Children always have larger arena indices than their parent, so walking
// the arena backwards sees every child before its parent.
fn assemble(arena: Vec<RawNode>, roots: &[usize]) -> Vec<GameNode> {
    let mut built: Vec<Option<GameNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);
    for (idx, raw) in arena.into_iter().enumerate().rev() {
        let children = raw
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[idx] = Some(GameNode {
            properties: raw.properties,
            children,
            tags: raw.tags,
        });
    }
    roots.iter().filter_map(|&idx| built[idx].take()).collect()
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn parse_properties(&mut self, node: &mut RawNode) -> Result<()> {
        loop {
            self.skip_whitespace();
            if !self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
                return Ok(());
            }
            let start = self.pos;
            let mut ident = String::new();
            while let Some(b) = self.peek().filter(u8::is_ascii_alphabetic) {
                if b.is_ascii_uppercase() {
                    ident.push(b as char);
                }
                self.pos += 1;
            }
            if ident.is_empty() {
                return Err(Error::parse(start, "property identifier has no uppercase letter"));
            }

            let mut values = Vec::new();
            loop {
                self.skip_whitespace();
                if self.peek() != Some(b'[') {
                    break;
                }
                values.push(self.parse_value()?);
            }
            if values.is_empty() {
                return Err(Error::parse(self.pos, format!("property {ident} has no value")));
            }

            if ident == PROP_TAGS {
                node.tags.extend(values);
            } else {
                node.properties.entry(ident).or_default().extend(values);
            }
        }
    }

    fn parse_value(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1; // '['
        let mut buf = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(Error::parse(start, "unterminated property value"));
            };
            self.pos += 1;
            match b {
                b']' => break,
                b'\\' => match self.peek() {
                    Some(b'\n') | Some(b'\r') => self.skip_line_break(),
                    Some(escaped) => {
                        buf.push(escaped);
                        self.pos += 1;
                    }
                    None => return Err(Error::parse(start, "unterminated property value")),
                },
                _ => buf.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    // Soft line break: "\n", "\r", "\r\n" or "\n\r".
    fn skip_line_break(&mut self) {
        let first = self.peek();
        self.pos += 1;
        let pair = match first {
            Some(b'\n') => b'\r',
            _ => b'\n',
        };
        if self.peek() == Some(pair) {
            self.pos += 1;
        }
    }
}

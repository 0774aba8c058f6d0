//! A small CSS selector engine for the mock document.
//!
//! Supported grammar:
//!
//! - type (`div`), universal (`*`), class (`.ui.list`), id (`#code`)
//! - attribute presence and equality (`[data-form-collection="add"]`)
//! - descendant (` `) and child (`>`) combinators
//! - a leading `:scope`, which anchors the selector at the query scope
//! - comma-separated selector lists
//!
//! Unanchored selectors follow `querySelectorAll`: the match itself must lie
//! inside the scope, its ancestors may lie anywhere.

use super::dom::{MockDocument, NodeId};
use crate::result::{ProbeError, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatcher {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

impl Compound {
    fn matches(&self, doc: &MockDocument, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !doc.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| doc.has_class(node, c))
            && self.attrs.iter().all(|a| match a {
                AttrMatcher::Exists(name) => doc.attr(node, name).is_some(),
                AttrMatcher::Equals(name, value) => doc.attr(node, name) == Some(value.as_str()),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    /// Relation of the leftmost compound to the scope, when `:scope` leads
    anchor: Option<Combinator>,
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl ComplexSelector {
    fn matches(&self, doc: &MockDocument, node: NodeId, scope: NodeId) -> bool {
        match self.compounds.len().checked_sub(1) {
            Some(last) => self.match_at(doc, node, last, scope),
            None => false,
        }
    }

    fn match_at(&self, doc: &MockDocument, node: NodeId, i: usize, scope: NodeId) -> bool {
        if !self.compounds[i].matches(doc, node) {
            return false;
        }
        if i == 0 {
            return match self.anchor {
                None => true,
                Some(Combinator::Child) => doc.parent(node) == Some(scope),
                Some(Combinator::Descendant) => doc.ancestors(node).contains(&scope),
            };
        }
        match self.combinators[i - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| self.match_at(doc, p, i - 1, scope)),
            Combinator::Descendant => doc
                .ancestors(node)
                .into_iter()
                .any(|a| self.match_at(doc, a, i - 1, scope)),
        }
    }
}

/// Parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector
    pub fn parse(source: &str) -> ProbeResult<Self> {
        Parser::new(source).parse_list()
    }

    /// Matching descendants of `scope` (the whole document when `None`) in
    /// document order
    #[must_use]
    pub fn select(&self, doc: &MockDocument, scope: Option<NodeId>) -> Vec<NodeId> {
        let scope = scope.unwrap_or(MockDocument::ROOT);
        doc.descendants(scope)
            .into_iter()
            .filter(|&n| self.selectors.iter().any(|s| s.matches(doc, n, scope)))
            .collect()
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ProbeError {
        ProbeError::InvalidSelector {
            selector: self.source.to_string(),
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn expect(&mut self, expected: char) -> ProbeResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let matches = keyword
            .chars()
            .enumerate()
            .all(|(i, k)| self.chars.get(self.pos + i) == Some(&k));
        if matches {
            self.pos += keyword.chars().count();
        }
        matches
    }

    fn ident(&mut self) -> ProbeResult<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected identifier, found {c:?}")),
                None => self.error("expected identifier, found end of input"),
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_list(mut self) -> ProbeResult<SelectorList> {
        let mut selectors = vec![self.parse_complex()?];
        loop {
            let _ = self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => {
                    self.pos += 1;
                    selectors.push(self.parse_complex()?);
                }
                Some(c) => return Err(self.error(format!("unexpected {c:?}"))),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> ProbeResult<ComplexSelector> {
        let _ = self.skip_whitespace();
        let mut anchor = None;
        if self.eat_keyword(":scope") {
            let _ = self.skip_whitespace();
            anchor = Some(if self.peek() == Some('>') {
                self.pos += 1;
                let _ = self.skip_whitespace();
                Combinator::Child
            } else {
                Combinator::Descendant
            });
        }

        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    let _ = self.skip_whitespace();
                    Combinator::Child
                }
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected {c:?}"))),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            anchor,
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> ProbeResult<Compound> {
        let mut compound = Compound::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => self.pos += 1,
            Some(c) if c.is_alphabetic() => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                Some(':') => return Err(self.error("pseudo-classes other than a leading :scope are not supported")),
                _ => break,
            }
        }

        if self.pos == start {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected selector, found {c:?}")),
                None => self.error("expected selector, found end of input"),
            });
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> ProbeResult<AttrMatcher> {
        let _ = self.skip_whitespace();
        let name = self.ident()?;
        let _ = self.skip_whitespace();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(AttrMatcher::Exists(name));
        }
        self.expect('=')?;
        let _ = self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.expect(quote)?;
                value
            }
            _ => self.ident()?,
        };
        let _ = self.skip_whitespace();
        self.expect(']')?;
        Ok(AttrMatcher::Equals(name, value))
    }
}

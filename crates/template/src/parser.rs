// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented parser for the template source language
//!
//! Statements are separated by newlines; `#` starts a full-line comment.
//! A statement is either a declaration `ident = expr` or a command
//! invocation `action entity key=value …`. Values may be bare words,
//! quoted strings, integers, booleans, lists (`[a,b]` or the legacy
//! bracketless comma tail), `+` concatenations, `{hole}`, `$ref` and
//! `@alias` forms. Holes embedded in a bare word (`subnet-{version}`)
//! produce a concatenation.

use crate::ast::{CommandNode, DeclExpr, Declaration, Expr, Statement, Val};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while parsing template text
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: unterminated quoted string")]
    UnterminatedString { line: usize },

    #[error("line {line}: unterminated list")]
    UnterminatedList { line: usize },

    #[error("line {line}: unclosed hole in '{word}'")]
    UnclosedHole { line: usize, word: String },
}

impl ParseError {
    fn syntax(line: usize, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Word(String),
    Quoted(String),
    Eq,
    Comma,
    LBracket,
    RBracket,
    Plus,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Word(w) => format!("'{}'", w),
            Tok::Quoted(s) => format!("'{}'", s),
            Tok::Eq => "'='".to_string(),
            Tok::Comma => "','".to_string(),
            Tok::LBracket => "'['".to_string(),
            Tok::RBracket => "']'".to_string(),
            Tok::Plus => "'+'".to_string(),
        }
    }
}

fn lex(line: &str, lineno: usize) -> Result<Vec<Tok>, ParseError> {
    let mut toks = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '=' => {
                chars.next();
                toks.push(Tok::Eq);
            }
            ',' => {
                chars.next();
                toks.push(Tok::Comma);
            }
            '[' => {
                chars.next();
                toks.push(Tok::LBracket);
            }
            ']' => {
                chars.next();
                toks.push(Tok::RBracket);
            }
            '+' => {
                chars.next();
                toks.push(Tok::Plus);
            }
            '\'' | '"' => {
                let quote = c;
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == quote {
                        closed = true;
                        break;
                    }
                    s.push(ch);
                }
                if !closed {
                    return Err(ParseError::UnterminatedString { line: lineno });
                }
                toks.push(Tok::Quoted(s));
            }
            _ => {
                let mut w = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || matches!(ch, '=' | ',' | '[' | ']' | '+' | '\'' | '"')
                    {
                        break;
                    }
                    w.push(ch);
                    chars.next();
                }
                toks.push(Tok::Word(w));
            }
        }
    }

    Ok(toks)
}

/// A word with no interpolation marker: usable as an action, entity,
/// identifier or param key.
fn bare_word(tok: &Tok) -> Option<&str> {
    match tok {
        Tok::Word(w)
            if !w.starts_with('$') && !w.starts_with('@') && !w.contains('{') && !w.is_empty() =>
        {
            Some(w)
        }
        _ => None,
    }
}

/// Turn a bare word into an expression: integers and booleans are
/// recognized, `$`/`@` prefixes produce references and aliases, embedded
/// `{…}` segments produce holes (a concatenation when mixed with text).
fn word_to_expr(w: &str, lineno: usize) -> Result<Expr, ParseError> {
    if let Some(name) = w.strip_prefix('$') {
        if name.is_empty() {
            return Err(ParseError::syntax(lineno, "empty reference name after '$'"));
        }
        return Ok(Expr::Ref(name.to_string()));
    }
    if let Some(name) = w.strip_prefix('@') {
        if name.is_empty() {
            return Err(ParseError::syntax(lineno, "empty alias name after '@'"));
        }
        return Ok(Expr::Alias(name.to_string()));
    }
    if w.contains('{') {
        return word_with_holes(w, lineno);
    }
    if let Ok(i) = w.parse::<i64>() {
        return Ok(Expr::Lit(Val::Int(i)));
    }
    match w {
        "true" => Ok(Expr::Lit(Val::Bool(true))),
        "false" => Ok(Expr::Lit(Val::Bool(false))),
        _ => Ok(Expr::Lit(Val::Str(w.to_string()))),
    }
}

fn word_with_holes(w: &str, lineno: usize) -> Result<Expr, ParseError> {
    let mut parts: Vec<Expr> = Vec::new();
    let mut literal = String::new();
    let mut rest = w;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(ParseError::UnclosedHole {
                line: lineno,
                word: w.to_string(),
            });
        };
        let name = &after[..close];
        if name.is_empty() {
            return Err(ParseError::syntax(lineno, format!("empty hole in '{}'", w)));
        }
        if !literal.is_empty() {
            parts.push(Expr::Lit(Val::Str(std::mem::take(&mut literal))));
        }
        parts.push(Expr::Hole(name.to_string()));
        rest = &after[close + 1..];
    }
    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(Expr::Lit(Val::Str(literal)));
    }

    if parts.len() == 1 {
        // A lone part is either `{hole}` or impossible (no '{' handled above)
        if let Some(part) = parts.pop() {
            return Ok(part);
        }
    }
    Ok(Expr::Concat(parts))
}

struct LineParser<'a> {
    toks: &'a [Tok],
    pos: usize,
    lineno: usize,
}

impl<'a> LineParser<'a> {
    fn peek(&self) -> Option<&'a Tok> {
        self.toks.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Tok> {
        let t = self.toks.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn at_end(&self) -> bool {
        self.pos >= self.toks.len()
    }

    /// One value term: a quoted string or a single word.
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let lineno = self.lineno;
        match self.next() {
            Some(Tok::Quoted(s)) => Ok(Expr::Lit(Val::Str(s.clone()))),
            Some(Tok::Word(w)) => word_to_expr(w, lineno),
            Some(other) => Err(ParseError::syntax(
                lineno,
                format!("expected a value, found {}", other.describe()),
            )),
            None => Err(ParseError::syntax(lineno, "expected a value")),
        }
    }

    /// `term (+ term)*`
    fn parse_concat(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_term()?;
        let mut parts = vec![first];
        while matches!(self.peek(), Some(Tok::Plus)) {
            self.next();
            parts.push(self.parse_term()?);
        }
        if parts.len() == 1 {
            if let Some(only) = parts.pop() {
                return Ok(only);
            }
        }
        Ok(Expr::Concat(parts))
    }

    /// A bracketed list or a single concat value.
    fn parse_value(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), Some(Tok::LBracket)) {
            self.next();
            let mut items = Vec::new();
            loop {
                match self.peek() {
                    Some(Tok::RBracket) => {
                        self.next();
                        break;
                    }
                    None => return Err(ParseError::UnterminatedList { line: self.lineno }),
                    Some(Tok::Comma) => {
                        self.next();
                    }
                    _ => items.push(self.parse_concat()?),
                }
            }
            return Ok(Expr::List(items));
        }
        self.parse_concat()
    }

    /// A value, extended into a list by the legacy bracketless comma tail
    /// (`subnets=sub-1, sub-2`).
    fn parse_value_tail(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_value()?;
        if !matches!(self.peek(), Some(Tok::Comma)) {
            return Ok(first);
        }
        let mut items = vec![first];
        while matches!(self.peek(), Some(Tok::Comma)) {
            self.next();
            items.push(self.parse_value()?);
        }
        Ok(Expr::List(items))
    }

    /// `action entity (key=value)*`
    fn parse_command(&mut self) -> Result<CommandNode, ParseError> {
        let lineno = self.lineno;
        let action = match self.next() {
            Some(tok) => bare_word(tok)
                .map(str::to_string)
                .ok_or_else(|| ParseError::syntax(lineno, "expected a command action"))?,
            None => return Err(ParseError::syntax(lineno, "expected a command action")),
        };
        let entity = match self.next() {
            Some(tok) => bare_word(tok).map(str::to_string).ok_or_else(|| {
                ParseError::syntax(lineno, format!("expected an entity after '{}'", action))
            })?,
            None => {
                return Err(ParseError::syntax(
                    lineno,
                    format!("expected an entity after '{}'", action),
                ))
            }
        };

        let mut params: BTreeMap<String, Expr> = BTreeMap::new();
        while !self.at_end() {
            let key = match self.next() {
                Some(tok) => bare_word(tok)
                    .map(str::to_string)
                    .ok_or_else(|| ParseError::syntax(lineno, "expected a param key"))?,
                None => break,
            };
            match self.next() {
                Some(Tok::Eq) => {}
                _ => {
                    return Err(ParseError::syntax(
                        lineno,
                        format!("expected '=' after param key '{}'", key),
                    ))
                }
            }
            let value = self.parse_value_tail()?;
            params.insert(key, value);
        }

        Ok(CommandNode {
            action,
            entity,
            params,
            ..CommandNode::default()
        })
    }

    /// The right-hand side of a declaration: a command when it opens with
    /// two bare words, a value expression otherwise.
    fn parse_decl_expr(&mut self) -> Result<DeclExpr, ParseError> {
        let looks_like_command = bare_word(self.toks.get(self.pos).unwrap_or(&Tok::Eq)).is_some()
            && bare_word(self.toks.get(self.pos + 1).unwrap_or(&Tok::Eq)).is_some();
        if looks_like_command {
            return Ok(DeclExpr::Command(self.parse_command()?));
        }
        let expr = self.parse_value_tail()?;
        if !self.at_end() {
            return Err(ParseError::syntax(
                self.lineno,
                "unexpected trailing input after value",
            ));
        }
        Ok(DeclExpr::Value(expr))
    }
}

fn parse_statement(toks: &[Tok], lineno: usize) -> Result<Statement, ParseError> {
    let mut p = LineParser {
        toks,
        pos: 0,
        lineno,
    };

    if toks.len() >= 2 && toks[1] == Tok::Eq {
        let ident = bare_word(&toks[0])
            .map(str::to_string)
            .ok_or_else(|| ParseError::syntax(lineno, "expected an identifier before '='"))?;
        p.pos = 2;
        let expr = p.parse_decl_expr()?;
        return Ok(Statement::Declaration(Declaration { ident, expr }));
    }

    let node = p.parse_command()?;
    if !p.at_end() {
        return Err(ParseError::syntax(lineno, "unexpected trailing input"));
    }
    Ok(Statement::Command(node))
}

/// Parse a `key=value …` binding list (external fillers).
pub(crate) fn parse_param_bindings(input: &str) -> Result<Vec<(String, Expr)>, ParseError> {
    let toks = lex(input.trim(), 1)?;
    let mut p = LineParser {
        toks: &toks,
        pos: 0,
        lineno: 1,
    };
    let mut out = Vec::new();
    while !p.at_end() {
        let key = match p.next() {
            Some(tok) => bare_word(tok)
                .map(str::to_string)
                .ok_or_else(|| ParseError::syntax(1, "expected a param key"))?,
            None => break,
        };
        match p.next() {
            Some(Tok::Eq) => {}
            _ => {
                return Err(ParseError::syntax(
                    1,
                    format!("expected '=' after param key '{}'", key),
                ))
            }
        }
        out.push((key, p.parse_value_tail()?));
    }
    Ok(out)
}

/// Parse one value using the template value grammar.
pub(crate) fn parse_single_value(input: &str) -> Result<Expr, ParseError> {
    let toks = lex(input.trim(), 1)?;
    let mut p = LineParser {
        toks: &toks,
        pos: 0,
        lineno: 1,
    };
    let expr = p.parse_value_tail()?;
    if !p.at_end() {
        return Err(ParseError::syntax(1, "unexpected trailing input after value"));
    }
    Ok(expr)
}

/// Parse template source text into statements. Blank lines and `#`
/// comment lines are skipped.
pub fn parse(input: &str) -> Result<Vec<Statement>, ParseError> {
    let mut statements = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let lineno = i + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let toks = lex(trimmed, lineno)?;
        if toks.is_empty() {
            continue;
        }
        statements.push(parse_statement(&toks, lineno)?);
    }
    Ok(statements)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

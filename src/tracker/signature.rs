// JVMS 4.7.9.1 Signatures – walks class/field/method/type signatures and
// submits every class type they mention

use super::sink::ClassSink;
use crate::classfile::ClassId;
use crate::consts::{PRIMITIVE_DESCRIPTORS, TRACKER_MAX_SIGNATURE_DEPTH, TRACKER_MAX_SIGNATURE_ITERS};
use crate::error::{Error, Result};

// Public API
pub fn parse_class_signature<S: ClassSink + ?Sized>(text: &str, sink: &mut S) -> Result<()> {
    let mut p = Parser::new(text, sink);
    if p.peek() == Some('<') {
        p.parse_formal_type_parameters()?;
    }
    // superclass, then interfaces
    p.parse_class_type_signature()?;
    while p.parse_class_type_signature()? {
        p.tick()?;
    }
    p.finish()
}

pub fn parse_field_signature<S: ClassSink + ?Sized>(text: &str, sink: &mut S) -> Result<()> {
    let mut p = Parser::new(text, sink);
    p.parse_field_type_signature()?;
    p.finish()
}

pub fn parse_method_signature<S: ClassSink + ?Sized>(text: &str, sink: &mut S) -> Result<()> {
    let mut p = Parser::new(text, sink);
    if p.peek() == Some('<') {
        p.parse_formal_type_parameters()?;
    }
    p.expect('(')?;
    while p.parse_type_signature()? {
        p.tick()?;
    }
    p.expect(')')?;
    p.parse_return_type()?;
    while p.parse_throws_signature()? {
        p.tick()?;
    }
    p.finish()
}

/// A field descriptor or any other single type, primitives included
pub fn parse_type_signature<S: ClassSink + ?Sized>(text: &str, sink: &mut S) -> Result<()> {
    let mut p = Parser::new(text, sink);
    p.parse_type_signature()?;
    p.finish()
}

// Parser implementation. Each production returns Ok(false) when the input
// does not start with it, and an error when it starts but cannot finish.
struct Parser<'t, 's, S: ClassSink + ?Sized> {
    text: &'t str,
    pos: usize,
    sink: &'s mut S,
    steps: usize,
    depth: usize,
}

impl<'t, 's, S: ClassSink + ?Sized> Parser<'t, 's, S> {
    fn new(text: &'t str, sink: &'s mut S) -> Self {
        Self { text, pos: 0, sink, steps: 0, depth: 0 }
    }

    fn rest(&self) -> &'t str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::signature_error(self.text, self.pos, message)
    }

    fn expect(&mut self, c: char) -> Result<()> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", c)))
        }
    }

    /// The whole text must have been consumed
    fn finish(&self) -> Result<()> {
        if self.peek().is_some() {
            return Err(self.error("trailing characters"));
        }
        Ok(())
    }

    // Safety cap: prevent pathological loops on malformed signatures
    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if self.steps > TRACKER_MAX_SIGNATURE_ITERS {
            return Err(self.error("too many elements"));
        }
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > TRACKER_MAX_SIGNATURE_DEPTH {
            return Err(self.error("nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Offset of the first of `terms` in the remaining text, or its length
    fn next_in(&self, terms: &[char]) -> usize {
        self.rest().find(terms).unwrap_or(self.rest().len())
    }

    fn parse_formal_type_parameters(&mut self) -> Result<()> {
        self.expect('<')?;
        while self.parse_formal_type_parameter()? {
            self.tick()?;
        }
        self.expect('>')
    }

    fn parse_formal_type_parameter(&mut self) -> Result<bool> {
        match self.peek() {
            None | Some('>') => return Ok(false),
            _ => {}
        }
        // the identifier itself names no class
        match self.rest().find(':') {
            Some(colon) => self.pos += colon,
            None => return Err(self.error("type parameter without bound")),
        }
        self.parse_bound()?;
        while self.parse_bound()? {
            self.tick()?;
        }
        Ok(true)
    }

    // ClassBound and InterfaceBound share a shape: ':' then an optional type
    fn parse_bound(&mut self) -> Result<bool> {
        if self.peek() != Some(':') {
            return Ok(false);
        }
        self.bump();
        self.parse_field_type_signature()?;
        Ok(true)
    }

    fn parse_field_type_signature(&mut self) -> Result<bool> {
        Ok(self.parse_class_type_signature()?
            || self.parse_array_type_signature()?
            || self.parse_type_variable_signature()?)
    }

    fn parse_array_type_signature(&mut self) -> Result<bool> {
        if self.peek() != Some('[') {
            return Ok(false);
        }
        self.bump();
        self.enter()?;
        self.parse_type_signature()?;
        self.leave();
        Ok(true)
    }

    fn parse_type_signature(&mut self) -> Result<bool> {
        match self.peek() {
            None => Ok(false),
            Some(c) if PRIMITIVE_DESCRIPTORS.contains(&c) => {
                self.bump();
                Ok(true)
            }
            Some(_) => self.parse_field_type_signature(),
        }
    }

    fn parse_return_type(&mut self) -> Result<bool> {
        match self.peek() {
            None => Ok(false),
            Some('V') => {
                self.bump();
                Ok(true)
            }
            Some(_) => {
                self.parse_type_signature()?;
                Ok(true)
            }
        }
    }

    fn parse_type_variable_signature(&mut self) -> Result<bool> {
        if self.peek() != Some('T') {
            return Ok(false);
        }
        match self.rest().find(';') {
            Some(semi) => self.pos += semi + 1,
            None => return Err(self.error("unterminated type variable")),
        }
        Ok(true)
    }

    fn parse_class_type_signature(&mut self) -> Result<bool> {
        if self.peek() != Some('L') {
            return Ok(false);
        }
        self.bump();
        let min = self.next_in(&[';', '<', '.']);
        let package = match self.rest()[..min].rfind('/') {
            Some(slash) => {
                let package = self.rest()[..=slash].to_string();
                self.pos += slash + 1;
                package
            }
            None => String::new(),
        };
        self.parse_simple_class_type_signatures(package)?;
        Ok(true)
    }

    fn parse_simple_class_type_signatures(&mut self, mut prefix: String) -> Result<()> {
        loop {
            self.tick()?;
            let min = self.next_in(&[';', '<', '.']);
            let class_name = format!("{}{}", prefix, &self.rest()[..min]);
            let id = ClassId::parse(&class_name)
                .map_err(|_| self.error(format!("bad class name '{}'", class_name)))?;
            self.sink.submit(&id);
            self.pos += min;

            if self.peek() == Some('<') {
                self.bump();
                self.enter()?;
                while self.parse_type_argument()? {
                    self.tick()?;
                }
                self.expect('>')?;
                self.leave();
            }
            if self.peek() == Some('.') {
                self.bump();
                prefix = format!("{}$", class_name);
                continue;
            }
            return self.expect(';');
        }
    }

    fn parse_type_argument(&mut self) -> Result<bool> {
        match self.peek() {
            None => Ok(false),
            Some('*') => {
                self.bump();
                Ok(true)
            }
            Some('+') | Some('-') => {
                self.bump();
                self.parse_field_type_signature()?;
                Ok(true)
            }
            Some(_) => self.parse_field_type_signature(),
        }
    }

    fn parse_throws_signature(&mut self) -> Result<bool> {
        if self.peek() != Some('^') {
            return Ok(false);
        }
        self.bump();
        if !self.parse_type_variable_signature()? {
            self.parse_class_type_signature()?;
        }
        Ok(true)
    }
}

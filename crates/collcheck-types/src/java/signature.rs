//! Parser for source-like generic type signatures such as
//! `java.util.Map<K, java.util.List<? extends java.lang.Number>>[]`.

use std::collections::HashMap;

use thiserror::Error;

use crate::{PrimitiveType, Type, TypeEnv, TypeVarId, WildcardBound};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid type signature `{input}` at offset {offset}: {message}")]
    Syntax {
        input: String,
        offset: usize,
        message: &'static str,
    },
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("type variable `{0}` cannot take type arguments")]
    ArgumentsOnTypeVariable(String),
}

/// Unresolved syntax tree of a type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSig {
    Primitive(PrimitiveType),
    /// A dotted name with optional type arguments. A single-segment name may denote a type
    /// variable; that is decided during [`TypeSig::resolve`].
    Named { name: String, args: Vec<TypeSig> },
    Array(Box<TypeSig>),
    Wildcard,
    WildcardExtends(Box<TypeSig>),
    WildcardSuper(Box<TypeSig>),
}

impl TypeSig {
    /// Resolve names against `env`; single-segment names found in `type_vars` become type
    /// variables.
    pub fn resolve(
        &self,
        env: &dyn TypeEnv,
        type_vars: &HashMap<String, TypeVarId>,
    ) -> Result<Type, SignatureError> {
        match self {
            TypeSig::Primitive(p) => Ok(Type::Primitive(*p)),
            TypeSig::Named { name, args } => {
                if !name.contains('.') {
                    if let Some(id) = type_vars.get(name) {
                        if !args.is_empty() {
                            return Err(SignatureError::ArgumentsOnTypeVariable(name.clone()));
                        }
                        return Ok(Type::TypeVar(*id));
                    }
                }
                let def = env
                    .lookup_class(name)
                    .ok_or_else(|| SignatureError::UnknownType(name.clone()))?;
                let args = args
                    .iter()
                    .map(|arg| arg.resolve(env, type_vars))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Type::class(def, args))
            }
            TypeSig::Array(elem) => Ok(Type::Array(Box::new(elem.resolve(env, type_vars)?))),
            TypeSig::Wildcard => Ok(Type::Wildcard(WildcardBound::Unbounded)),
            TypeSig::WildcardExtends(upper) => Ok(Type::Wildcard(WildcardBound::Extends(
                Box::new(upper.resolve(env, type_vars)?),
            ))),
            TypeSig::WildcardSuper(lower) => Ok(Type::Wildcard(WildcardBound::Super(Box::new(
                lower.resolve(env, type_vars)?,
            )))),
        }
    }
}

pub fn parse_type_signature(input: &str) -> Result<TypeSig, SignatureError> {
    let mut parser = Parser { input, pos: 0 };
    let sig = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos != input.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(sig)
}

/// Parse and resolve a signature that mentions no type variables.
pub fn parse_type(env: &dyn TypeEnv, input: &str) -> Result<Type, SignatureError> {
    parse_type_signature(input)?.resolve(env, &HashMap::new())
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &'static str) -> SignatureError {
        SignatureError::Syntax {
            input: self.input.to_string(),
            offset: self.pos,
            message,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let input = self.input;
        let start = self.pos;
        while let Some(c) = self.peek() {
            let ok = if self.pos == start {
                c.is_alphabetic() || c == '_' || c == '$'
            } else {
                c.is_alphanumeric() || c == '_' || c == '$'
            };
            if !ok {
                break;
            }
            self.pos += c.len_utf8();
        }
        (self.pos > start).then(|| &input[start..self.pos])
    }

    fn keyword(&mut self, keyword: &str) -> bool {
        let saved = self.pos;
        match self.ident() {
            Some(word) if word == keyword => true,
            _ => {
                self.pos = saved;
                false
            }
        }
    }

    fn parse_type(&mut self) -> Result<TypeSig, SignatureError> {
        let first = self
            .ident()
            .ok_or_else(|| self.error("expected a type name"))?
            .to_string();

        let mut sig = match PrimitiveType::from_keyword(&first) {
            Some(p) => TypeSig::Primitive(p),
            None => {
                let mut name = first;
                while self.eat('.') {
                    let segment = self
                        .ident()
                        .ok_or_else(|| self.error("expected a name segment after `.`"))?;
                    name.push('.');
                    name.push_str(segment);
                }
                let args = if self.eat('<') {
                    self.parse_type_args()?
                } else {
                    Vec::new()
                };
                TypeSig::Named { name, args }
            }
        };

        while self.eat('[') {
            if !self.eat(']') {
                return Err(self.error("expected `]`"));
            }
            sig = TypeSig::Array(Box::new(sig));
        }
        Ok(sig)
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeSig>, SignatureError> {
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type_arg()?);
            if self.eat(',') {
                continue;
            }
            if self.eat('>') {
                return Ok(args);
            }
            return Err(self.error("expected `,` or `>`"));
        }
    }

    fn parse_type_arg(&mut self) -> Result<TypeSig, SignatureError> {
        if !self.eat('?') {
            return self.parse_type();
        }
        if self.keyword("extends") {
            return Ok(TypeSig::WildcardExtends(Box::new(self.parse_type()?)));
        }
        if self.keyword("super") {
            return Ok(TypeSig::WildcardSuper(Box::new(self.parse_type()?)));
        }
        Ok(TypeSig::Wildcard)
    }
}

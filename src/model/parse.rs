//! Parser for the textual type expressions used by fixture models:
//! `java.util.Map<java.lang.String, T>[]`, `? super a.B`, `T extends a.B & a.C`.

use anyhow::{Result, anyhow, bail};

use super::{Primitive, SourceType, TypeVarId};

/// `java.lang` names that may be written unqualified.
const JAVA_LANG: &[&str] = &[
    "Object",
    "String",
    "Boolean",
    "Character",
    "Byte",
    "Short",
    "Integer",
    "Long",
    "Float",
    "Double",
    "Number",
    "Enum",
    "Class",
    "Throwable",
    "StackTraceElement",
];

/// Names visible while parsing one declaration's type expressions.
pub(crate) struct Scope<'a> {
    pub declaring_type: &'a str,
    pub type_params: &'a [String],
    /// Declaring method name and its own type parameters, if parsing a signature.
    pub method: Option<(&'a str, &'a [String])>,
}

impl Scope<'_> {
    fn lookup_var(&self, name: &str) -> Option<TypeVarId> {
        if let Some((method, params)) = self.method {
            if params.iter().any(|p| p == name) {
                return Some(TypeVarId::of_method(self.declaring_type, method, name));
            }
        }
        self.type_params
            .iter()
            .any(|p| p == name)
            .then(|| TypeVarId::of_type(self.declaring_type, name))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Punct(char),
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if matches!(c, '<' | '>' | ',' | '[' | ']' | '?' | '&') {
            tokens.push(Token::Punct(c));
            chars.next();
        } else if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
            let mut ident = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_alphanumeric() || c == '_' || c == '$' || c == '.' {
                    ident.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(ident));
        } else {
            bail!("unexpected character '{c}' in type expression '{input}'");
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    scope: &'a Scope<'a>,
    source: &'a str,
}

impl Parser<'_> {
    fn peek_punct(&self, c: char) -> bool {
        self.tokens.get(self.pos) == Some(&Token::Punct(c))
    }

    fn peek_ident(&self, word: &str) -> bool {
        matches!(self.tokens.get(self.pos), Some(Token::Ident(w)) if w == word)
    }

    fn expect_punct(&mut self, c: char) -> Result<()> {
        if self.peek_punct(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(anyhow!("expected '{c}' in type expression '{}'", self.source))
        }
    }

    fn next_ident(&mut self) -> Result<String> {
        match self.tokens.get(self.pos) {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(anyhow!("expected a name in type expression '{}'", self.source)),
        }
    }

    fn parse_type(&mut self) -> Result<SourceType> {
        let mut ty = self.parse_base()?;
        while self.peek_punct('[') {
            self.pos += 1;
            self.expect_punct(']')?;
            ty = SourceType::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_bound(&mut self) -> Result<SourceType> {
        let first = self.parse_type()?;
        if !self.peek_punct('&') {
            return Ok(first);
        }
        let mut parts = vec![first];
        while self.peek_punct('&') {
            self.pos += 1;
            parts.push(self.parse_type()?);
        }
        Ok(SourceType::Intersection(parts))
    }

    fn parse_base(&mut self) -> Result<SourceType> {
        if self.peek_punct('?') {
            self.pos += 1;
            if self.peek_ident("extends") {
                self.pos += 1;
                let bound = self.parse_type()?;
                return Ok(SourceType::Wildcard {
                    extends: Some(Box::new(bound)),
                    super_bound: None,
                });
            }
            if self.peek_ident("super") {
                self.pos += 1;
                let bound = self.parse_type()?;
                return Ok(SourceType::Wildcard {
                    extends: None,
                    super_bound: Some(Box::new(bound)),
                });
            }
            return Ok(SourceType::Wildcard {
                extends: None,
                super_bound: None,
            });
        }

        let name = self.next_ident()?;
        if let Some(p) = Primitive::from_keyword(&name) {
            return Ok(SourceType::Primitive(p));
        }
        match name.as_str() {
            "void" => return Ok(SourceType::Void),
            "null" => return Ok(SourceType::Null),
            _ => {}
        }
        if let Some(var) = self.scope.lookup_var(&name) {
            return Ok(SourceType::TypeVar(var));
        }

        let mut args = Vec::new();
        if self.peek_punct('<') {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                if self.peek_punct(',') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            self.expect_punct('>')?;
        }
        Ok(SourceType::Declared {
            name: qualify(&name),
            args,
        })
    }
}

fn qualify(name: &str) -> String {
    if JAVA_LANG.contains(&name) {
        format!("java.lang.{name}")
    } else {
        name.to_owned()
    }
}

/// Parse a complete type expression.
pub(crate) fn parse_type(source: &str, scope: &Scope<'_>) -> Result<SourceType> {
    let mut parser = Parser {
        tokens: tokenize(source)?,
        pos: 0,
        scope,
        source,
    };
    let ty = parser.parse_bound()?;
    if parser.pos != parser.tokens.len() {
        bail!("trailing input in type expression '{source}'");
    }
    Ok(ty)
}

/// Split a type-parameter declaration `T extends a.B<T>` into name and bound text.
pub(crate) fn split_type_param(source: &str) -> (String, Option<String>) {
    match source.split_once(" extends ") {
        Some((name, bound)) => (name.trim().to_owned(), Some(bound.trim().to_owned())),
        None => (source.trim().to_owned(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope<'a>(params: &'a [String]) -> Scope<'a> {
        Scope {
            declaring_type: "a.Box",
            type_params: params,
            method: None,
        }
    }

    #[test]
    fn test_parse_nested_generic_array() {
        let params = vec!["T".to_owned()];
        let ty = parse_type("java.util.Map<String, T>[]", &scope(&params)).unwrap();
        let SourceType::Array(inner) = ty else {
            panic!("expected array");
        };
        assert_eq!(inner.display_name(), "java.util.Map<java.lang.String,T>");
    }

    #[test]
    fn test_parse_wildcards() {
        let params: Vec<String> = Vec::new();
        let ty = parse_type("java.util.List<? super a.B>", &scope(&params)).unwrap();
        assert_eq!(ty.display_name(), "java.util.List<? super a.B>");
        let ty = parse_type("java.util.List<?>", &scope(&params)).unwrap();
        assert_eq!(ty.display_name(), "java.util.List<?>");
    }

    #[test]
    fn test_parse_method_variable_shadows_class_variable() {
        let params = vec!["T".to_owned()];
        let method_params = vec!["T".to_owned()];
        let scope = Scope {
            declaring_type: "a.Box",
            type_params: &params,
            method: Some(("get", method_params.as_slice())),
        };
        let ty = parse_type("T", &scope).unwrap();
        assert_eq!(
            ty,
            SourceType::TypeVar(TypeVarId::of_method("a.Box", "get", "T"))
        );
    }

    #[test]
    fn test_parse_intersection_bound() {
        let params: Vec<String> = Vec::new();
        let ty = parse_type("a.B & a.C", &scope(&params)).unwrap();
        assert!(matches!(ty, SourceType::Intersection(ref parts) if parts.len() == 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let params: Vec<String> = Vec::new();
        assert!(parse_type("a.B<", &scope(&params)).is_err());
        assert!(parse_type("a.B c.D", &scope(&params)).is_err());
        assert!(parse_type("a.B;", &scope(&params)).is_err());
    }

    #[test]
    fn test_split_type_param() {
        assert_eq!(
            split_type_param("T extends a.Box<T>"),
            ("T".to_owned(), Some("a.Box<T>".to_owned()))
        );
        assert_eq!(split_type_param("U"), ("U".to_owned(), None));
    }
}

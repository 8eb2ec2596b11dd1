//! Tokenized form of the assembly-like script format.
//!
//! A source file has three parts:
//!
//! ```text
//! ; free text before the first directive      <- prelude
//! .id                 1004                    <- header (directives)
//! .int_var_count      2
//!    iload                  0                 <- body
//!    if_icmpeq              LABEL7
//!    return
//! LABEL7:
//!    iconst                 1 ; annotated
//! ```
//!
//! Body tokens live in a flat arena; label definitions are found through a
//! name → index map that is rebuilt whenever the arena is replaced and kept
//! in step by [`ScriptSource::set_opcode`].

use crate::error::{ParseErrorKind, Result, UpdaterError};
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Column instruction operands start at.
pub const OPCODE_WIDTH: usize = 22;
/// Column directive values start at.
pub const DIRECTIVE_WIDTH: usize = 19;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(?P<prefix> *)(?P<opcode>[^ ;"]+ *)?(?P<operand>[^;]*?)(?P<comment> *;.*)?$"#)
            .unwrap_or_else(|e| unreachable!("line pattern is valid: {e}"))
    })
}

/// One parsed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Leading indentation
    pub prefix: String,
    /// Mnemonic, directive name (`.id`) or label (`LABEL7:`)
    pub opcode: Option<String>,
    pub operand: String,
    /// Trailing comment including its `;` and any alignment spaces
    pub comment: Option<String>,
}

impl Token {
    /// Parse a single line. Never fails; unrecognized text lands in the
    /// operand.
    pub fn parse(line: &str) -> Self {
        let Some(caps) = line_pattern().captures(line) else {
            return Self {
                prefix: String::new(),
                opcode: None,
                operand: line.to_string(),
                comment: None,
            };
        };

        let prefix = caps.name("prefix").map_or("", |m| m.as_str()).to_string();
        let operand = caps.name("operand").map_or("", |m| m.as_str()).to_string();
        let mut comment = caps.name("comment").map(|m| m.as_str().to_string());

        let opcode = caps.name("opcode").map(|m| {
            let raw = m.as_str();
            let trimmed = raw.trim();
            let natural = if trimmed.ends_with(':') {
                0
            } else {
                OPCODE_WIDTH
            };
            let extra = raw.len().saturating_sub(natural.max(trimmed.len()));
            if operand.is_empty() && extra > 0 {
                if let Some(c) = comment.as_mut() {
                    c.insert_str(0, &" ".repeat(extra));
                }
            }
            trimmed.to_string()
        });

        Self {
            prefix,
            opcode,
            operand,
            comment,
        }
    }

    /// An indented instruction with no comment.
    pub fn instruction(opcode: impl Into<String>, operand: impl Into<String>) -> Self {
        Self {
            prefix: "   ".to_string(),
            opcode: Some(opcode.into()),
            operand: operand.into(),
            comment: None,
        }
    }

    /// A label definition line.
    pub fn label(name: &str) -> Self {
        Self {
            prefix: String::new(),
            opcode: Some(format!("{name}:")),
            operand: String::new(),
            comment: None,
        }
    }

    pub fn opcode(&self) -> Option<&str> {
        self.opcode.as_deref()
    }

    pub fn is_directive(&self) -> bool {
        self.opcode.as_deref().is_some_and(|op| op.starts_with('.'))
    }

    /// Name of the label this line defines, if any.
    ///
    /// Switch-table rows (`1: LABEL5`) end in `:` as well but carry an
    /// operand, so they are references, not definitions.
    pub fn label_name(&self) -> Option<&str> {
        if !self.operand.is_empty() {
            return None;
        }
        self.opcode.as_deref().and_then(|op| op.strip_suffix(':'))
    }

    pub fn is_label(&self) -> bool {
        self.label_name().is_some()
    }

    /// Render as a directive line: `.name` padded, then the value.
    pub fn render_directive(&self) -> String {
        let name = self.opcode.as_deref().unwrap_or_default();
        let mut out = if self.operand.is_empty() {
            name.to_string()
        } else {
            format!("{name:<DIRECTIVE_WIDTH$} {}", self.operand)
        };
        if let Some(comment) = &self.comment {
            out.push_str(comment);
        }
        out
    }
}

impl fmt::Display for Token {
    /// Render as a body line.
    ///
    /// Instructions are padded to [`OPCODE_WIDTH`] when anything follows
    /// them; labels and switch rows are never padded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        let trailing = !self.operand.is_empty() || self.comment.is_some();
        if let Some(opcode) = &self.opcode {
            if opcode.ends_with(':') || !trailing {
                f.write_str(opcode)?;
            } else {
                write!(f, "{opcode:<OPCODE_WIDTH$}")?;
            }
        }
        if !self.operand.is_empty() {
            write!(f, " {}", self.operand)?;
        }
        if let Some(comment) = &self.comment {
            f.write_str(comment)?;
        }
        Ok(())
    }
}

/// A tokenized script.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptSource {
    prelude: String,
    header: IndexMap<String, Token>,
    body: Vec<Token>,
    #[serde(skip)]
    labels: HashMap<String, usize>,
}

impl ScriptSource {
    /// Tokenize source text.
    ///
    /// # Errors
    ///
    /// Returns a parse error when a label is defined twice.
    pub fn parse(text: &str) -> Result<Self> {
        let mut prelude = String::new();
        let mut header = IndexMap::new();
        let mut body = Vec::new();

        for line in text.lines() {
            let token = Token::parse(line);
            if token.is_directive() {
                let name = token.opcode.clone().unwrap_or_default();
                header.insert(name, token);
            } else if header.is_empty() {
                prelude.push_str(line);
                prelude.push('\n');
            } else {
                body.push(token);
            }
        }

        Self::from_parts(prelude, header, body)
    }

    /// Assemble from already tokenized parts, indexing labels.
    ///
    /// # Errors
    ///
    /// Returns a parse error when a label is defined twice.
    pub fn from_parts(
        prelude: String,
        header: IndexMap<String, Token>,
        body: Vec<Token>,
    ) -> Result<Self> {
        let labels = index_labels(&body)?;
        Ok(Self {
            prelude,
            header,
            body,
            labels,
        })
    }

    pub fn prelude(&self) -> &str {
        &self.prelude
    }

    pub fn header(&self) -> &IndexMap<String, Token> {
        &self.header
    }

    pub fn body(&self) -> &[Token] {
        &self.body
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Value of a header directive such as `.id`.
    pub fn directive(&self, name: &str) -> Option<&str> {
        self.header.get(name).map(|t| t.operand.trim())
    }

    /// Integer value of a header directive.
    ///
    /// # Errors
    ///
    /// Missing or non-numeric directives are parse errors.
    pub fn directive_int(&self, name: &str) -> Result<i64> {
        let value = self
            .directive(name)
            .ok_or_else(|| UpdaterError::missing_directive(name))?;
        value.parse().map_err(|_| {
            UpdaterError::parse(
                "script header",
                ParseErrorKind::InvalidDirective {
                    directive: name.to_string(),
                    value: value.to_string(),
                },
            )
        })
    }

    /// The script id from the `.id` directive.
    pub fn id(&self) -> Result<i64> {
        self.directive_int(".id")
    }

    /// Set a directive value, appending it when absent.
    pub fn set_directive(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.header.get_mut(name) {
            Some(token) => token.operand = value,
            None => {
                let token = Token {
                    prefix: String::new(),
                    opcode: Some(name.to_string()),
                    operand: value,
                    comment: None,
                };
                self.header.insert(name.to_string(), token);
            }
        }
    }

    /// Body index of a label definition.
    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }

    pub fn labels(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Whether `token`'s operand names a label defined in this script.
    pub fn references_label(&self, token: &Token) -> bool {
        !token.operand.is_empty() && self.labels.contains_key(token.operand.trim())
    }

    /// Replace a body token's opcode, keeping the label index in step.
    ///
    /// # Errors
    ///
    /// Fails without modifying anything when the new opcode defines a label
    /// that already exists elsewhere.
    pub fn set_opcode(&mut self, index: usize, opcode: Option<String>) -> Result<()> {
        let Some(token) = self.body.get(index) else {
            return Err(UpdaterError::validation(format!(
                "body index {index} out of range ({} tokens)",
                self.body.len()
            )));
        };

        let mut updated = token.clone();
        updated.opcode = opcode;
        if let Some(name) = updated.label_name() {
            if let Some(&existing) = self.labels.get(name) {
                if existing != index {
                    return Err(duplicate_label(name, existing, index));
                }
            }
        }

        if let Some(old) = token.label_name() {
            self.labels.remove(old);
        }
        if let Some(name) = updated.label_name() {
            self.labels.insert(name.to_string(), index);
        }
        self.body[index] = updated;
        Ok(())
    }

    /// Render back to text, one line per token.
    pub fn render(&self) -> String {
        render_parts(&self.prelude, &self.header, &self.body)
    }
}

/// Render a prelude, header and body as script text.
pub fn render_parts(prelude: &str, header: &IndexMap<String, Token>, body: &[Token]) -> String {
    let mut out = prelude.to_string();
    for token in header.values() {
        out.push_str(&token.render_directive());
        out.push('\n');
    }
    for token in body {
        out.push_str(&token.to_string());
        out.push('\n');
    }
    out
}

fn index_labels(body: &[Token]) -> Result<HashMap<String, usize>> {
    let mut labels = HashMap::new();
    for (index, token) in body.iter().enumerate() {
        if let Some(name) = token.label_name() {
            if let Some(&first) = labels.get(name) {
                return Err(duplicate_label(name, first, index));
            }
            labels.insert(name.to_string(), index);
        }
    }
    Ok(labels)
}

fn duplicate_label(name: &str, first: usize, second: usize) -> UpdaterError {
    UpdaterError::parse(
        "script body",
        ParseErrorKind::DuplicateLabel {
            label: name.to_string(),
            first: first + 1,
            second: second + 1,
        },
    )
}

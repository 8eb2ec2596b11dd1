//! Generated ID-constant source files.
//!
//! Only lines shaped like `public static final int NAME = 123;` are
//! understood. Everything else is kept byte-for-byte, line endings
//! included, so rewriting a value leaves the rest of the file untouched.

use crate::error::{ParseErrorKind, Result, UpdaterError};
use regex::Regex;
use std::sync::OnceLock;

fn constant_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<head>\s*(?:public\s+)?(?:static\s+)?(?:final\s+)?int\s+)(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?P<eq>\s*=\s*)(?P<value>-?(?:0[xX][0-9a-fA-F]+|\d+))(?P<tail>\s*;.*)$",
        )
        .unwrap_or_else(|e| unreachable!("constant pattern is valid: {e}"))
    })
}

/// How a value was written, so rewrites keep the original style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    /// `prefix` is `x` or `X`; `upper` records the digit case
    Hex { prefix: char, upper: bool },
}

/// A recognized `int NAME = value;` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    head: String,
    name: String,
    eq: String,
    value: i64,
    radix: Radix,
    tail: String,
}

impl Constant {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn set_value(&mut self, value: i64) {
        self.value = value;
    }

    fn parse(line: &str) -> Option<Self> {
        let caps = constant_pattern().captures(line)?;
        let literal = &caps["value"];
        let (negative, digits) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };

        let (magnitude, radix) = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            let prefix = digits.chars().nth(1).unwrap_or('x');
            let upper = hex.chars().any(|c| c.is_ascii_uppercase());
            (
                i64::from_str_radix(hex, 16).ok()?,
                Radix::Hex { prefix, upper },
            )
        } else {
            (digits.parse::<i64>().ok()?, Radix::Decimal)
        };

        Some(Self {
            head: caps["head"].to_string(),
            name: caps["name"].to_string(),
            eq: caps["eq"].to_string(),
            value: if negative { -magnitude } else { magnitude },
            radix,
            tail: caps["tail"].to_string(),
        })
    }

    fn render_value(&self) -> String {
        let sign = if self.value < 0 { "-" } else { "" };
        let magnitude = self.value.unsigned_abs();
        match self.radix {
            Radix::Decimal => self.value.to_string(),
            Radix::Hex { prefix, upper: true } => format!("{sign}0{prefix}{magnitude:X}"),
            Radix::Hex {
                prefix,
                upper: false,
            } => format!("{sign}0{prefix}{magnitude:x}"),
        }
    }

    fn render(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.head,
            self.name,
            self.eq,
            self.render_value(),
            self.tail
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    Text(String),
    Constant(Constant),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    kind: LineKind,
    ending: String,
}

/// A constants file split into recognized constants and opaque lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantsFile {
    lines: Vec<Line>,
}

impl ConstantsFile {
    /// # Errors
    ///
    /// Fails when the text contains no recognizable constant.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = Vec::new();
        for chunk in text.split_inclusive('\n') {
            let (body, ending) = if let Some(body) = chunk.strip_suffix("\r\n") {
                (body, "\r\n")
            } else if let Some(body) = chunk.strip_suffix('\n') {
                (body, "\n")
            } else {
                (chunk, "")
            };
            let kind = match Constant::parse(body) {
                Some(constant) => LineKind::Constant(constant),
                None => LineKind::Text(body.to_string()),
            };
            lines.push(Line {
                kind,
                ending: ending.to_string(),
            });
        }

        let file = Self { lines };
        if file.constants().next().is_none() {
            return Err(UpdaterError::parse(
                "constants file",
                ParseErrorKind::NoConstants,
            ));
        }
        Ok(file)
    }

    pub fn constants(&self) -> impl Iterator<Item = &Constant> {
        self.lines.iter().filter_map(|line| match &line.kind {
            LineKind::Constant(c) => Some(c),
            LineKind::Text(_) => None,
        })
    }

    pub fn constants_mut(&mut self) -> impl Iterator<Item = &mut Constant> {
        self.lines.iter_mut().filter_map(|line| match &mut line.kind {
            LineKind::Constant(c) => Some(c),
            LineKind::Text(_) => None,
        })
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match &line.kind {
                LineKind::Text(text) => out.push_str(text),
                LineKind::Constant(c) => out.push_str(&c.render()),
            }
            out.push_str(&line.ending);
        }
        out
    }
}

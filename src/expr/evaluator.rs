//! ExpressionEvaluator: ternaries, array helpers, templates, arithmetic and
//! state lookup over a [`StateReader`].
//!
//! Forms are tried in a fixed order and the first that applies wins:
//!
//! 1. `cond ? a : b`
//! 2. a quoted literal (`'text'`, `"Hi ${name}"`)
//! 3. array helpers: `path[i]`, `.count`, `.isEmpty`, `.first`, `.last`,
//!    `.contains(x)`
//! 4. `${...}` template interpolation
//! 5. integer arithmetic
//! 6. literals (`42`, `2.5`, `true`, `null`), then state lookup, then the
//!    trimmed input itself
//!
//! Evaluation never fails. Anything that does not resolve degrades to its
//! own text or to null.

use std::borrow::Cow;

use crate::document::value::StateValue;

use super::arithmetic::{self, Reduction};
use super::scope::StateReader;

/// Evaluate `expr` against `reader`.
pub fn evaluate(expr: &str, reader: &dyn StateReader) -> StateValue {
    ExpressionEvaluator::new(reader).evaluate(expr)
}

/// Substitute every `${...}` placeholder in `template`.
pub fn interpolate(template: &str, reader: &dyn StateReader) -> String {
    ExpressionEvaluator::new(reader).interpolate(template)
}

/// Truthiness of `expr`: unrecognized conditions are false.
pub fn evaluate_condition(expr: &str, reader: &dyn StateReader) -> bool {
    ExpressionEvaluator::new(reader).condition(expr)
}

/// Evaluator bound to one state reader.
#[derive(Clone, Copy)]
pub struct ExpressionEvaluator<'r> {
    reader: &'r dyn StateReader,
}

impl<'r> ExpressionEvaluator<'r> {
    pub fn new(reader: &'r dyn StateReader) -> Self {
        Self { reader }
    }

    pub fn evaluate(&self, expr: &str) -> StateValue {
        self.resolve(expr)
            .unwrap_or_else(|| StateValue::String(expr.trim().to_owned()))
    }

    /// Evaluate `expr`, or `None` when it comes down to a bare path that is
    /// absent from state.
    fn resolve(&self, expr: &str) -> Option<StateValue> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Some(StateValue::Null);
        }
        if let Some(inner) = strip_parens(expr) {
            return self.resolve(inner);
        }

        if let Some((condition, when_true, when_false)) = split_ternary(expr) {
            let branch = if self.condition(condition) {
                when_true
            } else {
                when_false
            };
            return self.resolve(branch);
        }

        if let Some(inner) = unquote(expr) {
            return Some(StateValue::String(if inner.contains("${") {
                self.interpolate(inner)
            } else {
                inner.to_owned()
            }));
        }

        if let Some(value) = self.array_expression(expr) {
            return Some(value);
        }

        if expr.contains("${") {
            return Some(StateValue::String(self.interpolate(expr)));
        }

        match arithmetic::reduce(expr, |operand| self.evaluate(operand).as_int()) {
            Reduction::Value(value) => return Some(StateValue::Int(value)),
            Reduction::DivisionByZero => return Some(StateValue::String(expr.to_owned())),
            Reduction::NotArithmetic => {}
        }

        if let Some(literal) = parse_literal(expr) {
            return Some(literal);
        }
        self.read_path(expr)
    }

    pub fn interpolate(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let body = &rest[start + 2..];
            match closing_brace(body) {
                Some(end) => {
                    let value = self.resolve(&body[..end]).unwrap_or(StateValue::Null);
                    out.push_str(&value.stringify());
                    rest = &body[end + 1..];
                }
                // Unterminated placeholder: keep the text as written.
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        out.push_str(rest);
        out
    }

    pub fn condition(&self, expr: &str) -> bool {
        let expr = expr.trim();
        if let Some(negated) = expr.strip_prefix('!') {
            return !self.condition(negated);
        }
        match expr {
            "true" => return true,
            "false" | "" => return false,
            _ => {}
        }
        if let Some(inner) = strip_parens(expr) {
            return self.condition(inner);
        }
        match self.evaluate(expr) {
            StateValue::Bool(value) => value,
            StateValue::String(text) => text == "true",
            _ => false,
        }
    }

    // -- array helpers -------------------------------------------------------

    fn array_expression(&self, expr: &str) -> Option<StateValue> {
        if let Some(rest) = expr.strip_suffix(')') {
            if let Some((base, argument)) = rest.split_once(".contains(") {
                if is_path(base) {
                    return self.contains(base, argument);
                }
            }
        }

        for (suffix, helper) in [
            (".count", ArrayHelper::Count),
            (".isEmpty", ArrayHelper::IsEmpty),
            (".first", ArrayHelper::First),
            (".last", ArrayHelper::Last),
        ] {
            if let Some(base) = expr.strip_suffix(suffix) {
                if is_path(base) {
                    return helper.apply(self.read_path(base));
                }
            }
        }

        if expr.ends_with(']') {
            let open = opening_bracket(expr)?;
            let base = &expr[..open];
            if is_path(base) {
                return self.index(base, &expr[open + 1..expr.len() - 1]);
            }
        }
        None
    }

    fn contains(&self, base: &str, argument: &str) -> Option<StateValue> {
        let needle = self.evaluate(argument);
        let found = match self.read_path(base) {
            Some(StateValue::Array(items)) => items.contains(&needle),
            Some(StateValue::String(text)) => text.contains(needle.stringify().as_str()),
            None | Some(StateValue::Null) => false,
            Some(_) => return None,
        };
        Some(StateValue::Bool(found))
    }

    fn index(&self, base: &str, index_expr: &str) -> Option<StateValue> {
        let index = self
            .evaluate(index_expr)
            .as_int()
            .and_then(|index| usize::try_from(index).ok());
        match self.read_path(base) {
            Some(StateValue::Array(items)) => Some(
                index
                    .and_then(|index| items.get(index).cloned())
                    .unwrap_or(StateValue::Null),
            ),
            None | Some(StateValue::Null) => Some(StateValue::Null),
            Some(_) => None,
        }
    }

    // -- state access --------------------------------------------------------

    /// Read a path whose bracket indices may themselves be expressions.
    fn read_path(&self, path: &str) -> Option<StateValue> {
        let path = self.normalize_indices(path)?;
        self.reader.read(&path)
    }

    fn normalize_indices<'e>(&self, path: &'e str) -> Option<Cow<'e, str>> {
        if !path.contains('[') {
            return Some(Cow::Borrowed(path));
        }

        let mut out = String::with_capacity(path.len());
        let mut rest = path;
        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let close = open + closing_bracket(&rest[open..])?;
            let inner = rest[open + 1..close].trim();
            let index = match inner.parse::<usize>() {
                Ok(index) => index,
                Err(_) => usize::try_from(self.evaluate(inner).as_int()?).ok()?,
            };
            out.push('[');
            out.push_str(&index.to_string());
            out.push(']');
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        Some(Cow::Owned(out))
    }
}

#[derive(Debug, Clone, Copy)]
enum ArrayHelper {
    Count,
    IsEmpty,
    First,
    Last,
}

impl ArrayHelper {
    /// `None` when the base holds something these helpers do not apply to,
    /// so the caller falls through to a plain lookup (`stats.count`).
    fn apply(self, base: Option<StateValue>) -> Option<StateValue> {
        let value = match (self, base) {
            (Self::Count, Some(StateValue::Array(items))) => StateValue::from(items.len()),
            (Self::Count, Some(StateValue::String(text))) => {
                StateValue::from(text.chars().count())
            }
            (Self::Count, None | Some(StateValue::Null)) => StateValue::Int(0),
            (Self::IsEmpty, Some(StateValue::Array(items))) => StateValue::Bool(items.is_empty()),
            (Self::IsEmpty, Some(StateValue::String(text))) => StateValue::Bool(text.is_empty()),
            (Self::IsEmpty, None | Some(StateValue::Null)) => StateValue::Bool(true),
            (Self::First, Some(StateValue::Array(items))) => {
                items.first().cloned().unwrap_or_default()
            }
            (Self::Last, Some(StateValue::Array(items))) => {
                items.last().cloned().unwrap_or_default()
            }
            (Self::First | Self::Last, None | Some(StateValue::Null)) => StateValue::Null,
            _ => return None,
        };
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// Scanning helpers
// ---------------------------------------------------------------------------

/// Characters of `expr` that sit outside quotes and `${...}` placeholders.
fn top_level_chars(expr: &str) -> Vec<(usize, char)> {
    let mut out = Vec::new();
    let mut quote: Option<char> = None;
    let mut braces = 0usize;
    let mut chars = expr.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '$' if chars.peek().is_some_and(|&(_, next)| next == '{') => {
                chars.next();
                braces += 1;
            }
            '{' if braces > 0 => braces += 1,
            '}' if braces > 0 => braces -= 1,
            _ if braces > 0 => {}
            _ => out.push((i, c)),
        }
    }
    out
}

/// Split `cond ? a : b` at its top-level operators. Parenthesized groups and
/// nested ternaries in the true branch are kept together.
fn split_ternary(expr: &str) -> Option<(&str, &str, &str)> {
    let mut parens = 0usize;
    let chars: Vec<(usize, char)> = top_level_chars(expr)
        .into_iter()
        .filter(|&(_, c)| {
            match c {
                '(' => parens += 1,
                ')' => parens = parens.saturating_sub(1),
                _ => return parens == 0,
            }
            false
        })
        .collect();
    let question = chars.iter().position(|&(_, c)| c == '?')?;

    let mut depth = 0usize;
    for &(colon, c) in &chars[question + 1..] {
        match c {
            '?' => depth += 1,
            ':' if depth == 0 => {
                let q = chars[question].0;
                let condition = expr[..q].trim();
                if condition.is_empty() {
                    return None;
                }
                return Some((condition, expr[q + 1..colon].trim(), expr[colon + 1..].trim()));
            }
            ':' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Index of the `}` that closes a placeholder body, skipping quoted text
/// and nested braces.
fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Index of the `]` matching the `[` at the start of `s`.
fn closing_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the `[` matching the trailing `]` of `s`.
fn opening_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices().rev() {
        match c {
            ']' => depth += 1,
            '[' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `identifier(.identifier | [anything])*`
fn is_path(s: &str) -> bool {
    let mut chars = s.chars();
    if !chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    {
        return false;
    }
    let mut brackets = 0usize;
    for c in chars {
        match c {
            '[' => brackets += 1,
            ']' if brackets > 0 => brackets -= 1,
            ']' => return false,
            _ if brackets > 0 => {}
            c if c.is_ascii_alphanumeric() || c == '_' || c == '.' => {}
            _ => return false,
        }
    }
    brackets == 0
}

/// Contents of a single-quoted or double-quoted literal.
fn unquote(expr: &str) -> Option<&str> {
    let quote = expr.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let inner = expr.get(1..expr.len().checked_sub(1)?)?;
    (expr.len() >= 2 && expr.ends_with(quote) && !inner.contains(quote)).then_some(inner)
}

/// The inside of `( ... )` when the outer parentheses enclose everything.
fn strip_parens(expr: &str) -> Option<&str> {
    let inner = expr.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0usize;
    for c in inner.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

fn parse_literal(expr: &str) -> Option<StateValue> {
    match expr {
        "true" => return Some(StateValue::Bool(true)),
        "false" => return Some(StateValue::Bool(false)),
        "null" => return Some(StateValue::Null),
        _ => {}
    }
    if let Ok(value) = expr.parse::<i64>() {
        return Some(StateValue::Int(value));
    }
    let numeric = expr
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-'));
    if numeric && expr.contains('.') {
        if let Ok(value) = expr.parse::<f64>() {
            return Some(StateValue::Double(value));
        }
    }
    None
}

//! Positional parameter bookkeeping.
//!
//! Generated statements use `$1..$N`. [`ParamBinder`] hands out the next
//! placeholder as it stores the value, and renumbers placeholders inside
//! caller-written fragments so that merged statements stay aligned with
//! their argument vector.

use crate::error::{OrmError, OrmResult};
use crate::ident::is_ident_char;
use crate::value::Value;

/// SQL text plus the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            args,
        }
    }

    /// Check that the highest placeholder index matches the argument count.
    pub fn validate(&self) -> OrmResult<()> {
        let highest = max_placeholder(&self.sql);
        if highest != self.args.len() {
            return Err(OrmError::MalformedQuery {
                message: format!(
                    "placeholders (${highest}) != args ({}): {}",
                    self.args.len(),
                    render_args(&self.args)
                ),
                sql: self.sql.clone(),
            });
        }
        Ok(())
    }
}

/// Render an argument list for logs and error messages.
pub fn render_args(args: &[Value]) -> String {
    let parts: Vec<String> = args.iter().map(Value::display).collect();
    format!("[{}]", parts.join(", "))
}

/// Allocates `$n` placeholders in lockstep with the argument vector.
#[derive(Debug, Clone, Default)]
pub struct ParamBinder {
    args: Vec<Value>,
}

impl ParamBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` and return its placeholder.
    pub fn bind(&mut self, value: impl Into<Value>) -> String {
        self.args.push(value.into());
        format!("${}", self.args.len())
    }

    /// Bind every value and return the comma-separated placeholders.
    pub fn bind_list<I, V>(&mut self, values: I) -> String
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .map(|v| self.bind(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Merge a caller fragment written against its own `$1..` numbering.
    ///
    /// Placeholders in `fragment` are shifted past the values already bound
    /// and `args` are appended.
    pub fn merge(&mut self, fragment: &str, args: &[Value]) -> String {
        let shifted = shift_placeholders(fragment, self.args.len());
        self.args.extend_from_slice(args);
        shifted
    }

    /// Merge several fragments that share one argument list.
    pub fn merge_all(&mut self, fragments: &[String], args: &[Value]) -> Vec<String> {
        let offset = self.args.len();
        self.args.extend_from_slice(args);
        fragments
            .iter()
            .map(|f| shift_placeholders(f, offset))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn into_args(self) -> Vec<Value> {
        self.args
    }

    /// Finish into a [`Statement`].
    pub fn finish(self, sql: String) -> Statement {
        Statement {
            sql,
            args: self.args,
        }
    }
}

/// Visit every `$n` placeholder outside quoted literals.
///
/// `f` receives the byte range of the placeholder and its index.
fn scan_placeholders(sql: &str, mut f: impl FnMut(usize, usize, usize)) {
    let bytes = sql.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
                i += 1;
            }
            None if b == b'\'' || b == b'"' => {
                quote = Some(b);
                i += 1;
            }
            None if b == b'$' => {
                let after_ident = i > 0 && is_ident_char(bytes[i - 1] as char);
                let mut end = i + 1;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if !after_ident && end > i + 1 {
                    if let Ok(n) = sql[i + 1..end].parse::<usize>() {
                        f(i, end, n);
                    }
                }
                i = end.max(i + 1);
            }
            None => i += 1,
        }
    }
}

/// Highest placeholder index used in `sql` (0 when there are none).
pub fn max_placeholder(sql: &str) -> usize {
    let mut highest = 0;
    scan_placeholders(sql, |_, _, n| highest = highest.max(n));
    highest
}

/// Renumber `$k` to `$(k + offset)` outside quoted literals.
pub fn shift_placeholders(fragment: &str, offset: usize) -> String {
    if offset == 0 {
        return fragment.to_string();
    }
    let mut out = String::with_capacity(fragment.len() + 4);
    let mut last = 0;
    scan_placeholders(fragment, |start, end, n| {
        out.push_str(&fragment[last..start]);
        out.push('$');
        out.push_str(&(n + offset).to_string());
        last = end;
    });
    out.push_str(&fragment[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_allocates_in_order() {
        let mut b = ParamBinder::new();
        assert_eq!(b.bind("a"), "$1");
        assert_eq!(b.bind(2), "$2");
        assert_eq!(b.bind_list(["x", "y"]), "$3, $4");
        assert_eq!(b.len(), 4);
    }

    #[test]
    fn merge_shifts_caller_numbering() {
        let mut b = ParamBinder::new();
        b.bind("name");
        let where_ = b.merge("uid = $1 AND status <> $2", &[Value::Int(9), Value::Int(3)]);
        assert_eq!(where_, "uid = $2 AND status <> $3");
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn shift_ignores_quoted_literals_and_identifiers() {
        assert_eq!(
            shift_placeholders("a = $1 AND b = '$1' AND c$1 = $2", 3),
            "a = $4 AND b = '$1' AND c$1 = $5"
        );
        assert_eq!(shift_placeholders("x = $10", 2), "x = $12");
        assert_eq!(shift_placeholders("price > $", 2), "price > $");
    }

    #[test]
    fn max_placeholder_counts_highest_index() {
        assert_eq!(max_placeholder("SELECT 1"), 0);
        assert_eq!(max_placeholder("a = $2 OR b = $1"), 2);
        assert_eq!(max_placeholder("a = '$9' AND b = $1"), 1);
    }

    #[test]
    fn validate_detects_misaligned_args() {
        let ok = Statement::new("SELECT * FROM t WHERE a = $1", vec![Value::Int(1)]);
        assert!(ok.validate().is_ok());

        let missing = Statement::new("SELECT * FROM t WHERE a = $2", vec![Value::Int(1)]);
        assert!(matches!(missing.validate(), Err(OrmError::MalformedQuery { .. })));

        let extra = Statement::new("SELECT 1", vec![Value::Int(1)]);
        assert!(extra.validate().is_err());
    }
}

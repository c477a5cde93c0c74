use std::fmt;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind},
    environment::{Environment, EnvironmentRef},
    runtime::Interpreter,
};

/// A runtime datum. Every compound value owns its children outright, so
/// `clone` is a deep copy and no two values ever share structure.
#[derive(Clone)]
pub enum Value {
    Number(i64),
    Error(Diagnostic),
    Symbol(String),
    String(String),
    Function(Function),
    SExpr(Vec<Value>),
    QExpr(Vec<Value>),
}

impl Value {
    pub fn number(value: i64) -> Self {
        Self::Number(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn error(diagnostic: Diagnostic) -> Self {
        Self::Error(diagnostic)
    }

    pub fn sexpr(cells: Vec<Value>) -> Self {
        Self::SExpr(cells)
    }

    pub fn qexpr(cells: Vec<Value>) -> Self {
        Self::QExpr(cells)
    }

    /// The empty S-expression, returned by side-effecting builtins.
    pub fn unit() -> Self {
        Self::SExpr(Vec::new())
    }

    pub fn bool(value: bool) -> Self {
        Self::Number(i64::from(value))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "Number",
            Value::Error(_) => "Error",
            Value::Symbol(_) => "Symbol",
            Value::String(_) => "String",
            Value::Function(_) => "Function",
            Value::SExpr(_) => "S-Expression",
            Value::QExpr(_) => "Q-Expression",
        }
    }

    /// Kind of the error payload, if this is an error.
    pub fn error_kind(&self) -> Option<DiagnosticKind> {
        match self {
            Value::Error(diagnostic) => Some(diagnostic.kind),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a.message == b.message,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::SExpr(a), Value::SExpr(b)) | (Value::QExpr(a), Value::QExpr(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(l, r)| l == r)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Error(diagnostic) => write!(f, "Error: {}", diagnostic.message),
            Value::Symbol(name) => write!(f, "{name}"),
            Value::String(text) => write!(f, "\"{}\"", escape(text)),
            Value::Function(fun) => write!(f, "{fun}"),
            Value::SExpr(cells) => write_cells(f, cells, '(', ')'),
            Value::QExpr(cells) => write_cells(f, cells, '{', '}'),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn write_cells(f: &mut fmt::Formatter<'_>, cells: &[Value], open: char, close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            write!(f, " ")?;
        }
        write!(f, "{cell}")?;
    }
    write!(f, "{close}")
}

/// Re-escapes exactly the characters the reader unescapes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\x07' => escaped.push_str("\\a"),
            '\x08' => escaped.push_str("\\b"),
            '\x0c' => escaped.push_str("\\f"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x0b' => escaped.push_str("\\v"),
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Builtins report failed checks through `Err`; the caller turns that into
/// an `Error` value.
pub type BuiltinFn = fn(&Interpreter, &EnvironmentRef, Vec<Value>) -> Result<Value, Diagnostic>;

#[derive(Clone)]
pub enum Function {
    Builtin(Builtin),
    Lambda(Lambda),
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::Builtin(a), Function::Builtin(b)) => a.name == b.name,
            (Function::Lambda(a), Function::Lambda(b)) => {
                a.formals == b.formals && a.body == b.body
            }
            _ => false,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(_) => write!(f, "<builtin>"),
            Function::Lambda(lambda) => {
                write!(f, "(\\ {{{}}} ", lambda.formals.join(" "))?;
                write_cells(f, &lambda.body, '{', '}')?;
                write!(f, ")")
            }
        }
    }
}

/// A primitive operation. Primitives are unique by name within the catalog,
/// which is what identity comparison relies on.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub callback: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, interpreter: &Interpreter, env: &EnvironmentRef, args: Vec<Value>) -> Value {
        (self.callback)(interpreter, env, args).unwrap_or_else(Value::error)
    }
}

/// A user lambda: formals still waiting for arguments, the body (the contents
/// of the body Q-expression) and the bindings captured so far.
#[derive(Clone)]
pub struct Lambda {
    pub formals: Vec<String>,
    pub body: Vec<Value>,
    pub env: Environment,
}

impl Lambda {
    pub fn new(formals: Vec<String>, body: Vec<Value>) -> Self {
        Self {
            formals,
            body,
            env: Environment::default(),
        }
    }
}

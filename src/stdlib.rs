use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind},
    environment::{Environment, EnvironmentRef},
    runtime::{io_error, Interpreter},
    value::{Builtin, BuiltinFn, Function, Lambda, Value},
};

type BuiltinResult = Result<Value, Diagnostic>;

const CATALOG: &[(&str, BuiltinFn)] = &[
    // binding
    ("\\", builtin_lambda),
    ("def", builtin_def),
    ("=", builtin_put),
    // lists
    ("list", builtin_list),
    ("head", builtin_head),
    ("tail", builtin_tail),
    ("eval", builtin_eval),
    ("join", builtin_join),
    // arithmetic
    ("+", builtin_add),
    ("-", builtin_sub),
    ("*", builtin_mul),
    ("/", builtin_div),
    // comparison and control flow
    ("if", builtin_if),
    ("==", builtin_eq),
    ("!=", builtin_ne),
    (">", builtin_gt),
    ("<", builtin_lt),
    (">=", builtin_ge),
    ("<=", builtin_le),
    // strings and I/O
    ("print", builtin_print),
    ("error", builtin_error),
    ("load", builtin_load),
];

/// Registers every primitive into `env`.
pub fn install(env: &EnvironmentRef) {
    let mut scope = env.borrow_mut();
    for &(name, callback) in CATALOG {
        scope.put(name, native(name, callback));
    }
}

/// Names of all primitives, in registration order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|&(name, _)| name)
}

fn native(name: &'static str, callback: BuiltinFn) -> Value {
    Value::Function(Function::Builtin(Builtin { name, callback }))
}

fn exact<const N: usize>(name: &str, args: Vec<Value>) -> Result<[Value; N], Diagnostic> {
    let got = args.len();
    <[Value; N]>::try_from(args).map_err(|_| Diagnostic::arity(name, got, N))
}

fn ensure_min(name: &str, args: &[Value], min: usize) -> Result<(), Diagnostic> {
    if args.len() < min {
        return Err(Diagnostic::arity(name, args.len(), min));
    }
    Ok(())
}

fn expect_number(name: &str, index: usize, value: &Value) -> Result<i64, Diagnostic> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(Diagnostic::wrong_type(name, index, other.type_name(), "Number")),
    }
}

fn expect_string(name: &str, index: usize, value: Value) -> Result<String, Diagnostic> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(Diagnostic::wrong_type(name, index, other.type_name(), "String")),
    }
}

fn expect_qexpr(name: &str, index: usize, value: Value) -> Result<Vec<Value>, Diagnostic> {
    match value {
        Value::QExpr(cells) => Ok(cells),
        other => Err(Diagnostic::wrong_type(
            name,
            index,
            other.type_name(),
            "Q-Expression",
        )),
    }
}

fn expect_nonempty_qexpr(name: &str, index: usize, value: Value) -> Result<Vec<Value>, Diagnostic> {
    let cells = expect_qexpr(name, index, value)?;
    if cells.is_empty() {
        return Err(Diagnostic::empty(name, index));
    }
    Ok(cells)
}

fn expect_symbols(name: &str, cells: Vec<Value>) -> Result<Vec<String>, Diagnostic> {
    cells
        .into_iter()
        .map(|cell| match cell {
            Value::Symbol(symbol) => Ok(symbol),
            other => Err(Diagnostic::new(
                DiagnosticKind::Type,
                format!(
                    "Function '{name}' cannot define non-symbol. Got {}, Expected Symbol.",
                    other.type_name()
                ),
            )),
        })
        .collect()
}

fn overflow() -> Diagnostic {
    Diagnostic::domain("Integer overflow.")
}

/// Type-checks every argument, then folds left to right with `op`.
fn fold_numbers(
    name: &str,
    args: &[Value],
    op: fn(i64, i64) -> Result<i64, Diagnostic>,
) -> Result<i64, Diagnostic> {
    let numbers = args
        .iter()
        .enumerate()
        .map(|(idx, value)| expect_number(name, idx, value))
        .collect::<Result<Vec<_>, _>>()?;
    let (first, rest) = numbers
        .split_first()
        .ok_or_else(|| Diagnostic::arity(name, 0, 1))?;
    rest.iter().try_fold(*first, |acc, &next| op(acc, next))
}

fn builtin_add(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    fold_numbers("+", &args, |a, b| a.checked_add(b).ok_or_else(overflow)).map(Value::number)
}

fn builtin_sub(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    if let [single] = args.as_slice() {
        let n = expect_number("-", 0, single)?;
        return n.checked_neg().map(Value::number).ok_or_else(overflow);
    }
    fold_numbers("-", &args, |a, b| a.checked_sub(b).ok_or_else(overflow)).map(Value::number)
}

fn builtin_mul(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    fold_numbers("*", &args, |a, b| a.checked_mul(b).ok_or_else(overflow)).map(Value::number)
}

fn builtin_div(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    fold_numbers("/", &args, |a, b| {
        if b == 0 {
            return Err(Diagnostic::domain("Division by zero."));
        }
        a.checked_div(b).ok_or_else(overflow)
    })
    .map(Value::number)
}

fn builtin_list(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    Ok(Value::qexpr(args))
}

fn builtin_head(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [list] = exact::<1>("head", args)?;
    let mut cells = expect_nonempty_qexpr("head", 0, list)?;
    cells.truncate(1);
    Ok(Value::qexpr(cells))
}

fn builtin_tail(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [list] = exact::<1>("tail", args)?;
    let mut cells = expect_nonempty_qexpr("tail", 0, list)?;
    cells.remove(0);
    Ok(Value::qexpr(cells))
}

fn builtin_eval(interpreter: &Interpreter, env: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [list] = exact::<1>("eval", args)?;
    let cells = expect_qexpr("eval", 0, list)?;
    Ok(interpreter.eval(env, Value::sexpr(cells)))
}

fn builtin_join(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    ensure_min("join", &args, 1)?;
    let mut joined = Vec::new();
    for (idx, list) in args.into_iter().enumerate() {
        joined.extend(expect_qexpr("join", idx, list)?);
    }
    Ok(Value::qexpr(joined))
}

fn builtin_def(_: &Interpreter, env: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    bind("def", env, args, true)
}

fn builtin_put(_: &Interpreter, env: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    bind("=", env, args, false)
}

/// Shared body of `def` (outermost frame) and `=` (current frame).
fn bind(name: &str, env: &EnvironmentRef, args: Vec<Value>, global: bool) -> BuiltinResult {
    let mut args = args.into_iter();
    let symbols = match args.next() {
        Some(first) => expect_symbols(name, expect_qexpr(name, 0, first)?)?,
        None => return Err(Diagnostic::arity(name, 0, 1)),
    };
    let values: Vec<Value> = args.collect();
    if symbols.len() != values.len() {
        return Err(Diagnostic::new(
            DiagnosticKind::Arity,
            format!(
                "Function '{name}' passed too many arguments for symbols. Got {}, Expected {}.",
                symbols.len(),
                values.len()
            ),
        ));
    }
    for (symbol, value) in symbols.into_iter().zip(values) {
        debug!(symbol = %symbol, global, "binding");
        if global {
            Environment::def(env, symbol, value);
        } else {
            env.borrow_mut().put(symbol, value);
        }
    }
    Ok(Value::unit())
}

fn builtin_lambda(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [formals, body] = exact::<2>("\\", args)?;
    let formals = expect_qexpr("\\", 0, formals)?;
    let body = expect_qexpr("\\", 1, body)?;
    let formals = formals
        .into_iter()
        .map(|formal| match formal {
            Value::Symbol(symbol) => Ok(symbol),
            other => Err(Diagnostic::new(
                DiagnosticKind::Type,
                format!(
                    "Cannot define non-symbol. Got {}, Expected Symbol.",
                    other.type_name()
                ),
            )),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Function(Function::Lambda(Lambda::new(formals, body))))
}

fn builtin_if(interpreter: &Interpreter, env: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [condition, then, otherwise] = exact::<3>("if", args)?;
    let condition = expect_number("if", 0, &condition)?;
    let then = expect_qexpr("if", 1, then)?;
    let otherwise = expect_qexpr("if", 2, otherwise)?;
    let branch = if condition != 0 { then } else { otherwise };
    Ok(interpreter.eval(env, Value::sexpr(branch)))
}

fn builtin_eq(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [left, right] = exact::<2>("==", args)?;
    Ok(Value::bool(left == right))
}

fn builtin_ne(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [left, right] = exact::<2>("!=", args)?;
    Ok(Value::bool(left != right))
}

fn ordering(name: &str, args: Vec<Value>, op: fn(&i64, &i64) -> bool) -> BuiltinResult {
    let [left, right] = exact::<2>(name, args)?;
    let left = expect_number(name, 0, &left)?;
    let right = expect_number(name, 1, &right)?;
    Ok(Value::bool(op(&left, &right)))
}

fn builtin_gt(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    ordering(">", args, i64::gt)
}

fn builtin_lt(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    ordering("<", args, i64::lt)
}

fn builtin_ge(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    ordering(">=", args, i64::ge)
}

fn builtin_le(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    ordering("<=", args, i64::le)
}

fn builtin_print(interpreter: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let line = args
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    match interpreter.write_line(&line) {
        Ok(()) => Ok(Value::unit()),
        Err(err) => Ok(io_error(&err)),
    }
}

fn builtin_error(_: &Interpreter, _: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [message] = exact::<1>("error", args)?;
    let message = expect_string("error", 0, message)?;
    Ok(Value::error(Diagnostic::new(DiagnosticKind::User, message)))
}

fn builtin_load(interpreter: &Interpreter, env: &EnvironmentRef, args: Vec<Value>) -> BuiltinResult {
    let [path] = exact::<1>("load", args)?;
    let path = expect_string("load", 0, path)?;
    Ok(interpreter.load_path(env, &path))
}

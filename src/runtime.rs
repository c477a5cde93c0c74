use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, Write},
};

use tracing::{debug, trace};

use crate::{
    diagnostics::{Diagnostic, DiagnosticKind},
    environment::{Environment, EnvironmentRef},
    loader::{FsLoader, SourceLoader},
    prelude, reader,
    value::{Function, Lambda, Value},
};

/// Owns the root environment and the collaborators the builtins need: where
/// `load` gets its text from and where `print` writes to.
pub struct Interpreter {
    env: EnvironmentRef,
    loader: Box<dyn SourceLoader>,
    output: RefCell<Box<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let interpreter = Self {
            env: Environment::new(),
            loader: Box::new(FsLoader),
            output: RefCell::new(Box::new(io::stdout())),
        };
        interpreter.install_builtins();
        interpreter
    }

    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn with_output(mut self, output: impl Write + 'static) -> Self {
        self.output = RefCell::new(Box::new(output));
        self
    }

    pub fn root(&self) -> &EnvironmentRef {
        &self.env
    }

    /// Evaluates one line the way the REPL does: everything on the line forms
    /// a single S-expression, so `+ 1 2` and `(+ 1 2)` both give `3`.
    pub fn eval_line(&self, source: &str) -> Value {
        let program = reader::read(source);
        self.eval(&self.env, program)
    }

    /// `load` for a path named by the host, evaluated in the root
    /// environment.
    pub fn load_file(&self, path: &str) -> Value {
        self.load_path(&self.env, path)
    }

    pub fn load_prelude(&self) -> Value {
        debug!("loading prelude");
        self.load_source(&self.env, "prelude", prelude::SOURCE)
    }

    pub(crate) fn load_path(&self, env: &EnvironmentRef, path: &str) -> Value {
        debug!(path, "loading library");
        match self.loader.load(path) {
            Ok(source) => self.load_source(env, path, &source),
            Err(err) => Value::error(Diagnostic::new(
                DiagnosticKind::Io,
                format!("Could not load Library {path}: {err}"),
            )),
        }
    }

    /// Reads `source` and evaluates each top-level expression in turn. Errors
    /// from individual expressions are reported on the output sink and do not
    /// stop the rest of the file.
    fn load_source(&self, env: &EnvironmentRef, name: &str, source: &str) -> Value {
        let program = match reader::read(source) {
            Value::SExpr(cells) => cells,
            Value::Error(diagnostic) => {
                return Value::error(Diagnostic::new(
                    diagnostic.kind,
                    format!("Could not load Library {name}: {}", diagnostic.message),
                ));
            }
            other => vec![other],
        };
        for expr in program {
            let result = self.eval(env, expr);
            if result.is_error() {
                if let Err(err) = self.write_line(&result.to_string()) {
                    return io_error(&err);
                }
            }
        }
        Value::unit()
    }

    pub fn eval(&self, env: &EnvironmentRef, value: Value) -> Value {
        match value {
            Value::Symbol(name) => Environment::get(env, &name),
            Value::SExpr(cells) => self.eval_sexpr(env, cells),
            other => other,
        }
    }

    fn eval_sexpr(&self, env: &EnvironmentRef, cells: Vec<Value>) -> Value {
        let mut evaluated = Vec::with_capacity(cells.len());
        for cell in cells {
            let value = self.eval(env, cell);
            if value.is_error() {
                return value;
            }
            evaluated.push(value);
        }

        let mut cells = evaluated.into_iter();
        let Some(first) = cells.next() else {
            return Value::unit();
        };
        if cells.as_slice().is_empty() {
            return first;
        }
        match first {
            Value::Function(function) => self.apply(env, function, cells.collect()),
            other => Value::error(Diagnostic::new(
                DiagnosticKind::Type,
                format!(
                    "S-Expression starts with incorrect type. Got {}, Expected Function.",
                    other.type_name()
                ),
            )),
        }
    }

    pub fn apply(&self, env: &EnvironmentRef, function: Function, args: Vec<Value>) -> Value {
        match function {
            Function::Builtin(builtin) => builtin.call(self, env, args),
            Function::Lambda(lambda) => self.apply_lambda(env, lambda, args),
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(formals = lambda.formals.len(), args = args.len()))]
    fn apply_lambda(&self, env: &EnvironmentRef, lambda: Lambda, args: Vec<Value>) -> Value {
        let Lambda {
            formals,
            body,
            env: mut frame,
        } = lambda;
        let given = args.len();
        let total = formals.len();
        let mut formals: VecDeque<String> = formals.into();
        let mut args: VecDeque<Value> = args.into();

        while let Some(arg) = args.pop_front() {
            let Some(formal) = formals.pop_front() else {
                return Value::error(Diagnostic::domain(format!(
                    "Function passed too many arguments. Got {given}, Expected {total}."
                )));
            };
            if formal == "&" {
                let Some(rest) = variadic_target(&mut formals) else {
                    return Value::error(variadic_format_error());
                };
                let collected: Vec<Value> = std::iter::once(arg).chain(args.drain(..)).collect();
                frame.put(rest, Value::qexpr(collected));
                break;
            }
            frame.put(formal, arg);
        }

        if formals.front().is_some_and(|formal| formal == "&") {
            formals.pop_front();
            let Some(rest) = variadic_target(&mut formals) else {
                return Value::error(variadic_format_error());
            };
            frame.put(rest, Value::qexpr(Vec::new()));
        }

        if !formals.is_empty() {
            trace!(remaining = formals.len(), "partial application");
            return Value::Function(Function::Lambda(Lambda {
                formals: formals.into(),
                body,
                env: frame,
            }));
        }

        let local = Environment::attach(frame, env);
        self.eval(&local, Value::sexpr(body))
    }

    pub(crate) fn write_line(&self, line: &str) -> io::Result<()> {
        let mut output = self.output.borrow_mut();
        writeln!(output, "{line}")?;
        output.flush()
    }

    fn install_builtins(&self) {
        crate::stdlib::install(&self.env);
    }
}

/// Pops the single name that must follow `&`.
fn variadic_target(formals: &mut VecDeque<String>) -> Option<String> {
    match (formals.pop_front(), formals.pop_front()) {
        (Some(name), None) => Some(name),
        _ => None,
    }
}

fn variadic_format_error() -> Diagnostic {
    Diagnostic::domain("Function format invalid. Symbol '&' not followed by single symbol.")
}

pub(crate) fn io_error(err: &io::Error) -> Value {
    Value::error(Diagnostic::new(DiagnosticKind::Io, format!("I/O error: {err}")))
}

//! Core library for the Lispy language: a reader, an owned value model and a
//! tree-walking evaluator with partial application, plus the REPL front end.

pub mod diagnostics;
pub mod environment;
pub mod loader;
pub mod prelude;
pub mod reader;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod value;

use std::sync::Once;

pub use diagnostics::{Diagnostic, DiagnosticKind, LispyError};
pub use environment::{Environment, EnvironmentRef};
pub use loader::{FsLoader, SourceLoader};
pub use reader::read;
pub use repl::Repl;
pub use runtime::Interpreter;
pub use value::Value;

static TRACING_INIT: Once = Once::new();

/// Installs a stderr `tracing` subscriber, but only when `RUST_LOG` is set
/// (for example `RUST_LOG=lispy=debug`). Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

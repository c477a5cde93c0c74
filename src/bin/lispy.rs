use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lispy::{Interpreter, LispyError, Repl, Value};

#[derive(Parser)]
#[command(author, version, about = "Lispy language interpreter")]
struct Args {
    /// Skip loading the standard prelude
    #[arg(long, global = true)]
    no_prelude: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load and run one or more Lispy files in order
    Run {
        #[arg(required = true)]
        scripts: Vec<PathBuf>,
    },
    /// Start an interactive REPL session
    Repl,
    /// Evaluate a line of Lispy and print the result
    Eval { source: String },
}

fn main() -> Result<(), LispyError> {
    lispy::init_tracing();
    let args = Args::parse();
    let interpreter = Interpreter::new();
    if !args.no_prelude {
        report(&interpreter.load_prelude());
    }
    match args.command.unwrap_or(Command::Repl) {
        Command::Run { scripts } => {
            for script in scripts {
                report(&interpreter.load_file(&script.to_string_lossy()));
            }
            Ok(())
        }
        Command::Repl => Repl::new(interpreter).run(),
        Command::Eval { source } => {
            println!("{}", interpreter.eval_line(&source));
            Ok(())
        }
    }
}

fn report(value: &Value) {
    if value.is_error() {
        println!("{value}");
    }
}

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{diagnostics::Result, runtime::Interpreter};

pub const BANNER: &str = "Lispy Version 1.0.0\nPress Ctrl+c to Exit\n";

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        println!("{BANNER}");
        loop {
            match editor.readline("lispy> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    let value = self.interpreter.eval_line(trimmed);
                    println!("{value}");
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }
}

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::runtime::Runtime;

mod highlight;

pub use highlight::Highlighter;

use crate::core::{Outcome, Pipeline};
use crate::error::AppError;

pub const HISTORY_FILE: &str = ".termgate_history";

pub const HELP_TEXT: &str = "\
Available custom commands:
  cpu         - Show current CPU usage percentage.
  memory      - Show current memory usage percentage.
  help        - Display this list of commands.
  clear       - Clear the terminal screen.
  exit        - Leave the console.

Standard shell commands (ls, pwd, mkdir, ...) work too, as do phrases like
\"create a folder my_stuff\", \"list files\" or \"where am i\".";
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalCommand {
    Help,
    Clear,
    Exit,
}

impl LocalCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "help" => Some(Self::Help),
            "clear" => Some(Self::Clear),
            "exit" => Some(Self::Exit),
            _ => None,
        }
    }
}

pub struct Repl {
    editor: DefaultEditor,
    pipeline: Pipeline,
    runtime: Runtime,
    highlighter: Highlighter,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(pipeline: Pipeline) -> Result<Self, AppError> {
        let mut editor = DefaultEditor::new()?;
        let history_path = dirs::home_dir().map(|home| home.join(HISTORY_FILE));
        if let Some(path) = &history_path {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    tracing::warn!(error = %e, "couldn't load history");
                }
            }
        }

        // Ctrl-C while a command runs must not take the console down
        ctrlc::set_handler(move || {
            println!("\nUse 'exit' to leave the console");
        })?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Repl {
            editor,
            pipeline,
            runtime,
            highlighter: Highlighter::new(),
            history_path,
        })
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        println!("{}", self.highlighter.hint("Type 'help' for the list of commands."));

        loop {
            let cwd = self
                .pipeline
                .working_dir()
                .get()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|_| "?".to_string());
            let prompt = self.highlighter.prompt(&cwd);

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Err(e) = self.editor.add_history_entry(line) {
                        tracing::warn!(error = %e, "couldn't add to history");
                    }

                    match LocalCommand::parse(line) {
                        Some(LocalCommand::Exit) => break,
                        Some(LocalCommand::Help) => println!("{}", HELP_TEXT),
                        Some(LocalCommand::Clear) => self.editor.clear_screen()?,
                        None => self.execute(line),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(e) => {
                    eprintln!("{}", self.highlighter.error(&e.to_string()));
                    continue;
                }
            }
        }

        self.save_history();
        Ok(())
    }

    fn execute(&self, line: &str) {
        match self.runtime.block_on(self.pipeline.handle(line)) {
            Outcome::Output(output) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Outcome::Error(error) => eprintln!("{}", self.highlighter.error(&error)),
        }
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                tracing::warn!(error = %e, "couldn't save history");
            }
        }
    }
}

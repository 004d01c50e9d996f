//! Deploy step compiler
//!
//! Turns the `deploy.steps` DSL into remote shell commands:
//!
//! ```text
//! run <words...>         any shell command, run from the checkout
//! copy <src> <dst>       recursive sync inside the machine
//! dir <paths...>         create directories
//! action <src> <name>    install <src> as an executable action
//! reboot                 reboot the machine (last step only)
//! ```
//!
//! The whole list is validated before anything is returned, so a typo in
//! the last step never leaves a half-deployed machine behind.

use thiserror::Error;

use crate::domain::entities::CompiledStep;

use super::shell::{quote, split_words, UnterminatedQuote};

/// Checkout directory of the project on the remote machine
pub const WORK_DIR: &str = "/tmp/apker";

/// Directory holding installed actions on the remote machine
pub const ACTIONS_DIR: &str = "/usr/share/apker/bin";

/// Rejected deploy step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("unknown deploy step: {line}")]
    UnknownVerb { line: String },

    #[error("deploy step '{line}' expects {expected}, got {found} argument(s)")]
    WrongArity {
        line: String,
        expected: &'static str,
        found: usize,
    },

    #[error("deploy step '{line}' has an unterminated {quote} quote")]
    UnterminatedQuote { line: String, quote: char },

    #[error("invalid action name '{name}': use letters, digits, '.', '_' or '-'")]
    InvalidActionName { name: String },

    #[error("reboot command should be the last step (found at step {position} of {total})")]
    RebootNotLast { position: usize, total: usize },
}

/// Deploy step verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Run,
    Copy,
    Dir,
    Action,
    Reboot,
}

impl Verb {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "run" => Some(Self::Run),
            "copy" => Some(Self::Copy),
            "dir" => Some(Self::Dir),
            "action" => Some(Self::Action),
            "reboot" => Some(Self::Reboot),
            _ => None,
        }
    }
}

/// Compiles deploy step lines into commands
#[derive(Debug, Clone, Copy, Default)]
pub struct StepCompiler;

impl StepCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Validate and compile the entire list, or reject it without output
    pub fn compile<S: AsRef<str>>(&self, steps: &[S]) -> Result<Vec<CompiledStep>, StepError> {
        let total = steps.len();
        let mut compiled = Vec::with_capacity(total);

        for (i, raw) in steps.iter().enumerate() {
            let (verb, args) = parse_line(raw.as_ref())?;
            let line = raw.as_ref().trim();

            if verb == Verb::Reboot && i + 1 != total {
                return Err(StepError::RebootNotLast {
                    position: i + 1,
                    total,
                });
            }

            let command = compile_command(line, verb, &args)?;
            compiled.push(CompiledStep::new(
                format!("Running: {}", line),
                format!("Step: {}", line),
                command,
            ));
        }

        Ok(compiled)
    }

    /// Validate without keeping the output
    pub fn check<S: AsRef<str>>(&self, steps: &[S]) -> Result<(), StepError> {
        self.compile(steps).map(|_| ())
    }
}

/// Errors carry the line exactly as written
fn parse_line(line: &str) -> Result<(Verb, Vec<String>), StepError> {
    let words = split_words(line).map_err(|UnterminatedQuote(quote)| {
        StepError::UnterminatedQuote {
            line: line.to_string(),
            quote,
        }
    })?;

    let verb = words
        .first()
        .and_then(|w| Verb::parse(w))
        .ok_or_else(|| StepError::UnknownVerb {
            line: line.to_string(),
        })?;

    Ok((verb, words[1..].to_vec()))
}

fn compile_command(line: &str, verb: Verb, args: &[String]) -> Result<String, StepError> {
    let arity = |expected: &'static str| StepError::WrongArity {
        line: line.to_string(),
        expected,
        found: args.len(),
    };

    let command = match verb {
        Verb::Run => {
            if args.is_empty() {
                return Err(arity("a command"));
            }
            // Keep the user's own quoting: the rest of the line is already shell.
            let rest = match line.strip_prefix("run") {
                Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start().to_string(),
                _ => args.iter().map(|a| quote(a)).collect::<Vec<_>>().join(" "),
            };
            format!("cd {} && {}", WORK_DIR, rest)
        }
        Verb::Copy => {
            let [src, dst] = args else {
                return Err(arity("exactly 2 (source, destination)"));
            };
            format!(
                "cd {} && mkdir -p {} && rsync -a --quiet {} {}",
                WORK_DIR,
                quote(dst),
                quote(src),
                quote(dst)
            )
        }
        Verb::Dir => {
            if args.is_empty() {
                return Err(arity("at least 1 path"));
            }
            let paths: Vec<String> = args.iter().map(|p| quote(p)).collect();
            format!("cd {} && mkdir -p {}", WORK_DIR, paths.join(" "))
        }
        Verb::Action => {
            let [src, name] = args else {
                return Err(arity("exactly 2 (source file, action name)"));
            };
            validate_action_name(name)?;
            let target = quote(&format!("{}/{}", ACTIONS_DIR, name));
            format!(
                "cd {} && mkdir -p {} && cp {} {} && chmod +x {}",
                WORK_DIR,
                ACTIONS_DIR,
                quote(src),
                target,
                target
            )
        }
        Verb::Reboot => {
            if !args.is_empty() {
                return Err(arity("no arguments"));
            }
            "(sleep 1 && reboot) > /dev/null 2>&1 &".to_string()
        }
    };

    Ok(command)
}

/// Action names become file names under `ACTIONS_DIR`
pub fn validate_action_name(name: &str) -> Result<(), StepError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(StepError::InvalidActionName {
            name: name.to_string(),
        })
    }
}

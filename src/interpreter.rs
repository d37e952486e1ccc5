use anyhow::Result;
use tracing::debug;

use crate::ast::Program;

mod error;
mod program;
mod runtime;
mod value;

pub use error::InterpreterError;
pub use program::ProgramContext;
pub use value::{Instance, ObjectRef, Value};

use runtime::InterpreterRuntime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// After construction, `new X(args)` also invokes the first method of `X`
    /// whose parameter count equals the argument count.
    pub construction_method_call: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            construction_method_call: true,
        }
    }
}

/// AST-walking interpreter that executes programs directly from the tree.
#[derive(Debug, Default)]
pub struct Interpreter {
    config: InterpreterConfig,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InterpreterConfig) -> Self {
        Self { config }
    }

    pub fn prepare(&self, program: &Program) -> Result<PreparedInterpreter> {
        let context = ProgramContext::new(program)?;
        debug!(classes = context.classes().len(), "prepared program context");
        Ok(PreparedInterpreter {
            context,
            config: self.config,
        })
    }

    /// Prepares and runs `program`, returning the console output.
    pub fn run(&self, program: &Program) -> Result<String> {
        Ok(self.prepare(program)?.start()?)
    }
}

/// Program context ready to run; can be started repeatedly.
#[derive(Debug)]
pub struct PreparedInterpreter {
    context: ProgramContext,
    config: InterpreterConfig,
}

impl PreparedInterpreter {
    /// Runs the entry point and returns every console line joined by `\n`.
    pub fn start(&self) -> std::result::Result<String, InterpreterError> {
        // start -> invoke(start) -> exec_block -> exec_statement
        // -> eval_expression -> eval_call/construct -> invoke.
        let mut runtime = InterpreterRuntime {
            program: &self.context,
            config: &self.config,
            output: Vec::new(),
        };
        runtime.run_entry_point()?;
        debug!(lines = runtime.output.len(), "program finished");
        Ok(runtime.output.join("\n"))
    }
}

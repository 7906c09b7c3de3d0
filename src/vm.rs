//! Functions for executing Minilang programs.
use std::io::{self, Write};

use log::debug;
use num_integer::Integer;
use thiserror::Error;

use crate::{config::get_config, ops::Token, parser::{parse_program, Program}};


/// An implementation of [`Tracer`] that does not track anything.
///
/// This is the best choice if you do not need to observe the program while
/// it is executed.
#[derive(Default, Debug, Clone, Copy)]
pub struct NoStats {}

impl Tracer for NoStats {
    #[inline(always)]
    fn push(&mut self, _: i64) {}
    #[inline(always)]
    fn pop(&mut self) {}
    #[inline(always)]
    fn instruction(&mut self, _index: usize, _token: &Token, _: &Result<Effect, OperationError>) {}
}

/// A trait for tracking statistics about the state of the VM.
/// Can also be used to track pushed and popped values.
///
/// You can implement this trait to track any statistics you need.
pub trait Tracer {
    /// Called once before the first instruction with the initial stack.
    fn start(&mut self, _initial_stack: &[i64]) {}
    fn push(&mut self, value: i64);
    fn pop(&mut self);
    fn instruction(&mut self, index: usize, token: &Token, result: &Result<Effect, OperationError>);
}

impl<T: Tracer + ?Sized> Tracer for &mut T {
    fn start(&mut self, initial_stack: &[i64]) {
        (**self).start(initial_stack)
    }
    fn push(&mut self, value: i64) {
        (**self).push(value)
    }
    fn pop(&mut self) {
        (**self).pop()
    }
    fn instruction(&mut self, index: usize, token: &Token, result: &Result<Effect, OperationError>) {
        (**self).instruction(index, token, result)
    }
}

/// Tracks the stack depth and the number of printed values.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct StackStats {
    pub depth: usize,
    pub max_depth: usize,
    pub pushes: u64,
    pub pops: u64,
    pub prints: u64,
}

impl Tracer for StackStats {
    fn start(&mut self, initial_stack: &[i64]) {
        self.depth = initial_stack.len();
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn push(&mut self, _: i64) {
        self.pushes += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop(&mut self) {
        self.pops += 1;
        self.depth = self.depth.saturating_sub(1);
    }

    fn instruction(&mut self, _index: usize, _token: &Token, result: &Result<Effect, OperationError>) {
        if let Ok(Effect::Print(_)) = result {
            self.prints += 1;
        }
    }
}

/// Receives the values of `PRINT` instructions.
pub trait Printer {
    fn print(&mut self, value: i64) -> io::Result<()>;
}

/// Collects printed values in order.
impl Printer for Vec<i64> {
    fn print(&mut self, value: i64) -> io::Result<()> {
        self.push(value);
        Ok(())
    }
}

impl<P: Printer + ?Sized> Printer for &mut P {
    fn print(&mut self, value: i64) -> io::Result<()> {
        (**self).print(value)
    }
}

/// Writes every printed value on its own line.
#[derive(Debug)]
pub struct WritePrinter<W: Write> {
    inner: W,
}

impl<W: Write> WritePrinter<W> {
    pub fn new(inner: W) -> Self {
        WritePrinter { inner }
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Printer for WritePrinter<W> {
    fn print(&mut self, value: i64) -> io::Result<()> {
        writeln!(self.inner, "{value}")
    }
}

/// The internal state of the VM.
#[derive(Clone, Debug)]
struct State<TTracer: Tracer> {
    pub register: i64,
    pub stack: Vec<i64>,
    pub max_stack_size: usize,
    pub instructions_run: u64,
    pub ip: usize,
    pub tracer: TTracer,
}

/// An error that can occur during the execution of a single Minilang instruction.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationError {
    #[error("'{word}' is not a command Minilang understands")]
    UnknownCommand { word: String },
    #[error("Empty stack")]
    StackUnderflow,
    #[error("Adding to a full stack")]
    StackOverflow,
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Integer overflow")]
    IntegerOverflow,
}

/// What the run loop has to do after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Print(i64),
}

/// Integer division rounding towards negative infinity.
pub(crate) fn floor_div(a: i64, b: i64) -> Result<i64, OperationError> {
    if b == 0 {
        return Err(OperationError::DivisionByZero);
    }
    if a == i64::MIN && b == -1 {
        return Err(OperationError::IntegerOverflow);
    }
    Ok(Integer::div_floor(&a, &b))
}

/// Remainder of [`floor_div`]; it has the sign of the divisor.
pub(crate) fn floor_mod(a: i64, b: i64) -> Result<i64, OperationError> {
    if b == 0 {
        return Err(OperationError::DivisionByZero);
    }
    if b == -1 {
        // i64::MIN % -1 overflows, every value is divisible by -1
        return Ok(0);
    }
    Ok(Integer::mod_floor(&a, &b))
}

impl<TTracer: Tracer> State<TTracer> {
    fn new(max_stack_size: usize, register: i64, stack: Vec<i64>, mut tracer: TTracer) -> Self {
        tracer.start(&stack);
        State {
            register,
            stack,
            max_stack_size,
            instructions_run: 0,
            ip: 0,
            tracer,
        }
    }

    fn pop(&mut self) -> Result<i64, OperationError> {
        let value = self.stack.pop().ok_or(OperationError::StackUnderflow)?;
        self.tracer.pop();
        Ok(value)
    }

    fn push(&mut self, value: i64) -> Result<(), OperationError> {
        if self.stack.len() >= self.max_stack_size {
            return Err(OperationError::StackOverflow);
        }

        self.stack.push(value);
        self.tracer.push(value);
        Ok(())
    }

    fn apply(&mut self, token: &Token) -> Result<Effect, OperationError> {
        match token {
            Token::Literal(value) => {
                self.register = *value;
            }
            Token::Push => {
                self.push(self.register)?;
            }
            Token::Add => {
                let b = self.pop()?;
                self.register = self.register.checked_add(b).ok_or(OperationError::IntegerOverflow)?;
            }
            Token::Sub => {
                let b = self.pop()?;
                self.register = self.register.checked_sub(b).ok_or(OperationError::IntegerOverflow)?;
            }
            Token::Mult => {
                let b = self.pop()?;
                self.register = self.register.checked_mul(b).ok_or(OperationError::IntegerOverflow)?;
            }
            Token::Div => {
                let b = self.pop()?;
                self.register = floor_div(self.register, b)?;
            }
            Token::Mod => {
                let b = self.pop()?;
                self.register = floor_mod(self.register, b)?;
            }
            Token::Pop => {
                self.register = self.pop()?;
            }
            Token::Print => return Ok(Effect::Print(self.register)),
            Token::Invalid(word) => {
                return Err(OperationError::UnknownCommand { word: word.clone() });
            }
        }

        Ok(Effect::None)
    }
}

/// Options for the Minilang virtual machine.
#[derive(Debug, Clone)]
pub struct VMOptions<'a> {
    /// The value of the register before the first instruction.
    initial_register: i64,
    /// The initial stack of the program, bottom first.
    initial_stack: &'a [i64],
    /// The maximum size of the stack.
    max_stack_size: usize,
    /// The maximum number of instructions to run, if the program is longer,
    /// it will stop with an error.
    ///
    /// Set to [`u64::MAX`] to disable this limit.
    max_op_count: u64,
}

impl<'a> VMOptions<'a> {
    /// Create a new set of VM options.
    pub fn new(
        initial_register: i64,
        stack: &'a [i64],
        max_stack_size: usize,
        max_op_count: u64,
    ) -> Self {
        Self { initial_register, initial_stack: stack, max_stack_size, max_op_count }
    }

    /// Options with the limits taken from [`crate::config`].
    pub fn from_config(initial_register: i64, stack: &'a [i64]) -> Self {
        let conf = get_config();
        Self::new(initial_register, stack, conf.max_stack_size, conf.op_limit)
    }
}

impl<'a> Default for VMOptions<'a> {
    fn default() -> Self {
        Self {
            initial_register: 0,
            initial_stack: &[],
            max_stack_size: usize::MAX,
            max_op_count: u64::MAX,
        }
    }
}

/// An error that happened while running a Minilang program.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    /// A specific instruction failed.
    #[error("Token {index} (`{token}`) failed: {error}")]
    InstructionFailed {
        /// The token which failed.
        token: Token,
        /// The 0-based index of the token in the program.
        index: usize,
        /// The number of instructions which have been run before this one.
        instruction_counter: u64,
        /// The specific error within the instruction.
        error: OperationError,
    },
    /// The program is longer than the instruction limit specified within [`VMOptions`].
    #[error("The program ran for too long ({instruction_counter} instructions had been run).")]
    RunTooLong {
        /// The number of instructions which have been run
        instruction_counter: u64,
    },
    /// Writing a printed value failed.
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl RunError {
    /// The error of the failed instruction, if an instruction failed.
    pub fn operation_error(&self) -> Option<&OperationError> {
        match self {
            RunError::InstructionFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// The succesful result of running a Minilang program.
#[derive(Debug, Clone)]
pub struct RunResult<T: Tracer> {
    /// The register after the program has finished.
    pub register: i64,
    /// The resulting stack after the program has finished.
    pub stack: Vec<i64>,
    /// The number of instructions which have been run.
    pub instruction_counter: u64,
    /// The tracer passed to [`run_with_stats`].
    pub tracer: T,
}

impl<T: Tracer> From<State<T>> for RunResult<T> {
    fn from(s: State<T>) -> Self {
        RunResult {
            register: s.register,
            stack: s.stack,
            instruction_counter: s.instructions_run,
            tracer: s.tracer,
        }
    }
}

/// Run a Minilang program with the given options.
///
/// # Example
/// ```
/// use minilang::parser::parse_program;
/// use minilang::vm::{run, VMOptions};
///
/// let program = parse_program("5 PUSH 10 PRINT POP PRINT");
/// let mut output: Vec<i64> = Vec::new();
/// let result = run(&program, VMOptions::default(), &mut output);
/// assert!(result.is_ok());
/// assert_eq!(output, vec![10, 5]);
/// assert_eq!(result.unwrap().register, 5);
/// ```
pub fn run<P: Printer + ?Sized>(
    program: &Program,
    options: VMOptions,
    printer: &mut P,
) -> Result<RunResult<NoStats>, RunError> {
    run_with_stats(program, options, printer, NoStats::default())
}

/// Run a Minilang program with the given options and collect statistics.
/// If you do not need statistics, use the [`run`] function instead.
pub fn run_with_stats<T: Tracer, P: Printer + ?Sized>(
    program: &Program,
    options: VMOptions,
    printer: &mut P,
    tracer: T,
) -> Result<RunResult<T>, RunError> {
    let mut s: State<T> = State::new(
        options.max_stack_size,
        options.initial_register,
        options.initial_stack.to_vec(),
        tracer,
    );
    debug!("Running {} tokens, register {}, stack depth {}", program.len(), s.register, s.stack.len());
    run_state(&mut s, program, &options, printer)?;
    debug!("Finished after {} instructions, register {}", s.instructions_run, s.register);
    Ok(s.into())
}

/// Parse and run a program with default options, returning the printed values.
pub fn eval_str(source: &str) -> Result<Vec<i64>, RunError> {
    let program = parse_program(source);
    let mut output: Vec<i64> = Vec::new();
    run(&program, VMOptions::default(), &mut output)?;
    Ok(output)
}

fn run_state<T: Tracer, P: Printer + ?Sized>(
    s: &mut State<T>,
    program: &Program,
    options: &VMOptions,
    printer: &mut P,
) -> Result<(), RunError> {
    let level = get_config().instruction_log_level();

    while let Some(token) = program.tokens().get(s.ip) {
        if s.instructions_run >= options.max_op_count {
            return Err(RunError::RunTooLong { instruction_counter: s.instructions_run });
        }

        let index = s.ip;
        let instruction_counter = s.instructions_run;
        let result = s.apply(token);
        s.tracer.instruction(index, token, &result);
        log::log!(level, "{index}: {token} -> register {}, stack depth {}", s.register, s.stack.len());

        match result {
            Ok(Effect::None) => {}
            Ok(Effect::Print(value)) => {
                printer.print(value).map_err(|e| RunError::Output(e.to_string()))?;
            }
            Err(error) => {
                debug!("Token {index} ({token}) failed: {error}");
                return Err(RunError::InstructionFailed {
                    token: token.clone(),
                    index,
                    instruction_counter,
                    error,
                });
            }
        }

        s.ip += 1;
        s.instructions_run += 1;
    }

    Ok(())
}

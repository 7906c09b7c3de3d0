//! A second, deliberately naive evaluator used to cross-check [`crate::vm`].
//!
//! It works on raw words instead of parsed tokens and computes in `i128`,
//! only narrowing to `i64` after every instruction.
use std::fmt;

use crate::parser::parse_program;
use crate::vm::{self, OperationError, RunError, VMOptions};

/// Outcome of the reference evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRun {
    pub output: Vec<i64>,
    pub result: Result<(i64, Vec<i64>), OperationError>,
}

fn narrow(value: i128) -> Result<i64, OperationError> {
    i64::try_from(value).map_err(|_| OperationError::IntegerOverflow)
}

fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q }
}

fn literal(word: &str) -> Option<i64> {
    let value: i128 = word.parse().ok()?;
    if value.to_string() != word {
        return None;
    }
    i64::try_from(value).ok()
}

pub fn reference_eval(source: &str, register: i64, stack: &[i64]) -> ReferenceRun {
    let mut output: Vec<i64> = Vec::new();
    let mut register = register as i128;
    let mut stack: Vec<i128> = stack.iter().map(|&v| v as i128).collect();

    for word in source.split_ascii_whitespace() {
        if let Some(value) = literal(word) {
            register = value as i128;
            continue;
        }
        let step = (|| -> Result<(), OperationError> {
            match word {
                "PUSH" => stack.push(register),
                "PRINT" => output.push(narrow(register)?),
                "POP" | "ADD" | "SUB" | "MULT" | "DIV" | "MOD" => {
                    let b = stack.pop().ok_or(OperationError::StackUnderflow)?;
                    let value = match word {
                        "POP" => b,
                        "ADD" => register + b,
                        "SUB" => register - b,
                        "MULT" => register * b,
                        _ if b == 0 => return Err(OperationError::DivisionByZero),
                        "DIV" => floor_div(register, b),
                        _ => register - b * floor_div(register, b),
                    };
                    register = narrow(value)? as i128;
                }
                _ => return Err(OperationError::UnknownCommand { word: word.to_string() }),
            }
            Ok(())
        })();
        if let Err(err) = step {
            return ReferenceRun { output, result: Err(err) };
        }
    }

    let stack = stack.into_iter().map(|v| v as i64).collect();
    ReferenceRun { output, result: Ok((register as i64, stack)) }
}

/// A program together with its starting state, printable as a ready-made test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReproData {
    pub source: String,
    pub register: i64,
    pub stack: Vec<i64>,
}

impl ReproData {
    pub fn new(source: impl Into<String>, register: i64, stack: Vec<i64>) -> Self {
        ReproData { source: source.into(), register, stack }
    }

    pub fn verify(&self) {
        verify_repro(&self.source, self.register, self.stack.clone());
    }
}

impl fmt::Display for ReproData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reproduce with:")?;
        writeln!(f, "#[test]")?;
        writeln!(f, "fn fuzz_repro() {{")?;
        writeln!(f, "    verify_repro({:?}, {}, vec!{:?});", self.source, self.register, self.stack)?;
        write!(f, "}}")
    }
}

/// Runs `source` on the VM and on [`reference_eval`] and panics if they disagree.
pub fn verify_repro(source: &str, register: i64, stack: Vec<i64>) {
    let expected = reference_eval(source, register, &stack);

    let program = parse_program(source);
    let mut output: Vec<i64> = Vec::new();
    let vm_res = vm::run(&program, VMOptions::new(register, &stack, usize::MAX, u64::MAX), &mut output);

    if cfg!(debug_assertions) {
        println!("    * Reference result: {expected:?}");
        println!("    * Interpreter result: {vm_res:?} output: {output:?}");
    }

    assert_eq!(output, expected.output, "Output mismatch. Program: {source:?}, register: {register}, stack: {stack:?}");
    match (vm_res, expected.result) {
        (Ok(vm_run), Ok((ref_register, ref_stack))) => {
            assert_eq!(vm_run.register, ref_register, "Register mismatch. Program: {source:?}");
            assert_eq!(vm_run.stack, ref_stack, "Stack mismatch. Program: {source:?}");
            assert_eq!(vm_run.instruction_counter, program.len() as u64);
        }
        (Err(RunError::InstructionFailed { error, .. }), Err(ref_error)) => {
            assert_eq!(error, ref_error, "Error mismatch. Program: {source:?}");
        }
        (vm_res, ref_res) => panic!("VM: {vm_res:?}, reference: {ref_res:?}. Program: {source:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_matches_documented_examples() {
        assert_eq!(reference_eval("5 PUSH 3 MULT PRINT", 0, &[]).output, vec![15]);
        assert_eq!(reference_eval("3 PUSH PUSH 7 DIV MULT PRINT", 0, &[]).output, vec![6]);
        assert_eq!(reference_eval("-7 PUSH 2 PUSH -7 MOD PRINT", 0, &[]).output, vec![1]);
        assert_eq!(
            reference_eval("5 PUSH POP POP PRINT", 0, &[]).result,
            Err(OperationError::StackUnderflow)
        );
    }

    #[test]
    fn test_verify_examples() {
        verify_repro("5 PRINT PUSH 3 PRINT ADD PRINT", 0, vec![]);
        verify_repro("-3 PUSH 5 XSUB PRINT", 0, vec![]);
        verify_repro("DIV", i64::MIN, vec![-1]);
        verify_repro("MOD", i64::MIN, vec![-1]);
        verify_repro("MULT PRINT", 3, vec![-3, i64::MAX]);
    }

    #[test]
    fn test_repro_display() {
        let repro = ReproData::new("1 PUSH", 2, vec![3]);
        assert!(repro.to_string().contains("verify_repro(\"1 PUSH\", 2, vec![3]);"));
    }
}

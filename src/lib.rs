//! # minilang
//! A tiny stack machine with one register, one stack and eight instructions.
//! ## Introduction
//! A Minilang program is a whitespace-separated list of words. Each word is
//! either an integer literal, which replaces the register, or one of the
//! keywords `PUSH`, `ADD`, `SUB`, `MULT`, `DIV`, `MOD`, `POP` and `PRINT`.
//! Arithmetic keywords pop their right operand from the stack and combine it
//! with the register, storing the result back into the register.
//!
//! ```
//! use minilang::vm::eval_str;
//!
//! assert_eq!(eval_str("5 PUSH 3 MULT PRINT").unwrap(), vec![15]);
//! assert_eq!(eval_str("3 PUSH PUSH 7 DIV MULT PRINT").unwrap(), vec![6]);
//! ```
//!
//! The program is parsed once into [`ops::Token`]s by [`parser`] and then
//! executed by [`vm::run`], which sends every `PRINT` to a [`vm::Printer`].
pub mod config;
pub mod ops;
pub mod parser;
pub mod test_utils;
pub mod vm;

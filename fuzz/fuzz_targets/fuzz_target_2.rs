#![no_main]

use libfuzzer_sys::fuzz_target;
use minilang::{parser::parse_program, vm::{self, VMOptions}};

// Arbitrary bytes as source text: the parser and VM must never panic.
fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else { return };

    let program = parse_program(source);
    assert_eq!(program.len(), source.split_ascii_whitespace().count());
    assert_eq!(parse_program(&program.to_string()), program);

    let mut output: Vec<i64> = Vec::new();
    let _ = vm::run(&program, VMOptions::new(0, &[], 1000, 100_000), &mut output);
});

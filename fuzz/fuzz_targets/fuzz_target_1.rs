#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use minilang::test_utils::ReproData;
use minilang_fuzz::{join_tokens, ArbitraryToken};

#[derive(Arbitrary)]
struct FuzzInput {
    program: Vec<ArbitraryToken>,
    register: i64,
    stack: Vec<i64>,
}

impl std::fmt::Debug for FuzzInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&to_repro(self), f)
    }
}

fn to_repro(i: &FuzzInput) -> ReproData {
    ReproData::new(join_tokens(&i.program), i.register, i.stack.clone())
}

fuzz_target!(|data: FuzzInput| {
    if data.program.is_empty() { return } // uninteresting edge case

    to_repro(&data).verify();
});

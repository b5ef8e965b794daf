#![no_main]

use libfuzzer_sys::fuzz_target;
use pv_balance::corpus::Corpus;
use pv_balance::input::Input;

fuzz_target!(|input: Input| {
    let _ = Corpus::from_inputs(&input);
});

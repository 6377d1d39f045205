#![no_main]

use cee_parser::scan_tokens;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let char_count = s.chars().count() as u32;

    let mut last_end = 0u32;
    let mut steps = 0usize;
    let max_steps = s.len().saturating_mul(4) + 64;

    for tok in scan_tokens(&s) {
        assert!(tok.range.from.offset <= tok.range.to.offset);
        assert!(tok.range.to.offset <= char_count);
        assert!(tok.range.from.offset >= last_end);
        last_end = tok.range.to.offset;

        steps += 1;
        assert!(steps <= max_steps);
    }

    // The parser must terminate without panicking on arbitrary input.
    let (_file, _diags) = cee_parser::parse(&s);
});

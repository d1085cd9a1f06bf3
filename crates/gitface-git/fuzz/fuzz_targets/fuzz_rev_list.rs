#![no_main]

use gitface_git::revlist::{block_fields, split_blocks};
use gitface_git::{Commit, parse_user};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };

    // Every block either yields a commit or a MissingIdentifier error, never a panic
    for block in split_blocks(raw) {
        assert!(block.starts_with("commit "));
        let _ = Commit::from_fields_with_diagnostics(block_fields(block));
    }

    let _ = parse_user(raw);
});

//! Tokenizer fuzzer.
//!
//! Feeds arbitrary UTF-8 lines through `tokenize`. When tokenization
//! succeeds, concatenating the tokens must give back the input. A group
//! token with a well-formed interior must round-trip the same way, and its
//! interior must be exactly the text between the outer parentheses.

use honggfuzz::fuzz;
use sqldump_rewrite::tokenizer::{join, tokenize};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Ok(line) = std::str::from_utf8(data) else {
                return;
            };
            let Ok(tokens) = tokenize(line) else {
                return;
            };
            assert_eq!(join(&tokens), line);
            for token in tokens.iter().filter(|token| token.is_group()) {
                // `(a)b` is a single token without an interior.
                let Some(interior) = token.interior() else {
                    assert!(!token.as_str().ends_with(')'));
                    continue;
                };
                assert_eq!(format!("({interior})"), token.as_str());
                // `(a)(b)` has interior `a)(b`, which does not re-tokenize.
                if let Ok(inner) = tokenize(interior) {
                    assert_eq!(join(&inner), interior);
                }
            }
        });
    }
}

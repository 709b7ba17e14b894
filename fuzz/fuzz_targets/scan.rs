#![no_main]

use libfuzzer_sys::fuzz_target;
use fy_safer::{Input, Scanner, TokenData};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(data: &[u8]) {
    let input = Input::from_bytes("fuzz", data.to_vec());
    let mut scanner = Scanner::new(input);

    while let Ok(token) = scanner.next_token() {
        let is_end = matches!(token.data, TokenData::StreamEnd);
        if is_end {
            break;
        }
    }
}

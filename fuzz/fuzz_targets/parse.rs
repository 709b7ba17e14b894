#![no_main]

use libfuzzer_sys::fuzz_target;
use fy_safer::{EventData, Input, Parser};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(data: &[u8]) {
    let input = Input::from_bytes("fuzz", data.to_vec());
    let mut parser = Parser::new(input);

    while let Ok(event) = parser.parse() {
        let is_end = matches!(event.data, EventData::StreamEnd);
        if is_end {
            break;
        }
    }
}

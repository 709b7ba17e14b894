#![no_main]

use libfuzzer_sys::fuzz_target;
use fy_safer::{Document, Input, Parser};

fuzz_target!(|data: &[u8]| fuzz_target(data));

fn fuzz_target(data: &[u8]) {
    let input = Input::from_bytes("fuzz", data.to_vec());
    let mut parser = Parser::new(input);

    while let Ok(document) = Document::load(&mut parser) {
        if document.get_root_node().is_none() {
            break;
        }
    }
}

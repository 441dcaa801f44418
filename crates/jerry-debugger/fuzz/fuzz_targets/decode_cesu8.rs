#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Never panic / never hang on attacker-controlled text. A successful
    // decode must survive re-encoding.
    if let Ok(text) = jerry_debugger::cesu8::decode(data) {
        let _ = jerry_debugger::cesu8::encode(&text, 0);
    }
});

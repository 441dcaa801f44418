#![no_main]

use jerry_debugger::constants::{server, JERRY_DEBUGGER_VERSION};
use jerry_debugger::{DebuggerSession, NoopDelegate, Transport};
use libfuzzer_sys::fuzz_target;

struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _message: &[u8]) -> bool {
        true
    }
}

fuzz_target!(|data: &[u8]| {
    // Never panic on attacker-controlled frames, configured or not.
    let mut raw = DebuggerSession::new(Box::new(NullTransport), Box::new(NoopDelegate));
    let _ = raw.on_message(data);

    let mut configured = DebuggerSession::new(Box::new(NullTransport), Box::new(NoopDelegate));
    let _ = configured.on_message(&[server::CONFIGURATION, 128, 2, 1, JERRY_DEBUGGER_VERSION]);
    for frame in data.split(|&b| b == 0xFF) {
        if configured.on_message(frame).is_err() {
            break;
        }
    }
});

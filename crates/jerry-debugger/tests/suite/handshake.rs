use jerry_debugger::constants::{server, JERRY_DEBUGGER_VERSION};
use jerry_debugger::DebuggerError;
use pretty_assertions::assert_eq;

use crate::harness::{self, configuration, msg, Event};

#[test]
fn handshake_then_single_unnamed_script() {
    let mut test = harness::raw_session();
    test.feed(&[server::CONFIGURATION, 0x80, 0x02, 0x01, JERRY_DEBUGGER_VERSION]);
    test.feed(&msg(server::SOURCE_CODE_END, b"abc"));

    let events = test.events.take();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::ScriptParsed(script) => {
            assert_eq!(script.id, 1);
            assert_eq!(script.name, "");
            assert_eq!(script.line_count, 1);
        }
        other => panic!("expected ScriptParsed, got {other:?}"),
    }
    assert_eq!(test.session.get_source(1).unwrap(), "abc");
    assert_eq!(test.session.script_count(), 1);

    let config = test.session.byte_config().unwrap();
    assert_eq!(config.cpointer_size, 2);
    assert!(config.little_endian);
    assert_eq!(test.session.max_message_size(), 0x80);
}

#[test]
fn first_frame_must_be_configuration() {
    let mut test = harness::raw_session();
    let err = test.feed_err(&msg(server::SOURCE_CODE_END, b"abc"));
    assert!(matches!(err, DebuggerError::Protocol(_)));
    assert!(matches!(test.events.take()[..], [Event::Error(0, _)]));

    // The session is terminated; nothing else is accepted.
    let err = test.feed_err(&configuration(128, 2, true));
    assert!(matches!(err, DebuggerError::ConnectionClosed));
}

#[test]
fn empty_frame_is_fatal() {
    let mut test = harness::raw_session();
    assert!(matches!(test.feed_err(&[]), DebuggerError::Protocol(_)));
}

#[test]
fn short_configuration_is_fatal() {
    let mut test = harness::raw_session();
    let err = test.feed_err(&[server::CONFIGURATION, 0x80, 0x02, 0x01]);
    assert!(matches!(err, DebuggerError::Protocol(_)));
    assert!(matches!(test.events.take()[..], [Event::Error(0, _)]));
}

#[test]
fn pointer_size_three_is_fatal() {
    let mut test = harness::raw_session();
    let err = test.feed_err(&[server::CONFIGURATION, 0x80, 3, 0x01, JERRY_DEBUGGER_VERSION]);
    assert!(matches!(err, DebuggerError::Protocol(_)));
}

#[test]
fn version_mismatch_is_fatal() {
    let mut test = harness::raw_session();
    let err = test.feed_err(&[
        server::CONFIGURATION,
        0x80,
        0x02,
        0x01,
        JERRY_DEBUGGER_VERSION.wrapping_add(1),
    ]);
    assert!(matches!(err, DebuggerError::Protocol(_)));
}

#[test]
fn reconfiguration_never_reassigns_the_byte_config() {
    let mut test = harness::session();

    // A bad pointer size stays fatal even on a repeated configuration.
    let mut bad = test;
    bad.feed_err(&configuration(128, 3, true));

    let mut test = harness::session();
    test.feed(&configuration(64, 4, false));
    let config = test.session.byte_config().unwrap();
    // Pointer size and endianness keep their handshake values.
    assert_eq!(config.cpointer_size, 2);
    assert!(config.little_endian);
    // The message size limit may be refreshed.
    assert_eq!(test.session.max_message_size(), 64);
}

use jerry_debugger::constants::{client, server};
use jerry_debugger::{DebuggerError, EvalResultSubtype};
use pretty_assertions::assert_eq;

use crate::harness::{self, breakpoint_list, msg, Event};

fn halted_session(max_message_size: u8) -> harness::TestSession {
    let mut test = harness::session_with(max_message_size);
    test.feed_default_script();
    test.feed_hit(42, 125);
    test.events.take();
    test.sent.take();
    test
}

#[test]
fn eval_is_fragmented_to_the_message_size_limit() {
    let mut test = halted_session(6);

    let mut pending = test.session.evaluate("foobar").unwrap();
    assert!(pending.try_take().is_none());
    assert_eq!(test.session.evals_pending(), 1);

    // Header (tag + 32-bit payload length) fills the first packet together
    // with the subtype byte; the expression spills into EVAL_PART packets.
    assert_eq!(
        test.sent.take(),
        vec![
            vec![client::EVAL, 7, 0, 0, 0, 0],
            vec![client::EVAL_PART, b'f', b'o', b'o', b'b', b'a'],
            vec![client::EVAL_PART, b'r'],
        ]
    );
}

#[test]
fn eval_result_resolves_the_pending_request() {
    let mut test = halted_session(128);

    let mut pending = test.session.evaluate("6 * 7").unwrap();
    test.feed(&msg(server::EVAL_RESULT, b"4"));
    // Final byte is the subtype (1 = ok).
    test.feed(&msg(server::EVAL_RESULT_END, &[b'2', 1]));

    assert_eq!(
        test.events.take(),
        vec![Event::EvalResult(EvalResultSubtype::Ok, "42".to_string())]
    );
    let result = pending.try_take().unwrap().unwrap();
    assert_eq!(result.subtype, EvalResultSubtype::Ok);
    assert_eq!(result.value, "42");
    assert_eq!(test.session.evals_pending(), 0);
}

#[test]
fn eval_error_subtype_still_resolves_the_request() {
    let mut test = halted_session(128);

    let mut pending = test.session.evaluate("nope()").unwrap();
    test.feed(&msg(server::EVAL_RESULT_END, &[b'R', b'e', b'f', 2]));

    let result = pending.try_take().unwrap().unwrap();
    assert_eq!(result.subtype, EvalResultSubtype::Error);
    assert_eq!(result.value, "Ref");
}

#[test]
fn eval_requires_a_halted_engine() {
    let mut test = harness::session();
    test.feed_default_script();
    assert!(matches!(
        test.session.evaluate("1"),
        Err(DebuggerError::NotHalted)
    ));
    assert_eq!(test.session.evals_pending(), 0);
}

#[test]
fn parse_traffic_is_ignored_while_evals_are_pending() {
    let mut test = halted_session(128);
    let bp = test.session.find_breakpoint(1, 25).unwrap();
    test.session.update_breakpoint(bp.id, true).unwrap();
    test.sent.take();

    let _pending = test.session.evaluate("print('x')").unwrap();
    test.sent.take();

    // The engine may emit parse-like traffic while producing eval output;
    // none of it must disturb the session model.
    test.feed(&msg(server::SOURCE_CODE_END, b"ghost"));
    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[1]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[9]));
    test.feed(&msg(server::BYTE_CODE_CP, &77u16.to_le_bytes()));
    test.feed(&msg(server::RELEASE_BYTE_CODE_CP, &[42, 0]));

    assert_eq!(test.session.script_count(), 1);
    assert_eq!(test.session.function_count(), 1);
    assert_eq!(test.session.active_breakpoint_count(), 1);
    assert!(test.events.take().is_empty());
    // In particular no FREE_BYTE_CODE_CP acknowledgement went out.
    assert!(test.sent.is_empty());

    // Once the eval completes, parsing resumes normally.
    test.feed(&msg(server::EVAL_RESULT_END, &[b'o', b'k', 1]));
    test.feed_script("second", &[1], &[5], 77);
    assert_eq!(test.session.script_count(), 2);
    assert_eq!(test.session.function_count(), 2);
}

#[test]
fn source_name_is_not_debounced_while_evals_are_pending() {
    let mut test = halted_session(128);

    let _pending = test.session.evaluate("1").unwrap();
    test.feed(&msg(server::SOURCE_CODE_NAME_END, b"late.js"));
    test.feed(&msg(server::EVAL_RESULT_END, &[b'1', 1]));

    test.feed_script("more", &[1], &[5], 50);
    match &test.events.take()[..] {
        [Event::EvalResult(..), Event::ScriptParsed(script)] => {
            assert_eq!(script.name, "late.js");
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn pending_requests_are_awaitable() {
    let mut test = halted_session(128);
    let pending = test.session.evaluate("1").unwrap();
    test.feed(&msg(server::EVAL_RESULT_END, &[b'1', 1]));

    let result = pending.await.unwrap();
    assert_eq!(result.value, "1");
}

#[test]
fn restart_sends_the_abort_sentinel_through_the_eval_channel() {
    let mut test = halted_session(128);

    let mut pending = test.session.restart().unwrap();
    assert!(matches!(pending.try_take(), Some(Ok(()))));
    // Not an eval: no reply is expected.
    assert_eq!(test.session.evals_pending(), 0);

    // Payload = subtype byte (abort) + "r353t".
    assert_eq!(
        test.sent.take(),
        vec![vec![
            client::EVAL,
            6,
            0,
            0,
            0,
            2,
            b'r',
            b'3',
            b'5',
            b'3',
            b't'
        ]]
    );
}

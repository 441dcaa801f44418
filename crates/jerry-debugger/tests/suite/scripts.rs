use jerry_debugger::constants::server;
use pretty_assertions::assert_eq;

use crate::harness::{self, breakpoint_list, msg, Event};

#[test]
fn source_name_split_across_frames_is_concatenated() {
    let mut test = harness::session();
    test.feed(&msg(server::SOURCE_CODE_NAME, b"foo"));
    test.feed(&msg(server::SOURCE_CODE_NAME_END, b"foo"));
    test.feed(&msg(server::SOURCE_CODE_END, b"abc"));

    match &test.events.take()[..] {
        [Event::ScriptParsed(script)] => assert_eq!(script.name, "foofoo"),
        other => panic!("expected one ScriptParsed, got {other:?}"),
    }
    assert_eq!(test.session.script(1).unwrap().name, "foofoo");
}

#[test]
fn source_split_across_frames_is_concatenated() {
    let mut test = harness::session();
    test.feed(&msg(server::SOURCE_CODE, b"var a"));
    test.feed(&msg(server::SOURCE_CODE, b" = 1;\n"));
    test.feed(&msg(server::SOURCE_CODE_END, b"a;"));

    assert_eq!(test.session.get_source(1).unwrap(), "var a = 1;\na;");
    match &test.events.take()[..] {
        [Event::ScriptParsed(script)] => assert_eq!(script.line_count, 2),
        other => panic!("expected one ScriptParsed, got {other:?}"),
    }
}

#[test]
fn line_count_is_newlines_plus_one() {
    let mut test = harness::session();
    test.feed(&msg(server::SOURCE_CODE_END, b"a\nb\nc\n"));
    match &test.events.take()[..] {
        [Event::ScriptParsed(script)] => assert_eq!(script.line_count, 4),
        other => panic!("expected one ScriptParsed, got {other:?}"),
    }
}

#[test]
fn function_name_is_consumed_by_next_parse_function() {
    let mut test = harness::session();
    test.feed(&msg(server::SOURCE_CODE_END, b"function outer() {}\n() => {}"));

    test.feed(&msg(server::FUNCTION_NAME, b"ou"));
    test.feed(&msg(server::FUNCTION_NAME_END, b"ter"));
    // line 1, column 10
    test.feed(&msg(server::PARSE_FUNCTION, &[1, 0, 0, 0, 10, 0, 0, 0]));
    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[1]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[8]));
    test.feed(&msg(server::BYTE_CODE_CP, &7u16.to_le_bytes()));

    // No FUNCTION_NAME in between: the second function is anonymous.
    test.feed(&msg(server::PARSE_FUNCTION, &[2, 0, 0, 0, 1, 0, 0, 0]));
    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[2]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[4]));
    test.feed(&msg(server::BYTE_CODE_CP, &8u16.to_le_bytes()));

    // Top-level code closes the parse.
    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[1, 2]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[100, 120]));
    test.feed(&msg(server::BYTE_CODE_CP, &9u16.to_le_bytes()));

    let named = test.session.find_breakpoint(1, 1).unwrap();
    assert_eq!(named.function_name, "outer");
    assert!(named.is_func);
    assert_eq!(named.function_line, 1);
    assert_eq!(named.function_column, 10);

    let anonymous = test.session.find_breakpoint(1, 2).unwrap();
    assert_eq!(anonymous.function_name, "");
    assert!(anonymous.is_func);
    assert_eq!(anonymous.to_string(), "<unknown>:2 (in function() at line:2, col:1)");
}

#[test]
fn nested_functions_resolve_innermost_first() {
    let mut test = harness::session();
    test.feed(&msg(server::SOURCE_CODE_END, b"outer\ninner\n"));

    // The engine finishes the innermost function first: its BYTE_CODE_CP
    // arrives before the enclosing function's.
    test.feed(&msg(server::PARSE_FUNCTION, &[1, 0, 0, 0, 1, 0, 0, 0]));
    test.feed(&msg(server::PARSE_FUNCTION, &[2, 0, 0, 0, 3, 0, 0, 0]));
    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[2]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[12]));
    test.feed(&msg(server::BYTE_CODE_CP, &21u16.to_le_bytes()));

    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[1, 2]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[40, 60]));
    test.feed(&msg(server::BYTE_CODE_CP, &20u16.to_le_bytes()));

    test.feed(&breakpoint_list(server::BREAKPOINT_LIST, &[1]));
    test.feed(&breakpoint_list(server::BREAKPOINT_OFFSET_LIST, &[90]));
    test.feed(&msg(server::BYTE_CODE_CP, &22u16.to_le_bytes()));

    // Line 2 is covered by both the closure (cp 21) and its enclosing
    // function (cp 20); the closure wins.
    let info = test.session.find_breakpoint(1, 2).unwrap();
    assert_eq!(info.offset, 12);

    assert_eq!(test.session.possible_breakpoints(1, 1..=10).unwrap(), vec![1, 2]);
}

#[test]
fn scripts_are_numbered_sequentially() {
    let mut test = harness::session();
    test.feed_script("first", &[1], &[10], 31);
    test.feed(&msg(server::SOURCE_CODE_NAME_END, b"second.js"));
    test.feed_script("second", &[1], &[10], 32);

    assert_eq!(test.session.script_count(), 2);
    assert_eq!(test.session.get_source(1).unwrap(), "first");
    assert_eq!(test.session.get_source(2).unwrap(), "second");
    assert_eq!(test.session.script(2).unwrap().name, "second.js");

    let events = test.events.take();
    assert_eq!(events.len(), 2);
}

#[test]
fn output_results_are_reassembled_and_tagged() {
    use jerry_debugger::OutputSubtype;

    let mut test = harness::session();
    test.feed(&msg(server::OUTPUT_RESULT, b"hel"));
    // Final byte of the assembled payload is the subtype (2 = error).
    test.feed(&msg(server::OUTPUT_RESULT_END, &[b'l', b'o', 2]));

    assert_eq!(
        test.events.take(),
        vec![Event::Output(OutputSubtype::Error, "hello".to_string())]
    );
}

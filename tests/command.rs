use dictkv::{DictError, Request, Response};

// parsing

#[test]
fn parses_get() {
    let req = Request::parse(b"GET color\n").unwrap();
    assert_eq!(
        req,
        Request::Get {
            key: "color".to_string()
        }
    );
}

#[test]
fn parses_set() {
    let req = Request::parse(b"SET color teal\n").unwrap();
    assert_eq!(
        req,
        Request::Set {
            key: "color".to_string(),
            value: "teal".to_string()
        }
    );
}

#[test]
fn parses_del() {
    let req = Request::parse(b"DEL color\n").unwrap();
    assert_eq!(
        req,
        Request::Del {
            key: "color".to_string()
        }
    );
}

#[test]
fn empty_buffer_is_null_input() {
    let err = Request::parse(b"").unwrap_err();
    assert!(matches!(err, DictError::NullInput));
    assert_eq!(err.wire_code(), 2);
}

#[test]
fn short_buffer_is_too_small() {
    let err = Request::parse(b"GE").unwrap_err();
    assert!(matches!(err, DictError::BufferTooSmall));
    assert_eq!(err.wire_code(), 3);
}

#[test]
fn unknown_command_is_invalid() {
    let err = Request::parse(b"FOO bar\n").unwrap_err();
    assert!(matches!(err, DictError::InvalidCommand));
    assert_eq!(err.wire_code(), 5);
}

#[test]
fn set_with_one_argument_is_missing_argument() {
    let err = Request::parse(b"SET onlykey\n").unwrap_err();
    assert!(matches!(err, DictError::MissingArgument));
    assert_eq!(err.wire_code(), 6);
}

#[test]
fn get_with_two_arguments_is_missing_argument() {
    // two arguments is a wrong arity for GET, not an overflow
    let err = Request::parse(b"GET a b\n").unwrap_err();
    assert!(matches!(err, DictError::MissingArgument));
}

#[test]
fn third_argument_is_rejected_before_being_stored() {
    let err = Request::parse(b"GET a b c\n").unwrap_err();
    assert!(matches!(err, DictError::TooManyArguments));
    assert_eq!(err.wire_code(), 7);

    let err = Request::parse(b"SET k v extra\n").unwrap_err();
    assert!(matches!(err, DictError::TooManyArguments));
}

#[test]
fn keyword_is_found_by_substring_search() {
    // the keyword does not have to start the line or stand alone in a token
    let req = Request::parse(b"DELete color\n").unwrap();
    assert_eq!(
        req,
        Request::Del {
            key: "color".to_string()
        }
    );
}

#[test]
fn keyword_precedence_is_get_then_set_then_del() {
    // GET is searched for first, so it wins over the DEL in the same token
    let req = Request::parse(b"DELGET color\n").unwrap();
    assert_eq!(
        req,
        Request::Get {
            key: "color".to_string()
        }
    );
}

#[test]
fn first_token_is_discarded_by_position_not_value() {
    // the keyword is found by search, but the token dropped is simply the
    // first one, so the SET occurrence itself lands in the argument list
    let req = Request::parse(b"x SET k\n").unwrap();
    assert_eq!(
        req,
        Request::Set {
            key: "SET".to_string(),
            value: "k".to_string()
        }
    );
}

#[test]
fn non_utf8_buffer_is_a_buffer_error() {
    let err = Request::parse(b"GET \xff\xfe\n").unwrap_err();
    assert!(matches!(err, DictError::BufferError));
    assert_eq!(err.wire_code(), 4);
}

// response encoding

fn encoded(response: Response) -> Vec<u8> {
    let mut wire = Vec::new();
    response.write_to(&mut wire).unwrap();
    wire
}

#[test]
fn encodes_ok() {
    assert_eq!(encoded(Response::Ok), b"OK\n");
}

#[test]
fn encodes_value_as_two_lines() {
    assert_eq!(encoded(Response::Value("42".to_string())), b"OK\n42\n");
}

#[test]
fn encodes_not_found() {
    assert_eq!(encoded(Response::NotFound), b"NOTFOUND\n");
}

#[test]
fn encodes_error_without_terminator() {
    assert_eq!(encoded(Response::Error(5)), b"ERROR:5");
}

#[test]
fn wire_codes_are_stable() {
    assert_eq!(DictError::NullInput.wire_code(), 2);
    assert_eq!(DictError::BufferTooSmall.wire_code(), 3);
    assert_eq!(DictError::BufferError.wire_code(), 4);
    assert_eq!(DictError::InvalidCommand.wire_code(), 5);
    assert_eq!(DictError::MissingArgument.wire_code(), 6);
    assert_eq!(DictError::TooManyArguments.wire_code(), 7);
    assert_eq!(DictError::KeyNotFound.wire_code(), 8);
}

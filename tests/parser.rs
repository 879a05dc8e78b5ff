use jsonc::parser::{parse, walk, ParseErrorCode, ParseOptions, Scalar, Visitor};
use jsonc::tree::{parse_tree, NodeId, NodeKind, Tree};

fn all(comments: bool, trailing_commas: bool) -> ParseOptions {
    ParseOptions {
        comments,
        trailing_commas,
    }
}

#[test]
fn test_parse_minified() {
    // (input, options, want, expect_errors)
    let cases: &[(&str, ParseOptions, &str, bool)] = &[
        ("", all(true, true), "", false),
        // literals
        ("true", all(true, true), "true", false),
        ("false", all(true, true), "false", false),
        ("null", all(true, true), "null", false),
        (r#""foo""#, all(true, true), r#""foo""#, false),
        (
            r#""\"-\\-\/-\b-\f-\n-\r-\t""#,
            all(true, true),
            r#""\"-\\-/-\u0008-\u000c-\n-\r-\t""#,
            false,
        ),
        (r#""Ü""#, all(true, true), r#""Ü""#, false),
        ("9", all(true, true), "9", false),
        ("-9", all(true, true), "-9", false),
        ("0.129", all(true, true), "0.129", false),
        ("23e3", all(true, true), "23e3", false),
        ("1.2E+3", all(true, true), "1.2E+3", false),
        ("1.2E-3", all(true, true), "1.2E-3", false),
        ("1.2E-3 // comment", all(true, true), "1.2E-3", false),
        // objects
        ("{}", all(true, true), "{}", false),
        (r#"{ "foo": true }"#, all(true, true), r#"{"foo":true}"#, false),
        (
            r#"{ "bar": 8, "xoo": "foo" }"#,
            all(true, true),
            r#"{"bar":8,"xoo":"foo"}"#,
            false,
        ),
        (
            r#"{ "hello": [], "world": {} }"#,
            all(true, true),
            r#"{"hello":[],"world":{}}"#,
            false,
        ),
        (
            r#"{ "a": false, "b": true, "c": [ 7.4 ] }"#,
            all(true, true),
            r#"{"a":false,"b":true,"c":[7.4]}"#,
            false,
        ),
        (
            r#"{ "blockComment": ["/*", "*/"], "brackets": [ ["{", "}"], ["[", "]"], ["(", ")"] ], "lineComment": "//" }"#,
            all(true, true),
            r#"{"blockComment":["/*","*/"],"brackets":[["{","}"],["[","]"],["(",")"]],"lineComment":"//"}"#,
            false,
        ),
        (
            r#"{ "hello": { "again": { "inside": 5 }, "world": 1 }}"#,
            all(true, true),
            r#"{"hello":{"again":{"inside":5},"world":1}}"#,
            false,
        ),
        (
            r#"{ "foo": /*hello*/true }"#,
            all(true, true),
            r#"{"foo":true}"#,
            false,
        ),
        // arrays
        ("[]", all(true, true), "[]", false),
        ("[ [], [ [] ]]", all(true, true), "[[],[[]]]", false),
        ("[ 1, 2, 3 ]", all(true, true), "[1,2,3]", false),
        (
            r#"[ { "a": null } ]"#,
            all(true, true),
            r#"[{"a":null}]"#,
            false,
        ),
        // objects with errors
        ("{,}", all(true, true), "{}", true),
        (
            r#"{ "foo": true, }"#,
            all(false, false),
            r#"{"foo":true}"#,
            true,
        ),
        (
            r#"{ "bar": 8 "xoo": "foo"}"#,
            all(true, true),
            r#"{"bar":8,"xoo":"foo"}"#,
            true,
        ),
        (r#"{ ,"bar": 8 }"#, all(true, true), r#"{"bar":8}"#, true),
        (r#"{ "bar": 8, "foo": }"#, all(true, true), r#"{"bar":8}"#, true),
        (r#"{ 8, "foo": 9 }"#, all(true, true), r#"{"foo":9}"#, true),
        // arrays with errors
        ("[,]", all(true, true), "[]", true),
        ("[ 1, 2, ]", all(false, false), "[1,2]", true),
        ("[ 1 2, 3]", all(true, true), "[1,2,3]", true),
        ("[ ,1, 2, 3 ]", all(true, true), "[1,2,3]", true),
        ("[ ,1, 2, 3, ]", all(false, false), "[1,2,3]", true),
        // disallowed comments
        (
            r#"[ 1, 2, null, "foo" ]"#,
            all(false, false),
            r#"[1,2,null,"foo"]"#,
            false,
        ),
        (
            r#"{ "hello1": [], "world": {} }"#,
            all(false, false),
            r#"{"hello1":[],"world":{}}"#,
            false,
        ),
        (
            r#"{ "foo": /*comment*/ true }"#,
            all(false, false),
            r#"{"foo":true}"#,
            true,
        ),
        // trailing commas
        (r#"{ "hello": [], }"#, all(true, true), r#"{"hello":[]}"#, false),
        (r#"{ "hello": [] }"#, all(true, true), r#"{"hello":[]}"#, false),
        (
            r#"{ "hello": [], "world": {}, }"#,
            all(true, true),
            r#"{"hello":[],"world":{}}"#,
            false,
        ),
        (
            r#"{ "hello2": [], "world": {} }"#,
            all(true, true),
            r#"{"hello2":[],"world":{}}"#,
            false,
        ),
        ("[ 1, 5, ]", all(true, true), "[1,5]", false),
        (
            r#"{ "hello2": [], }"#,
            all(false, false),
            r#"{"hello2":[]}"#,
            true,
        ),
        (
            r#"{ "hello2": [], "world": {}, }"#,
            all(false, false),
            r#"{"hello2":[],"world":{}}"#,
            true,
        ),
        ("[ 1, 6, ]", all(false, false), "[1,6]", true),
    ];
    for (input, options, want, expect_errors) in cases {
        let (output, errors) = parse(input, *options);
        assert_eq!(&output, want, "output of {:?}", input);
        assert_eq!(
            !errors.is_empty(),
            *expect_errors,
            "errors of {:?}: {:?}",
            input,
            errors
        );
    }
}

struct LastError(Option<ParseErrorCode>);

impl Visitor for LastError {
    fn on_error(&mut self, code: ParseErrorCode, _offset: usize, _length: usize) {
        self.0 = Some(code);
    }
}

#[test]
fn test_walk_error_codes() {
    let cases: &[(&str, ParseOptions, Option<ParseErrorCode>)] = &[
        (
            "/* unexpected end of comment",
            all(true, true),
            Some(ParseErrorCode::UnexpectedEndOfComment),
        ),
        (
            "\"unexpected end of string",
            all(true, true),
            Some(ParseErrorCode::UnexpectedEndOfString),
        ),
        (
            "2.",
            all(true, true),
            Some(ParseErrorCode::UnexpectedEndOfNumber),
        ),
        (
            r#""\u123""#,
            all(true, true),
            Some(ParseErrorCode::InvalidUnicode),
        ),
        (
            r#""\.""#,
            all(true, true),
            Some(ParseErrorCode::InvalidEscapeCharacter),
        ),
        (
            "\"\u{01}\"",
            all(true, true),
            Some(ParseErrorCode::InvalidCharacter),
        ),
        (
            r#"{"foo": "bar", /* this is a comment */}"#,
            all(true, true),
            None,
        ),
        // comments disabled
        (
            "// line comment",
            all(false, true),
            Some(ParseErrorCode::InvalidCommentToken),
        ),
        (
            "/* block comment */",
            all(false, true),
            Some(ParseErrorCode::InvalidCommentToken),
        ),
        (r#"{"foo": "bar",}"#, all(false, true), None),
        // trailing commas disabled
        (r#"{"foo": "bar"} // line comment"#, all(true, false), None),
        (
            r#"{"foo": "bar",}"#,
            all(true, false),
            Some(ParseErrorCode::ValueExpected),
        ),
    ];
    for (input, options, want) in cases {
        let mut visitor = LastError(None);
        assert!(walk(input, *options, &mut visitor), "walk {:?}", input);
        assert_eq!(visitor.0, *want, "last error of {:?}", input);
    }
}

#[test]
fn test_walk_totality() {
    assert!(!walk("", ParseOptions::default(), &mut LastError(None)));
    for input in ["  ", "\n", "}", "{,}]", "// only a comment"] {
        assert!(walk(input, ParseOptions::default(), &mut LastError(None)));
    }
}

#[test]
fn test_walk_deterministic_errors() {
    struct Collect(Vec<(ParseErrorCode, usize, usize)>);
    impl Visitor for Collect {
        fn on_error(&mut self, code: ParseErrorCode, offset: usize, length: usize) {
            self.0.push((code, offset, length));
        }
    }
    for input in ["{,}", "[ 1 2, 3]", r#"{ 8, "foo": 9 }"#, "\"a\\u12\" 2."] {
        let mut first = Collect(Vec::new());
        let mut second = Collect(Vec::new());
        walk(input, ParseOptions::default(), &mut first);
        walk(input, ParseOptions::default(), &mut second);
        assert_eq!(first.0, second.0, "errors of {:?}", input);
        let mut offsets: Vec<usize> = first.0.iter().map(|e| e.1).collect();
        let sorted = {
            let mut s = offsets.clone();
            s.sort_unstable();
            s
        };
        assert_eq!(offsets.drain(..).collect::<Vec<_>>(), sorted);
    }
}

fn check(tree: &Tree, id: NodeId, kind: NodeKind, offset: usize, length: usize) {
    let node = tree.node(id);
    assert_eq!(
        (node.kind, node.offset, node.length),
        (kind, offset, length)
    );
}

fn child(tree: &Tree, id: NodeId, index: usize) -> NodeId {
    tree.node(id).children[index]
}

#[test]
fn test_parse_tree_literals() {
    let cases: &[(&str, NodeKind, usize, Option<Scalar>)] = &[
        ("true", NodeKind::Boolean, 4, Some(Scalar::Bool(true))),
        ("false", NodeKind::Boolean, 5, Some(Scalar::Bool(false))),
        ("null", NodeKind::Null, 4, Some(Scalar::Null)),
        (
            "23",
            NodeKind::Number,
            2,
            Some(Scalar::Number("23".to_string())),
        ),
        (
            "-1.93e-19",
            NodeKind::Number,
            9,
            Some(Scalar::Number("-1.93e-19".to_string())),
        ),
        (
            r#""hello""#,
            NodeKind::String,
            7,
            Some(Scalar::String("hello".to_string())),
        ),
    ];
    for (input, kind, length, value) in cases {
        let (tree, errors) = parse_tree(input, all(false, false));
        assert!(errors.is_empty(), "{:?}: {:?}", input, errors);
        let root = tree.root().expect("root");
        check(&tree, root, *kind, 0, *length);
        assert_eq!(&tree.node(root).value, value, "value of {:?}", input);
    }
}

#[test]
fn test_parse_tree_arrays() {
    let (tree, errors) = parse_tree("[]", all(false, false));
    assert!(errors.is_empty());
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Array, 0, 2);
    assert!(tree.node(root).children.is_empty());

    let (tree, _) = parse_tree("[ 1 ]", all(false, false));
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Array, 0, 5);
    check(&tree, child(&tree, root, 0), NodeKind::Number, 2, 1);

    let (tree, _) = parse_tree(r#"[ 1,"x"]"#, all(false, false));
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Array, 0, 8);
    check(&tree, child(&tree, root, 0), NodeKind::Number, 2, 1);
    check(&tree, child(&tree, root, 1), NodeKind::String, 4, 3);

    let (tree, _) = parse_tree("[[]]", all(false, false));
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Array, 0, 4);
    check(&tree, child(&tree, root, 0), NodeKind::Array, 1, 2);
}

#[test]
fn test_parse_tree_objects() {
    let (tree, errors) = parse_tree("{ }", all(false, false));
    assert!(errors.is_empty());
    check(&tree, tree.root().unwrap(), NodeKind::Object, 0, 3);

    let (tree, errors) = parse_tree(r#"{ "val": 1 }"#, all(false, false));
    assert!(errors.is_empty());
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Object, 0, 12);
    let prop = child(&tree, root, 0);
    check(&tree, prop, NodeKind::Property, 2, 8);
    assert_eq!(tree.node(prop).colon_offset, Some(7));
    check(&tree, child(&tree, prop, 0), NodeKind::String, 2, 5);
    check(&tree, child(&tree, prop, 1), NodeKind::Number, 9, 1);
    assert_eq!(tree.node(child(&tree, prop, 1)).parent, Some(prop));

    let (tree, errors) = parse_tree(r#"{"id": "$", "v": [ null, null] }"#, all(false, false));
    assert!(errors.is_empty());
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Object, 0, 32);
    let first = child(&tree, root, 0);
    check(&tree, first, NodeKind::Property, 1, 9);
    assert_eq!(tree.node(first).colon_offset, Some(5));
    check(&tree, child(&tree, first, 0), NodeKind::String, 1, 4);
    check(&tree, child(&tree, first, 1), NodeKind::String, 7, 3);
    let second = child(&tree, root, 1);
    check(&tree, second, NodeKind::Property, 12, 18);
    assert_eq!(tree.node(second).colon_offset, Some(15));
    check(&tree, child(&tree, second, 0), NodeKind::String, 12, 3);
    let array = child(&tree, second, 1);
    check(&tree, array, NodeKind::Array, 17, 13);
    check(&tree, child(&tree, array, 0), NodeKind::Null, 19, 4);
    check(&tree, child(&tree, array, 1), NodeKind::Null, 25, 4);
}

#[test]
fn test_parse_tree_with_errors() {
    let (tree, errors) = parse_tree(r#"{  "id": { "foo": { } } , }"#, all(false, false));
    let codes: Vec<ParseErrorCode> = errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![
            ParseErrorCode::PropertyNameExpected,
            ParseErrorCode::ValueExpected
        ]
    );
    let root = tree.root().unwrap();
    check(&tree, root, NodeKind::Object, 0, 27);
    let prop = child(&tree, root, 0);
    check(&tree, prop, NodeKind::Property, 3, 20);
    assert_eq!(tree.node(prop).colon_offset, Some(7));
    check(&tree, child(&tree, prop, 0), NodeKind::String, 3, 4);
    let inner = child(&tree, prop, 1);
    check(&tree, inner, NodeKind::Object, 9, 14);
    let inner_prop = child(&tree, inner, 0);
    check(&tree, inner_prop, NodeKind::Property, 11, 10);
    assert_eq!(tree.node(inner_prop).colon_offset, Some(16));
    check(&tree, child(&tree, inner_prop, 0), NodeKind::String, 11, 5);
    check(&tree, child(&tree, inner_prop, 1), NodeKind::Object, 18, 3);
}

use jsonc::syntax::SyntaxKind::{self, *};
use jsonc::{ScanError, ScanOptions, Scanner};

fn kinds(input: &str) -> Vec<SyntaxKind> {
    Scanner::new(input, ScanOptions { trivia: true })
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_scan_kinds() {
    let cases: &[(&str, &[SyntaxKind])] = &[
        ("{", &[BRACE_START]),
        ("}", &[BRACE_END]),
        ("[", &[BRACKET_START]),
        ("]", &[BRACKET_END]),
        (":", &[COLON]),
        (",", &[COMMA]),
        // comments
        ("// this is a comment 你好", &[LINE_COMMENT]),
        ("// this is a comment 你好\n", &[LINE_COMMENT, NEWLINE]),
        ("/* this is a comment 你好*/", &[BLOCK_COMMENT]),
        ("/* this is a \r\ncomment 你好*/", &[BLOCK_COMMENT]),
        ("/* this is a \ncomment 你好*/", &[BLOCK_COMMENT]),
        // unexpected end
        ("/* this is a", &[BLOCK_COMMENT]),
        ("/* this is a \ncomment 你好", &[BLOCK_COMMENT]),
        // broken comment
        ("/ ttt", &[UNKNOWN, WHITESPACE, UNKNOWN]),
        // strings
        (r#""test""#, &[STRING]),
        (r#""\"""#, &[STRING]),
        (r#""\/""#, &[STRING]),
        (r#""\b""#, &[STRING]),
        (r#""\f""#, &[STRING]),
        (r#""\n""#, &[STRING]),
        (r#""\r""#, &[STRING]),
        (r#""\t""#, &[STRING]),
        (r#""\v""#, &[STRING]),
        ("\"\u{88ff}\"", &[STRING]),
        ("\"\u{200b}\u{2028}\"", &[STRING]),
        ("\"你好\"", &[STRING]),
        // unexpected end of string
        (r#""test"#, &[STRING]),
        ("\"test\n\"", &[STRING, NEWLINE, STRING]),
        // numbers
        ("0", &[NUMBER]),
        ("0.1", &[NUMBER]),
        ("-0.1", &[NUMBER]),
        ("-1", &[NUMBER]),
        ("1", &[NUMBER]),
        ("123456789", &[NUMBER]),
        ("10", &[NUMBER]),
        ("90", &[NUMBER]),
        ("90E+123", &[NUMBER]),
        ("90e+123", &[NUMBER]),
        ("90e-123", &[NUMBER]),
        ("90E-123", &[NUMBER]),
        ("90E123", &[NUMBER]),
        ("90e123", &[NUMBER]),
        // zero handling
        ("01", &[NUMBER, NUMBER]),
        ("-01", &[NUMBER, NUMBER]),
        // unexpected end of number
        ("-", &[UNKNOWN]),
        (".0", &[UNKNOWN]),
        // malformed input
        ("/", &[UNKNOWN]),
        // keywords
        ("true", &[TRUE]),
        ("false", &[FALSE]),
        ("null", &[NULL]),
        (
            "true false null",
            &[TRUE, WHITESPACE, FALSE, WHITESPACE, NULL],
        ),
        // invalid words
        ("nulllll", &[UNKNOWN]),
        ("True", &[UNKNOWN]),
        ("foo-bar", &[UNKNOWN]),
        ("foo bar", &[UNKNOWN, WHITESPACE, UNKNOWN]),
        // trivia
        (" ", &[WHITESPACE]),
        ("  \t  ", &[WHITESPACE]),
        ("  \t  \n  \t  ", &[WHITESPACE, NEWLINE, WHITESPACE]),
        ("\r\n", &[NEWLINE]),
        ("\r", &[NEWLINE]),
        ("\n", &[NEWLINE]),
        ("\n\r", &[NEWLINE, NEWLINE]),
        ("\n   \n", &[NEWLINE, WHITESPACE, NEWLINE]),
    ];
    for (input, want) in cases {
        assert_eq!(&kinds(input), want, "kinds of {:?}", input);
    }
}

#[test]
fn test_scan_errors() {
    let cases: &[(&str, SyntaxKind, ScanError)] = &[
        ("\"\t\"", STRING, ScanError::InvalidCharacter),
        ("\"\t \"", STRING, ScanError::InvalidCharacter),
        (r#""\u123""#, STRING, ScanError::InvalidUnicode),
        (r#""\.""#, STRING, ScanError::InvalidEscapeCharacter),
        (r#""test"#, STRING, ScanError::UnexpectedEndOfString),
        ("\"test\n", STRING, ScanError::UnexpectedEndOfString),
        ("2.", NUMBER, ScanError::UnexpectedEndOfNumber),
        ("1e", NUMBER, ScanError::UnexpectedEndOfNumber),
        ("/* open", BLOCK_COMMENT, ScanError::UnexpectedEndOfComment),
    ];
    for (input, kind, error) in cases {
        let mut scanner = Scanner::new(input, ScanOptions { trivia: true });
        assert_eq!(Scanner::scan(&mut scanner), *kind, "kind of {:?}", input);
        assert_eq!(scanner.token_error(), *error, "error of {:?}", input);
    }
}

#[test]
fn test_scan_values() {
    let cases: &[(&str, &str)] = &[
        (r#""test""#, "test"),
        (r#""\"-\\-\/""#, "\"-\\-/"),
        (r#""\b\f\n\r\t""#, "\u{0008}\u{000c}\n\r\t"),
        (r#""Ü""#, "Ü"),
        (r#""😀""#, "😀"),
        ("\"你好\"", "你好"),
        ("2.", "2."),
        ("1e", "1"),
        ("-1.93e-19", "-1.93e-19"),
    ];
    for (input, want) in cases {
        let mut scanner = Scanner::new(input, ScanOptions { trivia: true });
        Scanner::scan(&mut scanner);
        assert_eq!(scanner.token_value(), *want, "value of {:?}", input);
    }
}

#[test]
fn test_trivia_suppression() {
    let mut scanner = Scanner::new(" {\n // c\n } ", ScanOptions { trivia: false });
    let mut kinds = Vec::new();
    loop {
        match Scanner::scan(&mut scanner) {
            EOF => break,
            kind => kinds.push(kind),
        }
    }
    assert_eq!(kinds, vec![BRACE_START, LINE_COMMENT, BRACE_END]);
}

// Concatenating all token texts reproduces the source, offsets strictly
// increase, and every token is at least one byte long.
#[test]
fn test_token_coverage() {
    let sources = [
        "{ \"a\": [1, 2.5e3, true], \"b\": null } // tail",
        "/* block */ [\"x\", \"broken",
        "{,}] foo-bar .0 - / \t\r\n 01",
        "  \t  \n  \t  ",
        "\"a\\u123\" 2. {\"你好\": -0}",
    ];
    for source in sources {
        let mut rebuilt = String::new();
        let mut last_offset = None;
        for token in Scanner::new(source, ScanOptions { trivia: true }) {
            assert!(token.length >= 1, "{:?} in {:?}", token, source);
            if let Some(last) = last_offset {
                assert!(token.offset > last, "{:?} in {:?}", token, source);
            }
            last_offset = Some(token.offset);
            rebuilt.push_str(&source[token.offset..token.offset + token.length]);
        }
        assert_eq!(rebuilt, source);
    }
}

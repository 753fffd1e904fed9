//! Integration tests for the HTML tokenizer.

use thicket_html::{Attribute, HTMLTokenizer, Scanner, Token, TokenizerState, tokenize};

/// Helper to tokenize input fed in several chunks.
fn tokenize_chunks(chunks: &[&str]) -> Vec<Token> {
    let mut input = Scanner::new();
    let mut tokenizer = HTMLTokenizer::new();
    let mut tokens = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        input.push_chunk(chunk, index + 1 == chunks.len());
        while let Some(token) = tokenizer.next_token(&mut input) {
            tokens.push(token);
        }
    }
    coalesce(tokens)
}

/// Merge adjacent text tokens. Text is handed out whenever input runs dry,
/// so chunking may split one run into several tokens.
fn coalesce(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::new();
    for token in tokens {
        if let (Some(Token::Text { data: previous }), Token::Text { data }) = (merged.last_mut(), &token) {
            previous.push_str(data);
            continue;
        }
        merged.push(token);
    }
    merged
}

/// Helper to tokenize starting from a given state, as the tree builder
/// does for `<title>` or `<script>`.
fn tokenize_in(state: TokenizerState, last_start_tag: &str, text: &str) -> Vec<Token> {
    let mut input = Scanner::new();
    input.push_chunk(&format!("<{last_start_tag}>{text}"), true);
    let mut tokenizer = HTMLTokenizer::new();
    let mut tokens = Vec::new();
    if let Some(token) = tokenizer.next_token(&mut input) {
        tokens.push(token);
    }
    tokenizer.set_state(state);
    while let Some(token) = tokenizer.next_token(&mut input) {
        tokens.push(token);
    }
    tokens
}

fn text(data: &str) -> Token {
    Token::Text {
        data: data.to_string(),
    }
}

fn start_tag(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> Token {
    Token::StartTag {
        name: name.to_string(),
        self_closing,
        attributes: attributes
            .iter()
            .map(|(name, value)| Attribute::new(name, value))
            .collect(),
    }
}

fn end_tag(name: &str) -> Token {
    Token::EndTag {
        name: name.to_string(),
        self_closing: false,
        attributes: Vec::new(),
    }
}

#[test]
fn test_plain_text_is_one_token() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens, vec![text("Hello"), Token::EndOfFile]);
}

#[test]
fn test_empty_input() {
    assert_eq!(tokenize(""), vec![Token::EndOfFile]);
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert!(public_identifier.is_none());
            assert!(system_identifier.is_none());
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_with_identifiers() {
    let tokens = tokenize(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01//EN" 'http://www.w3.org/TR/html4/strict.dtd'>"#,
    );
    match &tokens[0] {
        Token::Doctype {
            name,
            public_identifier,
            system_identifier,
            force_quirks,
        } => {
            assert_eq!(name.as_deref(), Some("html"));
            assert_eq!(public_identifier.as_deref(), Some("-//W3C//DTD HTML 4.01//EN"));
            assert_eq!(
                system_identifier.as_deref(),
                Some("http://www.w3.org/TR/html4/strict.dtd")
            );
            assert!(!force_quirks);
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let tokens = tokenize("<!DOCTYPE>");
    assert!(matches!(
        &tokens[0],
        Token::Doctype {
            name: None,
            force_quirks: true,
            ..
        }
    ));
}

#[test]
fn test_start_and_end_tags() {
    let tokens = tokenize("<div>x</div>");
    assert_eq!(
        tokens,
        vec![
            start_tag("div", &[], false),
            text("x"),
            end_tag("div"),
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_tag_names_are_lowercased() {
    let tokens = tokenize("<DiV></DIV>");
    assert_eq!(tokens[0], start_tag("div", &[], false));
    assert_eq!(tokens[1], end_tag("div"));
}

#[test]
fn test_attributes() {
    let tokens = tokenize(r#"<a href="x" title='y' data-z=w checked>"#);
    assert_eq!(
        tokens[0],
        start_tag(
            "a",
            &[("href", "x"), ("title", "y"), ("data-z", "w"), ("checked", "")],
            false
        )
    );
}

#[test]
fn test_duplicate_attribute_is_dropped() {
    let mut input = Scanner::new();
    input.push_chunk(r#"<p id="a" ID="b">"#, true);
    let mut tokenizer = HTMLTokenizer::new();
    let token = tokenizer.next_token(&mut input);
    assert_eq!(token, Some(start_tag("p", &[("id", "a")], false)));
    let errors = tokenizer.take_errors();
    assert!(errors.iter().any(|e| e.message == "duplicate-attribute"));
}

#[test]
fn test_self_closing_flag() {
    let tokens = tokenize("<br/>");
    assert_eq!(tokens[0], start_tag("br", &[], true));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hello ".to_string()
        }
    );
}

#[test]
fn test_bogus_comment_from_question_mark() {
    let tokens = tokenize("<?xml version='1.0'?>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "?xml version='1.0'?".to_string()
        }
    );
}

#[test]
fn test_cdata_outside_foreign_content_is_a_comment() {
    let tokens = tokenize("<![CDATA[x]]>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[CDATA[x]]".to_string()
        }
    );
}

#[test]
fn test_cdata_section_when_allowed() {
    let mut input = Scanner::new();
    input.push_chunk("<![CDATA[a<b]]>c", true);
    let mut tokenizer = HTMLTokenizer::new();
    tokenizer.set_allow_cdata(true);
    let tokens: Vec<Token> = std::iter::from_fn(|| tokenizer.next_token(&mut input)).collect();
    assert_eq!(tokens, vec![text("a<bc"), Token::EndOfFile]);
}

#[test]
fn test_stray_less_than_is_text() {
    let tokens = tokenize("a < b");
    assert_eq!(tokens, vec![text("a < b"), Token::EndOfFile]);
}

#[test]
fn test_named_character_reference() {
    let tokens = tokenize("&lt;p&gt; &amp;&copy;");
    assert_eq!(tokens[0], text("<p> &\u{A9}"));
}

#[test]
fn test_legacy_reference_without_semicolon() {
    let tokens = tokenize("&notit;");
    assert_eq!(tokens[0], text("\u{AC}it;"));
}

#[test]
fn test_legacy_reference_in_attribute_is_not_expanded() {
    let tokens = tokenize(r#"<a href="?a=1&copy=2">"#);
    assert_eq!(tokens[0], start_tag("a", &[("href", "?a=1&copy=2")], false));
}

#[test]
fn test_numeric_character_references() {
    let tokens = tokenize("&#65;&#x42;&#X43;");
    assert_eq!(tokens[0], text("ABC"));
}

#[test]
fn test_numeric_reference_windows_1252_remap() {
    let tokens = tokenize("&#128;");
    assert_eq!(tokens[0], text("\u{20AC}"));
}

/// Tokenize `input` as one final chunk, returning the first token and the
/// error codes reported with it.
fn first_token_with_errors(input_text: &str) -> (Option<Token>, Vec<String>) {
    let mut input = Scanner::new();
    input.push_chunk(input_text, true);
    let mut tokenizer = HTMLTokenizer::new();
    let token = tokenizer.next_token(&mut input);
    let errors = tokenizer
        .take_errors()
        .into_iter()
        .map(|issue| issue.message)
        .collect();
    (token, errors)
}

#[test]
fn test_surrogate_reference_is_replaced() {
    let (token, errors) = first_token_with_errors("&#xD800;");
    assert_eq!(token, Some(text("\u{FFFD}")));
    assert!(errors.iter().any(|e| e == "surrogate-character-reference"), "{errors:?}");
}

#[test]
fn test_out_of_range_references_are_replaced() {
    let (token, errors) = first_token_with_errors("&#x110000;");
    assert_eq!(token, Some(text("\u{FFFD}")));
    assert!(
        errors.iter().any(|e| e == "character-reference-outside-unicode-range"),
        "{errors:?}"
    );

    // Digits far past the range must not overflow.
    let (token, _) = first_token_with_errors("&#99999999999999999999;x");
    assert_eq!(token, Some(text("\u{FFFD}x")));
}

#[test]
fn test_largest_code_point_reference_is_kept() {
    let tokens = tokenize("&#x10FFFF;");
    assert_eq!(tokens[0], text("\u{10FFFF}"));
}

#[test]
fn test_tokenizer_finishes_after_end_of_file() {
    let mut input = Scanner::new();
    input.push_chunk("<p>", false);
    let mut tokenizer = HTMLTokenizer::new();
    while tokenizer.next_token(&mut input).is_some() {}
    assert!(!tokenizer.is_finished());

    input.push_chunk("x", true);
    let rest: Vec<Token> = std::iter::from_fn(|| tokenizer.next_token(&mut input)).collect();
    assert_eq!(rest.last(), Some(&Token::EndOfFile));
    assert!(tokenizer.is_finished());
}

#[test]
fn test_null_character_reference_is_replaced() {
    let mut input = Scanner::new();
    input.push_chunk("&#0;", true);
    let mut tokenizer = HTMLTokenizer::new();
    assert_eq!(tokenizer.next_token(&mut input), Some(text("\u{FFFD}")));
    let errors = tokenizer.take_errors();
    assert!(errors.iter().any(|e| e.message == "null-character-reference"));
}

#[test]
fn test_unknown_named_reference_is_left_alone() {
    let tokens = tokenize("&bogus;");
    assert_eq!(tokens[0], text("&bogus;"));
}

#[test]
fn test_crlf_is_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(tokens[0], text("a\nb\nc"));
}

#[test]
fn test_rcdata_keeps_markup_as_text() {
    let tokens = tokenize_in(TokenizerState::RCDATA, "title", "<b>&amp;</b></title>");
    assert_eq!(
        tokens,
        vec![
            start_tag("title", &[], false),
            text("<b>&</b>"),
            end_tag("title"),
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_rawtext_does_not_expand_references() {
    let tokens = tokenize_in(TokenizerState::RAWTEXT, "style", "a&amp;b</style>");
    assert_eq!(tokens[1], text("a&amp;b"));
    assert_eq!(tokens[2], end_tag("style"));
}

#[test]
fn test_inappropriate_end_tag_in_rawtext_is_text() {
    let tokens = tokenize_in(TokenizerState::RAWTEXT, "style", "</div></style>");
    assert_eq!(tokens[1], text("</div>"));
    assert_eq!(tokens[2], end_tag("style"));
}

#[test]
fn test_script_data_escaped_comment() {
    let tokens = tokenize_in(
        TokenizerState::ScriptData,
        "script",
        "<!--<script></script>--></script>",
    );
    assert_eq!(tokens[1], text("<!--<script></script>-->"));
    assert_eq!(tokens[2], end_tag("script"));
}

#[test]
fn test_plaintext_consumes_everything() {
    let tokens = tokenize_in(TokenizerState::PLAINTEXT, "plaintext", "</plaintext><b>");
    assert_eq!(tokens[1], text("</plaintext><b>"));
    assert_eq!(tokens[2], Token::EndOfFile);
}

#[test]
fn test_eof_in_tag_drops_the_tag() {
    let tokens = tokenize("<div class=");
    assert_eq!(tokens, vec![Token::EndOfFile]);
}

#[test]
fn test_eof_in_comment_emits_comment() {
    let tokens = tokenize("<!-- open");
    assert_eq!(
        tokens,
        vec![
            Token::Comment {
                data: " open".to_string()
            },
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_chunk_boundary_inside_tag() {
    assert_eq!(tokenize_chunks(&["<di", "v>"]), tokenize("<div>"));
}

#[test]
fn test_chunk_boundary_inside_reference() {
    assert_eq!(tokenize_chunks(&["&am", "p;x"]), tokenize("&amp;x"));
}

#[test]
fn test_chunk_boundary_between_cr_and_lf() {
    assert_eq!(tokenize_chunks(&["a\r", "\nb"]), tokenize("a\nb"));
}

#[test]
fn test_chunk_boundary_inside_doctype() {
    assert_eq!(
        tokenize_chunks(&["<!DOC", "TYPE ht", "ml>"]),
        tokenize("<!DOCTYPE html>")
    );
}

#[test]
fn test_no_tokens_before_final_chunk_ends_a_tag() {
    let mut input = Scanner::new();
    let mut tokenizer = HTMLTokenizer::new();
    input.push_chunk("<a href='x", false);
    assert_eq!(tokenizer.next_token(&mut input), None);
    assert!(!tokenizer.is_finished());
    input.push_chunk("'>", true);
    assert_eq!(
        tokenizer.next_token(&mut input),
        Some(start_tag("a", &[("href", "x")], false))
    );
    assert_eq!(tokenizer.next_token(&mut input), Some(Token::EndOfFile));
    assert!(tokenizer.is_finished());
}

#[test]
fn test_null_in_data_is_an_error() {
    let mut input = Scanner::new();
    input.push_chunk("a\0b", true);
    let mut tokenizer = HTMLTokenizer::new();
    let _ = tokenizer.next_token(&mut input);
    let errors = tokenizer.take_errors();
    assert!(errors.iter().any(|e| e.message == "unexpected-null-character"));
}

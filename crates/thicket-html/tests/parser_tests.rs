//! Integration tests for the HTML parser.

use quickcheck_macros::quickcheck;
use thicket_dom::{Document, HtmlTag, Namespace, NodeId, QuirksMode};
use thicket_html::{
    FragmentContext, Parser, ParserOptions, ScriptHost, format_tree, parse_document,
    parse_fragment, set_inner_html,
};

/// Helper to parse a complete document.
fn parse(html: &str) -> Document {
    parse_document(html, ParserOptions::new())
}

/// Helper to render a document in the html5lib tree format.
fn tree(html: &str) -> String {
    let document = parse(html);
    format_tree(&document, document.root())
}

/// Helper to serialize the body of a parsed document.
fn body_html(html: &str) -> String {
    let document = parse(html);
    let body = document.body().expect("document has a body");
    document.inner_html(body)
}

/// Helper to parse a document in chunks.
fn parse_chunks(chunks: &[&str]) -> Document {
    let mut parser = Parser::new("about:blank", None, ParserOptions::new());
    for (index, chunk) in chunks.iter().enumerate() {
        parser.parse(chunk, index + 1 == chunks.len());
    }
    assert!(parser.is_finished());
    parser.into_document()
}

fn first_element(document: &Document, name: &str) -> NodeId {
    document
        .get_elements_by_tag_name(document.root(), name)
        .first()
        .copied()
        .unwrap_or_else(|| panic!("no <{name}> element"))
}

// ========== Document structure ==========

#[test]
fn test_document_structure() {
    assert_eq!(
        tree("<!DOCTYPE html><html><head></head><body></body></html>"),
        "| <!DOCTYPE html>\n| <html>\n|   <head>\n|   <body>\n"
    );
}

#[test]
fn test_implied_html_head_and_body() {
    assert_eq!(
        tree("Hello"),
        "| <html>\n|   <head>\n|   <body>\n|     \"Hello\"\n"
    );
}

#[test]
fn test_head_elements_stay_in_head() {
    let document = parse("<!DOCTYPE html><title>A &amp; B</title><meta charset=utf-8><p>x");
    let head = document.head().expect("head");
    assert_eq!(
        document.inner_html(head),
        "<title>A &amp; B</title><meta charset=\"utf-8\">"
    );
    assert_eq!(document.title(), "A & B");
}

#[test]
fn test_comments_before_and_after_html() {
    assert_eq!(
        tree("<!--a--><html></html><!--b-->"),
        "| <!-- a -->\n| <html>\n|   <head>\n|   <body>\n| <!-- b -->\n"
    );
}

#[test]
fn test_text_runs_merge_into_one_node() {
    let document = parse("a&amp;b");
    let body = document.body().expect("body");
    assert_eq!(document.children(body).len(), 1);
    assert_eq!(document.text_content(body).as_deref(), Some("a&b"));
}

#[test]
fn test_stray_html_attributes_are_merged() {
    let document = parse("<html lang=en><body><html lang=fr dir=rtl>");
    let html = document.document_element().expect("html");
    assert_eq!(document.get_attribute(html, "lang"), Some("en"));
    assert_eq!(document.get_attribute(html, "dir"), Some("rtl"));
}

// ========== Quirks mode ==========

#[test]
fn test_html5_doctype_is_no_quirks() {
    assert_eq!(parse("<!DOCTYPE html>").quirks_mode(), QuirksMode::NoQuirks);
}

#[test]
fn test_missing_doctype_is_quirks() {
    assert_eq!(parse("<p>x").quirks_mode(), QuirksMode::Quirks);
}

#[test]
fn test_transitional_doctype_without_system_id_is_quirks() {
    let document = parse(r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#);
    assert_eq!(document.quirks_mode(), QuirksMode::Quirks);
}

#[test]
fn test_transitional_doctype_with_system_id_is_limited_quirks() {
    let document = parse(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#,
    );
    assert_eq!(document.quirks_mode(), QuirksMode::LimitedQuirks);
}

#[test]
fn test_xhtml_transitional_is_limited_quirks() {
    let document = parse(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#,
    );
    assert_eq!(document.quirks_mode(), QuirksMode::LimitedQuirks);
}

#[test]
fn test_p_does_not_close_table_in_quirks_mode() {
    assert_eq!(body_html("<p><table></table>"), "<p><table></table></p>");
    assert_eq!(
        body_html("<!DOCTYPE html><p><table></table>"),
        "<p></p><table></table>"
    );
}

// ========== Implied end tags ==========

#[test]
fn test_paragraphs_close_each_other() {
    assert_eq!(body_html("<p>a<p>b"), "<p>a</p><p>b</p>");
}

#[test]
fn test_list_items_close_each_other() {
    assert_eq!(
        body_html("<ul><li>a<li>b</ul>"),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn test_options_close_each_other() {
    assert_eq!(
        body_html("<select><option>a<option>b</select>"),
        "<select><option>a</option><option>b</option></select>"
    );
}

#[test]
fn test_nested_headings() {
    assert_eq!(body_html("<h1><h2>x</h2></h1>"), "<h1></h1><h2>x</h2>");
}

#[test]
fn test_stray_end_tag_is_ignored() {
    assert_eq!(body_html("<div>a</span>b</div>"), "<div>ab</div>");
}

#[test]
fn test_end_br_becomes_start_br() {
    assert_eq!(body_html("a</br>b"), "a<br>b");
}

#[test]
fn test_pre_drops_leading_newline() {
    let document = parse("<pre>\nx</pre>");
    let pre = first_element(&document, "pre");
    assert_eq!(document.text_content(pre).as_deref(), Some("x"));
}

#[test]
fn test_textarea_drops_only_first_newline() {
    let document = parse("<textarea>\n\n<b>x</textarea>");
    let textarea = first_element(&document, "textarea");
    assert_eq!(document.text_content(textarea).as_deref(), Some("\n<b>x"));
}

#[test]
fn test_second_form_is_ignored() {
    assert_eq!(
        body_html("<form><form><input></form>"),
        "<form><input></form>"
    );
}

#[test]
fn test_image_becomes_img() {
    assert_eq!(body_html("<image src=a>"), "<img src=\"a\">");
}

// ========== Adoption agency ==========

#[test]
fn test_adoption_agency_misnested_inline() {
    assert_eq!(
        body_html("<p>1<b>2<i>3</b>4</i>5</p>"),
        "<p>1<b>2<i>3</i></b><i>4</i>5</p>"
    );
}

#[test]
fn test_adoption_agency_formatting_across_block() {
    assert_eq!(body_html("<b>1<p>2</b>3</p>"), "<b>1</b><p><b>2</b>3</p>");
}

#[test]
fn test_nested_anchor_closes_outer() {
    assert_eq!(
        body_html("<a href=1>x<a href=2>y</a>"),
        "<a href=\"1\">x</a><a href=\"2\">y</a>"
    );
}

#[test]
fn test_formatting_is_reconstructed_in_next_block() {
    assert_eq!(
        body_html("<p><b>x<p>y"),
        "<p><b>x</b></p><p><b>y</b></p>"
    );
}

// ========== Tables ==========

#[test]
fn test_table_gets_implied_tbody() {
    assert_eq!(
        body_html("<table><tr><td>a</td></tr></table>"),
        "<table><tbody><tr><td>a</td></tr></tbody></table>"
    );
}

#[test]
fn test_foster_parenting_text() {
    assert_eq!(body_html("<table>x</table>"), "x<table></table>");
}

#[test]
fn test_foster_parenting_element() {
    assert_eq!(
        body_html("<table><div>x</div><tr><td>y</td></tr></table>"),
        "<div>x</div><table><tbody><tr><td>y</td></tr></tbody></table>"
    );
}

#[test]
fn test_whitespace_stays_in_table() {
    assert_eq!(
        body_html("<table> <tr></tr></table>"),
        "<table> <tbody><tr></tr></tbody></table>"
    );
}

#[test]
fn test_cell_closes_previous_cell() {
    assert_eq!(
        body_html("<table><td>a<td>b</table>"),
        "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>"
    );
}

#[test]
fn test_caption_and_colgroup() {
    assert_eq!(
        body_html("<table><caption>c</caption><col><tr><td>x</table>"),
        "<table><caption>c</caption><colgroup><col></colgroup><tbody><tr><td>x</td></tr></tbody></table>"
    );
}

#[test]
fn test_hidden_input_stays_in_table() {
    assert_eq!(
        body_html("<table><input type=hidden></table>"),
        "<table><input type=\"hidden\"></table>"
    );
}

#[test]
fn test_select_in_table_closed_by_cell() {
    assert_eq!(
        body_html("<table><tr><td><select><option>a<td>b</table>"),
        "<table><tbody><tr><td><select><option>a</option></select></td><td>b</td></tr></tbody></table>"
    );
}

#[test]
fn test_select_in_table_closed_by_table_end() {
    assert_eq!(
        body_html("<table><tr><td><select><option>a</table>b"),
        "<table><tbody><tr><td><select><option>a</option></select></td></tr></tbody></table>b"
    );
}

#[test]
fn test_select_in_table_ignores_unmatched_end_tag() {
    assert_eq!(
        body_html("<table><tr><td><select></th><option>a</select>b</table>"),
        "<table><tbody><tr><td><select><option>a</option></select>b</td></tr></tbody></table>"
    );
}

// ========== Framesets ==========

#[test]
fn test_frameset_document() {
    assert_eq!(
        tree("<!DOCTYPE html><frameset><frame src=a>x<frame></frameset>"),
        "| <!DOCTYPE html>\n| <html>\n|   <head>\n|   <frameset>\n|     <frame>\n|       src=\"a\"\n|     <frame>\n"
    );
}

#[test]
fn test_after_frameset_and_after_after_frameset() {
    assert_eq!(
        tree("<frameset></frameset> <!--a--></html><!--b--><noframes>n</noframes>"),
        "| <html>\n|   <head>\n|   <frameset>\n|   \" \"\n|   <!-- a -->\n|   <noframes>\n|     \"n\"\n| <!-- b -->\n"
    );
}

#[test]
fn test_frameset_ignored_once_body_has_content() {
    assert_eq!(body_html("<p>x</p><frameset><frame>"), "<p>x</p>");
}

// ========== Templates ==========

#[test]
fn test_template_contents() {
    assert_eq!(
        tree("<template><td>x</td></template>"),
        "| <html>\n|   <head>\n|     <template>\n|       content\n|         <td>\n|           \"x\"\n|   <body>\n"
    );
}

#[test]
fn test_template_serializes_contents() {
    let document = parse("<body><template><b>x</b></template>");
    let template = first_element(&document, "template");
    assert!(document.children(template).is_empty());
    assert_eq!(document.inner_html(template), "<b>x</b>");
}

// ========== Foreign content ==========

#[test]
fn test_self_closing_svg_has_no_children() {
    assert_eq!(
        tree("<svg/>"),
        "| <html>\n|   <head>\n|   <body>\n|     <svg svg>\n"
    );
}

#[test]
fn test_svg_names_are_adjusted() {
    assert_eq!(
        tree(r#"<svg viewbox="0 0 1 1"><foreignobject><p>x</p></foreignobject></svg>"#),
        concat!(
            "| <html>\n",
            "|   <head>\n",
            "|   <body>\n",
            "|     <svg svg>\n",
            "|       viewBox=\"0 0 1 1\"\n",
            "|       <svg foreignObject>\n",
            "|         <p>\n",
            "|           \"x\"\n",
        )
    );
}

#[test]
fn test_xlink_attribute_gets_namespace() {
    assert_eq!(
        tree(r##"<svg><a xlink:href="#x"></a></svg>"##),
        concat!(
            "| <html>\n",
            "|   <head>\n",
            "|   <body>\n",
            "|     <svg svg>\n",
            "|       <svg a>\n",
            "|         xlink href=\"#x\"\n",
        )
    );
}

#[test]
fn test_mathml_elements() {
    assert_eq!(
        tree("<math><mi>x</mi></math>"),
        "| <html>\n|   <head>\n|   <body>\n|     <math math>\n|       <math mi>\n|         \"x\"\n"
    );
}

#[test]
fn test_html_breaks_out_of_svg() {
    assert_eq!(body_html("<svg><p>x"), "<svg></svg><p>x</p>");
}

#[test]
fn test_cdata_in_svg_is_text() {
    assert_eq!(
        body_html("<svg><![CDATA[a<b]]></svg>"),
        "<svg>a&lt;b</svg>"
    );
}

// ========== Incremental input ==========

#[test]
fn test_chunk_split_inside_tag() {
    let document = parse_chunks(&["<di", "v>"]);
    let whole = parse("<div>");
    assert_eq!(
        format_tree(&document, document.root()),
        format_tree(&whole, whole.root())
    );
}

#[test]
fn test_chunk_split_inside_reference_and_crlf() {
    let document = parse_chunks(&["<p>a &am", "p; b\r", "\nc"]);
    let body = document.body().expect("body");
    assert_eq!(document.text_content(body).as_deref(), Some("a & b\nc"));
}

#[test]
fn test_document_is_incomplete_until_final_chunk() {
    let mut parser = Parser::new("about:blank", None, ParserOptions::new());
    parser.parse("<p>one", false);
    assert!(!parser.is_finished());
    parser.parse("", true);
    assert!(parser.is_finished());
}

#[test]
fn test_leading_byte_order_mark_is_skipped() {
    let document = parse("\u{FEFF}<!DOCTYPE html><p>x");
    assert_eq!(document.quirks_mode(), QuirksMode::NoQuirks);
    let body = document.body().expect("body");
    assert_eq!(document.inner_html(body), "<p>x</p>");
}

#[test]
fn test_byte_order_mark_after_first_chunk_is_text() {
    let document = parse_chunks(&["\u{FEFF}", "\u{FEFF}x"]);
    let body = document.body().expect("body");
    assert_eq!(document.text_content(body).as_deref(), Some("\u{FEFF}x"));
}

#[test]
fn test_interrupted_text_run_stays_one_node() {
    let document = parse(&"abcdefghij</x>".repeat(20_000));
    let body = document.body().expect("body");
    let children = document.children(body);
    assert_eq!(children.len(), 1);
    assert_eq!(document.as_text(children[0]).map(str::len), Some(200_000));
}

#[test]
fn test_deeply_nested_elements() {
    let depth = 5_000;
    let document = parse(&format!("{}x", "<div>".repeat(depth)));
    let mut current = document.body().expect("body");
    for _ in 0..depth {
        current = document.children(current)[0];
        assert!(document.is_html_element(current, HtmlTag::Div));
    }
    assert_eq!(document.text_content(current).as_deref(), Some("x"));
}

const CHUNKED_DOCUMENT: &str = "<!DOCTYPE html>\r\n<html><head><title>A &amp; B</title></head>\
<body><p class=\"x\">one &copy; two<table><tr><td>cell</table><!-- note -->\
<pre>\r\nline</pre><b>bold<i>both</b>italic</i><svg><rect/></svg></body></html>";

#[quickcheck]
fn prop_chunk_split_does_not_change_tree(split: usize) -> bool {
    let at = split % (CHUNKED_DOCUMENT.len() + 1);
    let (head, tail) = CHUNKED_DOCUMENT.split_at(at);
    let chunked = parse_chunks(&[head, tail]);
    let whole = parse(CHUNKED_DOCUMENT);
    format_tree(&chunked, chunked.root()) == format_tree(&whole, whole.root())
}

// ========== Round trip ==========

#[test]
fn test_serialize_then_reparse_is_equal() {
    let source = "<!DOCTYPE html><html lang=\"en\"><head><title>t</title></head>\
<body><div id=\"main\"><p>a &lt; b</p><ul><li>x</li></ul><br><!--c--></div></body></html>";
    let first = parse(source);
    let second = parse(&first.to_html());
    assert!(first.is_equal_node(first.root(), &second, second.root()));
}

/// Pieces the round-trip property assembles documents from. Tables and
/// foreign content are left out: foster parenting and namespace breakout
/// do not survive serialization.
const ROUND_TRIP_PIECES: &[&str] = &[
    "<p>",
    "</p>",
    "<b>",
    "</b>",
    "<i>",
    "</i>",
    "<em>",
    "</em>",
    "<div class=\"a\">",
    "</div>",
    "<span title='x&quot;y'>",
    "</span>",
    "<ul><li>",
    "<li>",
    "</ul>",
    "<h1>",
    "</h1>",
    "<br>",
    "<!--c-->",
    "text",
    " ",
    "&amp; &lt;",
];

#[quickcheck]
fn prop_serialize_then_reparse_is_equal(picks: Vec<u8>) -> bool {
    let mut source = String::from("<!DOCTYPE html><body>");
    for pick in picks {
        source.push_str(ROUND_TRIP_PIECES[usize::from(pick) % ROUND_TRIP_PIECES.len()]);
    }
    let first = parse(&source);
    let second = parse(&first.to_html());
    first.is_equal_node(first.root(), &second, second.root())
}

// ========== Parse issues ==========

#[test]
fn test_well_formed_document_has_no_issues() {
    let mut parser = Parser::new("about:blank", None, ParserOptions::new());
    parser.parse("<!DOCTYPE html><title>t</title><p>ok</p>", true);
    assert!(parser.issues().is_empty(), "{:?}", parser.issues());
}

#[test]
fn test_issues_are_recorded() {
    let mut parser = Parser::new("about:blank", None, ParserOptions::new());
    parser.parse("<!DOCTYPE html><p></div>\0", true);
    assert!(!parser.issues().is_empty());
}

// ========== Scripting ==========

#[test]
fn test_noscript_is_raw_text_when_scripting() {
    let options = ParserOptions::new().with_scripting(true);
    let document = parse_document("<body><noscript><p>x</p></noscript>", options);
    let noscript = first_element(&document, "noscript");
    assert_eq!(document.children(noscript).len(), 1);
    assert_eq!(document.text_content(noscript).as_deref(), Some("<p>x</p>"));
}

#[test]
fn test_noscript_is_markup_without_scripting() {
    assert_eq!(
        body_html("<noscript><p>x</p></noscript>"),
        "<noscript><p>x</p></noscript>"
    );
}

/// Writes `<p>written</p>` for a script whose text is `write`, and another
/// script for one whose text is `nest`.
struct WritingHost;

impl ScriptHost for WritingHost {
    fn execute(&mut self, document: &mut Document, script: NodeId) -> Vec<String> {
        match document.text_content(script).as_deref() {
            Some("write") => vec!["<p>writ".to_string(), "ten</p>".to_string()],
            Some("nest") => vec!["<script>write</script>".to_string()],
            _ => Vec::new(),
        }
    }
}

#[test]
fn test_script_output_is_parsed_at_insertion_point() {
    let mut parser = Parser::new("about:blank", None, ParserOptions::new())
        .with_script_host(Box::new(WritingHost));
    parser.parse("<body><script>write</script><div>after</div>", true);
    let document = parser.into_document();
    let body = document.body().expect("body");
    assert_eq!(
        document.inner_html(body),
        "<script>write</script><p>written</p><div>after</div>"
    );
}

#[test]
fn test_nested_script_output() {
    let mut parser = Parser::new("about:blank", None, ParserOptions::new())
        .with_script_host(Box::new(WritingHost));
    parser.parse("<body><script>nest</script>", false);
    parser.parse("<i>end</i>", true);
    let document = parser.into_document();
    let body = document.body().expect("body");
    assert_eq!(
        document.inner_html(body),
        "<script>nest</script><script>write</script><p>written</p><i>end</i>"
    );
}

#[test]
fn test_scripts_do_not_run_without_host() {
    assert_eq!(
        body_html("<script>write</script>x"),
        "x"
    );
}

// ========== Fragments ==========

#[test]
fn test_fragment_in_div() {
    let (document, children) = parse_fragment(
        FragmentContext::html("div"),
        "<p>a<p>b",
        ParserOptions::new(),
    );
    assert_eq!(children.len(), 2);
    assert_eq!(document.outer_html(children[0]), "<p>a</p>");
    assert_eq!(document.outer_html(children[1]), "<p>b</p>");
}

#[test]
fn test_fragment_in_table_row() {
    let (document, children) = parse_fragment(
        FragmentContext::html("tr"),
        "<td>a</td><td>b",
        ParserOptions::new(),
    );
    let html: Vec<String> = children
        .iter()
        .map(|&child| document.outer_html(child))
        .collect();
    assert_eq!(html, ["<td>a</td>", "<td>b</td>"]);
}

#[test]
fn test_fragment_in_title_is_text() {
    let (document, children) = parse_fragment(
        FragmentContext::html("title"),
        "<b>x</b>",
        ParserOptions::new(),
    );
    assert_eq!(children.len(), 1);
    assert_eq!(document.as_text(children[0]), Some("<b>x</b>"));
}

#[test]
fn test_fragment_in_svg_context() {
    let (document, children) = parse_fragment(
        FragmentContext::new("svg", Namespace::Svg),
        "<circle/>",
        ParserOptions::new(),
    );
    assert_eq!(children.len(), 1);
    let circle = document.as_element(children[0]).expect("element");
    assert_eq!(*circle.namespace(), Namespace::Svg);
}

#[test]
fn test_fragment_scripts_are_not_run() {
    let mut parser = Parser::new(
        "about:blank",
        Some(FragmentContext::html("div")),
        ParserOptions::new(),
    )
    .with_script_host(Box::new(WritingHost));
    parser.parse("<script>write</script>", true);
    assert_eq!(parser.fragment_children().len(), 1);
}

#[test]
fn test_set_inner_html_replaces_children() {
    let mut document = parse("<div id=target><span>old</span></div>");
    let div = document.get_element_by_id("target").expect("div");
    set_inner_html(&mut document, div, "<b id=new>new</b>", ParserOptions::new())
        .expect("element context");
    assert_eq!(document.inner_html(div), "<b id=\"new\">new</b>");
    assert!(document.get_element_by_id("new").is_some());
}

#[test]
fn test_set_inner_html_on_template_fills_contents() {
    let mut document = parse("<template></template>");
    let template = first_element(&document, "template");
    set_inner_html(&mut document, template, "<tr><td>x</td></tr>", ParserOptions::new())
        .expect("element context");
    assert!(document.children(template).is_empty());
    assert_eq!(document.inner_html(template), "<tr><td>x</td></tr>");
}

#[test]
fn test_set_inner_html_rejects_non_element() {
    let mut document = parse("x");
    let body = document.body().expect("body");
    let text = document.children(body)[0];
    assert!(set_inner_html(&mut document, text, "<p>", ParserOptions::new()).is_err());
}

#[test]
fn test_set_inner_html_inside_form_cannot_nest_forms() {
    let mut document = parse("<form><div id=d></div></form>");
    let div = document.get_element_by_id("d").expect("div");
    set_inner_html(&mut document, div, "<form><input></form>", ParserOptions::new())
        .expect("element context");
    assert_eq!(document.inner_html(div), "<input>");
}

#[test]
fn test_set_inner_html_on_form_cannot_nest_forms() {
    let mut document = parse("<form id=f></form>");
    let form = document.get_element_by_id("f").expect("form");
    set_inner_html(&mut document, form, "<form><input>", ParserOptions::new())
        .expect("element context");
    assert_eq!(document.inner_html(form), "<input>");
}

#[test]
fn test_fragment_context_records_form_ancestor() {
    let document = parse("<form><div id=inside></div></form><div id=outside></div>");
    let inside = document.get_element_by_id("inside").expect("inside");
    let outside = document.get_element_by_id("outside").expect("outside");
    assert!(FragmentContext::from_element(&document, inside).expect("element").form_ancestor);
    assert!(!FragmentContext::from_element(&document, outside).expect("element").form_ancestor);
}

#[test]
fn test_fragment_with_form_ancestor_ignores_form_tags() {
    let (document, children) = parse_fragment(
        FragmentContext::html("div").with_form_ancestor(),
        "<form><p>x</form>y",
        ParserOptions::new(),
    );
    let html: Vec<String> = children
        .iter()
        .map(|&child| document.outer_html(child))
        .collect();
    assert_eq!(html, ["<p>xy</p>"]);
}

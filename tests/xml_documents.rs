use grabxml::{parse_xml, NodeKind, ParseOptions, XmlDocument};

const CATALOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE catalog [
  <!ELEMENT catalog (book*)>
  <!ENTITY pub "Publisher">
]>
<!-- inventory -->
<catalog xmlns:x="urn:x">
  <book id="bk101" lang='en' available>
    <title>XML &amp; You</title>
    <x:price currency=EUR>44.95</x:price>
    <summary><![CDATA[Contains <markup> & stuff]]></summary>
    <cover src="a.jpg" />
  </book>
  <!-- second book -->
  <book id="bk102">
    <title>&#8220;Quoted&#x201D;</title>
    <?render fancy?>
  </book>
</catalog>
"#;

fn trimmed() -> ParseOptions {
    ParseOptions::default().trim_whitespace(true)
}

fn count_kind(doc: &XmlDocument, kind: NodeKind) -> usize {
    doc.root().descendants().filter(|n| n.kind() == kind).count()
}

#[test]
fn element_order_matches_document_order() {
    let doc = parse_xml(CATALOG, &ParseOptions::default());
    let tags: Vec<_> = doc
        .root()
        .descendants()
        .filter(|n| n.kind() == NodeKind::Element)
        .map(|n| n.tag().unwrap())
        .collect();
    assert_eq!(
        tags,
        ["catalog", "book", "title", "x:price", "summary", "cover", "book", "title"]
    );
}

#[test]
fn catalog_structure() {
    let doc = parse_xml(CATALOG, &trimmed());
    let root = doc.root();
    let kinds: Vec<_> = root.children().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        [
            NodeKind::Instruction,
            NodeKind::Instruction,
            NodeKind::Comment,
            NodeKind::Element
        ]
    );

    let doctype = root.child(1).unwrap();
    assert_eq!(doctype.tag(), Some("!DOCTYPE"));
    assert!(doctype.text().unwrap().starts_with("catalog ["));
    assert!(doctype.text().unwrap().ends_with(']'));
    assert!(doctype.text().unwrap().contains("<!ENTITY pub \"Publisher\">"));

    let catalog = root.child(3).unwrap();
    assert_eq!(catalog.attribute("xmlns:x"), Some("urn:x"));

    let book = catalog.child(0).unwrap();
    assert_eq!(book.attribute("id"), Some("bk101"));
    assert_eq!(book.attribute("lang"), Some("en"));
    assert_eq!(book.attribute("available"), Some(""));

    let title = book.child(0).unwrap();
    assert_eq!(title.text_content(), "XML & You");

    let price = book.child(1).unwrap();
    assert_eq!(price.tag(), Some("x:price"));
    assert_eq!(price.attribute("currency"), Some("EUR"));

    let summary = book.child(2).unwrap();
    assert_eq!(summary.child(0).unwrap().kind(), NodeKind::Text);
    assert_eq!(summary.text_content(), "Contains <markup> & stuff");

    assert!(book.child(3).unwrap().is_self_closing());

    assert_eq!(catalog.child(1).unwrap().text(), Some("second book"));

    let second = catalog.child(2).unwrap();
    assert_eq!(second.child(0).unwrap().text_content(), "\u{201C}Quoted\u{201D}");
    let render = second.child(1).unwrap();
    assert_eq!(render.kind(), NodeKind::Instruction);
    assert_eq!(render.tag(), Some("?render"));
    assert_eq!(render.text(), Some("fancy"));
}

// The fixture has no neighbouring text nodes; see
// `adjacent_text_nodes_merge_on_round_trip` for that case.
#[test]
fn round_trip_through_outer_xml() {
    for options in [ParseOptions::default(), trimmed()] {
        let doc = parse_xml(CATALOG, &options);
        let rendered = doc.root().outer_xml();
        let reparsed = parse_xml(&rendered, &options);
        assert_eq!(doc, reparsed, "{rendered}");
    }
}

// Adjacent text nodes render as one run, so they come back as a single node.
// The round trip holds for trees without neighbouring text nodes.
#[test]
fn adjacent_text_nodes_merge_on_round_trip() {
    let doc = parse_xml("<a>x<![CDATA[y]]></a>", &ParseOptions::default());
    let a = doc.root().child(0).unwrap();
    assert_eq!(a.child_count(), 2);
    assert_eq!(a.outer_xml(), "<a>xy</a>");

    let reparsed = parse_xml(&a.outer_xml(), &ParseOptions::default());
    let again = reparsed.root().child(0).unwrap();
    assert_eq!(again.child_count(), 1);
    assert_eq!(again.child(0).unwrap().text(), Some("xy"));
    assert_eq!(again.text_content(), a.text_content());
    assert_ne!(reparsed, doc);
}

#[test]
fn round_trip_of_subtree() {
    let doc = parse_xml(CATALOG, &trimmed());
    let book = doc.root().child(3).unwrap().child(0).unwrap();
    let reparsed = parse_xml(&book.outer_xml(), &trimmed());
    let again = reparsed.root().child(0).unwrap();
    assert_eq!(again.outer_xml(), book.outer_xml());
    assert_eq!(again.attributes(), book.attributes());
    assert_eq!(again.child_count(), book.child_count());
}

#[test]
fn trimming_is_idempotent() {
    let once = parse_xml(CATALOG, &trimmed());
    let twice = parse_xml(&once.root().outer_xml(), &trimmed());
    assert_eq!(once, twice);
    assert_eq!(twice.root().outer_xml(), once.root().outer_xml());
}

#[test]
fn trimming_drops_whitespace_text() {
    let doc = parse_xml(CATALOG, &trimmed());
    assert!(doc
        .root()
        .descendants()
        .filter(|n| n.node().is_text())
        .all(|n| {
            let text = n.text().unwrap();
            !text.is_empty() && text.trim() == text
        }));
}

#[test]
fn suppression_removes_every_comment_and_instruction() {
    let options = trimmed().ignore_comments(true).ignore_instructions(true);
    let doc = parse_xml(CATALOG, &options);
    assert_eq!(count_kind(&doc, NodeKind::Comment), 0);
    assert_eq!(count_kind(&doc, NodeKind::Instruction), 0);
    assert_eq!(doc.root().child_count(), 1);

    let kept = parse_xml(CATALOG, &trimmed());
    assert_eq!(count_kind(&kept, NodeKind::Comment), 2);
    assert_eq!(count_kind(&kept, NodeKind::Instruction), 3);
}

#[test]
fn suppression_keeps_other_nodes_in_place() {
    let options = ParseOptions::default().ignore_comments(true);
    let doc = parse_xml("<xml>a<!-- c -->b</xml>", &options);
    let xml = doc.root().child(0).unwrap();
    let texts: Vec<_> = xml.children().map(|c| c.text().unwrap()).collect();
    assert_eq!(texts, ["a", "b"]);
}

#[test]
fn ignore_comments_scenario() {
    let options = ParseOptions::default().ignore_comments(true);
    let doc = parse_xml("<xml><!-- c --></xml>", &options);
    let xml = doc.root().child(0).unwrap();
    assert_eq!(xml.tag(), Some("xml"));
    assert_eq!(xml.child_count(), 0);
}

#[test]
fn self_closing_with_bare_attributes_scenario() {
    let doc = parse_xml("<xml attribute=value attribute2=value2 />", &ParseOptions::default());
    assert_eq!(doc.root().child_count(), 1);
    let xml = doc.root().child(0).unwrap();
    assert_eq!(xml.tag(), Some("xml"));
    assert_eq!(xml.attribute("attribute"), Some("value"));
    assert_eq!(xml.attribute("attribute2"), Some("value2"));
    assert!(xml.is_self_closing());
    assert_eq!(xml.child_count(), 0);
}

#[test]
fn doctype_subset_is_one_instruction() {
    let doc = parse_xml(
        "<!DOCTYPE sgml [ <!ELEMENT sgml ANY> ]><sgml/>",
        &ParseOptions::default(),
    );
    assert_eq!(count_kind(&doc, NodeKind::Instruction), 1);
    let doctype = doc.root().child(0).unwrap();
    assert_eq!(doctype.text(), Some("sgml [ <!ELEMENT sgml ANY> ]"));
    assert_eq!(doc.root().child(1).unwrap().tag(), Some("sgml"));
}

#[test]
fn literal_configuration_matches_html_shape() {
    let options = ParseOptions::default().literal_elements(["code"]);
    let doc = parse_xml("<doc><code lang=rs>let x = a<b && c>d;</code></doc>", &options);
    let code = doc.root().child(0).unwrap().child(0).unwrap();
    assert_eq!(code.kind(), NodeKind::Literal);
    assert_eq!(code.attribute("lang"), Some("rs"));
    assert_eq!(code.text(), Some("let x = a<b && c>d;"));
}

#[test]
fn json_dump_of_document() {
    let doc = parse_xml("<a x=\"1\"><!--c--><b/></a>", &ParseOptions::default());
    let value: serde_json::Value = serde_json::from_str(&doc.root().to_json().unwrap()).unwrap();
    assert_eq!(value["tag"], "#root");
    let a = &value["children"][0];
    assert_eq!(a["attributes"]["x"], "1");
    assert_eq!(a["children"][0]["type"], "comment");
    assert_eq!(a["children"][0]["text"], "c");
    assert_eq!(a["children"][1]["selfClosing"], true);
}

#[test]
fn ampersand_runs_parse_in_linear_time() {
    let run = "&".repeat(200_000);
    let doc = parse_xml(&format!("<a t=\"{run};\">{run};</a>"), &ParseOptions::default());
    let a = doc.root().child(0).unwrap();
    assert_eq!(a.attribute("t").map(str::len), Some(200_001));
    assert_eq!(a.text_content().len(), 200_001);
}

#[test]
fn malformed_input_never_panics() {
    let inputs = [
        "<", "</", "<!", "<!-", "<![CDATA", "<?", "<a", "<a b", "<a b=", "<a b='", "a & b",
        "&#", "<a></b></c>", "<<>>", "<!DOCTYPE [[[", "]]>", "-->", "<a/ b>", "<é ü=ö>",
    ];
    for input in inputs {
        let doc = parse_xml(input, &ParseOptions::html());
        for node in doc.root().descendants() {
            assert!(node.parent().is_some());
        }
    }
}

use mapenv::cursor::Cursor;
use mapenv::layout::{FileHeader, Tag, FILLER, HEADER_SIZE};
use mapenv::script::{self, Statement};
use mapenv::string_table::StringRef;
use mapenv::tag_table::TagTable;
use mapenv::{compile, decompile, Container, Error, Value};

const SCENARIO: &str = "\
PTREE \"MAP_ENV\",\"root\";
PTVAL 10;
PTVAL 2.5, \"speed\";
_PTREE;
";

/// Output of the legacy compiler for `NESTED`.
const NESTED: &str = "\
PTREE \"MAP_ENV\",\"root\";
    PTREE \"fog\";
        PTVAL 10;
        PTVAL 7, \"speed\";
    _PTREE;
_PTREE;
";

#[rustfmt::skip]
const NESTED_BIN: [u8; 224] = [
    0x06, 0x00, 0x00, 0x00, 0x60, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
    0xA2, 0x54, 0xDE, 0x5E, 0x02, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00,
    0xA2, 0x54, 0xDE, 0x5E, 0x01, 0x00, 0xFF, 0xFF, 0x0D, 0x00, 0x00, 0x00, 0xDE, 0x81, 0x67, 0x44,
    0x01, 0x01, 0xFF, 0xFF, 0x0A, 0x00, 0x00, 0x00, 0xDE, 0x81, 0x67, 0x44, 0x02, 0x01, 0xFF, 0xFF,
    0x07, 0x00, 0x00, 0x00, 0x11, 0x00, 0x00, 0x00, 0x3E, 0xB8, 0xE6, 0xD4, 0x00, 0xFF, 0xFF, 0xFF,
    0x3E, 0xB8, 0xE6, 0xD4, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x4D, 0x41, 0x50, 0x5F, 0x45, 0x4E, 0x56, 0x00, 0x72, 0x6F, 0x6F, 0x74, 0x00, 0x66, 0x6F, 0x67,
    0x00, 0x73, 0x70, 0x65, 0x65, 0x64, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x50, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, 0x1C, 0x00, 0x00, 0x00,
    0xA2, 0x54, 0xDE, 0x5E, 0x00, 0x00, 0x00, 0x00, 0xDE, 0x81, 0x67, 0x44, 0x00, 0x00, 0x00, 0x00,
    0x3E, 0xB8, 0xE6, 0xD4, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x50, 0x54, 0x52, 0x45, 0x45, 0x00, 0x00, 0x00, 0x00, 0x50, 0x54, 0x56, 0x41, 0x4C, 0x00, 0x00,
    0x00, 0x00, 0x5F, 0x50, 0x54, 0x52, 0x45, 0x45, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
    0x01, 0x74, 0x32, 0x62, 0xFE, 0x01, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

/// Output of the legacy compiler for `PTREE "a";\n_PTREE;\n`. Its tag table
/// claims three tags but lists two.
#[rustfmt::skip]
const TREE_ONLY_BIN: [u8; 160] = [
    0x02, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
    0xA2, 0x54, 0xDE, 0x5E, 0x01, 0x00, 0xFF, 0xFF, 0x08, 0x00, 0x00, 0x00, 0x3E, 0xB8, 0xE6, 0xD4,
    0x00, 0xFF, 0xFF, 0xFF, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x4D, 0x41, 0x50, 0x5F, 0x45, 0x4E, 0x56, 0x00, 0x61, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x50, 0x00, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x30, 0x00, 0x00, 0x00, 0x13, 0x00, 0x00, 0x00,
    0xA2, 0x54, 0xDE, 0x5E, 0x00, 0x00, 0x00, 0x00, 0x3E, 0xB8, 0xE6, 0xD4, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x50, 0x54, 0x52, 0x45, 0x45, 0x00, 0x00, 0x00, 0x00, 0x5F, 0x50, 0x54, 0x52, 0x45, 0x45, 0x00,
    0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x01, 0x74, 0x32, 0x62, 0xFE, 0x01, 0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
];

fn header(data: &[u8]) -> FileHeader {
    FileHeader::parse(&mut Cursor::new(data)).expect("header")
}

#[test]
fn scenario_encodes_expected_regions() {
    let bytes = compile(SCENARIO).expect("compile");
    let h = header(&bytes);
    assert_eq!(h.entry_count, 4);
    assert_eq!(h.string_blob_offset, 80);
    assert_eq!(h.string_count, 3);

    let blob_start = h.string_blob_offset as usize;
    assert_eq!(&bytes[blob_start..blob_start + 19], b"MAP_ENV\0root\0speed\0");

    let table = TagTable::parse(&bytes, h.tag_table_offset()).expect("tag table");
    let hashes: Vec<u32> = table.entries.iter().map(|e| e.hash).collect();
    assert_eq!(hashes, [Tag::Tree.hash(), Tag::Value.hash(), Tag::TreeEnd.hash()]);
    assert_eq!(bytes.len(), 208);
}

#[test]
fn scenario_decodes_with_depth() {
    let bytes = compile(SCENARIO).expect("compile");
    let lines = mapenv::decode::decode(&bytes).expect("decode");
    let depths: Vec<usize> = lines.iter().map(|l| l.depth).collect();
    assert_eq!(depths, [0, 1, 1, 0]);

    let text = decompile(&bytes).expect("decompile");
    assert_eq!(
        text,
        "PTREE \"MAP_ENV\",\"root\";\n    PTVAL 10;\n    PTVAL 2.5, \"speed\";\n_PTREE;\n"
    );
    assert_eq!(script::parse(&text).unwrap(), script::parse(SCENARIO).unwrap());
}

#[test]
fn matches_legacy_compiler_output() {
    assert_eq!(compile(NESTED).expect("compile"), NESTED_BIN);
}

#[test]
fn decompiles_legacy_file() {
    assert_eq!(decompile(&NESTED_BIN).expect("decompile"), NESTED);
}

#[test]
fn lone_close_is_rejected() {
    assert!(matches!(
        compile("_PTREE;\n"),
        Err(Error::MalformedTreeNesting { .. })
    ));
}

#[test]
fn simple_trees_round_trip() {
    let sources = [
        "PTREE \"MAP_ENV\",\"env\";\n_PTREE;\n",
        "PTREE \"MAP_ENV\",\"env\";\nPTREE \"light\";\nPTVAL 1;\nPTVAL -2;\nPTVAL 0.25;\n_PTREE;\nPTREE \"fog\";\nPTVAL 3.0;\n_PTREE;\n_PTREE;\n",
        "PTREE \"a\";\nPTREE \"b\";\nPTREE \"c\";\nPTVAL 2147483647;\n_PTREE;\n_PTREE;\nPTVAL -1e-3;\n_PTREE;\n",
        "PTREE \"MAP_ENV\",\"森\";\n    PTVAL 5, \"明るさ\";\n_PTREE;\n",
    ];
    for src in sources {
        let bytes = compile(src).expect("compile");
        let text = decompile(&bytes).expect("decompile");
        assert_eq!(script::parse(&text).unwrap(), script::parse(src).unwrap(), "{src}");
    }
}

#[test]
fn statements_stay_balanced() {
    let src = "PTREE \"a\";\nPTREE \"b\";\n_PTREE;\nPTREE \"c\";\n_PTREE;\n_PTREE;\n";
    let stmts = script::parse(src).unwrap();
    let mut open = 0i32;
    for s in &stmts {
        match s {
            Statement::TreeOpen { .. } => open += 1,
            Statement::TreeClose => open -= 1,
            _ => {}
        }
        assert!(open >= 0);
    }
    assert_eq!(open, 0);
}

#[test]
fn regions_are_aligned_and_filled() {
    let src = "PTREE \"MAP_ENV\",\"root\";\nPTVAL abc;\nPTVALS 1,2.5,x;\nPTVAL 1, \"label\";\n_PTREE;\n";
    let bytes = compile(src).expect("compile");
    let h = header(&bytes);
    let entries_end = h.string_blob_offset as usize;
    let table_start = h.tag_table_offset();

    assert_eq!((entries_end - HEADER_SIZE) % 16, 0);
    assert_eq!(h.string_blob_len % 16, 0);
    assert_eq!((bytes.len() - table_start) % 16, 0);

    // Entry region: records, one terminator byte, filler.
    let entries = &bytes[HEADER_SIZE..entries_end];
    let last = entries.iter().rposition(|&b| b != FILLER).unwrap();
    assert_eq!(entries[last], 0);

    let blob = &bytes[entries_end..table_start];
    let last = blob.iter().rposition(|&b| b != FILLER).unwrap();
    assert_eq!(&blob[last - 1..=last], b"\0\0");
}

#[test]
fn tag_hashes_repeat_identically() {
    let bytes = compile("PTREE \"a\";\n_PTREE;\nPTREE \"b\";\n_PTREE;\n").expect("compile");
    assert_eq!(&bytes[16..20], &bytes[36..40]);
    assert_eq!(&bytes[28..32], &bytes[48..52]);
    assert_eq!(&bytes[16..20], &Tag::Tree.hash().to_le_bytes());
}

#[test]
fn container_exposes_regions() {
    let container = Container::parse(&NESTED_BIN).expect("container");
    assert_eq!(container.header().entry_count, 6);
    assert_eq!(container.header().string_blob_len, 32);
    assert_eq!(container.strings().get(StringRef(13)).expect("string"), "fog");
}

#[test]
fn list_records_are_encode_only() {
    let bytes = compile("PTREE \"a\";\nPTVALS 1,2,3;\n_PTREE;\n").expect("compile");
    assert!(matches!(decompile(&bytes), Err(Error::UnsupportedListRecord { .. })));
}

#[test]
fn labeled_float_keeps_its_type() {
    let bytes = compile("PTVAL 0.5, \"ratio\";\n").expect("compile");
    let stmts = script::parse(&decompile(&bytes).unwrap()).unwrap();
    assert_eq!(
        stmts,
        [Statement::Scalar {
            value: Value::Float(0.5),
            label: Some("ratio".into())
        }]
    );
}

#[test]
fn decompiles_legacy_tree_only_file() {
    assert_eq!(decompile(&TREE_ONLY_BIN).expect("decompile"), "PTREE \"a\";\n_PTREE;\n");

    let container = Container::parse(&TREE_ONLY_BIN).expect("container");
    let names: Vec<&str> = container.tags().entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["PTREE", "_PTREE"]);
    assert_eq!(container.tags().name_of(u32::from_le_bytes([FILLER; 4])), None);
}

#[test]
fn tree_only_output_differs_from_legacy_in_tag_count() {
    let bytes = compile("PTREE \"a\";\n_PTREE;\n").expect("compile");
    assert_eq!(bytes.len(), TREE_ONLY_BIN.len());
    let table_start = header(&bytes).tag_table_offset();
    let diffs: Vec<usize> = (0..bytes.len()).filter(|&i| bytes[i] != TREE_ONLY_BIN[i]).collect();
    assert_eq!(diffs, [table_start + 4]);
    assert_eq!(bytes[table_start + 4], 2);
}

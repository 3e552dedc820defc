//! Patch construction: record handling, index stability, factory fallbacks

use magnon::{EngineConfig, Patch};

fn config() -> EngineConfig {
    EngineConfig {
        block_size: 64,
        sample_rate: 44100.0,
        ..EngineConfig::default()
    }
}

#[test]
fn test_simple_chain_builds() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 64 64 osc~ 440;
#X obj 64 96 *~ 0.5;
#X obj 64 128 dac~;
#X connect 0 0 1 0;
#X connect 1 0 2 0;
#X connect 1 0 2 1;
"#;
    let patch = Patch::from_source(source, config()).unwrap();
    assert_eq!(patch.object_count(), 3);
    assert_eq!(patch.object_label(0), Some("osc~"));
    assert_eq!(patch.object_label(1), Some("*~"));
    assert_eq!(patch.object_label(2), Some("dac~"));
}

#[test]
fn test_missing_canvas_is_an_error() {
    let source = "#X obj 0 0 osc~ 440;";
    assert!(Patch::from_source(source, config()).is_err());
}

#[test]
fn test_empty_source_is_an_error() {
    assert!(Patch::from_source("", config()).is_err());
}

#[test]
fn test_inert_records_keep_indices_aligned() {
    // the comment and symbolatom occupy indices 1 and 2, so the connect
    // records below still line up
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 osc~ 220;
#X text 10 40 routing comment;
#X symbolatom 10 60 10 0 0 0 - - -;
#X obj 10 90 dac~;
#X connect 0 0 3 0;
"#;
    let patch = Patch::from_source(source, config()).unwrap();
    assert_eq!(patch.object_count(), 4);
    assert_eq!(patch.object_label(3), Some("dac~"));
    assert_eq!(patch.signal_execution_list(0), &[0, 3]);
}

#[test]
fn test_unknown_object_becomes_placeholder() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 frobnicator 1 2;
#X obj 10 40 osc~ 100;
#X obj 10 70 dac~;
#X connect 1 0 2 0;
"#;
    let patch = Patch::from_source(source, config()).unwrap();
    // the placeholder holds index 0 and the chain behind it still runs
    assert_eq!(patch.object_count(), 3);
    assert_eq!(patch.object_label(0), Some("frobnicator"));
    assert_eq!(patch.signal_execution_list(0), &[1, 2]);
}

#[test]
fn test_out_of_range_connect_is_skipped() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 osc~ 440;
#X obj 10 40 dac~;
#X connect 0 0 9 0;
#X connect 0 0 1 0;
"#;
    let patch = Patch::from_source(source, config()).unwrap();
    assert_eq!(patch.signal_execution_list(0), &[0, 1]);
}

#[test]
fn test_numeric_object_box_is_a_constant() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 42.5;
#X obj 10 40 print;
#X connect 0 0 1 0;
"#;
    let printed = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = printed.clone();
    let mut patch = Patch::from_source(source, config()).unwrap();
    patch.set_print_std(move |text| sink.lock().unwrap().push(text.to_string()));

    let constant = patch.find_object("float").unwrap();
    patch.send_to_object(constant, 0, &magnon::Message::bang(0.0));
    assert_eq!(printed.lock().unwrap().as_slice(), &["print: 42.5".to_string()]);
}

#[test]
fn test_floatatom_is_a_float_object() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X floatatom 10 10 5 0 0 0 - - -;
#X obj 10 40 print;
#X connect 0 0 1 0;
"#;
    let patch = Patch::from_source(source, config()).unwrap();
    assert_eq!(patch.object_label(0), Some("float"));
    assert_eq!(patch.object_count(), 2);
}

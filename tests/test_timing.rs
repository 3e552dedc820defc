//! Clock objects driven through whole blocks: metro, delay, pipe

use std::sync::{Arc, Mutex};

use magnon::{EngineConfig, Message, Patch};

fn config() -> EngineConfig {
    // 64 samples at 8kHz = 8ms blocks, convenient for timing math
    EngineConfig {
        block_size: 64,
        sample_rate: 8000.0,
        ..EngineConfig::default()
    }
}

fn capture_prints(patch: &mut Patch) -> Arc<Mutex<Vec<String>>> {
    let printed = Arc::new(Mutex::new(Vec::new()));
    let sink = printed.clone();
    patch.set_print_std(move |text| sink.lock().unwrap().push(text.to_string()));
    printed
}

fn run_blocks(patch: &mut Patch, count: usize) {
    let input = vec![0.0; 2 * 64];
    let mut output = vec![0.0; 2 * 64];
    for _ in 0..count {
        patch.process(&input, &mut output);
    }
}

#[test]
fn test_metro_ticks_periodically() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 metro 16;
#X obj 10 40 print tick;
#X connect 0 0 1 0;
"#;
    let mut patch = Patch::from_source(source, config()).unwrap();
    let printed = capture_prints(&mut patch);
    let metro = patch.find_object("metro").unwrap();

    patch.send_to_object(metro, 0, &Message::bang(0.0));
    // start emits immediately; ticks at 16ms and 32ms land in blocks 2 and 4
    assert_eq!(printed.lock().unwrap().len(), 1);

    run_blocks(&mut patch, 5); // covers [0, 40) ms
    assert_eq!(printed.lock().unwrap().len(), 3);
}

#[test]
fn test_metro_stop_halts_ticks() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 metro 16;
#X obj 10 40 print tick;
#X connect 0 0 1 0;
"#;
    let mut patch = Patch::from_source(source, config()).unwrap();
    let printed = capture_prints(&mut patch);
    let metro = patch.find_object("metro").unwrap();

    patch.send_to_object(metro, 0, &Message::bang(0.0));
    patch.send_to_object(metro, 0, &Message::float(0.0, 0.0));
    assert_eq!(patch.pending_messages(), 0);

    run_blocks(&mut patch, 6);
    assert_eq!(printed.lock().unwrap().len(), 1, "only the start bang");
}

#[test]
fn test_delay_fires_once_after_interval() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 delay 20;
#X obj 10 40 print due;
#X connect 0 0 1 0;
"#;
    let mut patch = Patch::from_source(source, config()).unwrap();
    let printed = capture_prints(&mut patch);
    let delay = patch.find_object("delay").unwrap();

    patch.send_to_object(delay, 0, &Message::bang(0.0));
    run_blocks(&mut patch, 2); // 16ms: not yet
    assert!(printed.lock().unwrap().is_empty());
    run_blocks(&mut patch, 1); // 24ms: fired
    assert_eq!(printed.lock().unwrap().len(), 1);
    run_blocks(&mut patch, 4); // no repeats
    assert_eq!(printed.lock().unwrap().len(), 1);
}

#[test]
fn test_pipe_delays_each_value() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 pipe 10;
#X obj 10 40 print late;
#X connect 0 0 1 0;
"#;
    let mut patch = Patch::from_source(source, config()).unwrap();
    let printed = capture_prints(&mut patch);
    let pipe = patch.find_object("pipe").unwrap();

    patch.send_to_object(pipe, 0, &Message::float(0.0, 1.0));
    patch.send_to_object(pipe, 0, &Message::float(2.0, 2.0));
    assert_eq!(patch.pending_messages(), 2);

    run_blocks(&mut patch, 2); // 16ms covers both
    assert_eq!(
        printed.lock().unwrap().as_slice(),
        &["late: 1".to_string(), "late: 2".to_string()]
    );
}

#[test]
fn test_equal_timestamps_preserve_insertion_order() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 receive slot;
#X obj 10 40 print got;
#X connect 0 0 1 0;
"#;
    let mut patch = Patch::from_source(source, config()).unwrap();
    let printed = capture_prints(&mut patch);
    let receive = patch.find_object("receive").unwrap();

    for value in [1.0, 2.0, 3.0] {
        patch.schedule_message(receive, 0, Message::float(4.0, value));
    }
    run_blocks(&mut patch, 1);
    assert_eq!(
        printed.lock().unwrap().as_slice(),
        &["got: 1".to_string(), "got: 2".to_string(), "got: 3".to_string()]
    );
}

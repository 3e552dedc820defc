//! Block engine scenarios: constant gain, mid-block gain change, scheduling

use std::f64::consts::TAU;
use std::sync::Arc;

use magnon::{EngineConfig, Message, Patch};

fn config() -> EngineConfig {
    EngineConfig {
        block_size: 64,
        sample_rate: 44100.0,
        input_channels: 2,
        output_channels: 2,
        ..EngineConfig::default()
    }
}

const GAIN_PATCH: &str = r#"
#N canvas 0 0 450 300 10;
#X obj 64 64 osc~ 440;
#X obj 64 96 *~ 0.5;
#X obj 64 128 dac~;
#X obj 200 64 receive gain;
#X connect 0 0 1 0;
#X connect 1 0 2 0;
#X connect 1 0 2 1;
#X connect 3 0 1 1;
"#;

fn run_block(patch: &mut Patch) -> Vec<f32> {
    let input = vec![0.0; 2 * 64];
    let mut output = vec![0.0; 2 * 64];
    patch.process(&input, &mut output);
    output
}

#[test]
fn test_constant_multiply_block() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    let output = run_block(&mut patch);

    for i in 0..64 {
        let expected = 0.5 * (TAU * 440.0 * i as f64 / 44100.0).sin() as f32;
        assert!(
            (output[i] - expected).abs() < 1e-4,
            "channel 0 sample {}: {} vs {}",
            i,
            output[i],
            expected
        );
        // both dac~ channels receive the same signal
        assert_eq!(output[i], output[64 + i]);
    }
}

#[test]
fn test_mid_block_gain_change() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    let receive = patch.find_object("receive").unwrap();

    let ts = (32.0 / 44100.0) * 1000.0;
    patch.schedule_message(receive, 0, Message::float(ts, 0.0));
    let output = run_block(&mut patch);

    for i in 0..32 {
        let expected = 0.5 * (TAU * 440.0 * i as f64 / 44100.0).sin() as f32;
        assert!(
            (output[i] - expected).abs() < 1e-4,
            "sample {} should still carry the old gain",
            i
        );
    }
    for i in 32..64 {
        assert_eq!(output[i], 0.0, "sample {} should be muted", i);
    }
}

#[test]
fn test_message_at_next_block_start_is_deferred() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    let receive = patch.find_object("receive").unwrap();
    let block_ms = patch.block_duration_ms();

    patch.schedule_message(receive, 0, Message::float(block_ms, 0.0));
    let first = run_block(&mut patch);
    assert!(first.iter().any(|s| *s != 0.0), "gain change must not land early");

    let second = run_block(&mut patch);
    assert!(second.iter().all(|s| *s == 0.0), "gain change lands at block two");
}

#[test]
fn test_cancelled_message_never_fires() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    let receive = patch.find_object("receive").unwrap();

    let handle = patch.schedule_message(receive, 0, Message::float(0.5, 0.0));
    assert_eq!(patch.pending_messages(), 1);
    patch.cancel_message(receive, 0, &handle);
    assert_eq!(patch.pending_messages(), 0);

    let output = run_block(&mut patch);
    assert!(output.iter().any(|s| *s != 0.0));
}

#[test]
fn test_fired_entry_releases_its_reservation() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    let receive = patch.find_object("receive").unwrap();

    let handle = patch.schedule_message(receive, 0, Message::float(0.1, 0.0));
    assert_eq!(Arc::strong_count(&handle), 2);
    run_block(&mut patch);
    assert_eq!(patch.pending_messages(), 0);
    assert_eq!(Arc::strong_count(&handle), 1);
}

#[test]
fn test_block_clock_advances() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    assert_eq!(patch.block_start_timestamp(), 0.0);
    run_block(&mut patch);
    let expected = 1000.0 * 64.0 / 44100.0;
    assert!((patch.block_start_timestamp() - expected).abs() < 1e-9);
    run_block(&mut patch);
    assert!((patch.block_start_timestamp() - 2.0 * expected).abs() < 1e-9);
}

#[test]
fn test_cursor_reaches_block_size_under_message_storm() {
    let mut patch = Patch::from_source(GAIN_PATCH, config()).unwrap();
    let receive = patch.find_object("receive").unwrap();

    // several gain changes inside one block, none aligned to sample edges
    for (sample, gain) in [(5.3, 0.4), (17.8, 0.1), (44.2, 0.9)] {
        let ts = (sample / 44100.0) * 1000.0;
        patch.schedule_message(receive, 0, Message::float(ts, gain));
    }
    let output = run_block(&mut patch);
    // the tail carries the final gain; if any splice had been skipped the
    // last samples would still be zero or stale
    let i = 60;
    let expected = 0.9 * (TAU * 440.0 * i as f64 / 44100.0).sin() as f32;
    assert!((output[i] - expected).abs() < 1e-4);
}

#[test]
fn test_adc_passthrough() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 adc~;
#X obj 10 40 dac~;
#X connect 0 0 1 0;
#X connect 0 1 1 1;
"#;
    let mut patch = Patch::from_source(source, config()).unwrap();
    let input: Vec<f32> = (0..128).map(|i| i as f32 / 128.0).collect();
    let mut output = vec![0.0; 128];
    patch.process(&input, &mut output);
    assert_eq!(input, output);
}

//! Offline renderer smoke test

use magnon::{EngineConfig, Patch, RenderConfig, Renderer};

#[test]
fn test_render_writes_wav() {
    let source = r#"
#N canvas 0 0 450 300 10;
#X obj 10 10 osc~ 440;
#X obj 10 40 *~ 0.5;
#X obj 10 70 dac~;
#X connect 0 0 1 0;
#X connect 1 0 2 0;
#X connect 1 0 2 1;
"#;
    let mut patch = Patch::from_source(
        source,
        EngineConfig {
            block_size: 64,
            sample_rate: 44100.0,
            ..EngineConfig::default()
        },
    )
    .unwrap();

    let out = std::env::temp_dir().join("magnon_render_test.wav");
    let renderer = Renderer::new(RenderConfig {
        duration: 0.1,
        master_gain: 1.0,
    });
    let stats = renderer.render_to_file(&mut patch, &out).unwrap();

    assert_eq!(stats.frames, 4410);
    assert!(stats.peak > 0.45 && stats.peak <= 0.5, "peak {}", stats.peak);

    let reader = hound::WavReader::open(&out).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.len(), 4410 * 2);
}

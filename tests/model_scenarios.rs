use vibe_fx::vibe::{ChannelLayout, Frame, Model, ModelError, ModelParams};

const BG: [u8; 3] = [100, 128, 128];

fn uniform(width: usize, height: usize, yuv: [u8; 3]) -> Vec<u8> {
    let mut buf = vec![0u8; width * height * 4];
    for px in buf.chunks_exact_mut(4) {
        px[1..].copy_from_slice(&yuv);
    }
    buf
}

fn exact(nsamples: usize, seed: u64) -> ModelParams {
    ModelParams {
        nsamples,
        sigma_y: 0,
        sigma_u: 0,
        sigma_v: 0,
        seed: Some(seed),
        ..Default::default()
    }
}

/// Foreground score with cardinality 1, spelled out
fn literal_score(confidence: u8, card: i32) -> u8 {
    let c = confidence as i32;
    (c * (2 - card) / 2 + 127 - c / 2).clamp(0, 255) as u8
}

#[test]
fn warm_up_then_classify_constant_frame() {
    let mut model = Model::with_params(4, 4, &exact(4, 1234)).unwrap();
    assert_eq!(model.cardinality(), 1);

    let mut buf = uniform(4, 4, BG);
    {
        let frame = Frame::packed(&mut buf, 4, 4, ChannelLayout::AYUV).unwrap();
        for _ in 0..10 {
            model.update_forced(&frame).unwrap();
        }
    }

    // ten refreshes of +16 from zero
    assert!(model.confidence().iter().all(|&c| c == 160));

    let mut expected = Vec::new();
    for y in 0..4 {
        for x in 0..4 {
            // slots never drawn during warm-up still hold the zeroed start value
            let card = model.samples_at(x, y).iter().filter(|s| **s == BG).count() as i32;
            assert!(card >= 1);
            expected.push(literal_score(model.confidence()[[y, x]], card));
        }
    }

    let total: u32 = expected.iter().map(|&s| s as u32).sum();
    let normalized = total as f64 / (16.0 * 255.0);
    let scene_change = normalized > 0.1;

    let mut frame = Frame::packed(&mut buf, 4, 4, ChannelLayout::AYUV).unwrap();
    let global = model.classify(&mut frame).unwrap();

    for y in 0..4 {
        for x in 0..4 {
            let want = if scene_change { 127 } else { expected[y * 4 + x] };
            assert_eq!(frame.score(x, y), want, "pixel ({}, {})", x, y);
        }
    }
    if scene_change {
        assert_eq!(global, 0.5);
        assert!(model.confidence().iter().all(|&c| c == 0));
    } else {
        assert_eq!(global, normalized);
        assert!(model.confidence().iter().all(|&c| c == 160));
    }
}

#[test]
fn seeded_constant_frame_matches_every_sample() {
    let mut model = Model::with_params(4, 4, &exact(4, 1)).unwrap();
    let mut buf = uniform(4, 4, BG);
    let mut frame = Frame::packed(&mut buf, 4, 4, ChannelLayout::AYUV).unwrap();
    model.init_model(&frame).unwrap();

    for y in 0..4 {
        for x in 0..4 {
            assert!(model.samples_at(x, y).iter().all(|s| *s == BG));
        }
    }

    // 255·(2-4)/2 + 127 - 127 clamps to 0
    assert_eq!(model.classify(&mut frame).unwrap(), 0.0);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(frame.score(x, y), literal_score(255, 4));
            assert_eq!(frame.score(x, y), 0);
        }
    }
}

#[test]
fn camera_pan_resets_confidence_on_padded_frames() {
    let (w, h, stride) = (6, 5, 32);
    let mut model = Model::with_params(w, h, &exact(9, 3)).unwrap();

    let fill = |yuv: [u8; 3]| {
        let mut buf = vec![0xEEu8; stride * h];
        for y in 0..h {
            for x in 0..w {
                let i = y * stride + x * 4;
                buf[i] = 0;
                buf[i + 1..i + 4].copy_from_slice(&yuv);
            }
        }
        buf
    };

    let mut still = fill([30, 100, 150]);
    {
        let mut frame = Frame::new(&mut still, w, h, stride, ChannelLayout::AYUV).unwrap();
        model.init_model(&frame).unwrap();
        assert_eq!(model.classify(&mut frame).unwrap(), 0.0);
        model.update(&frame).unwrap();
    }
    assert!(model.confidence().iter().all(|&c| c > 0));

    let mut panned = fill([220, 60, 40]);
    {
        let mut frame = Frame::new(&mut panned, w, h, stride, ChannelLayout::AYUV).unwrap();
        assert_eq!(model.classify(&mut frame).unwrap(), 0.5);
        for y in 0..h {
            for x in 0..w {
                assert_eq!(frame.score(x, y), 127);
            }
        }
    }
    assert!(model.confidence().iter().all(|&c| c == 0));
    assert_eq!(model.last_score(), 0.5);

    // padding bytes never touched
    for y in 0..h - 1 {
        assert!(panned[y * stride + w * 4..(y + 1) * stride]
            .iter()
            .all(|&b| b == 0xEE));
    }
}

#[test]
fn small_object_is_foreground_without_reset() {
    let params = ModelParams {
        nsamples: 20,
        sigma_y: 10,
        sigma_u: 5,
        sigma_v: 5,
        seed: Some(77),
        ..Default::default()
    };
    let (w, h) = (16, 16);
    let mut model = Model::with_params(w, h, &params).unwrap();

    let bg = [60, 128, 128];
    let mut buf = uniform(w, h, bg);
    {
        let mut frame = Frame::packed(&mut buf, w, h, ChannelLayout::AYUV).unwrap();
        model.init_model(&frame).unwrap();
        assert_eq!(model.classify(&mut frame).unwrap(), 0.0);
        model.update(&frame).unwrap();
    }
    let trust = model.confidence().to_owned();

    // 4x4 object in the corner: 16 of 256 pixels
    for y in 0..4 {
        for x in 0..4 {
            let i = (y * w + x) * 4;
            buf[i + 1..i + 4].copy_from_slice(&[200, 90, 170]);
        }
    }
    let mut frame = Frame::packed(&mut buf, w, h, ChannelLayout::AYUV).unwrap();
    let global = model.classify(&mut frame).unwrap();

    assert!(global < 0.1);
    assert_eq!(model.confidence(), trust);
    for y in 0..h {
        for x in 0..w {
            if x < 4 && y < 4 {
                // conf·(12-0)/12 + 127 - conf/2 with conf in {247, 255}
                assert!(frame.score(x, y) >= 251);
            } else {
                assert_eq!(frame.score(x, y), 0);
            }
        }
    }
}

#[test]
fn long_run_keeps_global_score_in_range() {
    let params = ModelParams {
        nsamples: 8,
        seed: Some(5),
        ..Default::default()
    };
    let mut model = Model::with_params(8, 8, &params).unwrap();

    for i in 0..120u32 {
        let level = ((i * 37) % 256) as u8;
        let mut buf = uniform(8, 8, [level, 128, 255 - level]);
        let mut frame = Frame::packed(&mut buf, 8, 8, ChannelLayout::AYUV).unwrap();
        if i < 5 {
            model.update_forced(&frame).unwrap();
            continue;
        }
        let score = model.classify(&mut frame).unwrap();
        assert!((0.0..=1.0).contains(&score));
        model.update(&frame).unwrap();
    }
}

#[test]
fn wrong_frame_size_fails_every_call_without_side_effects() {
    let mut model = Model::with_params(4, 4, &exact(3, 9)).unwrap();
    let mut buf = uniform(4, 5, BG);
    let mut frame = Frame::packed(&mut buf, 4, 5, ChannelLayout::AYUV).unwrap();

    let is_mismatch = |r: Result<(), ModelError>| matches!(r, Err(ModelError::DimensionMismatch { .. }));
    assert!(is_mismatch(model.init_model(&frame)));
    assert!(is_mismatch(model.update(&frame)));
    assert!(is_mismatch(model.update_forced(&frame)));
    assert!(matches!(
        model.classify(&mut frame),
        Err(ModelError::DimensionMismatch { .. })
    ));

    assert!(model.confidence().iter().all(|&c| c == 0));
    assert_eq!(model.last_score(), 0.0);
    for y in 0..4 {
        for x in 0..4 {
            assert!(model.samples_at(x, y).iter().all(|s| *s == [0, 0, 0]));
        }
    }
    assert!(buf.chunks_exact(4).all(|px| px[0] == 0));
}

#[test]
fn create_and_destroy_without_frames() {
    let model = Model::create(320, 240, 20).unwrap();
    assert_eq!((model.width(), model.height()), (320, 240));
    model.destroy();
}

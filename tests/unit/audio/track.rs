use super::*;

fn tone(sample_frames: usize) -> AudioTrack {
    let samples = (0..sample_frames * 2).map(|i| (i % 7) as f32 * 0.1).collect();
    AudioTrack::new(NARRATION_SAMPLE_RATE, NARRATION_CHANNELS, samples).unwrap()
}

#[test]
fn frame_to_sample_uses_rational_fps() {
    let fps = Fps::new(30_000, 1_001).unwrap();
    assert_eq!(frame_to_sample(0, fps, 48_000), 0);
    assert_eq!(frame_to_sample(1, fps, 48_000), 1_602);
    assert_eq!(frame_to_sample(100, Fps::integer(15), 48_000), 320_000);
}

#[test]
fn rejects_misaligned_samples() {
    assert!(AudioTrack::new(48_000, 2, vec![0.0; 3]).is_err());
    assert!(AudioTrack::new(0, 2, Vec::new()).is_err());
}

#[test]
fn short_narration_is_padded_with_silence() {
    let fps = Fps::integer(15);
    let track = tone(48_000);
    let (fitted, fit) = track.fit_to_video(30, fps);
    assert_eq!(fit, AudioFit::Padded(48_000));
    assert_eq!(fitted.sample_frames(), 96_000);
    assert_eq!(&fitted.samples()[..96_000], track.samples());
    assert!(fitted.samples()[96_000..].iter().all(|&s| s == 0.0));
    assert!((fitted.duration_secs() - 2.0).abs() < 1e-9);
}

#[test]
fn long_narration_is_truncated() {
    let fps = Fps::integer(24);
    let track = tone(48_000 * 3);
    let (fitted, fit) = track.fit_to_video(24, fps);
    assert_eq!(fit, AudioFit::Truncated(96_000));
    assert_eq!(fitted.sample_frames(), 48_000);
    assert_eq!(fitted.samples(), &track.samples()[..96_000]);
}

#[test]
fn matching_length_is_untouched() {
    let track = tone(3_200);
    let (fitted, fit) = track.fit_to_video(1, Fps::integer(15));
    assert_eq!(fit, AudioFit::Exact);
    assert_eq!(fitted, track);
}

#[test]
fn writes_little_endian_pcm() {
    let track = AudioTrack::new(8_000, 1, vec![1.0, -0.5]).unwrap();
    let path = std::env::temp_dir().join(format!("chartreel_track_{}.f32le", std::process::id()));
    track.write_f32le(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
    assert_eq!(&bytes[4..], &(-0.5f32).to_le_bytes());
}

#[test]
fn window_selects_the_samples_under_a_frame_range() {
    let fps = Fps::integer(15);
    let track = tone(3_200 * 4);
    let range = FrameRange::new(crate::foundation::core::FrameIndex(2), crate::foundation::core::FrameIndex(5)).unwrap();
    let w = track.window(range, fps);
    assert_eq!(w.sample_frames(), 3_200 * 3);
    assert_eq!(&w.samples()[..3_200 * 2 * 2], &track.samples()[3_200 * 2 * 2..]);
    assert!(w.samples()[3_200 * 2 * 2..].iter().all(|&s| s == 0.0));
}

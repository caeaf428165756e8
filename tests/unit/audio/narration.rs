use super::*;

struct FixedTone;

impl SpeechSynthesizer for FixedTone {
    fn synthesize(&self, text: &str, _voice: Option<&str>) -> ReelResult<AudioTrack> {
        AudioTrack::new(48_000, 2, vec![0.25; text.len() * 2])
    }
}

struct BrokenEngine;

impl SpeechSynthesizer for BrokenEngine {
    fn synthesize(&self, _text: &str, _voice: Option<&str>) -> ReelResult<AudioTrack> {
        Err(ReelError::Other(anyhow::anyhow!("voice engine crashed")))
    }
}

fn text(s: &str) -> NarrationSpec {
    NarrationSpec::Text {
        text: s.to_owned(),
        voice: None,
    }
}

#[test]
fn no_narration_builds_nothing() {
    assert!(
        AudioTrackBuilder::default()
            .build(&NarrationSpec::None)
            .unwrap()
            .is_none()
    );
}

#[test]
fn missing_engine_is_a_narration_failure() {
    let err = AudioTrackBuilder::default().build(&text("hello")).unwrap_err();
    assert!(matches!(err, ReelError::NarrationSynthesisFailure(_)));
}

#[test]
fn engine_errors_are_classified_as_narration_failures() {
    let err = AudioTrackBuilder::new(Arc::new(BrokenEngine))
        .build(&text("hello"))
        .unwrap_err();
    assert!(matches!(err, ReelError::NarrationSynthesisFailure(_)));
    assert!(err.to_string().contains("voice engine crashed"));
}

#[test]
fn text_goes_through_the_synthesizer() {
    let b = AudioTrackBuilder::new(Arc::new(FixedTone));
    let track = b.build(&text("four")).unwrap().unwrap();
    assert_eq!(track.sample_frames(), 4);
    assert!(b.build(&text("   ")).is_err());
}

#[test]
fn missing_recording_is_a_narration_failure() {
    let spec = NarrationSpec::Recorded {
        path: PathBuf::from("/definitely/not/here.wav"),
    };
    let err = AudioTrackBuilder::default().build(&spec).unwrap_err();
    assert!(matches!(err, ReelError::NarrationSynthesisFailure(_)));
}

#[test]
fn narration_spec_json_form() {
    let spec: NarrationSpec =
        serde_json::from_str(r#"{ "kind": "text", "text": "Sales rose." }"#).unwrap();
    assert_eq!(spec, text("Sales rose."));
    let spec: NarrationSpec = serde_json::from_str(r#"{ "kind": "none" }"#).unwrap();
    assert_eq!(spec, NarrationSpec::None);
}

#[cfg(unix)]
mod with_scripts {
    use super::*;
    use crate::foundation::tmp::write_script;

    // Emits one stereo sample frame of 1.0 when the input file exists.
    const FAKE_FFMPEG: &str = r#"[ -f "$4" ] || exit 7
printf '\000\000\200\077\000\000\200\077'"#;

    #[test]
    fn recorded_narration_is_decoded_with_ffmpeg() {
        let ffmpeg = write_script("ffmpeg", FAKE_FFMPEG);
        let recording = write_script("narration.wav", "exit 0");
        let track = AudioTrackBuilder::default()
            .with_ffmpeg(&ffmpeg)
            .build(&NarrationSpec::Recorded { path: recording })
            .unwrap()
            .unwrap();
        assert_eq!(track.sample_rate(), NARRATION_SAMPLE_RATE);
        assert_eq!(track.samples(), &[1.0, 1.0]);
    }

    #[test]
    fn failing_decoder_is_a_narration_failure() {
        let ffmpeg = write_script("ffmpeg", "echo 'invalid data' >&2\nexit 1");
        let recording = write_script("narration.wav", "exit 0");
        let err = AudioTrackBuilder::default()
            .with_ffmpeg(&ffmpeg)
            .build(&NarrationSpec::Recorded { path: recording })
            .unwrap_err();
        assert!(matches!(err, ReelError::NarrationSynthesisFailure(_)));
        assert!(err.to_string().contains("invalid data"));
    }

    #[test]
    fn command_synthesizer_fills_placeholders() {
        let ffmpeg = write_script("ffmpeg", FAKE_FFMPEG);
        let tts = write_script("tts", r#"[ "$1" = "-v" ] && [ "$2" = "alto" ] && printf '%s' "$5" > "$4""#);
        let synth = CommandSynthesizer::new(&tts, ["-v", "{voice}", "-w", "{out}", "{text}"])
            .with_default_voice("alto")
            .with_ffmpeg(&ffmpeg);
        let track = synth.synthesize("hello", None).unwrap();
        assert_eq!(track.sample_frames(), 1);

        let err = synth.synthesize("hello", Some("bass")).unwrap_err();
        assert!(matches!(err, ReelError::NarrationSynthesisFailure(_)));
    }
}

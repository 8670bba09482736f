//! Tests for the public list-file and subtitle-conversion API.

use std::collections::HashMap;

use video_helper::batch::parse_line;
use video_helper::executor::Action;
use video_helper::subtitle::vtt_to_srt;

#[test]
fn multi_action_lines_decode_action_input_and_options() {
    let command = parse_line(
        "subtitles https://youtu.be/abc --language en",
        None,
    )
    .unwrap();
    assert_eq!(command.action, Action::Subtitles);
    assert_eq!(command.input, "https://youtu.be/abc");
    assert_eq!(
        command.options,
        HashMap::from([("language".to_string(), "en".to_string())])
    );
}

#[test]
fn quoted_paths_survive_decoding() {
    let command = parse_line(r#"srt "Aulas 2024/aula 01.mov""#, None).unwrap();
    assert_eq!(command.action, Action::Srt);
    assert_eq!(command.input, "Aulas 2024/aula 01.mov");
}

#[test]
fn single_action_lines_are_bare_inputs() {
    let command = parse_line("https://youtu.be/abc", Some(Action::Video)).unwrap();
    assert_eq!(command.action, Action::Video);
    assert_eq!(command.input, "https://youtu.be/abc");
}

#[test]
fn three_cue_sample_converts_to_numbered_srt() {
    let vtt = "WEBVTT\n\
\n\
00:00:01.000 --> 00:00:02.500\n\
Ola\n\
\n\
00:00:03.000 --> 00:00:04.000\n\
Mundo\n";

    let srt = vtt_to_srt(vtt);
    assert_eq!(
        srt,
        "1\n00:00:01,000 --> 00:00:02,500\nOla\n\n2\n00:00:03,000 --> 00:00:04,000\nMundo\n\n"
    );
}

#[test]
fn conversion_is_deterministic_across_runs() {
    let vtt = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHi\n";
    assert_eq!(vtt_to_srt(vtt), vtt_to_srt(vtt));
}

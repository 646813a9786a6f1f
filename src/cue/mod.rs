//! CUE sheet parser.
//!
//! Parses the textual description of how tracks are laid out across one
//! or more audio/data files into a validated [`Sheet`], then resolves
//! each track's absolute start/end offset within its file.
//! For the format itself see: http://digitalx.org/cue-sheet/syntax/

pub mod error;
mod handlers;
mod lexer;
pub mod models;

use crate::cue::error::{CueError, CueResult};
use crate::cue::models::Sheet;
use log::debug;
use std::io::{BufRead, Cursor};
use std::path::Path;

/// Parses cue sheet text from a buffered source and returns the filled
/// [`Sheet`]. `durations` optionally supplies the length in seconds of
/// each referenced file, in FILE declaration order; files without an
/// entry keep duration 0. The first error aborts the whole parse.
pub fn parse<R: BufRead>(reader: R, durations: &[f64]) -> CueResult<Sheet> {
    let mut sheet = Sheet::default();
    let mut line_number = 0;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();

        // Skip empty lines. They don't count for error line numbers.
        if line.is_empty() {
            continue;
        }
        line_number += 1;

        let (command, params) = lexer::parse_command(line).map_err(|source| CueError::Syntax {
            line: line_number,
            source,
        })?;

        let descriptor = handlers::lookup(&command).ok_or_else(|| CueError::UnknownCommand {
            line: line_number,
            command: command.clone(),
        })?;

        if let Some(expected) = descriptor.params {
            let received = params.len();
            if received != expected {
                return Err(CueError::ParameterCount {
                    line: line_number,
                    command,
                    received,
                    expected,
                });
            }
        }

        (descriptor.handler)(&params, &mut sheet).map_err(|source| CueError::Command {
            line: line_number,
            command,
            source,
        })?;
    }

    resolve_positions(&mut sheet, durations);

    debug!(
        "parsed cue sheet: {} file(s), {} track(s)",
        sheet.files.len(),
        sheet.files.iter().map(|f| f.tracks.len()).sum::<usize>(),
    );

    Ok(sheet)
}

/// Parses a cue sheet held in a string. See [`parse`].
pub fn parse_str(input: &str, durations: &[f64]) -> CueResult<Sheet> {
    parse(input.as_bytes(), durations)
}

/// Reads and parses a cue sheet file. The file must be valid UTF-8; the
/// CLI decodes other encodings before handing the text to [`parse_str`].
pub async fn parse_file(path: impl AsRef<Path>, durations: &[f64]) -> CueResult<Sheet> {
    let data = tokio::fs::read(path).await?;
    parse(Cursor::new(data), durations)
}

/// Computes each track's absolute start/end offset within its file.
///
/// A track starts at its first index time. It ends where the next track
/// of the same file cuts in: that track's pregap when non-zero, its
/// start time otherwise. The last track of a file runs to the file's
/// duration.
fn resolve_positions(sheet: &mut Sheet, durations: &[f64]) {
    for (i, file) in sheet.files.iter_mut().enumerate() {
        if let Some(&duration) = durations.get(i) {
            file.duration = duration;
        }

        for t in 0..file.tracks.len() {
            let end = match file.tracks.get(t + 1) {
                Some(next) => {
                    let pregap = next.pregap.map(|gap| gap.seconds()).unwrap_or(0.0);
                    if pregap != 0.0 {
                        pregap
                    } else {
                        next.start_time().seconds()
                    }
                }
                None => file.duration,
            };

            let track = &mut file.tracks[t];
            track.start_position = track.start_time().seconds();
            track.end_position = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::models::{FileType, Index, TimeCode, TrackDataType, TrackFlag};

    #[test]
    fn test_minimal_sheet() {
        let sheet = parse_str(
            "FILE \"test.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n",
            &[],
        )
        .unwrap();

        assert_eq!(sheet.files.len(), 1);
        let file = &sheet.files[0];
        assert_eq!(file.name, "test.wav");
        assert_eq!(file.file_type, FileType::Wave);
        assert_eq!(file.tracks.len(), 1);

        let track = &file.tracks[0];
        assert_eq!(track.number, 1);
        assert_eq!(track.data_type, TrackDataType::Audio);
        assert_eq!(
            track.indexes,
            vec![Index {
                number: 1,
                time: TimeCode::new(0, 0, 0),
            }],
        );
    }

    #[test]
    fn test_full_sheet() {
        let sheet = parse_str(
            "REM GENRE Electronica\n\
             REM DATE 1998\n\
             CATALOG 1234567890123\n\
             CDTEXTFILE \"disc.cdt\"\n\
             PERFORMER \"The Specialist\"\n\
             TITLE \"Great Hits\"\n\
             SONGWRITER \"Nobody\"\n\
             FILE \"disc.bin\" BINARY\n\
             TRACK 01 MODE1/2352\n\
             INDEX 01 00:00:00\n\
             TRACK 02 AUDIO\n\
             FLAGS DCP 4CH PRE SCMS\n\
             ISRC ABCDE1234567\n\
             TITLE \"Track Two\"\n\
             PERFORMER \"Band\"\n\
             PREGAP 00:02:00\n\
             INDEX 00 05:48:32\n\
             INDEX 01 05:50:32\n\
             POSTGAP 00:01:00\n",
            &[],
        )
        .unwrap();

        assert_eq!(sheet.catalog.as_deref(), Some("1234567890123"));
        assert_eq!(sheet.cd_text_file.as_deref(), Some("disc.cdt"));
        assert_eq!(sheet.performer.as_deref(), Some("The Specialist"));
        assert_eq!(sheet.title.as_deref(), Some("Great Hits"));
        assert_eq!(sheet.songwriter.as_deref(), Some("Nobody"));
        assert_eq!(
            sheet.comments,
            vec!["GENRE Electronica".to_string(), "DATE 1998".to_string()],
        );

        let file = &sheet.files[0];
        assert_eq!(file.file_type, FileType::Binary);
        assert_eq!(file.tracks.len(), 2);
        assert_eq!(file.tracks[0].data_type, TrackDataType::Mode1_2352);

        let track = &file.tracks[1];
        assert_eq!(
            track.flags,
            vec![
                TrackFlag::Dcp,
                TrackFlag::FourCh,
                TrackFlag::Pre,
                TrackFlag::Scms,
            ],
        );
        assert_eq!(track.isrc.as_deref(), Some("ABCDE1234567"));
        assert_eq!(track.title.as_deref(), Some("Track Two"));
        assert_eq!(track.performer.as_deref(), Some("Band"));
        assert_eq!(track.pregap, Some(TimeCode::new(0, 2, 0)));
        assert_eq!(track.postgap, Some(TimeCode::new(0, 1, 0)));
        assert_eq!(track.indexes.len(), 2);
        assert_eq!(track.indexes[0].number, 0);
        assert_eq!(track.indexes[1].number, 1);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = "FILE \"a.wav\" WAVE\n\
                     TRACK 01 AUDIO\n\
                     INDEX 01 00:00:00\n\
                     TRACK 02 AUDIO\n\
                     INDEX 01 03:00:00\n";

        let first = parse_str(input, &[2400.0]).unwrap();
        let second = parse_str(input, &[2400.0]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_position_resolution() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             TRACK 02 AUDIO\n\
             INDEX 01 03:00:00\n",
            &[2400.0],
        )
        .unwrap();

        let file = &sheet.files[0];
        assert_eq!(file.duration, 2400.0);
        assert_eq!(file.tracks[0].start_position, 0.0);
        assert_eq!(file.tracks[0].end_position, 180.0);
        assert_eq!(file.tracks[1].start_position, 180.0);
        assert_eq!(file.tracks[1].end_position, 2400.0);
    }

    #[test]
    fn test_position_resolution_uses_next_pregap() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             TRACK 02 AUDIO\n\
             PREGAP 00:30:00\n\
             INDEX 01 03:00:00\n",
            &[600.0],
        )
        .unwrap();

        let file = &sheet.files[0];
        assert_eq!(file.tracks[0].end_position, 30.0);
        assert_eq!(file.tracks[1].start_position, 180.0);
        assert_eq!(file.tracks[1].end_position, 600.0);
    }

    #[test]
    fn test_position_resolution_without_durations() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:10:00\n\
             FILE \"b.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n",
            &[300.0],
        )
        .unwrap();

        // Only the first file got a duration; the second keeps 0.
        assert_eq!(sheet.files[0].duration, 300.0);
        assert_eq!(sheet.files[0].tracks[0].start_position, 10.0);
        assert_eq!(sheet.files[0].tracks[0].end_position, 300.0);
        assert_eq!(sheet.files[1].duration, 0.0);
        assert_eq!(sheet.files[1].tracks[0].end_position, 0.0);
    }

    #[test]
    fn test_track_before_file_fails() {
        let err = parse_str("TRACK 01 AUDIO\n", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: failed to parse TRACK command: \
             unexpected TRACK command, FILE command expected first",
        );
    }

    #[test]
    fn test_track_level_commands_require_track() {
        for line in [
            "FLAGS DCP",
            "INDEX 01 00:00:00",
            "ISRC ABCDE1234567",
            "POSTGAP 00:01:00",
            "PREGAP 00:01:00",
        ] {
            let input = format!("FILE \"a.wav\" WAVE\n{line}\n");
            let err = parse_str(&input, &[]).unwrap_err();
            assert!(
                err.to_string().contains("TRACK command should appear before"),
                "input: {line}, error: {err}",
            );
        }
    }

    #[test]
    fn test_non_sequential_index_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             INDEX 03 00:10:00\n",
            &[],
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "line 4: failed to parse INDEX command: \
             expected index number 2 but 3 received",
        );
    }

    #[test]
    fn test_huge_minutes_resolve_without_overflow() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 80000000:00:00\n",
            &[],
        )
        .unwrap();

        assert_eq!(
            sheet.files[0].tracks[0].start_position,
            80_000_000.0 * 60.0,
        );
    }

    #[test]
    fn test_index_number_over_99_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 100 00:00:00\n",
            &[],
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "line 3: failed to parse INDEX command: \
             index number should be in 0..99 interval",
        );
    }

    #[test]
    fn test_track_number_0_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 00 AUDIO\n",
            &[],
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "line 2: failed to parse TRACK command: \
             track number should be in 1..99 range",
        );
    }

    #[test]
    fn test_first_index_must_be_0_or_1() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 02 00:00:00\n",
            &[],
        )
        .unwrap_err();

        assert!(err.to_string().contains("0 or 1 index number"), "{err}");
    }

    #[test]
    fn test_non_sequential_track_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             TRACK 03 AUDIO\n",
            &[],
        )
        .unwrap_err();

        assert!(
            err.to_string()
                .contains("expected track number 2, but 3 received"),
            "{err}",
        );
    }

    #[test]
    fn test_first_track_must_be_1() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 02 AUDIO\n",
            &[],
        )
        .unwrap_err();

        assert!(
            err.to_string()
                .contains("expected track number 1, but 2 received"),
            "{err}",
        );
    }

    #[test]
    fn test_isrc_after_index_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             ISRC ABCDE1234567\n",
            &[],
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "line 4: failed to parse ISRC command: \
             ISRC command must be specified before INDEX command",
        );
    }

    #[test]
    fn test_pregap_after_index_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:00:00\n\
             PREGAP 00:02:00\n",
            &[],
        )
        .unwrap_err();

        assert!(
            err.to_string()
                .contains("PREGAP command must appear before any INDEX command"),
            "{err}",
        );
    }

    #[test]
    fn test_invalid_catalog_fails() {
        let err = parse_str("CATALOG 12345\n", &[]).unwrap_err();
        assert!(
            err.to_string().contains("is not a valid catalog number"),
            "{err}",
        );

        // 13 digits but with a letter.
        let err = parse_str("CATALOG 123456789012a\n", &[]).unwrap_err();
        assert!(
            err.to_string().contains("is not a valid catalog number"),
            "{err}",
        );
    }

    #[test]
    fn test_invalid_isrc_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             ISRC 123\n",
            &[],
        )
        .unwrap_err();

        assert!(err.to_string().contains("is not a valid ISRC number"), "{err}");
    }

    #[test]
    fn test_unknown_command_fails() {
        let err = parse_str("BOGUS param\n", &[]).unwrap_err();
        assert_eq!(err.to_string(), "line 1: unknown command 'BOGUS'");
    }

    #[test]
    fn test_parameter_count_mismatch_fails() {
        let err = parse_str("CATALOG\n", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: command CATALOG: received 0 parameters but 1 expected",
        );

        let err = parse_str("FILE \"a.wav\" WAVE extra\n", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: command FILE: received 3 parameters but 2 expected",
        );
    }

    #[test]
    fn test_unknown_file_type_fails() {
        let err = parse_str("FILE \"a.ogg\" OGG\n", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 1: failed to parse FILE command: unknown file type: OGG",
        );
    }

    #[test]
    fn test_unknown_flag_fails() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             FLAGS DCP BOGUS\n",
            &[],
        )
        .unwrap_err();

        assert!(err.to_string().contains("unknown track flag: BOGUS"), "{err}");
    }

    #[test]
    fn test_blank_lines_do_not_count() {
        let err = parse_str(
            "\n\nFILE \"a.wav\" WAVE\n\n\nBOGUS\n",
            &[],
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "line 2: unknown command 'BOGUS'");
    }

    #[test]
    fn test_syntax_error_carries_line() {
        let err = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             TITLE bro\"ken\n",
            &[],
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "line 3: unexpected quotation character");
    }

    #[test]
    fn test_text_fields_truncate_to_80_chars() {
        let long = "x".repeat(90);
        let sheet = parse_str(&format!("TITLE \"{long}\"\n"), &[]).unwrap();
        assert_eq!(sheet.title.as_deref(), Some(&long[..80]));
    }

    #[test]
    fn test_disc_vs_track_scoping() {
        let sheet = parse_str(
            "TITLE \"Disc Title\"\n\
             FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             TITLE \"Track Title\"\n\
             INDEX 01 00:00:00\n",
            &[],
        )
        .unwrap();

        assert_eq!(sheet.title.as_deref(), Some("Disc Title"));
        assert_eq!(sheet.files[0].tracks[0].title.as_deref(), Some("Track Title"));
    }

    #[test]
    fn test_rem_without_params() {
        // REM is variadic; a bare REM records an empty comment.
        let sheet = parse_str("REM\n", &[]).unwrap();
        assert_eq!(sheet.comments, vec!["".to_string()]);
    }

    #[test]
    fn test_lenient_first_index_time() {
        // A file's first index doesn't have to start at 00:00:00.
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\n\
             TRACK 01 AUDIO\n\
             INDEX 01 00:05:00\n",
            &[],
        )
        .unwrap();

        assert_eq!(sheet.files[0].tracks[0].start_position, 5.0);
    }

    #[tokio::test]
    async fn test_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.cue");
        tokio::fs::write(
            &path,
            "FILE \"test.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00\n",
        )
        .await
        .unwrap();

        let sheet = parse_file(&path, &[240.0]).await.unwrap();
        assert_eq!(sheet.files[0].duration, 240.0);
        assert_eq!(sheet.files[0].tracks[0].end_position, 240.0);
    }
}

use crate::cue::error::SemanticError;
use crate::cue::models::{File, FileType, Index, Sheet, TimeCode, Track, TrackDataType, TrackFlag};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Maximum length of CD-TEXT fields (TITLE, PERFORMER, SONGWRITER).
const TEXT_FIELD_LIMIT: usize = 80;

type Handler = fn(&[String], &mut Sheet) -> Result<(), SemanticError>;

pub(super) struct CommandDescriptor {
    /// Expected parameter count; `None` accepts zero or more.
    pub params: Option<usize>,
    pub handler: Handler,
}

lazy_static! {
    static ref COMMANDS: HashMap<&'static str, CommandDescriptor> = {
        let entries: [(&'static str, Option<usize>, Handler); 13] = [
            ("CATALOG", Some(1), parse_catalog),
            ("CDTEXTFILE", Some(1), parse_cd_text_file),
            ("FILE", Some(2), parse_file),
            ("FLAGS", None, parse_flags),
            ("INDEX", Some(2), parse_index),
            ("ISRC", Some(1), parse_isrc),
            ("PERFORMER", Some(1), parse_performer),
            ("POSTGAP", Some(1), parse_postgap),
            ("PREGAP", Some(1), parse_pregap),
            ("REM", None, parse_rem),
            ("SONGWRITER", Some(1), parse_songwriter),
            ("TITLE", Some(1), parse_title),
            ("TRACK", Some(2), parse_track),
        ];

        entries
            .into_iter()
            .map(|(name, params, handler)| (name, CommandDescriptor { params, handler }))
            .collect()
    };
}

pub(super) fn lookup(command: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.get(command)
}

/// CATALOG command: disc media catalog number, exactly 13 decimal digits.
fn parse_catalog(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[0-9]{13}$").unwrap();
    }

    let number = &params[0];
    if !RE.is_match(number) {
        return Err(SemanticError::InvalidCatalog(number.clone()));
    }

    sheet.catalog = Some(number.clone());
    Ok(())
}

/// CDTEXTFILE command: any string is accepted.
fn parse_cd_text_file(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    sheet.cd_text_file = Some(params[0].clone());
    Ok(())
}

/// FILE command: appends a new file.
/// params[0] -- file name, params[1] -- file type.
fn parse_file(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let file_type = params[1].parse::<FileType>()?;
    sheet.files.push(File::new(params[0].clone(), file_type));
    Ok(())
}

/// FLAGS command: appends each flag to the current track.
fn parse_flags(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let track = current_track(sheet).ok_or(SemanticError::NoCurrentTrack("FLAGS"))?;

    for param in params {
        track.flags.push(param.parse::<TrackFlag>()?);
    }

    Ok(())
}

/// INDEX command: appends a time marker to the current track.
/// params[0] -- index number, params[1] -- mm:ss:ff start time.
fn parse_index(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let time = TimeCode::parse(&params[1]).map_err(SemanticError::IndexTime)?;

    let number = params[0]
        .parse::<u32>()
        .map_err(SemanticError::InvalidIndexNumber)?;

    // All index numbers must be between 0 and 99 inclusive.
    if number > 99 {
        return Err(SemanticError::IndexNumberRange);
    }

    let track = current_track(sheet).ok_or(SemanticError::NoCurrentTrack("INDEX"))?;

    match track.indexes.last() {
        // The first index of a track must be numbered 0 or 1.
        None => {
            if number >= 2 {
                return Err(SemanticError::FirstIndexNumber);
            }
        }
        // All following indexes are sequential to the first one.
        Some(last) => {
            let expected = last.number + 1;
            if expected != number {
                return Err(SemanticError::IndexNotSequential {
                    expected,
                    received: number,
                });
            }
        }
    }

    track.indexes.push(Index { number, time });

    Ok(())
}

/// ISRC command: must appear before any INDEX of the track.
fn parse_isrc(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[0-9a-zA-Z]{5}[0-9]{7}$").unwrap();
    }

    let track = current_track(sheet).ok_or(SemanticError::NoCurrentTrack("ISRC"))?;

    if !track.indexes.is_empty() {
        return Err(SemanticError::IsrcAfterIndex);
    }

    let isrc = &params[0];
    if !RE.is_match(isrc) {
        return Err(SemanticError::InvalidIsrc(isrc.clone()));
    }

    track.isrc = Some(isrc.clone());

    Ok(())
}

/// PERFORMER command: applies to the current track, or to the disc when
/// no track has been started yet.
fn parse_performer(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let performer = truncate(&params[0], TEXT_FIELD_LIMIT);

    match current_track(sheet) {
        Some(track) => track.performer = Some(performer),
        None => sheet.performer = Some(performer),
    }

    Ok(())
}

/// POSTGAP command: sets the current track's postgap length.
fn parse_postgap(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let track = current_track(sheet).ok_or(SemanticError::NoCurrentTrack("POSTGAP"))?;
    track.postgap = Some(TimeCode::parse(&params[0]).map_err(SemanticError::PostgapTime)?);
    Ok(())
}

/// PREGAP command: must appear before any INDEX of the track.
fn parse_pregap(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let track = current_track(sheet).ok_or(SemanticError::NoCurrentTrack("PREGAP"))?;

    if !track.indexes.is_empty() {
        return Err(SemanticError::PregapAfterIndex);
    }

    track.pregap = Some(TimeCode::parse(&params[0]).map_err(SemanticError::PregapTime)?);

    Ok(())
}

/// REM command: keeps the comment text.
fn parse_rem(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    sheet.comments.push(params.join(" "));
    Ok(())
}

/// SONGWRITER command: disc- or track-level, like PERFORMER.
fn parse_songwriter(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let songwriter = truncate(&params[0], TEXT_FIELD_LIMIT);

    match current_track(sheet) {
        Some(track) => track.songwriter = Some(songwriter),
        None => sheet.songwriter = Some(songwriter),
    }

    Ok(())
}

/// TITLE command: disc- or track-level, like PERFORMER.
fn parse_title(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let title = truncate(&params[0], TEXT_FIELD_LIMIT);

    match current_track(sheet) {
        Some(track) => track.title = Some(title),
        None => sheet.title = Some(title),
    }

    Ok(())
}

/// TRACK command: appends a new track to the current file.
/// params[0] -- track number, params[1] -- track datatype.
fn parse_track(params: &[String], sheet: &mut Sheet) -> Result<(), SemanticError> {
    let number = params[0]
        .parse::<u32>()
        .map_err(SemanticError::InvalidTrackNumber)?;
    if number < 1 {
        return Err(SemanticError::TrackNumberRange);
    }

    let data_type = params[1].parse::<TrackDataType>()?;

    let Some(file) = sheet.files.last_mut() else {
        return Err(SemanticError::NoCurrentFile);
    };

    // Track numbers are sequential within the file, starting at 1.
    let expected = match file.tracks.last() {
        Some(last) => last.number + 1,
        None => 1,
    };
    if number != expected {
        return Err(SemanticError::TrackNotSequential {
            expected,
            received: number,
        });
    }

    file.tracks.push(Track::new(number, data_type));

    Ok(())
}

/// The current track is the last track of the last file, started by the
/// most recent TRACK command.
fn current_track(sheet: &mut Sheet) -> Option<&mut Track> {
    sheet.files.last_mut()?.tracks.last_mut()
}

/// Truncates to at most `limit` characters, keeping character boundaries.
fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

use crate::cue::error::{SemanticError, TimeCodeError};
use serde::Serialize;
use std::str::FromStr;

pub const FRAMES_PER_SECOND: u32 = 75;

/// Cue sheet file representation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sheet {
    /// Disc's media catalog number.
    pub catalog: Option<String>,
    /// Name of a performer for a CD-TEXT enhanced disc.
    pub performer: Option<String>,
    /// Title for a CD-TEXT enhanced disc.
    pub title: Option<String>,
    /// Songwriter for the disc.
    pub songwriter: Option<String>,
    /// Comments (REM lines) in declaration order.
    pub comments: Vec<String>,
    /// Name of the file that contains the encoded CD-TEXT information.
    pub cd_text_file: Option<String>,
    /// Data/audio files described by the cue sheet.
    pub files: Vec<File>,
}

/// One physical audio/data file described by a FILE command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct File {
    /// Name (path) of the file.
    pub name: String,
    /// Type of the file.
    pub file_type: FileType,
    /// Tracks laid out inside this file.
    pub tracks: Vec<Track>,
    /// Length of the file in seconds, supplied by the caller after parse.
    pub duration: f64,
}

impl File {
    pub fn new(name: String, file_type: FileType) -> Self {
        Self {
            name,
            file_type,
            tracks: Vec::new(),
            duration: 0.0,
        }
    }
}

/// One logical track inside a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Track number (1-99), sequential within the file.
    pub number: u32,
    /// Track datatype.
    pub data_type: TrackDataType,
    /// Track title, at most 80 characters.
    pub title: Option<String>,
    /// Track performer, at most 80 characters.
    pub performer: Option<String>,
    /// Track songwriter, at most 80 characters.
    pub songwriter: Option<String>,
    /// Decode flags from FLAGS commands, in declaration order.
    pub flags: Vec<TrackFlag>,
    /// International Standard Recording Code.
    pub isrc: Option<String>,
    /// Track indexes, contiguous ascending numbers.
    pub indexes: Vec<Index>,
    /// Length of the track pregap.
    pub pregap: Option<TimeCode>,
    /// Length of the track postgap.
    pub postgap: Option<TimeCode>,
    /// Absolute start offset within the file, seconds. Filled by the
    /// position resolver after parse.
    pub start_position: f64,
    /// Absolute end offset within the file, seconds. Filled by the
    /// position resolver after parse.
    pub end_position: f64,
}

impl Track {
    pub fn new(number: u32, data_type: TrackDataType) -> Self {
        Self {
            number,
            data_type,
            title: None,
            performer: None,
            songwriter: None,
            flags: Vec::new(),
            isrc: None,
            indexes: Vec::new(),
            pregap: None,
            postgap: None,
            start_position: 0.0,
            end_position: 0.0,
        }
    }

    /// Time of the track's first index. A track without indexes yields
    /// the zero time code.
    pub fn start_time(&self) -> TimeCode {
        self.indexes
            .first()
            .map(|index| index.time)
            .unwrap_or_default()
    }
}

/// A named time marker within a track. Index 0 conventionally marks the
/// pregap start, index 1 the audible start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Index {
    pub number: u32,
    pub time: TimeCode,
}

/// `mm:ss:ff` time point, 75 frames per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeCode {
    pub min: u32,
    pub sec: u32,
    pub frames: u32,
}

impl TimeCode {
    pub fn new(min: u32, sec: u32, frames: u32) -> Self {
        Self { min, sec, frames }
    }

    /// Parses a `mm:ss:ff` string. Seconds are capped at 59, frames at 74.
    pub fn parse(input: &str) -> Result<Self, TimeCodeError> {
        let mut parts = input.split(':');
        let (Some(min), Some(sec), Some(frames), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeCodeError::Format);
        };

        let min = min.parse::<u32>().map_err(TimeCodeError::Minutes)?;

        let sec = sec.parse::<u32>().map_err(TimeCodeError::Seconds)?;
        if sec > 59 {
            return Err(TimeCodeError::SecondsRange);
        }

        let frames = frames.parse::<u32>().map_err(TimeCodeError::Frames)?;
        if frames > FRAMES_PER_SECOND - 1 {
            return Err(TimeCodeError::FramesRange);
        }

        Ok(Self { min, sec, frames })
    }

    /// Length in seconds. Computed in f64; the mm:ss:ff format does not
    /// bound minutes.
    pub fn seconds(&self) -> f64 {
        f64::from(self.min) * 60.0
            + f64::from(self.sec)
            + f64::from(self.frames) / f64::from(FRAMES_PER_SECOND)
    }
}

/// Type of a FILE command's file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileType {
    /// Intel binary file (least significant byte first).
    Binary,
    /// Motorola binary file (most significant byte first).
    Motorola,
    /// Audio AIFF file.
    Aiff,
    /// Audio WAVE file.
    Wave,
    /// Audio MP3 file.
    Mp3,
}

impl FromStr for FileType {
    type Err = SemanticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BINARY" => Ok(Self::Binary),
            "MOTOROLA" => Ok(Self::Motorola),
            "AIFF" => Ok(Self::Aiff),
            "WAVE" => Ok(Self::Wave),
            "MP3" => Ok(Self::Mp3),
            _ => Err(SemanticError::UnknownFileType(s.to_string())),
        }
    }
}

/// Track datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackDataType {
    /// AUDIO - Audio/Music (2352).
    Audio,
    /// CDG - Karaoke CD+G (2448).
    Cdg,
    /// MODE1/2048 - CDROM Mode1 Data (cooked).
    Mode1_2048,
    /// MODE1/2352 - CDROM Mode1 Data (raw).
    Mode1_2352,
    /// MODE2/2336 - CDROM-XA Mode2 Data.
    Mode2_2336,
    /// MODE2/2352 - CDROM-XA Mode2 Data.
    Mode2_2352,
    /// CDI/2336 - CDI Mode2 Data.
    Cdi2336,
    /// CDI/2352 - CDI Mode2 Data.
    Cdi2352,
}

impl FromStr for TrackDataType {
    type Err = SemanticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUDIO" => Ok(Self::Audio),
            "CDG" => Ok(Self::Cdg),
            "MODE1/2048" => Ok(Self::Mode1_2048),
            "MODE1/2352" => Ok(Self::Mode1_2352),
            "MODE2/2336" => Ok(Self::Mode2_2336),
            "MODE2/2352" => Ok(Self::Mode2_2352),
            "CDI/2336" => Ok(Self::Cdi2336),
            "CDI/2352" => Ok(Self::Cdi2352),
            _ => Err(SemanticError::UnknownDataType(s.to_string())),
        }
    }
}

/// Additional decode information about a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrackFlag {
    /// Digital copy permitted.
    Dcp,
    /// Four channel audio.
    FourCh,
    /// Pre-emphasis enabled (audio tracks only).
    Pre,
    /// Serial copy management system (not supported by all recorders).
    Scms,
}

impl FromStr for TrackFlag {
    type Err = SemanticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DCP" => Ok(Self::Dcp),
            "4CH" => Ok(Self::FourCh),
            "PRE" => Ok(Self::Pre),
            "SCMS" => Ok(Self::Scms),
            _ => Err(SemanticError::UnknownTrackFlag(s.to_string())),
        }
    }
}

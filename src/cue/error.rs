use std::num::ParseIntError;
use std::result;
use thiserror::Error;

/// Top-level parse error. Every variant except `IoError` carries the
/// 1-based number of the offending line, counting non-blank lines only.
#[derive(Error, Debug)]
pub enum CueError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Syntax { line: usize, source: SyntaxError },

    #[error("line {line}: unknown command '{command}'")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: command {command}: received {received} parameters but {expected} expected")]
    ParameterCount {
        line: usize,
        command: String,
        received: usize,
        expected: usize,
    },

    #[error("line {line}: failed to parse {command} command: {source}")]
    Command {
        line: usize,
        command: String,
        source: SemanticError,
    },
}

/// Malformed quoting or escaping inside a single line.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unexpected quotation character")]
    UnexpectedQuote,

    #[error("unfinished escape sequence")]
    UnfinishedEscape,
}

/// A command handler precondition violation.
#[derive(Error, Debug)]
pub enum SemanticError {
    #[error("{0} is not a valid catalog number")]
    InvalidCatalog(String),

    #[error("unknown file type: {0}")]
    UnknownFileType(String),

    #[error("unknown track flag: {0}")]
    UnknownTrackFlag(String),

    #[error("unknown track datatype: {0}")]
    UnknownDataType(String),

    #[error("TRACK command should appear before {0} command")]
    NoCurrentTrack(&'static str),

    #[error("unexpected TRACK command, FILE command expected first")]
    NoCurrentFile,

    #[error("failed to parse index number: {0}")]
    InvalidIndexNumber(ParseIntError),

    #[error("index number should be in 0..99 interval")]
    IndexNumberRange,

    #[error("first track index should have 0 or 1 index number")]
    FirstIndexNumber,

    #[error("expected index number {expected} but {received} received")]
    IndexNotSequential { expected: u32, received: u32 },

    #[error("ISRC command must be specified before INDEX command")]
    IsrcAfterIndex,

    #[error("{0} is not a valid ISRC number")]
    InvalidIsrc(String),

    #[error("PREGAP command must appear before any INDEX command")]
    PregapAfterIndex,

    #[error("failed to parse index start time: {0}")]
    IndexTime(TimeCodeError),

    #[error("failed to parse pregap time: {0}")]
    PregapTime(TimeCodeError),

    #[error("failed to parse postgap time: {0}")]
    PostgapTime(TimeCodeError),

    #[error("failed to parse track number parameter: {0}")]
    InvalidTrackNumber(ParseIntError),

    #[error("track number should be in 1..99 range")]
    TrackNumberRange,

    #[error("expected track number {expected}, but {received} received")]
    TrackNotSequential { expected: u32, received: u32 },
}

/// Malformed `mm:ss:ff` time code.
#[derive(Error, Debug)]
pub enum TimeCodeError {
    #[error("illegal time format, mm:ss:ff should be")]
    Format,

    #[error("failed to parse minutes: {0}")]
    Minutes(ParseIntError),

    #[error("failed to parse seconds: {0}")]
    Seconds(ParseIntError),

    #[error("seconds value can't be more than 59")]
    SecondsRange,

    #[error("failed to parse frames: {0}")]
    Frames(ParseIntError),

    #[error("frames value can't be more than 74")]
    FramesRange,
}

pub type CueResult<T> = result::Result<T, CueError>;

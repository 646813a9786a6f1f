use crate::cue::error::SyntaxError;

/// Splits one line into the command name and its parameters:
/// the first word is the command, everything after it is parameters.
/// A parameter containing whitespace must be wrapped in `'` or `"`.
pub(super) fn parse_command(line: &str) -> Result<(String, Vec<String>), SyntaxError> {
    let line = line.trim();

    // A command with no parameters at all.
    let Some(split) = line.find(char::is_whitespace) else {
        return Ok((line.to_string(), Vec::new()));
    };
    let command = line[..split].to_string();
    let rest = line[split..].trim_start();

    let mut params = Vec::new();
    let mut param = String::new();
    // The quote character we are inside of, if any.
    let mut quoted: Option<char> = None;
    let mut chars = rest.chars().peekable();

    while let Some(c) = chars.next() {
        match quoted {
            None if c == '\'' || c == '"' => {
                // A quote can open only at the beginning of a parameter,
                // not in the middle.
                if !param.is_empty() {
                    return Err(SyntaxError::UnexpectedQuote);
                }
                quoted = Some(c);
            }
            None if c.is_whitespace() => {
                // Whitespace outside quotes starts a new parameter, but
                // empty parameters are not kept.
                if !param.is_empty() {
                    params.push(std::mem::take(&mut param));
                }
            }
            Some(q) if c == q => quoted = None,
            _ if c == '\\' => match chars.peek().copied() {
                None => return Err(SyntaxError::UnfinishedEscape),
                Some(next) => match unescape(next) {
                    Some(resolved) => {
                        param.push(resolved);
                        chars.next();
                    }
                    // Unknown sequences keep the backslash literally.
                    None => param.push('\\'),
                },
            },
            _ => param.push(c),
        }
    }

    // The final in-progress parameter is always kept, even when empty.
    params.push(param);

    Ok((command, params))
}

/// Resolves the character following a backslash, or `None` when the
/// two-character sequence is not a recognized escape.
fn unescape(c: char) -> Option<char> {
    match c {
        '"' => Some('"'),
        '\'' => Some('\''),
        '\\' => Some('\\'),
        'n' => Some('\n'),
        't' => Some('\t'),
        _ => None,
    }
}

//! Built-in checks that need no validator program.

/// Strict format check applied to inputs and answers.
///
/// Text must be non-empty and end in a newline. Carriage returns, leading or
/// trailing blanks on a line, and empty lines at the end are all rejected.
pub fn check_text(bytes: &[u8]) -> Result<(), String> {
    if bytes.is_empty() {
        return Err("file is empty".to_string());
    }
    if bytes.contains(&b'\r') {
        return Err("contains a carriage return".to_string());
    }
    if bytes.last() != Some(&b'\n') {
        return Err("does not end with a newline".to_string());
    }
    if bytes == b"\n" || bytes.ends_with(b"\n\n") {
        return Err("ends with an empty line".to_string());
    }

    let body = &bytes[..bytes.len() - 1];
    for (index, line) in body.split(|b| *b == b'\n').enumerate() {
        let blank = |b: &u8| *b == b' ' || *b == b'\t';
        if line.first().map(blank).unwrap_or(false) {
            return Err(format!("line {} starts with whitespace", index + 1));
        }
        if line.last().map(blank).unwrap_or(false) {
            return Err(format!("line {} ends with whitespace", index + 1));
        }
    }
    Ok(())
}

/// Default output checker: compares whitespace-separated tokens.
pub fn tokens_match(answer: &[u8], output: &[u8]) -> Result<(), String> {
    let answer = String::from_utf8_lossy(answer);
    let output = String::from_utf8_lossy(output);
    let mut expected = answer.split_whitespace();
    let mut actual = output.split_whitespace();
    let mut position = 1usize;
    loop {
        match (expected.next(), actual.next()) {
            (None, None) => return Ok(()),
            (Some(want), Some(got)) if want == got => position += 1,
            (Some(want), Some(got)) => {
                return Err(format!(
                    "token {} differs: expected '{}', got '{}'",
                    position, want, got
                ))
            }
            (Some(want), None) => {
                return Err(format!("output ends early: expected '{}' at token {}", want, position))
            }
            (None, Some(got)) => {
                return Err(format!("trailing output '{}' at token {}", got, position))
            }
        }
    }
}

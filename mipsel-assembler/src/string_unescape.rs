#[derive(Debug)]
pub enum UnescapeError {
    TrailingBackslash,
}

/// Convert escape sequences into their raw values. `\n`, `\t`, `\\`,
/// `\"`, and `\0` have their usual meanings; any other escaped character
/// stands for itself.
pub fn unescape_str(s: &str) -> Result<String, UnescapeError> {
    let mut chars = s.chars();
    let mut result = String::with_capacity(s.len());

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('\"') => result.push('\"'),
            Some('0') => result.push('\0'),
            Some(c) => result.push(c),
            None => return Err(UnescapeError::TrailingBackslash),
        }
    }

    Ok(result)
}

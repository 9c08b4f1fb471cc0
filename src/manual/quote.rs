// src/manual/quote.rs

//! POSIX shell quoting for replayable command lines.

/// Quote one word so `sh` reads it back verbatim.
///
/// Words made only of "safe" characters are left alone so the script stays
/// readable; everything else is single-quoted.
pub fn shell_quote(word: &str) -> String {
    if !word.is_empty()
        && word
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_.:/%+=,@".contains(ch))
    {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\"'\"'"))
    }
}

/// Join `argv` into a single shell command line.
pub fn shell_join<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|w| shell_quote(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_words_pass_through() {
        assert_eq!(shell_quote("https://example.com:443/a?"), "'https://example.com:443/a?'");
        assert_eq!(shell_quote("-d"), "-d");
        assert_eq!(shell_quote("example.com"), "example.com");
    }

    #[test]
    fn awkward_words_are_single_quoted() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
        assert_eq!(shell_quote("$(rm -rf /)"), "'$(rm -rf /)'");
    }

    #[test]
    fn join_quotes_each_word() {
        assert_eq!(
            shell_join(&["nmap", "-p", "1-1000", "host name"]),
            "nmap -p 1-1000 'host name'"
        );
    }
}

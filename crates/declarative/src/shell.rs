//! Shell quoting for generated commands

/// Quote a token so a POSIX shell reads it back as one literal word.
///
/// Tokens made only of safe characters are returned bare, everything else
/// is wrapped in single quotes.
pub fn quote(token: &str) -> String {
    if token.is_empty() {
        return "''".to_string();
    }

    if token.chars().all(is_safe) {
        return token.to_string();
    }

    format!("'{}'", token.replace('\'', r#"'"'"'"#))
}

/// Quote each token and join them with spaces
pub fn join<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| quote(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '@' | '%' | '+' | '=' | ':' | ',' | '.' | '/' | '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_safe_tokens_bare() {
        assert_eq!(quote("vim"), "vim");
        assert_eq!(quote("foo=1.2"), "foo=1.2");
        assert_eq!(quote("python3-pip@22.0"), "python3-pip@22.0");
        assert_eq!(quote("/tmp/a.rpm"), "/tmp/a.rpm");
    }

    #[test]
    fn test_quote_unsafe_tokens() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("foo bar"), "'foo bar'");
        assert_eq!(quote("pkg>=1"), "'pkg>=1'");
        assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
    }

    #[test]
    fn test_join() {
        assert_eq!(join(["a", "b c"]), "a 'b c'");
        assert_eq!(join(Vec::<String>::new()), "");
    }
}

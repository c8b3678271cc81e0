//! Mapping from stdin lines to key tokens.

use folio_types::input::Key;

/// What one line of driver input asks for.
#[derive(Debug, PartialEq)]
pub enum Step {
    /// Key tokens to feed to the engine, in order.
    Keys(Vec<String>),
    /// Advance the frame clock by this many seconds.
    Wait(f32),
}

/// Interpret one stdin line.
///
/// A literal key token (`Enter`, `Escape`, `ArrowUp`, ...) sends that key.
/// `@wait <seconds>` advances time. Anything else is typed one character
/// at a time and followed by Enter.
pub fn parse_line(line: &str) -> Step {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(secs) = line.strip_prefix("@wait ") {
        if let Ok(secs) = secs.trim().parse::<f32>() {
            return Step::Wait(secs.max(0.0));
        }
    }
    if line.chars().count() > 1 && Key::parse(line).is_some() {
        return Step::Keys(vec![line.to_string()]);
    }
    let mut tokens: Vec<String> = line.chars().map(String::from).collect();
    tokens.push("Enter".to_string());
    Step::Keys(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(line: &str) -> Vec<String> {
        match parse_line(line) {
            Step::Keys(keys) => keys,
            other => panic!("expected keys, got {other:?}"),
        }
    }

    #[test]
    fn literal_tokens_pass_through() {
        assert_eq!(keys("Escape"), vec!["Escape"]);
        assert_eq!(keys("ArrowUp\r"), vec!["ArrowUp"]);
    }

    #[test]
    fn text_is_typed_then_entered() {
        assert_eq!(keys("ls -a"), vec!["l", "s", " ", "-", "a", "Enter"]);
        assert_eq!(keys(""), vec!["Enter"]);
        // A single character is typed, not treated as a key name.
        assert_eq!(keys("q"), vec!["q", "Enter"]);
    }

    #[test]
    fn wait_advances_time() {
        assert_eq!(parse_line("@wait 0.5"), Step::Wait(0.5));
        assert_eq!(parse_line("@wait -1"), Step::Wait(0.0));
        assert_eq!(keys("@wait soon").last().map(String::as_str), Some("Enter"));
    }
}

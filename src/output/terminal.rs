//! Terminal colors and message markers

pub mod colors {
    pub const GREY: u8 = 102;      // #7D7D7D - Punctuation, secondary
    pub const AQUA: u8 = 109;      // #7A9EB5 - Numbers, info
    pub const ORANGE: u8 = 208;    // #F2913D - Warnings, PUT
    pub const RED: u8 = 167;       // #E34F45 - Errors, DELETE
    pub const BLUE: u8 = 68;       // #426BD1 - Status, labels
    pub const GREEN: u8 = 71;      // #63C27A - Success, GET
    pub const YELLOW: u8 = 185;    // #CCCC3D - POST, redirects
}

/// ANSI escape code constants
pub const RESET: &str = "\x1b[0m";
pub const UNDERLINE: &str = "\x1b[4m";

/// Generate foreground color escape code
#[inline]
pub fn fg(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

/// Generate bold foreground color escape code
#[inline]
pub fn bold_fg(color: u8) -> String {
    format!("\x1b[1;38;5;{}m", color)
}

/// Colorize text with a foreground color
#[inline]
pub fn colorize(text: &str, color: u8) -> String {
    format!("{}{}{}", fg(color), text, RESET)
}

/// Colorize text with bold foreground color
#[inline]
pub fn bold(text: &str, color: u8) -> String {
    format!("{}{}{}", bold_fg(color), text, RESET)
}

/// `[-]` prefix of error lines
pub fn error_marker() -> String {
    bold("[-]", colors::RED)
}

/// `[*]` prefix of status lines
pub fn status_marker() -> String {
    bold("[*]", colors::BLUE)
}

/// `[+]` prefix of success lines
pub fn success_marker() -> String {
    bold("[+]", colors::GREEN)
}

/// Highlight every occurrence of `word` in `text`
pub fn highlight(text: &str, word: &str) -> String {
    if word.is_empty() {
        return text.to_string();
    }
    text.replace(word, &colorize(word, colors::RED))
}

/// HTTP status code color
pub fn http_status(code: u16) -> String {
    let color = match code / 100 {
        1 => colors::AQUA,   // Informational
        2 => colors::GREEN,  // Success
        3 => colors::YELLOW, // Redirect
        4 => colors::ORANGE, // Client error
        5 => colors::RED,    // Server error
        _ => colors::GREY,
    };
    bold_fg(color)
}

/// HTTP method color
pub fn http_method(method: &str) -> String {
    let color = match method.to_uppercase().as_str() {
        "GET" => colors::GREEN,
        "POST" => colors::YELLOW,
        "PUT" => colors::ORANGE,
        "DELETE" => colors::RED,
        _ => colors::GREY,
    };
    bold_fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fg_color() {
        assert_eq!(fg(71), "\x1b[38;5;71m");
    }

    #[test]
    fn test_colorize() {
        let result = colorize("test", colors::GREEN);
        assert!(result.contains("38;5;71m"));
        assert!(result.contains("test"));
        assert!(result.ends_with(RESET));
    }

    #[test]
    fn test_markers() {
        assert!(error_marker().contains("[-]"));
        assert!(error_marker().contains("1;38;5;167m"));
        assert!(success_marker().contains("[+]"));
        assert!(status_marker().contains("[*]"));
    }

    #[test]
    fn test_highlight() {
        let out = highlight("request/post", "post");
        assert!(out.starts_with("request/"));
        assert!(out.contains("38;5;167mpost"));
        assert_eq!(highlight("abc", ""), "abc");
    }
}

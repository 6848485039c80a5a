//! yt-dlp error analysis
//!
//! Classifies yt-dlp stderr so the extraction path can tell a rejected video
//! (too large, private, removed) from an infrastructure failure.

/// yt-dlp error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YtDlpErrorType {
    /// No format fits under the size ceiling
    TooLarge,
    /// Video is private, removed, geo-blocked or needs a login
    VideoUnavailable,
    /// Network problems (timeouts, connection resets, DNS)
    NetworkError,
    /// Unrecognised error
    Unknown,
}

impl YtDlpErrorType {
    /// Whether the user gets the "too large, private or removed" answer.
    ///
    /// Network trouble is ours, not the video's, so it is reported as a failure instead.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, YtDlpErrorType::NetworkError)
    }
}

/// Analyzes yt-dlp stderr and determines the error type
pub fn analyze_ytdlp_error(stderr: &str) -> YtDlpErrorType {
    let stderr_lower = stderr.to_lowercase();

    if stderr_lower.contains("requested format is not available")
        || stderr_lower.contains("larger than max-filesize")
        || stderr_lower.contains("file is larger than")
    {
        return YtDlpErrorType::TooLarge;
    }

    if stderr_lower.contains("private video")
        || stderr_lower.contains("video unavailable")
        || stderr_lower.contains("this video is not available")
        || stderr_lower.contains("video is private")
        || stderr_lower.contains("video has been removed")
        || stderr_lower.contains("this video does not exist")
        || stderr_lower.contains("video is not available")
        || stderr_lower.contains("login required")
        || stderr_lower.contains("http error 404")
    {
        return YtDlpErrorType::VideoUnavailable;
    }

    if stderr_lower.contains("timed out")
        || stderr_lower.contains("connection")
        || stderr_lower.contains("network")
        || stderr_lower.contains("socket")
        || stderr_lower.contains("dns")
        || stderr_lower.contains("failed to connect")
    {
        return YtDlpErrorType::NetworkError;
    }

    YtDlpErrorType::Unknown
}

/// Last `ERROR:` line of the output, or its last non-empty line.
pub fn summarize(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    lines
        .iter()
        .rev()
        .find(|l| l.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|l| l.to_string())
        .unwrap_or_else(|| "yt-dlp exited without output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_video() {
        let stderr = "ERROR: [youtube] abc: Private video. Sign in if you've been granted access";
        assert_eq!(analyze_ytdlp_error(stderr), YtDlpErrorType::VideoUnavailable);
        assert!(YtDlpErrorType::VideoUnavailable.is_rejection());
    }

    #[test]
    fn test_format_filter_means_too_large() {
        let stderr = "ERROR: [youtube] abc: Requested format is not available. Use --list-formats";
        assert_eq!(analyze_ytdlp_error(stderr), YtDlpErrorType::TooLarge);
    }

    #[test]
    fn test_network_error_is_not_rejection() {
        let stderr = "ERROR: Unable to download webpage: <urlopen error [Errno -3] Temporary failure in name resolution> (caused by URLError); connection failed";
        let kind = analyze_ytdlp_error(stderr);
        assert_eq!(kind, YtDlpErrorType::NetworkError);
        assert!(!kind.is_rejection());
    }

    #[test]
    fn test_unknown_error() {
        assert_eq!(analyze_ytdlp_error("something odd"), YtDlpErrorType::Unknown);
    }

    #[test]
    fn test_summarize_prefers_error_line() {
        let stderr = "[youtube] abc: Downloading webpage\nERROR: boom\nWARNING: trailing";
        assert_eq!(summarize(stderr), "ERROR: boom");
        assert_eq!(summarize("only line\n"), "only line");
        assert_eq!(summarize(""), "yt-dlp exited without output");
    }
}

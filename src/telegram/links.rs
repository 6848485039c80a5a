//! Link extraction and classification for incoming text messages.

use lazy_regex::regex;
use url::Url;

/// Hosts handed to the generic video extractor
const EXTERNAL_VIDEO_HOSTS: [&str; 4] = ["youtube.com", "youtu.be", "tiktok.com", "instagram.com"];

/// What a link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// `users/<owner>/playlists/<kind>`
    Playlist { owner: String, kind: String },
    /// `album/<id>` without a track part
    Album { id: String },
    /// `album/<album>/track/<id>`
    Track { id: String },
    /// A video on one of the supported external platforms
    ExternalVideo(Url),
    Unsupported,
}

/// First `http(s)://` URL in `text`.
///
/// ```
/// use tunedrop::telegram::links::find_url;
///
/// assert_eq!(find_url("look https://youtu.be/x please"), Some("https://youtu.be/x"));
/// assert_eq!(find_url("no links here"), None);
/// ```
pub fn find_url(text: &str) -> Option<&str> {
    regex!(r"https?://[^\s]+").find(text).map(|m| m.as_str())
}

pub fn classify(url: &str) -> LinkKind {
    if let Some(caps) = regex!(r"users/([^/]+)/playlists/(\d+)").captures(url) {
        return LinkKind::Playlist {
            owner: caps[1].to_string(),
            kind: caps[2].to_string(),
        };
    }

    if !url.contains("/track/") {
        if let Some(caps) = regex!(r"album/(\d+)").captures(url) {
            return LinkKind::Album { id: caps[1].to_string() };
        }
    }

    if let Some(caps) = regex!(r"album/(\d+)/track/(\d+)").captures(url) {
        return LinkKind::Track { id: caps[2].to_string() };
    }

    if EXTERNAL_VIDEO_HOSTS.iter().any(|host| url.contains(host)) {
        if let Ok(parsed) = Url::parse(url) {
            return LinkKind::ExternalVideo(parsed);
        }
    }

    LinkKind::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_playlist() {
        assert_eq!(
            classify("https://music.yandex.ru/users/dj.max/playlists/1003?utm=x"),
            LinkKind::Playlist {
                owner: "dj.max".to_string(),
                kind: "1003".to_string()
            }
        );
    }

    #[test]
    fn test_album_and_track() {
        assert_eq!(
            classify("https://music.yandex.ru/album/555"),
            LinkKind::Album { id: "555".to_string() }
        );
        assert_eq!(
            classify("https://music.yandex.ru/album/555/track/777"),
            LinkKind::Track { id: "777".to_string() }
        );
    }

    #[test]
    fn test_external_video() {
        match classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ") {
            LinkKind::ExternalVideo(url) => assert_eq!(url.host_str(), Some("www.youtube.com")),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(classify("https://youtu.be/abc"), LinkKind::ExternalVideo(_)));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(classify("https://example.com/page"), LinkKind::Unsupported);
        assert_eq!(classify("https://music.yandex.ru/track/777"), LinkKind::Unsupported);
    }

    #[test]
    fn test_find_url_takes_first() {
        assert_eq!(
            find_url("a http://one.example/x and https://two.example/y"),
            Some("http://one.example/x")
        );
    }
}

//! Upload filename handling: classifying a file as movie or episode from its
//! name, and sanitizing names before they touch the filesystem.

use regex::Regex;
use std::sync::LazyLock;

use crate::AppError;

const MAX_FILENAME_LENGTH: usize = 255;

static EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(.*?)s(\d{1,2})e(\d{1,2})").expect("episode marker regex is valid")
});

static RELEASE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("release year regex is valid")
});

/// What a filename says about its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMediaInfo {
    Movie {
        title: String,
        year: Option<i32>,
    },
    Episode {
        show_name: String,
        season: i32,
        episode: i32,
    },
}

/// Classify an uploaded file by its original name.
///
/// `Show.Name.S01E02.mkv` is an episode; anything without an `S<n>E<n>`
/// marker is a movie, with the first 19xx/20xx year token (if any) split off
/// the title.
pub fn parse_media_filename(filename: &str) -> ParsedMediaInfo {
    let clean_name = strip_extension(filename).replace(['.', '_'], " ");

    if let Some(caps) = EPISODE_MARKER.captures(&clean_name) {
        let season = caps[2].parse().unwrap_or(0);
        let episode = caps[3].parse().unwrap_or(0);
        return ParsedMediaInfo::Episode {
            show_name: caps[1].trim().to_string(),
            season,
            episode,
        };
    }

    match RELEASE_YEAR.captures(&clean_name) {
        Some(caps) => {
            let year_match = caps.get(1).map(|m| (m.start(), m.as_str()));
            let (start, year_text) = year_match.unwrap_or((clean_name.len(), ""));
            let title = clean_name[..start].trim();
            // "2012.mkv" has nothing before the year; keep the whole name as title
            let title = if title.is_empty() {
                clean_name.trim()
            } else {
                title
            };
            ParsedMediaInfo::Movie {
                title: title.to_string(),
                year: year_text.parse().ok(),
            }
        }
        None => ParsedMediaInfo::Movie {
            title: clean_name.trim().to_string(),
            year: None,
        },
    }
}

/// Drop the final extension, leaving dot-files (".hidden") untouched.
fn strip_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 && !filename[..idx].ends_with(['/', '\\']) => &filename[..idx],
        _ => filename,
    }
}

/// Reduce an untrusted name to a safe single path component.
///
/// Path separators and whitespace runs become `_`, everything outside
/// `[A-Za-z0-9_.-]` is dropped and leading/trailing dots and underscores are
/// trimmed. Fails when nothing usable is left.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let spaced = filename.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');
    let sanitized: String = trimmed.chars().take(MAX_FILENAME_LENGTH).collect();

    if sanitized.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Filename '{}' contains no usable characters",
            filename
        )));
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_episode_marker() {
        assert_eq!(
            parse_media_filename("MyShow.S01E02.mp4"),
            ParsedMediaInfo::Episode {
                show_name: "MyShow".to_string(),
                season: 1,
                episode: 2,
            }
        );
    }

    #[test]
    fn parses_lowercase_marker_with_underscores() {
        assert_eq!(
            parse_media_filename("the_office_s03e14_720p.mkv"),
            ParsedMediaInfo::Episode {
                show_name: "the office".to_string(),
                season: 3,
                episode: 14,
            }
        );
    }

    #[test]
    fn parses_movie_with_year() {
        assert_eq!(
            parse_media_filename("The.Matrix.1999.1080p.mp4"),
            ParsedMediaInfo::Movie {
                title: "The Matrix".to_string(),
                year: Some(1999),
            }
        );
    }

    #[test]
    fn parses_movie_without_year() {
        assert_eq!(
            parse_media_filename("Home_Video.mov"),
            ParsedMediaInfo::Movie {
                title: "Home Video".to_string(),
                year: None,
            }
        );
    }

    #[test]
    fn year_only_name_keeps_title() {
        assert_eq!(
            parse_media_filename("2012.mkv"),
            ParsedMediaInfo::Movie {
                title: "2012".to_string(),
                year: Some(2012),
            }
        );
    }

    #[test]
    fn sanitize_matches_safe_filename_rules() {
        assert_eq!(sanitize_filename("My Movie (2019).mp4").unwrap(), "My_Movie_2019.mp4");
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "etc_passwd");
        assert_eq!(sanitize_filename("  spaced   out .mkv").unwrap(), "spaced_out_.mkv");
        assert_eq!(
            sanitize_filename("1700000000-Show.S01E01.mp4").unwrap(),
            "1700000000-Show.S01E01.mp4"
        );
    }

    #[test]
    fn sanitize_rejects_empty_result() {
        assert!(sanitize_filename("..").is_err());
        assert!(sanitize_filename("///").is_err());
        assert!(sanitize_filename("ææø").is_err());
    }
}

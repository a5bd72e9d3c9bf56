//! Turns a bare URL into an embed: YouTube player, image, video or link.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::escape::{decode_uri, encode_uri, escape_html};
use crate::render::RenderOptions;
use crate::tokenize::compile;
use crate::urlparts::{UrlParts, query_param};

const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".gif", ".png", ".webp", ".jpeg"];
const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".webm"];

static START_TIME: Lazy<Regex> =
    Lazy::new(|| compile(r"^(?:([0-9]+)h)?(?:([0-9]+)m)?(?:([0-9]+)s?)?$"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Embed {
    YouTube { id: String, start: u64 },
    /// `src` is the normalized URL.
    Image { src: String },
    Video { src: String },
    Link,
}

/// Picks the embed for a URL; first match wins in the order YouTube,
/// image, video. URLs that could not be decomposed are plain links.
pub fn classify(parts: Option<&UrlParts>, options: &RenderOptions) -> Embed {
    let Some(parts) = parts else {
        return Embed::Link;
    };
    if options.embed_youtube {
        if let Some(embed) = youtube(parts) {
            return embed;
        }
    }
    if options.embed_media {
        if has_suffix(&parts.path, IMAGE_SUFFIXES) {
            return Embed::Image {
                src: parts.to_string(),
            };
        }
        if has_suffix(&parts.path, VIDEO_SUFFIXES) {
            return Embed::Video {
                src: parts.to_string(),
            };
        }
    }
    Embed::Link
}

impl Embed {
    /// Renders the embed for `url`, the bare URL as written in the post.
    pub fn render(&self, url: &str, options: &RenderOptions) -> String {
        match self {
            Embed::YouTube { id, start } => {
                let mut player = format!("https://www.youtube.com/embed/{}", id);
                if *start != 0 {
                    player.push_str(&format!("?start={}", start));
                }
                format!(
                    "<iframe width=\"{}\" height=\"{}\" src=\"{}\" allowfullscreen frameborder=\"0\"></iframe>",
                    options.media_width,
                    options.youtube_height,
                    encode_uri(&player)
                )
            }
            Embed::Image { src } => image_markup(src),
            Embed::Video { src } => video_markup(src, options.media_width),
            Embed::Link => {
                // Decoding first keeps existing escapes from being encoded twice.
                let readable = decode_uri(url).unwrap_or_else(|| url.to_string());
                format!(
                    "<a href=\"{}\" target=\"_blank\">{}</a>",
                    encode_uri(&readable),
                    escape_html(&readable)
                )
            }
        }
    }
}

pub fn image_markup(url: &str) -> String {
    format!("<img src=\"{}\" alt=\"\"/>", encode_uri(url))
}

pub fn video_markup(url: &str, width: u32) -> String {
    format!(
        "<video loop=\"\" preload=\"metadata\" controls=\"\" width=\"{}\"><source src=\"{}\" type=\"video/mp4\"></video>",
        width,
        encode_uri(url)
    )
}

fn youtube(parts: &UrlParts) -> Option<Embed> {
    let (id, query) = match parts.host.as_str() {
        "youtube.com" | "www.youtube.com" if parts.path == "/watch" => {
            let query = parts.query.as_deref()?;
            (query_param(query, "v")?, Some(query))
        }
        "youtu.be" => {
            let id = parts.path.strip_prefix('/').unwrap_or(&parts.path);
            (id.to_string(), parts.query.as_deref())
        }
        _ => return None,
    };
    if id.is_empty() {
        return None;
    }
    let start = query
        .and_then(|query| query_param(query, "t"))
        .map(|time| parse_start_time(&time))
        .unwrap_or(0);
    Some(Embed::YouTube { id, start })
}

/// Converts a YouTube `t` value such as `1h2m3s`, `90s` or `90` to seconds.
/// Anything else means "from the beginning".
pub fn parse_start_time(time: &str) -> u64 {
    let Some(captures) = START_TIME.captures(time) else {
        return 0;
    };
    let part = |index: usize| {
        captures
            .get(index)
            .map(|digits| digits.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

fn has_suffix(path: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| path.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::{Embed, classify, parse_start_time};
    use crate::render::RenderOptions;
    use crate::urlparts::{StandardUrls, UrlDecomposer};

    fn classify_url(url: &str) -> Embed {
        classify(
            StandardUrls.decompose(url).as_ref(),
            &RenderOptions::default(),
        )
    }

    #[test]
    fn start_time_formats() {
        assert_eq!(parse_start_time("1m30s"), 90);
        assert_eq!(parse_start_time("1h"), 3600);
        assert_eq!(parse_start_time("1h2m3s"), 3723);
        assert_eq!(parse_start_time("45"), 45);
        assert_eq!(parse_start_time(""), 0);
        assert_eq!(parse_start_time("abc"), 0);
        assert_eq!(parse_start_time("1s2m"), 0);
    }

    #[test]
    fn youtube_watch_and_short_links() {
        assert_eq!(
            classify_url("https://www.youtube.com/watch?v=abc&t=10"),
            Embed::YouTube {
                id: "abc".to_string(),
                start: 10
            }
        );
        assert_eq!(
            classify_url("https://youtu.be/abc123?t=1m30s"),
            Embed::YouTube {
                id: "abc123".to_string(),
                start: 90
            }
        );
    }

    #[test]
    fn youtube_without_video_id_falls_through() {
        assert_eq!(classify_url("https://youtube.com/watch?t=5"), Embed::Link);
        assert_eq!(classify_url("https://youtube.com/watch"), Embed::Link);
        assert_eq!(classify_url("https://youtu.be/"), Embed::Link);
        assert_eq!(classify_url("https://youtube.com/channel/x"), Embed::Link);
    }

    #[test]
    fn media_suffixes_are_case_sensitive() {
        assert_eq!(
            classify_url("http://a.com/pic.jpg?x=1"),
            Embed::Image {
                src: "http://a.com/pic.jpg?x=1".to_string()
            }
        );
        assert_eq!(
            classify_url("http://a.com/clip.webm"),
            Embed::Video {
                src: "http://a.com/clip.webm".to_string()
            }
        );
        assert_eq!(classify_url("http://a.com/pic.JPG"), Embed::Link);
    }

    #[test]
    fn disabled_embeds_become_links() {
        let options = RenderOptions {
            embed_youtube: false,
            embed_media: false,
            ..RenderOptions::default()
        };
        let parts = StandardUrls.decompose("https://youtu.be/abc");
        assert_eq!(classify(parts.as_ref(), &options), Embed::Link);
        let parts = StandardUrls.decompose("http://a.com/pic.png");
        assert_eq!(classify(parts.as_ref(), &options), Embed::Link);
    }

    #[test]
    fn link_text_is_decoded_and_escaped() {
        let html = Embed::Link.render("http://a.com/%D1%8F?q=%22x%22", &RenderOptions::default());
        assert_eq!(
            html,
            "<a href=\"http://a.com/%D1%8F?q=%22x%22\" target=\"_blank\">http://a.com/я?q=&quot;x&quot;</a>"
        );
    }
}

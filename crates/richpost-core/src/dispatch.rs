use crate::tokenize::is_url;
use crate::tree::Element;

/// How a tag name is rendered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TagRule {
    /// Re-emitted by name, attributes dropped.
    Structural,
    Anchor,
    Image,
    Video,
    /// `<irony>`, wrapped in a styled span.
    Spoiler,
    Disallowed,
}

const TAG_TABLE: &[(&str, TagRule)] = &[
    ("a", TagRule::Anchor),
    ("b", TagRule::Structural),
    ("blockquote", TagRule::Structural),
    ("i", TagRule::Structural),
    ("img", TagRule::Image),
    ("irony", TagRule::Spoiler),
    ("strike", TagRule::Structural),
    ("u", TagRule::Structural),
    ("video", TagRule::Video),
];

impl TagRule {
    /// Looks up a lower-case tag name. Unknown names are disallowed.
    pub fn lookup(name: &str) -> TagRule {
        TAG_TABLE
            .binary_search_by(|(tag, _)| (*tag).cmp(name))
            .map(|index| TAG_TABLE[index].1)
            .unwrap_or(TagRule::Disallowed)
    }

    /// Attribute that must hold an absolute URL for the tag to render live.
    pub fn url_attribute(self) -> Option<&'static str> {
        match self {
            TagRule::Anchor => Some("href"),
            TagRule::Image | TagRule::Video => Some("src"),
            TagRule::Structural | TagRule::Spoiler | TagRule::Disallowed => None,
        }
    }
}

/// A tag resolved against the whitelist and its URL validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatch<'a> {
    Structural,
    Anchor { href: &'a str },
    Image { src: &'a str },
    Video { src: &'a str },
    Spoiler,
    Disallowed,
    /// Whitelisted tag whose URL attribute is missing or not a URL.
    Rejected { attribute: &'static str },
}

pub fn dispatch(element: &Element) -> Dispatch<'_> {
    let rule = TagRule::lookup(&element.name);
    let url = match rule.url_attribute() {
        Some(attribute) => {
            let value = element.attrs.get(attribute).unwrap_or("");
            if !is_url(value) {
                return Dispatch::Rejected { attribute };
            }
            value
        }
        None => "",
    };
    match rule {
        TagRule::Structural => Dispatch::Structural,
        TagRule::Anchor => Dispatch::Anchor { href: url },
        TagRule::Image => Dispatch::Image { src: url },
        TagRule::Video => Dispatch::Video { src: url },
        TagRule::Spoiler => Dispatch::Spoiler,
        TagRule::Disallowed => Dispatch::Disallowed,
    }
}

#[cfg(test)]
mod tests {
    use super::{Dispatch, TAG_TABLE, TagRule, dispatch};
    use crate::tree::Element;

    #[test]
    fn table_is_sorted_for_lookup() {
        assert!(TAG_TABLE.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn lookup_covers_whitelist() {
        assert_eq!(TagRule::lookup("blockquote"), TagRule::Structural);
        assert_eq!(TagRule::lookup("irony"), TagRule::Spoiler);
        assert_eq!(TagRule::lookup("video"), TagRule::Video);
        assert_eq!(TagRule::lookup("script"), TagRule::Disallowed);
        assert_eq!(TagRule::lookup("constructor"), TagRule::Disallowed);
    }

    #[test]
    fn url_tags_are_validated() {
        let good = Element::new("a").attr("href", "https://a.com/x");
        assert_eq!(
            dispatch(&good),
            Dispatch::Anchor {
                href: "https://a.com/x"
            }
        );

        let script = Element::new("a").attr("href", "javascript:alert(1)");
        assert_eq!(dispatch(&script), Dispatch::Rejected { attribute: "href" });

        let missing = Element::new("img");
        assert_eq!(dispatch(&missing), Dispatch::Rejected { attribute: "src" });
    }

    #[test]
    fn attributes_do_not_matter_for_other_tags() {
        let bold = Element::new("b").attr("onclick", "x()");
        assert_eq!(dispatch(&bold), Dispatch::Structural);
        let span = Element::new("span");
        assert_eq!(dispatch(&span), Dispatch::Disallowed);
    }
}

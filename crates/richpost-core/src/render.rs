use log::{debug, trace};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::audit::audit;
use crate::diagnostic::Diagnostic;
use crate::dispatch::{Dispatch, dispatch};
use crate::embed::{classify, image_markup, video_markup};
use crate::escape::{encode_uri, escape_html};
use crate::parser::MarkupParser;
use crate::result::ParseResult;
use crate::source_map::SourceMap;
use crate::tokenize::{Token, compile, mentions, tokenize};
use crate::tree::{Element, Node, TreeParser};
use crate::urlparts::{StandardUrls, UrlDecomposer};

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| compile(r"\r\n|\r|\n"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderOptions {
    /// Bare YouTube links become players.
    pub embed_youtube: bool,
    /// Bare image and video links become `<img>`/`<video>`.
    pub embed_media: bool,
    pub media_width: u32,
    pub youtube_height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            embed_youtube: true,
            embed_media: true,
            media_width: 500,
            youtube_height: 282,
        }
    }
}

/// Rendered post together with every diagnostic raised on the way.
#[derive(Clone, Debug)]
pub struct Report {
    pub result: ParseResult,
    pub diagnostics: Vec<Diagnostic>,
}

/// The rendering engine.
///
/// Holds no per-call state, so one instance can serve any number of threads.
#[derive(Clone, Debug, Default)]
pub struct Sanitizer<P = MarkupParser, U = StandardUrls> {
    parser: P,
    urls: U,
    options: RenderOptions,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self::with_parts(MarkupParser, StandardUrls, options)
    }
}

impl<P: TreeParser, U: UrlDecomposer> Sanitizer<P, U> {
    pub fn with_parts(parser: P, urls: U, options: RenderOptions) -> Self {
        Self {
            parser,
            urls,
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn parse(&self, source: &str) -> ParseResult {
        let tree = self.parser.parse_tree(source);
        self.render_nodes(&tree.nodes)
    }

    /// Like [`Sanitizer::parse`], also returning parser and audit
    /// diagnostics ordered by position.
    pub fn report(&self, source: &str) -> Report {
        let tree = self.parser.parse_tree(source);
        let result = self.render_nodes(&tree.nodes);
        let mut diagnostics = tree.diagnostics;
        diagnostics.extend(audit(&tree.nodes, &SourceMap::new(source)));
        diagnostics.sort_by_key(|diag| (diag.range.start.line, diag.range.start.character));
        Report {
            result,
            diagnostics,
        }
    }

    pub fn render_nodes(&self, nodes: &[Node]) -> ParseResult {
        nodes.iter().map(|node| self.render_node(node)).collect()
    }

    /// Renders one bare URL. Its recording into `urls` is up to the caller.
    pub fn process_url(&self, url: &str) -> String {
        let parts = self.urls.decompose(url);
        let embed = classify(parts.as_ref(), &self.options);
        trace!("classified {} as {:?}", url, embed);
        embed.render(url, &self.options)
    }

    fn render_node(&self, node: &Node) -> ParseResult {
        match node {
            Node::Text(text) => self.render_text(text),
            Node::Element(element) => self.render_element(element),
            Node::Script(element) => {
                debug!("neutralized <{}> block", element.name);
                self.render_disallowed(element)
            }
            Node::Comment(data) => ParseResult::text(escape_html(&format!("<!-- {} -->", data))),
            Node::Directive(data) => ParseResult::text(escape_html(&format!("<{}>", data))),
        }
    }

    fn render_text(&self, text: &str) -> ParseResult {
        let mut html = String::with_capacity(text.len());
        let mut found_mentions = Vec::new();
        let mut urls = Vec::new();
        for token in tokenize(text) {
            match token {
                Token::Text(literal) => {
                    found_mentions.extend(mentions(literal));
                    html.push_str(&escape_html(literal));
                }
                Token::Url(url) => {
                    urls.push(url.to_string());
                    html.push_str(&self.process_url(url));
                }
            }
        }
        ParseResult {
            text: LINE_BREAK.replace_all(&html, "<br />\n").into_owned(),
            mentions: found_mentions,
            urls,
            images: Vec::new(),
        }
    }

    fn render_element(&self, element: &Element) -> ParseResult {
        match dispatch(element) {
            Dispatch::Structural => {
                let open = if element.has_children() {
                    format!("<{}>", element.name)
                } else {
                    format!("<{}/>", element.name)
                };
                self.render_nodes(&element.children)
                    .wrap(&open, &format!("</{}>", element.name))
            }
            Dispatch::Anchor { href } => {
                let open = format!("<a href=\"{}\" target=\"_blank\">", encode_uri(href));
                self.render_nodes(&element.children)
                    .wrap(&open, "</a>")
                    .with_url(href)
            }
            Dispatch::Image { src } => ParseResult::text(image_markup(src)).with_image(src),
            Dispatch::Video { src } => {
                ParseResult::text(video_markup(src, self.options.media_width)).with_image(src)
            }
            Dispatch::Spoiler => self
                .render_nodes(&element.children)
                .wrap("<span class=\"irony\">", "</span>"),
            Dispatch::Rejected { attribute } => {
                debug!(
                    "<{}> {} is not an absolute URL, rendering as text",
                    element.name, attribute
                );
                self.render_disallowed(element)
            }
            Dispatch::Disallowed => {
                debug!("<{}> is not allowed, rendering as text", element.name);
                self.render_disallowed(element)
            }
        }
    }

    /// Shows the tag itself as text around its rendered children.
    fn render_disallowed(&self, element: &Element) -> ParseResult {
        let mut open = format!("<{}", element.name);
        for (name, value) in element.attrs.iter() {
            open.push_str(&format!(" {}=\"{}\"", name, value));
        }
        open.push_str(if element.has_children() { ">" } else { "/>" });
        self.render_nodes(&element.children).wrap(
            &escape_html(&open),
            &escape_html(&format!("</{}>", element.name)),
        )
    }
}

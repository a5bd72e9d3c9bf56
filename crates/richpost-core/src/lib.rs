mod audit;
mod diagnostic;
mod dispatch;
mod embed;
mod escape;
mod parser;
mod render;
mod result;
mod source_map;
mod span;
mod tokenize;
mod tree;
mod urlparts;

pub use audit::audit;
pub use diagnostic::{
    Diagnostic, DiagnosticSeverity, I_END_TAG_STRAY, I_TAG_INCOMPLETE, I_TAG_UNCLOSED,
    W_SCRIPT_NEUTRALIZED, W_TAG_DISALLOWED, W_URL_REJECTED,
};
pub use dispatch::{Dispatch, TagRule, dispatch};
pub use embed::{Embed, classify, parse_start_time};
pub use escape::{decode_uri, encode_uri, escape_html};
pub use parser::MarkupParser;
pub use render::{RenderOptions, Report, Sanitizer};
pub use result::ParseResult;
pub use source_map::{Position, Range, SourceMap};
pub use span::{Span, SpanError};
pub use tokenize::{Token, URL_PATTERN, is_url, mentions, tokenize};
pub use tree::{Attributes, Element, Node, Tree, TreeParser};
pub use urlparts::{StandardUrls, UrlDecomposer, UrlParts, query_param};

/// Renders untrusted post markup with the default parser and options.
pub fn parse(source: &str) -> ParseResult {
    Sanitizer::new().parse(source)
}

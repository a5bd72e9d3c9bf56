//! Lenient HTML-like markup parser used by default to build the node tree.
//!
//! It never fails: unknown constructs become text, unterminated ones are
//! closed or dropped and the repair is recorded as an info diagnostic.
//! Character references are left exactly as written.

use crate::diagnostic::{
    Diagnostic, DiagnosticSeverity, I_END_TAG_STRAY, I_TAG_INCOMPLETE, I_TAG_UNCLOSED,
};
use crate::source_map::SourceMap;
use crate::span::Span;
use crate::tree::{Attributes, Element, Node, Tree, TreeParser};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "command", "embed", "frame", "hr", "image", "img",
    "input", "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose content is taken verbatim up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Elements that become [`Node::Script`].
const SCRIPT_ELEMENTS: &[&str] = &["script", "style"];

const P_ONLY: &[&str] = &["p"];
const FORM_CONTROLS: &[&str] = &[
    "input", "option", "optgroup", "select", "button", "datalist", "textarea",
];
const DD_DT: &[&str] = &["dd", "dt"];
const RT_RP: &[&str] = &["rt", "rp"];
const TABLE_SECTIONS: &[&str] = &["thead", "tbody"];

/// Open elements that opening `name` closes first.
fn implied_closes(name: &str) -> &'static [&'static str] {
    match name {
        "tr" => &["tr", "th", "td"],
        "th" => &["th"],
        "td" => &["thead", "th", "td"],
        "body" => &["head", "link", "script"],
        "li" => &["li"],
        "option" => &["option"],
        "optgroup" => &["optgroup", "option"],
        "select" | "input" | "output" | "button" | "datalist" | "textarea" => FORM_CONTROLS,
        "dd" | "dt" => DD_DT,
        "rt" | "rp" => RT_RP,
        "tbody" | "tfoot" => TABLE_SECTIONS,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "address" | "article" | "aside"
        | "blockquote" | "details" | "div" | "dl" | "fieldset" | "figcaption" | "figure"
        | "footer" | "form" | "header" | "hr" | "main" | "nav" | "ol" | "pre" | "section"
        | "table" | "ul" => P_ONLY,
        _ => &[],
    }
}

/// The default [`TreeParser`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkupParser;

impl TreeParser for MarkupParser {
    fn parse_tree(&self, source: &str) -> Tree {
        let mut builder = TreeBuilder::new(source);
        builder.run();
        builder.finish()
    }
}

struct TreeBuilder<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    root: Vec<Node>,
    stack: Vec<Element>,
    diagnostics: Vec<Diagnostic>,
    source_map: SourceMap,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
            diagnostics: Vec::new(),
            source_map: SourceMap::new(source),
        }
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            let Some(offset) = self.source[self.pos..].find('<') else {
                self.push_text(self.pos, self.bytes.len());
                self.pos = self.bytes.len();
                break;
            };
            let lt = self.pos + offset;
            self.push_text(self.pos, lt);
            self.pos = lt;
            self.markup();
        }
    }

    fn finish(mut self) -> Tree {
        while let Some(element) = self.stack.last() {
            let span = element.span;
            let message = format!("<{}> is never closed", element.name);
            self.info(span, I_TAG_UNCLOSED, message);
            self.close_top();
        }
        Tree {
            nodes: self.root,
            diagnostics: self.diagnostics,
        }
    }

    /// Handles the construct starting at the `<` under `self.pos`.
    fn markup(&mut self) {
        let rest = &self.source[self.pos..];
        if rest.starts_with("<!--") {
            self.comment(4, "-->");
        } else if rest.starts_with("<![CDATA[") {
            self.cdata();
        } else {
            match self.byte_at(self.pos + 1) {
                Some(b'!' | b'?') => self.directive(),
                Some(b'/') => {
                    let mut after = self.pos + 2;
                    while self.byte_at(after).is_some_and(|byte| byte.is_ascii_whitespace()) {
                        after += 1;
                    }
                    match self.byte_at(after) {
                        Some(byte) if byte.is_ascii_alphabetic() => self.end_tag(after),
                        Some(b'>') => self.pos = after + 1,
                        _ => self.comment(after - self.pos, ">"),
                    }
                }
                Some(byte) if byte.is_ascii_alphabetic() => self.start_tag(),
                _ => {
                    self.push_text(self.pos, self.pos + 1);
                    self.pos += 1;
                }
            }
        }
    }

    /// Comment whose body starts `open` bytes after `<` and ends at `close`
    /// (or at end of input).
    fn comment(&mut self, open: usize, close: &str) {
        let body_start = self.pos + open;
        let (body_end, next) = match self.source[body_start..].find(close) {
            Some(offset) => (body_start + offset, body_start + offset + close.len()),
            None => (self.bytes.len(), self.bytes.len()),
        };
        let data = self.source[body_start..body_end].to_string();
        self.push_node(Node::Comment(data));
        self.pos = next;
    }

    fn cdata(&mut self) {
        let body_start = self.pos + "<![CDATA[".len();
        let (body_end, next) = match self.source[body_start..].find("]]>") {
            Some(offset) => (body_start + offset, body_start + offset + 3),
            None => (self.bytes.len(), self.bytes.len()),
        };
        let data = format!("[CDATA[{}]]", &self.source[body_start..body_end]);
        self.push_node(Node::Comment(data));
        self.pos = next;
    }

    fn directive(&mut self) {
        let start = self.pos;
        match self.source[start..].find('>') {
            Some(offset) => {
                let data = self.source[start + 1..start + offset].to_string();
                self.push_node(Node::Directive(data));
                self.pos = start + offset + 1;
            }
            None => self.incomplete(start),
        }
    }

    fn start_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_while(|byte| !is_tag_delimiter(byte));
        let name = name.to_ascii_lowercase();
        let mut attrs = Attributes::default();

        loop {
            self.skip_whitespace();
            match self.byte_at(self.pos) {
                None => return self.incomplete(start),
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                // `/>` only matters for void elements, which close anyway.
                Some(b'/') => self.pos += 1,
                Some(_) => {
                    let name_start = self.pos;
                    // The first character may be `=`, it still belongs to the name.
                    self.pos += self.source[self.pos..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                    self.read_while(|byte| !is_tag_delimiter(byte) && byte != b'=');
                    let attr_name = self.source[name_start..self.pos].to_ascii_lowercase();
                    self.skip_whitespace();
                    let value = if self.byte_at(self.pos) == Some(b'=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        match self.attribute_value() {
                            Some(value) => value,
                            None => return self.incomplete(start),
                        }
                    } else {
                        String::new()
                    };
                    attrs.insert(attr_name, value);
                }
            }
        }

        let mut element = Element::new(name);
        element.attrs = attrs;
        element.span = Span {
            start,
            end: self.pos,
        };
        self.open(element);
    }

    fn attribute_value(&mut self) -> Option<String> {
        match self.byte_at(self.pos) {
            Some(quote @ (b'"' | b'\'')) => {
                let value_start = self.pos + 1;
                let offset = self.bytes[value_start..]
                    .iter()
                    .position(|&byte| byte == quote)?;
                self.pos = value_start + offset + 1;
                Some(self.source[value_start..value_start + offset].to_string())
            }
            _ => Some(
                self.read_while(|byte| !byte.is_ascii_whitespace() && byte != b'>')
                    .to_string(),
            ),
        }
    }

    /// End tag whose name starts at `name_start`.
    fn end_tag(&mut self, name_start: usize) {
        let start = self.pos;
        self.pos = name_start;
        let name = self.read_while(|byte| !is_tag_delimiter(byte));
        let name = name.to_ascii_lowercase();
        match self.source[self.pos..].find('>') {
            Some(offset) => self.pos += offset + 1,
            None => return self.incomplete(start),
        }
        let span = Span {
            start,
            end: self.pos,
        };
        self.close(&name, span);
    }

    fn open(&mut self, element: Element) {
        let closes = implied_closes(&element.name);
        while self
            .stack
            .last()
            .is_some_and(|top| closes.contains(&top.name.as_str()))
        {
            self.close_top();
        }

        let name = element.name.clone();
        if VOID_ELEMENTS.contains(&name.as_str()) {
            self.push_node(Node::Element(element));
            return;
        }

        self.stack.push(element);
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let end = self.find_raw_text_end(&name);
            self.push_text(self.pos, end);
            self.pos = end;
        }
    }

    fn close(&mut self, name: &str, span: Span) {
        if let Some(index) = self.stack.iter().rposition(|open| open.name == name) {
            while self.stack.len() > index + 1 {
                if let Some(inner) = self.stack.last() {
                    let message = format!("<{}> closed by </{}>", inner.name, name);
                    let inner_span = inner.span;
                    self.info(inner_span, I_TAG_UNCLOSED, message);
                }
                self.close_top();
            }
            self.close_top();
            return;
        }

        match name {
            // Lenient HTML turns these lone end tags into elements.
            "br" | "p" => {
                let mut element = Element::new(name);
                element.span = span;
                self.open(element);
                if name == "p" {
                    self.close_top();
                }
            }
            _ => {
                let message = format!("</{}> has no matching open tag", name);
                self.info(span, I_END_TAG_STRAY, message);
            }
        }
    }

    fn close_top(&mut self) {
        let Some(element) = self.stack.pop() else {
            return;
        };
        let node = if SCRIPT_ELEMENTS.contains(&element.name.as_str()) {
            Node::Script(element)
        } else {
            Node::Element(element)
        };
        self.push_node(node);
    }

    fn find_raw_text_end(&self, name: &str) -> usize {
        let mut search = self.pos;
        while let Some(offset) = self.source[search..].find("</") {
            let candidate = search + offset;
            let name_start = candidate + 2;
            let name_end = name_start + name.len();
            let matches_name = self
                .bytes
                .get(name_start..name_end)
                .is_some_and(|found| found.eq_ignore_ascii_case(name.as_bytes()));
            if matches_name && self.byte_at(name_end).is_none_or(is_tag_delimiter) {
                return candidate;
            }
            search = name_start;
        }
        self.bytes.len()
    }

    fn incomplete(&mut self, start: usize) {
        let span = Span {
            start,
            end: self.bytes.len(),
        };
        self.info(span, I_TAG_INCOMPLETE, "tag is cut off by the end of input");
        self.pos = self.bytes.len();
    }

    fn push_text(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let source = self.source;
        let text = &source[start..end];
        let siblings = self.siblings();
        if let Some(Node::Text(previous)) = siblings.last_mut() {
            previous.push_str(text);
        } else {
            siblings.push(Node::Text(text.to_string()));
        }
    }

    fn push_node(&mut self, node: Node) {
        self.siblings().push(node);
    }

    fn siblings(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        }
    }

    fn info(&mut self, span: Span, code: &'static str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(
            self.source_map.range(span),
            DiagnosticSeverity::Info,
            code,
            message,
        ));
    }

    fn byte_at(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    fn read_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.byte_at(self.pos).is_some_and(&keep) {
            self.pos += 1;
        }
        let source = self.source;
        &source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.read_while(|byte| byte.is_ascii_whitespace());
    }
}

fn is_tag_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || byte == b'/' || byte == b'>'
}

#[cfg(test)]
mod tests {
    use super::MarkupParser;
    use crate::diagnostic::{I_END_TAG_STRAY, I_TAG_INCOMPLETE, I_TAG_UNCLOSED};
    use crate::tree::{Element, Node, Tree, TreeParser};

    fn parse(source: &str) -> Tree {
        MarkupParser.parse_tree(source)
    }

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(element) | Node::Script(element) => element,
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn nested_tags_and_text() {
        let tree = parse("hi <b>bold <i>both</i></b>!");
        assert_eq!(tree.nodes.len(), 3);
        assert_eq!(tree.nodes[0], Node::text("hi "));
        let bold = element(&tree.nodes[1]);
        assert_eq!(bold.name, "b");
        assert_eq!(bold.children.len(), 2);
        assert_eq!(element(&bold.children[1]).name, "i");
        assert_eq!(tree.nodes[2], Node::text("!"));
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn names_are_lowercased_and_values_kept_raw() {
        let tree = parse(r#"<A HREF="http://a.com/?x=1&amp;y" Title='it&#39;s' checked>x</A>"#);
        let anchor = element(&tree.nodes[0]);
        assert_eq!(anchor.name, "a");
        assert_eq!(anchor.attrs.get("href"), Some("http://a.com/?x=1&amp;y"));
        assert_eq!(anchor.attrs.get("title"), Some("it&#39;s"));
        assert_eq!(anchor.attrs.get("checked"), Some(""));
        assert_eq!(anchor.span.start, 0);
        assert_eq!(anchor.children, vec![Node::text("x")]);
    }

    #[test]
    fn unquoted_values_end_at_whitespace() {
        let tree = parse("<img src=http://a.com/x.png alt=a/b>");
        let image = element(&tree.nodes[0]);
        assert_eq!(image.attrs.get("src"), Some("http://a.com/x.png"));
        assert_eq!(image.attrs.get("alt"), Some("a/b"));
    }

    #[test]
    fn entities_are_not_decoded() {
        let tree = parse("a &lt;b&gt; &amp; c");
        assert_eq!(tree.nodes, vec![Node::text("a &lt;b&gt; &amp; c")]);
    }

    #[test]
    fn void_elements_take_no_children() {
        let tree = parse("<img src=x>after");
        assert_eq!(tree.nodes.len(), 2);
        assert!(!element(&tree.nodes[0]).has_children());
    }

    #[test]
    fn self_closing_slash_is_ignored_on_normal_elements() {
        let tree = parse("<irony/>text");
        let irony = element(&tree.nodes[0]);
        assert_eq!(irony.children, vec![Node::text("text")]);
        assert_eq!(tree.diagnostics[0].code, I_TAG_UNCLOSED);
    }

    #[test]
    fn comments_directives_and_cdata() {
        let tree = parse("<!DOCTYPE html><!--note--><?xml v?><![CDATA[x]]>");
        assert_eq!(
            tree.nodes,
            vec![
                Node::Directive("!DOCTYPE html".to_string()),
                Node::Comment("note".to_string()),
                Node::Directive("?xml v?".to_string()),
                Node::Comment("[CDATA[x]]".to_string()),
            ]
        );
    }

    #[test]
    fn lone_angle_brackets_are_text() {
        let tree = parse("1 < 2 > 0 <3");
        assert_eq!(tree.nodes, vec![Node::text("1 < 2 > 0 <3")]);
    }

    #[test]
    fn script_content_is_raw() {
        let tree = parse("<script>if (a <b) { x('</b>') }</SCRIPT >tail");
        let Node::Script(script) = &tree.nodes[0] else {
            panic!("expected script node");
        };
        assert_eq!(script.children, vec![Node::text("if (a <b) { x('</b>') }")]);
        assert_eq!(tree.nodes[1], Node::text("tail"));
    }

    #[test]
    fn stray_end_tags_are_dropped_and_text_merged() {
        let tree = parse("a</x>b");
        assert_eq!(tree.nodes, vec![Node::text("ab")]);
        assert_eq!(tree.diagnostics[0].code, I_END_TAG_STRAY);
    }

    #[test]
    fn end_tag_closes_inner_elements() {
        let tree = parse("<b><i>x</b>y");
        let bold = element(&tree.nodes[0]);
        assert_eq!(element(&bold.children[0]).children, vec![Node::text("x")]);
        assert_eq!(tree.nodes[1], Node::text("y"));
        assert_eq!(tree.diagnostics.len(), 1);
    }

    #[test]
    fn paragraphs_close_each_other() {
        let tree = parse("<p>one<p>two");
        assert_eq!(tree.nodes.len(), 2);
        assert_eq!(element(&tree.nodes[1]).children, vec![Node::text("two")]);
    }

    #[test]
    fn lone_end_tags_for_br_and_p_create_elements() {
        let tree = parse("</br></p>");
        assert_eq!(element(&tree.nodes[0]).name, "br");
        assert_eq!(element(&tree.nodes[1]).name, "p");
    }

    #[test]
    fn cut_off_tags_are_discarded() {
        let tree = parse("text <a href=\"http://x.com");
        assert_eq!(tree.nodes, vec![Node::text("text ")]);
        assert_eq!(tree.diagnostics[0].code, I_TAG_INCOMPLETE);
    }

    #[test]
    fn attribute_names_may_start_with_any_character() {
        let tree = parse("<b я=1 =x>x</b>");
        let bold = element(&tree.nodes[0]);
        assert_eq!(bold.attrs.get("я"), Some("1"));
        assert_eq!(bold.attrs.get("=x"), Some(""));
        assert_eq!(bold.children, vec![Node::text("x")]);
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn whitespace_after_end_tag_slash_is_skipped() {
        let tree = parse("<b>x</ b>y</ >z</ 1>");
        let bold = element(&tree.nodes[0]);
        assert_eq!(bold.children, vec![Node::text("x")]);
        assert_eq!(
            tree.nodes[1..],
            [Node::text("yz"), Node::Comment("1".to_string())]
        );
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn duplicate_attributes_keep_the_last_value() {
        let tree = parse(r#"<a href="http://a.com" href="http://b.com">x</a>"#);
        assert_eq!(element(&tree.nodes[0]).attrs.get("href"), Some("http://b.com"));
    }
}

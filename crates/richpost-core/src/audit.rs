//! Reports where rendering will neutralize user markup.

use crate::diagnostic::{
    Diagnostic, DiagnosticSeverity, W_SCRIPT_NEUTRALIZED, W_TAG_DISALLOWED, W_URL_REJECTED,
};
use crate::dispatch::{Dispatch, dispatch};
use crate::source_map::SourceMap;
use crate::tree::{Element, Node};

pub fn audit(nodes: &[Node], source_map: &SourceMap) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    audit_nodes(nodes, source_map, &mut diagnostics);
    diagnostics
}

fn audit_nodes(nodes: &[Node], source_map: &SourceMap, out: &mut Vec<Diagnostic>) {
    for node in nodes {
        match node {
            Node::Element(element) => match dispatch(element) {
                // Children of media tags are never rendered.
                Dispatch::Image { .. } | Dispatch::Video { .. } => {}
                Dispatch::Disallowed => {
                    let message = format!("<{}> is not allowed and is shown as text", element.name);
                    out.push(warning(element, source_map, W_TAG_DISALLOWED, message));
                    audit_nodes(&element.children, source_map, out);
                }
                Dispatch::Rejected { attribute } => {
                    let message = format!(
                        "<{}> needs an absolute http(s) URL in `{}`, shown as text",
                        element.name, attribute
                    );
                    out.push(warning(element, source_map, W_URL_REJECTED, message));
                    audit_nodes(&element.children, source_map, out);
                }
                Dispatch::Structural | Dispatch::Anchor { .. } | Dispatch::Spoiler => {
                    audit_nodes(&element.children, source_map, out);
                }
            },
            Node::Script(element) => {
                let message = format!("<{}> block is shown as text", element.name);
                out.push(warning(element, source_map, W_SCRIPT_NEUTRALIZED, message));
            }
            Node::Text(_) | Node::Comment(_) | Node::Directive(_) => {}
        }
    }
}

fn warning(
    element: &Element,
    source_map: &SourceMap,
    code: &'static str,
    message: String,
) -> Diagnostic {
    Diagnostic::new(
        source_map.range(element.span),
        DiagnosticSeverity::Warning,
        code,
        message,
    )
}

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PreviewOptions {
    embed_youtube: Option<bool>,
    embed_media: Option<bool>,
    media_width: Option<u32>,
    youtube_height: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewResult {
    html: String,
    mentions: Vec<String>,
    urls: Vec<String>,
    images: Vec<String>,
    diagnostics: Vec<JsDiagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDiagnostic {
    code: String,
    message: String,
    severity: String,
    range: JsRange,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

/// Renders a post draft for preview in the editor.
#[wasm_bindgen]
pub fn render_post(source: &str) -> Result<JsValue, JsValue> {
    render_post_with_options(source, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_post_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let sanitizer = richpost_core::Sanitizer::with_options(options_from_js(options)?);
    let report = sanitizer.report(source);

    let diagnostics = report
        .diagnostics
        .into_iter()
        .map(|diag| JsDiagnostic {
            code: diag.code.to_string(),
            message: diag.message,
            severity: diag.severity.label().to_string(),
            range: JsRange {
                start_line: diag.range.start.line,
                start_col: diag.range.start.character,
                end_line: diag.range.end.line,
                end_col: diag.range.end.character,
            },
        })
        .collect();

    let result = PreviewResult {
        html: report.result.text,
        mentions: report.result.mentions,
        urls: report.result.urls,
        images: report.result.images,
        diagnostics,
    };
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<richpost_core::RenderOptions, JsValue> {
    let mut out = richpost_core::RenderOptions::default();
    if value.is_null() || value.is_undefined() {
        return Ok(out);
    }
    let parsed: PreviewOptions =
        serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))?;
    if let Some(embed_youtube) = parsed.embed_youtube {
        out.embed_youtube = embed_youtube;
    }
    if let Some(embed_media) = parsed.embed_media {
        out.embed_media = embed_media;
    }
    if let Some(media_width) = parsed.media_width {
        out.media_width = media_width;
    }
    if let Some(youtube_height) = parsed.youtube_height {
        out.youtube_height = youtube_height;
    }
    Ok(out)
}

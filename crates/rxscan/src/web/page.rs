//! Server-rendered HTML for the single page.

use rxscan_core::config::UploadConfig;
use rxscan_core::Session;
use std::fmt::Write;

/// Everything the page needs for one render.
pub struct PageView<'a> {
    pub session: &'a Session,
    pub notice: Option<&'a str>,
    pub upload: &'a UploadConfig,
    pub provider: &'a str,
}

const STYLE: &str = r#"<style>
body { font-family: system-ui, sans-serif; margin: 0; color: #2c3e50;
       background: linear-gradient(135deg, #667eea15 0%, #764ba215 100%); }
.layout { display: flex; gap: 24px; padding: 24px; }
aside { width: 280px; flex-shrink: 0; }
main { flex: 1; }
.steps { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white;
         padding: 15px; border-radius: 10px; }
.box { background: white; padding: 25px; border-radius: 15px; margin-bottom: 20px;
       box-shadow: 0 2px 15px rgba(0,0,0,0.08); }
.upload { border: 2px dashed #e0e0e0; }
.columns { display: flex; gap: 24px; }
.columns > .box { flex: 1; }
.meta { background: #f8f9fa; padding: 10px; border-radius: 8px; font-size: 0.85em; }
.info { background: #e8f0fe; padding: 12px; border-radius: 8px; }
.notice { background: #fdecea; padding: 12px; border-radius: 8px; }
button, .button { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white;
                  font-weight: bold; border: none; border-radius: 10px; padding: 12px 24px;
                  cursor: pointer; text-decoration: none; display: inline-block; }
textarea { width: 100%; height: 350px; border-radius: 10px; border: 2px solid #e0e0e0;
           font-family: ui-monospace, monospace; }
img.preview { max-width: 100%; border-radius: 8px; }
footer { text-align: center; color: #999; font-size: 0.9em; padding: 20px; }
</style>"#;

const SIDEBAR: &str = r#"<aside>
<h3>📋 How to Use</h3>
<div class="steps">
<p><strong>1. Upload</strong><br/>Choose a prescription image</p>
<p><strong>2. Extract</strong><br/>Click to process with AI</p>
<p><strong>3. Review</strong><br/>Check extracted text</p>
<p><strong>4. Download</strong><br/>Save as text file</p>
</div>
<h3>💡 Tips for Best Results</h3>
<ul>
<li><strong>Good Lighting</strong> - Natural light works best</li>
<li><strong>Clear Focus</strong> - Avoid blurry images</li>
<li><strong>Full Capture</strong> - Include entire prescription</li>
<li><strong>No Glare</strong> - Avoid reflections and shadows</li>
<li><strong>High Resolution</strong> - Use camera, not screenshots</li>
</ul>"#;

const HOW_IT_WORKS: &str = r#"<details open>
<summary>ℹ️ How This Works</summary>
<p><strong>This application sends your image to a hosted vision model to:</strong></p>
<ol>
<li>🔍 <strong>Analyze</strong> handwritten prescription images</li>
<li>🧠 <strong>Recognize</strong> the handwriting</li>
<li>📋 <strong>Structure</strong> information in a readable format</li>
<li>✅ <strong>Extract</strong> patient details, medications, and dosages</li>
</ol>
<p><strong>Note:</strong> Always verify extracted information with original documents before use.</p>
</details>"#;

/// Render the full page.
pub fn render(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Prescription OCR</title>\n");
    html.push_str(STYLE);
    html.push_str("\n</head>\n<body>\n");

    html.push_str(
        "<header style=\"text-align: center; padding: 20px 0;\">\n\
         <h1 style=\"color: #667eea;\">💊 Prescription OCR</h1>\n\
         <p>Convert handwritten prescriptions into clean, machine-readable text</p>\n\
         </header>\n<div class=\"layout\">\n",
    );

    html.push_str(SIDEBAR);
    let _ = write!(
        html,
        "\n<h3>📸 Supported Formats</h3>\n<p>{}</p>\n\
         <h3>🔒 Privacy Note</h3>\n<p class=\"info\">Images are processed through the {} API. \
         Data is not stored permanently.</p>\n</aside>\n<main>\n",
        escape(&formats_label(view.upload)),
        escape(provider_label(view.provider)),
    );

    if let Some(notice) = view.notice {
        let _ = writeln!(html, "<div class=\"notice\">⚠️ {}</div>", escape(notice));
    }

    let _ = write!(
        html,
        "<div class=\"box upload\">\n<form action=\"/upload\" method=\"post\" \
         enctype=\"multipart/form-data\">\n<label>📤 Upload Prescription Image</label><br/>\n\
         <input type=\"file\" name=\"image\" accept=\"{}\" required>\n\
         <button type=\"submit\">Upload</button>\n</form>\n</div>\n",
        escape(&view.upload.accept_attr()),
    );

    match &view.session.image {
        Some(image) => {
            html.push_str("<div class=\"columns\">\n<div class=\"box\">\n<h3>📸 Original Image</h3>\n");
            let _ = write!(
                html,
                "<img class=\"preview\" src=\"/image\" alt=\"{}\">\n<div class=\"meta\">\
                 📏 <strong>Size:</strong> {}×{}px<br/>\n\
                 📦 <strong>File Size:</strong> {:.1} KB<br/>\n\
                 🖼️ <strong>Format:</strong> {}</div>\n</div>\n",
                escape(&image.file_name),
                image.width,
                image.height,
                image.size_kb(),
                escape(&image.format.to_uppercase()),
            );
            render_result(&mut html, view.session);
            html.push_str("</div>\n");
        }
        None => {
            html.push_str("<div class=\"box\">\n<p class=\"info\">👆 Upload a prescription image above to get started</p>\n");
            html.push_str(HOW_IT_WORKS);
            html.push_str("\n</div>\n");
        }
    }

    let _ = write!(
        html,
        "</main>\n</div>\n<footer>\n<p>⚠️ <strong>Disclaimer:</strong> This tool is for \
         informational purposes only. Always consult healthcare professionals before making \
         medical decisions.</p>\n<p>Powered by {}</p>\n</footer>\n</body>\n</html>\n",
        escape(provider_label(view.provider)),
    );

    html
}

fn render_result(html: &mut String, session: &Session) {
    html.push_str("<div class=\"box\">\n<h3>📝 Extracted Text</h3>\n");
    html.push_str(
        "<form action=\"/extract\" method=\"post\">\
         <button type=\"submit\">🔍 Extract Text</button></form>\n",
    );

    match &session.result {
        Some(result) => {
            let _ = write!(
                html,
                "<p><small>Extracted {}</small></p>\n<textarea readonly>\n{}</textarea>\n\
                 <p><a class=\"button\" href=\"/download\">💾 Download Report</a>\n\
                 <form action=\"/clear\" method=\"post\" style=\"display: inline;\">\
                 <button type=\"submit\">🗑️ Clear Results</button></form></p>\n",
                escape(&result.timestamp()),
                escape(&result.text),
            );
        }
        None => {
            html.push_str(
                "<p class=\"info\">👆 Click 'Extract Text' to process the prescription</p>\n",
            );
        }
    }
    html.push_str("</div>\n");
}

/// "JPG • JPEG • PNG • WEBP"
fn formats_label(upload: &UploadConfig) -> String {
    upload
        .supported_formats
        .iter()
        .map(|f| f.to_uppercase())
        .collect::<Vec<_>>()
        .join(" • ")
}

fn provider_label(provider: &str) -> &str {
    match provider {
        "gemini" => "Google Gemini",
        "openai" => "OpenAI",
        other => other,
    }
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxscan_core::{ExtractionResult, UploadedImage};

    fn image() -> UploadedImage {
        UploadedImage {
            file_name: "rx<1>.jpg".into(),
            bytes: vec![0; 2048],
            format: "jpeg".into(),
            width: 640,
            height: 480,
        }
    }

    fn render_session(session: &Session, notice: Option<&str>) -> String {
        render(&PageView {
            session,
            notice,
            upload: &UploadConfig::default(),
            provider: "gemini",
        })
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
    }

    #[test]
    fn test_empty_state() {
        let html = render_session(&Session::default(), None);
        assert!(html.contains("Upload a prescription image above to get started"));
        assert!(html.contains("How This Works"));
        assert!(html.contains("JPG • JPEG • PNG • WEBP"));
        assert!(html.contains("accept=\".jpg,.jpeg,.png,.webp\""));
        assert!(!html.contains("/extract"));
    }

    #[test]
    fn test_image_without_result_shows_prompt() {
        let mut session = Session::default();
        session.upload(image());
        let html = render_session(&session, None);
        assert!(html.contains("640×480px"));
        assert!(html.contains("2.0 KB"));
        assert!(html.contains("JPEG"));
        assert!(html.contains("rx&lt;1&gt;.jpg"));
        assert!(html.contains("Click 'Extract Text' to process the prescription"));
        assert!(!html.contains("<textarea"));
    }

    #[test]
    fn test_result_is_escaped_in_textarea() {
        let mut session = Session::default();
        session.upload(image());
        session.record(ExtractionResult::new("Dose: <5mg> & rest", false));
        let html = render_session(&session, None);
        assert!(html.contains("<textarea readonly>\nDose: &lt;5mg&gt; &amp; rest</textarea>"));
        assert!(html.contains("/download"));
        assert!(html.contains("/clear"));
        assert!(!html.contains("Click 'Extract Text'"));
    }

    #[test]
    fn test_notice_rendered() {
        let html = render_session(&Session::default(), Some("File too large"));
        assert!(html.contains("<div class=\"notice\">⚠️ File too large</div>"));
    }

    #[test]
    fn test_provider_label() {
        let html = render_session(&Session::default(), None);
        assert!(html.contains("Powered by Google Gemini"));
    }
}

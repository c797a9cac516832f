#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! HTML for the single grading page.

use std::fmt::Write as _;

use super::form::FormState;
use crate::{
    grader::GradingOutcome, leniency::Leniency, level::GradeLevel, request::MAX_IMAGE_BYTES,
    rubric::format_weight,
};

/// Everything the page shows after a request.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Current form values.
    pub form:    FormState,
    /// Result of the last grading call, if it succeeded.
    pub outcome: Option<GradingOutcome>,
    /// Message for the error banner.
    pub error:   Option<String>,
    /// Model name shown in the footer.
    pub model:   String,
}

/// Page-wide styles.
const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#222}\
header{padding:1rem 2rem;border-bottom:1px solid #ddd}\
main{display:grid;grid-template-columns:20rem 1fr 1fr;gap:2rem;padding:1rem 2rem}\
fieldset{border:1px solid #ddd;margin:0 0 .75rem;padding:.5rem}\
label{display:block;font-weight:600;margin:.5rem 0 .25rem}\
input[type=text],textarea,select{width:100%;box-sizing:border-box}\
textarea{min-height:4rem}\
pre{white-space:pre-wrap;background:#f6f6f6;padding:1rem}\
.error{background:#fde8e8;border:1px solid #e0a0a0;padding:.75rem 1rem;margin:1rem 2rem}\
.hint{color:#555;font-size:.9rem}\
.preview{max-width:100%;border:1px solid #ddd}\
.implicit{position:absolute;left:-9999px}";

/// Escapes text for use in HTML content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Renders the whole page.
pub fn render(view: &PageView) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str("<title>Essay Grading</title>");
    let _ = write!(html, "<style>{STYLE}</style></head><body>");
    html.push_str(
        "<header><h1>Handwritten Essay Grading</h1><p>Upload a handwritten essay and set rubric \
         criteria to get an AI-generated grade.</p></header>",
    );

    if let Some(error) = &view.error {
        let _ = write!(html, "<div class=\"error\" role=\"alert\">{}</div>", escape(error));
    }

    html.push_str(r#"<form method="post" action="/" enctype="multipart/form-data"><main>"#);
    // Enter in a text field submits with the first button in the form.
    html.push_str(
        r#"<button type="submit" name="action" value="grade" class="implicit" tabindex="-1" aria-hidden="true">Grade</button>"#,
    );
    render_sidebar(&mut html, &view.form);
    render_upload(&mut html, &view.form);
    render_results(&mut html, view.outcome.as_ref());
    html.push_str("</main></form>");

    let _ = write!(
        html,
        "<footer class=\"hint\" style=\"padding:1rem 2rem\">Grades are generated by <code>{}</code>. \
         Feedback is shown exactly as the model returned it.</footer></body></html>",
        escape(&view.model)
    );
    html
}

/// Grade level, leniency, and rubric controls.
fn render_sidebar(html: &mut String, form: &FormState) {
    html.push_str("<section><h2>Rubric Configuration</h2>");

    html.push_str(r#"<label for="grade_level">Student Grade Level</label><select id="grade_level" name="grade_level">"#);
    for level in GradeLevel::ALL {
        let selected = if level == form.grade_level { " selected" } else { "" };
        let label = escape(level.label());
        let _ = write!(html, "<option value=\"{label}\"{selected}>{label}</option>");
    }
    html.push_str("</select>");

    let band = form.leniency.band();
    let _ = write!(
        html,
        "<label for=\"leniency\">Grading Leniency</label>\
         <input id=\"leniency\" name=\"leniency\" type=\"number\" min=\"{}\" max=\"{}\" step=\"1\" value=\"{}\">\
         <p class=\"hint\">1 = very strict, 10 = very lenient. <strong>{}</strong>: {}</p>",
        Leniency::MIN,
        Leniency::MAX,
        form.leniency.value(),
        band.label(),
        escape(band.summary()),
    );

    html.push_str("<h3>Current Criteria</h3>");
    for (idx, criterion) in form.rubric.iter().enumerate() {
        let n = idx + 1;
        let _ = write!(
            html,
            "<fieldset><legend>Criterion #{n}</legend>\
             <label for=\"criterion_name_{n}\">Name</label>\
             <input id=\"criterion_name_{n}\" type=\"text\" name=\"criterion_name\" value=\"{}\">\
             <label for=\"criterion_weight_{n}\">Weight</label>\
             <input id=\"criterion_weight_{n}\" type=\"number\" step=\"any\" name=\"criterion_weight\" value=\"{}\">\
             <label for=\"criterion_description_{n}\">Description</label>\
             <textarea id=\"criterion_description_{n}\" name=\"criterion_description\">{}</textarea>\
             </fieldset>",
            escape(&criterion.name),
            format_weight(criterion.weight),
            escape(&criterion.description),
        );
    }
    html.push_str(
        r#"<button type="submit" name="action" value="add">Add Criterion</button> <button type="submit" name="action" value="remove">Remove Last</button>"#,
    );
    html.push_str("</section>");
}

/// Instructions, upload control, and image preview.
fn render_upload(html: &mut String, form: &FormState) {
    html.push_str("<section><h2>Upload Essay</h2>");
    let _ = write!(
        html,
        "<label for=\"instructions\">Assignment Instructions</label>\
         <textarea id=\"instructions\" name=\"instructions\" rows=\"6\" placeholder=\"Example: Write a \
         500-word argumentative essay discussing the impact of social media on modern society.\">{}</textarea>",
        escape(&form.instructions)
    );
    // The cached copy goes ahead of the file input so it is read before a
    // large fresh upload.
    let cached = form.image.as_ref().map(|image| (image.data_url(), image.len()));
    if let Some((url, _)) = &cached {
        let _ = write!(html, "<input type=\"hidden\" name=\"essay_cached\" value=\"{url}\">");
    }
    let _ = write!(
        html,
        "<label for=\"essay\">Image of the handwritten essay</label>\
         <input id=\"essay\" type=\"file\" name=\"essay\" accept=\".jpg,.jpeg,.png,image/jpeg,image/png\">\
         <p class=\"hint\">JPEG or PNG, up to {} MiB.</p>",
        MAX_IMAGE_BYTES / (1024 * 1024)
    );
    if let Some((url, len)) = &cached {
        let _ = write!(
            html,
            "<p class=\"hint\">Attached image ({:.1} KB). Choose another file to replace it.</p>\
             <img class=\"preview\" src=\"{url}\" alt=\"Uploaded essay\">",
            *len as f64 / 1024.0
        );
    }
    html.push_str(
        r#"<p><button type="submit" name="action" value="grade">Grade Essay</button></p></section>"#,
    );
}

/// Feedback and usage panel.
fn render_results(html: &mut String, outcome: Option<&GradingOutcome>) {
    html.push_str("<section><h2>Grading Results</h2>");
    match outcome {
        Some(outcome) => {
            let _ = write!(
                html,
                "<h3>AI Feedback</h3><pre id=\"feedback\">{}</pre>\
                 <details><summary>Token Usage and Cost</summary><pre>{}</pre></details>",
                escape(&outcome.feedback),
                escape(&outcome.usage.to_string())
            );
        }
        None => html.push_str(
            "<p class=\"hint\">Upload an essay and click \u{201c}Grade Essay\u{201d} to see \
             results here.</p>",
        ),
    }
    html.push_str("</section>");
}

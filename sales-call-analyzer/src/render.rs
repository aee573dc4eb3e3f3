//! HTML for the single analyzer page. Pure functions of session state and
//! setup status.

use pulldown_cmark::{Parser, escape::escape_html, html};

use crate::models::{AnalysisKind, NoticeLevel};
use crate::runtime::SetupStatus;
use crate::session::SessionState;

/// Everything the page depends on.
pub struct PageView<'a> {
    pub state: &'a SessionState,
    pub setup: &'a SetupStatus,
    pub setup_ok: bool,
    pub salesperson: &'a str,
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut body = String::new();
    body.push_str("<h1>Sales Call Transcript Analyzer</h1>\n");

    if view.setup.credential_problem().is_some() {
        banner(
            &mut body,
            NoticeLevel::Warning,
            "⚠️ OpenRouter API key not found or is still the placeholder in the env file. Please add your valid key.",
        );
    }
    for failure in view.setup.failures() {
        banner(&mut body, NoticeLevel::Error, &failure.to_string());
    }

    render_upload(&mut body, view.setup_ok);

    for notice in &view.state.notices {
        banner(&mut body, notice.level, &notice.message);
    }

    if view.state.transcript.is_some() {
        render_analysis(&mut body, view);
    }

    if !view.setup_ok {
        banner(
            &mut body,
            NoticeLevel::Info,
            "File uploader is disabled. Please ensure a valid OpenRouter API key is set in the env file and the agent components loaded correctly.",
        );
    }

    let refresh = if view.state.is_busy() {
        "<meta http-equiv=\"refresh\" content=\"2\">\n"
    } else {
        ""
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n{refresh}<title>Sales Call Transcript Analyzer</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn render_upload(out: &mut String, enabled: bool) {
    let disabled = if enabled { "" } else { " disabled" };
    out.push_str(&format!(
        "<form class=\"upload\" method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
         <label for=\"transcript\">1. Upload Transcript PDF</label>\n\
         <input type=\"file\" id=\"transcript\" name=\"transcript\" accept=\"application/pdf,.pdf\" title=\"Upload a text-based PDF transcript of your sales call.\"{disabled}>\n\
         <button type=\"submit\"{disabled}>Upload</button>\n\
         </form>\n"
    ));
}

fn render_analysis(out: &mut String, view: &PageView<'_>) {
    let state = view.state;
    let disabled = if state.is_busy() { " disabled" } else { "" };

    out.push_str("<hr>\n<h2>2. Choose Analysis:</h2>\n<div class=\"actions\">\n");
    for kind in AnalysisKind::ALL {
        out.push_str(&format!(
            "<form method=\"post\" action=\"/analyze/{}\"><button type=\"submit\"{disabled}>{}</button></form>\n",
            kind.slug(),
            escaped(&button_label(kind, view.salesperson)),
        ));
    }
    out.push_str("</div>\n");

    if state.processing_action_items {
        spinner(out, "Extracting action items...");
    }
    if let Some(result) = &state.action_items {
        out.push_str(&format!(
            "<hr>\n<h3>Action Items for {}:</h3>\n",
            escaped(view.salesperson)
        ));
        if result.is_error() {
            banner(
                out,
                NoticeLevel::Info,
                "Could not extract action items due to an agent processing error (see error message above).",
            );
        } else {
            out.push_str("<div class=\"markdown\">\n");
            html::push_html(out, Parser::new(&result.text));
            out.push_str("</div>\n");
        }
    }

    if state.processing_email {
        spinner(out, "Generating follow-up email...");
    }
    if let Some(result) = &state.follow_up_email {
        out.push_str("<hr>\n<h3>Generated Follow-up Email Body:</h3>\n");
        if result.is_error() {
            banner(
                out,
                NoticeLevel::Info,
                "Could not generate email due to an agent processing error (see error message above).",
            );
        } else {
            out.push_str(&format!(
                "<label for=\"email-body\">Email Body</label>\n<textarea id=\"email-body\" style=\"height: 300px\">{}</textarea>\n",
                escaped(&result.text)
            ));
        }
    }
}

fn button_label(kind: AnalysisKind, salesperson: &str) -> String {
    match kind {
        AnalysisKind::ActionItems => {
            let first_name = salesperson.split_whitespace().next().unwrap_or(salesperson);
            format!("Get {}'s Action Items", first_name)
        }
        AnalysisKind::Email => "Generate Follow-up Email".to_string(),
    }
}

fn spinner(out: &mut String, message: &str) {
    out.push_str(&format!(
        "<div class=\"spinner\" role=\"status\">{}</div>\n",
        escaped(message)
    ));
}

fn banner(out: &mut String, level: NoticeLevel, message: &str) {
    let class = match level {
        NoticeLevel::Success => "success",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    out.push_str(&format!(
        "<div class=\"banner {class}\">{}</div>\n",
        escaped(message)
    ));
}

fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String cannot fail.
    let _ = escape_html(&mut out, text);
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem auto;max-width:72rem;padding:0 1rem}\
.banner{padding:.75rem 1rem;border-radius:.4rem;margin:.5rem 0}\
.success{background:#e6f4ea}.info{background:#e8f0fe}.warning{background:#fff4e5}.error{background:#fdecea}\
.actions{display:flex;gap:1rem}.actions form{flex:1}.actions button{width:100%;padding:.6rem}\
.spinner{font-style:italic;margin:1rem 0}\
textarea{width:100%;font-family:inherit}";

// src/dashboard/render.rs
use super::{Dashboard, Question, ToastKind, View};
use crate::models::Survey;
use std::fmt::Write;

const TITLE_WIDTH: usize = 36;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

// Plain-text rendering of the whole dashboard
pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::new();

    if dashboard.view() == View::Landing {
        let _ = writeln!(out, "SurveyForge");
        let _ = writeln!(out, "Sign in to create, review and approve surveys.");
        return out;
    }

    let signed_in = dashboard
        .auth()
        .user()
        .map(|user| format!("{} <{}>", user.name, user.email))
        .unwrap_or_else(|| "not signed in".to_string());
    let _ = writeln!(out, "Survey Dashboard  [{} data]  {}", dashboard.source_name(), signed_in);

    if let Some(error) = dashboard.error() {
        let _ = writeln!(out, "! {}", error);
    }

    for toast in dashboard.toasts() {
        let marker = match toast.kind {
            ToastKind::Success => "+",
            ToastKind::Error => "x",
        };
        let _ = writeln!(out, "{} {}: {}", marker, toast.title, toast.description);
    }

    let stats = dashboard.stats();
    let _ = writeln!(
        out,
        "Total Surveys: {}  Drafts: {}  Pending Review: {}  Approved: {}",
        stats.total, stats.draft, stats.pending, stats.approved
    );
    let _ = writeln!(
        out,
        "Filter: {}  Sort: {}",
        dashboard.filter().label(),
        dashboard.sort().label()
    );

    if dashboard.surveys().is_empty() {
        let _ = writeln!(out, "No surveys yet. Create your first survey.");
        return out;
    }

    match dashboard.showing_range() {
        Some((first, last, total)) => {
            let _ = writeln!(out, "Showing {} to {} of {} surveys", first, last, total);
        }
        None => {
            let _ = writeln!(out, "No surveys match this filter.");
            return out;
        }
    }

    let _ = writeln!(
        out,
        "{:<38} {:<16} {:<width$} {:>9}  {:<10}",
        "ID",
        "STATUS",
        "TITLE",
        "RESPONSES",
        "CREATED",
        width = TITLE_WIDTH
    );
    for survey in dashboard.visible() {
        let _ = writeln!(
            out,
            "{:<38} {:<16} {:<width$} {:>9}  {:<10}",
            survey.id,
            survey.status.label(),
            truncate(&survey.title, TITLE_WIDTH),
            survey.response_count,
            survey.created_at.format("%Y-%m-%d"),
            width = TITLE_WIDTH
        );
    }

    let pages = dashboard.total_pages();
    if pages > 1 {
        let _ = writeln!(out, "Page {} of {}", dashboard.current_page(), pages);
    }

    out
}

// Detail view of one survey
pub fn render_survey(survey: &Survey) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", survey.title);
    if !survey.description.is_empty() {
        let _ = writeln!(out, "{}", survey.description);
    }
    let _ = writeln!(out, "ID:        {}", survey.id);
    let _ = writeln!(out, "Status:    {}", survey.status.label());
    let _ = writeln!(out, "Created:   {}", survey.created_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "Responses: {}", survey.response_count);
    if let (Some(approver), Some(approved_at)) = (&survey.approver, survey.approved_at) {
        let _ = writeln!(out, "Approved:  {} by {}", approved_at.format("%Y-%m-%d"), approver);
    }
    if let Some(form_url) = &survey.form_url {
        let _ = writeln!(out, "Form:      {}", form_url);
    }
    if !survey.questions.is_empty() {
        let _ = writeln!(out, "Questions:");
        for (number, question) in survey.questions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", number + 1, question);
        }
    }
    out
}

// Preview of a new survey's questions as form fields
pub fn render_questions(title: &str, questions: &[Question]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title.trim());
    for (number, question) in questions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {} ({})", number + 1, question.title, question.kind);
        for option in &question.options {
            let _ = writeln!(out, "     - {}", option);
        }
    }
    out
}

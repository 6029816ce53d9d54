// src/dashboard/forms.rs
use crate::models::{ApproveRequest, CreateSurveyRequest};
use derive_more::Display;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

// Reasons a form is refused before anything is sent
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingTitle,
    MissingCandidateEmails,
    MissingQuestions,
    NoValidEmails,
    InvalidEmails(Vec<String>),
    MissingRecipient,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::MissingTitle => write!(f, "Survey title is required"),
            ValidationError::MissingCandidateEmails => write!(f, "At least one candidate email is required"),
            ValidationError::MissingQuestions => write!(f, "Please enter at least one question"),
            ValidationError::NoValidEmails => write!(f, "Please enter at least one valid email address"),
            ValidationError::InvalidEmails(emails) => write!(f, "Invalid email addresses: {}", emails.join(", ")),
            ValidationError::MissingRecipient => write!(f, "Recipient email is required"),
        }
    }
}

impl std::error::Error for ValidationError {}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

// One question per non-empty line
pub fn parse_questions(input: &str) -> Vec<String> {
    non_empty_lines(input)
}

pub fn parse_emails(input: &str) -> Vec<String> {
    non_empty_lines(input)
}

fn non_empty_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// Form field type of a parsed question
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionKind {
    #[display(fmt = "Short answer")]
    Text,
    #[display(fmt = "Paragraph")]
    Paragraph,
    #[display(fmt = "Multiple choice")]
    MultipleChoice,
    #[display(fmt = "Checkboxes")]
    Checkbox,
    #[display(fmt = "Dropdown")]
    Dropdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub required: bool,
    pub options: Vec<String>,
}

impl Question {
    fn new(title: String, kind: QuestionKind) -> Self {
        Self {
            title,
            kind,
            required: false,
            options: Vec::new(),
        }
    }
}

// Checked in order; the first kind with a marker present wins
const KIND_MARKERS: [(QuestionKind, &[&str]); 5] = [
    (QuestionKind::Paragraph, &["[PARAGRAPH]", "[LONG]"]),
    (QuestionKind::MultipleChoice, &["[MULTIPLE_CHOICE]", "[RADIO]"]),
    (QuestionKind::Checkbox, &["[CHECKBOX]"]),
    (QuestionKind::Dropdown, &["[DROPDOWN]"]),
    (QuestionKind::Text, &["[TEXT]", "[SHORT]"]),
];

const BULLETS: [char; 3] = ['-', '*', '•'];

fn split_kind(text: &str) -> (QuestionKind, String) {
    for (kind, markers) in KIND_MARKERS {
        if markers.iter().any(|marker| text.contains(marker)) {
            let title = markers
                .iter()
                .fold(text.to_string(), |title, marker| title.replace(marker, ""));
            return (kind, title.trim().to_string());
        }
    }
    (QuestionKind::Text, text.trim().to_string())
}

/// Parse a question outline into typed form questions.
///
/// A line starting with a digit opens a question, as does a bulleted line
/// while no question is open. Bulleted lines under an open question are its
/// options. A `[TYPE]` marker sets the kind, and other lines are skipped.
/// Text with no numbered or bulleted line becomes one short-answer question.
pub fn parse_typed_questions(text: &str) -> Vec<Question> {
    let mut questions: Vec<Question> = Vec::new();
    let mut current: Option<Question> = None;

    for line in text.trim().lines().map(str::trim).filter(|line| !line.is_empty()) {
        let numbered = line.starts_with(|c: char| c.is_ascii_digit());
        let bulleted = line.starts_with(&BULLETS[..]);

        if numbered || (bulleted && current.is_none()) {
            questions.extend(current.take());
            let stripped = line.trim_start_matches(|c: char| c.is_ascii_digit() || ".-*•() ".contains(c));
            let (kind, title) = split_kind(stripped);
            current = Some(Question::new(title, kind));
        } else if bulleted {
            let option = line.trim_start_matches(|c: char| "-*•() ".contains(c)).trim();
            match current.as_mut() {
                Some(question) if !option.is_empty() => question.options.push(option.to_string()),
                _ => {}
            }
        }
    }
    questions.extend(current);

    if questions.is_empty() && !text.trim().is_empty() {
        questions.push(Question::new(text.trim().to_string(), QuestionKind::Text));
    }
    questions
}

// Raw contents of the "new survey" form
#[derive(Debug, Clone, Default)]
pub struct CreateSurveyForm {
    pub title: String,
    pub description: String,
    pub candidate_emails: String,
    pub questions: String,
}

impl CreateSurveyForm {
    // Questions laid out as form fields, for the preview step
    pub fn preview(&self) -> Result<Vec<Question>, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let questions = parse_typed_questions(&self.questions);
        if questions.is_empty() {
            return Err(ValidationError::MissingQuestions);
        }
        Ok(questions)
    }

    pub fn validate(&self) -> Result<CreateSurveyRequest, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.candidate_emails.trim().is_empty() {
            return Err(ValidationError::MissingCandidateEmails);
        }

        let questions = parse_questions(&self.questions);
        if questions.is_empty() {
            return Err(ValidationError::MissingQuestions);
        }

        let emails = parse_emails(&self.candidate_emails);
        if emails.is_empty() {
            return Err(ValidationError::NoValidEmails);
        }

        let invalid: Vec<String> = emails.iter().filter(|email| !is_valid_email(email)).cloned().collect();
        if !invalid.is_empty() {
            return Err(ValidationError::InvalidEmails(invalid));
        }

        Ok(CreateSurveyRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            questions,
            candidate_emails: emails,
            form_url: None,
        })
    }
}

// Raw contents of the approve dialog
#[derive(Debug, Clone, Default)]
pub struct ApproveForm {
    pub recipient_email: String,
    pub custom_message: String,
}

impl ApproveForm {
    pub fn validate(&self) -> Result<ApproveRequest, ValidationError> {
        let recipient = self.recipient_email.trim();
        if recipient.is_empty() {
            return Err(ValidationError::MissingRecipient);
        }

        let message = self.custom_message.trim();
        Ok(ApproveRequest {
            approver: Some(recipient.to_string()),
            notes: (!message.is_empty()).then(|| message.to_string()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CreateSurveyForm {
        CreateSurveyForm {
            title: "Team pulse".to_string(),
            description: "Monthly check-in".to_string(),
            candidate_emails: "ana@example.com\n\n  bo@example.org  \n".to_string(),
            questions: "How are you?\n\n  What should change?\n".to_string(),
        }
    }

    #[test]
    fn valid_form_becomes_a_request() {
        let request = filled().validate().unwrap();
        assert_eq!(request.title, "Team pulse");
        assert_eq!(request.questions, vec!["How are you?", "What should change?"]);
        assert_eq!(request.candidate_emails, vec!["ana@example.com", "bo@example.org"]);
    }

    #[test]
    fn checks_run_in_order() {
        let mut form = filled();
        form.title = "   ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingTitle));

        let mut form = filled();
        form.candidate_emails = "\n".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingCandidateEmails));

        let mut form = filled();
        form.questions = " \n ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::MissingQuestions));
    }

    #[test]
    fn reports_every_malformed_email() {
        let mut form = filled();
        form.candidate_emails = "ok@example.com\nnope\nstill@nodot".to_string();
        let err = form.validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidEmails(vec!["nope".to_string(), "still@nodot".to_string()]));
        assert_eq!(err.to_string(), "Invalid email addresses: nope, still@nodot");
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("@c.de"));
        assert!(!is_valid_email("a@b"));
    }

    #[test]
    fn preview_needs_title_and_questions() {
        let mut form = filled();
        form.questions = "1. How are you?\n2. What should change? [PARAGRAPH]".to_string();
        let preview = form.preview().unwrap();
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[1].kind, QuestionKind::Paragraph);

        let empty = CreateSurveyForm::default();
        assert_eq!(empty.preview(), Err(ValidationError::MissingTitle));

        form.questions = "  \n".to_string();
        assert_eq!(form.preview(), Err(ValidationError::MissingQuestions));
    }

    #[test]
    fn numbered_outline_with_markers_and_options() {
        let questions = parse_typed_questions(
            "1. What is your name? [TEXT]\n\
             2. Choose your favorite color [MULTIPLE_CHOICE]\n   - Red\n   - Blue\n   - Green\n\
             3. Tell us about yourself [PARAGRAPH]\n",
        );

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0], Question::new("What is your name?".to_string(), QuestionKind::Text));
        assert_eq!(questions[1].title, "Choose your favorite color");
        assert_eq!(questions[1].kind, QuestionKind::MultipleChoice);
        assert_eq!(questions[1].options, vec!["Red", "Blue", "Green"]);
        assert_eq!(questions[2].title, "Tell us about yourself");
        assert_eq!(questions[2].kind, QuestionKind::Paragraph);
        assert!(questions.iter().all(|question| !question.required));
    }

    #[test]
    fn bullet_opens_a_question_only_when_none_is_open() {
        let questions = parse_typed_questions("- Pick a size [DROPDOWN]\n- Small\n* Large\nloose text\n2) Extras [CHECKBOX]\n• Bag");

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].title, "Pick a size");
        assert_eq!(questions[0].kind, QuestionKind::Dropdown);
        assert_eq!(questions[0].options, vec!["Small", "Large"]);
        assert_eq!(questions[1].title, "Extras");
        assert_eq!(questions[1].kind, QuestionKind::Checkbox);
        assert_eq!(questions[1].options, vec!["Bag"]);
    }

    #[test]
    fn alternate_markers_and_plain_text() {
        let questions = parse_typed_questions("1. Story [LONG]\n2. Vote [RADIO]\n3. Name [SHORT]");
        let kinds: Vec<QuestionKind> = questions.iter().map(|question| question.kind).collect();
        assert_eq!(kinds, vec![QuestionKind::Paragraph, QuestionKind::MultipleChoice, QuestionKind::Text]);
        assert_eq!(questions[2].title, "Name");

        let single = parse_typed_questions("  How was onboarding?  ");
        assert_eq!(single, vec![Question::new("How was onboarding?".to_string(), QuestionKind::Text)]);
        assert!(parse_typed_questions(" \n ").is_empty());
    }

    #[test]
    fn question_serializes_with_form_type_names() {
        let question = Question::new("Vote".to_string(), QuestionKind::MultipleChoice);
        assert_eq!(
            serde_json::to_value(&question).unwrap(),
            serde_json::json!({ "title": "Vote", "type": "MULTIPLE_CHOICE", "required": false, "options": [] })
        );
    }

    #[test]
    fn approve_form() {
        assert_eq!(ApproveForm::default().validate(), Err(ValidationError::MissingRecipient));

        let request = ApproveForm {
            recipient_email: " lead@example.com ".to_string(),
            custom_message: String::new(),
        }
        .validate()
        .unwrap();
        assert_eq!(request.approver.as_deref(), Some("lead@example.com"));
        assert_eq!(request.notes, None);
    }
}

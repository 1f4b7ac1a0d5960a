// src/services/chatbot.rs
use super::history::{Speaker, Turn};

/// Produces the bot's answer to one user message.
///
/// Implementations return replies in display order. An empty list is a valid
/// answer; the endpoint then sends `{}` and the widget shows its fallback.
pub trait Responder: Send + Sync {
    fn respond(&self, history: &[Turn], user_msg: &str) -> Vec<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Admissions,
    Departments,
    Contact,
    Unknown,
}

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "namaste", "greetings"];
const ADMISSION_WORDS: &[&str] = &["admission", "admissions", "apply", "application", "eligibility", "fee", "fees"];
const DEPARTMENT_WORDS: &[&str] = &["department", "departments", "branch", "branches", "course", "courses", "program", "programs"];
const CONTACT_WORDS: &[&str] = &["contact", "contacts", "phone", "email", "address", "call"];

pub fn detect_intent(msg: &str) -> Intent {
    let msg_lower = msg.to_lowercase();
    let words: Vec<&str> = msg_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let mentions = |vocab: &[&str]| words.iter().any(|w| vocab.contains(w));

    if mentions(ADMISSION_WORDS) {
        Intent::Admissions
    } else if mentions(DEPARTMENT_WORDS) {
        Intent::Departments
    } else if mentions(CONTACT_WORDS) {
        Intent::Contact
    } else if mentions(GREETING_WORDS) {
        Intent::Greeting
    } else {
        Intent::Unknown
    }
}

/// Rule-based stand-in for the reply generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordResponder;

impl Responder for KeywordResponder {
    fn respond(&self, history: &[Turn], user_msg: &str) -> Vec<String> {
        let has_talked = history.iter().any(|t| t.speaker == Speaker::Bot);

        match detect_intent(user_msg) {
            Intent::Greeting => {
                if has_talked {
                    vec!["Hi again! What else would you like to know?".to_string()]
                } else {
                    vec!["Hi! Ask me about admissions, departments or contacts.".to_string()]
                }
            }
            Intent::Admissions => vec![
                "Admissions are open for the upcoming academic session.".to_string(),
                "You can apply online through the admissions portal or visit the campus admission cell.".to_string(),
            ],
            Intent::Departments => vec![
                "NIET offers programs across engineering, management, pharmacy and computer applications.".to_string(),
            ],
            Intent::Contact => vec![
                "You can reach the admission cell by phone or email during office hours, Monday to Saturday.".to_string(),
            ],
            Intent::Unknown => {
                if has_talked {
                    vec![format!("I didn't quite catch that: {user_msg}")]
                } else {
                    vec!["I can help with admissions, departments and contact details. Could you rephrase?".to_string()]
                }
            }
        }
    }
}

mod languagetool;

pub use languagetool::{LanguageToolClient, LanguageToolResponse};

use serde::{Deserialize, Serialize};

/// How a grammar match counts towards the essay's error totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Spelling,
    Grammar,
}

impl IssueKind {
    /// LanguageTool marks spelling problems with the `misspelling` issue type;
    /// every other issue type counts as grammar
    pub fn from_issue_type(issue_type: &str) -> Self {
        if issue_type.eq_ignore_ascii_case("misspelling") {
            Self::Spelling
        } else {
            Self::Grammar
        }
    }
}

/// One problem reported by a grammar checker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarMatch {
    pub rule_id: String,
    pub message: String,
    pub offset: usize,
    pub length: usize,
    pub kind: IssueKind,
}

impl GrammarMatch {
    pub fn spelling(rule_id: &str) -> Self {
        Self::with_kind(rule_id, IssueKind::Spelling)
    }

    pub fn grammar(rule_id: &str) -> Self {
        Self::with_kind(rule_id, IssueKind::Grammar)
    }

    fn with_kind(rule_id: &str, kind: IssueKind) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            message: String::new(),
            offset: 0,
            length: 0,
            kind,
        }
    }
}

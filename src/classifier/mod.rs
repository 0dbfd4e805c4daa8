pub mod gemini;

use async_trait::async_trait;

pub use gemini::GeminiClassifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted { reason: String },
    Rejected { reason: String },
    Unavailable { reason: String },
}

impl Verdict {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Verdict::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Accepted { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            Verdict::Accepted { reason }
            | Verdict::Rejected { reason }
            | Verdict::Unavailable { reason } => reason,
        }
    }

    pub fn outcome_label(&self) -> &'static str {
        match self {
            Verdict::Accepted { .. } => "accepted",
            Verdict::Rejected { .. } => "rejected",
            Verdict::Unavailable { .. } => "unavailable",
        }
    }
}

#[async_trait]
pub trait PhotoClassifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> Verdict;
}

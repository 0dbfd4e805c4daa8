#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use delivery_handshake::classifier::{PhotoClassifier, Verdict};

pub struct FixedClassifier {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(verdict: Verdict) -> Arc<Self> {
        Arc::new(Self {
            verdict,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn accepting() -> Arc<Self> {
        Self::new(Verdict::Accepted {
            reason: "parcel in front of door 12".to_string(),
        })
    }

    pub fn rejecting(reason: &str) -> Arc<Self> {
        Self::new(Verdict::Rejected {
            reason: reason.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoClassifier for FixedClassifier {
    async fn classify(&self, _image: &[u8]) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }
}

//! Best-effort external classification: "is this really a transaction?" and
//! "which category?". Callers treat every failure as "use the default".

use anyhow::Result;
use radar_core::{Category, Transaction};
use std::future::Future;

/// Answer to the confidence check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_transaction: bool,
    /// 0.0 ..= 1.0
    pub confidence: f64,
}

impl Verdict {
    /// Only a confident "no" blocks extraction
    pub fn rejects(&self, threshold: f64) -> bool {
        !self.is_transaction && self.confidence >= threshold
    }
}

pub trait Classifier: Send + Sync {
    fn verify(&self, body: &str) -> impl Future<Output = Result<Verdict>> + Send;

    /// `Ok(None)` means "no opinion"
    fn categorize(&self, txn: &Transaction)
    -> impl Future<Output = Result<Option<Category>>> + Send;
}

/// No external service: never rejects, never categorizes
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Classifier for Offline {
    async fn verify(&self, _body: &str) -> Result<Verdict> {
        Ok(Verdict {
            is_transaction: true,
            confidence: 0.0,
        })
    }

    async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_confident_no_rejects() {
        let no = |confidence| Verdict {
            is_transaction: false,
            confidence,
        };
        assert!(no(0.9).rejects(0.8));
        assert!(no(0.8).rejects(0.8));
        assert!(!no(0.5).rejects(0.8));
        assert!(
            !Verdict {
                is_transaction: true,
                confidence: 1.0
            }
            .rejects(0.8)
        );
    }

    #[tokio::test]
    async fn test_offline_never_blocks() {
        let v = Offline.verify("anything").await.unwrap();
        assert!(!v.rejects(0.0));
        let t = Transaction::new(1.0, "01-01-24", "x", radar_core::TxnType::Debit, "x");
        assert_eq!(Offline.categorize(&t).await.unwrap(), None);
    }
}

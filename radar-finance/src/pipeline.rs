//! Manual (paste) ingestion and the category step shared with the poller.

use radar_core::{Category, Transaction};
use radar_ingest::TransactionExtractor;
use std::time::Duration;
use thiserror::Error;

use crate::category_rules;
use crate::classifier::Classifier;
use crate::store::TransactionStore;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Could not identify a transaction in this message")]
    NotRecognized,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// How long a single classifier call may take before its answer is ignored
pub const DEFAULT_CLASSIFIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Attach a category: keyword rules first, then the classifier for
/// anything the rules leave as `Other`. Classifier trouble, or no answer
/// within `limit`, keeps `Other`.
pub async fn assign_category<C: Classifier>(
    txn: Transaction,
    classifier: &C,
    limit: Duration,
) -> Transaction {
    let category = match category_rules::categorize(&txn) {
        Category::Other => {
            match tokio::time::timeout(limit, classifier.categorize(&txn)).await {
                Ok(Ok(Some(category))) => category,
                Ok(Ok(None)) => Category::Other,
                Ok(Err(e)) => {
                    tracing::warn!(id = %txn.id, "category lookup failed, using other: {e:#}");
                    Category::Other
                }
                Err(_) => {
                    tracing::warn!(id = %txn.id, ?limit, "category lookup timed out, using other");
                    Category::Other
                }
            }
        }
        category => category,
    };
    txn.with_category(category)
}

/// Parse one pasted message into a categorized transaction, ready for the
/// user to confirm. Nothing is stored.
pub async fn parse_pasted<C: Classifier>(
    extractor: &TransactionExtractor,
    classifier: &C,
    text: &str,
) -> Result<Transaction, IngestError> {
    let txn = extractor.extract(text).ok_or(IngestError::NotRecognized)?;
    Ok(assign_category(txn, classifier, DEFAULT_CLASSIFIER_TIMEOUT).await)
}

/// Persist a transaction the user confirmed
pub fn confirm<S: TransactionStore + ?Sized>(
    store: &S,
    txn: &Transaction,
) -> Result<(), IngestError> {
    store.append(txn)?;
    tracing::info!(id = %txn.id, amount = txn.amount, "saved transaction");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Offline, Verdict};
    use crate::store::MemoryStore;
    use anyhow::{Result, bail};
    use radar_core::TxnType;

    struct Failing;

    impl Classifier for Failing {
        async fn verify(&self, _body: &str) -> Result<Verdict> {
            bail!("service down")
        }

        async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
            bail!("service down")
        }
    }

    struct AlwaysHealth;

    impl Classifier for AlwaysHealth {
        async fn verify(&self, _body: &str) -> Result<Verdict> {
            Ok(Verdict {
                is_transaction: true,
                confidence: 1.0,
            })
        }

        async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
            Ok(Some(Category::Health))
        }
    }

    #[tokio::test]
    async fn test_parse_pasted_categorizes() {
        let ex = TransactionExtractor::new().unwrap();
        let txn = parse_pasted(
            &ex,
            &Offline,
            "HDFC Bank: INR 1,499.00 debited from a/c XX1234 on 12-04-23 AMAZON. Avl bal: INR 24,599.35",
        )
        .await
        .unwrap();
        assert_eq!(txn.amount, 1499.0);
        assert_eq!(txn.category, Some(Category::Shopping));
    }

    #[tokio::test]
    async fn test_parse_pasted_not_recognized() {
        let ex = TransactionExtractor::new().unwrap();
        let err = parse_pasted(&ex, &Offline, "Your OTP is 493021. Do not share it with anyone.")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::NotRecognized));
        assert_eq!(err.to_string(), "Could not identify a transaction in this message");
    }

    #[tokio::test]
    async fn test_classifier_only_consulted_for_other() {
        let food = Transaction::new(1.0, "01-01-24", "ZOMATO", TxnType::Debit, "x");
        let misc = Transaction::new(1.0, "01-01-24", "ATM WDL", TxnType::Debit, "x");

        let limit = DEFAULT_CLASSIFIER_TIMEOUT;
        let food = assign_category(food, &AlwaysHealth, limit).await;
        assert_eq!(food.category, Some(Category::Food));

        let misc_ai = assign_category(misc.clone(), &AlwaysHealth, limit).await;
        assert_eq!(misc_ai.category, Some(Category::Health));

        let misc_failed = assign_category(misc, &Failing, limit).await;
        assert_eq!(misc_failed.category, Some(Category::Other));
    }

    struct Silent;

    impl Classifier for Silent {
        async fn verify(&self, _body: &str) -> Result<Verdict> {
            std::future::pending().await
        }

        async fn categorize(&self, _txn: &Transaction) -> Result<Option<Category>> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_unanswered_category_lookup_falls_back_to_other() {
        let misc = Transaction::new(1.0, "01-01-24", "ATM WDL", TxnType::Debit, "x");
        let txn = assign_category(misc, &Silent, Duration::from_millis(50)).await;
        assert_eq!(txn.category, Some(Category::Other));
    }

    #[tokio::test]
    async fn test_confirm_persists() {
        let store = MemoryStore::new();
        let ex = TransactionExtractor::new().unwrap();
        let txn = parse_pasted(&ex, &Offline, "Rs 750.00 debited from a/c XX9988 on 03-05-24 to SHELL PETROL. -Federal Bank")
            .await
            .unwrap();
        confirm(&store, &txn).unwrap();
        assert!(matches!(confirm(&store, &txn), Err(IngestError::Storage(_))));
        assert_eq!(store.load_all().unwrap(), vec![txn]);
    }
}

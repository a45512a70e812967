//! Spending totals over stored transactions.

use radar_core::{Category, Transaction};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpendingSummary {
    pub total_debit: f64,
    pub total_credit: f64,
    pub count: usize,
    /// Debits per category, largest first
    pub by_category: Vec<CategoryTotal>,
}

impl SpendingSummary {
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let mut groups: HashMap<Category, (f64, usize)> = HashMap::new();
        let mut total_debit = 0.0;
        let mut total_credit = 0.0;

        for txn in txns {
            if txn.is_credit() {
                total_credit += txn.amount;
                continue;
            }
            total_debit += txn.amount;
            let entry = groups
                .entry(txn.category.unwrap_or(Category::Other))
                .or_default();
            entry.0 += txn.amount;
            entry.1 += 1;
        }

        let mut by_category: Vec<CategoryTotal> = groups
            .into_iter()
            .map(|(category, (total, count))| CategoryTotal {
                category,
                total,
                count,
            })
            .collect();
        by_category.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });

        Self {
            total_debit,
            total_credit,
            count: txns.len(),
            by_category,
        }
    }

    /// Credits minus debits
    pub fn net(&self) -> f64 {
        self.total_credit - self.total_debit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radar_core::TxnType;

    fn txn(amount: f64, txn_type: TxnType, category: Option<Category>) -> Transaction {
        let t = Transaction::new(amount, "01-01-24", "x", txn_type, "x");
        match category {
            Some(c) => t.with_category(c),
            None => t,
        }
    }

    #[test]
    fn test_totals_and_ordering() {
        let txns = vec![
            txn(100.0, TxnType::Debit, Some(Category::Food)),
            txn(250.0, TxnType::Debit, Some(Category::Food)),
            txn(500.0, TxnType::Debit, Some(Category::Shopping)),
            txn(40.0, TxnType::Debit, None),
            txn(1000.0, TxnType::Credit, Some(Category::Income)),
        ];
        let s = SpendingSummary::from_transactions(&txns);
        assert_eq!(s.count, 5);
        assert_eq!(s.total_debit, 890.0);
        assert_eq!(s.total_credit, 1000.0);
        assert_eq!(s.net(), 110.0);

        let order: Vec<_> = s.by_category.iter().map(|c| c.category).collect();
        assert_eq!(order, vec![Category::Shopping, Category::Food, Category::Other]);
        assert_eq!(s.by_category[1].count, 2);
        assert_eq!(s.by_category[1].total, 350.0);
    }

    #[test]
    fn test_empty() {
        let s = SpendingSummary::from_transactions(&[]);
        assert_eq!(s, SpendingSummary::default());
    }
}

//! Ordered table of bank SMS templates.
//!
//! Each template pairs a regex with a plain extraction function. The table is
//! tried top to bottom and the first template whose regex matches and whose
//! extraction succeeds wins, so specific shapes must come before the
//! bank-neutral ones at the bottom.

use anyhow::{Context, Result};
use radar_core::{Transaction, TxnType, date, parse_amount};
use regex::{Captures, Regex};

use crate::parsers;
use crate::types::Fields;

/// Pulls the fields out of a template's captures; `None` means "not this template".
pub type ExtractFn = fn(&Captures<'_>) -> Option<Fields>;

/// Uncompiled template definition, as written in the per-bank modules
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub name: &'static str,
    pub bank: Option<&'static str>,
    pub txn_type: TxnType,
    pub pattern: &'static str,
    pub extract: ExtractFn,
}

/// A compiled template
#[derive(Debug, Clone)]
pub struct BankPattern {
    pub name: &'static str,
    pub bank: Option<&'static str>,
    pub txn_type: TxnType,
    regex: Regex,
    extract: ExtractFn,
}

impl BankPattern {
    pub fn compile(template: Template) -> Result<Self> {
        let regex = Regex::new(template.pattern)
            .with_context(|| format!("compiling template {}", template.name))?;
        Ok(Self {
            name: template.name,
            bank: template.bank,
            txn_type: template.txn_type,
            regex,
            extract: template.extract,
        })
    }

    /// Structural match only; extraction may still reject the captures
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Build a transaction from `text` if this template recognizes it.
    ///
    /// `text` is expected to be whitespace-normalized already and is stored
    /// as the transaction's original SMS.
    pub fn apply(&self, text: &str) -> Option<Transaction> {
        let caps = self.regex.captures(text)?;
        let fields = (self.extract)(&caps)?;
        Some(
            Transaction::new(
                fields.amount,
                fields.date,
                fields.description,
                self.txn_type,
                text,
            )
            .with_balance(fields.balance)
            .with_bank(self.bank),
        )
    }
}

pub struct PatternLibrary {
    patterns: Vec<BankPattern>,
}

impl PatternLibrary {
    /// All built-in templates in priority order
    pub fn builtin() -> Result<Self> {
        Self::from_templates(parsers::all_templates())
    }

    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Result<Self> {
        let patterns = templates
            .into_iter()
            .map(BankPattern::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BankPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First template that both matches and extracts, with its result
    pub fn first_match(&self, text: &str) -> Option<(&BankPattern, Transaction)> {
        self.patterns
            .iter()
            .find_map(|p| p.apply(text).map(|txn| (p, txn)))
    }

    /// Names of every template whose regex matches `text`, in table order
    pub fn matching_names(&self, text: &str) -> Vec<&'static str> {
        self.patterns
            .iter()
            .filter(|p| p.is_match(text))
            .map(|p| p.name)
            .collect()
    }
}

// Capture helpers shared by the template modules.

pub(crate) fn cap_amount(caps: &Captures<'_>, name: &str) -> Option<f64> {
    parse_amount(caps.name(name)?.as_str())
}

pub(crate) fn cap_text(caps: &Captures<'_>, name: &str) -> Option<String> {
    let s = caps.name(name)?.as_str().trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Month-name dates (`18Feb25`, `05-Mar-24`) reformatted to `dd-mm-yy`
pub(crate) fn cap_month_date(caps: &Captures<'_>, name: &str) -> Option<String> {
    date::expand_month_name_date(caps.name(name)?.as_str())
}

pub(crate) fn cap_verbatim_date(caps: &Captures<'_>, name: &str) -> Option<String> {
    Some(caps.name(name)?.as_str().to_string())
}

//! Per-bank SMS templates.
//!
//! Order here is match priority: bank-specific templates first, the
//! bank-neutral account templates last.

pub mod account;
pub mod axis;
pub mod hdfc;
pub mod icici;
pub mod kotak;
pub mod sbi;

use crate::patterns::Template;

pub fn all_templates() -> Vec<Template> {
    let mut out = Vec::new();
    out.extend(hdfc::templates());
    out.extend(sbi::templates());
    out.extend(icici::templates());
    out.extend(axis::templates());
    out.extend(kotak::templates());
    out.extend(account::templates());
    out
}

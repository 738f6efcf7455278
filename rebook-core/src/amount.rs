//! Amount expressions: the `=120+45.5-30` style sums kept in ledger cells.
//!
//! Only additive/subtractive sums of plain numbers are understood. `=`, `(`
//! and `)` are decoration and get stripped before anything is split.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

const DECORATION: [char; 3] = ['=', '(', ')'];

/// Terms of one cell split by sign.
///
/// A `-` inside a `+`-segment turns every following term of that segment
/// negative: `120-30+45-10` gives positives `[120, 45]` and negatives `[30, 10]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAmount {
    pub positives: Vec<f64>,
    pub negatives: Vec<f64>,
}

impl ParsedAmount {
    pub fn is_empty(&self) -> bool {
        self.positives.is_empty() && self.negatives.is_empty()
    }

    /// Net value of the expression.
    pub fn total(&self) -> f64 {
        self.positives.iter().sum::<f64>() - self.negatives.iter().sum::<f64>()
    }
}

/// Strip formula decoration from raw cell text.
pub fn clean_cell(raw: &str) -> String {
    raw.chars().filter(|c| !DECORATION.contains(c)).collect()
}

/// Coerce one term to a number. Empty text is `0`; thousands separators are ignored.
pub fn to_amount(term: &str) -> Result<f64> {
    parse_term(term, term)
}

fn parse_term(raw: &str, term: &str) -> Result<f64> {
    let t = term.trim();
    if t.is_empty() {
        return Ok(0.0);
    }
    let malformed = || LedgerError::MalformedAmount {
        raw: raw.to_string(),
        term: t.to_string(),
    };
    let value: f64 = t.replace(',', "").parse().map_err(|_| malformed())?;
    if !value.is_finite() {
        return Err(malformed());
    }
    Ok(value)
}

/// Parse a cell into its positive and negative terms.
///
/// Empty segments (a leading `-`, a dangling `+`) contribute no term, so an
/// empty cell parses to two empty lists.
pub fn parse(raw: &str) -> Result<ParsedAmount> {
    let cleaned = clean_cell(raw);
    let mut parsed = ParsedAmount::default();

    for segment in cleaned.split('+') {
        for (i, term) in segment.split('-').enumerate() {
            if term.trim().is_empty() {
                continue;
            }
            let value = parse_term(raw, term)?;
            if i == 0 {
                parsed.positives.push(value);
            } else {
                parsed.negatives.push(value);
            }
        }
    }

    Ok(parsed)
}

/// Split a cell on `+` only, one term per segment.
///
/// Used for the net-income column where every segment is a separate income.
/// A `-` inside a segment is folded into that segment's value, so
/// `=1000-50+20` gives `[950, 20]`.
pub fn plus_terms(raw: &str) -> Result<Vec<f64>> {
    let mut terms = Vec::new();
    for segment in clean_cell(raw).split('+') {
        let signed = signed_terms_in(raw, segment)?;
        if !signed.is_empty() {
            terms.push(signed.iter().sum::<f64>());
        }
    }
    Ok(terms)
}

/// Split a cell into signed terms: `+100-50` and `100+-50` both give `[100, -50]`.
///
/// Runs of operators combine their signs.
pub fn signed_terms(raw: &str) -> Result<Vec<f64>> {
    signed_terms_in(raw, &clean_cell(raw))
}

fn signed_terms_in(raw: &str, cleaned: &str) -> Result<Vec<f64>> {
    let mut terms = Vec::new();
    let mut sign = 1.0;
    let mut current = String::new();

    for ch in cleaned.chars() {
        match ch {
            '+' | '-' => {
                if !current.trim().is_empty() {
                    terms.push(sign * parse_term(raw, &current)?);
                    sign = 1.0;
                }
                current.clear();
                if ch == '-' {
                    sign = -sign;
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        terms.push(sign * parse_term(raw, &current)?);
    }

    Ok(terms)
}

/// Render a number as a formula the destination sheet evaluates back to it.
pub fn amount_expression(value: f64) -> String {
    format!("={}", value)
}

//! Canonicalisation of raw codes into the value space seen during training.

use crate::types::RawApplicationRecord;

/// Education codes with no documented meaning in the source dataset.
const UNUSED_EDUCATION_CODES: [i32; 3] = [0, 5, 6];
/// Education bucket for "others".
const EDUCATION_OTHER: i32 = 4;
/// Marital-status code with no documented meaning.
const UNUSED_MARRIAGE_CODE: i32 = 0;
/// Marital-status bucket for "others".
const MARRIAGE_OTHER: i32 = 3;
/// Payment-status codes meaning "no consumption" (-2) or "paid in full" (-1).
const NO_USAGE_PAY_CODES: [i32; 2] = [-2, -1];
const PAID_ON_TIME: i32 = 0;

/// Collapses unused education and marital-status codes into their "other" buckets.
///
/// Codes outside the documented ranges are passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryNormalizer;

impl CategoryNormalizer {
    pub fn education(code: i32) -> i32 {
        if UNUSED_EDUCATION_CODES.contains(&code) {
            EDUCATION_OTHER
        } else {
            code
        }
    }

    pub fn marriage(code: i32) -> i32 {
        if code == UNUSED_MARRIAGE_CODE {
            MARRIAGE_OTHER
        } else {
            code
        }
    }

    /// Normalise the categorical fields of a record in place.
    pub fn apply(record: &mut RawApplicationRecord) {
        record.education = Self::education(record.education);
        record.marriage = Self::marriage(record.marriage);
    }
}

/// Harmonises payment-status codes that do not signal a delinquency.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentHistoryNormalizer;

impl PaymentHistoryNormalizer {
    pub fn status(code: i32) -> i32 {
        if NO_USAGE_PAY_CODES.contains(&code) {
            PAID_ON_TIME
        } else {
            code
        }
    }

    /// Normalise each of the six payment periods independently.
    pub fn apply(record: &mut RawApplicationRecord) {
        let statuses = record.pay_statuses().map(Self::status);
        record.set_pay_statuses(statuses);
    }
}

/// Run both normalisers, returning the canonical copy of `record`.
pub fn normalize(record: &RawApplicationRecord) -> RawApplicationRecord {
    let mut normalized = *record;
    CategoryNormalizer::apply(&mut normalized);
    PaymentHistoryNormalizer::apply(&mut normalized);
    normalized
}

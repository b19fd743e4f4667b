//! Credit application record as submitted to the prediction endpoint

use serde::{Deserialize, Serialize};

/// One credit-application snapshot to be scored for default risk.
///
/// Field names on the wire are the dataset's upper-case column names and all
/// of them are required. Missing or mistyped fields are rejected by the JSON
/// extractor before the record reaches the feature pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawApplicationRecord {
    /// Credit limit
    #[serde(rename = "LIMIT_BAL")]
    pub limit_bal: f64,

    /// Sex (1 = male, 2 = female)
    #[serde(rename = "SEX")]
    pub sex: i32,

    /// Education level (1 = graduate, 2 = university, 3 = high school, 4 = others)
    #[serde(rename = "EDUCATION")]
    pub education: i32,

    /// Marital status (1 = married, 2 = single, 3 = others)
    #[serde(rename = "MARRIAGE")]
    pub marriage: i32,

    /// Age in years
    #[serde(rename = "AGE")]
    pub age: i32,

    /// Repayment status, most recent month (-1 = pay duly, 1 = one month late, ...)
    #[serde(rename = "PAY_0")]
    pub pay_0: i32,

    #[serde(rename = "PAY_2")]
    pub pay_2: i32,

    #[serde(rename = "PAY_3")]
    pub pay_3: i32,

    #[serde(rename = "PAY_4")]
    pub pay_4: i32,

    #[serde(rename = "PAY_5")]
    pub pay_5: i32,

    #[serde(rename = "PAY_6")]
    pub pay_6: i32,

    /// Bill statement amount, most recent month first
    #[serde(rename = "BILL_AMT1")]
    pub bill_amt1: f64,

    #[serde(rename = "BILL_AMT2")]
    pub bill_amt2: f64,

    #[serde(rename = "BILL_AMT3")]
    pub bill_amt3: f64,

    #[serde(rename = "BILL_AMT4")]
    pub bill_amt4: f64,

    #[serde(rename = "BILL_AMT5")]
    pub bill_amt5: f64,

    #[serde(rename = "BILL_AMT6")]
    pub bill_amt6: f64,

    /// Amount of previous payment, most recent month first
    #[serde(rename = "PAY_AMT1")]
    pub pay_amt1: f64,

    #[serde(rename = "PAY_AMT2")]
    pub pay_amt2: f64,

    #[serde(rename = "PAY_AMT3")]
    pub pay_amt3: f64,

    #[serde(rename = "PAY_AMT4")]
    pub pay_amt4: f64,

    #[serde(rename = "PAY_AMT5")]
    pub pay_amt5: f64,

    #[serde(rename = "PAY_AMT6")]
    pub pay_amt6: f64,
}

impl RawApplicationRecord {
    /// Create a record with the given credit limit and age.
    ///
    /// Categorical fields default to the first category of each field and
    /// all payment history is zeroed.
    pub fn new(limit_bal: f64, age: i32) -> Self {
        Self {
            limit_bal,
            sex: 1,
            education: 1,
            marriage: 1,
            age,
            pay_0: 0,
            pay_2: 0,
            pay_3: 0,
            pay_4: 0,
            pay_5: 0,
            pay_6: 0,
            bill_amt1: 0.0,
            bill_amt2: 0.0,
            bill_amt3: 0.0,
            bill_amt4: 0.0,
            bill_amt5: 0.0,
            bill_amt6: 0.0,
            pay_amt1: 0.0,
            pay_amt2: 0.0,
            pay_amt3: 0.0,
            pay_amt4: 0.0,
            pay_amt5: 0.0,
            pay_amt6: 0.0,
        }
    }

    /// Payment-status codes for the six billing periods, most recent first.
    pub fn pay_statuses(&self) -> [i32; 6] {
        [
            self.pay_0, self.pay_2, self.pay_3, self.pay_4, self.pay_5, self.pay_6,
        ]
    }

    /// Overwrite the six payment-status codes, most recent first.
    pub fn set_pay_statuses(&mut self, statuses: [i32; 6]) {
        let [p0, p2, p3, p4, p5, p6] = statuses;
        self.pay_0 = p0;
        self.pay_2 = p2;
        self.pay_3 = p3;
        self.pay_4 = p4;
        self.pay_5 = p5;
        self.pay_6 = p6;
    }

    /// Value of a categorical field by its column name.
    pub fn category(&self, field: &str) -> Option<i32> {
        match field {
            "SEX" => Some(self.sex),
            "EDUCATION" => Some(self.education),
            "MARRIAGE" => Some(self.marriage),
            _ => None,
        }
    }

    /// Pass-through numeric columns in dataset order, as `(name, value)` pairs.
    ///
    /// Categorical fields are excluded; they are expanded by the encoder.
    pub fn numeric_columns(&self) -> [(&'static str, f64); 20] {
        [
            ("LIMIT_BAL", self.limit_bal),
            ("AGE", self.age as f64),
            ("PAY_0", self.pay_0 as f64),
            ("PAY_2", self.pay_2 as f64),
            ("PAY_3", self.pay_3 as f64),
            ("PAY_4", self.pay_4 as f64),
            ("PAY_5", self.pay_5 as f64),
            ("PAY_6", self.pay_6 as f64),
            ("BILL_AMT1", self.bill_amt1),
            ("BILL_AMT2", self.bill_amt2),
            ("BILL_AMT3", self.bill_amt3),
            ("BILL_AMT4", self.bill_amt4),
            ("BILL_AMT5", self.bill_amt5),
            ("BILL_AMT6", self.bill_amt6),
            ("PAY_AMT1", self.pay_amt1),
            ("PAY_AMT2", self.pay_amt2),
            ("PAY_AMT3", self.pay_amt3),
            ("PAY_AMT4", self.pay_amt4),
            ("PAY_AMT5", self.pay_amt5),
            ("PAY_AMT6", self.pay_amt6),
        ]
    }
}

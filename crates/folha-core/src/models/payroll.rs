//! Pay slip data models.

use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Pay slip extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollData {
    /// Employee name.
    pub employee_name: String,

    /// Employee identifier (not present in the supported layouts).
    pub employee_id: String,

    /// Period label ("MM/YYYY").
    pub period: String,

    /// Earnings ("proventos"), in document order.
    pub earnings: Vec<PayrollItem>,

    /// Deductions ("descontos"), in document order.
    pub deductions: Vec<PayrollItem>,

    /// Total earnings.
    pub total_earnings: Decimal,

    /// Total deductions.
    pub total_deductions: Decimal,

    /// Net salary (total earnings minus total deductions).
    pub net_salary: Decimal,

    /// Where the stored totals came from in this parse run.
    #[serde(default)]
    pub totals_source: TotalsSource,
}

/// Provenance of the aggregate amounts on a [`PayrollData`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsSource {
    /// Read from an explicit TOTAL line in the document.
    TotalLine,
    /// Summed over the parsed items.
    #[default]
    ItemSum,
}

/// Payroll line item (earning or deduction).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PayrollItem {
    /// Item code, 3-4 characters ("0020", "M200", "/314").
    pub code: String,

    /// Free-text description.
    pub description: String,

    /// Quantity (hours, days, or a percentage reference).
    pub quantity: Decimal,

    /// Unit value.
    pub value: Decimal,
}

impl PayrollItem {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        quantity: Decimal,
        value: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            quantity,
            value,
        }
    }

    /// Line total, always `quantity × value`.
    pub fn total(&self) -> Decimal {
        self.quantity * self.value
    }
}

// The total is written out for report consumers but never read back.
impl Serialize for PayrollItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PayrollItem", 5)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("quantity", &self.quantity)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("total", &self.total())?;
        state.end()
    }
}

impl PayrollData {
    /// Create an empty pay slip.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parsed line items in both categories.
    pub fn item_count(&self) -> usize {
        self.earnings.len() + self.deductions.len()
    }

    /// Sum of earning totals.
    pub fn earnings_sum(&self) -> Decimal {
        self.earnings.iter().map(PayrollItem::total).sum()
    }

    /// Sum of deduction totals.
    pub fn deductions_sum(&self) -> Decimal {
        self.deductions.iter().map(PayrollItem::total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_total_is_quantity_times_value() {
        let samples = [
            ("183.25", "11.12"),
            ("0", "1500.00"),
            ("30", "0.5"),
            ("1.333", "3"),
        ];

        for (q, v) in samples {
            let mut item = PayrollItem::new("0020", "Horas Normais", dec(q), dec(v));
            assert_eq!(item.total(), dec(q) * dec(v));

            // Total follows the fields; nothing is cached.
            item.quantity += Decimal::ONE;
            assert_eq!(item.total(), (dec(q) + Decimal::ONE) * dec(v));
        }
    }

    #[test]
    fn test_serialized_item_carries_total() {
        let item = PayrollItem::new("0020", "Horas Normais", dec("2"), dec("10.50"));
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["code"], "0020");
        assert_eq!(json["total"], serde_json::to_value(dec("21.00")).unwrap());

        let back: PayrollItem = serde_json::from_value(json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_sums() {
        let mut data = PayrollData::new();
        data.earnings.push(PayrollItem::new("0020", "Horas", dec("10"), dec("2")));
        data.earnings.push(PayrollItem::new("1000", "Bonus", dec("1"), dec("5")));
        data.deductions.push(PayrollItem::new("/314", "INSS", dec("1"), dec("3")));

        assert_eq!(data.item_count(), 3);
        assert_eq!(data.earnings_sum(), dec("25"));
        assert_eq!(data.deductions_sum(), dec("3"));
    }
}

//! Pay slip ("holerite") parser.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::extraction::{DocumentParser, Extraction, Result};
use crate::models::{NumberPolicy, PayrollData, TextOrigin, TotalsSource};
use crate::rules::{resolve_number, EMPLOYEE, FIELD_LABEL, MONTH_YEAR};

use super::items::{find_total_line, is_earning_code, scan_items};

/// Pay slip parser.
#[derive(Debug, Clone, Default)]
pub struct PayrollParser {
    origin: TextOrigin,
    number_policy: NumberPolicy,
}

impl PayrollParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text that came from the given source.
    pub fn with_origin(mut self, origin: TextOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_number_policy(mut self, policy: NumberPolicy) -> Self {
        self.number_policy = policy;
        self
    }

    fn extract_period(&self, text: &str) -> Option<String> {
        MONTH_YEAR.captures(text).map(|caps| caps[1].to_string())
    }

    fn extract_employee(&self, text: &str) -> Option<String> {
        let caps = EMPLOYEE.captures(text)?;
        let mut name = &caps[1];

        // Flattened text keeps going past the name
        if let Some(label) = FIELD_LABEL.find(name) {
            name = &name[..label.start()];
        }

        let name = name.trim().trim_end_matches([':', '-', ',']).trim();
        (!name.is_empty()).then(|| name.to_string())
    }
}

impl DocumentParser for PayrollParser {
    type Output = PayrollData;

    fn parse(&self, text: &str) -> Result<Extraction<PayrollData>> {
        let start = Instant::now();
        let mut warnings = Vec::new();
        let mut record = PayrollData::new();

        info!("Parsing pay slip from {} characters of text", text.len());

        match self.extract_period(text) {
            Some(period) => record.period = period,
            None => warnings.push("period (Mês/Ano) not found".to_string()),
        }

        match self.extract_employee(text) {
            Some(name) => record.employee_name = name,
            None => warnings.push("employee name (Funcionário) not found".to_string()),
        }

        let total_line = find_total_line(text);
        let items = scan_items(
            text,
            self.origin,
            total_line.as_ref().map(|m| m.position),
            self.number_policy,
            &mut warnings,
        )?;

        if items.is_empty() {
            warn!("No line items found in pay slip text");
            warnings.push("no line items found".to_string());
        }

        for item in items {
            if is_earning_code(&item.code) {
                record.earnings.push(item);
            } else {
                record.deductions.push(item);
            }
        }

        match total_line {
            Some(total) => {
                debug!("Using TOTAL line: {}", total.source);
                record.total_earnings =
                    resolve_number(&total.value.earnings, "total earnings", self.number_policy, &mut warnings)?;
                record.total_deductions =
                    resolve_number(&total.value.deductions, "total deductions", self.number_policy, &mut warnings)?;
                record.totals_source = TotalsSource::TotalLine;
            }
            None => {
                record.total_earnings = record.earnings_sum();
                record.total_deductions = record.deductions_sum();
                record.totals_source = TotalsSource::ItemSum;
            }
        }
        record.net_salary = record.total_earnings - record.total_deductions;

        debug!(
            "Extracted {} earnings and {} deductions, net {}",
            record.earnings.len(),
            record.deductions.len(),
            record.net_salary
        );

        Ok(Extraction {
            record,
            origin: self.origin,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

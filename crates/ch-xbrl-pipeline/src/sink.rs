//! `RowSink`: where assembled rows go.
//!
//! The only implementation here serializes to a local CSV file. It stands
//! in for "CSV serialization + upload to an object store" at the
//! serialization half only — no object-store client is introduced.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ch_xbrl_core::Row;

pub const HEADER: &[&str] = &[
    "run_code",
    "company_id",
    "date",
    "file_type",
    "taxonomy",
    "balance_sheet_date",
    "companies_house_registered_number",
    "entity_current_legal_name",
    "company_dormant",
    "average_number_employees_during_period",
    "period_start",
    "period_end",
    "tangible_fixed_assets",
    "debtors",
    "cash_bank_in_hand",
    "current_assets",
    "creditors_due_within_one_year",
    "creditors_due_after_one_year",
    "net_current_assets_liabilities",
    "total_assets_less_current_liabilities",
    "net_assets_liabilities_including_pension_asset_liability",
    "called_up_share_capital",
    "profit_loss_account_reserve",
    "shareholder_funds",
    "turnover_gross_operating_revenue",
    "other_operating_income",
    "cost_sales",
    "gross_profit_loss",
    "administrative_expenses",
    "raw_materials_consumables",
    "staff_costs",
    "depreciation_other_amounts_written_off_tangible_intangible_fixed_assets",
    "other_operating_charges_format2",
    "operating_profit_loss",
    "profit_loss_on_ordinary_activities_before_tax",
    "tax_on_profit_or_loss_on_ordinary_activities",
    "profit_loss_for_period",
];

/// Where a batch of assembled rows is sent. A single filing can produce
/// multiple rows (one per period); callers write them all through one
/// `write_rows` call so an implementation can batch if it wants to.
pub trait RowSink: Send + Sync {
    fn write_rows(&self, rows: &[Row]) -> Result<()>;
    fn finish(&self) -> Result<()>;
}

fn row_to_record(row: &Row) -> Vec<String> {
    let opt_date = |d: Option<chrono::NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    let opt_str = |s: &Option<String>| s.clone().unwrap_or_default();
    let opt_bool = |b: Option<bool>| b.map(|b| b.to_string()).unwrap_or_default();
    let opt_dec = |d: &Option<bigdecimal::BigDecimal>| d.as_ref().map(|d| d.to_string()).unwrap_or_default();

    vec![
        row.run_code.clone(),
        row.company_id.clone(),
        row.date.format("%Y-%m-%d").to_string(),
        row.file_type.clone(),
        row.taxonomy.clone(),
        opt_date(row.balance_sheet_date),
        opt_str(&row.companies_house_registered_number),
        opt_str(&row.entity_current_legal_name),
        opt_bool(row.company_dormant),
        opt_dec(&row.average_number_employees_during_period),
        opt_date(row.period_start),
        opt_date(row.period_end),
        opt_dec(&row.tangible_fixed_assets),
        opt_dec(&row.debtors),
        opt_dec(&row.cash_bank_in_hand),
        opt_dec(&row.current_assets),
        opt_dec(&row.creditors_due_within_one_year),
        opt_dec(&row.creditors_due_after_one_year),
        opt_dec(&row.net_current_assets_liabilities),
        opt_dec(&row.total_assets_less_current_liabilities),
        opt_dec(&row.net_assets_liabilities_including_pension_asset_liability),
        opt_dec(&row.called_up_share_capital),
        opt_dec(&row.profit_loss_account_reserve),
        opt_dec(&row.shareholder_funds),
        opt_dec(&row.turnover_gross_operating_revenue),
        opt_dec(&row.other_operating_income),
        opt_dec(&row.cost_sales),
        opt_dec(&row.gross_profit_loss),
        opt_dec(&row.administrative_expenses),
        opt_dec(&row.raw_materials_consumables),
        opt_dec(&row.staff_costs),
        opt_dec(&row.depreciation_other_amounts_written_off_tangible_intangible_fixed_assets),
        opt_dec(&row.other_operating_charges_format2),
        opt_dec(&row.operating_profit_loss),
        opt_dec(&row.profit_loss_on_ordinary_activities_before_tax),
        opt_dec(&row.tax_on_profit_or_loss_on_ordinary_activities),
        opt_dec(&row.profit_loss_for_period),
    ]
}

/// Writes rows to a single CSV file. Internally mutex-guarded so it can be
/// shared across the worker pool's concurrent filing tasks.
pub struct CsvSink {
    writer: Mutex<csv::Writer<File>>,
}

impl CsvSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(HEADER)?;
        Ok(CsvSink {
            writer: Mutex::new(writer),
        })
    }
}

impl RowSink for CsvSink {
    fn write_rows(&self, rows: &[Row]) -> Result<()> {
        let mut writer = self.writer.lock().expect("csv writer mutex poisoned");
        for row in rows {
            writer.write_record(row_to_record(row))?;
        }
        Ok(())
    }

    fn finish(&self) -> Result<()> {
        self.writer.lock().expect("csv writer mutex poisoned").flush()?;
        Ok(())
    }
}

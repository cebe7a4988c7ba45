//! Turns extracted [`Facts`] plus the source filename and document into the
//! fixed 37-column row schema.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::Document;
use serde::{Deserialize, Serialize};

use crate::catalog::{GeneralColumn, PeriodicColumn};
use crate::error::{ExtractError, ExtractResult};
use crate::extract::{Facts, PeriodKey};
use crate::value::parse_permissive_date;

/// One output record. Field order matches the normative 37-column catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub run_code: String,
    pub company_id: String,
    pub date: NaiveDate,
    pub file_type: String,
    pub taxonomy: String,

    pub balance_sheet_date: Option<NaiveDate>,
    pub companies_house_registered_number: Option<String>,
    pub entity_current_legal_name: Option<String>,
    pub company_dormant: Option<bool>,
    pub average_number_employees_during_period: Option<BigDecimal>,

    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,

    pub tangible_fixed_assets: Option<BigDecimal>,
    pub debtors: Option<BigDecimal>,
    pub cash_bank_in_hand: Option<BigDecimal>,
    pub current_assets: Option<BigDecimal>,
    pub creditors_due_within_one_year: Option<BigDecimal>,
    pub creditors_due_after_one_year: Option<BigDecimal>,
    pub net_current_assets_liabilities: Option<BigDecimal>,
    pub total_assets_less_current_liabilities: Option<BigDecimal>,
    pub net_assets_liabilities_including_pension_asset_liability: Option<BigDecimal>,
    pub called_up_share_capital: Option<BigDecimal>,
    pub profit_loss_account_reserve: Option<BigDecimal>,
    pub shareholder_funds: Option<BigDecimal>,
    pub turnover_gross_operating_revenue: Option<BigDecimal>,
    pub other_operating_income: Option<BigDecimal>,
    pub cost_sales: Option<BigDecimal>,
    pub gross_profit_loss: Option<BigDecimal>,
    pub administrative_expenses: Option<BigDecimal>,
    pub raw_materials_consumables: Option<BigDecimal>,
    pub staff_costs: Option<BigDecimal>,
    pub depreciation_other_amounts_written_off_tangible_intangible_fixed_assets: Option<BigDecimal>,
    pub other_operating_charges_format2: Option<BigDecimal>,
    pub operating_profit_loss: Option<BigDecimal>,
    pub profit_loss_on_ordinary_activities_before_tax: Option<BigDecimal>,
    pub tax_on_profit_or_loss_on_ordinary_activities: Option<BigDecimal>,
    pub profit_loss_for_period: Option<BigDecimal>,
}

/// `Prod224_1234_01234567_20221231.html`-style filenames.
static FILENAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Prod\d+_\d+)_([^_]+)_(\d{8})\.(html|xml)$").unwrap());

/// The only taxonomy namespace URIs this extractor recognizes, in the fixed
/// order the joined `taxonomy` column uses.
const TAXONOMY_WHITELIST: &[&str] = &[
    "http://www.xbrl.org/uk/fr/gaap/pt/2004-12-01",
    "http://www.xbrl.org/uk/gaap/core/2009-09-01",
    "http://xbrl.frc.org.uk/fr/2014-09-01/core",
];

pub struct CoreAttributes {
    pub run_code: String,
    pub company_id: String,
    pub date: NaiveDate,
    pub file_type: String,
}

/// Parses the basename (ignoring any directory components) against the
/// `Prod<n>_<n>_<company>_<YYYYMMDD>.<ext>` grammar.
pub fn parse_filename(filename: &str) -> ExtractResult<CoreAttributes> {
    let basename = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let captures = FILENAME_PATTERN
        .captures(basename)
        .ok_or_else(|| ExtractError::UnrecognizedFilename(filename.to_string()))?;

    let date_text = &captures[3];
    let date = parse_permissive_date(date_text)
        .ok_or_else(|| ExtractError::UnrecognizedFilename(filename.to_string()))?;

    Ok(CoreAttributes {
        run_code: captures[1].to_string(),
        company_id: captures[2].to_string(),
        date,
        file_type: captures[4].to_string(),
    })
}

/// `;`-joined intersection of the document's declared namespace URIs with
/// the fixed taxonomy whitelist, in whitelist order.
pub fn taxonomy_for(doc: &Document) -> String {
    let declared: std::collections::HashSet<&str> =
        doc.root_element().namespaces().map(|ns| ns.uri()).collect();

    TAXONOMY_WHITELIST
        .iter()
        .filter(|uri| declared.contains(*uri))
        .copied()
        .collect::<Vec<_>>()
        .join(";")
}

/// Assembles the final row set: one row per period if any periodic facts
/// were found, otherwise a single row with all period-scoped columns null.
pub fn assemble_rows(core: CoreAttributes, taxonomy: String, facts: &Facts) -> Vec<Row> {
    let general = GeneralValues::from_facts(facts);

    let mut periods: Vec<(PeriodKey, PeriodicValues)> = facts
        .periods()
        .map(|period| (period.clone(), PeriodicValues::from_facts(facts, period)))
        .collect();

    periods.sort_by(|(a, _), (b, _)| {
        let a_parsed = (parse_opt_date(&a.0), parse_opt_date(&a.1));
        let b_parsed = (parse_opt_date(&b.0), parse_opt_date(&b.1));
        b_parsed.cmp(&a_parsed)
    });

    if periods.is_empty() {
        return vec![build_row(&core, &taxonomy, &general, None, None, &PeriodicValues::default())];
    }

    periods
        .into_iter()
        .map(|(period, values)| {
            let start = parse_opt_date(&period.0);
            let end = parse_opt_date(&period.1);
            build_row(&core, &taxonomy, &general, start, end, &values)
        })
        .collect()
}

fn parse_opt_date(text: &Option<String>) -> Option<NaiveDate> {
    text.as_deref().and_then(parse_permissive_date)
}

#[derive(Default)]
struct GeneralValues {
    balance_sheet_date: Option<NaiveDate>,
    companies_house_registered_number: Option<String>,
    entity_current_legal_name: Option<String>,
    company_dormant: Option<bool>,
    average_number_employees_during_period: Option<BigDecimal>,
}

impl GeneralValues {
    fn from_facts(facts: &Facts) -> Self {
        GeneralValues {
            balance_sheet_date: facts
                .general_value(GeneralColumn::BalanceSheetDate)
                .and_then(|v| v.as_date()),
            companies_house_registered_number: facts
                .general_value(GeneralColumn::CompaniesHouseRegisteredNumber)
                .and_then(|v| v.as_str())
                .map(str::to_string),
            entity_current_legal_name: facts
                .general_value(GeneralColumn::EntityCurrentLegalName)
                .and_then(|v| v.as_str())
                .map(str::to_string),
            company_dormant: facts
                .general_value(GeneralColumn::CompanyDormant)
                .and_then(|v| v.as_bool()),
            average_number_employees_during_period: facts
                .general_value(GeneralColumn::AverageNumberEmployeesDuringPeriod)
                .and_then(|v| v.as_decimal())
                .cloned(),
        }
    }
}

#[derive(Default)]
struct PeriodicValues {
    tangible_fixed_assets: Option<BigDecimal>,
    debtors: Option<BigDecimal>,
    cash_bank_in_hand: Option<BigDecimal>,
    current_assets: Option<BigDecimal>,
    creditors_due_within_one_year: Option<BigDecimal>,
    creditors_due_after_one_year: Option<BigDecimal>,
    net_current_assets_liabilities: Option<BigDecimal>,
    total_assets_less_current_liabilities: Option<BigDecimal>,
    net_assets_liabilities_including_pension_asset_liability: Option<BigDecimal>,
    called_up_share_capital: Option<BigDecimal>,
    profit_loss_account_reserve: Option<BigDecimal>,
    shareholder_funds: Option<BigDecimal>,
    turnover_gross_operating_revenue: Option<BigDecimal>,
    other_operating_income: Option<BigDecimal>,
    cost_sales: Option<BigDecimal>,
    gross_profit_loss: Option<BigDecimal>,
    administrative_expenses: Option<BigDecimal>,
    raw_materials_consumables: Option<BigDecimal>,
    staff_costs: Option<BigDecimal>,
    depreciation_other_amounts_written_off_tangible_intangible_fixed_assets: Option<BigDecimal>,
    other_operating_charges_format2: Option<BigDecimal>,
    operating_profit_loss: Option<BigDecimal>,
    profit_loss_on_ordinary_activities_before_tax: Option<BigDecimal>,
    tax_on_profit_or_loss_on_ordinary_activities: Option<BigDecimal>,
    profit_loss_for_period: Option<BigDecimal>,
}

impl PeriodicValues {
    fn from_facts(facts: &Facts, period: &PeriodKey) -> Self {
        let get = |column: PeriodicColumn| facts.periodic_value(column, period).and_then(|v| v.as_decimal()).cloned();

        PeriodicValues {
            tangible_fixed_assets: get(PeriodicColumn::TangibleFixedAssets),
            debtors: get(PeriodicColumn::Debtors),
            cash_bank_in_hand: get(PeriodicColumn::CashBankInHand),
            current_assets: get(PeriodicColumn::CurrentAssets),
            creditors_due_within_one_year: get(PeriodicColumn::CreditorsDueWithinOneYear),
            creditors_due_after_one_year: get(PeriodicColumn::CreditorsDueAfterOneYear),
            net_current_assets_liabilities: get(PeriodicColumn::NetCurrentAssetsLiabilities),
            total_assets_less_current_liabilities: get(PeriodicColumn::TotalAssetsLessCurrentLiabilities),
            net_assets_liabilities_including_pension_asset_liability: get(
                PeriodicColumn::NetAssetsLiabilitiesIncludingPensionAssetLiability,
            ),
            called_up_share_capital: get(PeriodicColumn::CalledUpShareCapital),
            profit_loss_account_reserve: get(PeriodicColumn::ProfitLossAccountReserve),
            shareholder_funds: get(PeriodicColumn::ShareholderFunds),
            turnover_gross_operating_revenue: get(PeriodicColumn::TurnoverGrossOperatingRevenue),
            other_operating_income: get(PeriodicColumn::OtherOperatingIncome),
            cost_sales: get(PeriodicColumn::CostSales),
            gross_profit_loss: get(PeriodicColumn::GrossProfitLoss),
            administrative_expenses: get(PeriodicColumn::AdministrativeExpenses),
            raw_materials_consumables: get(PeriodicColumn::RawMaterialsConsumables),
            staff_costs: get(PeriodicColumn::StaffCosts),
            depreciation_other_amounts_written_off_tangible_intangible_fixed_assets: get(
                PeriodicColumn::DepreciationOtherAmountsWrittenOffTangibleIntangibleFixedAssets,
            ),
            other_operating_charges_format2: get(PeriodicColumn::OtherOperatingChargesFormat2),
            operating_profit_loss: get(PeriodicColumn::OperatingProfitLoss),
            profit_loss_on_ordinary_activities_before_tax: get(
                PeriodicColumn::ProfitLossOnOrdinaryActivitiesBeforeTax,
            ),
            tax_on_profit_or_loss_on_ordinary_activities: get(
                PeriodicColumn::TaxOnProfitOrLossOnOrdinaryActivities,
            ),
            profit_loss_for_period: get(PeriodicColumn::ProfitLossForPeriod),
        }
    }
}

fn build_row(
    core: &CoreAttributes,
    taxonomy: &str,
    general: &GeneralValues,
    period_start: Option<NaiveDate>,
    period_end: Option<NaiveDate>,
    periodic: &PeriodicValues,
) -> Row {
    Row {
        run_code: core.run_code.clone(),
        company_id: core.company_id.clone(),
        date: core.date,
        file_type: core.file_type.clone(),
        taxonomy: taxonomy.to_string(),

        balance_sheet_date: general.balance_sheet_date,
        companies_house_registered_number: general.companies_house_registered_number.clone(),
        entity_current_legal_name: general.entity_current_legal_name.clone(),
        company_dormant: general.company_dormant,
        average_number_employees_during_period: general.average_number_employees_during_period.clone(),

        period_start,
        period_end,

        tangible_fixed_assets: periodic.tangible_fixed_assets.clone(),
        debtors: periodic.debtors.clone(),
        cash_bank_in_hand: periodic.cash_bank_in_hand.clone(),
        current_assets: periodic.current_assets.clone(),
        creditors_due_within_one_year: periodic.creditors_due_within_one_year.clone(),
        creditors_due_after_one_year: periodic.creditors_due_after_one_year.clone(),
        net_current_assets_liabilities: periodic.net_current_assets_liabilities.clone(),
        total_assets_less_current_liabilities: periodic.total_assets_less_current_liabilities.clone(),
        net_assets_liabilities_including_pension_asset_liability: periodic
            .net_assets_liabilities_including_pension_asset_liability
            .clone(),
        called_up_share_capital: periodic.called_up_share_capital.clone(),
        profit_loss_account_reserve: periodic.profit_loss_account_reserve.clone(),
        shareholder_funds: periodic.shareholder_funds.clone(),
        turnover_gross_operating_revenue: periodic.turnover_gross_operating_revenue.clone(),
        other_operating_income: periodic.other_operating_income.clone(),
        cost_sales: periodic.cost_sales.clone(),
        gross_profit_loss: periodic.gross_profit_loss.clone(),
        administrative_expenses: periodic.administrative_expenses.clone(),
        raw_materials_consumables: periodic.raw_materials_consumables.clone(),
        staff_costs: periodic.staff_costs.clone(),
        depreciation_other_amounts_written_off_tangible_intangible_fixed_assets: periodic
            .depreciation_other_amounts_written_off_tangible_intangible_fixed_assets
            .clone(),
        other_operating_charges_format2: periodic.other_operating_charges_format2.clone(),
        operating_profit_loss: periodic.operating_profit_loss.clone(),
        profit_loss_on_ordinary_activities_before_tax: periodic
            .profit_loss_on_ordinary_activities_before_tax
            .clone(),
        tax_on_profit_or_loss_on_ordinary_activities: periodic
            .tax_on_profit_or_loss_on_ordinary_activities
            .clone(),
        profit_loss_for_period: periodic.profit_loss_for_period.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_grammar_extracts_core_attributes() {
        let core = parse_filename("Prod224_1234_01234567_20221231.html").unwrap();
        assert_eq!(core.run_code, "Prod224_1234");
        assert_eq!(core.company_id, "01234567");
        assert_eq!(core.date, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        assert_eq!(core.file_type, "html");
    }

    #[test]
    fn filename_grammar_rejects_unrecognized_names() {
        assert!(parse_filename("not-a-filing.txt").is_err());
        assert!(parse_filename("Prod224_1234_01234567_2022123.html").is_err());
    }

    #[test]
    fn filename_grammar_ignores_directory_components() {
        let core = parse_filename("/data/filings/Prod224_1_01234567_20220101.xml").unwrap();
        assert_eq!(core.company_id, "01234567");
        assert_eq!(core.file_type, "xml");
    }

    #[test]
    fn no_periods_yields_single_row_with_nulls() {
        let facts = Facts::default();
        let core = CoreAttributes {
            run_code: "Prod224_1".to_string(),
            company_id: "01234567".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            file_type: "html".to_string(),
        };
        let rows = assemble_rows(core, String::new(), &facts);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period_start, None);
        assert_eq!(rows[0].period_end, None);
        assert_eq!(rows[0].debtors, None);
    }
}

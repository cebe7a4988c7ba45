//! The static column catalog and its derived matcher tables.
//!
//! Candidate declaration order within a column *is* its priority (0-based),
//! per the normative candidate-rule table. `TagOrAttr(s)` isn't a distinct
//! rule variant — it expands to a `TagName(s)` and a `NameAttr(s)` entry at
//! the same priority, the way the source's tag-or-attribute helper checks
//! both the element's local name and its `name` attribute for one logical
//! candidate.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use roxmltree::Node;

use crate::value::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneralColumn {
    BalanceSheetDate,
    CompaniesHouseRegisteredNumber,
    EntityCurrentLegalName,
    CompanyDormant,
    AverageNumberEmployeesDuringPeriod,
}

impl GeneralColumn {
    pub const ALL: [GeneralColumn; 5] = [
        GeneralColumn::BalanceSheetDate,
        GeneralColumn::CompaniesHouseRegisteredNumber,
        GeneralColumn::EntityCurrentLegalName,
        GeneralColumn::CompanyDormant,
        GeneralColumn::AverageNumberEmployeesDuringPeriod,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GeneralColumn::BalanceSheetDate => "balance_sheet_date",
            GeneralColumn::CompaniesHouseRegisteredNumber => "companies_house_registered_number",
            GeneralColumn::EntityCurrentLegalName => "entity_current_legal_name",
            GeneralColumn::CompanyDormant => "company_dormant",
            GeneralColumn::AverageNumberEmployeesDuringPeriod => "average_number_employees_during_period",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodicColumn {
    TangibleFixedAssets,
    Debtors,
    CashBankInHand,
    CurrentAssets,
    CreditorsDueWithinOneYear,
    CreditorsDueAfterOneYear,
    NetCurrentAssetsLiabilities,
    TotalAssetsLessCurrentLiabilities,
    NetAssetsLiabilitiesIncludingPensionAssetLiability,
    CalledUpShareCapital,
    ProfitLossAccountReserve,
    ShareholderFunds,
    TurnoverGrossOperatingRevenue,
    OtherOperatingIncome,
    CostSales,
    GrossProfitLoss,
    AdministrativeExpenses,
    RawMaterialsConsumables,
    StaffCosts,
    DepreciationOtherAmountsWrittenOffTangibleIntangibleFixedAssets,
    OtherOperatingChargesFormat2,
    OperatingProfitLoss,
    ProfitLossOnOrdinaryActivitiesBeforeTax,
    TaxOnProfitOrLossOnOrdinaryActivities,
    ProfitLossForPeriod,
}

impl PeriodicColumn {
    pub const ALL: [PeriodicColumn; 25] = [
        PeriodicColumn::TangibleFixedAssets,
        PeriodicColumn::Debtors,
        PeriodicColumn::CashBankInHand,
        PeriodicColumn::CurrentAssets,
        PeriodicColumn::CreditorsDueWithinOneYear,
        PeriodicColumn::CreditorsDueAfterOneYear,
        PeriodicColumn::NetCurrentAssetsLiabilities,
        PeriodicColumn::TotalAssetsLessCurrentLiabilities,
        PeriodicColumn::NetAssetsLiabilitiesIncludingPensionAssetLiability,
        PeriodicColumn::CalledUpShareCapital,
        PeriodicColumn::ProfitLossAccountReserve,
        PeriodicColumn::ShareholderFunds,
        PeriodicColumn::TurnoverGrossOperatingRevenue,
        PeriodicColumn::OtherOperatingIncome,
        PeriodicColumn::CostSales,
        PeriodicColumn::GrossProfitLoss,
        PeriodicColumn::AdministrativeExpenses,
        PeriodicColumn::RawMaterialsConsumables,
        PeriodicColumn::StaffCosts,
        PeriodicColumn::DepreciationOtherAmountsWrittenOffTangibleIntangibleFixedAssets,
        PeriodicColumn::OtherOperatingChargesFormat2,
        PeriodicColumn::OperatingProfitLoss,
        PeriodicColumn::ProfitLossOnOrdinaryActivitiesBeforeTax,
        PeriodicColumn::TaxOnProfitOrLossOnOrdinaryActivities,
        PeriodicColumn::ProfitLossForPeriod,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PeriodicColumn::TangibleFixedAssets => "tangible_fixed_assets",
            PeriodicColumn::Debtors => "debtors",
            PeriodicColumn::CashBankInHand => "cash_bank_in_hand",
            PeriodicColumn::CurrentAssets => "current_assets",
            PeriodicColumn::CreditorsDueWithinOneYear => "creditors_due_within_one_year",
            PeriodicColumn::CreditorsDueAfterOneYear => "creditors_due_after_one_year",
            PeriodicColumn::NetCurrentAssetsLiabilities => "net_current_assets_liabilities",
            PeriodicColumn::TotalAssetsLessCurrentLiabilities => "total_assets_less_current_liabilities",
            PeriodicColumn::NetAssetsLiabilitiesIncludingPensionAssetLiability => {
                "net_assets_liabilities_including_pension_asset_liability"
            }
            PeriodicColumn::CalledUpShareCapital => "called_up_share_capital",
            PeriodicColumn::ProfitLossAccountReserve => "profit_loss_account_reserve",
            PeriodicColumn::ShareholderFunds => "shareholder_funds",
            PeriodicColumn::TurnoverGrossOperatingRevenue => "turnover_gross_operating_revenue",
            PeriodicColumn::OtherOperatingIncome => "other_operating_income",
            PeriodicColumn::CostSales => "cost_sales",
            PeriodicColumn::GrossProfitLoss => "gross_profit_loss",
            PeriodicColumn::AdministrativeExpenses => "administrative_expenses",
            PeriodicColumn::RawMaterialsConsumables => "raw_materials_consumables",
            PeriodicColumn::StaffCosts => "staff_costs",
            PeriodicColumn::DepreciationOtherAmountsWrittenOffTangibleIntangibleFixedAssets => {
                "depreciation_other_amounts_written_off_tangible_intangible_fixed_assets"
            }
            PeriodicColumn::OtherOperatingChargesFormat2 => "other_operating_charges_format2",
            PeriodicColumn::OperatingProfitLoss => "operating_profit_loss",
            PeriodicColumn::ProfitLossOnOrdinaryActivitiesBeforeTax => {
                "profit_loss_on_ordinary_activities_before_tax"
            }
            PeriodicColumn::TaxOnProfitOrLossOnOrdinaryActivities => {
                "tax_on_profit_or_loss_on_ordinary_activities"
            }
            PeriodicColumn::ProfitLossForPeriod => "profit_loss_for_period",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ColumnKind {
    General(GeneralColumn),
    Periodic(PeriodicColumn),
}

/// A predicate-plus-selector pair for candidates that can't be expressed as
/// a plain tag-name or name-attribute equality check.
pub struct CustomRule {
    pub label: &'static str,
    pub matches: fn(local_name: &str, name_suffix: &str, context_ref: &str) -> bool,
    pub select: fn(element: Node) -> Option<Node>,
}

pub enum Rule {
    TagName(&'static str),
    NameAttr(&'static str),
    Custom(CustomRule),
}

pub struct Candidate {
    pub column: ColumnKind,
    pub priority: u32,
    pub rule: Rule,
    pub parser: Parser,
}

fn identity(element: Node) -> Option<Node> {
    Some(element)
}

fn first_span_descendant(element: Node) -> Option<Node> {
    element
        .descendants()
        .find(|d| d.is_element() && d.tag_name().name() == "span")
}

fn is_entity_current_legal_or_registered_name(local_name: &str, _suffix: &str, _ctx: &str) -> bool {
    local_name == "EntityCurrentLegalOrRegisteredName"
}

fn is_creditors_within_one_year(_local_name: &str, suffix: &str, ctx: &str) -> bool {
    suffix == "Creditors" && ctx.contains("WithinOneYear")
}

fn is_creditors_after_one_year(_local_name: &str, suffix: &str, ctx: &str) -> bool {
    suffix == "Creditors" && ctx.contains("AfterOneYear")
}

fn is_called_up_share_capital(_local_name: &str, suffix: &str, ctx: &str) -> bool {
    suffix == "Equity" && ctx.contains("ShareCapital")
}

fn is_profit_loss_account_reserve(_local_name: &str, suffix: &str, ctx: &str) -> bool {
    suffix == "Equity" && ctx.contains("RetainedEarningsAccumulatedLosses")
}

fn is_shareholder_funds(_local_name: &str, suffix: &str, ctx: &str) -> bool {
    suffix == "Equity" && !ctx.contains("segment")
}

fn tag_or_attr(out: &mut Vec<Candidate>, column: ColumnKind, priority: u32, name: &'static str, parser: Parser) {
    out.push(Candidate {
        column,
        priority,
        rule: Rule::TagName(name),
        parser,
    });
    out.push(Candidate {
        column,
        priority,
        rule: Rule::NameAttr(name),
        parser,
    });
}

fn build_candidates() -> Vec<Candidate> {
    use GeneralColumn as G;
    use PeriodicColumn as P;
    use Parser::*;

    let mut c = Vec::new();

    let g = ColumnKind::General(G::BalanceSheetDate);
    c.push(Candidate { column: g, priority: 0, rule: Rule::NameAttr("BalanceSheetDate"), parser: Date });
    c.push(Candidate { column: g, priority: 1, rule: Rule::TagName("BalanceSheetDate"), parser: Date });

    let g = ColumnKind::General(G::CompaniesHouseRegisteredNumber);
    c.push(Candidate { column: g, priority: 0, rule: Rule::NameAttr("UKCompaniesHouseRegisteredNumber"), parser: String });
    c.push(Candidate { column: g, priority: 1, rule: Rule::TagName("CompaniesHouseRegisteredNumber"), parser: String });

    let g = ColumnKind::General(G::EntityCurrentLegalName);
    c.push(Candidate { column: g, priority: 0, rule: Rule::NameAttr("EntityCurrentLegalOrRegisteredName"), parser: String });
    c.push(Candidate { column: g, priority: 1, rule: Rule::TagName("EntityCurrentLegalName"), parser: String });
    c.push(Candidate {
        column: g,
        priority: 2,
        rule: Rule::Custom(CustomRule {
            label: "entity_current_legal_name.first_span",
            matches: is_entity_current_legal_or_registered_name,
            select: first_span_descendant,
        }),
        parser: String,
    });

    let g = ColumnKind::General(G::CompanyDormant);
    c.push(Candidate { column: g, priority: 0, rule: Rule::NameAttr("EntityDormantTruefalse"), parser: Bool });
    c.push(Candidate { column: g, priority: 1, rule: Rule::NameAttr("EntityDormant"), parser: Bool });
    c.push(Candidate { column: g, priority: 2, rule: Rule::TagName("CompanyDormant"), parser: Bool });
    c.push(Candidate { column: g, priority: 3, rule: Rule::TagName("CompanyNotDormant"), parser: ReversedBool });

    let g = ColumnKind::General(G::AverageNumberEmployeesDuringPeriod);
    c.push(Candidate { column: g, priority: 0, rule: Rule::NameAttr("AverageNumberEmployeesDuringPeriod"), parser: DecimalWithColon });
    c.push(Candidate { column: g, priority: 1, rule: Rule::NameAttr("EmployeesTotal"), parser: DecimalWithColon });
    c.push(Candidate { column: g, priority: 2, rule: Rule::TagName("AverageNumberEmployeesDuringPeriod"), parser: DecimalWithColon });
    c.push(Candidate { column: g, priority: 3, rule: Rule::TagName("EmployeesTotal"), parser: DecimalWithColon });

    let p = ColumnKind::Periodic(P::TangibleFixedAssets);
    tag_or_attr(&mut c, p, 0, "FixedAssets", Decimal);
    tag_or_attr(&mut c, p, 1, "TangibleFixedAssets", Decimal);
    c.push(Candidate { column: p, priority: 2, rule: Rule::NameAttr("PropertyPlantEquipment"), parser: Decimal });

    let p = ColumnKind::Periodic(P::Debtors);
    tag_or_attr(&mut c, p, 0, "Debtors", Decimal);

    let p = ColumnKind::Periodic(P::CashBankInHand);
    tag_or_attr(&mut c, p, 0, "CashBankInHand", Decimal);
    c.push(Candidate { column: p, priority: 1, rule: Rule::NameAttr("CashBankOnHand"), parser: Decimal });

    let p = ColumnKind::Periodic(P::CurrentAssets);
    tag_or_attr(&mut c, p, 0, "CurrentAssets", Decimal);

    let p = ColumnKind::Periodic(P::CreditorsDueWithinOneYear);
    c.push(Candidate { column: p, priority: 0, rule: Rule::NameAttr("CreditorsDueWithinOneYear"), parser: Decimal });
    c.push(Candidate {
        column: p,
        priority: 1,
        rule: Rule::Custom(CustomRule {
            label: "creditors_due_within_one_year",
            matches: is_creditors_within_one_year,
            select: identity,
        }),
        parser: Decimal,
    });

    let p = ColumnKind::Periodic(P::CreditorsDueAfterOneYear);
    c.push(Candidate { column: p, priority: 0, rule: Rule::NameAttr("CreditorsDueAfterOneYear"), parser: Decimal });
    c.push(Candidate {
        column: p,
        priority: 1,
        rule: Rule::Custom(CustomRule {
            label: "creditors_due_after_one_year",
            matches: is_creditors_after_one_year,
            select: identity,
        }),
        parser: Decimal,
    });

    let p = ColumnKind::Periodic(P::NetCurrentAssetsLiabilities);
    tag_or_attr(&mut c, p, 0, "NetCurrentAssetsLiabilities", Decimal);

    let p = ColumnKind::Periodic(P::TotalAssetsLessCurrentLiabilities);
    tag_or_attr(&mut c, p, 0, "TotalAssetsLessCurrentLiabilities", Decimal);

    let p = ColumnKind::Periodic(P::NetAssetsLiabilitiesIncludingPensionAssetLiability);
    tag_or_attr(&mut c, p, 0, "NetAssetsLiabilitiesIncludingPensionAssetLiability", Decimal);
    tag_or_attr(&mut c, p, 1, "NetAssetsLiabilities", Decimal);

    let p = ColumnKind::Periodic(P::CalledUpShareCapital);
    tag_or_attr(&mut c, p, 0, "CalledUpShareCapital", Decimal);
    c.push(Candidate {
        column: p,
        priority: 1,
        rule: Rule::Custom(CustomRule {
            label: "called_up_share_capital",
            matches: is_called_up_share_capital,
            select: identity,
        }),
        parser: Decimal,
    });

    let p = ColumnKind::Periodic(P::ProfitLossAccountReserve);
    tag_or_attr(&mut c, p, 0, "ProfitLossAccountReserve", Decimal);
    c.push(Candidate {
        column: p,
        priority: 1,
        rule: Rule::Custom(CustomRule {
            label: "profit_loss_account_reserve",
            matches: is_profit_loss_account_reserve,
            select: identity,
        }),
        parser: Decimal,
    });

    let p = ColumnKind::Periodic(P::ShareholderFunds);
    tag_or_attr(&mut c, p, 0, "ShareholderFunds", Decimal);
    c.push(Candidate {
        column: p,
        priority: 1,
        rule: Rule::Custom(CustomRule {
            label: "shareholder_funds",
            matches: is_shareholder_funds,
            select: identity,
        }),
        parser: Decimal,
    });

    let p = ColumnKind::Periodic(P::TurnoverGrossOperatingRevenue);
    tag_or_attr(&mut c, p, 0, "TurnoverGrossOperatingRevenue", Decimal);
    tag_or_attr(&mut c, p, 1, "TurnoverRevenue", Decimal);

    let p = ColumnKind::Periodic(P::OtherOperatingIncome);
    tag_or_attr(&mut c, p, 0, "OtherOperatingIncome", Decimal);
    tag_or_attr(&mut c, p, 1, "OtherOperatingIncomeFormat2", Decimal);

    let p = ColumnKind::Periodic(P::CostSales);
    tag_or_attr(&mut c, p, 0, "CostSales", Decimal);

    let p = ColumnKind::Periodic(P::GrossProfitLoss);
    tag_or_attr(&mut c, p, 0, "GrossProfitLoss", Decimal);

    let p = ColumnKind::Periodic(P::AdministrativeExpenses);
    tag_or_attr(&mut c, p, 0, "AdministrativeExpenses", Decimal);

    let p = ColumnKind::Periodic(P::RawMaterialsConsumables);
    tag_or_attr(&mut c, p, 0, "RawMaterialsConsumables", Decimal);
    tag_or_attr(&mut c, p, 1, "RawMaterialsConsumablesUsed", Decimal);

    let p = ColumnKind::Periodic(P::StaffCosts);
    tag_or_attr(&mut c, p, 0, "StaffCosts", Decimal);
    tag_or_attr(&mut c, p, 1, "StaffCostsEmployeeBenefitsExpense", Decimal);

    let p = ColumnKind::Periodic(P::DepreciationOtherAmountsWrittenOffTangibleIntangibleFixedAssets);
    tag_or_attr(&mut c, p, 0, "DepreciationOtherAmountsWrittenOffTangibleIntangibleFixedAssets", Decimal);
    tag_or_attr(&mut c, p, 1, "DepreciationAmortisationImpairmentExpense", Decimal);

    let p = ColumnKind::Periodic(P::OtherOperatingChargesFormat2);
    tag_or_attr(&mut c, p, 0, "OtherOperatingChargesFormat2", Decimal);
    tag_or_attr(&mut c, p, 1, "OtherOperatingExpensesFormat2", Decimal);

    let p = ColumnKind::Periodic(P::OperatingProfitLoss);
    tag_or_attr(&mut c, p, 0, "OperatingProfitLoss", Decimal);

    let p = ColumnKind::Periodic(P::ProfitLossOnOrdinaryActivitiesBeforeTax);
    tag_or_attr(&mut c, p, 0, "ProfitLossOnOrdinaryActivitiesBeforeTax", Decimal);

    let p = ColumnKind::Periodic(P::TaxOnProfitOrLossOnOrdinaryActivities);
    tag_or_attr(&mut c, p, 0, "TaxOnProfitOrLossOnOrdinaryActivities", Decimal);
    tag_or_attr(&mut c, p, 1, "TaxTaxCreditOnProfitOrLossOnOrdinaryActivities", Decimal);

    let p = ColumnKind::Periodic(P::ProfitLossForPeriod);
    tag_or_attr(&mut c, p, 0, "ProfitLoss", Decimal);
    tag_or_attr(&mut c, p, 1, "ProfitLossForPeriod", Decimal);

    c
}

/// The three precomputed lookup structures the extraction pass consults per
/// element. Built once, behind `Lazy`, and shared across every call to
/// [`crate::extract::extract`].
///
/// Tag-name and name-suffix maps store every candidate under that key rather
/// than a single first-registered one: two distinct columns can legitimately
/// share a tag name or name-suffix key (none do in the resolved table today,
/// but nothing in the candidate-rule contract forbids it), and both must
/// still get a chance to claim the element.
pub struct MatcherTables {
    pub candidates: Vec<Candidate>,
    pub tag_name: HashMap<&'static str, Vec<usize>>,
    pub name_suffix: HashMap<&'static str, Vec<usize>>,
    pub custom: Vec<usize>,
}

impl MatcherTables {
    fn build() -> Self {
        let candidates = build_candidates();
        let mut tag_name: HashMap<&'static str, Vec<usize>> = HashMap::new();
        let mut name_suffix: HashMap<&'static str, Vec<usize>> = HashMap::new();
        let mut custom = Vec::new();

        for (idx, candidate) in candidates.iter().enumerate() {
            match &candidate.rule {
                Rule::TagName(s) => tag_name.entry(s).or_default().push(idx),
                Rule::NameAttr(s) => name_suffix.entry(s).or_default().push(idx),
                Rule::Custom(_) => custom.push(idx),
            }
        }

        MatcherTables {
            candidates,
            tag_name,
            name_suffix,
            custom,
        }
    }

    pub fn global() -> &'static MatcherTables {
        static TABLES: Lazy<MatcherTables> = Lazy::new(MatcherTables::build);
        &TABLES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_periodic_column_has_at_least_one_candidate() {
        let tables = MatcherTables::global();
        for column in PeriodicColumn::ALL {
            let has_one = tables.candidates.iter().any(|c| matches!(c.column, ColumnKind::Periodic(p) if p == column));
            assert!(has_one, "{} has no candidates", column.name());
        }
    }

    #[test]
    fn every_general_column_has_at_least_one_candidate() {
        let tables = MatcherTables::global();
        for column in GeneralColumn::ALL {
            let has_one = tables.candidates.iter().any(|c| matches!(c.column, ColumnKind::General(g) if g == column));
            assert!(has_one, "{} has no candidates", column.name());
        }
    }

    #[test]
    fn tag_or_attr_expands_to_same_priority_pair() {
        let tables = MatcherTables::global();
        let fixed_assets_tag = tables.tag_name.get("FixedAssets").unwrap();
        let fixed_assets_attr = tables.name_suffix.get("FixedAssets").unwrap();
        assert_eq!(tables.candidates[fixed_assets_tag[0]].priority, 0);
        assert_eq!(tables.candidates[fixed_assets_attr[0]].priority, 0);
    }
}

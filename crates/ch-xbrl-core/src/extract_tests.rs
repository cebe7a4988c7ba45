//! End-to-end tests against the public [`crate::extract`] entry point,
//! built from small hand-written filings rather than the full bulk corpus.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

const DORMANT_FILING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
            xmlns:uk-gaap="http://www.xbrl.org/uk/gaap/core/2009-09-01">
  <xbrli:context id="D2022">
    <xbrli:period>
      <xbrli:startDate>2022-01-01</xbrli:startDate>
      <xbrli:endDate>2022-12-31</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <xbrli:context id="D2021">
    <xbrli:period>
      <xbrli:startDate>2021-01-01</xbrli:startDate>
      <xbrli:endDate>2021-12-31</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <BalanceSheetDate contextRef="D2022">2022-12-31</BalanceSheetDate>
  <CompaniesHouseRegisteredNumber>14068295</CompaniesHouseRegisteredNumber>
  <EntityCurrentLegalName>SUGANTHI &amp; VELAVAN LTD</EntityCurrentLegalName>
  <CompanyDormant>true</CompanyDormant>
  <uk-gaap:CashBankInHand contextRef="D2022">214222</uk-gaap:CashBankInHand>
  <uk-gaap:CashBankInHand contextRef="D2021">118470</uk-gaap:CashBankInHand>
</xbrli:xbrl>
"#;

#[test]
fn dormant_company_two_periods_descending_with_shared_general_facts() {
    let rows = crate::extract("Prod224_1_14068295_20221231.html", DORMANT_FILING.as_bytes()).unwrap();

    assert_eq!(rows.len(), 2);

    let latest = &rows[0];
    assert_eq!(latest.period_start, NaiveDate::from_ymd_opt(2022, 1, 1));
    assert_eq!(latest.period_end, NaiveDate::from_ymd_opt(2022, 12, 31));
    assert_eq!(latest.cash_bank_in_hand, Some(BigDecimal::from_str("214222").unwrap()));

    let prior = &rows[1];
    assert_eq!(prior.period_start, NaiveDate::from_ymd_opt(2021, 1, 1));
    assert_eq!(prior.cash_bank_in_hand, Some(BigDecimal::from_str("118470").unwrap()));

    for row in &rows {
        assert_eq!(row.company_id, "14068295");
        assert_eq!(row.run_code, "Prod224_1");
        assert_eq!(row.file_type, "html");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        assert_eq!(row.entity_current_legal_name.as_deref(), Some("SUGANTHI & VELAVAN LTD"));
        assert_eq!(row.companies_house_registered_number.as_deref(), Some("14068295"));
        assert_eq!(row.company_dormant, Some(true));
        assert_eq!(row.taxonomy, "http://www.xbrl.org/uk/gaap/core/2009-09-01");
    }
}

#[test]
fn non_dormant_with_no_periodic_facts_yields_single_null_row() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance">
  <CompanyNotDormant>true</CompanyNotDormant>
  <CompaniesHouseRegisteredNumber>00112233</CompaniesHouseRegisteredNumber>
</xbrli:xbrl>
"#;

    let rows = crate::extract("Prod224_2_00112233_20230601.xml", xml.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.company_dormant, Some(false));
    assert_eq!(row.period_start, None);
    assert_eq!(row.period_end, None);
    assert_eq!(row.debtors, None);
    assert_eq!(row.taxonomy, "");
}

#[test]
fn unrecognized_filename_is_rejected_before_parsing() {
    let err = crate::extract("accounts.pdf", b"<xbrl/>").unwrap_err();
    assert!(matches!(err, crate::ExtractError::UnrecognizedFilename(_)));
}

#[test]
fn malformed_xml_is_reported_not_panicked() {
    let err = crate::extract("Prod224_1_00112233_20230101.xml", b"<unclosed>").unwrap_err();
    assert!(matches!(err, crate::ExtractError::MalformedInput(_)));
}

#[test]
fn creditors_custom_rule_splits_by_context_suffix() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
            xmlns:uk-gaap="http://www.xbrl.org/uk/gaap/core/2009-09-01">
  <xbrli:context id="Instant2022WithinOneYear">
    <xbrli:period><xbrli:instant>2022-12-31</xbrli:instant></xbrli:period>
  </xbrli:context>
  <xbrli:context id="Instant2022AfterOneYear">
    <xbrli:period><xbrli:instant>2022-12-31</xbrli:instant></xbrli:period>
  </xbrli:context>
  <Fact name="uk-gaap:Creditors" contextRef="Instant2022WithinOneYear">5000</Fact>
  <Fact name="uk-gaap:Creditors" contextRef="Instant2022AfterOneYear">9000</Fact>
</xbrli:xbrl>
"#;

    let rows = crate::extract("Prod224_1_00998877_20221231.xml", xml.as_bytes()).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.creditors_due_within_one_year, Some(BigDecimal::from_str("5000").unwrap()));
    assert_eq!(row.creditors_due_after_one_year, Some(BigDecimal::from_str("9000").unwrap()));
}

//! Spreadsheet normalizer
//!
//! Converts one row of an uploaded spreadsheet or delimited file into a
//! [`CanonicalRecord`], tolerating the header-naming conventions of every
//! historical file format. For each canonical field an ordered alias list is
//! tried; the first non-empty match wins, otherwise the field defaults to an
//! empty string.
//!
//! Two alias tables exist because the accepted file formats are not
//! self-describing: [`AliasTable::Extended`] covers the wide
//! descriptive-header schema historically used for workbooks, and
//! [`AliasTable::Legacy`] covers the minimal schema historically used for
//! CSV exports. Rows may also arrive as a positional array following the
//! fixed extended column order.

use std::collections::HashMap;

use crate::models::CanonicalRecord;

/// One cell of a source row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Coerce the cell to its string representation. Numbers that carry no
    /// fractional part render without one (years, account numbers), matching
    /// how the historical parsers stringified workbook cells.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Cell::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
            Cell::Empty => true,
        }
    }
}

/// One source row, either keyed by header or as a positional array
#[derive(Debug, Clone)]
pub enum Row {
    Headered(HashMap<String, Cell>),
    Positional(Vec<Cell>),
}

/// Which historical header-alias table applies to a headered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasTable {
    /// Wide descriptive-header schema (workbook uploads)
    Extended,
    /// Minimal schema (CSV exports)
    Legacy,
}

/// Canonical field order of the fixed extended positional schema
const POSITIONAL_ORDER: &[&str] = &[
    "state",
    "branch",
    "city",
    "fileNo",
    "loanAgreementNo",
    "nameOfClient",
    "vehicleType",
    "make",
    "model",
    "year",
    "regNo",
    "engineNo",
    "chassisNo",
    "month",
    "bkt",
    "emi",
    "pos",
    "tos",
    "fcAmt",
    "loanAmount",
    "dpd",
    "customerAddress",
    "customerMobileNumber",
    "groupAccountCount",
    "contactPerson1",
    "mobileNumber1",
    "contactPerson2",
    "mobileNumber2",
    "vehicleNo",
    "customerName",
    "area",
    "vehicleMaker",
    "companyName",
    "companyBranch",
    "companyContact",
    "companyContactPerson",
    "agencyName",
    "agencyContact",
    "group",
];

/// Normalize one source row into a canonical record
pub fn normalize_row(row: &Row, table: AliasTable) -> CanonicalRecord {
    match row {
        Row::Positional(cells) => normalize_positional(cells),
        Row::Headered(map) => match table {
            AliasTable::Extended => normalize_extended(map),
            AliasTable::Legacy => normalize_legacy(map),
        },
    }
}

/// Normalize a finite sequence of rows, preserving input order
pub fn normalize_rows<'a, I>(rows: I, table: AliasTable) -> Vec<CanonicalRecord>
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .map(|row| normalize_row(row, table))
        .collect()
}

/// Resolve an ordered alias list against a headered row. First non-empty
/// alias wins; missing or blank everywhere defaults to empty.
fn pick(map: &HashMap<String, Cell>, aliases: &[&str]) -> String {
    for alias in aliases {
        if let Some(cell) = map.get(*alias) {
            if !cell.is_empty() {
                return cell.as_text().trim().to_string();
            }
        }
    }
    String::new()
}

/// The `group` column may carry several comma-separated groups; only the
/// first token is kept, trimmed. A deliberate simplification.
fn first_group_token(raw: &str) -> String {
    raw.split(',').next().unwrap_or("").trim().to_string()
}

fn pick_group(map: &HashMap<String, Cell>) -> String {
    first_group_token(&pick(map, &["group", "Group"]))
}

fn normalize_extended(map: &HashMap<String, Cell>) -> CanonicalRecord {
    CanonicalRecord {
        state: pick(map, &["State"]),
        branch: pick(map, &["Branch"]),
        city: pick(map, &["City"]),
        file_no: pick(map, &["File No", "FileNo"]),
        loan_agreement_no: pick(map, &["loan_agreement_no", "Loan Agreement No"]),
        name_of_client: pick(map, &["Name Of Client", "Name of Client"]),
        vehicle_type: pick(map, &["Vehicle Type"]),
        make: pick(map, &["Make"]),
        model: pick(map, &["Model"]),
        year: pick(map, &["Year"]),
        reg_no: pick(map, &["Reg No", "RegNo"]),
        engine_no: pick(map, &["Engine No", "EngineNo"]),
        chassis_no: pick(map, &["Chasis No", "Chassis No", "ChassisNo"]),
        month: pick(map, &["Month"]),
        bkt: pick(map, &["Bkt", "bkt"]),
        emi: pick(map, &["EMI"]),
        pos: pick(map, &["Pos"]),
        tos: pick(map, &["Tos"]),
        fc_amt: pick(map, &["FC Amt"]),
        loan_amount: pick(map, &["loan_amount", "Loan Amount"]),
        dpd: pick(map, &["dpd"]),
        customer_address: pick(map, &["customer_address"]),
        customer_mobile_number: pick(map, &["Customer Mobile Number"]),
        group_account_count: pick(map, &["Group Account Count"]),
        contact_person1: pick(map, &["Cont. Person1", "Contact Person1"]),
        mobile_number1: pick(map, &["Mobile number", "Mobile Number", "Mobile number1"]),
        contact_person2: pick(map, &["Cont. Person2", "Contact Person2"]),
        mobile_number2: pick(map, &["Mobile number2"]),
        // required-field fallbacks kept from the historical parser: the wide
        // schema has no dedicated columns for these, so they borrow values
        // from their closest descriptive counterpart
        vehicle_no: pick(
            map,
            &["vehicleNo", "Vehicle No", "VehicleNo", "Vehicle No.", "Reg No", "RegNo"],
        ),
        customer_name: pick(
            map,
            &["customerName", "Customer Name", "Name Of Client", "Name of Client"],
        ),
        area: pick(map, &["area", "Area", "City"]),
        vehicle_maker: pick(map, &["vehicleMaker", "Vehicle Maker", "Make"]),
        ag_no: pick(map, &["agNo", "AG No", "AGNo", "AG No."]),
        lpp: pick(map, &["lpp", "LPP"]),
        bcc: pick(map, &["bcc", "BCC"]),
        company_name: pick(map, &["companyName", "Company Name"]),
        company_branch: pick(map, &["companyBranch", "Company Branch"]),
        company_contact: pick(map, &["companyContact", "Company Contact"]),
        company_contact_person: pick(map, &["companyContactPerson", "Company Contact Person"]),
        agency_name: pick(map, &["agencyName", "Agency Name"]),
        agency_contact: pick(map, &["agencyContact", "Agency Contact"]),
        group_name: pick_group(map),
    }
}

fn normalize_legacy(map: &HashMap<String, Cell>) -> CanonicalRecord {
    CanonicalRecord {
        vehicle_no: pick(map, &["Vehicle No", "VehicleNo", "Vehicle No."]),
        chassis_no: pick(map, &["Chassis No", "ChassisNo", "Chassis No."]),
        engine_no: pick(map, &["Engine No", "EngineNo", "Engine No."]),
        ag_no: pick(map, &["AG No", "AGNo", "AG No."]),
        branch: pick(map, &["Branch"]),
        customer_name: pick(map, &["Customer Name", "CustomerName"]),
        bkt: pick(map, &["BKT"]),
        area: pick(map, &["Area"]),
        vehicle_maker: pick(map, &["Vehicle Maker", "VehicleMaker"]),
        lpp: pick(map, &["LPP"]),
        bcc: pick(map, &["BCC"]),
        company_name: pick(map, &["Company Name", "CompanyName"]),
        company_branch: pick(map, &["Company Branch", "CompanyBranch"]),
        company_contact: pick(map, &["Company Contact", "CompanyContact"]),
        company_contact_person: pick(map, &["Company Contact Person", "CompanyContactPerson"]),
        agency_name: pick(map, &["Agency Name", "AgencyName"]),
        agency_contact: pick(map, &["Agency Contact", "AgencyContact"]),
        group_name: pick_group(map),
        ..Default::default()
    }
}

fn normalize_positional(cells: &[Cell]) -> CanonicalRecord {
    // Re-key the positional array by canonical field name, then run the
    // extended table; every extended alias list resolves its own canonical
    // name first.
    let map: HashMap<String, Cell> = POSITIONAL_ORDER
        .iter()
        .enumerate()
        .map(|(i, name)| {
            (
                name.to_string(),
                cells.get(i).cloned().unwrap_or(Cell::Empty),
            )
        })
        .collect();

    let mut record = normalize_extended(&map);
    // fields the extended table resolves only by descriptive header
    record.state = pick(&map, &["state", "State"]);
    record.branch = pick(&map, &["branch", "Branch"]);
    record.city = pick(&map, &["city", "City"]);
    record.file_no = pick(&map, &["fileNo", "File No"]);
    record.loan_agreement_no = pick(&map, &["loanAgreementNo", "loan_agreement_no"]);
    record.name_of_client = pick(&map, &["nameOfClient", "Name Of Client"]);
    record.vehicle_type = pick(&map, &["vehicleType", "Vehicle Type"]);
    record.make = pick(&map, &["make", "Make"]);
    record.model = pick(&map, &["model", "Model"]);
    record.year = pick(&map, &["year", "Year"]);
    record.reg_no = pick(&map, &["regNo", "Reg No"]);
    record.engine_no = pick(&map, &["engineNo", "Engine No"]);
    record.chassis_no = pick(&map, &["chassisNo", "Chassis No"]);
    record.month = pick(&map, &["month", "Month"]);
    record.bkt = pick(&map, &["bkt", "Bkt"]);
    record.emi = pick(&map, &["emi", "EMI"]);
    record.pos = pick(&map, &["pos", "Pos"]);
    record.tos = pick(&map, &["tos", "Tos"]);
    record.fc_amt = pick(&map, &["fcAmt", "FC Amt"]);
    record.loan_amount = pick(&map, &["loanAmount", "loan_amount"]);
    record.dpd = pick(&map, &["dpd"]);
    record.customer_address = pick(&map, &["customerAddress", "customer_address"]);
    record.customer_mobile_number = pick(&map, &["customerMobileNumber", "Customer Mobile Number"]);
    record.group_account_count = pick(&map, &["groupAccountCount", "Group Account Count"]);
    record.contact_person1 = pick(&map, &["contactPerson1", "Cont. Person1"]);
    record.mobile_number1 = pick(&map, &["mobileNumber1", "Mobile number"]);
    record.contact_person2 = pick(&map, &["contactPerson2", "Cont. Person2"]);
    record.mobile_number2 = pick(&map, &["mobileNumber2", "Mobile number2"]);
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headered(pairs: &[(&str, &str)]) -> Row {
        Row::Headered(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Cell::Text(v.to_string())))
                .collect(),
        )
    }

    #[test]
    fn legacy_and_current_aliases_yield_the_same_value() {
        // every aliased field in the extended table
        let cases: &[(&str, &str, &str)] = &[
            ("File No", "FileNo", "fileNo"),
            ("loan_agreement_no", "Loan Agreement No", "loanAgreementNo"),
            ("Name Of Client", "Name of Client", "nameOfClient"),
            ("Reg No", "RegNo", "regNo"),
            ("Engine No", "EngineNo", "engineNo"),
            ("Chasis No", "ChassisNo", "chassisNo"),
            ("Bkt", "bkt", "bkt"),
            ("loan_amount", "Loan Amount", "loanAmount"),
            ("Cont. Person1", "Contact Person1", "contactPerson1"),
            ("Mobile number", "Mobile Number", "mobileNumber1"),
            ("companyName", "Company Name", "companyName"),
            ("agencyContact", "Agency Contact", "agencyContact"),
        ];
        for (old_alias, new_alias, field) in cases {
            let a = normalize_row(&headered(&[(old_alias, "VALUE")]), AliasTable::Extended);
            let b = normalize_row(&headered(&[(new_alias, "VALUE")]), AliasTable::Extended);
            assert_eq!(a.field(field), Some("VALUE"), "alias {}", old_alias);
            assert_eq!(a.field(field), b.field(field), "field {}", field);
        }
    }

    #[test]
    fn legacy_table_aliases_agree() {
        let cases: &[(&str, &str, &str)] = &[
            ("Vehicle No", "VehicleNo", "vehicleNo"),
            ("Chassis No", "Chassis No.", "chassisNo"),
            ("Customer Name", "CustomerName", "customerName"),
            ("Vehicle Maker", "VehicleMaker", "vehicleMaker"),
            ("Company Contact Person", "CompanyContactPerson", "companyContactPerson"),
        ];
        for (old_alias, new_alias, field) in cases {
            let a = normalize_row(&headered(&[(old_alias, "X")]), AliasTable::Legacy);
            let b = normalize_row(&headered(&[(new_alias, "X")]), AliasTable::Legacy);
            assert_eq!(a.field(field), b.field(field), "field {}", field);
            assert_eq!(a.field(field), Some("X"));
        }
    }

    #[test]
    fn first_alias_with_a_value_wins() {
        let row = headered(&[("Chasis No", "OLD"), ("Chassis No", "NEW")]);
        let record = normalize_row(&row, AliasTable::Extended);
        assert_eq!(record.chassis_no, "OLD");

        // blank first alias falls through to the next one
        let row = headered(&[("Chasis No", "  "), ("Chassis No", "NEW")]);
        let record = normalize_row(&row, AliasTable::Extended);
        assert_eq!(record.chassis_no, "NEW");
    }

    #[test]
    fn group_keeps_only_the_first_comma_token() {
        let record = normalize_row(&headered(&[("Group", "A,B,C")]), AliasTable::Extended);
        assert_eq!(record.group_name, "A");

        let record = normalize_row(&headered(&[("group", " CV , CE ")]), AliasTable::Legacy);
        assert_eq!(record.group_name, "CV");
    }

    #[test]
    fn vehicle_no_falls_back_to_reg_no() {
        let record = normalize_row(&headered(&[("Reg No", "KA01XY9999")]), AliasTable::Extended);
        assert_eq!(record.vehicle_no, "KA01XY9999");
        assert_eq!(record.reg_no, "KA01XY9999");
    }

    #[test]
    fn missing_columns_default_to_empty() {
        let record = normalize_row(&headered(&[("State", "MH")]), AliasTable::Extended);
        assert_eq!(record.state, "MH");
        assert_eq!(record.vehicle_no, "");
        assert_eq!(record.agency_contact, "");
    }

    #[test]
    fn integral_number_cells_render_without_fraction() {
        let mut map = HashMap::new();
        map.insert("Year".to_string(), Cell::Number(2020.0));
        map.insert("EMI".to_string(), Cell::Number(10543.5));
        let record = normalize_row(&Row::Headered(map), AliasTable::Extended);
        assert_eq!(record.year, "2020");
        assert_eq!(record.emi, "10543.5");
    }

    #[test]
    fn positional_rows_follow_the_fixed_extended_order() {
        let mut cells = vec![Cell::Empty; POSITIONAL_ORDER.len()];
        cells[0] = Cell::Text("MH".to_string()); // state
        cells[9] = Cell::Number(2019.0); // year
        cells[12] = Cell::Text("CH-777".to_string()); // chassisNo
        cells[28] = Cell::Text("MH12AB1234".to_string()); // vehicleNo
        cells[POSITIONAL_ORDER.len() - 1] = Cell::Text("A,B".to_string()); // group

        let record = normalize_row(&Row::Positional(cells), AliasTable::Extended);
        assert_eq!(record.state, "MH");
        assert_eq!(record.year, "2019");
        assert_eq!(record.chassis_no, "CH-777");
        assert_eq!(record.vehicle_no, "MH12AB1234");
        assert_eq!(record.group_name, "A");
    }

    #[test]
    fn rows_normalize_in_input_order() {
        let rows = vec![
            headered(&[("Vehicle No", "V1")]),
            headered(&[("Vehicle No", "V2")]),
            headered(&[("Vehicle No", "V3")]),
        ];
        let records = normalize_rows(&rows, AliasTable::Legacy);
        let nos: Vec<_> = records.iter().map(|r| r.vehicle_no.as_str()).collect();
        assert_eq!(nos, vec!["V1", "V2", "V3"]);
    }
}

//! Deserializer tests: cell semantics, grouping and error aggregation

use odcs_sheets::catalog::{KEY_VALUE_HEADERS, odcs};
use odcs_sheets::convert::{CoercionReason, GroupingReason};
use odcs_sheets::models::{LogicalType, QualityCheck};
use odcs_sheets::{Cell, ConversionConfig, Deserializer, Sheet, Violation, Workbook, workbook_to_contract};

fn basic_information() -> Sheet {
    let mut sheet = Sheet::with_headers(odcs::BASIC_INFORMATION, &KEY_VALUE_HEADERS);
    for (field, value) in [
        ("version", "1.0.0"),
        ("kind", "DataContract"),
        ("apiVersion", "v3.0.2"),
        ("id", "orders-contract"),
        ("status", "active"),
    ] {
        sheet.push_row(vec![Cell::from(field), Cell::from(value), Cell::Empty]);
    }
    sheet
}

fn schema(names: &[&str]) -> Sheet {
    names.iter().fold(Sheet::with_headers(odcs::SCHEMA, &["Object Name"]), |sheet, name| {
        sheet.with_row(vec![Cell::from(*name)])
    })
}

fn properties(headers: &[&str], rows: Vec<Vec<Cell>>) -> Sheet {
    rows.into_iter()
        .fold(Sheet::with_headers(odcs::SCHEMA_PROPERTIES, headers), Sheet::with_row)
}

fn workbook(sheets: Vec<Sheet>) -> Workbook {
    std::iter::once(basic_information()).chain(sheets).collect()
}

mod cell_semantics_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_cells_are_absent_not_false() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Required", "Unique", "Tags"],
                vec![vec!["orders".into(), "id".into(), Cell::Empty, "   ".into(), Cell::Empty]],
            ),
        ]);
        let contract = workbook_to_contract(&workbook).unwrap();
        let property = &contract.schema[0].properties[0];
        assert_eq!(property.required, None);
        assert_eq!(property.unique, None);
        assert!(property.tags.is_empty());
    }

    #[test]
    fn test_boolean_tokens() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Required", "Unique", "Partitioned"],
                vec![vec!["orders".into(), "id".into(), "Yes".into(), Cell::Int(0), "off".into()]],
            ),
        ]);
        let property = workbook_to_contract(&workbook).unwrap().schema[0].properties[0].clone();
        assert_eq!(property.required, Some(true));
        assert_eq!(property.unique, Some(false));
        assert_eq!(property.partitioned, Some(false));
    }

    #[test]
    fn test_configured_boolean_tokens() {
        let config = ConversionConfig::default().with_boolean_tokens(&["ja"], &["nein"]);
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Required", "Unique"],
                vec![vec!["orders".into(), "id".into(), "ja".into(), "yes".into()]],
            ),
        ]);
        let err = Deserializer::default()
            .with_config(config)
            .unwrap()
            .deserialize(&workbook)
            .unwrap_err();
        let coercion: Vec<_> = err.coercion_errors().collect();
        assert_eq!(coercion.len(), 1);
        assert_eq!(coercion[0].column, "Unique");
        assert_eq!(coercion[0].reason, CoercionReason::NotABoolean("yes".to_string()));
    }

    #[test]
    fn test_custom_list_delimiter() {
        let config = ConversionConfig::default().with_list_delimiter("; ");
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Tags"],
                vec![vec!["orders".into(), "id".into(), "a, b; c;".into()]],
            ),
        ]);
        let contract = Deserializer::default()
            .with_config(config)
            .unwrap()
            .deserialize(&workbook)
            .unwrap();
        assert_eq!(contract.schema[0].properties[0].tags, vec!["a, b", "c"]);
    }

    #[test]
    fn test_number_pair_arity() {
        let rules = Sheet::with_headers(
            odcs::QUALITY_RULES,
            &["Object Name", "Type", "Rule", "Must Be Between"],
        )
        .with_row(vec!["orders".into(), "library".into(), "rowCount".into(), "1, 2, 3".into()]);
        let err = workbook_to_contract(&workbook(vec![schema(&["orders"]), rules])).unwrap_err();
        let coercion: Vec<_> = err.coercion_errors().collect();
        assert_eq!(
            coercion[0].reason,
            CoercionReason::WrongArity {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_required_cell_is_empty() {
        let rules = Sheet::with_headers(odcs::QUALITY_RULES, &["Object Name", "Type", "Description"])
            .with_row(vec!["orders".into(), Cell::Empty, "fresh".into()]);
        let err = workbook_to_contract(&workbook(vec![schema(&["orders"]), rules])).unwrap_err();
        let coercion: Vec<_> = err.coercion_errors().collect();
        assert_eq!(coercion.len(), 1);
        assert_eq!(coercion[0].reason, CoercionReason::RequiredEmpty);
        assert_eq!(coercion[0].column, "Type");
        assert_eq!(coercion[0].row, 2);
    }
}

mod grouping_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_sheets_read_as_empty() {
        let contract = workbook_to_contract(&workbook(vec![])).unwrap();
        assert_eq!(contract.id, "orders-contract");
        assert!(contract.servers.is_empty());
    }

    #[test]
    fn test_unknown_columns_and_sheets_are_ignored() {
        let workbook = workbook(vec![
            Sheet::with_headers("Notes", &["Anything"]).with_row(vec!["hello".into()]),
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Reviewer"],
                vec![vec!["orders".into(), "id".into(), "bob".into()]],
            ),
        ]);
        let contract = workbook_to_contract(&workbook).unwrap();
        assert_eq!(contract.schema[0].properties[0].name, "id");
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name"],
                vec![
                    vec![Cell::Empty, Cell::Empty],
                    vec!["orders".into(), "id".into()],
                    vec![" ".into()],
                ],
            ),
        ]);
        let contract = workbook_to_contract(&workbook).unwrap();
        assert_eq!(contract.schema[0].properties.len(), 1);
    }

    #[test]
    fn test_duplicate_property_row() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name"],
                vec![vec!["orders".into(), "id".into()], vec!["orders".into(), "id".into()]],
            ),
        ]);
        let err = workbook_to_contract(&workbook).unwrap_err();
        let grouping: Vec<_> = err.grouping_errors().collect();
        assert_eq!(grouping.len(), 1);
        assert_eq!(grouping[0].reason, GroupingReason::DuplicateKey);
        assert_eq!(grouping[0].row, 3);
        assert_eq!(grouping[0].key, "orders/id");
    }

    #[test]
    fn test_property_name_without_object_name() {
        let custom = Sheet::with_headers(
            odcs::CUSTOM_PROPERTIES,
            &["Property", "Value", "Object Name", "Property Name"],
        )
        .with_row(vec!["owner".into(), "finance".into(), Cell::Empty, "id".into()])
        .with_row(vec!["team".into(), "sales".into(), Cell::Empty, Cell::Empty]);
        let err = workbook_to_contract(&workbook(vec![custom])).unwrap_err();
        let grouping: Vec<_> = err.grouping_errors().collect();
        assert_eq!(grouping.len(), 1);
        assert_eq!(grouping[0].reason, GroupingReason::PropertyWithoutObject);
    }

    #[test]
    fn test_contract_level_references() {
        let custom = Sheet::with_headers(odcs::CUSTOM_PROPERTIES, &["Property", "Value"])
            .with_row(vec!["owner".into(), "finance".into()]);
        let contract = workbook_to_contract(&workbook(vec![custom])).unwrap();
        assert_eq!(contract.custom_properties.len(), 1);
        assert_eq!(contract.custom_properties[0].value, serde_json::json!("finance"));
    }

    #[test]
    fn test_items_row_without_array_parent() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Logical Type"],
                vec![vec!["orders.ids.items".into(), "id".into(), "integer".into()]],
            ),
        ]);
        let err = workbook_to_contract(&workbook).unwrap_err();
        let grouping: Vec<_> = err.grouping_errors().collect();
        assert_eq!(grouping.len(), 1);
        assert!(matches!(
            &grouping[0].reason,
            GroupingReason::OrphanRow { owner, .. } if owner == "orders.ids.items"
        ));
    }

    #[test]
    fn test_second_items_row_is_a_duplicate() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Logical Type"],
                vec![
                    vec!["orders".into(), "ids".into(), "array".into()],
                    vec!["orders.ids.items".into(), "id".into(), "integer".into()],
                    vec!["orders.ids.items".into(), "other".into(), "string".into()],
                ],
            ),
        ]);
        let err = workbook_to_contract(&workbook).unwrap_err();
        let grouping: Vec<_> = err.grouping_errors().collect();
        assert_eq!(grouping.len(), 1);
        assert_eq!(grouping[0].reason, GroupingReason::DuplicateKey);
        assert_eq!(grouping[0].row, 4);
    }

    #[test]
    fn test_errors_from_several_sheets_are_aggregated() {
        let props = properties(
            &["Object Name", "Property Name", "PK Position"],
            vec![
                vec!["orders".into(), "id".into(), "one".into()],
                vec!["ghosts".into(), "id".into(), Cell::Empty],
            ],
        );
        let rules = Sheet::with_headers(odcs::QUALITY_RULES, &["Object Name", "Type"])
            .with_row(vec!["nowhere".into(), "text".into()]);
        let err = workbook_to_contract(&workbook(vec![schema(&["orders"]), props, rules])).unwrap_err();
        assert_eq!(err.coercion_errors().count(), 1);
        assert_eq!(err.grouping_errors().count(), 2);
        assert!(err.structural_error().is_none());
        assert!(err.to_string().starts_with("Workbook conversion failed with 3 error(s)"));
    }
}

mod structural_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_primary_key_positions() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Primary Key", "PK Position"],
                vec![
                    vec!["orders".into(), "id".into(), Cell::Bool(true), Cell::Int(1)],
                    vec!["orders".into(), "region".into(), Cell::Bool(true), Cell::Int(1)],
                ],
            ),
        ]);
        let err = workbook_to_contract(&workbook).unwrap_err();
        let structural = err.structural_error().unwrap();
        assert_eq!(structural.path.to_string(), "schema[0].properties[1].primaryKeyPosition");
        assert_eq!(structural.violation, Violation::DuplicatePrimaryKeyPosition(1));
    }

    #[test]
    fn test_option_for_other_logical_type() {
        let options = Sheet::with_headers(
            odcs::LOGICAL_TYPE_OPTIONS,
            &["Object Name", "Property Name", "Max Length"],
        )
        .with_row(vec!["orders".into(), "id".into(), Cell::Int(10)]);
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Logical Type"],
                vec![vec!["orders".into(), "id".into(), "integer".into()]],
            ),
            options,
        ]);
        let err = workbook_to_contract(&workbook).unwrap_err();
        assert!(matches!(
            err.structural_error().map(|e| &e.violation),
            Some(Violation::OptionNotApplicable { option, .. }) if option == "maxLength"
        ));
    }

    #[test]
    fn test_array_without_items_row() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Logical Type"],
                vec![vec!["orders".into(), "tags".into(), "array".into()]],
            ),
        ]);
        let err = workbook_to_contract(&workbook).unwrap_err();
        assert_eq!(err.structural_error().unwrap().violation, Violation::MissingItems);
    }

    #[test]
    fn test_quality_rule_fields_follow_type() {
        let rules = Sheet::with_headers(odcs::QUALITY_RULES, &["Object Name", "Type", "Query", "Must Be"])
            .with_row(vec!["orders".into(), "sql".into(), "SELECT 1".into(), Cell::Float(0.0)]);
        let contract = workbook_to_contract(&workbook(vec![schema(&["orders"]), rules])).unwrap();
        let rule = &contract.schema[0].quality[0];
        assert!(matches!(&rule.check, QualityCheck::Sql(check) if check.query == "SELECT 1"));

        let rules = Sheet::with_headers(odcs::QUALITY_RULES, &["Object Name", "Type", "Query"])
            .with_row(vec!["orders".into(), "text".into(), "SELECT 1".into()]);
        let err = workbook_to_contract(&workbook(vec![schema(&["orders"]), rules])).unwrap_err();
        assert!(matches!(
            err.structural_error().map(|e| &e.violation),
            Some(Violation::QualityFieldNotAllowed { field, .. }) if field == "query"
        ));
    }

    #[test]
    fn test_logical_type_is_case_insensitive() {
        let workbook = workbook(vec![
            schema(&["orders"]),
            properties(
                &["Object Name", "Property Name", "Logical Type"],
                vec![vec!["orders".into(), "id".into(), " Integer ".into()]],
            ),
        ]);
        let contract = workbook_to_contract(&workbook).unwrap();
        assert_eq!(contract.schema[0].properties[0].logical_type, Some(LogicalType::Integer));
    }
}

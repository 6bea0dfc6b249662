//! Contract model construction tests

use odcs_sheets::document::{DocumentFormat, parse_document};
use odcs_sheets::models::{ApiVersion, LogicalType, QualityDimension, ServerType};
use odcs_sheets::{Contract, DocumentError, Violation};
use serde_json::{Value, json};

fn base(extra: Value) -> Value {
    let mut doc = json!({
        "apiVersion": "v3.0.2",
        "kind": "DataContract",
        "id": "orders-contract",
        "version": "1.0.0",
        "status": "active"
    });
    if let (Some(doc), Some(extra)) = (doc.as_object_mut(), extra.as_object()) {
        doc.extend(extra.clone());
    }
    doc
}

mod contract_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_contract() {
        let contract = Contract::from_value(&base(json!({}))).unwrap();
        assert_eq!(contract.api_version, ApiVersion::V3_0_2);
        assert_eq!(contract.status, "active");
        assert!(contract.schema.is_empty());
        assert_eq!(contract.to_value().unwrap()["schema"], json!([]));
    }

    #[test]
    fn test_required_fields() {
        let mut doc = base(json!({}));
        doc.as_object_mut().unwrap().remove("status");
        let err = Contract::from_value(&doc).unwrap_err();
        assert_eq!(err.to_string(), "status: required field is missing");

        let err = Contract::from_value(&base(json!({"id": "  "}))).unwrap_err();
        assert_eq!(err.violation, Violation::Empty);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = Contract::from_value(&base(json!({
            "schema": [{"name": "orders", "properties": [{"name": "id", "nullable": true}]}]
        })))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].properties[0].nullable");
        assert_eq!(err.violation, Violation::UnknownField);
    }

    #[test]
    fn test_null_means_absent() {
        let contract = Contract::from_value(&base(json!({
            "name": null,
            "schema": [{"name": "orders", "description": null, "properties": null}]
        })))
        .unwrap();
        assert_eq!(contract.name, None);
        assert_eq!(contract.schema[0].description, None);
        assert!(contract.schema[0].properties.is_empty());
    }

    #[test]
    fn test_api_version_is_closed() {
        let err = Contract::from_value(&base(json!({"apiVersion": "v4.0.0"}))).unwrap_err();
        assert_eq!(err.path.to_string(), "apiVersion");
        assert!(matches!(err.violation, Violation::NotAllowed { .. }));
    }

    #[test]
    fn test_duplicate_object_names() {
        let err = Contract::from_value(&base(json!({
            "schema": [{"name": "orders"}, {"name": "orders"}]
        })))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[1].name");
        assert_eq!(err.violation, Violation::DuplicateName("orders".to_string()));
    }

    #[test]
    fn test_integral_floats_are_normalized() {
        let contract = Contract::from_value(&base(json!({
            "slaProperties": [{"property": "latency", "value": 4.0}],
            "schema": [{"name": "orders", "properties": [{
                "name": "amount",
                "logicalType": "number",
                "logicalTypeOptions": {"maximum": 100.0}
            }]}]
        })))
        .unwrap();
        let value = contract.to_value().unwrap();
        assert_eq!(value["slaProperties"][0]["value"], json!(4));
        assert_eq!(
            value["schema"][0]["properties"][0]["logicalTypeOptions"],
            json!({"maximum": 100})
        );
    }
}

mod property_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn property(property: Value) -> Result<Contract, odcs_sheets::StructuralValidationError> {
        Contract::from_value(&base(json!({
            "schema": [{"name": "orders", "properties": [property]}]
        })))
    }

    #[test]
    fn test_array_items() {
        let contract = property(json!({
            "name": "tags",
            "logicalType": "array",
            "items": {"name": "tag", "logicalType": "string"}
        }))
        .unwrap();
        let tags = &contract.schema[0].properties[0];
        assert_eq!(tags.items.as_ref().unwrap().logical_type, Some(LogicalType::String));
    }

    #[test]
    fn test_items_nesting_is_limited() {
        let err = property(json!({
            "name": "matrix",
            "logicalType": "array",
            "items": {"name": "row", "logicalType": "array", "items": {"name": "cell"}}
        }))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].properties[0].items.items");
        assert_eq!(err.violation, Violation::NestedArrayItems);
    }

    #[test]
    fn test_items_on_scalar() {
        let err = property(json!({"name": "id", "logicalType": "integer", "items": {"name": "x"}})).unwrap_err();
        assert_eq!(err.violation, Violation::ItemsNotAllowed);
    }

    #[test]
    fn test_positions_are_positive() {
        let err = property(json!({"name": "id", "primaryKey": true, "primaryKeyPosition": 0})).unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].properties[0].primaryKeyPosition");
        assert!(matches!(err.violation, Violation::NonPositivePosition(_)));
    }

    #[test]
    fn test_options_require_logical_type() {
        let err = property(json!({"name": "code", "logicalTypeOptions": {"maxLength": 3}})).unwrap_err();
        assert_eq!(err.violation, Violation::OptionsWithoutLogicalType);
    }

    #[test]
    fn test_inverted_length_bounds() {
        let err = property(json!({
            "name": "code",
            "logicalType": "string",
            "logicalTypeOptions": {"minLength": 5, "maxLength": 3}
        }))
        .unwrap_err();
        assert!(matches!(err.violation, Violation::InvertedRange { .. }));
    }
}

mod quality_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dimension_abbreviations() {
        let contract = Contract::from_value(&base(json!({
            "schema": [{"name": "orders", "quality": [
                {"type": "text", "description": "complete", "dimension": "CP"}
            ]}]
        })))
        .unwrap();
        assert_eq!(
            contract.schema[0].quality[0].dimension,
            Some(QualityDimension::Completeness)
        );
        assert_eq!(
            contract.to_value().unwrap()["schema"][0]["quality"][0]["dimension"],
            json!("completeness")
        );
    }

    #[test]
    fn test_between_needs_ordered_pair() {
        let err = Contract::from_value(&base(json!({
            "schema": [{"name": "orders", "quality": [
                {"type": "library", "rule": "rowCount", "mustBeBetween": [10, 1]}
            ]}]
        })))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].quality[0].mustBeBetween");
        assert!(matches!(err.violation, Violation::InvertedRange { .. }));
    }

    #[test]
    fn test_custom_rule_requires_engine() {
        let err = Contract::from_value(&base(json!({
            "schema": [{"name": "orders", "quality": [
                {"type": "custom", "implementation": "row_count > 0"}
            ]}]
        })))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "schema[0].quality[0].engine");
        assert_eq!(err.violation, Violation::Missing);
    }
}

mod supporting_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_type_is_closed() {
        let contract = Contract::from_value(&base(json!({
            "servers": [{"server": "bq", "type": "bigquery", "project": "p", "dataset": "d"}]
        })))
        .unwrap();
        assert_eq!(contract.servers[0].server_type, ServerType::Bigquery);

        let err = Contract::from_value(&base(json!({
            "servers": [{"server": "x", "type": "excel"}]
        })))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "servers[0].type");
    }

    #[test]
    fn test_irrelevant_server_fields_are_accepted() {
        let contract = Contract::from_value(&base(json!({
            "servers": [{"server": "lake", "type": "s3", "location": "s3://b/", "port": 443}]
        })))
        .unwrap();
        assert_eq!(contract.servers[0].port, Some(443));
    }

    #[test]
    fn test_support_url_scheme() {
        let err = Contract::from_value(&base(json!({
            "support": [{"channel": "email", "url": "ftp://example.com"}]
        })))
        .unwrap_err();
        assert_eq!(err.path.to_string(), "support[0].url");
    }
}

mod document_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml = "apiVersion: v3.0.2\nkind: DataContract\nid: c\nversion: 1.0.0\nstatus: draft\n";
        let json = r#"{"apiVersion": "v3.0.2", "kind": "DataContract", "id": "c", "version": "1.0.0", "status": "draft"}"#;
        assert_eq!(
            Contract::from_yaml_str(yaml).unwrap(),
            Contract::from_json_str(json).unwrap()
        );
    }

    #[test]
    fn test_document_root_must_be_a_mapping() {
        let err = parse_document("- a\n- b\n", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping));
    }

    #[test]
    fn test_structural_errors_surface_through_documents() {
        let err = Contract::from_yaml_str("apiVersion: v3.0.2\nkind: DataContract\n").unwrap_err();
        assert!(matches!(err, DocumentError::Structural(_)));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_extension("yml"), Some(DocumentFormat::Yaml));
        assert_eq!(DocumentFormat::from_extension("JSON"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_extension("xlsx"), None);
    }
}

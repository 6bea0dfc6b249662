//! Benchmarks for contract ⇄ workbook conversion
//!
//! Run with: cargo bench

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use odcs_sheets::{Contract, Deserializer, Serializer};
use serde_json::json;

/// Contract with `object_count` objects of `property_count` properties each.
/// Every tenth property is an array with an element type.
fn generate_contract(object_count: usize, property_count: usize) -> Contract {
    let schema: Vec<_> = (0..object_count)
        .map(|o| {
            let properties: Vec<_> = (0..property_count)
                .map(|p| {
                    if p % 10 == 9 {
                        json!({
                            "name": format!("column_{p}"),
                            "logicalType": "array",
                            "items": {"name": "element", "logicalType": "string", "logicalTypeOptions": {"maxLength": 64}}
                        })
                    } else {
                        json!({
                            "name": format!("column_{p}"),
                            "logicalType": "string",
                            "physicalType": "VARCHAR(255)",
                            "description": format!("Column {p} description"),
                            "required": p == 0,
                            "tags": ["bench", "generated"]
                        })
                    }
                })
                .collect();
            json!({
                "name": format!("table_{o}"),
                "physicalName": format!("tbl_{o}"),
                "properties": properties,
                "quality": [{"type": "library", "rule": "rowCount", "mustBeGreaterThan": 0}]
            })
        })
        .collect();

    Contract::from_value(&json!({
        "apiVersion": "v3.0.2",
        "kind": "DataContract",
        "id": "bench-contract",
        "version": "1.0.0",
        "status": "active",
        "schema": schema
    }))
    .expect("benchmark contract is valid")
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let serializer = Serializer::default();

    for object_count in [1, 10, 50].iter() {
        let contract = generate_contract(*object_count, 40);
        group.throughput(Throughput::Elements(*object_count as u64 * 40));

        group.bench_with_input(
            BenchmarkId::new("objects", object_count),
            &contract,
            |b, contract| {
                b.iter(|| black_box(serializer.serialize(contract)));
            },
        );
    }

    group.finish();
}

fn bench_deserialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize");
    let serializer = Serializer::default();
    let deserializer = Deserializer::default();

    for object_count in [1, 10, 50].iter() {
        let workbook = serializer
            .serialize(&generate_contract(*object_count, 40))
            .expect("benchmark contract serializes");
        group.throughput(Throughput::Elements(*object_count as u64 * 40));

        group.bench_with_input(
            BenchmarkId::new("objects", object_count),
            &workbook,
            |b, workbook| {
                b.iter(|| black_box(deserializer.deserialize(workbook)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_deserialize);
criterion_main!(benches);

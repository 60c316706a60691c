/// Benchmarks for COS parsing performance
///
/// Run with: cargo bench
use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use pdf_cos::core::object::parse_object_at;
use pdf_cos::core::{ByteReader, DocumentData, Lexer, ValueParser};

fn synthetic_dict(entries: usize) -> Vec<u8> {
    let mut out = b"<< /Type /Page /Annots [1 0 R 2 0 R]".to_vec();
    for k in 0..entries {
        out.extend_from_slice(format!(" /K{} [{} 0.5 (text {})]", k, k, k).as_bytes());
    }
    out.extend_from_slice(b" >>");
    out
}

fn synthetic_document(objects: usize) -> Vec<u8> {
    let mut out = b"%PDF-1.7\n".to_vec();
    let mut offsets = Vec::new();
    for k in 1..=objects {
        offsets.push(out.len());
        out.extend_from_slice(
            format!("{} 0 obj\n<< /Index {} /Next {} 0 R >>\nendobj\n", k, k, k % objects + 1)
                .as_bytes(),
        );
    }
    let startxref = out.len();
    let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", objects + 1);
    for offset in &offsets {
        table.push_str(&format!("{:010} 00000 n \n", offset));
    }
    table.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects + 1,
        startxref
    ));
    out.extend_from_slice(table.as_bytes());
    out
}

/// Dictionary bounds scanning over nested delimiters
fn benchmark_dict_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("dict_bounds");
    let data = synthetic_dict(100);
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("bounds_100_entries", |b| {
        let lexer = Lexer::new(ByteReader::new(data.clone()).unwrap());
        b.iter(|| lexer.dict_bounds_at(black_box(0), true));
    });
    group.finish();
}

/// Full object parse of a large dictionary
fn benchmark_dict_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("dict_parse");
    let data = synthetic_dict(100);
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("parse_100_entries", |b| {
        let parser = ValueParser::new(Lexer::new(ByteReader::new(data.clone()).unwrap()));
        b.iter(|| parse_object_at(&parser, black_box(0), None));
    });
    group.finish();
}

/// Document opening: xref scan plus trailer parse
fn benchmark_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("document_opening");
    let data = synthetic_document(500);
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("open_500_objects", |b| {
        b.iter(|| DocumentData::open(black_box(data.clone())));
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_dict_bounds,
    benchmark_dict_parse,
    benchmark_open
);
criterion_main!(benches);

//! Benchmarks for pdfblocks layout reconstruction.
//!
//! Run with: cargo bench
//!
//! Page records are synthesized so the numbers measure the layout pipeline
//! itself; the end-to-end group also covers content stream decoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lopdf::{dictionary, Object, Stream};

use pdfblocks::{
    extract_bytes, layout_page, layout_records, ExtractOptions, LayoutConfig, Matrix, PageRecord,
    PaintOp, RawGlyphRun,
};

/// A resume-like page: a colored header followed by indented bullets.
fn create_record(number: u32, lines: usize) -> PageRecord {
    let mut record = PageRecord::letter(number);
    record.push_op(PaintOp::SetFillRgb(0.1, 0.2, 0.6));

    let mut y = 740.0;
    for i in 0..lines {
        let (text, font, size, x) = if i % 8 == 0 {
            ("EXPERIENCE".to_string(), "Arial-Bold", 16.0, 50.0)
        } else {
            (
                format!("• Delivered milestone {} ahead of schedule", i),
                "Arial",
                10.0,
                65.0,
            )
        };
        if i % 8 == 1 {
            record.push_op(PaintOp::SetFillGray(0.0));
        }
        let index = record.push_op(PaintOp::ShowText);
        let width = text.chars().count() as f32 * size * 0.5;
        record.glyph_runs.push(
            RawGlyphRun::new(text, font, Matrix::new(size, 0.0, 0.0, size, x, y), width)
                .at_op(index),
        );
        y -= 14.0;
    }
    record
}

/// A PDF with `page_count` pages of header and bullet text.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.7");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(page_count);
    for i in 0..page_count {
        let mut content = String::from("BT /F1 16 Tf 50 740 Td (SUMMARY) Tj /F1 10 Tf 14 TL\n");
        for line in 0..40 {
            content.push_str(&format!("T* (- Page {} bullet {} for benchmarking) Tj\n", i + 1, line));
        }
        content.push_str("ET");

        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save benchmark PDF");
    buf
}

/// Benchmark the per-page pipeline.
fn bench_layout_page(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout_page");

    for lines in [10, 50, 200] {
        let record = create_record(1, lines);
        group.bench_function(format!("{}_lines", lines), |b| {
            b.iter(|| layout_page(black_box(&record), &config).unwrap());
        });
    }

    group.finish();
}

/// Benchmark parallel against sequential page layout.
fn bench_layout_records(c: &mut Criterion) {
    let records: Vec<PageRecord> = (1..=32).map(|n| create_record(n, 50)).collect();
    let mut group = c.benchmark_group("layout_records");

    group.bench_function("parallel", |b| {
        b.iter(|| layout_records(black_box(&records), &ExtractOptions::default()).unwrap());
    });
    group.bench_function("sequential", |b| {
        let options = ExtractOptions::default().sequential();
        b.iter(|| layout_records(black_box(&records), &options).unwrap());
    });

    group.finish();
}

/// Benchmark end-to-end extraction at various sizes.
fn bench_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_bytes");

    for page_count in [1, 5, 10] {
        let data = create_test_pdf(page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| extract_bytes(black_box(&data), &ExtractOptions::default()).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_layout_page,
    bench_layout_records,
    bench_extraction,
);
criterion_main!(benches);

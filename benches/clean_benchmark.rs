//! Benchmarks for pagescribe cleaning performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks clean synthetic two-column documents with running heads
//! and page-number footers.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagescribe::{BBox, CleanOptions, DocumentInput, PageInput, Span};

fn span(text: String, x0: f32, y0: f32, x1: f32, size: f32) -> Span {
    Span::new(text, BBox::new(x0, y0, x1, y0 + size), size, "Times-Roman")
}

/// Creates a synthetic document with the given number of pages.
fn create_test_document(page_count: u32) -> DocumentInput {
    let mut doc = DocumentInput::new("bench");

    for number in 1..=page_count {
        let mut spans = vec![
            span("Proceedings of the Benchmark Society".to_string(), 72.0, 30.0, 320.0, 9.0),
            span(format!("Page {}", number), 290.0, 750.0, 330.0, 9.0),
        ];

        for i in 0..40 {
            let y = 120.0 + i as f32 * 14.0;
            let left = if i % 7 == 6 {
                format!("line {} of the left column ends with a hyph-", i)
            } else {
                format!("line {} of the left column on page {}", i, number)
            };
            spans.push(span(left, 72.0, y, 290.0, 10.0));
            spans.push(span(
                format!("line {} of the right column, x", i),
                322.0,
                y,
                520.0,
                10.0,
            ));
            // A superscript on every fifth right-hand line
            if i % 5 == 0 {
                spans.push(Span::new(
                    "2",
                    BBox::new(520.5, y - 1.0, 524.0, y + 5.0),
                    6.0,
                    "Times-Roman",
                ));
            }
        }

        doc = doc.with_page(PageInput::letter(number).with_spans(spans));
    }

    doc
}

/// Benchmark cleaning at various sizes, parallel and sequential.
fn bench_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("cleaning");

    for page_count in [1, 10, 50].iter() {
        let doc = create_test_document(*page_count);

        group.bench_function(format!("{}_pages_parallel", page_count), |b| {
            let options = CleanOptions::default();
            b.iter(|| pagescribe::clean_document(black_box(&doc), &options).unwrap());
        });

        group.bench_function(format!("{}_pages_sequential", page_count), |b| {
            let options = CleanOptions::default().sequential();
            b.iter(|| pagescribe::clean_document(black_box(&doc), &options).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the JSON Lines encoder.
fn bench_segments_jsonl(c: &mut Criterion) {
    let doc = create_test_document(10);
    let result = pagescribe::clean_document(&doc, &CleanOptions::default()).unwrap();

    c.bench_function("segments_jsonl_10_pages", |b| {
        b.iter(|| pagescribe::render::to_segments_jsonl(black_box(&result)).unwrap());
    });
}

/// Benchmark builder pattern overhead.
fn bench_builder_creation(c: &mut Criterion) {
    c.bench_function("builder_creation", |b| {
        b.iter(|| {
            let _builder = pagescribe::Scribe::new()
                .with_preset(pagescribe::CleanPreset::Aggressive)
                .retain_boilerplate()
                .with_math_crops();
        });
    });
}

criterion_group!(
    benches,
    bench_cleaning,
    bench_segments_jsonl,
    bench_builder_creation,
);
criterion_main!(benches);

//! Benchmarks for rendering throughput.

#![allow(clippy::format_push_string)] // Benchmark setup code, performance not critical

use callmark::{CanonicalRenderer, Extensions, HtmlFlags, HtmlRenderer, HtmlTocRenderer, Markdown, PassthroughRenderer};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Generate markdown content with specified structure.
fn generate_markdown(headings: usize, paragraphs_per_section: usize) -> String {
    let mut md = String::with_capacity(headings * 120 + headings * paragraphs_per_section * 200);
    md.push_str("# Document Title\n\n");

    for i in 0..headings {
        md.push_str(&format!("## Section {i}\n\n"));
        for j in 0..paragraphs_per_section {
            md.push_str(&format!(
                "This is paragraph {j} in section {i}. It contains **bold**, *italic* and `code`, \
                 a [link](https://example.com/{i}/{j}) and a bare URL https://example.com.\n\n"
            ));
        }
        md.push_str("- one\n- two\n  - nested\n\n| a | b |\n|---|:-:|\n| 1 | 2 |\n\n");
    }
    md
}

fn bench_html_by_size(c: &mut Criterion) {
    let html = HtmlRenderer::default();
    let markdown = Markdown::new(&html).with_extensions(Extensions::gfm());

    let mut group = c.benchmark_group("html_by_size");
    for (headings, paragraphs) in [(5, 2), (20, 3), (50, 5)] {
        let text = generate_markdown(headings, paragraphs);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markdown", format!("{headings}h_{paragraphs}p")),
            &text,
            |b, text| b.iter(|| markdown.render(text)),
        );
    }
    group.finish();
}

fn bench_renderers(c: &mut Criterion) {
    let text = generate_markdown(20, 3);
    let smarty = HtmlRenderer::new(HtmlFlags {
        smartypants: true,
        toc: true,
        ..HtmlFlags::default()
    });

    let mut group = c.benchmark_group("renderers");
    group.throughput(Throughput::Bytes(text.len() as u64));
    group.bench_function("passthrough", |b| {
        let markdown = Markdown::new(&PassthroughRenderer).with_extensions(Extensions::gfm());
        b.iter(|| markdown.render(&text));
    });
    group.bench_function("html_smartypants", |b| {
        let markdown = Markdown::new(&smarty).with_extensions(Extensions::gfm());
        b.iter(|| markdown.render(&text));
    });
    group.bench_function("toc", |b| {
        let toc = HtmlTocRenderer::new();
        let markdown = Markdown::new(&toc);
        b.iter(|| markdown.render(&text));
    });
    group.bench_function("canonical", |b| {
        let markdown = Markdown::new(&CanonicalRenderer).with_extensions(Extensions::gfm());
        b.iter(|| markdown.render(&text));
    });
    group.finish();
}

criterion_group!(benches, bench_html_by_size, bench_renderers);
criterion_main!(benches);

//! Benchmarks for selector queries and event dispatch.
//!
//! Run with: cargo bench

use std::cell::Cell;
use std::fmt::Write;
use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};

use littledom::{Document, Handler};

/// A page with `rows` table rows and a nested list per row.
fn sample_page(rows: usize) -> String {
    let mut html = String::from("<html><head><style>.odd { color: gray }</style></head><body><table id=grid><tbody>");
    for i in 0..rows {
        let class = if i % 2 == 1 { "odd" } else { "even" };
        write!(
            html,
            "<tr class={class}><td>{i}</td><td><ul><li><a href='#{i}'>link {i}</a></li></ul></td></tr>"
        )
        .unwrap();
    }
    html.push_str("</tbody></table></body></html>");
    html
}

// ============================================================================
// Parsing and queries
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let html = sample_page(500);

    c.bench_function("parse_document", |b| {
        b.iter(|| Document::parse(&html));
    });
}

fn bench_select(c: &mut Criterion) {
    let doc = Document::parse(&sample_page(500));

    c.bench_function("select_class", |b| {
        b.iter(|| doc.select("tr.odd").unwrap().len());
    });
    c.bench_function("select_descendant", |b| {
        b.iter(|| doc.select("#grid tr > td ul a[href]").unwrap().len());
    });
    c.bench_function("find_from_selection", |b| {
        let rows = doc.select("tr").unwrap();
        b.iter(|| rows.find("a").unwrap().len());
    });
}

fn bench_computed_style(c: &mut Criterion) {
    let doc = Document::parse(&sample_page(100));
    let rows = doc.select("tr.odd td").unwrap();

    c.bench_function("computed_color", |b| {
        b.iter(|| rows.css("color"));
    });
}

// ============================================================================
// Events
// ============================================================================

fn bench_delegated_dispatch(c: &mut Criterion) {
    let doc = Document::parse(&sample_page(200));
    let count = Rc::new(Cell::new(0usize));
    let seen = count.clone();
    let handler = Handler::new(move |_| seen.set(seen.get() + 1));

    doc.select("#grid").unwrap().on_delegated("click", "a", &handler).unwrap();
    let link = doc.select("a").unwrap().last();

    c.bench_function("delegated_click", |b| {
        b.iter(|| {
            link.trigger("click");
        });
    });
}

fn bench_direct_dispatch(c: &mut Criterion) {
    let doc = Document::parse(&sample_page(200));
    let handler = Handler::new(|_| {});

    doc.select("body").unwrap().on("click", &handler);
    let link = doc.select("a").unwrap().last();

    c.bench_function("direct_click", |b| {
        b.iter(|| {
            link.trigger("click");
        });
    });
}

criterion_group!(
    benches,
    // Parsing and queries
    bench_parse,
    bench_select,
    bench_computed_style,
    // Events
    bench_delegated_dispatch,
    bench_direct_dispatch,
);
criterion_main!(benches);

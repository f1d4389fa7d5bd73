//! Benchmarks for the hierarchical chunker, one group per mode.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use hchunk::{chunk, ChunkRequest, Mode};

fn sample_prose(size: usize) -> String {
    let paragraphs = [
        "# Section heading\n\nThe quick brown fox jumps over the lazy dog. ",
        "Pack my box with five dozen liquor jugs. ",
        "How vexingly quick daft zebras jump! ",
        "The five boxing wizards jump quickly.\n\n",
        "Sphinx of black quartz, judge my vow. ",
    ];
    let mut text = String::with_capacity(size);
    let mut i = 0;
    while text.len() < size {
        text.push_str(paragraphs[i % paragraphs.len()]);
        i += 1;
    }
    text.truncate(size);
    text
}

fn sample_table(rows: usize) -> String {
    let mut text = String::from("| id | name | value |\n| - | - | - |\n");
    for i in 0..rows {
        text.push_str(&format!("| {i} | item-{i} | {} |\n", i * 7));
    }
    text
}

fn bench_prose_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("prose_mode");

    for size in [1_000, 10_000, 100_000] {
        let text = sample_prose(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("prose", size), &text, |b, text| {
            b.iter(|| {
                let request = ChunkRequest::new(Mode::Prose, text.clone());
                chunk(black_box(request)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_table_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_mode");

    for rows in [50, 500, 5_000] {
        let text = sample_table(rows);

        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("table", rows), &text, |b, text| {
            b.iter(|| {
                let request = ChunkRequest::new(Mode::Table, text.clone())
                    .with_parent_block_size(2048)
                    .with_sub_block_size(1024);
                chunk(black_box(request)).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_image_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_mode");

    for size in [100, 1_000, 10_000] {
        let text = "A".repeat(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("image", size), &text, |b, text| {
            b.iter(|| {
                let request = ChunkRequest::new(Mode::Image, text.clone())
                    .with_preview_url("https://example.com/preview.png");
                chunk(black_box(request)).unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_prose_mode, bench_table_mode, bench_image_mode);
criterion_main!(benches);

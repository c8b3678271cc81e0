//! Benchmarks for the arena-backed MemoryVfs.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use folio_types::config::SeedFile;
use folio_vfs::{MemoryVfs, WriteOptions};

fn seeds(n_files: usize) -> Vec<SeedFile> {
    (0..n_files)
        .map(|i| SeedFile::file(&format!("/data/dir_{}/file_{i}.md", i % 10), "# note"))
        .collect()
}

fn bench_from_seeds(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_from_seeds");

    for n_files in [100, 1_000] {
        let records = seeds(n_files);
        group.bench_with_input(BenchmarkId::new("build", n_files), &records, |b, records| {
            b.iter(|| MemoryVfs::from_seeds(records, "/home/visitor"));
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_lookup");

    for n_files in [100, 1_000] {
        let vfs = MemoryVfs::from_seeds(&seeds(n_files), "/home/visitor");
        let paths: Vec<String> = (0..n_files)
            .map(|i| format!("/data/dir_{}/file_{i}.md", i % 10))
            .collect();

        group.bench_function(BenchmarkId::new("read_file", n_files), |b| {
            b.iter(|| {
                for path in &paths {
                    let _ = vfs.read_file(path);
                }
            });
        });
    }

    group.finish();
}

fn bench_write_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_write");
    let opts = WriteOptions {
        append: true,
        create: true,
    };

    for n_writes in [100, 1_000] {
        group.bench_function(BenchmarkId::new("append", n_writes), |b| {
            b.iter(|| {
                let mut vfs = MemoryVfs::new("/home/visitor");
                for _ in 0..n_writes {
                    vfs.write_file("~/log.txt", "line\n", opts);
                }
            });
        });
    }

    group.finish();
}

fn bench_copy_and_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("vfs_subtree");
    let base = MemoryVfs::from_seeds(&seeds(1_000), "/home/visitor");

    group.bench_function("copy_1000", |b| {
        b.iter(|| {
            let mut vfs = base.clone();
            vfs.copy("/data", "/backup")
        });
    });

    group.bench_function("walk_1000", |b| {
        b.iter(|| base.walk("/").len());
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_from_seeds,
    bench_lookup,
    bench_write_append,
    bench_copy_and_walk
);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use dictkv::{DictEngine, FileStore, SledStore};
use rand::distributions::Alphanumeric;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn random_string(rng: &mut SmallRng) -> String {
    let len = rng.gen_range(1..100);
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn bench_engine<E: DictEngine>(c: &mut Criterion, store: E, name: &str) {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut keys = vec![];

    c.bench_function(&format!("{}_write", name), |b| {
        b.iter(|| {
            let key = random_string(&mut rng);
            let value = random_string(&mut rng);
            keys.push(key.clone());
            store.set(key, value).expect("failed to set value");
        })
    });
    c.bench_function(&format!("{}_read", name), |b| {
        b.iter(|| {
            let key = keys[rng.gen_range(0..keys.len())].clone();
            store.get(key).expect("failed to get key");
        })
    });
}

pub fn criterion_benchmark_files(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = FileStore::open(temp_dir.path()).expect("unable to open FileStore");
    bench_engine(c, store, "files");
}

pub fn criterion_benchmark_sled(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("unable to create temporary working directory");
    let store = SledStore::open(temp_dir.path()).expect("unable to open SledStore");
    bench_engine(c, store, "sled");
}

criterion_group!(benches, criterion_benchmark_files, criterion_benchmark_sled);
criterion_main!(benches);

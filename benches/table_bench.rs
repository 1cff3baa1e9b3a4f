use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use record_table::{
    Department, Employee, EmployeeValidator, NoopObserver, SearchCriteria, Table,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

// Valid employee ids: two letters and four digits.
fn id(n: u64) -> String {
    let a = (b'A' + (n % 26) as u8) as char;
    let b = (b'A' + ((n / 26) % 26) as u8) as char;
    format!("{}{}{:04}", a, b, (n / 676) % 10_000)
}

fn emp(n: u64) -> Employee {
    Employee::new(id(n), "Bench", "Mark", "Engineer", Department::Engineering, (n % 200_000) as f64)
        .with_skills(["rust", "sql"])
}

fn quiet_table() -> Table<Employee, EmployeeValidator> {
    Table::with_validator(EmployeeValidator).with_observer(Arc::new(NoopObserver))
}

fn filled(n: u64) -> Table<Employee, EmployeeValidator> {
    let t = quiet_table();
    for i in 0..n {
        let _ = t.insert(emp(i));
    }
    t
}

fn bench_insert_10k(c: &mut Criterion) {
    c.bench_function("table_insert_validated_10k", |b| {
        b.iter_batched(
            quiet_table,
            |t| {
                for i in 0..10_000 {
                    let _ = t.insert(emp(i));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    let t = filled(50_000);
    let keys: Vec<String> = lcg(11).take(10_000).map(|x| id(x % 50_000)).collect();
    c.bench_function("table_get_hit_10k", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for k in &keys {
                total += t.find(k).map_or(0.0, |e| e.salary);
            }
            black_box(total)
        })
    });
}

fn bench_search_50k(c: &mut Criterion) {
    let t = filled(50_000);
    let criteria = SearchCriteria::new()
        .salary_range(Some(50_000.0), Some(80_000.0))
        .skill("SQL");
    c.bench_function("table_search_50k", |b| {
        b.iter(|| black_box(t.search(&criteria).len()))
    });
}

fn bench_contended_insert(c: &mut Criterion) {
    c.bench_function("table_insert_4_threads_4x5k", |b| {
        b.iter_batched(
            quiet_table,
            |t| {
                thread::scope(|s| {
                    for w in 0..4u64 {
                        let t = &t;
                        s.spawn(move || {
                            for i in 0..5_000 {
                                let _ = t.insert(emp(w * 5_000 + i));
                            }
                        });
                    }
                });
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_10k,
              bench_get_hit_10k,
              bench_search_50k,
              bench_contended_insert
}
criterion_main!(benches);

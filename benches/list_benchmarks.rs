/*!
# Category List Benchmarks

Measures the list endpoint over category forests of growing size.

## Usage

```bash
# Run all benchmarks (in-memory SQLite by default)
cargo bench --bench list_benchmarks

# Against another database
BENCHMARK_DATABASE_URL=sqlite://bench.db?mode=rwc cargo bench --bench list_benchmarks

# Quick run with fewer samples
cargo bench --bench list_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use axum::{
    Router,
    body::Body,
    http::{Method, Request},
};
use category_catalog::{
    AppConfig, CategoryStore, CategoryUpdate, SaveOptions, build_router, migration::Migrator,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tokio::runtime::Runtime;
use tower::ServiceExt;

fn get_database_url() -> String {
    std::env::var("BENCHMARK_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// `roots` trees, each with `children_per_root` children, committed in one flush
async fn setup_benchmark_store(
    roots: usize,
    children_per_root: usize,
) -> Result<CategoryStore, Box<dyn std::error::Error>> {
    let db = Database::connect(&get_database_url()).await?;
    Migrator::up(&db, None).await?;
    let store = CategoryStore::new(db);

    for root in 0..roots {
        let root_code = format!("tree{root}");
        let mut category = CategoryStore::create();
        store
            .update(
                &mut category,
                CategoryUpdate::with_parent(&root_code, None).label("en_US", &root_code),
            )
            .await?;
        store.save(&category, SaveOptions::DEFERRED).await?;

        for child in 0..children_per_root {
            let mut category = CategoryStore::create();
            store
                .update(
                    &mut category,
                    CategoryUpdate::with_parent(&format!("{root_code}_{child}"), Some(&root_code)),
                )
                .await?;
            store.save(&category, SaveOptions::DEFERRED).await?;
        }
    }
    store.flush().await?;

    Ok(store)
}

async fn benchmark_list(app: Router, uri: String) -> Result<usize, Box<dyn std::error::Error>> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(body.len())
}

fn list_uri(search: &str, query: &str) -> String {
    let search: String = url::form_urlencoded::byte_serialize(search.as_bytes()).collect();
    format!("/api/rest/v1/categories?search={search}&{query}")
}

fn bench_list_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    for roots in [10, 100] {
        let store = rt.block_on(setup_benchmark_store(roots, 10)).unwrap();
        let app = build_router(store, &AppConfig::default()).unwrap();

        let mut group = c.benchmark_group(format!("List Categories ({roots} trees)"));
        group.measurement_time(Duration::from_secs(8));

        let searches = [
            ("roots", r#"{"parent":[{"operator":"EMPTY"}]}"#),
            ("children", r#"{"parent":[{"operator":"NOT EMPTY"}]}"#),
            ("parent_in", r#"{"parent":[{"operator":"IN","value":["tree1","tree2"]}]}"#),
        ];

        for (name, search) in searches {
            let uri = list_uri(search, "limit=100");
            group.bench_with_input(BenchmarkId::new(name, roots), &uri, |b, uri| {
                b.iter(|| {
                    rt.block_on(std::hint::black_box(benchmark_list(app.clone(), uri.clone())))
                });
            });
        }

        let uri = list_uri(searches[1].1, "limit=100&with_count=true");
        group.bench_with_input(BenchmarkId::new("with_count", roots), &uri, |b, uri| {
            b.iter(|| rt.block_on(std::hint::black_box(benchmark_list(app.clone(), uri.clone()))));
        });

        let uri = list_uri(searches[1].1, "page=5&limit=20");
        group.bench_with_input(BenchmarkId::new("page_5", roots), &uri, |b, uri| {
            b.iter(|| rt.block_on(std::hint::black_box(benchmark_list(app.clone(), uri.clone()))));
        });

        group.finish();
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
        .with_plots()
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_list_operations
}
criterion_main!(benches);

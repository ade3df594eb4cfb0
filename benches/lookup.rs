use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use switchback::Router;

fn router_with_routes(count: usize) -> Router<usize> {
    let mut router = Router::new();
    router.get("/", 0).unwrap();
    for i in 0..count {
        router.get(&format!("/api/resource{}/items", i), i).unwrap();
        router
            .get(&format!("/api/resource{}/items/:id", i), i)
            .unwrap();
    }
    router.get("/files/*path", usize::MAX).unwrap();
    router
}

fn bench_static_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("static_lookup");
    for count in [10usize, 100, 500] {
        let router = router_with_routes(count);
        let path = format!("/api/resource{}/items", count / 2);
        group.bench_function(format!("{}_routes", count), |b| {
            b.iter(|| {
                let lookup = router.lookup(&Method::GET, black_box(&path));
                black_box(lookup.handler)
            })
        });
    }
    group.finish();
}

fn bench_param_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("param_lookup");
    for count in [10usize, 100, 500] {
        let router = router_with_routes(count);
        let path = format!("/api/resource{}/items/12345", count / 2);
        group.bench_function(format!("{}_routes", count), |b| {
            b.iter(|| {
                let lookup = router.lookup(&Method::GET, black_box(&path));
                black_box(lookup.params.get("id"))
            })
        });
    }
    group.finish();
}

fn bench_catch_all_lookup(c: &mut Criterion) {
    let router = router_with_routes(100);
    c.bench_function("catch_all_lookup", |b| {
        b.iter(|| {
            let lookup = router.lookup(&Method::GET, black_box("/files/static/css/site.css"));
            black_box(lookup.params.get("path"))
        })
    });
}

fn bench_not_found(c: &mut Criterion) {
    let router = router_with_routes(100);
    c.bench_function("not_found", |b| {
        b.iter(|| {
            let lookup = router.lookup(&Method::GET, black_box("/api/missing/entirely"));
            black_box(lookup.handler)
        })
    });
}

criterion_group!(
    benches,
    bench_static_lookup,
    bench_param_lookup,
    bench_catch_all_lookup,
    bench_not_found
);
criterion_main!(benches);

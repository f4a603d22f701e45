use criterion::{criterion_group, criterion_main, Criterion};
use chrono::{Duration, Utc};
use migration::MigratorTrait;
use serde_json::json;

use service::session::{InMemorySessionStore, SeaOrmSessionStore, SessionRecord, SessionStore};

fn bench_set_get(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let exp = Utc::now() + Duration::days(5);
    let rec = SessionRecord::new("bench", exp, json!({"user": "benny", "roles": ["admin"]}));

    let memory = InMemorySessionStore::<serde_json::Value>::new();
    c.bench_function("memory_set_get", |b| {
        b.to_async(&rt).iter(|| async {
            memory.set(&rec).await.unwrap();
            memory.try_get("bench").await.unwrap().unwrap();
        });
    });

    // schema setup outside of the measured loop
    let db = rt.block_on(async {
        let db = models::db::connect_sqlite_memory().await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    });
    let sqlite = SeaOrmSessionStore::<serde_json::Value>::new(db);
    c.bench_function("sqlite_set_get", |b| {
        b.to_async(&rt).iter(|| async {
            sqlite.set(&rec).await.unwrap();
            sqlite.try_get("bench").await.unwrap().unwrap();
        });
    });
}

criterion_group!(benches, bench_set_get);
criterion_main!(benches);

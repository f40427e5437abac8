use criterion::{black_box, criterion_group, criterion_main, Criterion};
use reward_stats::{Period, Report};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_large_period(dir: &Path, recipients: usize) -> anyhow::Result<()> {
    let json_dir = dir.join("2022-9").join("json");
    fs::create_dir_all(&json_dir)?;

    let mut content = String::from("[");
    for i in 0..recipients {
        if i > 0 {
            content.push(',');
        }
        // every tenth recipient received nothing
        let amount = if i % 10 == 0 { 0 } else { (i as u64) * 1_000_000_000_000 };
        content.push_str(&format!(r#"{{"address": "0x{:040x}", "amount": {}}}"#, i, amount));
    }
    content.push(']');

    fs::write(json_dir.join("distribution.json"), content)?;
    Ok(())
}

fn benchmark_distribution_metrics(c: &mut Criterion) {
    let temp_dir = TempDir::new().unwrap();
    write_large_period(temp_dir.path(), 50_000).unwrap();
    let period = Period::new(2022, 9).unwrap();

    c.bench_function("load_and_aggregate_50k_recipients", |b| {
        b.iter(|| {
            let report = Report::with_base_dir(temp_dir.path(), period);
            let total = report.total_distributed().unwrap();
            let users = report.distributed_users().unwrap();
            black_box((total, users))
        })
    });
}

criterion_group!(benches, benchmark_distribution_metrics);
criterion_main!(benches);

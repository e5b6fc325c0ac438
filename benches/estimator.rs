use baseline_estimator::{
    estimate_normals, BaselineEstimator, LatLon, MonthlySeries, Period, RunConfig, StationCatalog,
    StationLocator, StationPoint, StationSeries, TemperatureUnit, YearMonth,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_values(seed: usize) -> Vec<f64> {
    (0..140 * 12)
        .map(|i| {
            let month = (i % 12) as f64;
            let year = (i / 12) as f64;
            10.0 + 12.0 * (month / 12.0 * std::f64::consts::TAU).sin() + (year * 1.7 + seed as f64).sin()
        })
        .collect()
}

fn synthetic_catalog(stations: usize) -> StationCatalog {
    let start = YearMonth::new(1851, 1).unwrap();
    let series = (0..stations).map(|i| {
        // Spiral out from Blue Hill, roughly 0..600 km.
        let angle = i as f64 * 2.399;
        let radius = (i as f64).sqrt() * 0.4;
        let location = LatLon(42.2125 + radius * angle.sin(), -71.1147 + radius * angle.cos());
        let id = if i == 0 { "744920".to_string() } else { format!("{i:06}") };
        StationSeries::new(id.clone(), id, location, MonthlySeries::new(start, synthetic_values(i)))
    });
    StationCatalog::from_stations(series, TemperatureUnit::Fahrenheit)
}

fn bench_estimator(c: &mut Criterion) {
    let estimator = BaselineEstimator::new(synthetic_catalog(200));
    let config = RunConfig::default();
    c.bench_function("evaluate_200_stations", |b| {
        b.iter(|| estimator.evaluate(black_box(&config)).unwrap())
    });

    let a1 = MonthlySeries::new(YearMonth::new(1851, 1).unwrap(), synthetic_values(1));
    let a2 = MonthlySeries::new(YearMonth::new(1851, 1).unwrap(), synthetic_values(2));
    let r2 = a2.slice(&Period::CANONICAL_NORMAL);
    let a1 = a1.slice(&Period::CANONICAL_SEGMENT);
    let a2 = a2.slice(&Period::CANONICAL_SEGMENT);
    c.bench_function("estimate_normals", |b| {
        b.iter(|| estimate_normals(black_box(&a1), black_box(&a2), black_box(&r2)))
    });
}

fn bench_locator(c: &mut Criterion) {
    let points: Vec<StationPoint> = (0..20_000)
        .map(|i| {
            let lat = ((i * 7919) % 17_000) as f64 / 100.0 - 85.0;
            let lon = ((i * 104_729) % 36_000) as f64 / 100.0 - 180.0;
            StationPoint::new(i.to_string(), LatLon(lat, lon))
        })
        .collect();
    let locator = StationLocator::new(points);
    c.bench_function("within_radius_312km", |b| {
        b.iter(|| locator.within_radius(black_box(LatLon(42.2125, -71.1147)), 312.0, None))
    });
}

criterion_group!(benches, bench_estimator, bench_locator);
criterion_main!(benches);

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        extracting_full_minimap,
        extracting_coarse_minimap,
        decoding_annotation,
        recording_stage_map,
        selecting_map_from_atlas,
        tracking_small_move,
        matching_fuzzy_option,
}

fn extracting_full_minimap(c: &mut criterion::Criterion) {
    let (_, annotation) = sketch::stage(1);
    let minimap = sketch::minimap(&annotation, (80, 90), 96, 0.0);
    let extractor = Extractor::default();
    c.bench_function("extract a 96px minimap at full accuracy", |b| {
        b.iter(|| extractor.observe(&minimap, Duration::ZERO))
    });
}

fn extracting_coarse_minimap(c: &mut criterion::Criterion) {
    let (_, annotation) = sketch::stage(1);
    let minimap = sketch::minimap(&annotation, (80, 90), 96, 0.0);
    let extractor = Extractor::new(Palette::live(), 480);
    c.bench_function("extract a 96px minimap at a third of the accuracy", |b| {
        b.iter(|| extractor.observe(&minimap, Duration::ZERO))
    });
}

fn decoding_annotation(c: &mut criterion::Criterion) {
    let (_, annotation) = sketch::stage(2);
    c.bench_function("decode waypoints from an annotation", |b| {
        b.iter(|| decode(&annotation, None))
    });
}

fn recording_stage_map(c: &mut criterion::Criterion) {
    let (reference, annotation) = sketch::stage(3);
    c.bench_function("record a map from reference and annotation", |b| {
        b.iter(|| RecordedMap::record("stage-3", &reference, &annotation, None))
    });
}

fn selecting_map_from_atlas(c: &mut criterion::Criterion) {
    let mut atlas = Atlas::default();
    for seed in 1..=8 {
        let (reference, annotation) = sketch::stage(seed);
        if let Ok(map) = RecordedMap::record(format!("stage-{}", seed), &reference, &annotation, None) {
            atlas.insert(map);
        }
    }
    let (_, annotation) = sketch::stage(4);
    let minimap = sketch::minimap(&annotation, (80, 80), 96, 0.0);
    let observation = Extractor::default().observe(&minimap, Duration::ZERO).unwrap();
    let matcher = Matcher::default();
    c.bench_function("select a map among 8 recorded maps", |b| {
        b.iter(|| matcher.select(&observation, &atlas))
    });
}

fn tracking_small_move(c: &mut criterion::Criterion) {
    let (reference, annotation) = sketch::stage(5);
    let map = RecordedMap::record("stage-5", &reference, &annotation, None).unwrap();
    let minimap = sketch::minimap(&annotation, (81, 86), 96, 0.0);
    let observation = Extractor::default().observe(&minimap, Duration::ZERO).unwrap();
    let start = Pose::new(Point::new(80.0, 80.0), 0.0, 1.0);
    c.bench_function("track a pose across one small move", |b| {
        b.iter(|| Tracker::new(start).update(&observation, &map))
    });
}

fn matching_fuzzy_option(c: &mut criterion::Criterion) {
    let haystack = "Blessing of the Unyielding Tide: shields regenerate faster";
    c.bench_function("fuzzy match a label inside option text", |b| {
        b.iter(|| fuzzy_contains(haystack, "Unyeilding Tide"))
    });
}

use robodiver::atlas::Atlas;
use robodiver::atlas::RecordedMap;
use robodiver::atlas::decode;
use robodiver::decide::fuzzy_contains;
use robodiver::locate::Matcher;
use robodiver::locate::Pose;
use robodiver::locate::Tracker;
use robodiver::vision::Extractor;
use robodiver::vision::Palette;
use robodiver::vision::Point;
use robodiver::vision::sketch;
use std::time::Duration;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use encoding_rs::EUC_KR;
use subway_crowding::{
    CacheStats, DatasetCache, PipelineConfig, PipelineError, SourceEncoding, StationKey,
};

const EXPORT_NAME: &str = "서울교통공사_지하철혼잡도정보_20250930.csv";

const HEADER: &str = "요일구분,호선,역번호,출발역,상하구분,05시30분,08시00분,23시30분,00시00분,00시30분";

/// Three stations, three blank cells.
fn export_text() -> String {
    [
        HEADER,
        "평일,1호선,150,서울역,상선,12.5,98.1,30.2,,5",
        "평일,1호선,150,서울역,하선,10,87.3,25,11,3.2",
        "토요일,2호선,222,강남,내선,8,60,,20,",
        "",
    ]
    .join("\n")
}

fn cp949(text: &str) -> Vec<u8> {
    let (bytes, _, had_errors) = EUC_KR.encode(text);
    assert!(!had_errors);
    bytes.into_owned()
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn cache_for(dir: &Path) -> DatasetCache {
    DatasetCache::new(PipelineConfig::default().with_data_dir(dir))
}

#[test]
fn legacy_export_loads_and_reports_encoding() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));

    let cache = cache_for(dir.path());
    let ds = cache.load().unwrap();

    assert_eq!(ds.encoding, SourceEncoding::Cp949);
    assert_eq!(ds.len(), 3 * 5);
    assert_eq!(ds.time_slots.len(), 5);
    assert_eq!(cache.reference_date().unwrap().to_string(), "2025-09-30");

    let post_midnight = ds
        .records
        .iter()
        .find(|r| r.time_label == "00시30분")
        .unwrap();
    assert_eq!((post_midnight.hour, post_midnight.minute, post_midnight.time_key), (24, 30, 1470));
}

#[test]
fn second_load_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));

    let cache = cache_for(dir.path());
    let first = cache.load().unwrap();
    let second = cache.load().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.records, second.records);
    assert_eq!(cache.stats(), CacheStats { loads: 1, hits: 1 });
}

#[test]
fn modified_file_is_reloaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), EXPORT_NAME, &cp949(&export_text()));

    let cache = cache_for(dir.path());
    assert_eq!(cache.load().unwrap().len(), 15);

    let mut text = export_text();
    text.push_str("일요일,2호선,222,강남,외선,1,2,3,4,5\n");
    std::fs::write(&path, cp949(&text)).unwrap();

    assert_eq!(cache.load().unwrap().len(), 20);
    assert_eq!(cache.stats().loads, 2);
}

#[test]
fn invalidate_forces_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));

    let cache = cache_for(dir.path());
    cache.load().unwrap();
    assert!(cache.is_populated());

    cache.invalidate();
    assert!(!cache.is_populated());
    cache.load().unwrap();
    assert_eq!(cache.stats(), CacheStats { loads: 2, hits: 0 });
}

#[test]
fn concurrent_callers_share_one_build() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));
    let cache = cache_for(dir.path());

    let datasets: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| cache.load().unwrap())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.stats().loads, 1);
    assert!(datasets.iter().all(|ds| Arc::ptr_eq(ds, &datasets[0])));
}

#[test]
fn each_station_has_every_time_label_once() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));
    let ds = cache_for(dir.path()).load().unwrap();

    let expected: BTreeSet<&str> = HEADER.split(',').skip(5).collect();
    let mut by_station: HashMap<&StationKey, Vec<&str>> = HashMap::new();
    for rec in &ds.records {
        by_station.entry(&rec.station).or_default().push(&rec.time_label);
    }

    assert_eq!(by_station.len(), 3);
    for labels in by_station.values() {
        let unique: BTreeSet<&str> = labels.iter().copied().collect();
        assert_eq!(unique.len(), labels.len());
        assert_eq!(unique, expected);
    }
}

#[test]
fn records_are_chronological_within_station() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));
    let ds = cache_for(dir.path()).load().unwrap();

    for pair in ds.records.windows(2) {
        if pair[0].station == pair[1].station {
            assert!(pair[0].time_key < pair[1].time_key);
        }
    }
    let late = ds.records.iter().find(|r| r.time_label == "23시30분").unwrap();
    let after = ds.records.iter().find(|r| r.time_label == "00시30분").unwrap();
    assert!(after.time_key > late.time_key);
}

#[test]
fn summary_counts_missing_values() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));

    let cache = cache_for(dir.path());
    let summary = cache.data_summary().unwrap();
    assert_eq!(summary.row_count, 15);
    assert_eq!(summary.station_count, 2);
    assert_eq!(summary.time_slot_count, 5);
    assert_eq!(summary.missing_count, 3);
    assert_eq!(summary.lines, vec!["1호선", "2호선"]);
    assert_eq!(summary.congestion_range, Some((3.2, 98.1)));

    // Memoized alongside the dataset.
    assert_eq!(cache.data_summary().unwrap(), summary);
    assert_eq!(cache.stats().loads, 1);
}

#[test]
fn two_candidate_files_fail_resolution() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, &cp949(&export_text()));
    write(dir.path(), "지하철혼잡도_20240101.csv", &cp949(&export_text()));

    match cache_for(dir.path()).load() {
        Err(PipelineError::FileResolution { count, pattern, .. }) => {
            assert_eq!(count, 2);
            assert_eq!(pattern, "*혼잡도*.csv");
        }
        other => panic!("expected resolution failure, got {other:?}"),
    }
}

#[test]
fn undecodable_export_lists_all_encodings() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = cp949(HEADER);
    bytes.extend_from_slice(b"\n\xFF\xFE,\xFF\n");
    write(dir.path(), EXPORT_NAME, &bytes);

    let cache = cache_for(dir.path());
    match cache.load() {
        Err(PipelineError::Decode { attempted, .. }) => {
            assert_eq!(attempted, vec!["cp949", "euc-kr", "utf-8"]);
        }
        other => panic!("expected decode failure, got {other:?}"),
    }
    assert!(!cache.is_populated());
    assert_eq!(cache.reference_date(), None);
}

#[test]
fn utf8_export_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), EXPORT_NAME, export_text().as_bytes());

    let ds = cache_for(dir.path()).load().unwrap();
    assert_eq!(ds.encoding, SourceEncoding::Utf8);
    assert_eq!(ds.len(), 15);
}

#[test]
fn missing_date_in_name_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "지하철혼잡도정보.csv", &cp949(&export_text()));

    let cache = cache_for(dir.path());
    assert!(cache.load().unwrap().reference_date.is_none());
    assert_eq!(cache.reference_date(), None);
}

#[test]
fn malformed_time_header_surfaces_label() {
    let dir = tempfile::tempdir().unwrap();
    let text = "요일구분,호선,역번호,출발역,상하구분,05시30분,8시반\n평일,1호선,150,서울역,상선,1,2\n";
    write(dir.path(), EXPORT_NAME, &cp949(text));

    match cache_for(dir.path()).load() {
        Err(PipelineError::TimeFormat(err)) => assert_eq!(err.label, "8시반"),
        other => panic!("expected time format failure, got {other:?}"),
    }
}

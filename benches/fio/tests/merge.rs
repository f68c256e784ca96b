use std::{
    fs,
    io::{self, Write},
    path::Path,
    sync::{Arc, Mutex},
};

use common::summary::SummaryRecord;
use fio::{merge::summary_log_path, merge_fio_results};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn write_run(dir: &Path, name: &str, timestamp: i64, read_iops: f64) {
    let doc = serde_json::json!({
        "fio version": "fio-3.36",
        "timestamp": timestamp,
        "timestamp_ms": timestamp * 1000,
        "time": format!("run at {timestamp}"),
        "jobs": [{
            "jobname": "randrw",
            "read": {"iops_mean": read_iops, "lat_ns": {"min": 1, "max": 9, "mean": 5000.5}},
            "write": {"iops_mean": read_iops / 2.0, "lat_ns": {"mean": 7000.25}},
            "trim": {"iops_mean": 0.0}
        }],
        "disk_util": []
    });
    fs::write(dir.join(format!("{name}.json")), doc.to_string()).unwrap();
}

fn read_log(path: &Path) -> Vec<SummaryRecord> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| SummaryRecord::parse_line(line).unwrap())
        .collect()
}

#[test]
fn appends_sorted_batch() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "c3", 300, 3.0);
    write_run(dir.path(), "a1", 100, 1.0);
    write_run(dir.path(), "b2", 200, 2.0);

    let report = merge_fio_results(dir.path(), "fio_summary").unwrap();
    assert_eq!(report.watermark, None);
    assert_eq!(report.appended, 3);
    assert_eq!(report.skipped, 0);

    let records = read_log(&report.log_path);
    let stamps: Vec<i64> = records.iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![100, 200, 300]);
    assert_eq!(records[0].commit, "a1");
    assert_eq!(records[0].time, "run at 100");
    assert_eq!(records[1].read_iops, 2.0);
    assert_eq!(records[1].write_iops, 1.0);
    assert_eq!(records[2].read_latency_ns, 5000.5);
    assert_eq!(records[2].write_latency_ns, 7000.25);
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn totals_line_reports_watermark() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a", 10, 1.0);
    write_run(dir.path(), "b", 20, 2.0);
    merge_fio_results(dir.path(), "fio_summary").unwrap();
    write_run(dir.path(), "c", 30, 3.0);

    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let report = tracing::subscriber::with_default(subscriber, || {
        merge_fio_results(dir.path(), "fio_summary").unwrap()
    });
    assert_eq!(report.appended, 1);

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    let totals = output
        .lines()
        .find(|line| line.contains("Appended 1 run(s)"))
        .unwrap();
    assert!(totals.contains("2 already recorded"), "{totals}");
    assert!(totals.contains("watermark Some(20)"), "{totals}");
}

#[test]
fn merging_twice_appends_once() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "a", 10, 1.0);
    write_run(dir.path(), "b", 20, 2.0);

    merge_fio_results(dir.path(), "fio_summary").unwrap();
    let log_path = summary_log_path(dir.path(), "fio_summary");
    let first = fs::read(&log_path).unwrap();

    let report = merge_fio_results(dir.path(), "fio_summary").unwrap();
    assert_eq!(report.watermark, Some(20));
    assert_eq!(report.appended, 0);
    assert_eq!(report.skipped, 2);
    assert_eq!(fs::read(&log_path).unwrap(), first);

    write_run(dir.path(), "c", 30, 3.0);
    let report = merge_fio_results(dir.path(), "fio_summary").unwrap();
    assert_eq!(report.appended, 1);
    let stamps: Vec<i64> = read_log(&log_path).iter().map(|r| r.timestamp).collect();
    assert_eq!(stamps, vec![10, 20, 30]);
}

#[test]
fn runs_at_or_below_watermark_are_dropped() {
    let dir = tempdir().unwrap();
    let log_path = summary_log_path(dir.path(), "fio_summary");
    fs::write(
        &log_path,
        "{\"timestamp\":50,\"time\":\"t\",\"commit\":\"old\",\"read_iops\":1.0,\"read_latency_ns\":1.0,\"write_iops\":1.0,\"write_latency_ns\":1.0}\n",
    )
    .unwrap();
    write_run(dir.path(), "older", 40, 1.0);
    write_run(dir.path(), "same", 50, 1.0);
    write_run(dir.path(), "newer", 60, 1.0);

    let report = merge_fio_results(dir.path(), "fio_summary").unwrap();
    assert_eq!(report.watermark, Some(50));
    assert_eq!(report.appended, 1);
    assert_eq!(report.skipped, 2);

    let commits: Vec<String> = read_log(&log_path).into_iter().map(|r| r.commit).collect();
    assert_eq!(commits, vec!["old", "newer"]);
}

#[test]
fn empty_directory_leaves_log_untouched() {
    let dir = tempdir().unwrap();
    let log_path = summary_log_path(dir.path(), "fio_summary");
    let contents = "{\"timestamp\": 1, \"time\": \"x\"}\nnot even json but not last\n{\"timestamp\": 2}\n";
    fs::write(&log_path, contents).unwrap();

    let report = merge_fio_results(dir.path(), "fio_summary").unwrap();
    assert_eq!(report.appended, 0);
    assert_eq!(fs::read_to_string(&log_path).unwrap(), contents);
}

#[test]
fn nothing_new_does_not_create_log() {
    let dir = tempdir().unwrap();
    let report = merge_fio_results(dir.path(), "custom").unwrap();
    assert_eq!(report.log_path, dir.path().join("custom.jsonl"));
    assert!(!report.log_path.exists());
}

#[test]
fn stale_documents_are_not_validated_further() {
    let dir = tempdir().unwrap();
    let log_path = summary_log_path(dir.path(), "fio_summary");
    fs::write(&log_path, "{\"timestamp\": 100}\n").unwrap();
    fs::write(dir.path().join("stale.json"), r#"{"timestamp": 5}"#).unwrap();

    let report = merge_fio_results(dir.path(), "fio_summary").unwrap();
    assert_eq!(report.skipped, 1);
    assert_eq!(fs::read_to_string(&log_path).unwrap(), "{\"timestamp\": 100}\n");
}

#[test]
fn malformed_document_aborts_without_writing() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), "good", 10, 1.0);
    fs::write(dir.path().join("no_jobs.json"), r#"{"timestamp": 20, "time": "t", "jobs": []}"#)
        .unwrap();
    assert!(merge_fio_results(dir.path(), "fio_summary").is_err());
    assert!(!summary_log_path(dir.path(), "fio_summary").exists());

    fs::remove_file(dir.path().join("no_jobs.json")).unwrap();
    fs::write(dir.path().join("broken.json"), "{\"timestamp\": ").unwrap();
    assert!(merge_fio_results(dir.path(), "fio_summary").is_err());

    fs::write(dir.path().join("broken.json"), r#"{"time": "t", "jobs": []}"#).unwrap();
    assert!(merge_fio_results(dir.path(), "fio_summary").is_err());
    assert!(!summary_log_path(dir.path(), "fio_summary").exists());
}

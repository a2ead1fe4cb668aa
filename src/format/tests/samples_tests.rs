//! Tests for the data sample file format.

use crate::format::{FormatError, SampleBuffer, load_samples, parse_samples, save_samples};
use crate::model::{GeoPoint, ImagePoint, Sample};

fn isobath_sample(x: f64, y: f64, value: f64) -> Sample {
    Sample::new(
        ImagePoint::new(x, y),
        GeoPoint::new(-3.0 + x / 100.0, 48.0 - y / 100.0),
        value,
    )
}

#[test]
fn test_buffer_lines() {
    let mut buffer = SampleBuffer::new();
    assert!(buffer.is_empty());

    buffer.push(&Sample::new(
        ImagePoint::new(10.0, 20.0),
        GeoPoint::new(-2.9, 47.8),
        50.0,
    ));
    buffer.push(&Sample::new(
        ImagePoint::new(1.5, 2.0),
        GeoPoint::new(-2.5, 47.25),
        12.75,
    ));

    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.as_str(), "10 20 -2.9 47.8 50\n1.5 2 -2.5 47.25 12.75\n");
}

#[test]
fn test_buffer_precision() {
    let mut buffer = SampleBuffer::new().with_precision(Some(2));
    buffer.push(&Sample::new(
        ImagePoint::new(1.0, 2.0),
        GeoPoint::new(-2.5, 47.25),
        100.0,
    ));
    assert_eq!(buffer.as_str(), "1.00 2.00 -2.50 47.25 100.00\n");
}

#[test]
fn test_buffer_from_existing_text() {
    let mut buffer = SampleBuffer::from_text("1 2 3 4 5");
    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.as_str(), "1 2 3 4 5\n");

    buffer.push(&Sample::new(
        ImagePoint::new(6.0, 7.0),
        GeoPoint::new(8.0, 9.0),
        10.0,
    ));
    assert_eq!(buffer.as_str(), "1 2 3 4 5\n6 7 8 9 10\n");

    let samples = buffer.samples().unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1].value, 10.0);
    assert_eq!(samples[0].geo, GeoPoint::new(3.0, 4.0));
}

#[test]
fn test_buffer_clear() {
    let mut buffer = SampleBuffer::new();
    buffer.push(&isobath_sample(1.0, 1.0, 5.0));
    buffer.clear();
    assert!(buffer.is_empty());
    assert_eq!(buffer.as_str(), "");
}

#[test]
fn test_parse_reports_line_number() {
    let text = "1 2 3 4 5\n\n1 2 3 four 5\n";
    let result = parse_samples(text);
    assert!(matches!(result, Err(FormatError::InvalidLine { line: 3, .. })));

    let short = parse_samples("1 2 3 4\n");
    assert!(matches!(short, Err(FormatError::InvalidLine { line: 1, .. })));
}

#[test]
fn test_save_and_load_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("isobaths.txt");

    let mut buffer = SampleBuffer::new();
    buffer.push(&isobath_sample(10.0, 20.0, 50.0));
    buffer.push(&isobath_sample(30.0, 40.0, 50.0));
    save_samples(&path, &buffer).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), buffer.as_str());

    let loaded = load_samples(&path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.samples().unwrap(), buffer.samples().unwrap());
}

#[test]
fn test_load_rejects_malformed_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.txt");
    std::fs::write(&path, "1 2 3 4 5\nnot a sample\n").unwrap();

    assert!(matches!(
        load_samples(&path),
        Err(FormatError::InvalidLine { line: 2, .. })
    ));
}

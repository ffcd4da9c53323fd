use lf_bench::error::EvalError;
use lf_bench::image::pfm::{read_pfm, write_pfm, write_pfm_with, Endianness, PfmError};
use lf_bench::image::ImageF32;
use std::fs;

fn sample() -> ImageF32 {
    ImageF32::from_fn(5, 3, |x, y| match (x, y) {
        (0, 0) => f32::NAN,
        (4, 2) => f32::INFINITY,
        _ => x as f32 * 0.25 - y as f32,
    })
}

fn same(a: &ImageF32, b: &ImageF32) -> bool {
    a.shape() == b.shape()
        && a.data
            .iter()
            .zip(&b.data)
            .all(|(x, y)| x.to_bits() == y.to_bits())
}

#[test]
fn files_keep_orientation_and_non_finite_values() {
    let dir = tempfile::tempdir().unwrap();
    let img = sample();

    let little = dir.path().join("nested/little.pfm");
    write_pfm(&little, &img).unwrap();
    assert!(same(&read_pfm(&little).unwrap(), &img));

    let big = dir.path().join("big.pfm");
    write_pfm_with(&big, &img, Endianness::Big).unwrap();
    let bytes = fs::read(&big).unwrap();
    assert!(bytes.starts_with(b"Pf\n5 3\n1\n"));
    let decoded = read_pfm(&big).unwrap();
    assert!(decoded.get(0, 0).is_nan());
    assert_eq!(decoded.get(1, 0), 0.25);
    assert_eq!(decoded.get(0, 2), -2.0);
}

#[test]
fn missing_and_malformed_files_are_typed() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pfm");
    let err = read_pfm(&missing).unwrap_err();
    assert!(err.is_not_found() && err.is_recoverable());

    let bad = dir.path().join("bad.pfm");
    fs::write(&bad, b"Pf\n4 4\n-1\n\0\0\0\0").unwrap();
    match read_pfm(&bad) {
        Err(EvalError::Pfm { source, .. }) => {
            assert_eq!(source, PfmError::InvalidData { height: 4, width: 4 })
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

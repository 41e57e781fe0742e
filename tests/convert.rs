mod common;

use std::fs;

use common::{file_names, ramp, snapshot, write_volume};
use nifti_slices::{
    CastMode, ConversionRequest, ConvertError, Converter,
    manifest::MANIFEST_FILE,
    statistics::PROPERTIES_FILE,
    validator::ValidationError,
};

#[test]
fn local_slices_along_first_axis() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_volume(source.path(), "case.nii.gz", &ramp((10, 20, 30), -500.0));

    let request = ConversionRequest::new(source.path(), target.path(), 0, 5)
        .with_global_norm(false);
    let summary = Converter::new(&request).unwrap().run().unwrap();
    assert_eq!(summary.volumes, 1);
    assert_eq!(summary.slices, 2);

    let output = target.path().join("case");
    assert_eq!(file_names(&output), vec!["slice_0_0.png", "slice_5_0.png"]);
    for name in ["slice_0_0.png", "slice_5_0.png"] {
        let image = image::open(output.join(name)).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (30, 20));
    }

    // the ramp puts the volume minimum first and the maximum last
    let first = image::open(output.join("slice_0_0.png")).unwrap().to_luma8();
    assert_eq!(first.get_pixel(0, 0).0, [0]);
    let last = image::open(output.join("slice_5_0.png")).unwrap().to_luma8();
    assert!(last.get_pixel(29, 19).0[0] > first.get_pixel(29, 19).0[0]);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(target.path().join(MANIFEST_FILE)).unwrap())
            .unwrap();
    assert_eq!(manifest["slice_dim"], 0);
    assert_eq!(manifest["spacing"], 5);
    assert_eq!(manifest["global_norm"], false);
}

#[test]
fn slice_count_and_shape_follow_the_axis() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_volume(source.path(), "a.nii.gz", &ramp((4, 6, 9), 0.0));
    write_volume(source.path(), "b.nii.gz", &ramp((5, 7, 9), 0.0));

    let request = ConversionRequest::new(source.path(), target.path(), 2, 4)
        .with_global_norm(false);
    let summary = Converter::new(&request).unwrap().run().unwrap();
    assert_eq!(summary.volumes, 2);
    assert_eq!(summary.slices, 6);

    assert_eq!(file_names(target.path()), vec!["a", "b", MANIFEST_FILE]);
    assert_eq!(
        file_names(&target.path().join("a")),
        vec!["slice_0_2.png", "slice_4_2.png", "slice_8_2.png"]
    );
    let image = image::open(target.path().join("b").join("slice_8_2.png"))
        .unwrap()
        .to_luma8();
    assert_eq!(image.dimensions(), (7, 5));
}

#[test]
fn rerunning_produces_identical_output() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let stats_dir = tempfile::tempdir().unwrap();
    write_volume(source.path(), "one.nii.gz", &ramp((6, 8, 10), -1500.0));
    write_volume(source.path(), "two.nii.gz", &ramp((6, 8, 10), 200.0));

    for global_norm in [false, true] {
        let cast = if global_norm { CastMode::Wrap } else { CastMode::Clamp };
        let request = ConversionRequest::new(source.path(), target.path(), 1, 3)
            .with_global_norm(global_norm)
            .with_cast(cast);
        let converter = Converter::new(&request)
            .unwrap()
            .with_statistics_dir(stats_dir.path());

        converter.run().unwrap();
        let first = snapshot(target.path());
        converter.run().unwrap();
        assert_eq!(snapshot(target.path()), first);
    }
}

#[test]
fn global_statistics_are_written_to_the_statistics_dir() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let stats_dir = tempfile::tempdir().unwrap();
    write_volume(source.path(), "scan.nii.gz", &ramp((3, 4, 5), -30.0));

    let request = ConversionRequest::new(source.path(), target.path(), 0, 1);
    Converter::new(&request)
        .unwrap()
        .with_statistics_dir(stats_dir.path())
        .run()
        .unwrap();

    assert!(!source.path().join(PROPERTIES_FILE).exists());
    let stats: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(stats_dir.path().join(PROPERTIES_FILE)).unwrap(),
    )
    .unwrap();
    // voxels -30..=29 are all inside the default statistics clip
    assert_eq!(stats["mean"], -0.5);
    assert_eq!(stats["means"].as_array().unwrap().len(), 1);
    assert_eq!(file_names(&target.path().join("scan")).len(), 3);
}

#[test]
fn cached_statistics_in_source_are_reused() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let stats_dir = tempfile::tempdir().unwrap();
    write_volume(source.path(), "scan.nii.gz", &ramp((3, 4, 5), 0.0));
    fs::write(
        source.path().join(PROPERTIES_FILE),
        r#"{"mean": 10.0, "std": 5.0, "means": [10.0], "variances": [25.0]}"#,
    )
    .unwrap();

    let request = ConversionRequest::new(source.path(), target.path(), 0, 2);
    Converter::new(&request)
        .unwrap()
        .with_statistics_dir(stats_dir.path())
        .run()
        .unwrap();

    assert!(!stats_dir.path().join(PROPERTIES_FILE).exists());
    // voxel 17 standardizes to (17 - 10) / 5 = 1.4, voxel 0 to -2
    let image = image::open(target.path().join("scan").join("slice_0_0.png"))
        .unwrap()
        .to_luma8();
    assert_eq!(image.dimensions(), (5, 4));
    assert_eq!(image.get_pixel(2, 3).0, [1]);
    assert_eq!(image.get_pixel(0, 0).0, [0]);
}

#[test]
fn spacing_at_extent_fails_before_output() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_volume(source.path(), "scan.nii.gz", &ramp((4, 5, 6), 0.0));

    for (axis, spacing) in [(0, 4), (1, 5), (2, 6), (2, 60)] {
        let request = ConversionRequest::new(source.path(), target.path(), axis, spacing);
        assert!(matches!(
            Converter::new(&request),
            Err(ConvertError::Validation(ValidationError::SpacingTooLarge { .. }))
        ));
    }
    assert!(file_names(target.path()).is_empty());

    let request = ConversionRequest::new(source.path(), target.path(), 2, 5)
        .with_global_norm(false);
    assert_eq!(Converter::new(&request).unwrap().run().unwrap().slices, 2);
}

#[test]
fn unreadable_volume_aborts_the_run() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    write_volume(source.path(), "a.nii.gz", &ramp((3, 3, 3), 0.0));
    fs::write(source.path().join("b.nii.gz"), b"corrupt").unwrap();

    let request = ConversionRequest::new(source.path(), target.path(), 0, 1)
        .with_global_norm(false);
    let result = Converter::new(&request).unwrap().run();
    assert!(matches!(result, Err(ConvertError::Loader(_))));

    // earlier output stays, no manifest
    assert_eq!(file_names(&target.path().join("a")).len(), 3);
    assert!(!target.path().join(MANIFEST_FILE).exists());
}

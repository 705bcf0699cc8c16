//! Integration tests for image-file rasterization.

use image::{Rgba, RgbaImage};
use slicepdf::{
    paginate, paginate_images, paginate_images_to_file, Error, ImageRasterizer, ImageSource,
    PageGeometry, PaginateOptions, RasterizeError,
};
use std::path::{Path, PathBuf};

/// Write a PNG with a dark band every `period` rows.
fn write_png(dir: &Path, name: &str, width: u32, height: u32, period: u32) -> PathBuf {
    let img = RgbaImage::from_fn(width, height, |_, y| {
        if y % period < period / 2 {
            Rgba([30, 30, 30, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

fn options() -> PaginateOptions {
    PaginateOptions::new()
        .with_geometry(PageGeometry::new(400.0, 840.0, 20.0))
        .with_sample_scale(2.0)
        .with_title_reserve(0.0)
}

#[test]
fn test_paginate_png_files() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write_png(dir.path(), "q1.png", 720, 600, 40),
        write_png(dir.path(), "q2.png", 720, 1200, 40),
        write_png(dir.path(), "q3.png", 720, 100, 40),
    ];

    let doc = paginate_images(&paths, options()).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.pages[0].block_indices(), vec![0, 1]);
    assert_eq!(doc.pages[1].block_indices(), vec![1, 2]);
}

#[test]
fn test_paginate_images_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_png(dir.path(), "q1.png", 720, 300, 40);
    let output = dir.path().join("out.pdf");

    let doc = paginate_images_to_file(&[&input], &output, options()).unwrap();
    assert_eq!(doc.page_count(), 1);

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_in_memory_source() {
    let img = RgbaImage::from_pixel(200, 80, Rgba([0, 0, 0, 255]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

    let blocks = vec![ImageSource::Bytes(bytes.into_inner())];
    let doc = paginate(&blocks, &mut ImageRasterizer::new(), options()).unwrap();
    let placement = doc.placements().next().unwrap();
    assert_eq!(placement.src_rows(), 0..80);
    assert_eq!(placement.dest.height.get(), 40.0);
}

#[test]
fn test_missing_file_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_png(dir.path(), "q1.png", 720, 100, 40);
    let missing = dir.path().join("q2.png");

    let result = paginate_images(&[good, missing], options());
    match result {
        Err(Error::Rasterization { index, source }) => {
            assert_eq!(index, 1);
            assert!(matches!(source, RasterizeError::Unreadable(_)));
        }
        other => panic!("expected rasterization error, got {:?}", other.is_ok()),
    }
}

#[test]
fn test_corrupt_file_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("q1.png");
    std::fs::write(&path, b"not an image").unwrap();

    let result = paginate_images(&[path], options());
    assert!(matches!(
        result,
        Err(Error::Rasterization {
            index: 0,
            source: RasterizeError::Decode(_)
        })
    ));
}

#[cfg(feature = "async")]
#[test]
fn test_paginate_async() {
    use slicepdf::Paginator;

    let dir = tempfile::tempdir().unwrap();
    let blocks: Vec<ImageSource> = vec![
        write_png(dir.path(), "q1.png", 720, 600, 40).into(),
        write_png(dir.path(), "q2.png", 720, 1200, 40).into(),
        write_png(dir.path(), "q3.png", 720, 100, 40).into(),
    ];

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut paginator = Paginator::new(options()).unwrap();
    let mut rasterizer = ImageRasterizer::new();
    let async_doc = runtime
        .block_on(paginator.paginate_async(&blocks, &mut rasterizer))
        .unwrap();

    let sync_doc = paginate(&blocks, &mut ImageRasterizer::new(), options()).unwrap();
    assert_eq!(async_doc.layout_report(), sync_doc.layout_report());
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test helpers — one-page scan PDFs built with lopdf.

use std::path::Path;

use image::GrayImage;
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// Uncompressed 8-bit `DeviceGray` image XObject holding `image`.
pub(crate) fn gray_stream(image: &GrayImage) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => image.width() as i64,
            "Height" => image.height() as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        image.as_raw().clone(),
    )
}

/// Write a one-page PDF whose page draws `images`.
pub(crate) fn write_pdf(path: &Path, images: Vec<Stream>) {
    write_rotated_pdf(path, images, None, None);
}

/// Like [`write_pdf`], with `/Rotate` on the page and/or on the `Pages` node.
///
/// Resources live on the `Pages` node so page-tree inheritance is exercised.
pub(crate) fn write_rotated_pdf(
    path: &Path,
    images: Vec<Stream>,
    page_rotate: Option<i64>,
    tree_rotate: Option<i64>,
) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut xobjects = Dictionary::new();
    for (i, stream) in images.into_iter().enumerate() {
        let id = doc.add_object(stream);
        xobjects.set(format!("Im{i}"), id);
    }

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    if let Some(degrees) = page_rotate {
        page.set("Rotate", degrees);
    }
    let page_id = doc.add_object(page);

    let mut pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => dictionary! { "XObject" => xobjects },
    };
    if let Some(degrees) = tree_rotate {
        pages.set("Rotate", degrees);
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

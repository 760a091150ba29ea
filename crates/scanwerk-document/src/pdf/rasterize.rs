// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF first-page rasterisation.
//
// Scanned PDFs are almost always one full-page image per page, so the
// embedded-scan extractor pulls that image out directly with `lopdf`. Anything
// else (vector text, unusual filters) goes through Poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument, warn};

/// Resolution used when Poppler renders a page.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// Produces a raster of the first page of a PDF.
pub trait PageRasterizer: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Rasterise page 1 of `pdf`.
    fn first_page(&self, pdf: &Path) -> Result<DynamicImage>;
}

// -- Embedded scan ------------------------------------------------------------

/// Extracts the largest image XObject drawn on page 1.
///
/// Handles `DCTDecode` (JPEG) streams and 8-bit gray/RGB streams that are
/// either uncompressed or `FlateDecode`d. The page's `/Rotate` is applied, so
/// the result has the orientation a viewer would show.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedScanExtractor;

impl PageRasterizer for EmbeddedScanExtractor {
    fn name(&self) -> &'static str {
        "embedded-scan"
    }

    #[instrument(skip_all, fields(pdf = %pdf.display()))]
    fn first_page(&self, pdf: &Path) -> Result<DynamicImage> {
        let document = Document::load(pdf).map_err(|err| {
            ScanwerkError::PdfError(format!("failed to open {}: {}", pdf.display(), err))
        })?;

        let page_id = first_page_id(&document)?;
        let resources = page_resources(&document, page_id)?;
        let stream = largest_image(&document, resources)?;
        let image = decode_image_stream(&document, stream)?;
        let rotation = page_rotation(&document, page_id)?;
        let image = match rotation {
            90 => image.rotate90(),
            180 => image.rotate180(),
            270 => image.rotate270(),
            _ => image,
        };

        info!(
            width = image.width(),
            height = image.height(),
            rotation,
            "Embedded scan extracted"
        );
        Ok(image)
    }
}

fn first_page_id(document: &Document) -> Result<ObjectId> {
    document
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| ScanwerkError::PdfError("document has no pages".into()))
}

/// Follow indirect references until a direct object is reached.
fn resolve<'a>(document: &'a Document, mut object: &'a Object) -> Result<&'a Object> {
    // Bounded so a reference cycle cannot hang us.
    for _ in 0..32 {
        match object {
            Object::Reference(id) => {
                object = document.get_object(*id).map_err(|err| {
                    ScanwerkError::PdfError(format!("dangling reference {:?}: {}", id, err))
                })?;
            }
            direct => return Ok(direct),
        }
    }
    Err(ScanwerkError::PdfError("reference chain too deep".into()))
}

fn resolve_dict<'a>(document: &'a Document, object: &'a Object) -> Result<&'a Dictionary> {
    match resolve(document, object)? {
        Object::Dictionary(dict) => Ok(dict),
        Object::Stream(stream) => Ok(&stream.dict),
        _ => Err(ScanwerkError::PdfError("expected a dictionary".into())),
    }
}

/// A page attribute, taken from the page or the nearest ancestor that sets it.
fn inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>> {
    let mut node = document
        .get_object(page_id)
        .map_err(|err| ScanwerkError::PdfError(format!("page 1 unreadable: {}", err)))?;

    for _ in 0..32 {
        let dict = resolve_dict(document, node)?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => node = parent,
            Err(_) => return Ok(None),
        }
    }
    Err(ScanwerkError::PdfError("page tree too deep".into()))
}

fn page_resources(document: &Document, page_id: ObjectId) -> Result<&Dictionary> {
    match inherited(document, page_id, b"Resources")? {
        Some(resources) => resolve_dict(document, resources),
        None => Err(ScanwerkError::PdfError("page 1 has no resources".into())),
    }
}

/// Clockwise display rotation of the page: 0, 90, 180 or 270.
fn page_rotation(document: &Document, page_id: ObjectId) -> Result<u32> {
    let Some(rotate) = inherited(document, page_id, b"Rotate")? else {
        return Ok(0);
    };
    let degrees = resolve(document, rotate)?
        .as_i64()
        .map_err(|_| ScanwerkError::PdfError("malformed /Rotate".into()))?;

    match degrees.rem_euclid(360) {
        0 => Ok(0),
        90 => Ok(90),
        180 => Ok(180),
        270 => Ok(270),
        _ => {
            warn!(rotate = degrees, "/Rotate is not a multiple of 90; ignoring it");
            Ok(0)
        }
    }
}

fn integer(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|obj| obj.as_i64().ok())
}

/// `/Width` and `/Height` of an image XObject, both positive and within `u32`.
fn image_dimensions(dict: &Dictionary) -> Result<(u32, u32)> {
    let side = |key: &[u8]| integer(dict, key).and_then(|n| u32::try_from(n).ok());
    match (side(b"Width"), side(b"Height")) {
        (Some(width), Some(height)) if width > 0 && height > 0 => Ok((width, height)),
        _ => Err(ScanwerkError::PdfError("image has invalid dimensions".into())),
    }
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(Object::as_name), Ok(b"Image"))
}

/// The image XObject on the page with the most pixels.
fn largest_image<'a>(document: &'a Document, resources: &'a Dictionary) -> Result<&'a Stream> {
    let xobjects = resources
        .get(b"XObject")
        .map_err(|_| ScanwerkError::PdfError("page 1 draws no images".into()))?;
    let xobjects = resolve_dict(document, xobjects)?;

    let mut best: Option<(u64, &Stream)> = None;
    for (name, object) in xobjects.iter() {
        let Ok(Object::Stream(stream)) = resolve(document, object) else {
            continue;
        };
        if !is_image(&stream.dict) {
            continue;
        }
        let (width, height) = image_dimensions(&stream.dict)?;
        debug!(
            name = %String::from_utf8_lossy(name),
            width,
            height,
            "Image XObject found"
        );
        let area = u64::from(width) * u64::from(height);
        if best.is_none_or(|(best_area, _)| area > best_area) {
            best = Some((area, stream));
        }
    }

    best.map(|(_, stream)| stream)
        .ok_or_else(|| ScanwerkError::PdfError("page 1 draws no images".into()))
}

/// Filter names applied to a stream, outermost first.
fn filters(document: &Document, dict: &Dictionary) -> Result<Vec<Vec<u8>>> {
    let Ok(filter) = dict.get(b"Filter") else {
        return Ok(Vec::new());
    };
    match resolve(document, filter)? {
        Object::Name(name) => Ok(vec![name.clone()]),
        Object::Array(items) => items
            .iter()
            .map(|item| match resolve(document, item)? {
                Object::Name(name) => Ok(name.clone()),
                _ => Err(ScanwerkError::PdfError("malformed /Filter array".into())),
            })
            .collect(),
        _ => Err(ScanwerkError::PdfError("malformed /Filter".into())),
    }
}

/// Number of colour components for the colour spaces a scan uses.
fn components(document: &Document, dict: &Dictionary) -> Option<usize> {
    let colour_space = resolve(document, dict.get(b"ColorSpace").ok()?).ok()?;
    match colour_space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" => Some(1),
            b"DeviceRGB" | b"CalRGB" => Some(3),
            _ => None,
        },
        // [/ICCBased <stream>] carries the component count in /N.
        Object::Array(items) if items.len() == 2 => {
            let profile = resolve_dict(document, &items[1]).ok()?;
            match integer(profile, b"N")? {
                1 => Some(1),
                3 => Some(3),
                _ => None,
            }
        }
        _ => None,
    }
}

fn decode_image_stream(document: &Document, stream: &Stream) -> Result<DynamicImage> {
    let filters = filters(document, &stream.dict)?;

    if filters.iter().any(|f| f == b"DCTDecode") {
        return image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .map_err(|err| ScanwerkError::PdfError(format!("embedded JPEG unreadable: {}", err)));
    }

    let (width, height) = image_dimensions(&stream.dict)?;
    if integer(&stream.dict, b"BitsPerComponent") != Some(8) {
        return Err(ScanwerkError::PdfError(
            "only 8-bit embedded images are supported".into(),
        ));
    }

    let data = match filters.as_slice() {
        [] => stream.content.clone(),
        [only] if only == b"FlateDecode" => stream.decompressed_content().map_err(|err| {
            ScanwerkError::PdfError(format!("embedded image stream unreadable: {}", err))
        })?,
        other => {
            let names: Vec<String> = other
                .iter()
                .map(|f| String::from_utf8_lossy(f).into_owned())
                .collect();
            return Err(ScanwerkError::PdfError(format!(
                "unsupported image filter {}",
                names.join("+")
            )));
        }
    };

    let channels = components(document, &stream.dict)
        .ok_or_else(|| ScanwerkError::PdfError("unsupported image colour space".into()))?;
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or_else(|| ScanwerkError::PdfError(format!("{width}x{height} image is too large")))?;
    let pixels = data
        .get(..expected)
        .map(<[u8]>::to_vec)
        .ok_or_else(|| ScanwerkError::PdfError("image stream too short".into()))?;

    let image = match channels {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        _ => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
    };
    image.ok_or_else(|| ScanwerkError::PdfError("image stream too short".into()))
}

// -- Poppler ------------------------------------------------------------------

/// Renders page 1 with `pdftoppm` into a scoped temporary directory.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    dpi: u32,
    /// Directory for the scratch render; system default if `None`.
    temp_dir: Option<PathBuf>,
    /// Where to look for `pdftoppm`; the process `PATH` if `None`.
    search_path: Option<String>,
}

impl PopplerRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self {
            dpi,
            temp_dir: None,
            search_path: None,
        }
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_search_path(mut self, paths: impl Into<String>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    fn locate(&self) -> Result<PathBuf> {
        let resolved = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in("pdftoppm", Some(paths), cwd)
            }
            None => which::which("pdftoppm"),
        };
        resolved.map_err(|err| {
            ScanwerkError::PdfError(format!("pdftoppm is not installed: {}", err))
        })
    }
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(DEFAULT_RENDER_DPI)
    }
}

impl PageRasterizer for PopplerRasterizer {
    fn name(&self) -> &'static str {
        "pdftoppm"
    }

    #[instrument(skip_all, fields(pdf = %pdf.display(), dpi = self.dpi))]
    fn first_page(&self, pdf: &Path) -> Result<DynamicImage> {
        let executable = self.locate()?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("scanwerk-pdf-");
        let scratch = match &self.temp_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        let prefix = scratch.path().join("page");

        let output = Command::new(&executable)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg(pdf)
            .arg(&prefix)
            .output()
            .map_err(|err| ScanwerkError::PdfError(format!("failed to run pdftoppm: {}", err)))?;

        if !output.status.success() {
            return Err(ScanwerkError::PdfError(format!(
                "pdftoppm failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let rendered = prefix.with_extension("png");
        let image = image::open(&rendered).map_err(|err| {
            ScanwerkError::PdfError(format!("pdftoppm output unreadable: {}", err))
        })?;

        if let Err(err) = scratch.close() {
            warn!(error = %err, "Failed to remove pdftoppm scratch directory");
        }

        info!(
            width = image.width(),
            height = image.height(),
            "Page rendered by pdftoppm"
        );
        Ok(image)
    }
}

// -- Default chain ------------------------------------------------------------

/// Embedded scan first, Poppler as the fallback.
#[derive(Debug, Default, Clone)]
pub struct DefaultRasterizer {
    embedded: EmbeddedScanExtractor,
    poppler: PopplerRasterizer,
}

impl DefaultRasterizer {
    /// Poppler's scratch files go under `temp_dir`, and `pdftoppm` is looked
    /// up on `search_path`. `None` keeps the system default for either.
    pub fn configured(temp_dir: Option<&Path>, search_path: Option<&str>) -> Self {
        let mut poppler = PopplerRasterizer::default();
        if let Some(dir) = temp_dir {
            poppler = poppler.with_temp_dir(dir);
        }
        if let Some(paths) = search_path {
            poppler = poppler.with_search_path(paths);
        }
        Self {
            embedded: EmbeddedScanExtractor,
            poppler,
        }
    }
}

impl PageRasterizer for DefaultRasterizer {
    fn name(&self) -> &'static str {
        "default"
    }

    fn first_page(&self, pdf: &Path) -> Result<DynamicImage> {
        match self.embedded.first_page(pdf) {
            Ok(image) => Ok(image),
            Err(embedded_err) => {
                debug!(error = %embedded_err, "No usable embedded scan; trying pdftoppm");
                self.poppler.first_page(pdf).map_err(|poppler_err| {
                    ScanwerkError::PdfError(format!(
                        "{}: {}; {}: {}",
                        self.embedded.name(),
                        embedded_err,
                        self.poppler.name(),
                        poppler_err
                    ))
                })
            }
        }
    }
}

// -- Tests --------------------------------------------------------------------


#[cfg(test)]
mod tests {
    use image::Luma;
    use lopdf::dictionary;

    use super::*;
    use crate::test_support::{gray_stream, write_pdf, write_rotated_pdf};

    fn uniform(width: u32, height: u32, value: u8) -> Stream {
        gray_stream(&GrayImage::from_pixel(width, height, Luma([value])))
    }

    /// 40×10 page, black only in the top-left pixel.
    fn marked_strip() -> GrayImage {
        let mut strip = GrayImage::from_pixel(40, 10, Luma([200]));
        strip.put_pixel(0, 0, Luma([0]));
        strip
    }

    fn image_stream(width: i64, height: i64, colour_space: &str, bits: i64) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => colour_space,
                "BitsPerComponent" => bits,
            },
            vec![0; 64],
        )
    }

    #[test]
    fn extracts_largest_raw_gray_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        write_pdf(
            &path,
            vec![uniform(8, 4, 10), uniform(40, 30, 200), uniform(5, 5, 90)],
        );

        let image = EmbeddedScanExtractor.first_page(&path).unwrap();
        assert_eq!((image.width(), image.height()), (40, 30));
        assert_eq!(image.to_luma8().get_pixel(7, 7).0[0], 200);
    }

    #[test]
    fn extracts_jpeg_scan() {
        let page = GrayImage::from_fn(64, 48, |x, _| Luma([if x < 32 { 0 } else { 255 }]));
        let mut jpeg = Vec::new();
        DynamicImage::ImageLuma8(page)
            .write_to(&mut std::io::Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 64,
                "Height" => 48,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jpeg-scan.pdf");
        write_pdf(&path, vec![stream]);

        let image = EmbeddedScanExtractor.first_page(&path).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (64, 48));
        assert!(image.get_pixel(4, 24).0[0] < 64);
        assert!(image.get_pixel(60, 24).0[0] > 192);
    }

    #[test]
    fn page_rotation_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotated.pdf");
        write_rotated_pdf(&path, vec![gray_stream(&marked_strip())], Some(90), None);

        let image = EmbeddedScanExtractor.first_page(&path).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (10, 40));
        // Clockwise: the top-left corner ends up top-right.
        assert_eq!(image.get_pixel(9, 0).0[0], 0);
        assert_eq!(image.get_pixel(0, 0).0[0], 200);
    }

    #[test]
    fn rotation_is_inherited_from_page_tree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inherited.pdf");
        write_rotated_pdf(&path, vec![gray_stream(&marked_strip())], None, Some(-90));

        let image = EmbeddedScanExtractor.first_page(&path).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (10, 40));
        // 270° clockwise: the top-left corner ends up bottom-left.
        assert_eq!(image.get_pixel(0, 39).0[0], 0);
    }

    #[test]
    fn page_rotation_overrides_inherited_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.pdf");
        write_rotated_pdf(&path, vec![gray_stream(&marked_strip())], Some(180), Some(90));

        let image = EmbeddedScanExtractor.first_page(&path).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (40, 10));
        assert_eq!(image.get_pixel(39, 9).0[0], 0);
    }

    #[test]
    fn oversized_dimensions_are_pdf_error() {
        let dir = tempfile::tempdir().unwrap();

        // Does not fit in u32.
        let path = dir.path().join("huge.pdf");
        write_pdf(&path, vec![image_stream(1 << 32, 1 << 32, "DeviceGray", 8)]);
        let err = EmbeddedScanExtractor.first_page(&path).unwrap_err();
        assert!(matches!(err, ScanwerkError::PdfError(_)), "got {err:?}");

        // Fits in u32, but the RGB byte count does not fit in usize.
        let path = dir.path().join("wide.pdf");
        let side = i64::from(u32::MAX);
        write_pdf(&path, vec![image_stream(side, side, "DeviceRGB", 8)]);
        let err = EmbeddedScanExtractor.first_page(&path).unwrap_err();
        assert!(matches!(err, ScanwerkError::PdfError(_)), "got {err:?}");
    }

    #[test]
    fn page_without_images_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        write_pdf(&path, Vec::new());

        let err = EmbeddedScanExtractor.first_page(&path).unwrap_err();
        assert!(matches!(err, ScanwerkError::PdfError(_)), "got {err:?}");
    }

    #[test]
    fn garbage_file_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.5 not really").unwrap();

        let err = EmbeddedScanExtractor.first_page(&path).unwrap_err();
        assert!(matches!(err, ScanwerkError::PdfError(_)), "got {err:?}");
    }

    #[test]
    fn short_stream_is_rejected() {
        let mut stream = uniform(10, 10, 0);
        stream.set_content(vec![0; 20]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.pdf");
        write_pdf(&path, vec![stream]);

        assert!(EmbeddedScanExtractor.first_page(&path).is_err());
    }

    #[test]
    fn missing_pdftoppm_is_pdf_error() {
        let dir = tempfile::tempdir().unwrap();
        let empty_bin = dir.path().join("bin");
        std::fs::create_dir(&empty_bin).unwrap();
        let path = dir.path().join("scan.pdf");
        write_pdf(&path, vec![uniform(8, 8, 255)]);

        let rasterizer =
            PopplerRasterizer::default().with_search_path(empty_bin.display().to_string());
        match rasterizer.first_page(&path) {
            Err(ScanwerkError::PdfError(message)) => {
                assert!(message.contains("pdftoppm is not installed"), "{message}")
            }
            other => panic!("expected PdfError, got {other:?}"),
        }
    }

    #[test]
    fn default_chain_reports_both_failures() {
        let dir = tempfile::tempdir().unwrap();
        let empty_bin = dir.path().join("bin");
        std::fs::create_dir(&empty_bin).unwrap();
        // 1-bit scans are left to Poppler, which is not installed here.
        let path = dir.path().join("bilevel.pdf");
        write_pdf(&path, vec![image_stream(16, 16, "DeviceGray", 1)]);

        let search_path = empty_bin.display().to_string();
        let rasterizer = DefaultRasterizer::configured(None, Some(search_path.as_str()));
        match rasterizer.first_page(&path) {
            Err(ScanwerkError::PdfError(message)) => {
                assert!(message.contains("embedded-scan: "), "{message}");
                assert!(message.contains("8-bit"), "{message}");
                assert!(message.contains("pdftoppm: "), "{message}");
                assert!(message.contains("not installed"), "{message}");
            }
            other => panic!("expected PdfError, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn default_chain_falls_back_to_pdftoppm() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        let scratch = dir.path().join("scratch");
        std::fs::create_dir(&bin).unwrap();
        std::fs::create_dir(&scratch).unwrap();

        let rendered = dir.path().join("rendered.png");
        GrayImage::from_pixel(21, 29, Luma([255])).save(&rendered).unwrap();
        let args_log = dir.path().join("args");

        // Stand-in pdftoppm: log the arguments, "render" to <last arg>.png.
        let stub = bin.join("pdftoppm");
        std::fs::write(
            &stub,
            format!(
                "#!/bin/sh\necho \"$@\" > '{}'\nfor last; do :; done\ncp '{}' \"$last.png\"\n",
                args_log.display(),
                rendered.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).unwrap();

        let path = dir.path().join("bilevel.pdf");
        write_pdf(&path, vec![image_stream(16, 16, "DeviceGray", 1)]);

        let search_path = bin.display().to_string();
        let rasterizer =
            DefaultRasterizer::configured(Some(scratch.as_path()), Some(search_path.as_str()));
        let image = rasterizer.first_page(&path).unwrap();

        assert_eq!((image.width(), image.height()), (21, 29));
        let args = std::fs::read_to_string(&args_log).unwrap();
        assert!(args.starts_with("-png -r 300 -f 1 -l 1 -singlefile "), "{args}");
        // The scratch render directory is gone again.
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }
}

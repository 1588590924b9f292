use super::PdfDocument;
use crate::error::{Error, Result};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use tracing::{debug, trace, warn};

/// Sample layout of an embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorMode {
    pub fn components(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::Rgb => 3,
            ColorMode::Cmyk => 4,
        }
    }

    fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"DeviceGray" | b"G" | b"CalGray" => Some(ColorMode::Gray),
            b"DeviceRGB" | b"RGB" | b"CalRGB" => Some(ColorMode::Rgb),
            b"DeviceCMYK" | b"CMYK" => Some(ColorMode::Cmyk),
            _ => None,
        }
    }

    fn from_component_count(n: i64) -> Option<Self> {
        match n {
            1 => Some(ColorMode::Gray),
            3 => Some(ColorMode::Rgb),
            4 => Some(ColorMode::Cmyk),
            _ => None,
        }
    }
}

/// 8-bit CMYK samples, which `image` has no pixel type for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmykImage {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

impl CmykImage {
    /// `None` when the sample count does not match the dimensions.
    pub fn to_rgb(&self) -> Option<RgbImage> {
        let expected = (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(4)?;
        if self.samples.len() != expected {
            return None;
        }

        let mut rgb = Vec::with_capacity(expected / 4 * 3);
        for px in self.samples.chunks_exact(4) {
            let k = px[3] as u16;
            for &c in &px[..3] {
                rgb.push(255 - (c as u16 + k).min(255) as u8);
            }
        }
        RgbImage::from_raw(self.width, self.height, rgb)
    }
}

/// An embedded image after decoding, before color normalization.
#[derive(Debug, Clone)]
pub enum DecodedImage {
    Raster(DynamicImage),
    Cmyk(CmykImage),
}

impl DecodedImage {
    pub fn color_mode(&self) -> ColorMode {
        match self {
            DecodedImage::Cmyk(_) => ColorMode::Cmyk,
            DecodedImage::Raster(img) if img.color().has_color() => ColorMode::Rgb,
            DecodedImage::Raster(_) => ColorMode::Gray,
        }
    }

    /// CMYK becomes RGB; everything else passes through unchanged.
    pub fn normalize(self) -> Result<DynamicImage> {
        match self {
            DecodedImage::Raster(img) => Ok(img),
            DecodedImage::Cmyk(cmyk) => cmyk.to_rgb().map(DynamicImage::ImageRgb8).ok_or_else(|| {
                Error::Codec(format!(
                    "{} CMYK samples do not fill a {}x{} image",
                    cmyk.samples.len(),
                    cmyk.width,
                    cmyk.height
                ))
            }),
        }
    }
}

/// Image XObjects on a page, in resource dictionary order.
///
/// Images drawn through Form XObjects are listed where the form appears.
pub fn page_images(doc: &PdfDocument, page_id: ObjectId) -> Vec<(ObjectId, &Stream)> {
    let mut images = Vec::new();
    if let Some(xobjects) = doc
        .page_resources(page_id)
        .and_then(|resources| xobject_dict(&doc.doc, resources))
    {
        let mut visited = HashSet::new();
        collect_images(&doc.doc, xobjects, &mut visited, &mut images);
    }
    images
}

fn xobject_dict<'a>(doc: &'a Document, resources: &'a Dictionary) -> Option<&'a Dictionary> {
    let xobjects = resources.get(b"XObject").ok()?;
    doc.dereference(xobjects).ok()?.1.as_dict().ok()
}

fn collect_images<'a>(
    doc: &'a Document,
    xobjects: &'a Dictionary,
    visited: &mut HashSet<ObjectId>,
    images: &mut Vec<(ObjectId, &'a Stream)>,
) {
    for (_, obj_ref) in xobjects.iter() {
        let Ok(id) = obj_ref.as_reference() else {
            continue;
        };
        let Ok(stream) = doc.get_object(id).and_then(Object::as_stream) else {
            continue;
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => images.push((id, stream)),
            Ok(b"Form") if visited.insert(id) => {
                let nested = stream
                    .dict
                    .get(b"Resources")
                    .and_then(|resources| doc.dereference(resources))
                    .ok()
                    .and_then(|(_, resources)| resources.as_dict().ok())
                    .and_then(|resources| xobject_dict(doc, resources));
                if let Some(nested) = nested {
                    trace!(form = ?id, "descending into form XObject");
                    collect_images(doc, nested, visited, images);
                }
            }
            _ => {}
        }
    }
}

/// Extract the `image_index`-th (1-based) image of a page.
///
/// Out-of-range pages and indices are reported on `diag` and give
/// `Ok(None)`. CMYK images are converted to RGB before inversion.
pub fn extract_image<W: Write + ?Sized>(
    doc: &PdfDocument,
    page: u32,
    image_index: u32,
    invert: bool,
    diag: &mut W,
) -> Result<Option<DynamicImage>> {
    let Some(page_id) = doc.page_id(page) else {
        warn!(page, total_pages = doc.page_count(), "requested page is out of range");
        writeln!(diag, "Page {} not found in the PDF.", page)?;
        return Ok(None);
    };

    let images = page_images(doc, page_id);
    let Some((id, stream)) = (image_index as usize)
        .checked_sub(1)
        .and_then(|idx| images.get(idx))
    else {
        warn!(page, image_index, available = images.len(), "requested image is out of range");
        writeln!(diag, "Image {} not found on page {}.", image_index, page)?;
        return Ok(None);
    };

    debug!(page, image_index, object = ?id, "decoding embedded image");
    let decoded = decode_image(&doc.doc, stream)?;
    if decoded.color_mode() == ColorMode::Cmyk {
        trace!("converting CMYK image to RGB");
    }

    let mut image = decoded.normalize()?;
    if invert {
        image.invert();
    }
    Ok(Some(image))
}

/// Serialize a bitmap as PNG
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

fn filter_names(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

fn dimension(stream: &Stream, key: &[u8]) -> Result<u32> {
    let value = stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .map_err(|_| Error::Codec(format!("missing /{}", String::from_utf8_lossy(key))))?;
    u32::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| Error::Codec(format!("invalid /{} {}", String::from_utf8_lossy(key), value)))
}

fn is_image_mask(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"ImageMask").and_then(Object::as_bool), Ok(true))
}

/// Color space of an image XObject as far as decoding is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ImageColorSpace {
    Device(ColorMode),
    /// Palette of `hival + 1` entries in the base color mode
    Indexed {
        base: ColorMode,
        hival: u8,
        lookup: Vec<u8>,
    },
}

/// Gray, RGB or CMYK spaces, by name or as `ICCBased`/`Cal*` arrays
fn device_color_mode(doc: &Document, cs: &Object) -> Option<ColorMode> {
    match doc.dereference(cs).ok()?.1 {
        Object::Name(name) => ColorMode::from_name(name),
        Object::Array(arr) => match arr.first()?.as_name().ok()? {
            b"ICCBased" => {
                let (_, profile) = doc.dereference(arr.get(1)?).ok()?;
                let n = profile.as_stream().ok()?.dict.get(b"N").and_then(Object::as_i64);
                ColorMode::from_component_count(n.ok()?)
            }
            name => ColorMode::from_name(name),
        },
        _ => None,
    }
}

fn indexed_color_space(doc: &Document, arr: &[Object]) -> Result<ImageColorSpace> {
    let invalid = |what: &str| Error::Codec(format!("invalid indexed color space: {}", what));

    let base = arr
        .get(1)
        .and_then(|base| device_color_mode(doc, base))
        .ok_or_else(|| invalid("unsupported base"))?;
    let hival = arr
        .get(2)
        .and_then(|hival| hival.as_i64().ok())
        .and_then(|hival| u8::try_from(hival).ok())
        .ok_or_else(|| invalid("hival"))?;

    let (_, lookup) = arr
        .get(3)
        .and_then(|lookup| doc.dereference(lookup).ok())
        .ok_or_else(|| invalid("missing lookup"))?;
    let lookup = match lookup {
        Object::String(bytes, _) => bytes.clone(),
        Object::Stream(stream) if filter_names(stream).is_empty() => stream.content.clone(),
        Object::Stream(stream) => stream
            .decompressed_content()
            .map_err(|e| Error::Codec(format!("failed to decompress palette: {}", e)))?,
        _ => return Err(invalid("lookup")),
    };

    Ok(ImageColorSpace::Indexed {
        base,
        hival,
        lookup,
    })
}

fn image_color_space(doc: &Document, stream: &Stream) -> Result<ImageColorSpace> {
    // Stencil masks carry no color space
    if is_image_mask(stream) {
        return Ok(ImageColorSpace::Device(ColorMode::Gray));
    }

    let cs = stream
        .dict
        .get(b"ColorSpace")
        .and_then(|cs| doc.dereference(cs))
        .map(|(_, cs)| cs)
        .map_err(|_| Error::Codec("image has no /ColorSpace".to_string()))?;

    if let Object::Array(arr) = cs {
        if let Some(b"Indexed" | b"I") = arr.first().and_then(|o| o.as_name().ok()) {
            return indexed_color_space(doc, arr);
        }
    }

    device_color_mode(doc, cs)
        .map(ImageColorSpace::Device)
        .ok_or_else(|| Error::Codec(format!("unsupported color space {:?}", cs)))
}

fn too_large() -> Error {
    Error::Codec("image dimensions too large".to_string())
}

/// Split packed rows into one byte per sample.
///
/// Rows are padded to a byte boundary; 16-bit samples keep their high byte.
fn unpack_samples(
    data: &[u8],
    width: u32,
    height: u32,
    components: usize,
    bits: usize,
) -> Result<Vec<u8>> {
    let samples_per_row = (width as usize).checked_mul(components).ok_or_else(too_large)?;
    let row_bytes = samples_per_row
        .checked_mul(bits)
        .ok_or_else(too_large)?
        .div_ceil(8);
    let expected = row_bytes
        .checked_mul(height as usize)
        .ok_or_else(too_large)?;
    if data.len() < expected {
        return Err(Error::Codec(format!(
            "image data truncated: {} bytes, expected {}",
            data.len(),
            expected
        )));
    }

    // Bounded by the data already in memory
    let mut out = Vec::with_capacity(samples_per_row * height as usize);
    for row in data.chunks_exact(row_bytes).take(height as usize) {
        match bits {
            8 => out.extend_from_slice(&row[..samples_per_row]),
            16 => out.extend(row.chunks_exact(2).take(samples_per_row).map(|s| s[0])),
            _ => {
                let per_byte = 8 / bits;
                let mask = (1u8 << bits) - 1;
                for i in 0..samples_per_row {
                    let shift = 8 - bits * (i % per_byte + 1);
                    out.push((row[i / per_byte] >> shift) & mask);
                }
            }
        }
    }
    Ok(out)
}

fn build_image(width: u32, height: u32, mode: ColorMode, samples: Vec<u8>) -> Result<DecodedImage> {
    let decoded = match mode {
        ColorMode::Gray => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        ColorMode::Rgb => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        ColorMode::Cmyk => {
            return Ok(DecodedImage::Cmyk(CmykImage {
                width,
                height,
                samples,
            }))
        }
    };

    decoded
        .map(DecodedImage::Raster)
        .ok_or_else(|| Error::Codec("sample buffer does not match image size".to_string()))
}

/// Run every filter but the last, leaving data for an image codec
fn decode_leading_filters(stream: &Stream, filters: &[Vec<u8>]) -> Result<Vec<u8>> {
    let leading = filters.len() - 1;
    if leading == 0 {
        return Ok(stream.content.clone());
    }

    let mut dict = stream.dict.clone();
    let parms = match dict.get(b"DecodeParms") {
        Ok(Object::Array(parms)) => Some(parms.iter().take(leading).cloned().collect::<Vec<_>>()),
        _ => None,
    };
    dict.remove(b"DecodeParms");
    if let Some(parms) = parms {
        dict.set("DecodeParms", parms);
    }
    dict.set(
        "Filter",
        filters[..leading]
            .iter()
            .map(|name| Object::Name(name.clone()))
            .collect::<Vec<_>>(),
    );

    Stream::new(dict, stream.content.clone())
        .decompressed_content()
        .map_err(|e| Error::Codec(format!("failed to decompress image stream: {}", e)))
}

/// Decode an image XObject into a bitmap.
pub fn decode_image(doc: &Document, stream: &Stream) -> Result<DecodedImage> {
    let filters = filter_names(stream);
    match filters.last().map(Vec::as_slice) {
        Some(b"DCTDecode") => {
            let jpeg = decode_leading_filters(stream, &filters)?;
            let img = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)?;
            return Ok(DecodedImage::Raster(img));
        }
        Some(filter @ (b"JPXDecode" | b"CCITTFaxDecode" | b"JBIG2Decode")) => {
            return Err(Error::Codec(format!(
                "unsupported image filter {}",
                String::from_utf8_lossy(filter)
            )));
        }
        _ => {}
    }

    let width = dimension(stream, b"Width")?;
    let height = dimension(stream, b"Height")?;
    let color_space = image_color_space(doc, stream)?;
    let bits = stream
        .dict
        .get(b"BitsPerComponent")
        .and_then(Object::as_i64)
        .unwrap_or(if is_image_mask(stream) { 1 } else { 8 });

    let bits = match (bits, &color_space) {
        (1 | 2 | 4 | 8, _) | (16, ImageColorSpace::Device(_)) => bits as usize,
        _ => {
            return Err(Error::Codec(format!(
                "unsupported {} bits per component for {:?}",
                bits, color_space
            )))
        }
    };

    let data = if filters.is_empty() {
        stream.content.clone()
    } else {
        stream
            .decompressed_content()
            .map_err(|e| Error::Codec(format!("failed to decompress image stream: {}", e)))?
    };

    trace!(width, height, ?color_space, bits, len = data.len(), "raw image samples");

    match color_space {
        ImageColorSpace::Device(mode) => {
            let mut samples = unpack_samples(&data, width, height, mode.components(), bits)?;
            if bits < 8 {
                let max = (1u16 << bits) - 1;
                for v in &mut samples {
                    *v = (*v as u16 * 255 / max) as u8;
                }
            }
            build_image(width, height, mode, samples)
        }
        ImageColorSpace::Indexed {
            base,
            hival,
            lookup,
        } => {
            let indices = unpack_samples(&data, width, height, 1, bits)?;
            let n = base.components();
            let mut samples = Vec::with_capacity(indices.len() * n);
            for &idx in &indices {
                // Out-of-range indices clamp to the last entry; short palettes read as 0
                let offset = idx.min(hival) as usize * n;
                samples.extend((offset..offset + n).map(|i| lookup.get(i).copied().unwrap_or(0)));
            }
            build_image(width, height, base, samples)
        }
    }
}

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{ArrayD, ArrayView2, IxDyn};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, TiffEncoder};

use super::{PixelType, RawVolume};
use crate::error::{Result, SliceError};

/// Read a TIFF stack. Pages become Z and multi-sample pages add a trailing
/// channel axis. A single grayscale page yields a 2D array; a single
/// multi-sample page keeps its Z axis of 1 so it cannot pass as (Z, Y, X).
pub(crate) fn read_tiff(path: &Path) -> Result<RawVolume> {
    let file = BufReader::new(File::open(path)?);
    let mut decoder = Decoder::new(file)?.with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions()?;
    let plane = width as usize * height as usize;

    let mut values = Vec::new();
    let mut pixel_type = None;
    let mut channels = 0;
    let mut depth = 0;

    loop {
        let (page_type, page) = decode_page(&mut decoder, path)?;
        match pixel_type {
            None => pixel_type = Some(page_type),
            Some(first) if first != page_type => {
                return Err(SliceError::UnsupportedSampleType {
                    path: path.to_path_buf(),
                    found: "mixed sample types across pages".into(),
                });
            }
            Some(_) => {}
        }
        if plane == 0 || page.len() % plane != 0 {
            return Err(SliceError::UnsupportedSampleType {
                path: path.to_path_buf(),
                found: format!("{} samples for a {width}x{height} page", page.len()),
            });
        }
        let page_channels = page.len() / plane;
        if depth > 0 && page_channels != channels {
            return Err(SliceError::RaggedStack {
                path: path.to_path_buf(),
            });
        }
        channels = page_channels;
        values.extend(page);
        depth += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
        if decoder.dimensions()? != (width, height) {
            return Err(SliceError::RaggedStack {
                path: path.to_path_buf(),
            });
        }
    }

    let (height, width) = (height as usize, width as usize);
    let shape = match (depth, channels) {
        (1, 1) => vec![height, width],
        (d, 1) => vec![d, height, width],
        (d, c) => vec![d, height, width, c],
    };
    let data = ArrayD::from_shape_vec(IxDyn(&shape), values)?;
    Ok(RawVolume {
        data,
        pixel_type: pixel_type.unwrap_or(PixelType::F32),
    })
}

fn decode_page(
    decoder: &mut Decoder<BufReader<File>>,
    path: &Path,
) -> Result<(PixelType, Vec<f32>)> {
    let colortype = decoder.colortype()?;
    let page = match decoder.read_image()? {
        DecodingResult::U8(buffer) => (
            PixelType::U8,
            buffer.into_iter().map(f32::from).collect(),
        ),
        DecodingResult::U16(buffer) => (
            PixelType::U16,
            buffer.into_iter().map(f32::from).collect(),
        ),
        DecodingResult::F32(buffer) => (PixelType::F32, buffer),
        _ => {
            return Err(SliceError::UnsupportedSampleType {
                path: path.to_path_buf(),
                found: format!("{colortype:?}"),
            });
        }
    };
    Ok(page)
}

fn create_encoder(path: &Path) -> Result<TiffEncoder<BufWriter<File>>> {
    let file = BufWriter::new(File::create(path)?);
    Ok(TiffEncoder::new(file)?)
}

pub(crate) fn write_tiff_image(
    path: &Path,
    slice: ArrayView2<'_, f32>,
    pixel_type: PixelType,
) -> Result<()> {
    let (height, width) = slice.dim();
    let (width, height) = (width as u32, height as u32);
    let mut encoder = create_encoder(path)?;
    match pixel_type {
        PixelType::U8 => {
            let page: Vec<u8> = slice.iter().map(|&v| v as u8).collect();
            encoder.write_image::<colortype::Gray8>(width, height, &page)?;
        }
        PixelType::U16 => {
            let page: Vec<u16> = slice.iter().map(|&v| v as u16).collect();
            encoder.write_image::<colortype::Gray16>(width, height, &page)?;
        }
        PixelType::F32 => {
            let page: Vec<f32> = slice.iter().copied().collect();
            encoder.write_image::<colortype::Gray32Float>(width, height, &page)?;
        }
    }
    Ok(())
}

pub(crate) fn write_tiff_labels(path: &Path, slice: ArrayView2<'_, u16>) -> Result<()> {
    let (height, width) = slice.dim();
    let page: Vec<u16> = slice.iter().copied().collect();
    let mut encoder = create_encoder(path)?;
    encoder.write_image::<colortype::Gray16>(width as u32, height as u32, &page)?;
    Ok(())
}

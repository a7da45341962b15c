//! PNG encoding of rendered frames.

use crate::raster::RgbaFrame;
use crate::renderer::RenderResult;
use raidboard_core::export::ExportRequest;
use std::path::{Path, PathBuf};

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(frame: &RgbaFrame) -> RenderResult<Vec<u8>> {
    frame.validate()?;

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, frame.width, frame.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&frame.rgba)?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Encode `frame` and write it into `dir` under the request's file name.
pub fn write_png(dir: impl AsRef<Path>, request: &ExportRequest, frame: &RgbaFrame) -> RenderResult<PathBuf> {
    let data = encode_png(frame)?;
    let path = dir.as_ref().join(&request.file_name);
    std::fs::write(&path, &data)?;
    log::info!("PNG export complete: {} ({} bytes)", path.display(), data.len());
    Ok(path)
}

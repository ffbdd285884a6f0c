/*
MIT License

Copyright (c) 2025 Vincent Hiribarren

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! CPU-side texture staging and GPU upload. A missing or undecodable image
//! never aborts the viewer: callers fall back to a generated placeholder and
//! keep rendering.

use std::path::Path;

use anyhow::Context;
use log::warn;

use crate::draw_context::{AsBindingResource, DrawContext};

/// RGBA8 pixel data ready for upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn new_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height * 4) as usize,
            "Pixel data size does not match RGBA8 dimensions"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::new_rgba8(width, height, rgba.into_raw()))
    }

    /// Grey checkerboard placeholder for missing 2D textures.
    pub fn checkerboard(size: u32) -> Self {
        let mut pixels = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                if ((x / 8) + (y / 8)) % 2 == 0 {
                    pixels.extend_from_slice(&[255, 255, 255, 255]);
                } else {
                    pixels.extend_from_slice(&[128, 128, 128, 255]);
                }
            }
        }
        Self::new_rgba8(size, size, pixels)
    }

    /// Single-color placeholder, used for missing skybox faces.
    pub fn solid(size: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat((size * size) as usize);
        Self::new_rgba8(size, size, pixels)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.pixels.len() == (self.width * self.height * 4) as usize
    }
}

/// An uploaded texture plus the view metadata needed to bind it.
pub struct GpuTexture {
    view: wgpu::TextureView,
    dimension: wgpu::TextureViewDimension,
}

impl GpuTexture {
    pub fn new_2d(context: &DrawContext, data: &TextureData) -> Self {
        let texture = Self::create_and_upload(context, &[data], 1);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            view,
            dimension: wgpu::TextureViewDimension::D2,
        }
    }

    /// Faces ordered +X, -X, +Y, -Y, +Z, -Z (right, left, top, bottom,
    /// front, back). All faces must share the dimensions of the first one.
    pub fn new_cubemap(context: &DrawContext, faces: &[TextureData; 6]) -> Self {
        let face_refs: Vec<&TextureData> = faces.iter().collect();
        let texture = Self::create_and_upload(context, &face_refs, 6);
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self {
            view,
            dimension: wgpu::TextureViewDimension::Cube,
        }
    }

    /// Loads a 2D texture, falling back to a checkerboard on any failure.
    pub fn open_2d(context: &DrawContext, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let data = match TextureData::load(path) {
            Ok(data) => data,
            Err(err) => {
                warn!("Texture failed to load at path {}: {err:#}", path.display());
                TextureData::checkerboard(64)
            }
        };
        Self::new_2d(context, &data)
    }

    /// Loads the six `<dir>/{right,left,top,bottom,front,back}.jpg` faces,
    /// falling back to a flat night-sky color if any face is unusable.
    pub fn open_cubemap(context: &DrawContext, dir: impl AsRef<Path>) -> Self {
        const FACE_NAMES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];
        const NIGHT_SKY: [u8; 4] = [13, 17, 33, 255];
        let dir = dir.as_ref();
        let mut faces = Vec::with_capacity(6);
        for name in FACE_NAMES {
            let path = dir.join(format!("{name}.jpg"));
            match TextureData::load(&path) {
                Ok(data) => faces.push(data),
                Err(err) => {
                    warn!("Cubemap face failed to load at path {}: {err:#}", path.display());
                    faces.push(TextureData::solid(64, NIGHT_SKY));
                }
            }
        }
        let same_size = faces
            .iter()
            .all(|f| f.width == faces[0].width && f.height == faces[0].height);
        if !same_size {
            warn!("Cubemap faces in {} have mismatched sizes, using fallback sky", dir.display());
            faces = (0..6).map(|_| TextureData::solid(64, NIGHT_SKY)).collect();
        }
        let faces: [TextureData; 6] = faces
            .try_into()
            .expect("Exactly six faces were collected");
        Self::new_cubemap(context, &faces)
    }

    fn create_and_upload(
        context: &DrawContext,
        layers: &[&TextureData],
        layer_count: u32,
    ) -> wgpu::Texture {
        let width = layers[0].width;
        let height = layers[0].height;
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Image Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layer_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, data) in layers.iter().enumerate() {
            context.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: u32::try_from(layer).expect("Layer count should fit in u32"),
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                &data.pixels,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }
        texture
    }
}

impl AsBindingResource for GpuTexture {
    fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::TextureView(&self.view)
    }
    fn binding_type(&self) -> wgpu::BindingType {
        wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: self.dimension,
            multisampled: false,
        }
    }
}

pub struct TextureSampler {
    sampler: wgpu::Sampler,
}

impl TextureSampler {
    /// Repeat-wrapped linear sampler, for tiling surfaces.
    pub fn repeating(context: &DrawContext) -> Self {
        Self::new(context, wgpu::AddressMode::Repeat)
    }

    /// Clamp-to-edge linear sampler, for cubemaps and billboards.
    pub fn clamping(context: &DrawContext) -> Self {
        Self::new(context, wgpu::AddressMode::ClampToEdge)
    }

    fn new(context: &DrawContext, address_mode: wgpu::AddressMode) -> Self {
        let sampler = context.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Texture Sampler"),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self { sampler }
    }
}

impl AsBindingResource for TextureSampler {
    fn binding_resource(&self) -> wgpu::BindingResource {
        wgpu::BindingResource::Sampler(&self.sampler)
    }
    fn binding_type(&self) -> wgpu::BindingType {
        wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_is_valid_rgba8() {
        let data = TextureData::checkerboard(32);
        assert!(data.is_valid());
        assert_eq!(data.pixels.len(), 32 * 32 * 4);
    }

    #[test]
    fn solid_repeats_the_color() {
        let data = TextureData::solid(4, [1, 2, 3, 4]);
        assert!(data.is_valid());
        assert_eq!(&data.pixels[0..4], &[1, 2, 3, 4]);
        assert_eq!(&data.pixels[60..64], &[1, 2, 3, 4]);
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(TextureData::load("definitely/not/a/file.png").is_err());
    }
}

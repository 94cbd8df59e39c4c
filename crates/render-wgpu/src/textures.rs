use gallery_assets::TextureHost;
use gallery_common::ImageHandle;
use gallery_render::TextureSampling;
use image::RgbaImage;
use std::collections::BTreeMap;

struct BoundTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

/// GPU textures for the artworks, keyed by image handle.
pub struct ArtworkTextures {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    sampling: TextureSampling,
    bound: BTreeMap<ImageHandle, BoundTexture>,
}

impl ArtworkTextures {
    pub fn new(device: &wgpu::Device, sampling: TextureSampling) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("canvas_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        // Anisotropic filtering requires linear filtering on every axis.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("canvas_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: sampling.anisotropy.clamp(1, 16),
            ..Default::default()
        });

        Self {
            layout,
            sampler,
            sampling,
            bound: BTreeMap::new(),
        }
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self, handle: ImageHandle) -> Option<&wgpu::BindGroup> {
        self.bound.get(&handle).map(|b| &b.bind_group)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: ImageHandle,
        pixels: &RgbaImage,
    ) {
        if pixels.width() == 0 || pixels.height() == 0 {
            tracing::warn!(handle = %handle.short(), "skipping empty image");
            return;
        }
        // The descriptor keeps the original aspect, so layout is unaffected.
        let max_dimension = device.limits().max_texture_dimension_2d;
        let fitted = self.sampling.fit_to_limit(pixels, max_dimension);
        let (width, height) = fitted.dimensions();
        let chain = self.sampling.mip_chain(&fitted);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("canvas_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: chain.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, image) in chain.iter().enumerate() {
            let (w, h) = image.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&Default::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("canvas_bind_group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        tracing::debug!(handle = %handle.short(), width, height, mips = chain.len(), "texture bound");
        if let Some(old) = self.bound.insert(handle, BoundTexture { texture, bind_group }) {
            old.texture.destroy();
        }
    }

    fn release(&mut self, handle: ImageHandle) {
        if let Some(bound) = self.bound.remove(&handle) {
            bound.texture.destroy();
            tracing::debug!(handle = %handle.short(), "texture released");
        }
    }
}

/// Short-lived `TextureHost` that pairs the texture cache with the device
/// and queue for one gallery mutation.
pub struct TextureUploader<'a> {
    pub(crate) device: &'a wgpu::Device,
    pub(crate) queue: &'a wgpu::Queue,
    pub(crate) textures: &'a mut ArtworkTextures,
}

impl TextureHost for TextureUploader<'_> {
    fn upload(&mut self, handle: ImageHandle, pixels: &RgbaImage) {
        self.textures.upload(self.device, self.queue, handle, pixels);
    }

    fn release(&mut self, handle: ImageHandle) {
        self.textures.release(handle);
    }
}

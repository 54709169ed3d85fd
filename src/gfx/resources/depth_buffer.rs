//! Depth attachment for the scene pass, kept at the surface size

pub struct DepthBuffer {
    view: wgpu::TextureView,
    size: wgpu::Extent3d,
}

impl DepthBuffer {
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let size = extent(width, height);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
            size,
        }
    }

    /// Recreates the texture when the size changed
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if extent(width, height) != self.size {
            *self = Self::new(device, width, height);
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: width.max(1),
        height: height.max(1),
        depth_or_array_layers: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sized_surface_still_gets_a_texel() {
        let size = extent(0, 720);
        assert_eq!((size.width, size.height, size.depth_or_array_layers), (1, 720, 1));
    }
}

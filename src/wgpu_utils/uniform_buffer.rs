use std::marker::PhantomData;

use wgpu::util::DeviceExt;

/// Uniform buffer holding one `Content` value.
///
/// Keeps a copy of the last bytes sent so a frame with an unchanged camera
/// and light costs no queue write.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    last_written: Vec<u8>,
    content: PhantomData<Content>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn new(device: &wgpu::Device, label: &str, initial: &Content) -> Self {
        let bytes = bytemuck::bytes_of(initial);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytes,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            last_written: bytes.to_vec(),
            content: PhantomData,
        }
    }

    /// Returns false when `content` matches what the buffer already holds
    pub fn write(&mut self, queue: &wgpu::Queue, content: &Content) -> bool {
        let bytes = bytemuck::bytes_of(content);
        if self.last_written == bytes {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.last_written.clear();
        self.last_written.extend_from_slice(bytes);
        true
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

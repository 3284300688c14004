/// Collects layout entries and resources side by side, so a bind group and its layout
/// can't drift apart.
pub struct BindGroupBuilder<'a> {
    label: &'a str,
    visibility: wgpu::ShaderStages,
    layout_entries: Vec<wgpu::BindGroupLayoutEntry>,
    entries: Vec<wgpu::BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(label: &'a str, visibility: wgpu::ShaderStages) -> Self {
        Self {
            label,
            visibility,
            layout_entries: Vec::new(),
            entries: Vec::new(),
        }
    }

    fn push(
        mut self,
        binding: u32,
        ty: wgpu::BindingType,
        resource: wgpu::BindingResource<'a>,
    ) -> Self {
        self.layout_entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility: self.visibility,
            ty,
            count: None,
        });
        self.entries.push(wgpu::BindGroupEntry { binding, resource });
        self
    }

    pub fn uniform(self, binding: u32, label: &str, resource: wgpu::BindingResource<'a>) -> Self {
        log::trace!("{}: uniform {} at binding {}", self.label, label, binding);
        self.push(
            binding,
            wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            resource,
        )
    }

    pub fn texture(self, binding: u32, view: &'a wgpu::TextureView) -> Self {
        self.push(
            binding,
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            wgpu::BindingResource::TextureView(view),
        )
    }

    pub fn sampler(self, binding: u32, sampler: &'a wgpu::Sampler) -> Self {
        self.push(
            binding,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            wgpu::BindingResource::Sampler(sampler),
        )
    }

    pub fn layout(&self, device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} bind group layout", self.label)),
            entries: &self.layout_entries,
        })
    }

    /// Builds a bind group against an existing layout, for resources that share one
    /// layout (such as one bind group per material).
    pub fn build_with_layout(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} bind group", self.label)),
            layout,
            entries: &self.entries,
        })
    }

    pub fn build(self, device: &wgpu::Device) -> (wgpu::BindGroupLayout, wgpu::BindGroup) {
        let layout = self.layout(device);
        let group = self.build_with_layout(device, &layout);
        (layout, group)
    }
}

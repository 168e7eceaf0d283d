use super::{ImageService, IoService, PresetService};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    image_service: ImageService,
    io_service: IoService,
    preset_service: PresetService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image_service(&self) -> &ImageService {
        &self.image_service
    }

    pub fn io_service(&self) -> &IoService {
        &self.io_service
    }

    pub fn preset_service(&self) -> &PresetService {
        &self.preset_service
    }
}

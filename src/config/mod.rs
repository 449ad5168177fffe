mod engine_desc;
mod reverb_settings;

pub use engine_desc::{AudioSettings, EngineDesc, MAX_FRAME_SIZE};
pub use reverb_settings::ReverbSettings;

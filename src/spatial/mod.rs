mod binaural;

pub use binaural::BinauralRenderer;

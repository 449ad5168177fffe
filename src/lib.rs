//! # PetalCue
//!
//! Renders short mono sound cues into binaural stereo with Steam Audio, and optionally adds a
//! reverb tail. Built for accessibility tools that play a cue for each on-screen object at an
//! apparent position matching where the object sits on the screen.
//!
//! ## Quick Start
//!
//! ```no_run
//! use petalcue::*;
//!
//! let mut engine = PetalCueEngine::new();
//! engine.initialize(&EngineDesc::new(44100, 256))?;
//! engine.set_reverb_settings(ReverbSettings::CUE)?;
//!
//! // Mono samples decoded by the host, normalized to [-1, 1]
//! let samples = vec![0.0f32; 500];
//!
//! // Place the cue to the right of the listener
//! let dry = engine.process(&samples, 1.0, 0.0)?;
//! assert_eq!(dry.len(), 1024);
//!
//! // Add the reverb tail
//! let wet = engine.apply_reverb(&dry)?;
//! assert!(wet.len() >= dry.len());
//!
//! engine.cleanup();
//! # Ok::<(), PetalCueError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`PetalCueEngine`]**: lifecycle, spatialization and reverb entry points
//! - **[`FrameProcessor`]**: the frame-at-a-time stage both the binaural renderer and the
//!   reverb implement
//! - **[`BinauralRenderer`](spatial::BinauralRenderer)**: Steam Audio binaural effect
//! - **[`StereoReverb`](reverb::StereoReverb)**: comb/allpass reverb with tail estimation
//! - **[`PcmBuffer`]**: owned interleaved 16-bit output, convertible to a raw buffer for the
//!   C boundary in [`ffi`]
//! - **[`DisplayLayout`](placement::DisplayLayout)**: maps screen positions to cue angles
//!
//! ## Threading
//!
//! Every call runs synchronously to completion. An engine holds reusable scratch buffers and
//! no locks, so concurrent use of one engine must be serialized by the caller.

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod math;
pub mod pcm;
pub mod placement;
pub mod processor;
pub mod reverb;
pub mod spatial;

pub use buffer::PcmBuffer;
pub use config::{AudioSettings, EngineDesc, ReverbSettings};
pub use engine::{CueRequest, PetalCueEngine, Spatializer};
pub use error::PetalCueError;
pub use processor::FrameProcessor;
pub use reverb::ReverbMode;

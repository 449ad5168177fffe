//! C boundary for hosts that load PetalCue as a shared library.
//!
//! The host creates an engine handle with [`petalcue_engine_new`], initializes it, renders
//! cues and frees the handle with [`petalcue_engine_free`]. Every function reports failure
//! through its return value; panics never cross the boundary.
//!
//! # Ownership
//!
//! Buffers returned through `output_buffer` out-parameters belong to the host. Each non-null
//! buffer must be passed to [`petalcue_free_output_sound`] exactly once and not used
//! afterwards. Out-parameters are only written when the call succeeds.
//!
//! # Threading
//!
//! An engine handle is not synchronized. The host must serialize every call made with the
//! same handle.

mod guard;

use crate::buffer::{self, PcmBuffer};
use crate::config::{EngineDesc, ReverbSettings};
use crate::engine::PetalCueEngine;
use crate::error::{PetalCueError, Result};
use guard::{guard_bool, guard_void, guard_with_default};
use std::os::raw::c_int;
use std::ptr;

/// Create an uninitialized engine.
///
/// The returned handle must be freed with [`petalcue_engine_free`].
#[unsafe(no_mangle)]
pub extern "C" fn petalcue_engine_new() -> *mut PetalCueEngine {
    guard_with_default("petalcue_engine_new", ptr::null_mut(), || {
        Box::into_raw(Box::new(PetalCueEngine::new()))
    })
}

/// Clean up and free an engine handle.
///
/// # Safety
///
/// `engine` must be null or a handle returned by [`petalcue_engine_new`] that has not been
/// freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_engine_free(engine: *mut PetalCueEngine) {
    guard_void("petalcue_engine_free", || {
        if !engine.is_null() {
            drop(unsafe { Box::from_raw(engine) });
        }
    });
}

/// Initialize the engine for `sample_rate` Hz and `frame_size` samples per frame.
///
/// Returns `true` immediately if the engine is already initialized.
///
/// # Safety
///
/// `engine` must be null or a live handle from [`petalcue_engine_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_initialize(
    engine: *mut PetalCueEngine,
    sample_rate: c_int,
    frame_size: c_int,
) -> bool {
    guard_bool("petalcue_initialize", || {
        let engine = unsafe { engine_mut(engine) }?;
        let sample_rate = u32::try_from(sample_rate).map_err(|_| {
            PetalCueError::Configuration(format!("Invalid sample rate {}", sample_rate))
        })?;
        let frame_size = usize::try_from(frame_size).map_err(|_| {
            PetalCueError::Configuration(format!("Invalid frame size {}", frame_size))
        })?;

        engine.initialize(&EngineDesc::new(sample_rate, frame_size))
    })
}

/// Release everything the engine holds. The handle itself stays valid.
///
/// # Safety
///
/// `engine` must be null or a live handle from [`petalcue_engine_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_cleanup(engine: *mut PetalCueEngine) {
    guard_void("petalcue_cleanup", || {
        if let Ok(engine) = unsafe { engine_mut(engine) } {
            engine.cleanup();
        }
    });
}

/// Set all five reverb parameters, each in `[0, 1]`.
///
/// Fails if the engine or its reverb is not initialized.
///
/// # Safety
///
/// `engine` must be null or a live handle from [`petalcue_engine_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_set_reverb_settings(
    engine: *mut PetalCueEngine,
    room_size: f32,
    damping: f32,
    wet_level: f32,
    dry_level: f32,
    width: f32,
) -> bool {
    guard_bool("petalcue_set_reverb_settings", || {
        let engine = unsafe { engine_mut(engine) }?;
        engine.set_reverb_settings(ReverbSettings::new(
            room_size, damping, wet_level, dry_level, width,
        ))
    })
}

/// Spatialize `input_length` mono float samples toward `(angle_x, angle_y)`.
///
/// On success `*output_buffer` receives interleaved stereo 16-bit PCM (null for empty
/// input) and `*output_length` its sample count.
///
/// # Safety
///
/// `engine` must be null or a live handle. `input_buffer` must point to `input_length`
/// readable floats. The out-parameters must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_process_sound(
    engine: *mut PetalCueEngine,
    input_buffer: *const f32,
    input_length: c_int,
    angle_x: f32,
    angle_y: f32,
    output_buffer: *mut *mut i16,
    output_length: *mut c_int,
) -> bool {
    guard_bool("petalcue_process_sound", || {
        let engine = unsafe { engine_mut(engine) }?;
        check_out_params(output_buffer, output_length)?;
        let input = unsafe { input_slice(input_buffer, input_length) }?;

        let rendered = engine.process(input, angle_x, angle_y)?;
        unsafe { hand_out(rendered, output_buffer, output_length) }
    })
}

/// Run `input_length` samples of interleaved stereo 16-bit PCM through the reverb.
///
/// The output includes the reverb tail. Fails if the reverb is unavailable.
///
/// # Safety
///
/// Same requirements as [`petalcue_process_sound`], with `input_buffer` pointing to
/// `input_length` readable `i16` samples.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_apply_reverb(
    engine: *mut PetalCueEngine,
    input_buffer: *const i16,
    input_length: c_int,
    output_buffer: *mut *mut i16,
    output_length: *mut c_int,
) -> bool {
    guard_bool("petalcue_apply_reverb", || {
        let engine = unsafe { engine_mut(engine) }?;
        check_out_params(output_buffer, output_length)?;
        let input = unsafe { input_slice(input_buffer, input_length) }?;

        let rendered = engine.apply_reverb(input)?;
        unsafe { hand_out(rendered, output_buffer, output_length) }
    })
}

/// Free a buffer returned by [`petalcue_process_sound`] or [`petalcue_apply_reverb`].
///
/// Null is ignored.
///
/// # Safety
///
/// `buffer` must be null or a buffer from this library that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn petalcue_free_output_sound(buffer: *mut i16) {
    guard_void("petalcue_free_output_sound", || unsafe {
        buffer::release_raw(buffer)
    });
}

unsafe fn engine_mut<'a>(engine: *mut PetalCueEngine) -> Result<&'a mut PetalCueEngine> {
    unsafe { engine.as_mut() }
        .ok_or_else(|| PetalCueError::InvalidInput("Engine handle is null".to_string()))
}

fn check_out_params(output_buffer: *mut *mut i16, output_length: *mut c_int) -> Result<()> {
    if output_buffer.is_null() || output_length.is_null() {
        return Err(PetalCueError::InvalidInput(
            "Output pointers must not be null".to_string(),
        ));
    }
    Ok(())
}

unsafe fn input_slice<'a, T>(data: *const T, len: c_int) -> Result<&'a [T]> {
    if data.is_null() {
        return Err(PetalCueError::InvalidInput(
            "Input buffer is null".to_string(),
        ));
    }
    let len = usize::try_from(len)
        .map_err(|_| PetalCueError::InvalidInput(format!("Invalid input length {}", len)))?;

    Ok(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Convert the rendered buffer into a raw allocation and write both out-parameters.
unsafe fn hand_out(
    rendered: PcmBuffer,
    output_buffer: *mut *mut i16,
    output_length: *mut c_int,
) -> Result<()> {
    let length = c_int::try_from(rendered.len()).map_err(|_| {
        PetalCueError::InvalidInput(format!(
            "Rendered {} samples, more than the boundary can describe",
            rendered.len()
        ))
    })?;

    let (data, _) = rendered.into_raw()?;
    unsafe {
        *output_buffer = data;
        *output_length = length;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_engine_is_rejected() {
        let input = [0.0f32; 16];
        let mut output: *mut i16 = ptr::null_mut();
        let mut length: c_int = -1;

        unsafe {
            assert!(!petalcue_initialize(ptr::null_mut(), 44100, 256));
            assert!(!petalcue_process_sound(
                ptr::null_mut(),
                input.as_ptr(),
                input.len() as c_int,
                0.0,
                0.0,
                &mut output,
                &mut length,
            ));
            petalcue_cleanup(ptr::null_mut());
            petalcue_engine_free(ptr::null_mut());
        }

        assert!(output.is_null());
        assert_eq!(length, -1);
    }

    #[test]
    fn test_negative_lengths_are_rejected() {
        let input = [0i16; 4];
        assert!(unsafe { input_slice(input.as_ptr(), -1) }.is_err());
        assert_eq!(unsafe { input_slice(input.as_ptr(), 4) }.unwrap().len(), 4);
        assert!(unsafe { input_slice::<i16>(ptr::null(), 4) }.is_err());
    }

    #[test]
    fn test_hand_out_writes_both_out_params() {
        let mut output: *mut i16 = ptr::null_mut();
        let mut length: c_int = 0;
        unsafe {
            hand_out(PcmBuffer::new(vec![3, -3]), &mut output, &mut length).unwrap();
            assert_eq!(length, 2);
            assert_eq!(std::slice::from_raw_parts(output, 2), &[3, -3]);
            petalcue_free_output_sound(output);
        }
    }
}

//! AVFX block iteration and field dispatch

use glam::Vec3;

use super::*;
use crate::bytes::{Reader, round_up4};
use crate::error::{FormatError, Result};

pub(super) fn decode(data: &[u8]) -> Result<Avfx> {
    let mut r = Reader::new(data);

    let magic = r.read_tag()?;
    if magic != AVFX_MAGIC {
        return Err(FormatError::InvalidMagic {
            expected: AVFX_MAGIC,
            found: magic,
        });
    }
    let outer_size = r.read_u32()? as usize;
    let end = 8 + outer_size;

    let mut fx = Avfx::default();

    while r.position() < end {
        let tag = r.read_tag()?;
        let size = r.read_u32()? as usize;
        let payload = r.take(size)?;
        r.skip(round_up4(size) - size)?;

        match tag {
            TAG_VERSION => fx.version = block_u32(payload)?,
            TAG_DELAY_FAST_PARTICLE => fx.is_delay_fast_particle = block_bool(payload)?,
            TAG_FIT_GROUND => fx.is_fit_ground = block_bool(payload)?,
            TAG_TRANSFORM_SKIP => fx.is_transform_skip = block_bool(payload)?,
            TAG_ALL_STOP_ON_HIDE => fx.is_all_stop_on_hide = block_bool(payload)?,
            TAG_CAN_BE_CLIPPED_OUT => fx.can_be_clipped_out = block_bool(payload)?,
            TAG_CLIP_BOX_ENABLED => fx.clip_box_enabled = block_bool(payload)?,
            TAG_CLIP_BOX_X => set_component(&mut fx.clip_box_position, 0, block_f32(payload)?),
            TAG_CLIP_BOX_Y => set_component(&mut fx.clip_box_position, 1, block_f32(payload)?),
            TAG_CLIP_BOX_Z => set_component(&mut fx.clip_box_position, 2, block_f32(payload)?),
            TAG_CLIP_BOX_SIZE_X => set_component(&mut fx.clip_box_size, 0, block_f32(payload)?),
            TAG_CLIP_BOX_SIZE_Y => set_component(&mut fx.clip_box_size, 1, block_f32(payload)?),
            TAG_CLIP_BOX_SIZE_Z => set_component(&mut fx.clip_box_size, 2, block_f32(payload)?),
            TAG_BIAS_Z_MAX_SCALE => fx.bias_z_max_scale = block_f32(payload)?,
            TAG_BIAS_Z_MAX_DISTANCE => fx.bias_z_max_distance = block_f32(payload)?,
            TAG_CAMERA_SPACE => fx.is_camera_space = block_bool(payload)?,
            TAG_FULL_ENV_LIGHT => fx.is_full_env_light = block_bool(payload)?,
            TAG_SOFT_PARTICLE_FADE_RANGE => fx.soft_particle_fade_range = block_f32(payload)?,
            TAG_SORT_KEY_OFFSET => fx.sort_key_offset = block_i32(payload)?,
            TAG_DRAW_LAYER => fx.draw_layer = block_u32(payload)?,
            TAG_DRAW_ORDER => fx.draw_order = block_u32(payload)?,
            TAG_LIGHT_SOURCE => fx.light_source = block_u32(payload)?,

            // Count blocks size the arrays; element blocks append. A count
            // that disagrees with the element blocks actually present is
            // surfaced to the caller as a shorter array, never corruption.
            TAG_SCHEDULER_COUNT => reserve(&mut fx.schedulers, payload)?,
            TAG_SCHEDULER => fx.schedulers.push(payload.to_vec()),
            TAG_TIMELINE_COUNT => reserve(&mut fx.timelines, payload)?,
            TAG_TIMELINE => fx.timelines.push(payload.to_vec()),
            TAG_EMITTER_COUNT => reserve(&mut fx.emitters, payload)?,
            TAG_EMITTER => fx.emitters.push(payload.to_vec()),
            TAG_PARTICLE_COUNT => reserve(&mut fx.particles, payload)?,
            TAG_PARTICLE => fx.particles.push(payload.to_vec()),
            TAG_EFFECTOR_COUNT => reserve(&mut fx.effectors, payload)?,
            TAG_EFFECTOR => fx.effectors.push(payload.to_vec()),
            TAG_BINDER_COUNT => reserve(&mut fx.binders, payload)?,
            TAG_BINDER => fx.binders.push(payload.to_vec()),
            TAG_TEXTURE_COUNT => {
                let count = block_u32(payload)?.unwrap_or(0) as usize;
                fx.textures.reserve(count.min(MAX_RESERVE));
            }
            TAG_TEXTURE => fx.textures.push(block_string(payload)),
            TAG_MODEL_COUNT => reserve(&mut fx.models, payload)?,
            TAG_MODEL => fx.models.push(payload.to_vec()),

            unknown => {
                tracing::trace!(
                    tag = %String::from_utf8_lossy(&unknown),
                    size,
                    "skipping unrecognized AVFX block"
                );
            }
        }
    }

    Ok(fx)
}

/// Cap on count-block capacity hints so a corrupt count cannot trigger a
/// huge allocation up front.
const MAX_RESERVE: usize = 4096;

fn reserve(vec: &mut Vec<Vec<u8>>, payload: &[u8]) -> Result<()> {
    let count = block_u32(payload)?.unwrap_or(0) as usize;
    vec.reserve(count.min(MAX_RESERVE));
    Ok(())
}

fn set_component(field: &mut Option<Vec3>, lane: usize, value: Option<f32>) {
    if let Some(v) = value {
        let vec = field.get_or_insert(Vec3::ZERO);
        vec[lane] = v;
    }
}

// Scalar payload interpretation. Each folds the type's legacy "unset"
// sentinel to None so sentinel-carrying files decode like files that omit
// the block.

fn block_u32(payload: &[u8]) -> Result<Option<u32>> {
    let v = scalar_bytes::<4>(payload)?;
    let v = u32::from_le_bytes(v);
    Ok((v != u32::MAX).then_some(v))
}

fn block_i32(payload: &[u8]) -> Result<Option<i32>> {
    Ok(block_u32(payload)?.map(|v| v as i32))
}

fn block_f32(payload: &[u8]) -> Result<Option<f32>> {
    let v = f32::from_bits(u32::from_le_bytes(scalar_bytes::<4>(payload)?));
    Ok((!v.is_nan()).then_some(v))
}

fn block_bool(payload: &[u8]) -> Result<Option<bool>> {
    let v = scalar_bytes::<1>(payload)?[0];
    Ok((v != u8::MAX).then_some(v != 0))
}

fn block_string(payload: &[u8]) -> String {
    let trimmed = payload.strip_suffix(&[0]).unwrap_or(payload);
    String::from_utf8_lossy(trimmed).into_owned()
}

fn scalar_bytes<const N: usize>(payload: &[u8]) -> Result<[u8; N]> {
    if payload.len() < N {
        return Err(FormatError::UnexpectedEof {
            offset: 0,
            needed: N,
            remaining: payload.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&payload[..N]);
    Ok(out)
}

//! AVFX block emission

use glam::Vec3;

use super::*;
use crate::bytes::Writer;

pub(super) fn encode(fx: &Avfx) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_tag(AVFX_MAGIC);
    w.write_u32(0); // outer logical size, patched below

    block_u32(&mut w, TAG_VERSION, fx.version);
    block_bool(&mut w, TAG_DELAY_FAST_PARTICLE, fx.is_delay_fast_particle);
    block_bool(&mut w, TAG_FIT_GROUND, fx.is_fit_ground);
    block_bool(&mut w, TAG_TRANSFORM_SKIP, fx.is_transform_skip);
    block_bool(&mut w, TAG_ALL_STOP_ON_HIDE, fx.is_all_stop_on_hide);
    block_bool(&mut w, TAG_CAN_BE_CLIPPED_OUT, fx.can_be_clipped_out);
    block_bool(&mut w, TAG_CLIP_BOX_ENABLED, fx.clip_box_enabled);
    block_vec3(
        &mut w,
        [TAG_CLIP_BOX_X, TAG_CLIP_BOX_Y, TAG_CLIP_BOX_Z],
        fx.clip_box_position,
    );
    block_vec3(
        &mut w,
        [TAG_CLIP_BOX_SIZE_X, TAG_CLIP_BOX_SIZE_Y, TAG_CLIP_BOX_SIZE_Z],
        fx.clip_box_size,
    );
    block_f32(&mut w, TAG_BIAS_Z_MAX_SCALE, fx.bias_z_max_scale);
    block_f32(&mut w, TAG_BIAS_Z_MAX_DISTANCE, fx.bias_z_max_distance);
    block_bool(&mut w, TAG_CAMERA_SPACE, fx.is_camera_space);
    block_bool(&mut w, TAG_FULL_ENV_LIGHT, fx.is_full_env_light);
    block_f32(
        &mut w,
        TAG_SOFT_PARTICLE_FADE_RANGE,
        fx.soft_particle_fade_range,
    );
    block_i32(&mut w, TAG_SORT_KEY_OFFSET, fx.sort_key_offset);
    block_u32(&mut w, TAG_DRAW_LAYER, fx.draw_layer);
    block_u32(&mut w, TAG_DRAW_ORDER, fx.draw_order);
    block_u32(&mut w, TAG_LIGHT_SOURCE, fx.light_source);

    raw_array(&mut w, TAG_SCHEDULER_COUNT, TAG_SCHEDULER, &fx.schedulers);
    raw_array(&mut w, TAG_TIMELINE_COUNT, TAG_TIMELINE, &fx.timelines);
    raw_array(&mut w, TAG_EMITTER_COUNT, TAG_EMITTER, &fx.emitters);
    raw_array(&mut w, TAG_PARTICLE_COUNT, TAG_PARTICLE, &fx.particles);
    raw_array(&mut w, TAG_EFFECTOR_COUNT, TAG_EFFECTOR, &fx.effectors);
    raw_array(&mut w, TAG_BINDER_COUNT, TAG_BINDER, &fx.binders);

    if !fx.textures.is_empty() {
        block(&mut w, TAG_TEXTURE_COUNT, &(fx.textures.len() as u32).to_le_bytes());
        for path in &fx.textures {
            let mut payload = Vec::with_capacity(path.len() + 1);
            payload.extend_from_slice(path.as_bytes());
            payload.push(0);
            block(&mut w, TAG_TEXTURE, &payload);
        }
    }

    raw_array(&mut w, TAG_MODEL_COUNT, TAG_MODEL, &fx.models);

    let total = w.len() - 8;
    w.patch_u32(4, total as u32);
    w.into_inner()
}

/// Emit one block: tag, logical size, payload padded to 4 bytes.
fn block(w: &mut Writer, tag: [u8; 4], payload: &[u8]) {
    w.write_tag(tag);
    w.write_u32(payload.len() as u32);
    w.write_bytes(payload);
    w.align_to(4, 0);
}

fn block_u32(w: &mut Writer, tag: [u8; 4], value: Option<u32>) {
    if let Some(v) = value {
        block(w, tag, &v.to_le_bytes());
    }
}

fn block_i32(w: &mut Writer, tag: [u8; 4], value: Option<i32>) {
    if let Some(v) = value {
        block(w, tag, &v.to_le_bytes());
    }
}

fn block_f32(w: &mut Writer, tag: [u8; 4], value: Option<f32>) {
    if let Some(v) = value {
        block(w, tag, &v.to_le_bytes());
    }
}

fn block_bool(w: &mut Writer, tag: [u8; 4], value: Option<bool>) {
    if let Some(v) = value {
        block(w, tag, &[v as u8]);
    }
}

fn block_vec3(w: &mut Writer, tags: [[u8; 4]; 3], value: Option<Vec3>) {
    if let Some(v) = value {
        for (tag, lane) in tags.into_iter().zip([v.x, v.y, v.z]) {
            block(w, tag, &lane.to_le_bytes());
        }
    }
}

fn raw_array(w: &mut Writer, count_tag: [u8; 4], item_tag: [u8; 4], items: &[Vec<u8>]) {
    if items.is_empty() {
        return;
    }
    block(w, count_tag, &(items.len() as u32).to_le_bytes());
    for item in items {
        block(w, item_tag, item);
    }
}

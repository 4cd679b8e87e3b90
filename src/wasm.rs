//! JavaScript bindings, enabled with the `wasm` feature.

use glam::DVec3;
use wasm_bindgen::prelude::*;

use crate::{MeshConfig, MeshError};

fn to_js(err: MeshError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Vertex buffer of the fractal around `base`, 3 floats per vertex.
#[wasm_bindgen]
pub fn sierpinski(base: &[f32], scale: f32, levels: u8) -> Result<Vec<f32>, JsValue> {
    let [x, y, z]: [f32; 3] = base
        .try_into()
        .map_err(|_| to_js(MeshError::BadBaseLength(base.len())))?;

    let mesh = MeshConfig::new(scale.into(), levels.into())
        .with_base(DVec3::new(x.into(), y.into(), z.into()))
        .generate()
        .map_err(to_js)?;

    Ok(mesh.to_f32())
}

/// The sequential index buffer matching [`sierpinski`] at the same depth.
#[wasm_bindgen]
pub fn sierpinski_indices(levels: u8) -> Result<Vec<u32>, JsValue> {
    let count = MeshConfig::new(1.0, levels.into())
        .vertex_count()
        .map_err(to_js)?;

    Ok((0..count).collect())
}

use crate::errors::LoadError;
use crate::mesh::MeshData;
use crate::shape::Shape;
use crate::types::Color;

/// Index of the shape with the longest vertex list (first one on ties).
pub fn largest_shape(shapes: &[Shape]) -> Option<usize> {
    shapes
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, usize)>, (index, shape)| match best {
            Some((_, len)) if len >= shape.vertices.len() => best,
            _ => Some((index, shape.vertices.len())),
        })
        .map(|(index, _)| index)
}

/// Allocates the shared interpolation buffer for a fully loaded shape set.
///
/// The buffer is as long as the largest shape and starts out holding that
/// shape's vertices.
pub fn canonical_buffer(shapes: &[Shape]) -> Result<Vec<f32>, LoadError> {
    let index = largest_shape(shapes).ok_or_else(|| LoadError::NoGeometry {
        key: "<empty shape set>".to_string(),
    })?;
    Ok(shapes[index].vertices.to_vec())
}

/// Builds the renderable mesh whose live geometry is the canonical buffer.
pub fn build_morph_mesh(shapes: &[Shape], color: Color) -> Result<MeshData, LoadError> {
    Ok(MeshData::new(canonical_buffer(shapes)?, color))
}

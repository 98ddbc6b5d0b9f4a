//! Blank `BlazeFace` weight files.

use std::path::Path;

use anyhow::Result;
use safetensors::tensor::{Dtype, TensorView};

/// Tensor names and shapes of a `BlazeFace` checkpoint.
fn blazeface_shapes() -> Vec<(String, Vec<usize>)> {
    fn conv(prefix: &str, out_c: usize, in_c: usize, k: usize) -> [(String, Vec<usize>); 2] {
        [
            (format!("{prefix}.weight"), vec![out_c, in_c, k, k]),
            (format!("{prefix}.bias"), vec![out_c]),
        ]
    }

    let backbone1 = [
        (24, 24),
        (24, 28),
        (28, 32),
        (32, 36),
        (36, 42),
        (42, 48),
        (48, 56),
        (56, 64),
        (64, 72),
        (72, 80),
        (80, 88),
    ];
    let backbone2 = [(88, 96), (96, 96), (96, 96), (96, 96), (96, 96)];

    let mut shapes = Vec::new();
    shapes.extend(conv("conv0", 24, 3, 5));
    for (name, table) in [("backbone1", &backbone1[..]), ("backbone2", &backbone2[..])] {
        for (i, &(in_c, out_c)) in table.iter().enumerate() {
            shapes.extend(conv(&format!("{name}.{i}.depthwise"), in_c, 1, 3));
            shapes.extend(conv(&format!("{name}.{i}.pointwise"), out_c, in_c, 1));
        }
    }
    shapes.extend(conv("classifier_16", 2, 88, 1));
    shapes.extend(conv("regressor_16", 32, 88, 1));
    shapes.extend(conv("classifier_8", 6, 96, 1));
    shapes.extend(conv("regressor_8", 96, 96, 1));
    shapes
}

/// Writes an all-zero `BlazeFace` checkpoint to `path`.
///
/// The network loads and runs, and every anchor scores exactly 0.5, so no
/// face passes the default confidence threshold.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_blank_blazeface(path: &Path) -> Result<()> {
    let shapes = blazeface_shapes();
    let buffers: Vec<Vec<u8>> = shapes
        .iter()
        .map(|(_, shape)| vec![0_u8; shape.iter().product::<usize>() * 4])
        .collect();

    let mut views = Vec::with_capacity(shapes.len());
    for ((name, shape), bytes) in shapes.iter().zip(&buffers) {
        views.push((name.as_str(), TensorView::new(Dtype::F32, shape.clone(), bytes)?));
    }

    safetensors::serialize_to_file(views, &None, path)?;
    Ok(())
}

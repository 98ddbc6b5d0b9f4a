//! Safetensors weight loading.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use safetensors::SafeTensors;
use tracing::debug;

/// Reads a safetensors file into a `VarBuilder` on `device`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid safetensors, or
/// holds a tensor dtype candle does not support.
pub fn load_weights(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    debug!("Reading weights from {}", path.display());

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read weights: {}", path.display()))?;
    let file = SafeTensors::deserialize(&bytes)
        .with_context(|| format!("Invalid safetensors file: {}", path.display()))?;

    let mut tensors = HashMap::with_capacity(file.len());
    for (name, view) in file.tensors() {
        let dtype = to_candle_dtype(view.dtype())
            .with_context(|| format!("Tensor '{name}' in {}", path.display()))?;
        let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
            .with_context(|| format!("Failed to materialize tensor '{name}'"))?;
        tensors.insert(name, tensor);
    }

    Ok(VarBuilder::from_tensors(tensors, DType::F32, device))
}

fn to_candle_dtype(dtype: safetensors::Dtype) -> Result<DType> {
    use safetensors::Dtype as S;
    Ok(match dtype {
        S::F32 => DType::F32,
        S::F64 => DType::F64,
        S::F16 => DType::F16,
        S::BF16 => DType::BF16,
        S::I64 => DType::I64,
        S::U32 => DType::U32,
        S::U8 => DType::U8,
        other => anyhow::bail!("unsupported dtype {other:?}"),
    })
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tiny_weights() -> tempfile::NamedTempFile {
        use safetensors::tensor::TensorView;

        let values: Vec<f32> = vec![0.5, -1.0, 2.0, 4.0];
        let view = TensorView::new(
            safetensors::Dtype::F32,
            vec![2, 2],
            bytemuck::cast_slice(&values),
        )
        .expect("tensor view");
        let bytes = safetensors::serialize(HashMap::from([("w".to_string(), view)]), &None)
            .expect("serialize");

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&bytes).expect("write weights");
        file
    }

    #[test]
    fn test_load_weights() {
        let file = write_tiny_weights();
        let vb = load_weights(file.path(), &Device::Cpu).expect("load");
        let w = vb.get((2, 2), "w").expect("tensor w");
        let flat: Vec<f32> = w.flatten_all().and_then(|t| t.to_vec1()).expect("values");
        assert_eq!(flat, vec![0.5, -1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_load_weights_missing_file() {
        assert!(load_weights("/nonexistent/blazeface.safetensors", &Device::Cpu).is_err());
    }

    #[test]
    fn test_load_weights_garbage() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"definitely not safetensors").expect("write");
        assert!(load_weights(file.path(), &Device::Cpu).is_err());
    }
}

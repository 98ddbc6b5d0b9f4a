//! `BlazeFace` short-range face detector.
//!
//! Network layout follows "`BlazeFace`: Sub-millisecond Neural Face Detection
//! on Mobile GPUs" with the `BatchNorm` layers folded into convolution biases,
//! matching the weights published at
//! <https://github.com/hollance/BlazeFace-PyTorch>.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]

use anyhow::{Context, Result};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{conv2d, Conv2d, Conv2dConfig, VarBuilder};
use image::imageops::FilterType;
use image::DynamicImage;

use crate::domain::{BoundingBox, Detection, Landmark, LandmarkKind};

/// Side length of the square network input.
pub const INPUT_SIZE: usize = 128;

/// Total anchors across both feature maps (16x16x2 + 8x8x6).
const NUM_ANCHORS: usize = 896;

/// Values regressed per anchor: 4 box terms + 6 keypoints x 2.
const REGRESSION_LEN: usize = 16;

/// Overlap above which the lower-scoring face is suppressed.
const NMS_IOU_THRESHOLD: f32 = 0.3;

/// Keypoints in the order the network regresses them.
pub const KEYPOINT_KINDS: [LandmarkKind; 6] = [
    LandmarkKind::RightEye,
    LandmarkKind::LeftEye,
    LandmarkKind::NoseBase,
    LandmarkKind::Mouth,
    LandmarkKind::RightEar,
    LandmarkKind::LeftEar,
];

/// `(in_channels, out_channels, stride)` of the blocks producing the 16x16 map.
const BACKBONE_16: [(usize, usize, usize); 11] = [
    (24, 24, 1),
    (24, 28, 1),
    (28, 32, 2),
    (32, 36, 1),
    (36, 42, 1),
    (42, 48, 2),
    (48, 56, 1),
    (56, 64, 1),
    (64, 72, 1),
    (72, 80, 1),
    (80, 88, 1),
];

/// `(in_channels, out_channels, stride)` of the blocks producing the 8x8 map.
const BACKBONE_8: [(usize, usize, usize); 5] = [
    (88, 96, 2),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
    (96, 96, 1),
];

/// A face in normalized `[0, 1]` image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawFace {
    /// `[x_min, y_min, x_max, y_max]`.
    pub bbox: [f32; 4],
    /// Sigmoid confidence.
    pub score: f32,
    /// `[x, y]` per entry of [`KEYPOINT_KINDS`].
    pub keypoints: [[f32; 2]; 6],
}

impl RawFace {
    /// Scales to pixel space of a `width` x `height` image.
    #[must_use]
    pub fn to_detection(&self, width: u32, height: u32, with_landmarks: bool) -> Detection {
        let (w, h) = (width as f32, height as f32);
        let [x_min, y_min, x_max, y_max] = self.bbox;
        let landmarks = if with_landmarks {
            KEYPOINT_KINDS
                .iter()
                .zip(self.keypoints)
                .map(|(&kind, [x, y])| Landmark::new(kind, x * w, y * h))
                .collect()
        } else {
            Vec::new()
        };

        Detection {
            bbox: BoundingBox::new(x_min * w, y_min * h, (x_max - x_min) * w, (y_max - y_min) * h),
            landmarks,
            confidence: self.score,
        }
    }
}

/// Depthwise-separable residual block.
struct BlazeBlock {
    depthwise: Conv2d,
    pointwise: Conv2d,
    stride: usize,
    extra_channels: usize,
}

impl BlazeBlock {
    fn load(in_c: usize, out_c: usize, stride: usize, vb: &VarBuilder) -> Result<Self> {
        let depthwise = conv2d(
            in_c,
            in_c,
            3,
            Conv2dConfig {
                stride,
                padding: if stride == 2 { 0 } else { 1 },
                groups: in_c,
                ..Conv2dConfig::default()
            },
            vb.pp("depthwise"),
        )?;
        let pointwise = conv2d(in_c, out_c, 1, Conv2dConfig::default(), vb.pp("pointwise"))?;

        Ok(Self {
            depthwise,
            pointwise,
            stride,
            extra_channels: out_c.saturating_sub(in_c),
        })
    }
}

impl Module for BlazeBlock {
    fn forward(&self, x: &Tensor) -> candle_core::Result<Tensor> {
        let (branch_in, shortcut) = if self.stride == 2 {
            // TF-style "same" padding for the strided conv is bottom/right only
            let padded = x.pad_with_zeros(2, 0, 2)?.pad_with_zeros(3, 0, 2)?;
            (padded, x.max_pool2d(2)?)
        } else {
            (x.clone(), x.clone())
        };

        let branch = self
            .pointwise
            .forward(&self.depthwise.forward(&branch_in)?.relu()?)?;

        let shortcut = if self.extra_channels > 0 {
            shortcut.pad_with_zeros(1, 0, self.extra_channels)?
        } else {
            shortcut
        };

        (branch + shortcut)?.relu()
    }
}

/// Classifier and regressor convolutions over one feature map.
struct DetectionHead {
    classifier: Conv2d,
    regressor: Conv2d,
    anchors: usize,
}

impl DetectionHead {
    fn load(
        channels: usize,
        anchors_per_cell: usize,
        cells: usize,
        suffix: &str,
        vb: &VarBuilder,
    ) -> Result<Self> {
        let classifier = conv2d(
            channels,
            anchors_per_cell,
            1,
            Conv2dConfig::default(),
            vb.pp(format!("classifier_{suffix}")),
        )?;
        let regressor = conv2d(
            channels,
            anchors_per_cell * REGRESSION_LEN,
            1,
            Conv2dConfig::default(),
            vb.pp(format!("regressor_{suffix}")),
        )?;
        Ok(Self {
            classifier,
            regressor,
            anchors: cells * cells * anchors_per_cell,
        })
    }

    /// Returns `(scores (1, n, 1), regressions (1, n, 16))`.
    fn forward(&self, features: &Tensor) -> Result<(Tensor, Tensor)> {
        let scores = self
            .classifier
            .forward(features)?
            .permute((0, 2, 3, 1))?
            .reshape((1, self.anchors, 1))?;
        let boxes = self
            .regressor
            .forward(features)?
            .permute((0, 2, 3, 1))?
            .reshape((1, self.anchors, REGRESSION_LEN))?;
        Ok((scores, boxes))
    }
}

/// The `BlazeFace` network with its anchor grid.
pub struct BlazeFace {
    stem: Conv2d,
    backbone_16: Vec<BlazeBlock>,
    backbone_8: Vec<BlazeBlock>,
    head_16: DetectionHead,
    head_8: DetectionHead,
    anchors: Vec<[f32; 2]>,
    device: Device,
}

impl BlazeFace {
    /// Builds the network from loaded weights.
    ///
    /// # Errors
    ///
    /// Returns an error if a weight tensor is missing or has the wrong shape.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder) -> Result<Self> {
        let stem = conv2d(
            3,
            24,
            5,
            Conv2dConfig {
                stride: 2,
                ..Conv2dConfig::default()
            },
            vb.pp("conv0"),
        )
        .context("Failed to load stem convolution")?;

        let backbone_16 = load_blocks(&BACKBONE_16, "backbone1", &vb)?;
        let backbone_8 = load_blocks(&BACKBONE_8, "backbone2", &vb)?;

        Ok(Self {
            stem,
            backbone_16,
            backbone_8,
            head_16: DetectionHead::load(88, 2, 16, "16", &vb)?,
            head_8: DetectionHead::load(96, 6, 8, "8", &vb)?,
            anchors: anchor_centers(),
            device: vb.device().clone(),
        })
    }

    /// Converts an image to a `(1, 3, 128, 128)` tensor scaled to `[-1, 1]`.
    ///
    /// # Errors
    ///
    /// Returns an error if tensor construction fails.
    pub fn preprocess(&self, image: &DynamicImage) -> Result<Tensor> {
        let side = INPUT_SIZE as u32;
        let pixels: Vec<f32> = image
            .resize_exact(side, side, FilterType::Triangle)
            .to_rgb8()
            .into_raw()
            .into_iter()
            .map(|v| f32::from(v) / 127.5 - 1.0)
            .collect();

        Tensor::from_vec(pixels, (1, INPUT_SIZE, INPUT_SIZE, 3), &self.device)?
            .permute((0, 3, 1, 2))?
            .contiguous()?
            .to_dtype(DType::F32)
            .context("Failed to build input tensor")
    }

    /// Detects faces scoring at least `min_score`, after non-maximum suppression.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn detect(&self, image: &DynamicImage, min_score: f32) -> Result<Vec<RawFace>> {
        let input = self.preprocess(image)?;
        let (scores, boxes) = self.forward(&input)?;

        let scores: Vec<f32> = scores.flatten_all()?.to_vec1()?;
        let boxes: Vec<Vec<f32>> = boxes.squeeze(0)?.to_vec2()?;

        let candidates = decode(&self.anchors, &scores, &boxes, min_score);
        Ok(suppress_overlaps(candidates))
    }

    fn forward(&self, input: &Tensor) -> Result<(Tensor, Tensor)> {
        // Stem padding mirrors TF "same" for a 5x5 stride-2 kernel
        let x = input.pad_with_zeros(2, 1, 2)?.pad_with_zeros(3, 1, 2)?;
        let mut x = self.stem.forward(&x)?.relu()?;

        for block in &self.backbone_16 {
            x = block.forward(&x)?;
        }
        let (scores_16, boxes_16) = self.head_16.forward(&x)?;

        for block in &self.backbone_8 {
            x = block.forward(&x)?;
        }
        let (scores_8, boxes_8) = self.head_8.forward(&x)?;

        Ok((
            Tensor::cat(&[scores_16, scores_8], 1)?,
            Tensor::cat(&[boxes_16, boxes_8], 1)?,
        ))
    }
}

fn load_blocks(
    table: &[(usize, usize, usize)],
    prefix: &str,
    vb: &VarBuilder,
) -> Result<Vec<BlazeBlock>> {
    table
        .iter()
        .enumerate()
        .map(|(i, &(in_c, out_c, stride))| {
            BlazeBlock::load(in_c, out_c, stride, &vb.pp(format!("{prefix}.{i}")))
                .with_context(|| format!("Failed to load {prefix}.{i}"))
        })
        .collect()
}

/// Anchor centers: 2 per cell on the 16x16 grid, then 6 per cell on 8x8.
fn anchor_centers() -> Vec<[f32; 2]> {
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);
    for (cells, per_cell) in [(16_u8, 2), (8, 6)] {
        let size = f32::from(cells);
        for y in 0..cells {
            for x in 0..cells {
                let center = [(f32::from(x) + 0.5) / size, (f32::from(y) + 0.5) / size];
                anchors.extend(std::iter::repeat(center).take(per_cell));
            }
        }
    }
    anchors
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Turns raw regressions into normalized faces.
fn decode(
    anchors: &[[f32; 2]],
    scores: &[f32],
    boxes: &[Vec<f32>],
    min_score: f32,
) -> Vec<RawFace> {
    let scale = INPUT_SIZE as f32;
    let point = |anchor: [f32; 2], dx: f32, dy: f32| {
        [
            (anchor[0] + dx / scale).clamp(0.0, 1.0),
            (anchor[1] + dy / scale).clamp(0.0, 1.0),
        ]
    };

    anchors
        .iter()
        .zip(scores)
        .zip(boxes)
        .filter_map(|((&anchor, &logit), reg)| {
            let score = sigmoid(logit);
            if score < min_score || reg.len() < REGRESSION_LEN {
                return None;
            }
            let [cx, cy] = [anchor[0] + reg[0] / scale, anchor[1] + reg[1] / scale];
            let (half_w, half_h) = (reg[2] / scale / 2.0, reg[3] / scale / 2.0);

            let mut keypoints = [[0.0; 2]; 6];
            for (k, kp) in keypoints.iter_mut().enumerate() {
                *kp = point(anchor, reg[4 + 2 * k], reg[5 + 2 * k]);
            }

            Some(RawFace {
                bbox: [
                    (cx - half_w).clamp(0.0, 1.0),
                    (cy - half_h).clamp(0.0, 1.0),
                    (cx + half_w).clamp(0.0, 1.0),
                    (cy + half_h).clamp(0.0, 1.0),
                ],
                score,
                keypoints,
            })
        })
        .collect()
}

/// Greedy non-maximum suppression, highest score first.
fn suppress_overlaps(mut faces: Vec<RawFace>) -> Vec<RawFace> {
    faces.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<RawFace> = Vec::with_capacity(faces.len());
    for face in faces {
        if kept
            .iter()
            .all(|k| iou(&k.bbox, &face.bbox) < NMS_IOU_THRESHOLD)
        {
            kept.push(face);
        }
    }
    kept
}

/// Intersection over union of two `[x_min, y_min, x_max, y_max]` boxes.
fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let overlap_w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let overlap_h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let intersection = overlap_w * overlap_h;
    let union = (a[2] - a[0]) * (a[3] - a[1]) + (b[2] - b[0]) * (b[3] - b[1]) - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

// 该文件是 Haishao （海哨） 项目的一部分。
// src/decoder.rs - 锚点网格解码
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tracing::debug;

use crate::{config::CoordinateSpaces, tensor::RawDetectionTensor};

/// 轴对齐边界框，左上角坐标加宽高，显示面像素单位
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
  pub x: f32,
  pub y: f32,
  pub width: f32,
  pub height: f32,
}

impl BBox {
  pub fn area(&self) -> f32 {
    self.width * self.height
  }
}

/// 单个候选检测
#[derive(Debug, Clone)]
pub struct Detection {
  /// 边界框，显示面坐标
  pub bbox: BBox,
  /// 置信度
  pub score: f32,
  /// 类别索引
  pub class_id: usize,
  /// 掩码系数，长度等于原型通道数
  pub mask_coeffs: Vec<f32>,
}

/// 将检测输出张量解码为超过阈值的候选检测序列。
/// 输出顺序即锚点扫描顺序；边界框已按逐轴系数缩放到显示空间。
pub fn decode_anchors(
  tensor: &RawDetectionTensor,
  spaces: &CoordinateSpaces,
  score_threshold: f32,
) -> Vec<Detection> {
  let num_anchors = tensor.num_anchors();
  let num_classes = tensor.num_classes();
  let mask_channels = tensor.mask_channels();
  let (scale_x, scale_y) = spaces.model_to_display();

  let mut candidates = Vec::new();

  for anchor in 0..num_anchors {
    // 扫描类别通道取最大分数；使用严格大于比较，平局落在最小类别索引上
    let mut max_score = 0.0f32;
    let mut max_class = 0usize;
    for class in 0..num_classes {
      let score = tensor.at(4 + class, anchor);
      if score > max_score {
        max_score = score;
        max_class = class;
      }
    }

    // 等于阈值视为未超过，丢弃
    if max_score <= score_threshold {
      continue;
    }

    // 前四个通道为中心点与宽高，转为左上角坐标后缩放
    let cx = tensor.at(0, anchor);
    let cy = tensor.at(1, anchor);
    let w = tensor.at(2, anchor);
    let h = tensor.at(3, anchor);

    let bbox = BBox {
      x: (cx - w / 2.0) * scale_x,
      y: (cy - h / 2.0) * scale_y,
      width: w * scale_x,
      height: h * scale_y,
    };

    let mask_coeffs: Vec<f32> = (0..mask_channels)
      .map(|m| tensor.at(4 + num_classes + m, anchor))
      .collect();

    candidates.push(Detection {
      bbox,
      score: max_score,
      class_id: max_class,
      mask_coeffs,
    });
  }

  debug!("阈值过滤后剩余 {} 个候选检测", candidates.len());
  candidates
}

#[cfg(test)]
mod tests {
  use super::*;

  // 构造单锚点张量：[cx, cy, w, h, 类别分数..., 掩码系数...]
  fn single_anchor(bbox: [f32; 4], scores: &[f32], coeffs: &[f32]) -> Vec<f32> {
    let mut data = bbox.to_vec();
    data.extend_from_slice(scores);
    data.extend_from_slice(coeffs);
    data
  }

  #[test]
  fn decodes_single_anchor_above_threshold() {
    let data = single_anchor([320.0, 320.0, 100.0, 80.0], &[0.0, 0.0, 0.9], &[0.5; 4]);
    let tensor = RawDetectionTensor::new(&data, 1, 3, 4).unwrap();
    let spaces = CoordinateSpaces::new((640, 640), (160, 160), (640, 640));

    let candidates = decode_anchors(&tensor, &spaces, 0.25);
    assert_eq!(candidates.len(), 1);
    let det = &candidates[0];
    assert_eq!(det.class_id, 2);
    assert!((det.score - 0.9).abs() < 1e-6);
    assert!((det.bbox.x - 270.0).abs() < 1e-4);
    assert!((det.bbox.y - 280.0).abs() < 1e-4);
    assert!((det.bbox.width - 100.0).abs() < 1e-4);
    assert!((det.bbox.height - 80.0).abs() < 1e-4);
    assert_eq!(det.mask_coeffs, vec![0.5; 4]);
  }

  #[test]
  fn score_equal_to_threshold_is_excluded() {
    let data = single_anchor([320.0, 320.0, 100.0, 80.0], &[0.25, 0.0, 0.0], &[0.0; 4]);
    let tensor = RawDetectionTensor::new(&data, 1, 3, 4).unwrap();
    let spaces = CoordinateSpaces::new((640, 640), (160, 160), (640, 640));

    let candidates = decode_anchors(&tensor, &spaces, 0.25);
    assert!(candidates.is_empty());
  }

  #[test]
  fn score_tie_resolves_to_lowest_class_index() {
    let data = single_anchor([320.0, 320.0, 100.0, 80.0], &[0.8, 0.8, 0.8], &[0.0; 4]);
    let tensor = RawDetectionTensor::new(&data, 1, 3, 4).unwrap();
    let spaces = CoordinateSpaces::new((640, 640), (160, 160), (640, 640));

    let candidates = decode_anchors(&tensor, &spaces, 0.25);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].class_id, 0);
  }

  #[test]
  fn non_uniform_axis_scaling() {
    // 模型 640x640，显示 1280x320：横向放大 2 倍，纵向缩小 2 倍
    let data = single_anchor([320.0, 320.0, 100.0, 80.0], &[0.9], &[0.0; 2]);
    let tensor = RawDetectionTensor::new(&data, 1, 1, 2).unwrap();
    let spaces = CoordinateSpaces::new((640, 640), (160, 160), (1280, 320));

    let candidates = decode_anchors(&tensor, &spaces, 0.25);
    let bbox = candidates[0].bbox;
    assert!((bbox.x - 540.0).abs() < 1e-4);
    assert!((bbox.y - 140.0).abs() < 1e-4);
    assert!((bbox.width - 200.0).abs() < 1e-4);
    assert!((bbox.height - 40.0).abs() < 1e-4);
  }

  #[test]
  fn all_anchors_below_threshold_yield_empty_result() {
    let mut data = single_anchor([320.0, 320.0, 100.0, 80.0], &[0.1, 0.2], &[0.0; 3]);
    data.extend(single_anchor([100.0, 100.0, 50.0, 50.0], &[0.05, 0.0], &[0.0; 3]));
    // 两个锚点交织到通道优先布局
    let mut strided = vec![0.0f32; data.len()];
    let channels = 4 + 2 + 3;
    for c in 0..channels {
      strided[c * 2] = data[c];
      strided[c * 2 + 1] = data[channels + c];
    }
    let tensor = RawDetectionTensor::new(&strided, 2, 2, 3).unwrap();
    let spaces = CoordinateSpaces::new((640, 640), (160, 160), (640, 640));

    assert!(decode_anchors(&tensor, &spaces, 0.25).is_empty());
  }
}

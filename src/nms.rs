// 该文件是 Haishao （海哨） 项目的一部分。
// src/nms.rs - 非极大值抑制
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::cmp::Ordering;

use tracing::debug;

use crate::decoder::{BBox, Detection};

/// 计算两个边界框的交并比，交集宽高钳制为非负
pub fn iou(a: &BBox, b: &BBox) -> f32 {
  let x1 = a.x.max(b.x);
  let y1 = a.y.max(b.y);
  let x2 = (a.x + a.width).min(b.x + b.width);
  let y2 = (a.y + a.height).min(b.y + b.height);

  let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
  let union = a.area() + b.area() - intersection;

  if union > 0.0 {
    intersection / union
  } else {
    0.0
  }
}

/// 贪心 NMS：按分数降序稳定排序（同分保持锚点顺序），依次取出最高分者，
/// 抑制与其 IOU 严格超过阈值的剩余候选。抑制与类别无关，不同类别的
/// 重叠检测同样互斥。max_results 在抑制完成后截断最终序列。
pub fn suppress(
  mut candidates: Vec<Detection>,
  iou_threshold: f32,
  max_results: Option<usize>,
) -> Vec<Detection> {
  candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

  let mut result = Vec::new();
  while !candidates.is_empty() {
    let best = candidates.remove(0);
    candidates.retain(|det| iou(&best.bbox, &det.bbox) <= iou_threshold);
    result.push(best);
  }

  if let Some(cap) = max_results {
    if result.len() > cap {
      debug!("检测数量 {} 超过上限 {}, 截断", result.len(), cap);
      result.truncate(cap);
    }
  }

  result
}

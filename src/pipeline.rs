// 该文件是 Haishao （海哨） 项目的一部分。
// src/pipeline.rs - 单帧后处理流水线
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use tracing::{debug, info, warn};

use crate::{
  config::{CoordinateSpaces, PipelineConfig},
  contour::{Polygon, extract_polygons},
  decoder::{Detection, decode_anchors},
  mask::{decode_mask, map_region},
  nms::suppress,
  tensor::{PrototypeBank, RawDetectionTensor, TensorError},
};

/// 一个最终检测及其显示面多边形，交给合成器即可直接绘制
#[derive(Debug, Clone)]
pub struct Instance {
  pub detection: Detection,
  pub polygons: Vec<Polygon>,
}

/// 单帧后处理流水线：解码 → 抑制 → 逐检测的掩码重建、区域映射与轮廓提取。
/// 不在帧之间保留任何状态，所有输入每次调用重新提供。
pub struct SegPipeline {
  config: PipelineConfig,
}

impl SegPipeline {
  pub fn new(config: PipelineConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &PipelineConfig {
    &self.config
  }

  /// 处理一帧。protos 为 None 时跳过全部掩码阶段，
  /// 检测框与标签照常输出（降级但有效）。
  pub fn process_frame(
    &self,
    tensor: &RawDetectionTensor,
    protos: Option<&PrototypeBank>,
    spaces: &CoordinateSpaces,
  ) -> Result<Vec<Instance>, TensorError> {
    let candidates = decode_anchors(tensor, spaces, self.config.score_threshold);
    let survivors = suppress(candidates, self.config.iou_threshold, self.config.max_results);
    info!("NMS 后保留 {} 个检测", survivors.len());

    if survivors.is_empty() {
      return Ok(Vec::new());
    }

    let Some(bank) = protos else {
      warn!("本帧缺少原型张量，跳过掩码重建，仅输出检测框");
      return Ok(
        survivors
          .into_iter()
          .map(|detection| Instance {
            detection,
            polygons: Vec::new(),
          })
          .collect(),
      );
    };

    let mut instances = Vec::with_capacity(survivors.len());
    for detection in survivors {
      let soft = decode_mask(&detection.mask_coeffs, bank)?;
      let polygons = match map_region(&soft, &detection.bbox, spaces, self.config.mask_padding) {
        Some(fragment) => extract_polygons(&fragment),
        None => {
          debug!(
            "检测 (类别 {}) 的掩码几何退化，仅保留检测框",
            detection.class_id
          );
          Vec::new()
        }
      };
      instances.push(Instance {
        detection,
        polygons,
      });
    }

    Ok(instances)
  }
}

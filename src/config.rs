// 该文件是 Haishao （海哨） 项目的一部分。
// src/config.rs - 流水线配置与坐标空间定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

pub const MASK_CHANNELS: usize = 32;
pub const PROTO_WIDTH: usize = 160;
pub const PROTO_HEIGHT: usize = 160;
pub const DEFAULT_MODEL_WIDTH: u32 = 640;
pub const DEFAULT_MODEL_HEIGHT: u32 = 640;
pub const DEFAULT_SCORE_THRESH: f32 = 0.25;
pub const DEFAULT_IOU_THRESH: f32 = 0.45;
pub const DEFAULT_MAX_RESULTS: usize = 100;
pub const DEFAULT_MASK_PADDING: u32 = 2;

/// 流水线标量配置
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
  /// 置信度阈值（严格大于才保留）
  pub score_threshold: f32,
  /// NMS IOU 阈值（严格大于才抑制）
  pub iou_threshold: f32,
  /// NMS 之后保留的最大检测数量，None 表示不截断
  pub max_results: Option<usize>,
  /// 掩码裁剪时向外扩展的原型网格像素数
  pub mask_padding: u32,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      score_threshold: DEFAULT_SCORE_THRESH,
      iou_threshold: DEFAULT_IOU_THRESH,
      max_results: Some(DEFAULT_MAX_RESULTS),
      mask_padding: DEFAULT_MASK_PADDING,
    }
  }
}

/// 一帧内涉及的三个分辨率空间：模型输入、原型网格、显示面。
/// 每帧构造一次，之后只读传递，避免各阶段各自重复推导缩放系数。
#[derive(Debug, Clone, Copy)]
pub struct CoordinateSpaces {
  model_width: u32,
  model_height: u32,
  proto_width: u32,
  proto_height: u32,
  display_width: u32,
  display_height: u32,
}

impl CoordinateSpaces {
  pub fn new(model: (u32, u32), proto: (u32, u32), display: (u32, u32)) -> Self {
    Self {
      model_width: model.0,
      model_height: model.1,
      proto_width: proto.0,
      proto_height: proto.1,
      display_width: display.0,
      display_height: display.1,
    }
  }

  /// 模型输入空间到显示空间的缩放系数（逐轴，允许非等比）
  pub fn model_to_display(&self) -> (f32, f32) {
    (
      self.display_width as f32 / self.model_width as f32,
      self.display_height as f32 / self.model_height as f32,
    )
  }

  /// 显示空间到原型网格空间的缩放系数
  pub fn display_to_proto(&self) -> (f32, f32) {
    (
      self.proto_width as f32 / self.display_width as f32,
      self.proto_height as f32 / self.display_height as f32,
    )
  }

  pub fn proto_width(&self) -> u32 {
    self.proto_width
  }

  pub fn proto_height(&self) -> u32 {
    self.proto_height
  }

  pub fn display_width(&self) -> u32 {
    self.display_width
  }

  pub fn display_height(&self) -> u32 {
    self.display_height
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn non_uniform_scale_factors() {
    let spaces = CoordinateSpaces::new((640, 640), (160, 160), (1280, 640));
    let (sx, sy) = spaces.model_to_display();
    assert_eq!(sx, 2.0);
    assert_eq!(sy, 1.0);
    let (px, py) = spaces.display_to_proto();
    assert_eq!(px, 0.125);
    assert_eq!(py, 0.25);
  }

  #[test]
  fn default_config_matches_documented_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.score_threshold, 0.25);
    assert_eq!(config.iou_threshold, 0.45);
    assert_eq!(config.max_results, Some(100));
  }
}

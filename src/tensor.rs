// 该文件是 Haishao （海哨） 项目的一部分。
// src/tensor.rs - 原始张量视图与形状校验
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TensorError {
  #[error("检测张量形状不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  DetectionShapeMismatch { expected: usize, actual: usize },
  #[error("原型张量形状不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  PrototypeShapeMismatch { expected: usize, actual: usize },
  #[error("掩码系数数量与原型通道数不匹配: 系数 {coeffs}, 通道 {channels}")]
  CoeffChannelMismatch { coeffs: usize, channels: usize },
}

/// 检测输出张量的只读视图，通道优先布局 [4 + 类别数 + 掩码通道数][锚点数]。
/// 缓冲区由调用方持有，仅在当前帧内有效。
#[derive(Debug, Clone, Copy)]
pub struct RawDetectionTensor<'a> {
  data: &'a [f32],
  num_anchors: usize,
  num_classes: usize,
  mask_channels: usize,
}

impl<'a> RawDetectionTensor<'a> {
  pub fn new(
    data: &'a [f32],
    num_anchors: usize,
    num_classes: usize,
    mask_channels: usize,
  ) -> Result<Self, TensorError> {
    let expected = (4 + num_classes + mask_channels) * num_anchors;
    if data.len() != expected {
      return Err(TensorError::DetectionShapeMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data,
      num_anchors,
      num_classes,
      mask_channels,
    })
  }

  /// 读取第 anchor 个锚点在第 channel 个通道上的值。
  /// 锚点属性跨通道分布，步长为锚点总数。
  #[inline]
  pub fn at(&self, channel: usize, anchor: usize) -> f32 {
    self.data[channel * self.num_anchors + anchor]
  }

  pub fn num_anchors(&self) -> usize {
    self.num_anchors
  }

  pub fn num_classes(&self) -> usize {
    self.num_classes
  }

  pub fn mask_channels(&self) -> usize {
    self.mask_channels
  }
}

/// 原型张量的只读视图，布局 [通道数][原型高][原型宽]。
/// 由推理阶段每帧产出一次，流水线绝不修改其内容。
#[derive(Debug, Clone, Copy)]
pub struct PrototypeBank<'a> {
  data: &'a [f32],
  channels: usize,
  height: usize,
  width: usize,
}

impl<'a> PrototypeBank<'a> {
  pub fn new(
    data: &'a [f32],
    channels: usize,
    height: usize,
    width: usize,
  ) -> Result<Self, TensorError> {
    let expected = channels * height * width;
    if data.len() != expected {
      return Err(TensorError::PrototypeShapeMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data,
      channels,
      height,
      width,
    })
  }

  #[inline]
  pub fn at(&self, channel: usize, y: usize, x: usize) -> f32 {
    self.data[channel * self.height * self.width + y * self.width + x]
  }

  pub fn channels(&self) -> usize {
    self.channels
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn width(&self) -> usize {
    self.width
  }
}

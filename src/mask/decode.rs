// 该文件是 Haishao （海哨） 项目的一部分。
// src/mask/decode.rs - 原型掩码重建
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use crate::tensor::{PrototypeBank, TensorError};

/// 原型网格分辨率下的软掩码，取值 (0, 1)
#[derive(Debug, Clone)]
pub struct SoftMask {
  pub data: Vec<f32>,
  pub width: usize,
  pub height: usize,
}

impl SoftMask {
  #[inline]
  pub fn at(&self, y: usize, x: usize) -> f32 {
    self.data[y * self.width + x]
  }
}

/// 由掩码系数与原型张量重建单个检测的软掩码：
/// 每个网格单元对所有通道做点积，再经 sigmoid 激活。
/// 纯函数，无任何隐藏状态；每次调用分配独立的输出缓冲。
pub fn decode_mask(coeffs: &[f32], bank: &PrototypeBank) -> Result<SoftMask, TensorError> {
  if coeffs.len() != bank.channels() {
    return Err(TensorError::CoeffChannelMismatch {
      coeffs: coeffs.len(),
      channels: bank.channels(),
    });
  }

  let width = bank.width();
  let height = bank.height();
  let mut data = vec![0.0f32; width * height];

  for y in 0..height {
    for x in 0..width {
      let mut sum = 0.0f32;
      for (channel, coeff) in coeffs.iter().enumerate() {
        sum += coeff * bank.at(channel, y, x);
      }
      data[y * width + x] = sigmoid(sum);
    }
  }

  Ok(SoftMask {
    data,
    width,
    height,
  })
}

fn sigmoid(x: f32) -> f32 {
  1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn single_channel_mask_is_sigmoid_of_scaled_prototype() {
    let proto = vec![0.0f32, 1.0, -1.0, 2.0];
    let bank = PrototypeBank::new(&proto, 1, 2, 2).unwrap();

    let mask = decode_mask(&[2.0], &bank).unwrap();
    assert_eq!(mask.width, 2);
    assert_eq!(mask.height, 2);
    assert!((mask.at(0, 0) - 0.5).abs() < 1e-6);
    assert!((mask.at(0, 1) - sigmoid(2.0)).abs() < 1e-6);
    assert!((mask.at(1, 0) - sigmoid(-2.0)).abs() < 1e-6);
    assert!((mask.at(1, 1) - sigmoid(4.0)).abs() < 1e-6);
  }

  #[test]
  fn multi_channel_dot_product() {
    // 通道 0 全 1，通道 1 全 2：系数 [1, 0.5] 的点积处处为 2
    let proto = vec![1.0f32, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];
    let bank = PrototypeBank::new(&proto, 2, 2, 2).unwrap();

    let mask = decode_mask(&[1.0, 0.5], &bank).unwrap();
    for value in &mask.data {
      assert!((value - sigmoid(2.0)).abs() < 1e-6);
    }
  }

  #[test]
  fn decode_is_deterministic() {
    let proto: Vec<f32> = (0..2 * 3 * 3).map(|v| (v as f32) * 0.37 - 2.0).collect();
    let bank = PrototypeBank::new(&proto, 2, 3, 3).unwrap();
    let coeffs = [0.81, -1.3];

    let first = decode_mask(&coeffs, &bank).unwrap();
    let second = decode_mask(&coeffs, &bank).unwrap();
    // 逐位一致
    assert_eq!(first.data, second.data);
  }

  #[test]
  fn coeff_length_mismatch_is_rejected() {
    let proto = vec![0.0f32; 4];
    let bank = PrototypeBank::new(&proto, 1, 2, 2).unwrap();
    assert!(matches!(
      decode_mask(&[1.0, 2.0], &bank),
      Err(TensorError::CoeffChannelMismatch {
        coeffs: 2,
        channels: 1
      })
    ));
  }
}

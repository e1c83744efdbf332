// 该文件是 Haishao （海哨） 项目的一部分。
// src/mask/region.rs - 软掩码的裁剪、缩放与二值化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::{ImageBuffer, Luma, imageops::FilterType};
use tracing::debug;

use crate::{config::CoordinateSpaces, decoder::BBox, mask::SoftMask};

/// 掩码碎片：显示空间分辨率下的二值网格（0/255），附带其在显示面上的原点偏移
#[derive(Debug, Clone)]
pub struct MaskFragment {
  pub data: Vec<u8>,
  pub width: u32,
  pub height: u32,
  pub origin_x: f32,
  pub origin_y: f32,
}

/// 把软掩码映射到显示空间：将检测框换算到原型网格坐标并按 padding 外扩、
/// 钳制后裁剪，再将裁剪块双线性放大到其显示空间足迹，最后以 0.5 为界二值化。
/// 几何退化（裁剪块或足迹宽高非正）时返回 None，该检测仅保留框与标签。
pub fn map_region(
  mask: &SoftMask,
  bbox: &BBox,
  spaces: &CoordinateSpaces,
  padding: u32,
) -> Option<MaskFragment> {
  // 零面积框不产生掩码
  if bbox.width <= 0.0 || bbox.height <= 0.0 {
    return None;
  }

  let (scale_x, scale_y) = spaces.display_to_proto();
  let grid_w = mask.width as i64;
  let grid_h = mask.height as i64;
  let pad = padding as i64;

  // 检测框的原型网格足迹，外扩 padding 防止边缘被裁掉
  let x0 = ((bbox.x * scale_x).floor() as i64 - pad).clamp(0, grid_w);
  let y0 = ((bbox.y * scale_y).floor() as i64 - pad).clamp(0, grid_h);
  let x1 = (((bbox.x + bbox.width) * scale_x).ceil() as i64 + pad).clamp(0, grid_w);
  let y1 = (((bbox.y + bbox.height) * scale_y).ceil() as i64 + pad).clamp(0, grid_h);

  let crop_w = x1 - x0;
  let crop_h = y1 - y0;
  if crop_w <= 0 || crop_h <= 0 {
    debug!("裁剪区域退化 ({}x{}), 跳过掩码", crop_w, crop_h);
    return None;
  }

  // 裁剪块映射回显示空间的像素大小
  let out_w = (crop_w as f32 / scale_x).round() as i64;
  let out_h = (crop_h as f32 / scale_y).round() as i64;
  if out_w <= 0 || out_h <= 0 {
    debug!("目标足迹退化 ({}x{}), 跳过掩码", out_w, out_h);
    return None;
  }

  // 每个检测独立分配裁剪缓冲，不与其他检测共用
  let crop: ImageBuffer<Luma<f32>, Vec<f32>> =
    ImageBuffer::from_fn(crop_w as u32, crop_h as u32, |x, y| {
      Luma([mask.at((y0 + y as i64) as usize, (x0 + x as i64) as usize)])
    });

  let resized = image::imageops::resize(&crop, out_w as u32, out_h as u32, FilterType::Triangle);

  let data: Vec<u8> = resized
    .pixels()
    .map(|p| if p.0[0] > 0.5 { 255u8 } else { 0u8 })
    .collect();

  Some(MaskFragment {
    data,
    width: out_w as u32,
    height: out_h as u32,
    origin_x: x0 as f32 / scale_x,
    origin_y: y0 as f32 / scale_y,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn uniform_mask(value: f32, width: usize, height: usize) -> SoftMask {
    SoftMask {
      data: vec![value; width * height],
      width,
      height,
    }
  }

  fn bbox(x: f32, y: f32, width: f32, height: f32) -> BBox {
    BBox {
      x,
      y,
      width,
      height,
    }
  }

  #[test]
  fn uniform_foreground_binarizes_to_full_fragment() {
    // 原型 8x8，显示 32x32：缩放系数 0.25
    let mask = uniform_mask(0.9, 8, 8);
    let spaces = CoordinateSpaces::new((640, 640), (8, 8), (32, 32));

    let fragment = map_region(&mask, &bbox(8.0, 8.0, 8.0, 8.0), &spaces, 0).unwrap();
    assert_eq!(fragment.width, 8);
    assert_eq!(fragment.height, 8);
    assert_eq!(fragment.origin_x, 8.0);
    assert_eq!(fragment.origin_y, 8.0);
    assert!(fragment.data.iter().all(|&v| v == 255));
  }

  #[test]
  fn uniform_background_binarizes_to_empty_fragment() {
    let mask = uniform_mask(0.3, 8, 8);
    let spaces = CoordinateSpaces::new((640, 640), (8, 8), (32, 32));

    let fragment = map_region(&mask, &bbox(8.0, 8.0, 8.0, 8.0), &spaces, 0).unwrap();
    assert!(fragment.data.iter().all(|&v| v == 0));
  }

  #[test]
  fn zero_area_box_produces_no_fragment() {
    let mask = uniform_mask(0.9, 8, 8);
    let spaces = CoordinateSpaces::new((640, 640), (8, 8), (32, 32));
    assert!(map_region(&mask, &bbox(8.0, 8.0, 0.0, 8.0), &spaces, 2).is_none());
  }

  #[test]
  fn box_outside_grid_produces_no_fragment() {
    let mask = uniform_mask(0.9, 8, 8);
    let spaces = CoordinateSpaces::new((640, 640), (8, 8), (32, 32));
    // 完全位于显示面右下方之外
    assert!(map_region(&mask, &bbox(64.0, 64.0, 8.0, 8.0), &spaces, 0).is_none());
  }

  #[test]
  fn padding_is_clamped_to_grid_bounds() {
    let mask = uniform_mask(0.9, 8, 8);
    let spaces = CoordinateSpaces::new((640, 640), (8, 8), (32, 32));

    // 框贴着左上角，padding 超出部分被钳制
    let fragment = map_region(&mask, &bbox(0.0, 0.0, 8.0, 8.0), &spaces, 3).unwrap();
    assert_eq!(fragment.origin_x, 0.0);
    assert_eq!(fragment.origin_y, 0.0);
    assert_eq!(fragment.width, 20);
    assert_eq!(fragment.height, 20);
  }

  #[test]
  fn fragment_origin_tracks_crop_rect() {
    let mask = uniform_mask(0.9, 16, 16);
    let spaces = CoordinateSpaces::new((640, 640), (16, 16), (64, 64));

    let fragment = map_region(&mask, &bbox(16.0, 24.0, 16.0, 8.0), &spaces, 0).unwrap();
    // 裁剪区 [4,8) x [6,8)，映射回显示空间
    assert_eq!(fragment.origin_x, 16.0);
    assert_eq!(fragment.origin_y, 24.0);
    assert_eq!(fragment.width, 16);
    assert_eq!(fragment.height, 8);
  }
}

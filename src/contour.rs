// 该文件是 Haishao （海哨） 项目的一部分。
// src/contour.rs - 掩码碎片的外轮廓提取
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::{GrayImage, Luma};
use imageproc::{
  contours::{BorderType, find_contours},
  point::Point,
};
use tracing::debug;

use crate::mask::MaskFragment;

/// 显示面坐标系中的二维点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
  pub x: f32,
  pub y: f32,
}

/// 闭合多边形环，点序列首尾隐式相连
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
  pub points: Vec<Point2>,
}

/// 提取掩码碎片的外边界多边形。只追踪外轮廓，内孔不单独成环；
/// 相互分离的前景连通域各产生一个环。轮廓点经共线压缩后
/// 平移到显示面坐标（碎片局部坐标加原点偏移）。
pub fn extract_polygons(fragment: &MaskFragment) -> Vec<Polygon> {
  if fragment.width == 0 || fragment.height == 0 {
    return Vec::new();
  }
  if fragment.data.len() != (fragment.width * fragment.height) as usize {
    debug!("掩码碎片缓冲长度与尺寸不符，跳过轮廓提取");
    return Vec::new();
  }

  // 边界追踪不处理图像最外圈的行列，而碎片通常被裁剪到恰好贴边；
  // 先补一圈背景边，提取后再把坐标平移回碎片局部坐标系
  let mut padded = GrayImage::new(fragment.width + 2, fragment.height + 2);
  for y in 0..fragment.height {
    for x in 0..fragment.width {
      if fragment.data[(y * fragment.width + x) as usize] > 0 {
        padded.put_pixel(x + 1, y + 1, Luma([255u8]));
      }
    }
  }

  let polygons: Vec<Polygon> = find_contours::<i32>(&padded)
    .into_iter()
    .filter(|contour| contour.border_type == BorderType::Outer)
    .map(|contour| {
      let points = simplify_ring(&contour.points)
        .into_iter()
        .map(|p| Point2 {
          x: (p.x - 1) as f32 + fragment.origin_x,
          y: (p.y - 1) as f32 + fragment.origin_y,
        })
        .collect();
      Polygon { points }
    })
    .filter(|polygon| !polygon.points.is_empty())
    .collect();

  debug!("轮廓提取得到 {} 个多边形", polygons.len());
  polygons
}

/// 压缩闭合环上的共线段：相邻边界像素间为单位步进，
/// 仅保留前后步进方向发生变化的顶点
fn simplify_ring(points: &[Point<i32>]) -> Vec<Point<i32>> {
  let n = points.len();
  if n < 3 {
    return points.to_vec();
  }

  let mut simplified = Vec::new();
  for i in 0..n {
    let prev = points[(i + n - 1) % n];
    let cur = points[i];
    let next = points[(i + 1) % n];
    let step_in = (cur.x - prev.x, cur.y - prev.y);
    let step_out = (next.x - cur.x, next.y - cur.y);
    if step_in != step_out {
      simplified.push(cur);
    }
  }

  if simplified.is_empty() {
    // 理论上闭合环必有方向变化，保底保留首点
    simplified.push(points[0]);
  }
  simplified
}

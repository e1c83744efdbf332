// 该文件是 Haishao （海哨） 项目的一部分。
// src/output/draw.rs - 检测结果合成器
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::{FontArc, PxScale};
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
  drawing::{
    draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
    draw_text_mut,
  },
  point::Point,
  rect::Rect,
};
use thiserror::Error;

use crate::{
  contour::Polygon, decoder::BBox, labels::LabelTable, output::palette_color, pipeline::Instance,
};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 18.0;
const LABEL_TEXT_HEIGHT: i32 = 18;
const LABEL_CHAR_WIDTH: f32 = 10.0; // 每字符平均宽度（粗略估计）
const LABEL_HORIZONTAL_PADDING: u32 = 4;
const POLYGON_FILL_ALPHA: f32 = 0.4;
const TEXT_COLOR: [u8; 3] = [255, 255, 255]; // 白色文本

#[derive(Error, Debug)]
pub enum ComposeError {
  #[error("无法加载字体: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 把最终检测、多边形与标签表合成到显示图像上。
/// 绘制顺序：先所有检测的多边形，再在其上叠加边框与标签。
pub struct Compositor {
  font: FontArc,
  font_scale: PxScale,
}

impl Compositor {
  pub fn new(font: FontArc) -> Self {
    Self {
      font,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
    }
  }

  pub fn from_font_bytes(data: Vec<u8>) -> Result<Self, ComposeError> {
    Ok(Self::new(FontArc::try_from_vec(data)?))
  }

  pub fn compose(&self, image: &mut RgbImage, instances: &[Instance], labels: &LabelTable) {
    // 半透明填充与描边所有多边形
    for instance in instances {
      let color = palette_color(instance.detection.class_id);
      for polygon in &instance.polygons {
        fill_polygon(image, polygon, color, POLYGON_FILL_ALPHA);
        stroke_polygon(image, polygon, color);
      }
    }

    // 在多边形之上绘制边框与标签
    for instance in instances {
      let color = palette_color(instance.detection.class_id);
      self.draw_bbox(image, instance, color);
      self.draw_label(image, instance, labels, color);
    }
  }

  fn draw_bbox(&self, image: &mut RgbImage, instance: &Instance, color: Rgb<u8>) {
    let Some(rect) = clipped_rect(&instance.detection.bbox, image.width(), image.height()) else {
      return;
    };
    draw_hollow_rect_mut(image, rect, color);

    // 绘制第二个边框以增加可见度
    if rect.width() > 2 && rect.height() > 2 {
      let inner =
        Rect::at(rect.left() + 1, rect.top() + 1).of_size(rect.width() - 2, rect.height() - 2);
      draw_hollow_rect_mut(image, inner, color);
    }
  }

  fn draw_label(
    &self,
    image: &mut RgbImage,
    instance: &Instance,
    labels: &LabelTable,
    color: Rgb<u8>,
  ) {
    let detection = &instance.detection;
    let text = format!(
      "{} {:.1}%",
      labels.name(detection.class_id),
      detection.score * 100.0
    );

    // 估算文本宽度（粗略估计）
    let text_width = (text.len() as f32 * LABEL_CHAR_WIDTH) as u32;
    let label_x = (detection.bbox.x.max(0.0)) as i32;
    // 标签背景位于边框上方，顶到图像边缘时下移到框内
    let label_y = ((detection.bbox.y as i32) - LABEL_TEXT_HEIGHT).max(0);

    let bg_width = (text_width + LABEL_HORIZONTAL_PADDING)
      .min(image.width().saturating_sub(label_x as u32));
    if bg_width == 0 {
      return;
    }

    let rect = Rect::at(label_x, label_y).of_size(bg_width, LABEL_TEXT_HEIGHT as u32);
    draw_filled_rect_mut(image, rect, color);
    draw_text_mut(
      image,
      Rgb(TEXT_COLOR),
      label_x + 2,
      label_y,
      self.font_scale,
      &self.font,
      &text,
    );
  }
}

/// 把检测框裁剪到图像范围内：左上与右下两条边各自钳制，
/// 超出部分被裁掉而不是平移到对侧
fn clipped_rect(bbox: &BBox, width: u32, height: u32) -> Option<Rect> {
  let x0 = bbox.x.max(0.0) as i32;
  let y0 = bbox.y.max(0.0) as i32;
  let x1 = (bbox.x + bbox.width).min(width as f32) as i32;
  let y1 = (bbox.y + bbox.height).min(height as f32) as i32;

  if x1 <= x0 || y1 <= y0 {
    return None;
  }
  Some(Rect::at(x0, y0).of_size((x1 - x0) as u32, (y1 - y0) as u32))
}

/// 多边形环转为去重后的整数点序列，供栅格化使用
fn rounded_ring(polygon: &Polygon) -> Vec<Point<i32>> {
  let mut ring: Vec<Point<i32>> = Vec::with_capacity(polygon.points.len());
  for p in &polygon.points {
    let point = Point::new(p.x.round() as i32, p.y.round() as i32);
    if ring.last() != Some(&point) {
      ring.push(point);
    }
  }
  // 栅格化要求首尾不重合
  if ring.len() > 1 && ring.first() == ring.last() {
    ring.pop();
  }
  ring
}

fn fill_polygon(image: &mut RgbImage, polygon: &Polygon, color: Rgb<u8>, alpha: f32) {
  let ring = rounded_ring(polygon);
  if ring.len() < 3 {
    return;
  }

  // 先在模板上栅格化多边形，再按透明度混入图像
  let mut stencil = GrayImage::new(image.width(), image.height());
  draw_polygon_mut(&mut stencil, &ring, Luma([255u8]));

  for (x, y, pixel) in stencil.enumerate_pixels() {
    if pixel.0[0] > 0 {
      let dst = image.get_pixel_mut(x, y);
      for c in 0..3 {
        dst.0[c] = ((dst.0[c] as f32) * (1.0 - alpha) + (color.0[c] as f32) * alpha) as u8;
      }
    }
  }
}

fn stroke_polygon(image: &mut RgbImage, polygon: &Polygon, color: Rgb<u8>) {
  let ring = rounded_ring(polygon);
  if ring.len() < 2 {
    return;
  }

  for i in 0..ring.len() {
    let a = ring[i];
    let b = ring[(i + 1) % ring.len()];
    draw_line_segment_mut(
      image,
      (a.x as f32, a.y as f32),
      (b.x as f32, b.y as f32),
      color,
    );
  }
}

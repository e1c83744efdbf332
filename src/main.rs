// 该文件是 Haishao （海哨） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};

use haishao::{
  config::{CoordinateSpaces, DEFAULT_MASK_PADDING, PipelineConfig},
  labels::LabelTable,
  output::Compositor,
  pipeline::SegPipeline,
  tensor::{PrototypeBank, RawDetectionTensor},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("源图像: {}", args.image.display());
  info!("检测张量: {}", args.detections.display());
  info!("置信度阈值: {}", args.score_threshold);
  info!("IOU 阈值: {}", args.iou_threshold);

  // 读取源图像，其尺寸即显示面尺寸
  let mut image = image::open(&args.image)
    .with_context(|| format!("无法读取源图像: {}", args.image.display()))?
    .to_rgb8();
  info!("显示面尺寸: {}x{}", image.width(), image.height());

  // 读取检测张量，锚点数量由缓冲区长度推导
  let det_data = read_f32_file(&args.detections)?;
  let channels = 4 + args.num_classes + args.mask_channels;
  if det_data.len() % channels != 0 {
    bail!(
      "检测张量长度 {} 不能被通道数 {} 整除",
      det_data.len(),
      channels
    );
  }
  let num_anchors = det_data.len() / channels;
  info!("锚点数量: {}", num_anchors);

  let tensor =
    RawDetectionTensor::new(&det_data, num_anchors, args.num_classes, args.mask_channels)?;

  // 原型张量可选，缺省时降级为仅框输出
  let proto_data = match &args.protos {
    Some(path) => Some(read_f32_file(path)?),
    None => {
      warn!("未提供原型张量，掩码阶段将被跳过");
      None
    }
  };
  let bank = match proto_data.as_deref() {
    Some(data) => Some(PrototypeBank::new(
      data,
      args.mask_channels,
      args.proto_height as usize,
      args.proto_width as usize,
    )?),
    None => None,
  };

  // 标签表
  let labels = match &args.labels {
    Some(path) => LabelTable::from_json_file(path)
      .with_context(|| format!("无法加载标签文件: {}", path.display()))?,
    None => LabelTable::numeric(args.num_classes),
  };

  // 每帧构造一次坐标空间，贯穿所有阶段
  let spaces = CoordinateSpaces::new(
    (args.model_width, args.model_height),
    (args.proto_width, args.proto_height),
    (image.width(), image.height()),
  );

  let pipeline = SegPipeline::new(PipelineConfig {
    score_threshold: args.score_threshold,
    iou_threshold: args.iou_threshold,
    max_results: (args.topk > 0).then_some(args.topk),
    mask_padding: DEFAULT_MASK_PADDING,
  });

  info!("开始后处理...");
  let now = std::time::Instant::now();
  let instances = pipeline.process_frame(&tensor, bank.as_ref(), &spaces)?;
  info!("后处理完成，耗时: {:.2?}", now.elapsed());

  for instance in &instances {
    let det = &instance.detection;
    info!(
      "  - {}: {:.1}% at ({:.0}, {:.0}, {:.0}x{:.0}), {} 个多边形",
      labels.name(det.class_id),
      det.score * 100.0,
      det.bbox.x,
      det.bbox.y,
      det.bbox.width,
      det.bbox.height,
      instance.polygons.len()
    );
  }

  // 合成叠加图并保存
  let font_data =
    std::fs::read(&args.font).with_context(|| format!("无法读取字体文件: {}", args.font.display()))?;
  let compositor = Compositor::from_font_bytes(font_data)?;
  compositor.compose(&mut image, &instances, &labels);

  image
    .save(&args.output)
    .with_context(|| format!("无法保存图片: {}", args.output.display()))?;
  info!("叠加结果已保存: {}", args.output.display());

  Ok(())
}

/// 读取小端 f32 原始转储文件
fn read_f32_file(path: &Path) -> Result<Vec<f32>> {
  let bytes =
    std::fs::read(path).with_context(|| format!("无法读取张量文件: {}", path.display()))?;
  if bytes.len() % 4 != 0 {
    bail!("张量文件 {} 的字节数 {} 不是 4 的倍数", path.display(), bytes.len());
  }

  let mut values = Vec::with_capacity(bytes.len() / 4);
  for chunk in bytes.chunks_exact(4) {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(chunk);
    values.push(f32::from_le_bytes(buf));
  }
  Ok(values)
}

// 该文件是 Haishao （海哨） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::Parser;

use haishao::config;

/// Haishao 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 源图像文件路径（显示面尺寸取自该图像）
  #[arg(long, value_name = "FILE")]
  pub image: PathBuf,

  /// 检测输出张量转储文件
  /// 小端 f32 原始数据，通道优先布局 [4 + 类别数 + 掩码通道数][锚点数]
  #[arg(long, value_name = "FILE")]
  pub detections: PathBuf,

  /// 原型张量转储文件（小端 f32, [掩码通道数][原型高][原型宽]）
  /// 缺省时跳过掩码阶段，仅绘制检测框与标签
  #[arg(long, value_name = "FILE")]
  pub protos: Option<PathBuf>,

  /// 标签文件（JSON 字符串数组），缺省时使用数字标签
  #[arg(long, value_name = "FILE")]
  pub labels: Option<PathBuf>,

  /// 叠加结果输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: PathBuf,

  /// 标签字体文件路径
  #[arg(
    long,
    value_name = "FILE",
    default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
  )]
  pub font: PathBuf,

  /// 类别数量
  #[arg(long, default_value = "3", value_name = "COUNT")]
  pub num_classes: usize,

  /// 掩码通道数
  #[arg(long, default_value_t = config::MASK_CHANNELS, value_name = "COUNT")]
  pub mask_channels: usize,

  /// 模型输入宽度
  #[arg(long, default_value_t = config::DEFAULT_MODEL_WIDTH, value_name = "PIXELS")]
  pub model_width: u32,

  /// 模型输入高度
  #[arg(long, default_value_t = config::DEFAULT_MODEL_HEIGHT, value_name = "PIXELS")]
  pub model_height: u32,

  /// 原型网格宽度
  #[arg(long, default_value_t = config::PROTO_WIDTH as u32, value_name = "PIXELS")]
  pub proto_width: u32,

  /// 原型网格高度
  #[arg(long, default_value_t = config::PROTO_HEIGHT as u32, value_name = "PIXELS")]
  pub proto_height: u32,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = config::DEFAULT_SCORE_THRESH, value_name = "THRESHOLD")]
  pub score_threshold: f32,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = config::DEFAULT_IOU_THRESH, value_name = "THRESHOLD")]
  pub iou_threshold: f32,

  /// NMS 后保留的最大检测数量（0 表示不截断）
  #[arg(long, default_value_t = config::DEFAULT_MAX_RESULTS, value_name = "COUNT")]
  pub topk: usize,
}

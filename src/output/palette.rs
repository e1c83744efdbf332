// 该文件是 Haishao （海哨） 项目的一部分。
// src/output/palette.rs - 类别配色
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use image::Rgb;

/// 固定小色板，类别索引对色板长度取模
pub const PALETTE: [[u8; 3]; 6] = [
  [0xFF, 0x38, 0x38],
  [0xFF, 0x9D, 0x97],
  [0xFF, 0x70, 0x1F],
  [0xFF, 0xB2, 0x1D],
  [0xCF, 0xD2, 0x31],
  [0x48, 0xF9, 0x0A],
];

/// 无状态的类别取色函数，可安全并发调用
pub fn palette_color(class_id: usize) -> Rgb<u8> {
  Rgb(PALETTE[class_id % PALETTE.len()])
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn palette_wraps_around() {
    assert_eq!(palette_color(0), palette_color(6));
    assert_eq!(palette_color(1), palette_color(7));
    assert_eq!(palette_color(5).0, [0x48, 0xF9, 0x0A]);
  }
}

// 该文件是 Haishao （海哨） 项目的一部分。
// src/labels.rs - 类别标签表
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

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("无法读取标签文件: {0}")]
  Io(#[from] std::io::Error),
  #[error("标签文件解析失败: {0}")]
  Parse(#[from] serde_json::Error),
}

/// 类别索引到可读名称的只读映射，由外部提供，流水线只查询不构造
#[derive(Debug, Clone)]
pub struct LabelTable {
  names: Box<[String]>,
}

impl LabelTable {
  pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
    Self {
      names: names.into_iter().map(Into::into).collect(),
    }
  }

  /// 生成数字标签 "class 0", "class 1", ...，标签文件缺失时的替补
  pub fn numeric(count: usize) -> Self {
    Self::from_names((0..count).map(|i| format!("class {}", i)))
  }

  /// 从 JSON 字符串数组解析，如 ["buoy", "net", "debris"]
  pub fn from_json_str(json: &str) -> Result<Self, LabelError> {
    let names: Vec<String> = serde_json::from_str(json)?;
    Ok(Self::from_names(names))
  }

  pub fn from_json_file(path: &Path) -> Result<Self, LabelError> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json_str(&json)
  }

  pub fn name(&self, class_id: usize) -> &str {
    self
      .names
      .get(class_id)
      .map(String::as_str)
      .unwrap_or("unknown")
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_json_string_array() {
    let table = LabelTable::from_json_str(r#"["buoy", "net", "debris"]"#).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.name(0), "buoy");
    assert_eq!(table.name(2), "debris");
  }

  #[test]
  fn out_of_range_id_falls_back_to_unknown() {
    let table = LabelTable::from_names(["buoy"]);
    assert_eq!(table.name(5), "unknown");
  }

  #[test]
  fn numeric_table_generates_indexed_names() {
    let table = LabelTable::numeric(2);
    assert_eq!(table.name(0), "class 0");
    assert_eq!(table.name(1), "class 1");
  }

  #[test]
  fn invalid_json_is_rejected() {
    assert!(matches!(
      LabelTable::from_json_str("{\"a\": 1}"),
      Err(LabelError::Parse(_))
    ));
  }
}

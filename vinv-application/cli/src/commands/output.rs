//! CLI 通用输出格式化模块
//!
//! 提供 table/json/yaml 三种输出格式的通用实现

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;

use crate::config::OutputFormat;

/// 列间距
const COLUMN_PADDING: usize = 2;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 渲染对齐的文本表格
///
/// 每列宽度为该列最宽单元格加两个空格，表头下方绘制分隔线。
pub fn render_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        let line: String = cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let pad = widths[i] + COLUMN_PADDING - c.chars().count();
                format!("{}{}", c, " ".repeat(pad))
            })
            .collect();
        line.trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&format_line(headers.iter().map(|h| h.as_ref()).collect()));
    out.push('\n');
    let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_line(underline.iter().map(String::as_str).collect()));
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

/// 表格格式输出
pub fn print_table<T: TableRow>(items: &[&T]) {
    let rows: Vec<Vec<String>> = items.iter().map(|item| item.row()).collect();
    print!("{}", render_table(&T::headers(), &rows));
}

/// JSON 格式输出
pub fn print_json<T: Serialize>(items: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

/// YAML 格式输出
pub fn print_yaml<T: Serialize>(items: &[T]) -> Result<()> {
    print!("{}", serde_yaml::to_string(items)?);
    Ok(())
}

/// 无记录提示
pub fn print_empty() {
    println!("{}", "没有找到任何记录".yellow());
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(
    items: &[T],
    format: OutputFormat,
    filter: Option<&dyn Fn(&T) -> bool>,
) -> Result<()> {
    let filtered: Vec<&T> = match filter {
        Some(f) => items.iter().filter(|i| f(i)).collect(),
        None => items.iter().collect(),
    };

    match format {
        OutputFormat::Json => print_json(&filtered)?,
        OutputFormat::Yaml => print_yaml(&filtered)?,
        OutputFormat::Table if filtered.is_empty() => print_empty(),
        OutputFormat::Table => print_table(&filtered),
    }
    Ok(())
}

/// 可读的字节大小 (KB/MB/GB/TB，保留一位小数)
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value.abs() >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// 可选值单元格，缺失时显示 `-`
pub fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

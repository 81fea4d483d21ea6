// Demonstration inputs covering every classification path.

use std::path::{Path, PathBuf};

use crate::csv::write_rows;

pub const BASE_FILE: &str = "sample_base.csv";
pub const A_FILE: &str = "sample_a.csv";
pub const B_FILE: &str = "sample_b.csv";
pub const TABLE_A_FILE: &str = "sample_table_a.csv";
pub const TABLE_B_FILE: &str = "sample_table_b.csv";

/// Baseline metric names, one per scenario.
const METRICS: &[&str] = &[
    "正常_完全相同",
    "正常_小差异_0.5%",
    "正常_临界_1%",
    "正常_中等_5%",
    "正常_较大_50%",
    "正常_超大_150%",
    "特殊_B为零",
    "特殊_负数",
    "缺失_A无数据",
    "缺失_B无数据",
    "缺失_都无数据",
];

/// Source A omits "缺失_B无数据" entirely; "缺失_A无数据" is present but blank.
const A_VALUES: &[(&str, &str)] = &[
    ("正常_完全相同", "1000000"),
    ("正常_小差异_0.5%", "1005000"),
    ("正常_临界_1%", "1010000"),
    ("正常_中等_5%", "1050000"),
    ("正常_较大_50%", "1500000"),
    ("正常_超大_150%", "2500000"),
    ("特殊_B为零", "100"),
    ("特殊_负数", "-500"),
    ("缺失_A无数据", ""),
    ("缺失_都无数据", ""),
];

/// Header spellings differ from the baseline to exercise fuzzy lookup.
const B_VALUES: &[(&str, &str)] = &[
    ("正常 完全相同", "1,000,000"),
    ("正常_小差异_0.5%", "1000000"),
    ("正常_临界_1%", "1000000"),
    ("正常_中等_5%", "1000000"),
    ("正常_较大_50%", "1000000"),
    ("正常_超大_150%", "1000000"),
    ("特殊_B为零", "0"),
    ("特殊_负数", "-400"),
    ("缺失_B无数据", "null"),
    ("缺失_都无数据", "#VALUE!"),
];

const TABLE_A: &[&[&str]] = &[
    &["地区", "类型", "收入", "成本", "利润"],
    &["华东_A", "零售", "1000", "600", "400"],
    &["华北(B)", "批发", "2000", "1500", "500"],
    &["华南", "零售", "3000", "", "900"],
    &["西南", "零售", "100", "80", "20"],
    // overwritten by the later 华东A row
    &["华东A", "零售", "999", "600", "399"],
    &["华东A", "零售", "1000.004", "600", "400"],
];

const TABLE_B: &[&[&str]] = &[
    &["地区", "类型", "收入", "成本", "税额"],
    &["华东 A", "零售", "1000", "600", "40"],
    &["华北【B】", "批发", "2100", "1500", "60"],
    &["华南", "零售", "3000", "2100", "90"],
    &["东北", "批发", "500", "400", "10"],
];

/// Write the five sample files into `dir`, returning their paths.
pub fn write_sample(dir: &Path) -> Result<Vec<PathBuf>, String> {
    if !dir.is_dir() {
        return Err(format!("{} is not a directory", dir.display()));
    }

    let mut written = Vec::new();
    let mut emit = |name: &str, rows: Vec<Vec<String>>| -> Result<(), String> {
        let path = dir.join(name);
        write_rows(&path, &rows)?;
        log::info!("wrote {}", path.display());
        written.push(path);
        Ok(())
    };

    let mut base = vec![vec!["指标名称".to_string()]];
    base.extend(METRICS.iter().map(|m| vec![m.to_string()]));
    emit(BASE_FILE, base)?;

    emit(A_FILE, horizontal(A_VALUES))?;
    emit(B_FILE, horizontal(B_VALUES))?;
    emit(TABLE_A_FILE, owned(TABLE_A))?;
    emit(TABLE_B_FILE, owned(TABLE_B))?;

    Ok(written)
}

fn horizontal(pairs: &[(&str, &str)]) -> Vec<Vec<String>> {
    vec![
        pairs.iter().map(|(k, _)| k.to_string()).collect(),
        pairs.iter().map(|(_, v)| v.to_string()).collect(),
    ]
}

fn owned(rows: &[&[&str]]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

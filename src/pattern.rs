//! 파일 필터 모듈
//!
//! 폴더 모드에서 변환할 파일을 확장자와 glob 패턴으로 골라냅니다.

use glob::Pattern;
use std::path::Path;

use crate::error::{ConvertError, Result};

/// 기본 허용 확장자
pub const DEFAULT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];

/// 확장자 + 파일 이름 패턴 필터
pub struct FileFilter {
    pattern: Option<Pattern>,
    extensions: Vec<String>,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            pattern: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl FileFilter {
    /// 새 필터 생성
    ///
    /// # Arguments
    /// * `pattern` - 파일 이름에 적용할 glob 패턴 (None이면 확장자만 검사)
    ///
    /// # Examples
    /// ```
    /// use csv2json::pattern::FileFilter;
    /// use std::path::Path;
    ///
    /// let filter = FileFilter::new(Some("sales_*".to_string())).unwrap();
    /// assert!(filter.matches(Path::new("data/sales_2024.csv")));
    /// assert!(!filter.matches(Path::new("data/sales_2024.json")));
    /// assert!(!filter.matches(Path::new("data/users.csv")));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| ConvertError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self {
            pattern: compiled,
            ..Self::default()
        })
    }

    /// 허용 확장자 교체 (대소문자 무시)
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_ascii_lowercase()).collect();
        self
    }

    /// 경로가 변환 대상인지 확인
    pub fn matches(&self, path: &Path) -> bool {
        let extension_ok = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false);

        if !extension_ok {
            return false;
        }

        match &self.pattern {
            Some(p) => path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|name| p.matches(name))
                .unwrap_or(false),
            None => true,
        }
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_extensions() {
        let filter = FileFilter::new(None).unwrap();
        assert!(filter.matches(Path::new("a.csv")));
        assert!(filter.matches(Path::new("a.CSV")));
        assert!(filter.matches(Path::new("a.tsv")));
        assert!(filter.matches(Path::new("a.txt")));
        assert!(!filter.matches(Path::new("a.json")));
        assert!(!filter.matches(Path::new("noext")));
    }

    #[test]
    fn test_pattern_on_file_name() {
        let filter = FileFilter::new(Some("report_[0-9]*".to_string())).unwrap();
        assert!(filter.matches(Path::new("dir/report_1.csv")));
        assert!(filter.matches(Path::new("report_2024_q1.csv")));
        assert!(!filter.matches(Path::new("report_x.csv")));
    }

    #[test]
    fn test_custom_extensions() {
        let filter = FileFilter::new(None).unwrap().with_extensions(&["CSV"]);
        assert!(filter.matches(Path::new("a.csv")));
        assert!(!filter.matches(Path::new("a.tsv")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = FileFilter::new(Some("[invalid".to_string()));
        assert!(matches!(result, Err(ConvertError::InvalidPattern { .. })));
    }

    #[test]
    fn test_has_pattern() {
        assert!(FileFilter::new(Some("*.csv".to_string())).unwrap().has_pattern());
        assert!(!FileFilter::new(None).unwrap().has_pattern());
    }
}

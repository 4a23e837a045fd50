//! 통계 및 유틸리티 모듈
//!
//! 폴더 모드 처리 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::converter::ConversionResult;

/// 처리 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    /// 성공 처리 수
    pub success_count: AtomicUsize,
    /// 에러 발생 수
    pub error_count: AtomicUsize,
    /// 데이터 행이 없던 파일 수
    pub empty_count: AtomicUsize,
    /// 변환된 총 레코드 수
    pub record_count: AtomicU64,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 파일 하나의 변환 결과 반영
    pub fn record(&self, result: &ConversionResult) {
        self.total_bytes_read
            .fetch_add(result.bytes_read, Ordering::Relaxed);

        if !result.is_success() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.success_count.fetch_add(1, Ordering::Relaxed);
        if result.is_empty() {
            self.empty_count.fetch_add(1, Ordering::Relaxed);
        }
        self.record_count
            .fetch_add(result.record_count as u64, Ordering::Relaxed);
        self.total_bytes_written
            .fetch_add(result.bytes_written, Ordering::Relaxed);
    }

    /// 성공 수 반환
    pub fn get_success_count(&self) -> usize {
        self.success_count.load(Ordering::Relaxed)
    }

    /// 에러 수 반환
    pub fn get_error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// 빈 파일 수 반환
    pub fn get_empty_count(&self) -> usize {
        self.empty_count.load(Ordering::Relaxed)
    }

    /// 레코드 수 반환
    pub fn get_record_count(&self) -> u64 {
        self.record_count.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 현재 카운터 값을 한 번에 읽은 스냅샷
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            total: self.total_files,
            success: self.get_success_count(),
            errors: self.get_error_count(),
            empty: self.get_empty_count(),
            records: self.get_record_count(),
            bytes_read: self.total_bytes_read.load(Ordering::Relaxed),
            bytes_written: self.total_bytes_written.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }

    /// 처리 통계 요약 출력
    pub fn print_summary(&self) {
        let rule = "─".repeat(46);

        println!("\n{}", rule.bright_blue());
        println!("{}", " 📊 변환 결과".bright_white().bold());
        println!("{}", rule.bright_blue());
        for row in self.snapshot().rows() {
            println!("  {:<10} {}", row.label, row.colored());
        }
        println!("{}", rule.bright_blue());
    }
}

/// 특정 시점의 통계 값
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub empty: usize,
    pub records: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// 요약 표의 한 줄
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub value: String,
    tone: Tone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tone {
    Plain,
    Good,
    Bad,
    Warn,
}

impl SummaryRow {
    fn new(label: &'static str, value: impl ToString, tone: Tone) -> Self {
        Self {
            label,
            value: value.to_string(),
            tone,
        }
    }

    fn colored(&self) -> colored::ColoredString {
        match self.tone {
            Tone::Plain => self.value.normal(),
            Tone::Good => self.value.green(),
            Tone::Bad => self.value.red().bold(),
            Tone::Warn => self.value.yellow(),
        }
    }
}

impl Snapshot {
    /// 요약 표에 들어갈 줄 목록
    ///
    /// 실패/빈 파일 줄은 해당 값이 있을 때만 포함됩니다.
    pub fn rows(&self) -> Vec<SummaryRow> {
        let mut rows = vec![
            SummaryRow::new("파일", self.total, Tone::Plain),
            SummaryRow::new("성공", self.success, Tone::Good),
        ];
        if self.errors > 0 {
            rows.push(SummaryRow::new("실패", self.errors, Tone::Bad));
        }
        if self.empty > 0 {
            rows.push(SummaryRow::new("빈 결과", self.empty, Tone::Warn));
        }
        rows.push(SummaryRow::new("레코드", self.records, Tone::Plain));
        rows.push(SummaryRow::new(
            "읽기/쓰기",
            format!("{} → {}", format_bytes(self.bytes_read), format_bytes(self.bytes_written)),
            Tone::Plain,
        ));
        rows.push(SummaryRow::new("소요 시간", format_duration(self.elapsed), Tone::Plain));
        rows
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use csv2json::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit + 1 < UNITS.len() {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    match duration.as_secs() {
        0 => format!("{}ms", duration.as_millis()),
        s @ 1..=59 => format!("{}.{:03}초", s, duration.subsec_millis()),
        s @ 60..=3599 => format!("{}분 {}초", s / 60, s % 60),
        s => format!("{}시간 {}분", s / 3600, s % 3600 / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ConversionJob;
    use crate::converter::{convert_file, ConvertOptions};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
        assert_eq!(format_bytes(1u64 << 50), "1024.00 TB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_record_results() {
        let temp_dir = TempDir::new().unwrap();
        let full = temp_dir.path().join("full.csv");
        let empty = temp_dir.path().join("empty.csv");
        fs::write(&full, "a,b\n1,2\n3,4\n").unwrap();
        fs::write(&empty, "a,b\n").unwrap();

        let options = ConvertOptions::new();
        let stats = Statistics::new(3);
        stats.record(&convert_file(&ConversionJob::new(full, None), &options));
        stats.record(&convert_file(&ConversionJob::new(empty, None), &options));
        stats.record(&convert_file(
            &ConversionJob::new(temp_dir.path().join("nope.csv"), None),
            &options,
        ));

        assert_eq!(stats.get_success_count(), 2);
        assert_eq!(stats.get_error_count(), 1);
        assert_eq!(stats.get_empty_count(), 1);
        assert_eq!(stats.get_record_count(), 2);
        assert!(stats.total_bytes_written.load(Ordering::Relaxed) > 0);

        let labels: Vec<&str> = stats.snapshot().rows().iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec!["파일", "성공", "실패", "빈 결과", "레코드", "읽기/쓰기", "소요 시간"]
        );
    }

    #[test]
    fn test_rows_skip_zero_failures() {
        let snapshot = Snapshot {
            total: 2,
            success: 2,
            errors: 0,
            empty: 0,
            records: 7,
            bytes_read: 2048,
            bytes_written: 100,
            elapsed: Duration::from_millis(40),
        };

        let rows = snapshot.rows();
        assert!(rows.iter().all(|r| r.label != "실패" && r.label != "빈 결과"));
        let io = rows.iter().find(|r| r.label == "읽기/쓰기").unwrap();
        assert_eq!(io.value, "2.00 KB → 100 B");
    }
}

//! 일괄 변환 모듈
//!
//! 입력/출력 경로 쌍(`ConversionJob`) 목록을 받아 파일별로 독립 변환합니다.
//! 한 파일의 실패는 나머지 파일 처리에 영향을 주지 않습니다.

use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::converter::{convert_file, ConversionResult, ConvertOptions};
use crate::pattern::FileFilter;

/// 입력/출력 경로 쌍
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ConversionJob {
    /// 출력 경로가 없으면 입력 경로에서 기본 경로를 만듭니다.
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        let input = input.into();
        let output = output.unwrap_or_else(|| default_output_path(&input));
        Self { input, output }
    }
}

/// 입력 경로의 확장자를 `.json`으로 바꾼 기본 출력 경로
///
/// 입력이 이미 `.json`이면 `<이름>.converted.json`을 사용합니다.
///
/// # Examples
/// ```
/// use csv2json::batch::default_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(default_output_path(Path::new("data/users.csv")), PathBuf::from("data/users.json"));
/// assert_eq!(default_output_path(Path::new("users")), PathBuf::from("users.json"));
/// ```
pub fn default_output_path(input: &Path) -> PathBuf {
    let output = input.with_extension("json");
    if output != input {
        return output;
    }

    let mut name = input.file_stem().map(OsString::from).unwrap_or_default();
    name.push(".converted.json");
    input.with_file_name(name)
}

/// 폴더에서 변환 대상 파일 수집 (경로순 정렬)
pub fn collect_csv_files(root: &Path, filter: &FileFilter, max_depth: Option<usize>) -> Vec<PathBuf> {
    let walker = match max_depth {
        Some(depth) => WalkDir::new(root).max_depth(depth),
        None => WalkDir::new(root),
    };

    walker
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| filter.matches(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// 수집된 파일마다 출력 경로 결정
///
/// `output_dir`이 있으면 `root` 기준 상대 경로를 그 아래에 그대로 재현하고,
/// 없으면 입력 파일 옆에 `.json` 파일을 둡니다.
/// `data.csv`와 `data.tsv`처럼 출력이 겹치면 뒤의 파일은 `data.tsv.json`이 됩니다.
pub fn plan_jobs(root: &Path, files: Vec<PathBuf>, output_dir: Option<&Path>) -> Vec<ConversionJob> {
    let mut taken = HashSet::new();

    files
        .into_iter()
        .map(|input| {
            let target = match output_dir {
                Some(dir) => dir.join(input.strip_prefix(root).unwrap_or(&input)),
                None => input.clone(),
            };
            let output = unique_output(&target, &mut taken);
            ConversionJob { input, output }
        })
        .collect()
}

/// 이미 배정된 경로와 겹치지 않는 출력 경로 선택
fn unique_output(target: &Path, taken: &mut HashSet<PathBuf>) -> PathBuf {
    let mut output = default_output_path(target);

    // 원래 확장자를 남겨 구분, 그래도 겹치면 번호 추가
    let name = target.file_name().map(OsString::from).unwrap_or_default();
    let mut n = 1;
    while taken.contains(&output) {
        let mut candidate = name.clone();
        if n > 1 {
            candidate.push(format!(".{}", n));
        }
        candidate.push(".json");
        output = target.with_file_name(candidate);
        n += 1;
    }

    taken.insert(output.clone());
    output
}

/// 모든 작업을 변환하고 작업 순서대로 결과 반환
///
/// 파일끼리는 서로 독립적이므로 병렬로 처리합니다.
/// `on_done`은 각 파일이 끝날 때마다 호출됩니다 (진행률 표시용).
pub fn run_batch<F>(jobs: &[ConversionJob], options: &ConvertOptions, on_done: F) -> Vec<ConversionResult>
where
    F: Fn(&ConversionResult) + Sync,
{
    jobs.par_iter()
        .map(|job| {
            let result = convert_file(job, options);
            on_done(&result);
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn create_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/a.csv")),
            PathBuf::from("/tmp/a.json")
        );
        assert_eq!(
            default_output_path(Path::new("a.json")),
            PathBuf::from("a.converted.json")
        );
    }

    #[test]
    fn test_job_new() {
        let job = ConversionJob::new("in.csv", None);
        assert_eq!(job.output, PathBuf::from("in.json"));

        let job = ConversionJob::new("in.csv", Some(PathBuf::from("x/out.json")));
        assert_eq!(job.output, PathBuf::from("x/out.json"));
    }

    #[test]
    fn test_collect_and_plan() {
        let temp_dir = TempDir::new().unwrap();
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        create_csv(temp_dir.path(), "b.csv", "a,b\n1,2\n");
        create_csv(temp_dir.path(), "a.csv", "a,b\n1,2\n");
        create_csv(temp_dir.path(), "skip.json", "[]");
        create_csv(&sub, "c.csv", "a,b\n1,2\n");

        let filter = FileFilter::new(None).unwrap();
        let files = collect_csv_files(temp_dir.path(), &filter, Some(1));
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);

        let all = collect_csv_files(temp_dir.path(), &filter, None);
        assert_eq!(all.len(), 3);

        let out_dir = temp_dir.path().join("out");
        let jobs = plan_jobs(temp_dir.path(), all, Some(&out_dir));
        assert!(jobs.iter().any(|j| j.output == out_dir.join("sub").join("c.json")));
        assert!(jobs.iter().any(|j| j.output == out_dir.join("a.json")));
    }

    #[test]
    fn test_plan_keeps_outputs_distinct() {
        let root = Path::new("/data");
        let files = vec![
            root.join("data.csv"),
            root.join("data.tsv"),
            root.join("data.txt"),
            root.join("other.csv"),
        ];

        let jobs = plan_jobs(root, files, None);
        let outputs: Vec<PathBuf> = jobs.iter().map(|j| j.output.clone()).collect();
        assert_eq!(
            outputs,
            vec![
                root.join("data.json"),
                root.join("data.tsv.json"),
                root.join("data.txt.json"),
                root.join("other.json"),
            ]
        );

        // 출력 폴더 쪽에서도 동일
        let out = Path::new("/out");
        let jobs = plan_jobs(root, vec![root.join("a.csv"), root.join("a.tsv")], Some(out));
        assert_eq!(jobs[0].output, out.join("a.json"));
        assert_eq!(jobs[1].output, out.join("a.tsv.json"));
    }

    #[test]
    fn test_plan_numbers_repeated_collisions() {
        let root = Path::new("/data");
        // "x.tsv"의 두 후보가 모두 앞 파일들에 배정됨
        let files = vec![root.join("x.csv"), root.join("x.tsv.csv"), root.join("x.tsv")];
        let jobs = plan_jobs(root, files, None);
        assert_eq!(jobs[0].output, root.join("x.json"));
        assert_eq!(jobs[1].output, root.join("x.tsv.json"));
        assert_eq!(jobs[2].output, root.join("x.tsv.2.json"));
    }

    #[test]
    fn test_same_stem_files_both_written() {
        let temp_dir = TempDir::new().unwrap();
        create_csv(temp_dir.path(), "data.csv", "id,name\n1,kim\n");
        create_csv(temp_dir.path(), "data.tsv", "id\tcity\n2\tSeoul\n");

        let filter = FileFilter::new(None).unwrap();
        let files = collect_csv_files(temp_dir.path(), &filter, None);
        let jobs = plan_jobs(temp_dir.path(), files, None);
        let results = run_batch(&jobs, &ConvertOptions::new(), |_| {});

        assert!(results.iter().all(|r| r.is_success()));
        let csv_json = fs::read_to_string(temp_dir.path().join("data.json")).unwrap();
        let tsv_json = fs::read_to_string(temp_dir.path().join("data.tsv.json")).unwrap();
        assert!(csv_json.contains("\"name\": \"kim\""));
        assert!(tsv_json.contains("\"city\": \"Seoul\""));
    }

    #[test]
    fn test_run_batch_is_fail_soft() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_csv(temp_dir.path(), "good.csv", "name,age\nkim,30\n");
        let missing = temp_dir.path().join("missing.csv");
        let other = create_csv(temp_dir.path(), "other.csv", "x;y\n1;2\n3;4\n");

        let jobs = vec![
            ConversionJob::new(good, None),
            ConversionJob::new(missing, None),
            ConversionJob::new(other, None),
        ];

        let done = AtomicUsize::new(0);
        let results = run_batch(&jobs, &ConvertOptions::new(), |_| {
            done.fetch_add(1, Ordering::Relaxed);
        });

        assert_eq!(done.load(Ordering::Relaxed), 3);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert_eq!(
            results[1].error_kind(),
            Some(crate::error::ErrorKind::NotFound)
        );
        assert!(results[2].is_success());
        assert_eq!(results[2].record_count, 2);
        assert!(temp_dir.path().join("other.json").exists());
    }
}
